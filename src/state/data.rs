//! Shared data structures for the search session
//!
//! These structs mirror the JSON records the similarity-search service
//! returns, and flow unchanged from the transfer layer to the UI layer.

use serde::Deserialize;

/// Catalog metadata for a single product
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductDetails {
    /// Unique product ID (unique within one response)
    pub id: String,
    /// Display name (e.g., "Blue Striped Shirt")
    pub name: String,
    /// Product category (e.g., "Apparel")
    pub category: String,
    /// Filename only; resolved against the service's image route for display
    pub image_filename: String,
}

/// One ranked match from the similarity search
///
/// Immutable once received. The service returns matches in rank order
/// (best first) and the client preserves that order everywhere.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchResult {
    pub product_details: ProductDetails,
    /// Cosine similarity against the uploaded image, in [0, 1]
    pub similarity_score: f32,
}
