//! HTTP client for the similarity-search service
//!
//! One request matters here: a multipart POST of the selected image to the
//! service's search endpoint. Everything that can go wrong on the wire is
//! collapsed into `TransferError`, which is cloneable and carries a stable
//! user-facing message so it can ride inside an iced message and land in
//! the error banner unchanged.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::state::data::SearchResult;

/// Why a transfer did not produce results
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// Network-layer failure (connection refused, DNS, timeout)
    #[error("Could not reach the search service: {0}")]
    Request(String),
    /// The service answered with a non-2xx status; the body is not parsed
    #[error("Search service returned HTTP {0}")]
    Status(u16),
    /// 2xx response whose payload did not match the expected shape
    #[error("Search service returned an unreadable response")]
    Malformed,
}

impl From<reqwest::Error> for TransferError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest::Error is not Clone; keep its message only
        TransferError::Request(err.to_string())
    }
}

/// The service returns either a bare array of matches or an object
/// wrapping it (the reference backend sends `{"similar_products": [...]}`).
/// Both shapes, including empty arrays, are valid successes.
#[derive(Deserialize)]
#[serde(untagged)]
enum ResponsePayload {
    Wrapped { similar_products: Vec<SearchResult> },
    Bare(Vec<SearchResult>),
}

/// Decode a success body into the result list.
///
/// Kept separate from the request plumbing so the accepted payload shapes
/// are testable without a server.
fn parse_results(body: &str) -> Result<Vec<SearchResult>, TransferError> {
    match serde_json::from_str::<ResponsePayload>(body) {
        Ok(ResponsePayload::Wrapped { similar_products }) => Ok(similar_products),
        Ok(ResponsePayload::Bare(results)) => Ok(results),
        Err(err) => {
            // Logged distinctly from plain transfer failures: a malformed
            // 2xx body points at a contract drift, not a flaky network
            tracing::warn!(error = %err, "search response did not match the expected shape");
            Err(TransferError::Malformed)
        }
    }
}

/// Client for the search service, cheap to clone into background tasks
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    search_endpoint: String,
}

impl SearchClient {
    pub fn new(search_endpoint: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            search_endpoint,
        }
    }

    /// Upload the image and return the ranked matches.
    ///
    /// Exactly one POST per call, multipart form with a single `file` field
    /// holding the raw image bytes. No retry: a failed attempt is terminal
    /// until the user resubmits.
    pub async fn find_similar(
        &self,
        file_name: String,
        bytes: Arc<Vec<u8>>,
    ) -> Result<Vec<SearchResult>, TransferError> {
        let part = reqwest::multipart::Part::bytes(bytes.as_ref().clone()).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(&self.search_endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "search request rejected");
            return Err(TransferError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_results(&body)
    }

    /// Fetch a product thumbnail for display.
    ///
    /// Display-only: callers log failures and show a placeholder instead of
    /// surfacing them in the session.
    pub async fn fetch_image(&self, url: String) -> Result<Vec<u8>, TransferError> {
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::Status(status.as_u16()));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_wrapped_payload() {
        let body = r#"{
            "similar_products": [
                {
                    "product_details": {
                        "id": "p1",
                        "name": "Blue Striped Shirt",
                        "category": "Apparel",
                        "image_filename": "p1.jpg"
                    },
                    "similarity_score": 0.91
                }
            ]
        }"#;

        let results = parse_results(body).expect("wrapped payload should parse");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].product_details.id, "p1");
        assert_eq!(results[0].product_details.image_filename, "p1.jpg");
        assert!((results[0].similarity_score - 0.91).abs() < 1e-6);
    }

    #[test]
    fn test_parses_bare_array_payload() {
        let body = r#"[
            {
                "product_details": {
                    "id": "p1",
                    "name": "A",
                    "category": "Apparel",
                    "image_filename": "a.jpg"
                },
                "similarity_score": 0.5
            },
            {
                "product_details": {
                    "id": "p2",
                    "name": "B",
                    "category": "Footwear",
                    "image_filename": "b.jpg"
                },
                "similarity_score": 0.25
            }
        ]"#;

        let results = parse_results(body).expect("bare array should parse");

        // Response order preserved, no re-sorting
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].product_details.id, "p1");
        assert_eq!(results[1].product_details.id, "p2");
    }

    #[test]
    fn test_empty_array_is_a_valid_success() {
        assert_eq!(parse_results("[]").expect("empty array is valid"), vec![]);
        assert_eq!(
            parse_results(r#"{"similar_products": []}"#).expect("empty wrapped is valid"),
            vec![]
        );
    }

    #[test]
    fn test_non_json_body_is_malformed() {
        assert_eq!(
            parse_results("<html>gateway error</html>"),
            Err(TransferError::Malformed)
        );
    }

    #[test]
    fn test_wrong_shape_is_malformed() {
        // Valid JSON, but not a result list in either accepted shape
        assert_eq!(
            parse_results(r#"{"error": "no file part"}"#),
            Err(TransferError::Malformed)
        );
        assert_eq!(
            parse_results(r#"[{"similarity_score": "high"}]"#),
            Err(TransferError::Malformed)
        );
    }

    #[test]
    fn test_errors_carry_stable_messages() {
        assert_eq!(
            TransferError::Status(500).to_string(),
            "Search service returned HTTP 500"
        );
        assert_eq!(
            TransferError::Malformed.to_string(),
            "Search service returned an unreadable response"
        );
    }
}
