//! The "Similar Products" grid
//!
//! Renders the filtered result sequence as a wrapping grid of product
//! cards: thumbnail, name, category, similarity percentage. Thumbnails
//! arrive asynchronously; until one lands the card shows a placeholder.

use std::collections::HashMap;

use iced::widget::{column, container, image, text};
use iced::{Alignment, Element, Length};
use iced_aw::Wrap;

use crate::state::data::SearchResult;
use crate::Message;

const CARD_WIDTH: f32 = 190.0;
const THUMBNAIL_HEIGHT: f32 = 190.0;

/// The whole results section: heading plus grid, or a friendly message
/// when there is nothing to show at the current threshold.
pub fn results_section<'a>(
    visible: &[&'a SearchResult],
    total: usize,
    threshold: f32,
    thumbnails: &HashMap<String, image::Handle>,
) -> Element<'a, Message> {
    if total == 0 {
        return text("No similar products found yet. Try uploading an image!")
            .size(16)
            .into();
    }

    if visible.is_empty() {
        // There are matches, the slider just hid them all
        return text(format!(
            "No matches at or above {:.0}% similarity. Lower the threshold to see more.",
            threshold * 100.0
        ))
        .size(16)
        .into();
    }

    let cards: Vec<Element<'a, Message>> = visible
        .iter()
        .map(|result| product_card(result, thumbnails.get(&result.product_details.id)))
        .collect();

    column![
        text("Similar Products").size(28),
        Wrap::with_elements(cards).spacing(16.0).line_spacing(16.0),
    ]
    .spacing(16)
    .align_x(Alignment::Center)
    .into()
}

/// One product card
fn product_card<'a>(
    result: &'a SearchResult,
    thumbnail: Option<&image::Handle>,
) -> Element<'a, Message> {
    let picture: Element<'a, Message> = match thumbnail {
        Some(handle) => image(handle.clone())
            .width(Length::Fixed(CARD_WIDTH))
            .height(Length::Fixed(THUMBNAIL_HEIGHT))
            .into(),
        None => container(text("Loading image...").size(13))
            .center_x(Length::Fixed(CARD_WIDTH))
            .center_y(Length::Fixed(THUMBNAIL_HEIGHT))
            .into(),
    };

    let score = format!("Similarity: {:.2}%", result.similarity_score * 100.0);

    column![
        picture,
        text(result.product_details.name.as_str()).size(16),
        text(result.product_details.category.as_str()).size(13),
        text(score).size(13),
    ]
    .spacing(4)
    .width(Length::Fixed(CARD_WIDTH))
    .align_x(Alignment::Center)
    .into()
}
