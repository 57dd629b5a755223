//! Detail view resolution.
//!
//! A detail view has no fetch of its own: it renders an item handed over by
//! the listing that navigated to it. Reaching it without that context is a
//! displayable state, not an error.

use tablegate_client::Restaurant;

pub const NOT_FOUND_TITLE: &str = "Restaurant Not Found";
pub const NOT_FOUND_MESSAGE: &str = "The restaurant you're looking for could not be found.";

/// What the detail view renders.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    Found(Restaurant),
    NotFound,
}

impl DetailView {
    /// Look up `route_id` in the listing the visitor came from.
    ///
    /// `route_id` is matched against [`Restaurant::route_id`], so items without
    /// a server id are addressed by their position in the listing.
    pub fn resolve(context: Option<&[Restaurant]>, route_id: &str) -> Self {
        context
            .and_then(|listing| {
                listing
                    .iter()
                    .enumerate()
                    .find(|(index, item)| item.route_id(*index) == route_id)
            })
            .map(|(_, item)| DetailView::Found(item.clone()))
            .unwrap_or(DetailView::NotFound)
    }

    /// The restaurant, if found.
    pub fn restaurant(&self) -> Option<&Restaurant> {
        match self {
            DetailView::Found(r) => Some(r),
            DetailView::NotFound => None,
        }
    }
}
