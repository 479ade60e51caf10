//! Previous/next navigation between posts

use serde::Serialize;

use super::PostSummary;

/// The chronological neighbors of a post. Either slot may be empty -
/// the first and last posts have no wrap-around.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostNavigation {
    pub previous: Option<PostSummary>,
    pub next: Option<PostSummary>,
}
