//! Image search client.
//!
//! One request per keyword and page against a Pixabay-compatible endpoint.
//! The [`SearchWorker`] runs a [`SearchClient`] on background threads so the
//! terminal loop never blocks on the network.

mod client;
mod worker;

pub use client::{DEFAULT_ENDPOINT, PixabayClient, SearchClient, parse_response};
pub use worker::{SearchOutcome, SearchWorker, WorkerStopped};

/// Number of results requested per page.
pub const PAGE_SIZE: u32 = 12;

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultItem {
    /// Full-size image shown in the preview overlay
    pub image_url: String,
    /// Smaller rendition used for grid tiles
    pub thumbnail_url: String,
    /// Comma-separated tags, used as the caption
    pub tags: String,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchPage {
    /// Total number of matches the endpoint is willing to page through
    pub total_hits: u32,
    /// Items on this page, in the order the endpoint returned them
    pub items: Vec<ResultItem>,
}

/// Failure of a search request.
///
/// Callers treat every variant the same way; the split exists for logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with HTTP {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
}
