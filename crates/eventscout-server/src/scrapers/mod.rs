//! Event scrapers. Thin upstream clients with fixed mock fallbacks; no
//! retry, dedup, or scheduling — deduplication happens at the store by
//! source_id.

mod eventbrite;

pub use eventbrite::EventbriteScraper;

use async_trait::async_trait;

use crate::store::NewEvent;

pub const DEFAULT_LOCATION: &str = "San Francisco, CA";

#[async_trait]
pub trait EventScraper: Send + Sync {
    /// Stable source tag stored alongside scraped events.
    fn source(&self) -> &'static str;

    async fn scrape_events(
        &self,
        location: &str,
        category: Option<&str>,
        max_events: usize,
    ) -> anyhow::Result<Vec<NewEvent>>;
}
