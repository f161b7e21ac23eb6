use crate::config::Settings;
use crate::scrapers::EventScraper;
use crate::store::EventStore;

/// Shared application state.
pub struct AppState {
    pub settings: Settings,
    pub store: EventStore,
    pub scrapers: Vec<Box<dyn EventScraper>>,
}
