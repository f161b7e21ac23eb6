//! Application configuration settings.

/// Server settings, read from the environment once at startup. Components
/// receive explicit values; nothing reads the environment after this.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub eventbrite_api_key: Option<String>,
    pub max_events_per_source: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            database_url: "sqlite://events.db?mode=rwc".to_string(),
            eventbrite_api_key: None,
            max_events_per_source: 100,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.port),
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            eventbrite_api_key: std::env::var("EVENTBRITE_API_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            max_events_per_source: std::env::var("MAX_EVENTS_PER_SOURCE")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .filter(|cap| *cap > 0)
                .unwrap_or(defaults.max_events_per_source),
        }
    }
}
