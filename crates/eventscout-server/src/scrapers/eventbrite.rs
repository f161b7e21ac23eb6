use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use tracing::warn;

use super::EventScraper;
use crate::store::NewEvent;

const DEFAULT_BASE_URL: &str = "https://www.eventbriteapi.com/v3";

/// Eventbrite category ids for the categories the UI exposes.
const CATEGORY_IDS: &[(&str, &str)] = &[
    ("technology", "102"),
    ("business", "101"),
    ("music", "103"),
    ("art", "105"),
    ("sports", "108"),
];

// Fallback coordinates: downtown San Francisco.
const DEFAULT_LATITUDE: f64 = 37.7749;
const DEFAULT_LONGITUDE: f64 = -122.4194;

pub struct EventbriteScraper {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl EventbriteScraper {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
        }
    }

    #[cfg(test)]
    fn with_base_url(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    async fn fetch_events(
        &self,
        api_key: &str,
        location: &str,
        category: Option<&str>,
        max_events: usize,
    ) -> anyhow::Result<Vec<NewEvent>> {
        let mut params: Vec<(&str, String)> = vec![
            ("location.address", location.to_string()),
            ("location.within", "25km".to_string()),
            ("expand", "venue,organizer,format,category".to_string()),
            ("sort_by", "date".to_string()),
            ("page_size", max_events.min(50).to_string()),
            ("token", api_key.to_string()),
        ];

        if let Some(category) = category {
            if let Some((_, id)) = CATEGORY_IDS.iter().find(|(name, _)| *name == category) {
                params.push(("categories", (*id).to_string()));
            }
        }

        let response = self
            .http
            .get(format!("{}/events/search/", self.base_url))
            .query(&params)
            .send()
            .await?
            .error_for_status()?;

        let payload: Value = response.json().await?;
        let mut events = Vec::new();
        for raw in payload
            .get("events")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            match parse_event(raw) {
                Some(event) => events.push(event),
                None => warn!("skipping unparseable eventbrite record"),
            }
        }

        Ok(events)
    }
}

#[async_trait]
impl EventScraper for EventbriteScraper {
    fn source(&self) -> &'static str {
        "eventbrite"
    }

    async fn scrape_events(
        &self,
        location: &str,
        category: Option<&str>,
        max_events: usize,
    ) -> anyhow::Result<Vec<NewEvent>> {
        let Some(api_key) = &self.api_key else {
            return Ok(mock_events());
        };

        match self.fetch_events(api_key, location, category, max_events).await {
            Ok(events) => Ok(events),
            Err(error) => {
                warn!("eventbrite scrape failed, falling back to mock events: {error:#}");
                Ok(mock_events())
            }
        }
    }
}

fn parse_event(event: &Value) -> Option<NewEvent> {
    let title = event.pointer("/name/text")?.as_str()?.to_string();
    let source_id = event.get("id")?.as_str()?.to_string();
    let start = event.pointer("/start/utc")?.as_str()?;
    let date = DateTime::parse_from_rfc3339(start).ok()?.naive_utc();

    let venue = event.get("venue");
    let mut location = venue
        .and_then(|v| v.get("name"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if let Some(area) = venue
        .and_then(|v| v.pointer("/address/localized_area_display"))
        .and_then(Value::as_str)
    {
        if !area.is_empty() {
            location.push_str(", ");
            location.push_str(area);
        }
    }

    let coordinate = |key: &str| {
        venue
            .and_then(|v| v.get(key))
            .and_then(Value::as_str)
            .and_then(|raw| raw.parse::<f64>().ok())
            .filter(|value| *value != 0.0)
    };

    Some(NewEvent {
        title,
        description: event
            .pointer("/description/text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        date,
        location,
        latitude: coordinate("latitude").unwrap_or(DEFAULT_LATITUDE),
        longitude: coordinate("longitude").unwrap_or(DEFAULT_LONGITUDE),
        category: event
            .pointer("/category/short_name")
            .and_then(Value::as_str)
            .map(|name| name.to_lowercase())
            .unwrap_or_else(|| "other".to_string()),
        source: "eventbrite".to_string(),
        source_id,
        url: event.get("url").and_then(Value::as_str).map(String::from),
        image_url: event
            .pointer("/logo/url")
            .and_then(Value::as_str)
            .map(String::from),
    })
}

/// Fixed records returned when no API key is configured or the upstream
/// call fails.
fn mock_events() -> Vec<NewEvent> {
    vec![
        NewEvent {
            title: "Tech Startup Networking Night".to_string(),
            description: "Connect with fellow entrepreneurs and tech enthusiasts in the heart \
                          of Silicon Valley."
                .to_string(),
            date: mock_date(2025, 9, 15, 18),
            location: "San Francisco, CA".to_string(),
            latitude: 37.7849,
            longitude: -122.4094,
            category: "technology".to_string(),
            source: "eventbrite".to_string(),
            source_id: "mock_eb_1".to_string(),
            url: Some("https://eventbrite.com/mock-event-1".to_string()),
            image_url: Some("https://via.placeholder.com/300x150?text=Tech+Networking".to_string()),
        },
        NewEvent {
            title: "Digital Marketing Workshop".to_string(),
            description: "Learn the latest strategies in digital marketing and social media."
                .to_string(),
            date: mock_date(2025, 9, 18, 14),
            location: "San Francisco, CA".to_string(),
            latitude: 37.7749,
            longitude: -122.4194,
            category: "business".to_string(),
            source: "eventbrite".to_string(),
            source_id: "mock_eb_2".to_string(),
            url: Some("https://eventbrite.com/mock-event-2".to_string()),
            image_url: Some(
                "https://via.placeholder.com/300x150?text=Marketing+Workshop".to_string(),
            ),
        },
    ]
}

fn mock_date(year: i32, month: u32, day: u32, hour: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .unwrap_or_default()
}
