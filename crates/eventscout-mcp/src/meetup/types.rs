use chrono::{Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured representation of an event search, fully determined by the
/// input text it was extracted from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchQuery {
    pub location: Option<String>,
    pub keywords: Vec<String>,
    pub start_time: Option<NaiveDateTime>,
    pub remote_only: bool,
    pub max_results: usize,
}

impl SearchQuery {
    pub fn new(max_results: usize) -> Self {
        Self {
            location: None,
            keywords: Vec::new(),
            start_time: None,
            remote_only: false,
            max_results,
        }
    }
}

/// Normalized representation of a Meetup event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetupEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub start_time: NaiveDateTime,
    pub venue_name: Option<String>,
    pub venue_city: Option<String>,
    pub is_online: bool,
    pub group_name: String,
    pub group_url: String,
    pub attendee_count: u32,
    pub fee_amount: Option<f64>,
    pub fee_currency: Option<String>,
}

impl MeetupEvent {
    /// Normalize a raw REST payload entry. Records missing an id or start
    /// time are rejected; every other absent field degrades to a default.
    pub fn from_rest(event: &Value) -> Option<Self> {
        let id = match event.get("id")? {
            Value::String(id) => id.clone(),
            other => other.to_string(),
        };
        let millis = event.get("time")?.as_i64()?;
        let start_time = Local.timestamp_millis_opt(millis).single()?.naive_local();

        let venue = event.get("venue");
        let group = event.get("group");
        let fee = event.get("fee");

        Some(Self {
            id,
            title: string_field(event, "name").unwrap_or_else(|| "Untitled Event".to_string()),
            description: string_field(event, "description").unwrap_or_default(),
            url: string_field(event, "link").unwrap_or_default(),
            start_time,
            venue_name: venue.and_then(|v| string_field(v, "name")),
            venue_city: venue.and_then(|v| string_field(v, "city")),
            is_online: venue
                .and_then(|v| v.get("id"))
                .and_then(Value::as_i64)
                .is_some_and(|id| id == 1),
            group_name: group
                .and_then(|g| string_field(g, "name"))
                .unwrap_or_else(|| "Unknown Group".to_string()),
            group_url: format!(
                "https://www.meetup.com/{}",
                group
                    .and_then(|g| string_field(g, "urlname"))
                    .unwrap_or_default()
            ),
            attendee_count: event
                .get("yes_rsvp_count")
                .and_then(Value::as_u64)
                .unwrap_or(0) as u32,
            fee_amount: fee.and_then(|f| f.get("amount")).and_then(Value::as_f64),
            fee_currency: fee.and_then(|f| string_field(f, "currency")),
        })
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(|s| s.to_string())
}

/// Meetup integration settings. Read from the environment once at the
/// binary edge; the pipeline itself only sees explicit values.
#[derive(Debug, Clone)]
pub struct MeetupConfig {
    pub base_url: String,
    pub access_token: Option<String>,
    pub max_events_per_query: usize,
    pub timeout_secs: u64,
}

impl Default for MeetupConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.meetup.com".to_string(),
            access_token: None,
            max_events_per_query: 20,
            timeout_secs: 30,
        }
    }
}

impl MeetupConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("MEETUP_BASE_URL").unwrap_or(defaults.base_url),
            access_token: std::env::var("MEETUP_ACCESS_TOKEN")
                .ok()
                .filter(|token| !token.is_empty()),
            max_events_per_query: std::env::var("MAX_EVENTS_PER_QUERY")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .filter(|cap| *cap > 0)
                .unwrap_or(defaults.max_events_per_query),
            timeout_secs: std::env::var("MEETUP_TIMEOUT_SECS")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }
}
