use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use super::query::CURRENT_LOCATION;
use super::types::{MeetupEvent, SearchQuery};

#[derive(Debug, Error)]
pub enum MeetupClientError {
    #[error("meetup api returned status {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Thin client for the Meetup events search endpoint. No retry, no rate
/// limiting; failures surface as errors for the caller to degrade on.
pub struct MeetupClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl MeetupClient {
    pub fn new(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MeetupClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    /// Search upcoming events. The current-location sentinel is resolved
    /// server-side from the token, so it is not sent as a location filter.
    /// Malformed entries in the response are skipped with a warning.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<MeetupEvent>, MeetupClientError> {
        let mut params: Vec<(&str, String)> = vec![
            ("page", query.max_results.to_string()),
            ("status", "upcoming".to_string()),
        ];

        if let Some(location) = &query.location {
            if location != CURRENT_LOCATION {
                params.push(("location", location.clone()));
            }
        }
        if let Some(start_time) = query.start_time {
            params.push((
                "start_date_range",
                start_time.format("%Y-%m-%dT%H:%M:%S").to_string(),
            ));
        }
        if !query.keywords.is_empty() {
            params.push(("text", query.keywords.join(" ")));
        }

        let response = self
            .http
            .get(format!("{}/find/upcoming_events", self.base_url))
            .query(&params)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MeetupClientError::Api { status, body });
        }

        let payload: Value = response.json().await?;
        let mut events = Vec::new();
        for raw in payload
            .get("events")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            match MeetupEvent::from_rest(raw) {
                Some(event) => {
                    if query.remote_only && !event.is_online {
                        continue;
                    }
                    events.push(event);
                }
                None => tracing::warn!("skipping event record with missing id or start time"),
            }
        }

        Ok(events)
    }
}
