use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::routes::ErrorResponse;
use crate::scrapers::DEFAULT_LOCATION;
use crate::state::AppState;
use crate::store::{Event, EventFilter};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
    pub category: Option<String>,
    /// Inclusive lower bound, YYYY-MM-DD.
    pub date: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScrapeReport {
    pub source: String,
    pub scraped: usize,
    pub inserted: u64,
}

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub message: String,
    pub results: Vec<ScrapeReport>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/search", get(search_events))
        .route("/categories", get(get_categories))
        .route("/scrape", post(trigger_scraping))
        .route("/{id}", get(get_event))
}

async fn search_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Event>>, ErrorResponse> {
    let date = match &params.date {
        Some(raw) => Some(
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| ErrorResponse::bad_request("Invalid date format. Use YYYY-MM-DD"))?,
        ),
        None => None,
    };

    let filter = EventFilter {
        search: params.search,
        category: params.category,
        date,
        location: params.location,
    };

    let events = state
        .store
        .search(&filter)
        .await
        .map_err(ErrorResponse::internal)?;
    Ok(Json(events))
}

async fn get_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ErrorResponse> {
    let categories = state
        .store
        .categories()
        .await
        .map_err(ErrorResponse::internal)?;
    Ok(Json(categories))
}

async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Event>, ErrorResponse> {
    let event = state
        .store
        .get(id)
        .await
        .map_err(ErrorResponse::internal)?
        .ok_or_else(|| ErrorResponse::not_found("Event not found"))?;
    Ok(Json(event))
}

/// Run every configured scraper and store what came back. Duplicate
/// source ids from earlier runs are skipped by the store.
async fn trigger_scraping(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ScrapeResponse>, ErrorResponse> {
    let mut results = Vec::new();

    for scraper in &state.scrapers {
        let events = scraper
            .scrape_events(
                DEFAULT_LOCATION,
                None,
                state.settings.max_events_per_source,
            )
            .await
            .map_err(ErrorResponse::internal)?;
        let inserted = state
            .store
            .insert_events(&events)
            .await
            .map_err(ErrorResponse::internal)?;

        results.push(ScrapeReport {
            source: scraper.source().to_string(),
            scraped: events.len(),
            inserted,
        });
    }

    Ok(Json(ScrapeResponse {
        message: "Scraping complete".to_string(),
        results,
    }))
}
