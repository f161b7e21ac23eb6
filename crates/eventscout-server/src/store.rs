//! SQLite-backed event store.

use std::time::Duration;

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, QueryBuilder, Sqlite};

/// Hard cap on search results, matching the API contract.
const MAX_SEARCH_RESULTS: i64 = 100;

const EVENT_COLUMNS: &str = "id, title, description, date, location, latitude, longitude, \
     category, source, source_id, url, image_url";

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT,
        date TEXT NOT NULL,
        location TEXT NOT NULL DEFAULT '',
        latitude REAL NOT NULL DEFAULT 0,
        longitude REAL NOT NULL DEFAULT 0,
        category TEXT,
        source TEXT NOT NULL,
        source_id TEXT NOT NULL UNIQUE,
        url TEXT,
        image_url TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    )",
    "CREATE INDEX IF NOT EXISTS idx_events_title ON events(title)",
    "CREATE INDEX IF NOT EXISTS idx_events_date ON events(date)",
    "CREATE INDEX IF NOT EXISTS idx_events_category ON events(category)",
    "CREATE INDEX IF NOT EXISTS idx_events_source ON events(source)",
];

/// A stored event, as returned by the API.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDateTime,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub category: Option<String>,
    pub source: String,
    pub source_id: String,
    pub url: Option<String>,
    pub image_url: Option<String>,
}

/// A scraped event waiting to be stored. `source_id` deduplicates across
/// scrape runs.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: NaiveDateTime,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub category: String,
    pub source: String,
    pub source_id: String,
    pub url: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
}

#[derive(Clone)]
pub struct EventStore {
    pool: SqlitePool,
}

impl EventStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        // An in-memory database exists per connection; clamp the pool so
        // every query sees the same one.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 10 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;

        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Filtered search; present filters are ANDed together, capped at 100 rows.
    pub async fn search(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {EVENT_COLUMNS} FROM events WHERE 1=1"));

        if let Some(search) = &filter.search {
            let pattern = format!("%{search}%");
            builder
                .push(" AND (title LIKE ")
                .push_bind(pattern.clone())
                .push(" OR description LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(category) = &filter.category {
            builder.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(date) = filter.date {
            builder
                .push(" AND date >= ")
                .push_bind(date.and_time(NaiveTime::MIN));
        }
        if let Some(location) = &filter.location {
            builder
                .push(" AND location LIKE ")
                .push_bind(format!("%{location}%"));
        }

        builder
            .push(" ORDER BY date LIMIT ")
            .push_bind(MAX_SEARCH_RESULTS);

        let events = builder
            .build_query_as::<Event>()
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    pub async fn categories(&self) -> Result<Vec<String>> {
        let rows: Vec<(Option<String>,)> =
            sqlx::query_as("SELECT DISTINCT category FROM events ORDER BY category")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().filter_map(|(category,)| category).collect())
    }

    pub async fn get(&self, id: i64) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(event)
    }

    /// Batch insert, skipping records already stored under the same
    /// source_id. Returns how many rows were actually inserted.
    pub async fn insert_events(&self, events: &[NewEvent]) -> Result<u64> {
        let mut inserted = 0;
        for event in events {
            let result = sqlx::query(
                "INSERT INTO events (title, description, date, location, latitude, longitude, \
                 category, source, source_id, url, image_url) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
                 ON CONFLICT(source_id) DO NOTHING",
            )
            .bind(&event.title)
            .bind(&event.description)
            .bind(event.date)
            .bind(&event.location)
            .bind(event.latitude)
            .bind(event.longitude)
            .bind(&event.category)
            .bind(&event.source)
            .bind(&event.source_id)
            .bind(&event.url)
            .bind(&event.image_url)
            .execute(&self.pool)
            .await?;
            inserted += result.rows_affected();
        }
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    async fn memory_store() -> EventStore {
        EventStore::connect("sqlite::memory:").await.unwrap()
    }

    fn new_event(source_id: &str, title: &str, category: &str, day: u32) -> NewEvent {
        NewEvent {
            title: title.to_string(),
            description: format!("{title} description"),
            date: NaiveDate::from_ymd_opt(2025, 9, day)
                .unwrap()
                .and_hms_opt(18, 0, 0)
                .unwrap(),
            location: "San Francisco, CA".to_string(),
            latitude: 37.7749,
            longitude: -122.4194,
            category: category.to_string(),
            source: "test".to_string(),
            source_id: source_id.to_string(),
            url: Some(format!("https://example.com/{source_id}")),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn insert_and_search_round_trip() {
        let store = memory_store().await;
        let inserted = store
            .insert_events(&[
                new_event("a", "Tech Meetup", "technology", 10),
                new_event("b", "Art Opening", "art", 12),
            ])
            .await
            .unwrap();
        assert_eq!(inserted, 2);

        let all = store.search(&EventFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        // Ordered by date.
        assert_eq!(all[0].title, "Tech Meetup");
    }

    #[tokio::test]
    async fn duplicate_source_ids_are_skipped() {
        let store = memory_store().await;
        let events = [new_event("a", "Tech Meetup", "technology", 10)];
        assert_eq!(store.insert_events(&events).await.unwrap(), 1);
        assert_eq!(store.insert_events(&events).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn search_filters_compose() {
        let store = memory_store().await;
        store
            .insert_events(&[
                new_event("a", "Tech Meetup", "technology", 10),
                new_event("b", "Tech Workshop", "technology", 20),
                new_event("c", "Art Opening", "art", 20),
            ])
            .await
            .unwrap();

        let filter = EventFilter {
            search: Some("Tech".to_string()),
            category: Some("technology".to_string()),
            date: NaiveDate::from_ymd_opt(2025, 9, 15),
            ..EventFilter::default()
        };
        let events = store.search(&filter).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Tech Workshop");
    }

    #[tokio::test]
    async fn search_matches_description_substring() {
        let store = memory_store().await;
        store
            .insert_events(&[new_event("a", "Gathering", "other", 10)])
            .await
            .unwrap();

        let filter = EventFilter {
            search: Some("Gathering description".to_string()),
            ..EventFilter::default()
        };
        assert_eq!(store.search(&filter).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn categories_are_distinct_and_sorted() {
        let store = memory_store().await;
        store
            .insert_events(&[
                new_event("a", "One", "technology", 10),
                new_event("b", "Two", "technology", 11),
                new_event("c", "Three", "art", 12),
            ])
            .await
            .unwrap();

        assert_eq!(store.categories().await.unwrap(), vec!["art", "technology"]);
    }

    #[tokio::test]
    async fn get_returns_none_for_unknown_id() {
        let store = memory_store().await;
        assert!(store.get(42).await.unwrap().is_none());
    }
}
