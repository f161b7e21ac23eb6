use std::sync::Arc;

use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

// Default map center: San Francisco.
const DEFAULT_CENTER: (f64, f64) = (37.7749, -122.4194);
const DEFAULT_ZOOM: u8 = 12;

#[derive(Debug, Serialize)]
pub struct MapStyle {
    pub name: &'static str,
    pub id: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeParams {
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct GeocodeResponse {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: String,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/config", get(get_map_config))
        .route("/geocode", get(geocode_location))
}

async fn get_map_config() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "default_center": {"lat": DEFAULT_CENTER.0, "lng": DEFAULT_CENTER.1},
        "default_zoom": DEFAULT_ZOOM,
        "map_styles": [
            MapStyle { name: "Default", id: "default" },
            MapStyle { name: "Satellite", id: "satellite" },
            MapStyle { name: "Terrain", id: "terrain" },
        ],
    }))
}

/// Mock geocoder: answers with the default center for any address.
async fn geocode_location(Query(params): Query<GeocodeParams>) -> Json<GeocodeResponse> {
    Json(GeocodeResponse {
        formatted_address: format!("{}, San Francisco, CA, USA", params.address),
        address: params.address,
        latitude: DEFAULT_CENTER.0,
        longitude: DEFAULT_CENTER.1,
    })
}
