use crate::error::{AppError, Result};
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct GeocodeRequest {
    pub name: String,
    pub city: String,
}

#[derive(Debug, Serialize)]
pub struct GeocodeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /geocode - single place name within a city context. Nominatim
/// first, Photon as fallback.
pub async fn geocode_place(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GeocodeRequest>,
) -> Result<Json<GeocodeResponse>> {
    if request.name.trim().is_empty() || request.city.trim().is_empty() {
        return Err(AppError::Validation(
            "name and city must not be empty".to_string(),
        ));
    }

    let query = format!("{}, {}", request.name, request.city);
    let result = match state.geocoder.geocode_with_nominatim(&query).await {
        Some(result) => Some(result),
        None => state.geocoder.geocode_with_photon(&query, &request.city).await,
    };

    Ok(Json(match result {
        Some(found) => GeocodeResponse {
            success: true,
            lat: Some(found.coordinates.lat),
            lng: Some(found.coordinates.lng),
            display_name: Some(if found.display_name.is_empty() {
                request.name
            } else {
                found.display_name
            }),
            error: None,
        },
        None => GeocodeResponse {
            success: false,
            lat: None,
            lng: None,
            display_name: None,
            error: Some(format!(
                "Could not find coordinates for '{}' in {}",
                request.name, request.city
            )),
        },
    }))
}

#[derive(Debug, Deserialize)]
pub struct BatchGeocodeRequest {
    pub places: Vec<BatchPlace>,
    pub city: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchPlace {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct BatchGeocodeResponse {
    pub success: bool,
    pub results: Vec<BatchGeocodeResult>,
}

#[derive(Debug, Serialize)]
pub struct BatchGeocodeResult {
    #[serde(flatten)]
    pub place: BatchPlace,
    /// None when this item failed to geocode; the batch still succeeds
    pub coordinates: Option<BatchCoordinates>,
}

#[derive(Debug, Serialize)]
pub struct BatchCoordinates {
    pub lat: f64,
    pub lng: f64,
}

/// POST /geocode/batch - geocode many names in parallel. Per-item
/// failures surface as null coordinates.
pub async fn batch_geocode(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchGeocodeRequest>,
) -> Result<Json<BatchGeocodeResponse>> {
    if request.city.trim().is_empty() {
        return Err(AppError::Validation("city must not be empty".to_string()));
    }

    let names: Vec<String> = request.places.iter().map(|p| p.name.clone()).collect();
    let geocoded = state.geocoder.batch_geocode(&names, &request.city).await;

    let results = request
        .places
        .into_iter()
        .zip(geocoded)
        .map(|(place, result)| BatchGeocodeResult {
            place,
            coordinates: result.map(|found| BatchCoordinates {
                lat: found.coordinates.lat,
                lng: found.coordinates.lng,
            }),
        })
        .collect();

    Ok(Json(BatchGeocodeResponse {
        success: true,
        results,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CityCenterParams {
    pub city: String,
}

#[derive(Debug, Serialize)]
pub struct CityCenterResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /city/center - city-center coordinates for map centering.
pub async fn city_center(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CityCenterParams>,
) -> Result<Json<CityCenterResponse>> {
    if params.city.trim().is_empty() {
        return Err(AppError::Validation("city must not be empty".to_string()));
    }

    Ok(Json(match state.geocoder.resolve_city(&params.city).await {
        Some(info) => CityCenterResponse {
            success: true,
            lat: Some(info.center.lat),
            lng: Some(info.center.lng),
            display_name: Some(if info.display_name.is_empty() {
                params.city
            } else {
                info.display_name.clone()
            }),
            error: None,
        },
        None => CityCenterResponse {
            success: false,
            lat: None,
            lng: None,
            display_name: None,
            error: Some(format!("City not found: {}", params.city)),
        },
    }))
}
