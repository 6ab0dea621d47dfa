use crate::constants::{DEFAULT_DISCOVER_LIMIT, DEFAULT_FOOD_LIMIT};
use crate::error::{AppError, Result};
use crate::models::Poi;
use crate::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct DiscoverRequest {
    pub city: String,
    #[serde(default)]
    pub interests: Option<Vec<String>>,
    #[serde(default = "default_discover_limit")]
    pub limit: usize,
}

fn default_discover_limit() -> usize {
    DEFAULT_DISCOVER_LIMIT
}

#[derive(Debug, Serialize)]
pub struct DiscoverResponse {
    pub success: bool,
    pub pois: Vec<Poi>,
    pub count: usize,
    pub cached: bool,
}

/// POST /discover - enriched POI discovery without routing, cached.
pub async fn discover(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DiscoverRequest>,
) -> Result<Json<DiscoverResponse>> {
    if request.city.trim().is_empty() {
        return Err(AppError::Validation("city must not be empty".to_string()));
    }
    let limit = request.limit.clamp(1, 50);

    let (pois, cached) = state
        .itinerary_service
        .discover(&request.city, request.interests.as_deref(), limit)
        .await?;

    Ok(Json(DiscoverResponse {
        success: true,
        count: pois.len(),
        pois,
        cached,
    }))
}

#[derive(Debug, Deserialize)]
pub struct DiscoverFoodRequest {
    pub city: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_food_limit")]
    pub limit: usize,
}

fn default_category() -> String {
    "cafes".to_string()
}

fn default_food_limit() -> usize {
    DEFAULT_FOOD_LIMIT
}

/// POST /discover/food - famous food and drink venues, cached.
pub async fn discover_food(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DiscoverFoodRequest>,
) -> Result<Json<DiscoverResponse>> {
    if request.city.trim().is_empty() {
        return Err(AppError::Validation("city must not be empty".to_string()));
    }
    if !matches!(
        request.category.as_str(),
        "cafes" | "restaurants" | "bars" | "parks"
    ) {
        return Err(AppError::Validation(format!(
            "category must be one of cafes|restaurants|bars|parks, got '{}'",
            request.category
        )));
    }
    let limit = request.limit.clamp(1, 30);

    let (pois, cached) = state
        .itinerary_service
        .discover_food(&request.city, &request.category, limit)
        .await?;

    Ok(Json(DiscoverResponse {
        success: true,
        count: pois.len(),
        pois,
        cached,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discover_request_defaults() {
        let request: DiscoverRequest = serde_json::from_str(r#"{"city": "Lisbon"}"#).unwrap();
        assert_eq!(request.limit, DEFAULT_DISCOVER_LIMIT);
        assert!(request.interests.is_none());
    }

    #[test]
    fn food_request_defaults() {
        let request: DiscoverFoodRequest =
            serde_json::from_str(r#"{"city": "Vienna"}"#).unwrap();
        assert_eq!(request.category, "cafes");
        assert_eq!(request.limit, DEFAULT_FOOD_LIMIT);
    }
}
