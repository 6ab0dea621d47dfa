pub mod debug;
pub mod discover;
pub mod geocode;
pub mod itinerary;
pub mod places;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/itinerary", post(itinerary::create_itinerary))
        .route(
            "/route/from-selection",
            post(itinerary::create_route_from_selection),
        )
        .route("/discover", post(discover::discover))
        .route("/discover/food", post(discover::discover_food))
        .route("/places/{place_id}", get(places::get_place_details))
        .route("/pois/lookup", post(places::lookup_pois))
        .route("/geocode", post(geocode::geocode_place))
        .route("/geocode/batch", post(geocode::batch_geocode))
        .route("/city/center", get(geocode::city_center))
        .route("/health", get(debug::health_check))
        .with_state(state)
}
