// Library exports for testing and reusability

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod polyline;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use error::{AppError, Result};

use crate::services::{GeocoderService, ItineraryService, WikipediaService};
use std::sync::Arc;

// App state for sharing across the application
pub struct AppState {
    pub itinerary_service: ItineraryService,
    pub geocoder: Arc<GeocoderService>,
    pub wikipedia: Arc<WikipediaService>,
}
