use axum::http::{HeaderValue, Method};
use axum::Router;
use citywalk::cache::{CacheService, MemoryCache, RedisCache};
use citywalk::config::Config;
use citywalk::services::llm::create_reasoning_service;
use citywalk::services::{
    GeocoderService, HttpClients, ItineraryService, OverpassService, RouteOptimizerService,
    WikipediaService,
};
use citywalk::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Development front-end origins allowed by CORS.
const ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:3001",
    "http://localhost:5173",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "citywalk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting CityWalk API server");

    // Shared HTTP clients and rate limiters
    let clients = HttpClients::new();

    // Two-tier cache: local moka tier plus Redis when configured
    let memory = MemoryCache::new(config.discover_cache_ttl, config.memory_cache_max_entries);
    let distributed = match &config.redis_url {
        Some(redis_url) => match RedisCache::new(redis_url).await {
            Ok(redis) => Some(Arc::new(redis) as Arc<dyn citywalk::cache::DistributedCache>),
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Continuing without it.", e);
                None
            }
        },
        None => {
            tracing::info!("Redis URL not configured. Running with the local tier only.");
            None
        }
    };
    let cache = Arc::new(CacheService::new(
        memory,
        distributed,
        config.discover_cache_ttl,
    ));

    // Initialize services
    let llm = Arc::new(create_reasoning_service(&config, clients.llm.clone())?);
    let geocoder = Arc::new(GeocoderService::new(clients.clone()));
    let overpass = Arc::new(OverpassService::new(clients.clone()));
    let wikipedia = Arc::new(WikipediaService::new(clients.clone()));
    let optimizer = Arc::new(RouteOptimizerService::new(clients.clone()));

    let itinerary_service = ItineraryService::new(
        llm,
        geocoder.clone(),
        overpass,
        wikipedia.clone(),
        optimizer,
        cache,
    );

    // Create application state
    let state = Arc::new(AppState {
        itinerary_service,
        geocoder,
        wikipedia,
    });

    // Static CORS allow-list for the known front-end origins
    let origins: Vec<HeaderValue> = ALLOWED_ORIGINS
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(tower_http::cors::Any);

    // Build router with CORS and tracing
    let app = Router::new()
        .nest("/api", citywalk::routes::create_router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
