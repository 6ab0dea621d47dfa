// Application-wide constants
// This module centralizes all magic numbers and hardcoded values for better maintainability

// Server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: &str = "3000";

// Identifying user agent sent to every upstream API
pub const USER_AGENT: &str = "CityWalk/0.1 (contact@citywalk.app)";

// Cache TTL values (in seconds)
pub const DEFAULT_DISCOVER_CACHE_TTL_SECONDS: u64 = 86_400; // 24 hours - landmark sets are slow-changing
pub const DEFAULT_POI_CACHE_TTL_SECONDS: u64 = 3_600; // 1 hour
pub const DEFAULT_MEMORY_CACHE_MAX_ENTRIES: u64 = 100;
pub const CITY_INFO_CACHE_TTL_SECONDS: u64 = 86_400;
pub const CITY_INFO_CACHE_MAX_ENTRIES: u64 = 200;
pub const REDIS_INVALIDATE_SCAN_BATCH: usize = 100;

// HTTP client timeouts (in seconds)
pub const GEOCODER_TIMEOUT_SECONDS: u64 = 10;
pub const OVERPASS_TIMEOUT_SECONDS: u64 = 30;
pub const IMAGE_TIMEOUT_SECONDS: u64 = 8;
pub const ROUTING_TIMEOUT_SECONDS: u64 = 15;
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 8;

// Retry behavior for transient upstream failures
pub const HTTP_MAX_RETRIES: usize = 1;
pub const HTTP_RETRY_BACKOFF_MS: u64 = 1_500;
pub const HTTP_RATE_LIMIT_BACKOFF_MS: u64 = 2_000;

// Rate-limit discipline
pub const GEOCODER_MAX_CONCURRENCY: usize = 3;
pub const GEOCODER_RELEASE_SLEEP_MS: u64 = 350;
pub const IMAGE_MAX_CONCURRENCY: usize = 3;

// LLM call timeouts (in seconds)
pub const LLM_PRIMARY_TIMEOUT_SECONDS: u64 = 15;
pub const LLM_FALLBACK_TIMEOUT_SECONDS: u64 = 30;
pub const LLM_LANDMARKS_TIMEOUT_SECONDS: u64 = 20;
pub const LLM_FOOD_TIMEOUT_SECONDS: u64 = 15;

// Input sanitization limits
pub const MAX_LOCATION_INPUT_LEN: usize = 200;
pub const MAX_CITY_INPUT_LEN: usize = 100;
pub const MAX_INTEREST_INPUT_LEN: usize = 50;

// Geocoder validation
pub const VIEWBOX_PADDING_DEGREES: f64 = 0.3; // ~30km
pub const MAX_DISTANCE_FROM_CENTER_KM: f64 = 25.0;
pub const DISCOVER_MAX_DISTANCE_FROM_CENTER_KM: f64 = 30.0;
pub const MAX_LANDMARK_LOOKUPS: usize = 15;

// Image enrichment
pub const MAX_IMAGES_PER_POI: usize = 3;
pub const IMAGE_ENRICH_HARD_TIMEOUT_SECONDS: u64 = 10;

// Route optimization
pub const MAX_WAYPOINTS_PER_ROUTE_REQUEST: usize = 25;
pub const TWO_OPT_MAX_ITERATIONS: usize = 100;
pub const TWO_OPT_MIN_GAIN: f64 = 0.1;

// Day partitioning
pub const MIN_POIS_PER_DAY: usize = 3;
pub const MAX_POIS_PER_DAY: usize = 10;

// Discovery
pub const DEFAULT_DISCOVER_LIMIT: usize = 20;
pub const DEFAULT_FOOD_LIMIT: usize = 10;
