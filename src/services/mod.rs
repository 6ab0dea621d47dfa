pub mod day_planner;
pub mod geocoder;
pub mod http;
pub mod itinerary;
pub mod llm;
pub mod optimizer;
pub mod overpass;
pub mod wikipedia;

pub use geocoder::GeocoderService;
pub use http::HttpClients;
pub use itinerary::ItineraryService;
pub use llm::ReasoningService;
pub use optimizer::RouteOptimizerService;
pub use overpass::OverpassService;
pub use wikipedia::WikipediaService;
