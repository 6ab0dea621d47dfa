pub mod coordinates;
pub mod geo;
pub mod poi;
pub mod route;

pub use coordinates::Coordinates;
pub use geo::BoundingBox;
pub use poi::{validate_poi, OpeningHours, Poi, ValidationResult, SPATIAL_PLACE_ID_PREFIX};
pub use route::{DayPlan, Itinerary, Route, RouteLeg, TimeConstraint, TransportMode, Warning};
