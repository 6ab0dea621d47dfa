use crate::models::{Coordinates, Poi};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    #[default]
    Walking,
    Driving,
    Transit,
}

impl TransportMode {
    /// Routing backend profile. The backend has no transit support, so
    /// transit degrades to pedestrian routing.
    pub fn osrm_profile(&self) -> &'static str {
        match self {
            TransportMode::Walking => "foot",
            TransportMode::Driving => "car",
            TransportMode::Transit => "foot",
        }
    }

    /// Nominal speed used to derive durations from route distances. The
    /// public routing backend reports unrealistic pedestrian speeds, so
    /// durations are always recomputed at these rates.
    pub fn nominal_speed_kmh(&self) -> f64 {
        match self {
            TransportMode::Walking => 5.0,
            TransportMode::Driving => 30.0,
            TransportMode::Transit => 15.0,
        }
    }

    /// Speed used when estimating a distance matrix without the backend.
    pub fn estimate_speed_kmh(&self) -> f64 {
        match self {
            TransportMode::Walking => 5.0,
            TransportMode::Driving => 40.0,
            TransportMode::Transit => 20.0,
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportMode::Walking => write!(f, "walking"),
            TransportMode::Driving => write!(f, "driving"),
            TransportMode::Transit => write!(f, "transit"),
        }
    }
}

impl FromStr for TransportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "walk" | "walking" => Ok(TransportMode::Walking),
            "drive" | "driving" | "car" => Ok(TransportMode::Driving),
            "transit" | "public_transport" => Ok(TransportMode::Transit),
            _ => Err(format!("Invalid transport mode: '{}'", s)),
        }
    }
}

/// Realistic time slots for tourists. Multi-day trips get zone-based
/// planning with one route per day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimeConstraint {
    #[serde(rename = "6h")]
    HalfDay,
    #[serde(rename = "day")]
    Day,
    #[serde(rename = "2days")]
    TwoDays,
    #[serde(rename = "3days")]
    ThreeDays,
    #[serde(rename = "5days")]
    FiveDays,
}

impl TimeConstraint {
    pub fn num_days(&self) -> usize {
        match self {
            TimeConstraint::HalfDay | TimeConstraint::Day => 1,
            TimeConstraint::TwoDays => 2,
            TimeConstraint::ThreeDays => 3,
            TimeConstraint::FiveDays => 5,
        }
    }

    /// Total travel-time budget in seconds (8h per day, 6h for a half day).
    pub fn time_limit_seconds(&self) -> f64 {
        match self {
            TimeConstraint::HalfDay => 21_600.0,
            TimeConstraint::Day => 28_800.0,
            TimeConstraint::TwoDays => 57_600.0,
            TimeConstraint::ThreeDays => 86_400.0,
            TimeConstraint::FiveDays => 144_000.0,
        }
    }

    /// Hard cap on the number of POIs the pipeline will route. The
    /// orchestrator and the optimizer historically used two different
    /// tables; the minimum of the two wins.
    pub fn max_pois(&self) -> usize {
        match self {
            TimeConstraint::HalfDay => 6,
            TimeConstraint::Day => 10,
            TimeConstraint::TwoDays => 20,
            TimeConstraint::ThreeDays => 30,
            TimeConstraint::FiveDays => 50,
        }
    }
}

impl fmt::Display for TimeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeConstraint::HalfDay => "6h",
            TimeConstraint::Day => "day",
            TimeConstraint::TwoDays => "2days",
            TimeConstraint::ThreeDays => "3days",
            TimeConstraint::FiveDays => "5days",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for TimeConstraint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "6h" => Ok(TimeConstraint::HalfDay),
            "day" => Ok(TimeConstraint::Day),
            "2days" => Ok(TimeConstraint::TwoDays),
            "3days" => Ok(TimeConstraint::ThreeDays),
            "5days" => Ok(TimeConstraint::FiveDays),
            _ => Err(format!("Invalid time constraint: '{}'", s)),
        }
    }
}

/// A single leg of a route between two consecutive POIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteLeg {
    pub from_poi: Poi,
    pub to_poi: Poi,
    /// Distance in meters
    pub distance: u32,
    /// Duration in seconds
    pub duration: u32,
    pub polyline: String,
}

/// A complete route connecting multiple POIs. All legs share one transport
/// mode; the polyline may be empty when the routing backend is unavailable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub ordered_pois: Vec<Poi>,
    #[serde(default)]
    pub polyline: String,
    /// Total distance in meters
    pub total_distance: u32,
    /// Total duration in seconds
    pub total_duration: u32,
    pub transport_mode: TransportMode,
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
    /// User's starting location (not itself a POI)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_point: Option<Coordinates>,
    #[serde(default)]
    pub is_round_trip: bool,
}

/// One day of a multi-day itinerary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPlan {
    pub day_number: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default)]
    pub pois: Vec<Poi>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,
    #[serde(default)]
    pub total_visit_time_minutes: u32,
    #[serde(default)]
    pub total_walking_km: f64,
}

/// A complete itinerary. For multi-day trips, `pois` is the concatenation
/// of the day plans' POIs in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Itinerary {
    pub id: Uuid,
    pub city: String,
    pub pois: Vec<Poi>,
    pub route: Route,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
    pub transport_mode: TransportMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_constraint: Option<TimeConstraint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_maps_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<DayPlan>>,
    pub total_days: usize,
}

/// Non-fatal degradation surfaced alongside a successful response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warning {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub affected_pois: Vec<String>,
}

impl Warning {
    pub fn new(code: &str, message: impl Into<String>, affected_pois: Vec<String>) -> Self {
        Warning {
            code: code.to_string(),
            message: message.into(),
            affected_pois,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_mode_osrm_profile() {
        assert_eq!(TransportMode::Walking.osrm_profile(), "foot");
        assert_eq!(TransportMode::Driving.osrm_profile(), "car");
        // Transit has no backend profile and degrades to walking
        assert_eq!(TransportMode::Transit.osrm_profile(), "foot");
    }

    #[test]
    fn test_transport_mode_from_str() {
        assert_eq!(
            "walking".parse::<TransportMode>().unwrap(),
            TransportMode::Walking
        );
        assert_eq!(
            "WALK".parse::<TransportMode>().unwrap(),
            TransportMode::Walking
        );
        assert_eq!(
            "driving".parse::<TransportMode>().unwrap(),
            TransportMode::Driving
        );
        assert_eq!(
            "transit".parse::<TransportMode>().unwrap(),
            TransportMode::Transit
        );
        assert!("teleport".parse::<TransportMode>().is_err());
    }

    #[test]
    fn test_transport_mode_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&TransportMode::Walking).unwrap(),
            "\"walking\""
        );
        let mode: TransportMode = serde_json::from_str("\"transit\"").unwrap();
        assert_eq!(mode, TransportMode::Transit);
    }

    #[test]
    fn test_time_constraint_days() {
        assert_eq!(TimeConstraint::HalfDay.num_days(), 1);
        assert_eq!(TimeConstraint::Day.num_days(), 1);
        assert_eq!(TimeConstraint::TwoDays.num_days(), 2);
        assert_eq!(TimeConstraint::ThreeDays.num_days(), 3);
        assert_eq!(TimeConstraint::FiveDays.num_days(), 5);
    }

    #[test]
    fn test_time_constraint_serde_values() {
        assert_eq!(
            serde_json::to_string(&TimeConstraint::HalfDay).unwrap(),
            "\"6h\""
        );
        let tc: TimeConstraint = serde_json::from_str("\"3days\"").unwrap();
        assert_eq!(tc, TimeConstraint::ThreeDays);
    }

    #[test]
    fn test_time_limits_scale_with_days() {
        assert_eq!(TimeConstraint::HalfDay.time_limit_seconds(), 21_600.0);
        assert_eq!(TimeConstraint::Day.time_limit_seconds(), 28_800.0);
        assert_eq!(
            TimeConstraint::FiveDays.time_limit_seconds(),
            5.0 * TimeConstraint::Day.time_limit_seconds()
        );
    }

    #[test]
    fn test_max_pois_takes_orchestrator_minimum() {
        assert_eq!(TimeConstraint::HalfDay.max_pois(), 6);
        assert_eq!(TimeConstraint::Day.max_pois(), 10);
        assert_eq!(TimeConstraint::TwoDays.max_pois(), 20);
        assert_eq!(TimeConstraint::ThreeDays.max_pois(), 30);
        assert_eq!(TimeConstraint::FiveDays.max_pois(), 50);
    }
}
