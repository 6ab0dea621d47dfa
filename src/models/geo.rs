use crate::models::Coordinates;

/// Axis-aligned bounding box in geographic coordinates.
/// Stored as (south, west, north, east) to match Overpass conventions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        BoundingBox {
            south,
            west,
            north,
            east,
        }
    }

    /// Expand the box by `padding` degrees on every side.
    pub fn padded(&self, padding: f64) -> Self {
        BoundingBox {
            south: self.south - padding,
            west: self.west - padding,
            north: self.north + padding,
            east: self.east + padding,
        }
    }

    pub fn contains(&self, coords: &Coordinates) -> bool {
        coords.lat >= self.south
            && coords.lat <= self.north
            && coords.lng >= self.west
            && coords.lng <= self.east
    }

    /// Geocoder viewbox parameter: "west,north,east,south" (lng,lat order).
    pub fn to_viewbox_param(&self) -> String {
        format!("{},{},{},{}", self.west, self.north, self.east, self.south)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_expands_all_sides() {
        let bbox = BoundingBox::new(48.8, 2.2, 48.9, 2.5);
        let padded = bbox.padded(0.3);
        assert!((padded.south - 48.5).abs() < 1e-10);
        assert!((padded.west - 1.9).abs() < 1e-10);
        assert!((padded.north - 49.2).abs() < 1e-10);
        assert!((padded.east - 2.8).abs() < 1e-10);
    }

    #[test]
    fn contains_checks_all_edges() {
        let bbox = BoundingBox::new(48.8, 2.2, 48.9, 2.5);
        assert!(bbox.contains(&Coordinates::new(48.85, 2.35).unwrap()));
        assert!(!bbox.contains(&Coordinates::new(48.75, 2.35).unwrap()));
        assert!(!bbox.contains(&Coordinates::new(48.85, 2.55).unwrap()));
    }

    #[test]
    fn viewbox_param_is_lng_lat_ordered() {
        let bbox = BoundingBox::new(48.8, 2.2, 48.9, 2.5);
        assert_eq!(bbox.to_viewbox_param(), "2.2,48.9,2.5,48.8");
    }
}
