use citywalk::models::{Coordinates, Poi};

/// Real-API tests are skipped when SKIP_REAL_API_TESTS is set, so CI
/// without network access stays green.
#[allow(dead_code)]
pub fn should_skip_real_api_tests() -> bool {
    std::env::var("SKIP_REAL_API_TESTS").is_ok()
}

/// Create a test POI with a type tag and a one-hour visit duration.
#[allow(dead_code)]
pub fn create_test_poi(name: &str, lat: f64, lng: f64, poi_type: &str) -> Poi {
    let mut poi = Poi::new(
        format!("osm_node_{}", name.to_lowercase().replace(' ', "_")),
        name.to_string(),
        Coordinates::new(lat, lng).unwrap(),
        format!(
            "https://www.google.com/maps/search/?api=1&query={}",
            name.replace(' ', "+")
        ),
    );
    poi.types = Some(vec![poi_type.to_string()]);
    poi.visit_duration_minutes = Some(60);
    poi
}

/// A cluster of POIs around a center, spaced a few hundred meters apart.
#[allow(dead_code)]
pub fn poi_cluster(count: usize, center_lat: f64, center_lng: f64) -> Vec<Poi> {
    (0..count)
        .map(|i| {
            create_test_poi(
                &format!("poi {}", i),
                center_lat + (i as f64) * 0.003,
                center_lng + ((i % 4) as f64) * 0.004,
                "landmark",
            )
        })
        .collect()
}
