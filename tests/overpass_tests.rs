use citywalk::models::BoundingBox;
use citywalk::services::{HttpClients, OverpassService};

use serial_test::serial;

mod common;

fn paris_bbox() -> BoundingBox {
    BoundingBox::new(48.815, 2.224, 48.902, 2.47)
}

#[tokio::test]
#[serial]
async fn query_pois_returns_named_sorted_places() {
    if common::should_skip_real_api_tests() {
        println!("Skipping real API test");
        return;
    }

    let service = OverpassService::new(HttpClients::new());
    let interests = vec!["museums".to_string()];
    let places = service
        .query_pois(&paris_bbox(), Some(&interests), 15)
        .await;

    assert!(!places.is_empty(), "central Paris should have museums");
    assert!(places.len() <= 15);

    for place in &places {
        assert!(!place.name.is_empty());
        assert!((0.0..=1.0).contains(&place.notability));
        assert!(paris_bbox().contains(&place.coordinates));
    }

    // Sorted by notability descending
    for pair in places.windows(2) {
        assert!(pair[0].notability >= pair[1].notability);
    }
}

#[tokio::test]
#[serial]
async fn query_pois_dedupes_names() {
    if common::should_skip_real_api_tests() {
        println!("Skipping real API test");
        return;
    }

    let service = OverpassService::new(HttpClients::new());
    let interests = vec!["landmarks".to_string()];
    let places = service
        .query_pois(&paris_bbox(), Some(&interests), 30)
        .await;

    let mut seen = std::collections::HashSet::new();
    for place in &places {
        assert!(
            seen.insert(place.name.to_lowercase()),
            "duplicate name: {}",
            place.name
        );
    }
}

#[tokio::test]
#[serial]
async fn validate_known_landmark_exists() {
    if common::should_skip_real_api_tests() {
        println!("Skipping real API test");
        return;
    }

    let service = OverpassService::new(HttpClients::new());
    let place = service
        .validate_place_exists("Louvre", &paris_bbox(), "museum")
        .await;

    let place = place.expect("the Louvre should validate in Paris");
    assert!(place.name.to_lowercase().contains("louvre"));
    assert!(paris_bbox().contains(&place.coordinates));
}
