use citywalk::models::TransportMode;
use citywalk::polyline;
use citywalk::services::{HttpClients, RouteOptimizerService};

use serial_test::serial;

mod common;

#[tokio::test]
#[serial]
async fn distance_matrix_has_square_shape() {
    if common::should_skip_real_api_tests() {
        println!("Skipping real API test");
        return;
    }

    let service = RouteOptimizerService::new(HttpClients::new());
    let pois = vec![
        common::create_test_poi("Eiffel Tower", 48.8584, 2.2945, "landmark"),
        common::create_test_poi("Louvre", 48.8606, 2.3376, "museum"),
        common::create_test_poi("Notre-Dame", 48.8530, 2.3499, "church"),
    ];

    let matrix = service
        .build_distance_matrix(&pois, TransportMode::Walking)
        .await;

    assert_eq!(matrix.len(), 3);
    assert_eq!(matrix.distances.len(), 3);
    assert_eq!(matrix.durations.len(), 3);
    for i in 0..3 {
        assert_eq!(matrix.distances[i].len(), 3);
        assert_eq!(matrix.durations[i][i], 0.0);
        for j in 0..3 {
            if i != j {
                assert!(matrix.durations[i][j] > 0.0);
            }
        }
    }
}

#[tokio::test]
#[serial]
async fn route_geometry_produces_decodable_polyline() {
    if common::should_skip_real_api_tests() {
        println!("Skipping real API test");
        return;
    }

    let service = RouteOptimizerService::new(HttpClients::new());
    let pois = vec![
        common::create_test_poi("Eiffel Tower", 48.8584, 2.2945, "landmark"),
        common::create_test_poi("Louvre", 48.8606, 2.3376, "museum"),
    ];

    let route = service
        .get_route_geometry(&pois, TransportMode::Walking)
        .await
        .expect("two POIs route");

    assert_eq!(route.ordered_pois.len(), 2);
    assert!(route.total_distance > 0);
    assert!(route.total_duration > 0);

    if !route.polyline.is_empty() {
        let points = polyline::decode(&route.polyline);
        assert!(points.len() >= 2);
        for (lat, lng) in points {
            assert!((-90.0..=90.0).contains(&lat));
            assert!((-180.0..=180.0).contains(&lng));
        }
    }
}

#[tokio::test]
#[serial]
async fn optimized_route_with_starting_point_is_round_trip() {
    if common::should_skip_real_api_tests() {
        println!("Skipping real API test");
        return;
    }

    let service = RouteOptimizerService::new(HttpClients::new());
    let pois = vec![
        common::create_test_poi("Eiffel Tower", 48.8584, 2.2945, "landmark"),
        common::create_test_poi("Louvre", 48.8606, 2.3376, "museum"),
        common::create_test_poi("Notre-Dame", 48.8530, 2.3499, "church"),
    ];
    let start = citywalk::models::Coordinates::new(48.8566, 2.3522).unwrap();

    let route = service
        .create_optimized_route(&pois, TransportMode::Walking, None, Some(start), true, false)
        .await
        .expect("route should build");

    assert!(route.is_round_trip);
    assert_eq!(route.starting_point, Some(start));
    assert_eq!(route.ordered_pois.len(), 3);

    // First POI must be the one nearest the starting point (Notre-Dame)
    assert_eq!(route.ordered_pois[0].name, "Notre-Dame");
}
