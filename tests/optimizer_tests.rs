use citywalk::models::{Coordinates, TransportMode};
use citywalk::services::optimizer::{
    fallback_route, nearest_poi_index, optimize_order, tour_duration, DistanceMatrix,
};

mod common;

/// Haversine-derived matrix over a POI cluster (asymmetric variant below).
fn matrix_from_cluster(count: usize) -> DistanceMatrix {
    let pois = common::poi_cluster(count, 48.85, 2.35);
    let n = pois.len();
    let mut distances = vec![vec![0.0; n]; n];
    let mut durations = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..n {
            if i != j {
                let km = pois[i].coordinates.distance_to(&pois[j].coordinates);
                distances[i][j] = km * 1000.0;
                durations[i][j] = km / 5.0 * 3600.0;
            }
        }
    }
    DistanceMatrix {
        pois,
        distances,
        durations,
    }
}

#[test]
fn order_is_a_permutation() {
    for count in [1, 2, 3, 7, 12] {
        let matrix = matrix_from_cluster(count);
        let order = optimize_order(&matrix, None);
        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..count).collect::<Vec<_>>());
    }
}

#[test]
fn optimizer_finds_line_optimum() {
    // POIs on a line: the optimal tour walks the line end to end
    let pois = (0..8)
        .map(|i| common::create_test_poi(&format!("p{}", i), 48.0 + i as f64 * 0.01, 2.0, "landmark"))
        .collect::<Vec<_>>();
    let n = pois.len();
    let mut distances = vec![vec![0.0; n]; n];
    let mut durations = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..n {
            if i != j {
                let d = (i as f64 - j as f64).abs() * 1000.0;
                distances[i][j] = d;
                durations[i][j] = d / 5000.0 * 3600.0;
            }
        }
    }
    let matrix = DistanceMatrix {
        pois,
        distances,
        durations,
    };

    let order = optimize_order(&matrix, None);
    let forward: Vec<usize> = (0..n).collect();
    let backward: Vec<usize> = (0..n).rev().collect();
    assert!(order == forward || order == backward, "got {:?}", order);
}

#[test]
fn optimizer_handles_asymmetric_matrices() {
    // Directed ring: each hop i -> i+1 costs 1, everything else costs 10.
    // The only cheap tour is 0,1,2,3 and the matrix is asymmetric.
    let pois = common::poi_cluster(4, 48.85, 2.35);
    let n = pois.len();
    let mut durations = vec![vec![10.0; n]; n];
    for (i, row) in durations.iter_mut().enumerate() {
        row[i] = 0.0;
        if i + 1 < n {
            row[i + 1] = 1.0;
        }
    }
    let matrix = DistanceMatrix {
        pois,
        distances: durations.clone(),
        durations,
    };

    let order = optimize_order(&matrix, None);
    assert_eq!(order, vec![0, 1, 2, 3]);
    assert!((tour_duration(&matrix, &order) - 3.0).abs() < 1e-9);
}

#[test]
fn fixed_start_stays_first() {
    let matrix = matrix_from_cluster(9);
    for start in 0..9 {
        let order = optimize_order(&matrix, Some(start));
        assert_eq!(order[0], start);
    }
}

#[test]
fn starting_point_selects_nearest_poi() {
    let pois = common::poi_cluster(8, 48.85, 2.35);
    // Right next to poi 0
    let near_first = Coordinates::new(48.8501, 2.3501).unwrap();
    assert_eq!(nearest_poi_index(&pois, &near_first), Some(0));

    // Next to the last POI in the cluster
    let last = pois.last().unwrap().coordinates;
    let near_last = Coordinates::new(last.lat + 0.0001, last.lng).unwrap();
    assert_eq!(nearest_poi_index(&pois, &near_last), Some(pois.len() - 1));
}

#[test]
fn matrix_diagonal_is_zero() {
    let matrix = matrix_from_cluster(6);
    for i in 0..6 {
        assert_eq!(matrix.distances[i][i], 0.0);
        assert_eq!(matrix.durations[i][i], 0.0);
        for j in 0..6 {
            assert!(matrix.distances[i][j] >= 0.0);
            assert!(matrix.durations[i][j] >= 0.0);
        }
    }
}

#[test]
fn fallback_route_is_consistent_across_modes() {
    let pois = common::poi_cluster(5, 48.85, 2.35);

    let walk = fallback_route(pois.clone(), TransportMode::Walking, None, false);
    let drive = fallback_route(pois.clone(), TransportMode::Driving, None, false);

    assert_eq!(walk.total_distance, drive.total_distance);
    assert!(
        walk.total_duration > drive.total_duration,
        "walking the same distance must take longer than driving"
    );
    assert_eq!(walk.ordered_pois.len(), 5);
    assert!(walk.polyline.is_empty());
}

#[test]
fn single_poi_fallback_route_is_empty_travel() {
    let pois = common::poi_cluster(1, 48.85, 2.35);
    let route = fallback_route(pois, TransportMode::Walking, None, false);
    assert_eq!(route.total_distance, 0);
    assert_eq!(route.total_duration, 0);
}
