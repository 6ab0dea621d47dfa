use crate::constants::*;
use crate::error::{AppError, Result};
use crate::models::{Coordinates, Poi, Route, RouteLeg, TimeConstraint, TransportMode};
use crate::polyline;
use crate::services::http::{get_json_with_retry, HttpClients};
use serde::Deserialize;

const OSRM_URL: &str = "https://router.project-osrm.org";

/// Pairwise travel costs for an ordered POI list. `distances` in meters,
/// `durations` in seconds; diagonal is zero; the matrix need not be
/// symmetric (one-way streets).
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    pub pois: Vec<Poi>,
    pub distances: Vec<Vec<f64>>,
    pub durations: Vec<Vec<f64>>,
}

impl DistanceMatrix {
    pub fn len(&self) -> usize {
        self.pois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pois.is_empty()
    }
}

/// Total tour duration along an order (no return to start).
pub fn tour_duration(matrix: &DistanceMatrix, order: &[usize]) -> f64 {
    order
        .windows(2)
        .map(|pair| matrix.durations[pair[0]][pair[1]])
        .sum()
}

/// Nearest-neighbor tour from a fixed start over the duration matrix.
fn nearest_neighbor_tour(matrix: &DistanceMatrix, start: usize) -> Vec<usize> {
    let n = matrix.len();
    let mut visited = vec![false; n];
    let mut tour = Vec::with_capacity(n);
    let mut current = start;
    visited[start] = true;
    tour.push(start);

    while tour.len() < n {
        let mut next: Option<(usize, f64)> = None;
        for (j, seen) in visited.iter().enumerate() {
            if *seen {
                continue;
            }
            let cost = matrix.durations[current][j];
            if cost > 0.0 && next.map_or(true, |(_, best)| cost < best) {
                next = Some((j, cost));
            }
        }
        match next {
            Some((j, _)) => {
                visited[j] = true;
                tour.push(j);
                current = j;
            }
            None => {
                // Isolated remainder (zero-cost rows): append in index order
                for (j, seen) in visited.iter_mut().enumerate() {
                    if !*seen {
                        *seen = true;
                        tour.push(j);
                    }
                }
                break;
            }
        }
    }

    tour
}

/// Gain of reversing the segment [i, j]: d(a,c)+d(b,d) - d(a,b)-d(c,d).
/// Negative means the reversed tour is shorter.
fn two_opt_gain(tour: &[usize], durations: &[Vec<f64>], i: usize, j: usize) -> f64 {
    let n = tour.len();
    let (a, b) = (tour[i - 1], tour[i]);
    let (c, d) = (tour[j], tour[(j + 1) % n]);
    let current = durations[a][b] + durations[c][d];
    let improved = durations[a][c] + durations[b][d];
    improved - current
}

/// 2-opt local search: reverse segments while an improving swap exists.
/// Swaps must beat a small threshold so ties cannot oscillate forever.
fn two_opt_improve(matrix: &DistanceMatrix, mut tour: Vec<usize>) -> Vec<usize> {
    let n = tour.len();
    let mut improved = true;
    let mut iteration = 0;

    while improved && iteration < TWO_OPT_MAX_ITERATIONS {
        improved = false;
        iteration += 1;
        'outer: for i in 1..n - 1 {
            for j in i + 1..n {
                if two_opt_gain(&tour, &matrix.durations, i, j) < -TWO_OPT_MIN_GAIN {
                    tour[i..=j].reverse();
                    improved = true;
                    break 'outer;
                }
            }
        }
    }

    tour
}

/// Find a visit order minimizing total travel duration: nearest neighbor
/// plus 2-opt, best over all starting points. With `start_index` fixed the
/// tour is seeded there and never re-randomized. Deterministic for a given
/// matrix and start policy.
pub fn optimize_order(matrix: &DistanceMatrix, start_index: Option<usize>) -> Vec<usize> {
    let n = matrix.len();
    if n <= 1 {
        return (0..n).collect();
    }
    if n == 2 {
        return if start_index == Some(1) {
            vec![1, 0]
        } else {
            vec![0, 1]
        };
    }

    if let Some(start) = start_index {
        let tour = nearest_neighbor_tour(matrix, start);
        return two_opt_improve(matrix, tour);
    }

    let mut best_tour: Option<Vec<usize>> = None;
    let mut best_duration = f64::INFINITY;

    for start in 0..n {
        let tour = nearest_neighbor_tour(matrix, start);
        let tour = two_opt_improve(matrix, tour);
        let duration = tour_duration(matrix, &tour);
        if duration < best_duration {
            best_duration = duration;
            best_tour = Some(tour);
        }
    }

    best_tour.unwrap_or_else(|| (0..n).collect())
}

/// Index of the POI nearest to a point (great-circle).
pub fn nearest_poi_index(pois: &[Poi], point: &Coordinates) -> Option<usize> {
    pois.iter()
        .enumerate()
        .map(|(i, poi)| (i, point.distance_to(&poi.coordinates)))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
}

#[derive(Debug, Deserialize)]
struct OsrmTableResponse {
    code: String,
    #[serde(default)]
    durations: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<f64>>>,
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    geometry: String,
    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    distance: f64,
}

/// Route optimizer backed by a public OSRM instance. Matrix and geometry
/// requests both degrade to haversine estimates when the backend is down,
/// so routing failures never fail the request.
pub struct RouteOptimizerService {
    clients: HttpClients,
}

impl RouteOptimizerService {
    pub fn new(clients: HttpClients) -> Self {
        RouteOptimizerService { clients }
    }

    /// Dense n×n duration/distance matrix from the OSRM table service,
    /// falling back to haversine at the mode's estimate speed.
    pub async fn build_distance_matrix(
        &self,
        pois: &[Poi],
        mode: TransportMode,
    ) -> DistanceMatrix {
        let n = pois.len();
        if n <= 1 {
            return DistanceMatrix {
                pois: pois.to_vec(),
                distances: vec![vec![0.0; n]; n],
                durations: vec![vec![0.0; n]; n],
            };
        }

        let coords = pois
            .iter()
            .map(|p| p.coordinates.to_lng_lat())
            .collect::<Vec<_>>()
            .join(";");
        let url = format!(
            "{}/table/v1/{}/{}",
            OSRM_URL,
            mode.osrm_profile(),
            coords
        );

        let response = get_json_with_retry(
            &self.clients.routing,
            &url,
            &[("annotations", "duration,distance".to_string())],
        )
        .await;

        if let Some(json) = response {
            if let Ok(table) = serde_json::from_value::<OsrmTableResponse>(json) {
                if table.code == "Ok" {
                    if let (Some(durations), Some(distances)) = (table.durations, table.distances)
                    {
                        if durations.len() == n && distances.len() == n {
                            return DistanceMatrix {
                                pois: pois.to_vec(),
                                distances,
                                durations,
                            };
                        }
                    }
                }
            }
        }

        tracing::info!("Table service unavailable, estimating matrix from haversine");
        self.estimate_matrix(pois, mode)
    }

    fn estimate_matrix(&self, pois: &[Poi], mode: TransportMode) -> DistanceMatrix {
        let n = pois.len();
        let speed = mode.estimate_speed_kmh();
        let mut distances = vec![vec![0.0; n]; n];
        let mut durations = vec![vec![0.0; n]; n];

        for i in 0..n {
            for j in 0..n {
                if i != j {
                    let km = pois[i].coordinates.distance_to(&pois[j].coordinates);
                    distances[i][j] = km * 1000.0;
                    durations[i][j] = km / speed * 3600.0;
                }
            }
        }

        DistanceMatrix {
            pois: pois.to_vec(),
            distances,
            durations,
        }
    }

    /// Retrieve polyline geometry for an already-ordered tour. Tours over
    /// the waypoint limit are fetched in overlapping windows and stitched.
    pub async fn get_route_geometry(
        &self,
        ordered_pois: &[Poi],
        mode: TransportMode,
    ) -> Result<Route> {
        if ordered_pois.is_empty() {
            return Err(AppError::InvalidInput("No POIs provided".to_string()));
        }

        if ordered_pois.len() <= MAX_WAYPOINTS_PER_ROUTE_REQUEST {
            Ok(self.single_route(ordered_pois, mode).await)
        } else {
            Ok(self.batched_route(ordered_pois, mode).await)
        }
    }

    async fn single_route(&self, ordered_pois: &[Poi], mode: TransportMode) -> Route {
        tracing::info!(
            "Routing request: {} POIs, profile={}",
            ordered_pois.len(),
            mode.osrm_profile()
        );

        let waypoints: Vec<Coordinates> = ordered_pois.iter().map(|p| p.coordinates).collect();
        let Some(osrm) = self.fetch_route(&waypoints, mode).await else {
            tracing::info!("Routing backend failed, using haversine fallback");
            return fallback_route(ordered_pois.to_vec(), mode, None, false);
        };

        let total_distance = osrm.distance.round() as u32;
        let speed = mode.nominal_speed_kmh();
        let total_duration = duration_for(total_distance, speed);

        let mut legs = Vec::new();
        for (i, leg) in osrm.legs.iter().enumerate() {
            if i + 1 < ordered_pois.len() {
                let leg_distance = leg.distance.round() as u32;
                legs.push(RouteLeg {
                    from_poi: ordered_pois[i].clone(),
                    to_poi: ordered_pois[i + 1].clone(),
                    distance: leg_distance,
                    duration: duration_for(leg_distance, speed),
                    polyline: String::new(),
                });
            }
        }

        tracing::info!(
            "Routing success: distance={}m, polyline_length={}",
            total_distance,
            osrm.geometry.len()
        );

        Route {
            ordered_pois: ordered_pois.to_vec(),
            polyline: osrm.geometry,
            total_distance,
            total_duration,
            transport_mode: mode,
            legs,
            starting_point: None,
            is_round_trip: false,
        }
    }

    /// Overlapping windows of the waypoint limit, each window sharing one
    /// POI with the previous so the stitched geometry connects.
    async fn batched_route(&self, ordered_pois: &[Poi], mode: TransportMode) -> Route {
        let speed = mode.nominal_speed_kmh();
        let mut polylines: Vec<String> = Vec::new();
        let mut total_distance: u32 = 0;
        let mut legs: Vec<RouteLeg> = Vec::new();

        let mut start = 0;
        while start < ordered_pois.len() {
            let end = (start + MAX_WAYPOINTS_PER_ROUTE_REQUEST).min(ordered_pois.len());
            let batch = &ordered_pois[start..end];
            if batch.len() < 2 {
                break;
            }

            let waypoints: Vec<Coordinates> = batch.iter().map(|p| p.coordinates).collect();
            match self.fetch_route(&waypoints, mode).await {
                Some(osrm) => {
                    polylines.push(osrm.geometry);
                    total_distance += osrm.distance.round() as u32;
                    for (j, leg) in osrm.legs.iter().enumerate() {
                        if j + 1 < batch.len() {
                            let leg_distance = leg.distance.round() as u32;
                            legs.push(RouteLeg {
                                from_poi: batch[j].clone(),
                                to_poi: batch[j + 1].clone(),
                                distance: leg_distance,
                                duration: duration_for(leg_distance, speed),
                                polyline: String::new(),
                            });
                        }
                    }
                }
                None => {
                    tracing::info!("Batch {}..{} routing failed", start, end);
                }
            }

            if end >= ordered_pois.len() {
                break;
            }
            start = end - 1;
        }

        Route {
            ordered_pois: ordered_pois.to_vec(),
            polyline: polyline::combine(&polylines),
            total_distance,
            total_duration: duration_for(total_distance, speed),
            transport_mode: mode,
            legs,
            starting_point: None,
            is_round_trip: false,
        }
    }

    async fn fetch_route(
        &self,
        waypoints: &[Coordinates],
        mode: TransportMode,
    ) -> Option<OsrmRoute> {
        let coords = waypoints
            .iter()
            .map(Coordinates::to_lng_lat)
            .collect::<Vec<_>>()
            .join(";");
        let url = format!(
            "{}/route/v1/{}/{}",
            OSRM_URL,
            mode.osrm_profile(),
            coords
        );

        let json = get_json_with_retry(
            &self.clients.routing,
            &url,
            &[
                ("overview", "full".to_string()),
                ("geometries", "polyline".to_string()),
                ("steps", "false".to_string()),
            ],
        )
        .await?;

        let response: OsrmRouteResponse = serde_json::from_value(json).ok()?;
        if response.code != "Ok" {
            tracing::info!("Routing backend returned no route: {}", response.code);
            return None;
        }
        response.routes.into_iter().next()
    }

    /// Full optimization pipeline: cap by time constraint, build the
    /// matrix, order the tour, trim to the travel budget, fetch geometry.
    pub async fn create_optimized_route(
        &self,
        pois: &[Poi],
        mode: TransportMode,
        time_constraint: Option<TimeConstraint>,
        starting_point: Option<Coordinates>,
        is_round_trip: bool,
        skip_optimization: bool,
    ) -> Result<Route> {
        if pois.is_empty() {
            return Err(AppError::InvalidInput("No POIs provided".to_string()));
        }

        let mut pois: Vec<Poi> = pois.to_vec();
        if let Some(tc) = time_constraint {
            let max_pois = tc.max_pois();
            tracing::info!(
                "Starting optimization with {} POIs (max: {})",
                pois.len(),
                max_pois
            );
            pois.truncate(max_pois);
        } else {
            tracing::info!("Starting optimization with {} POIs (no limit)", pois.len());
        }

        let matrix = self.build_distance_matrix(&pois, mode).await;

        let ordered_pois = if skip_optimization {
            pois
        } else {
            let first_index = starting_point.and_then(|start| nearest_poi_index(&pois, &start));
            if let Some(idx) = first_index {
                tracing::info!("Nearest POI to starting point is #{}: {}", idx + 1, pois[idx].name);
            }

            let order = optimize_order(&matrix, first_index);
            let mut ordered: Vec<Poi> = order.iter().map(|&i| pois[i].clone()).collect();

            if let Some(tc) = time_constraint {
                ordered = trim_to_time_limit(ordered, &matrix, &order, tc.time_limit_seconds());
            }
            ordered
        };

        let mut route = match starting_point {
            Some(start) => {
                self.route_with_starting_point(&ordered_pois, mode, start, is_round_trip)
                    .await
            }
            None => self.get_route_geometry(&ordered_pois, mode).await?,
        };

        if let Some(start) = starting_point {
            route.starting_point = Some(start);
            route.is_round_trip = is_round_trip;
        }

        Ok(route)
    }

    /// Geometry for start → POIs (→ start when round trip). The starting
    /// point is part of the requested geometry but never a POI.
    async fn route_with_starting_point(
        &self,
        ordered_pois: &[Poi],
        mode: TransportMode,
        start: Coordinates,
        is_round_trip: bool,
    ) -> Route {
        let mut waypoints = Vec::with_capacity(ordered_pois.len() + 2);
        waypoints.push(start);
        waypoints.extend(ordered_pois.iter().map(|p| p.coordinates));
        if is_round_trip {
            waypoints.push(start);
        }

        match self.fetch_route(&waypoints, mode).await {
            Some(osrm) => {
                let total_distance = osrm.distance.round() as u32;
                Route {
                    ordered_pois: ordered_pois.to_vec(),
                    polyline: osrm.geometry,
                    total_distance,
                    total_duration: duration_for(total_distance, mode.nominal_speed_kmh()),
                    transport_mode: mode,
                    legs: Vec::new(),
                    starting_point: None,
                    is_round_trip: false,
                }
            }
            None => {
                tracing::info!("Routing backend failed, using haversine fallback");
                fallback_route(ordered_pois.to_vec(), mode, Some(start), is_round_trip)
            }
        }
    }
}

fn duration_for(distance_m: u32, speed_kmh: f64) -> u32 {
    (distance_m as f64 / 1000.0 / speed_kmh * 3600.0).round() as u32
}

/// Synthesize a route from straight-line distances at the mode's nominal
/// speed. The polyline stays empty; the request still succeeds.
pub fn fallback_route(
    ordered_pois: Vec<Poi>,
    mode: TransportMode,
    starting_point: Option<Coordinates>,
    is_round_trip: bool,
) -> Route {
    let mut total_km = 0.0;

    if let (Some(start), Some(first)) = (starting_point.as_ref(), ordered_pois.first()) {
        total_km += start.distance_to(&first.coordinates);
    }
    for pair in ordered_pois.windows(2) {
        total_km += pair[0].coordinates.distance_to(&pair[1].coordinates);
    }
    if is_round_trip {
        if let (Some(start), Some(last)) = (starting_point.as_ref(), ordered_pois.last()) {
            total_km += last.coordinates.distance_to(start);
        }
    }

    let total_distance = (total_km * 1000.0).round() as u32;

    Route {
        ordered_pois,
        polyline: String::new(),
        total_distance,
        total_duration: duration_for(total_distance, mode.nominal_speed_kmh()),
        transport_mode: mode,
        legs: Vec::new(),
        starting_point,
        is_round_trip,
    }
}

/// Walk the ordered tour accumulating inter-stop travel time and stop
/// including POIs once the budget is exceeded.
fn trim_to_time_limit(
    ordered_pois: Vec<Poi>,
    matrix: &DistanceMatrix,
    order: &[usize],
    time_limit_seconds: f64,
) -> Vec<Poi> {
    if ordered_pois.len() <= 1 {
        return ordered_pois;
    }

    let mut total_time = 0.0;
    let mut kept = 1;

    for i in 1..order.len() {
        let travel = matrix.durations[order[i - 1]][order[i]];
        if total_time + travel <= time_limit_seconds {
            total_time += travel;
            kept += 1;
        } else {
            break;
        }
    }

    let mut trimmed = ordered_pois;
    trimmed.truncate(kept);
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poi(name: &str, lat: f64, lng: f64) -> Poi {
        Poi::new(
            format!("osm_node_{}", name),
            name.to_string(),
            Coordinates::new(lat, lng).unwrap(),
            format!("https://maps.example/{}", name),
        )
    }

    /// Matrix where travel time equals index distance on a line; makes the
    /// optimal order obvious.
    fn line_matrix(n: usize) -> DistanceMatrix {
        let pois: Vec<Poi> = (0..n)
            .map(|i| poi(&format!("p{}", i), 48.0 + i as f64 * 0.01, 2.0))
            .collect();
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
        DistanceMatrix {
            pois,
            distances,
            durations,
        }
    }

    #[test]
    fn trivial_orders() {
        let matrix = line_matrix(1);
        assert_eq!(optimize_order(&matrix, None), vec![0]);

        let matrix = line_matrix(2);
        assert_eq!(optimize_order(&matrix, None), vec![0, 1]);
        assert_eq!(optimize_order(&matrix, Some(1)), vec![1, 0]);
    }

    #[test]
    fn optimizer_finds_line_order() {
        let matrix = line_matrix(5);
        let order = optimize_order(&matrix, None);
        // Either direction along the line is optimal
        assert!(order == vec![0, 1, 2, 3, 4] || order == vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn optimizer_respects_start_index() {
        let matrix = line_matrix(5);
        let order = optimize_order(&matrix, Some(2));
        assert_eq!(order[0], 2);
        assert_eq!(order.len(), 5);
        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn two_opt_never_worse_than_nearest_neighbor() {
        // Cross pattern where plain nearest-neighbor picks a crossing tour
        let pois: Vec<Poi> = vec![
            poi("a", 48.00, 2.00),
            poi("b", 48.10, 2.10),
            poi("c", 48.00, 2.10),
            poi("d", 48.10, 2.00),
            poi("e", 48.05, 2.20),
        ];
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
        let matrix = DistanceMatrix {
            pois,
            distances,
            durations,
        };

        for start in 0..n {
            let nn = nearest_neighbor_tour(&matrix, start);
            let improved = two_opt_improve(&matrix, nn.clone());
            assert!(
                tour_duration(&matrix, &improved) <= tour_duration(&matrix, &nn) + 1e-9,
                "2-opt must not worsen the tour from start {}",
                start
            );
        }
    }

    #[test]
    fn optimizer_is_deterministic() {
        let matrix = line_matrix(7);
        let a = optimize_order(&matrix, None);
        let b = optimize_order(&matrix, None);
        assert_eq!(a, b);
    }

    #[test]
    fn nearest_poi_to_point() {
        let pois = vec![
            poi("far", 48.9, 2.0),
            poi("near", 48.01, 2.0),
            poi("mid", 48.5, 2.0),
        ];
        let start = Coordinates::new(48.0, 2.0).unwrap();
        assert_eq!(nearest_poi_index(&pois, &start), Some(1));
        assert_eq!(nearest_poi_index(&[], &start), None);
    }

    #[test]
    fn trim_stops_at_budget() {
        let matrix = line_matrix(5);
        let order = vec![0, 1, 2, 3, 4];
        let ordered: Vec<Poi> = order.iter().map(|&i| matrix.pois[i].clone()).collect();

        // Each hop is 720s; a 1500s budget fits two hops (three POIs)
        let trimmed = trim_to_time_limit(ordered.clone(), &matrix, &order, 1500.0);
        assert_eq!(trimmed.len(), 3);

        // A generous budget keeps everything
        let all = trim_to_time_limit(ordered, &matrix, &order, 1e9);
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn fallback_route_totals() {
        let pois = vec![poi("a", 48.0, 2.0), poi("b", 48.1, 2.0)];
        let route = fallback_route(pois, TransportMode::Walking, None, false);

        // ~11.1km at 5 km/h
        assert!((route.total_distance as f64 - 11_120.0).abs() < 100.0);
        let expected_secs = route.total_distance as f64 / 1000.0 / 5.0 * 3600.0;
        assert!((route.total_duration as f64 - expected_secs).abs() < 2.0);
        assert!(route.polyline.is_empty());
        assert!(!route.is_round_trip);
    }

    #[test]
    fn fallback_round_trip_includes_return_leg() {
        let pois = vec![poi("a", 48.1, 2.0)];
        let start = Coordinates::new(48.0, 2.0).unwrap();
        let one_way = fallback_route(pois.clone(), TransportMode::Walking, Some(start), false);
        let round = fallback_route(pois, TransportMode::Walking, Some(start), true);
        assert!(round.total_distance > one_way.total_distance);
        assert!(round.is_round_trip);
        assert_eq!(round.starting_point, Some(start));
    }

    #[test]
    fn matrix_shape_for_singleton() {
        let matrix = line_matrix(1);
        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix.distances, vec![vec![0.0]]);
        assert_eq!(matrix.durations, vec![vec![0.0]]);
    }
}
