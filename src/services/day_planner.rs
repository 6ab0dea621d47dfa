use crate::constants::{MAX_POIS_PER_DAY, MIN_POIS_PER_DAY};
use crate::models::{Coordinates, DayPlan, Poi, TimeConstraint};
use std::collections::HashMap;

/// Number of days implied by a time constraint (1 when absent).
pub fn num_days(time_constraint: Option<TimeConstraint>) -> usize {
    time_constraint.map(|tc| tc.num_days()).unwrap_or(1)
}

/// Distribute POIs into balanced day plans.
///
/// Each day targets 3-10 stops: fewer feels empty, more is exhausting.
/// When `preserve_order` is set the incoming order is kept (the POIs are
/// already route-optimized); otherwise POIs are chained by geographic
/// proximity first so each day stays walkable. Leftovers go round-robin to
/// the emptiest day; a final force-assign may push one day past the cap
/// rather than drop a stop.
pub fn organize_pois_into_days(
    pois: &[Poi],
    num_days: usize,
    preserve_order: bool,
) -> Vec<DayPlan> {
    if pois.is_empty() {
        return Vec::new();
    }

    if num_days <= 1 {
        let day_pois: Vec<Poi> = pois.iter().take(MAX_POIS_PER_DAY).cloned().collect();
        let total_visit_time = visit_minutes(&day_pois);
        return vec![DayPlan {
            day_number: 1,
            theme: Some("City Exploration".to_string()),
            pois: day_pois,
            route: None,
            total_visit_time_minutes: total_visit_time,
            total_walking_km: 0.0,
        }];
    }

    let sorted_pois: Vec<Poi> = if preserve_order {
        pois.to_vec()
    } else {
        sort_pois_geographically(pois)
    };

    let mut day_plans: Vec<DayPlan> = Vec::new();
    let mut remaining: Vec<Poi> = sorted_pois;

    for day_num in 1..=num_days {
        if remaining.is_empty() {
            break;
        }

        let remaining_days = num_days - day_num + 1;
        let take = remaining.len().div_ceil(remaining_days);
        let take = take
            .clamp(MIN_POIS_PER_DAY, MAX_POIS_PER_DAY)
            .min(remaining.len());

        let day_pois: Vec<Poi> = remaining.drain(..take).collect();
        let total_visit_time = visit_minutes(&day_pois);

        day_plans.push(DayPlan {
            day_number: day_num,
            theme: Some(day_theme(&day_pois)),
            pois: day_pois,
            route: None,
            total_visit_time_minutes: total_visit_time,
            total_walking_km: 0.0,
        });
    }

    // Leftovers: round-robin onto the emptiest days, opening new days
    // while allowed, force-assigning past the cap as the last resort
    while let Some(poi) = remaining.first().cloned() {
        let min_day_idx = day_plans
            .iter()
            .enumerate()
            .min_by_key(|(_, day)| day.pois.len())
            .map(|(i, _)| i)
            .unwrap_or(0);

        if day_plans[min_day_idx].pois.len() < MAX_POIS_PER_DAY {
            remaining.remove(0);
            day_plans[min_day_idx].total_visit_time_minutes += poi.visit_minutes_or_default();
            day_plans[min_day_idx].pois.push(poi);
        } else if day_plans.len() < num_days {
            let take = remaining.len().min(MAX_POIS_PER_DAY);
            let day_pois: Vec<Poi> = remaining.drain(..take).collect();
            let total_visit_time = visit_minutes(&day_pois);
            day_plans.push(DayPlan {
                day_number: day_plans.len() + 1,
                theme: Some(day_theme(&day_pois)),
                pois: day_pois,
                route: None,
                total_visit_time_minutes: total_visit_time,
                total_walking_km: 0.0,
            });
        } else {
            remaining.remove(0);
            day_plans[min_day_idx].total_visit_time_minutes += poi.visit_minutes_or_default();
            day_plans[min_day_idx].pois.push(poi);
        }
    }

    for (i, day) in day_plans.iter_mut().enumerate() {
        day.day_number = i + 1;
    }

    day_plans
}

fn visit_minutes(pois: &[Poi]) -> u32 {
    pois.iter().map(Poi::visit_minutes_or_default).sum()
}

/// Chain POIs by proximity: start from the one nearest the centroid, then
/// greedy nearest neighbor. Keeps each day's stops geographically close.
pub fn sort_pois_geographically(pois: &[Poi]) -> Vec<Poi> {
    if pois.len() <= 1 {
        return pois.to_vec();
    }

    let avg_lat = pois.iter().map(|p| p.coordinates.lat).sum::<f64>() / pois.len() as f64;
    let avg_lng = pois.iter().map(|p| p.coordinates.lng).sum::<f64>() / pois.len() as f64;
    let centroid = Coordinates {
        lat: avg_lat,
        lng: avg_lng,
    };

    let mut remaining: Vec<Poi> = pois.to_vec();
    let mut sorted = Vec::with_capacity(pois.len());

    let start_idx = nearest_index(&remaining, &centroid);
    sorted.push(remaining.remove(start_idx));

    while !remaining.is_empty() {
        let last_coords = sorted[sorted.len() - 1].coordinates;
        let nearest = nearest_index(&remaining, &last_coords);
        sorted.push(remaining.remove(nearest));
    }

    sorted
}

fn nearest_index(pois: &[Poi], point: &Coordinates) -> usize {
    pois.iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            point
                .distance_to(&a.coordinates)
                .partial_cmp(&point.distance_to(&b.coordinates))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Theme for a day from a majority vote over POI types.
pub fn day_theme(pois: &[Poi]) -> String {
    if pois.is_empty() {
        return "Exploration".to_string();
    }

    let mut type_counts: HashMap<&str, usize> = HashMap::new();
    for poi in pois {
        if let Some(types) = &poi.types {
            for t in types {
                *type_counts.entry(t.as_str()).or_insert(0) += 1;
            }
        }
    }

    if type_counts.is_empty() {
        return "City Exploration".to_string();
    }

    // Ties break toward the lexically-smaller type so theming is stable
    let top_type = type_counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(a.0)))
        .map(|(t, _)| t)
        .unwrap_or("");

    match top_type {
        "museum" => "Art & Museums",
        "church" => "Historic Churches",
        "landmark" => "Famous Landmarks",
        "park" => "Parks & Gardens",
        "palace" => "Royal Palaces",
        "square" => "Historic Squares",
        "market" => "Markets & Shopping",
        "viewpoint" => "Scenic Views",
        "cafe" => "Cafes & Culture",
        "bar" => "Nightlife",
        _ => "City Exploration",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poi_at(name: &str, lat: f64, lng: f64, poi_type: &str) -> Poi {
        let mut poi = Poi::new(
            format!("osm_node_{}", name),
            name.to_string(),
            Coordinates::new(lat, lng).unwrap(),
            format!("https://maps.example/{}", name),
        );
        poi.types = Some(vec![poi_type.to_string()]);
        poi.visit_duration_minutes = Some(60);
        poi
    }

    fn make_pois(count: usize) -> Vec<Poi> {
        (0..count)
            .map(|i| {
                poi_at(
                    &format!("poi{}", i),
                    48.0 + (i as f64) * 0.005,
                    2.0 + (i as f64 % 3.0) * 0.01,
                    "landmark",
                )
            })
            .collect()
    }

    #[test]
    fn empty_input_gives_no_days() {
        assert!(organize_pois_into_days(&[], 3, false).is_empty());
    }

    #[test]
    fn single_day_caps_at_ten() {
        let pois = make_pois(14);
        let days = organize_pois_into_days(&pois, 1, true);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].pois.len(), 10);
        assert_eq!(days[0].day_number, 1);
        assert_eq!(days[0].total_visit_time_minutes, 600);
    }

    #[test]
    fn multi_day_balanced_distribution() {
        let pois = make_pois(24);
        let days = organize_pois_into_days(&pois, 3, true);
        assert_eq!(days.len(), 3);
        for day in &days {
            assert!(day.pois.len() >= MIN_POIS_PER_DAY);
            assert!(day.pois.len() <= MAX_POIS_PER_DAY);
        }
        let total: usize = days.iter().map(|d| d.pois.len()).sum();
        assert_eq!(total, 24);
    }

    #[test]
    fn day_concatenation_preserves_input_order() {
        let pois = make_pois(20);
        let days = organize_pois_into_days(&pois, 2, true);
        let flattened: Vec<String> = days
            .iter()
            .flat_map(|d| d.pois.iter().map(|p| p.name.clone()))
            .collect();
        let original: Vec<String> = pois.iter().map(|p| p.name.clone()).collect();
        assert_eq!(flattened, original);
    }

    #[test]
    fn days_are_renumbered_sequentially() {
        let pois = make_pois(25);
        let days = organize_pois_into_days(&pois, 5, true);
        for (i, day) in days.iter().enumerate() {
            assert_eq!(day.day_number, i + 1);
        }
    }

    #[test]
    fn small_set_uses_fewer_days() {
        // 4 POIs over 3 days: one day of 3, residual day of 1
        let pois = make_pois(4);
        let days = organize_pois_into_days(&pois, 3, true);
        let total: usize = days.iter().map(|d| d.pois.len()).sum();
        assert_eq!(total, 4);
        assert!(days.len() <= 3);
        for day in &days[..days.len() - 1] {
            assert!(day.pois.len() >= MIN_POIS_PER_DAY);
        }
    }

    #[test]
    fn overflow_force_assigns_past_cap() {
        // 21 POIs into 2 days cannot respect the cap of 10
        let pois = make_pois(21);
        let days = organize_pois_into_days(&pois, 2, true);
        assert_eq!(days.len(), 2);
        let total: usize = days.iter().map(|d| d.pois.len()).sum();
        assert_eq!(total, 21, "no POI may be dropped");
        assert!(days.iter().any(|d| d.pois.len() > MAX_POIS_PER_DAY));
    }

    #[test]
    fn geographic_sort_chains_neighbors() {
        // Points on one parallel at lng 2.0, 2.05, 2.15, 2.5. The centroid
        // sits at 2.175, so the chain starts at "c" and walks c -> b -> a
        // before crossing to the outlier "d".
        let pois = vec![
            poi_at("a", 48.0, 2.00, "landmark"),
            poi_at("d", 48.0, 2.50, "landmark"),
            poi_at("c", 48.0, 2.15, "landmark"),
            poi_at("b", 48.0, 2.05, "landmark"),
        ];
        let sorted = sort_pois_geographically(&pois);
        let names: Vec<&str> = sorted.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b", "a", "d"]);
    }

    #[test]
    fn theme_majority_vote() {
        let pois = vec![
            poi_at("a", 48.0, 2.0, "museum"),
            poi_at("b", 48.0, 2.0, "museum"),
            poi_at("c", 48.0, 2.0, "park"),
        ];
        assert_eq!(day_theme(&pois), "Art & Museums");

        let bars = vec![poi_at("x", 48.0, 2.0, "bar")];
        assert_eq!(day_theme(&bars), "Nightlife");

        let unknown = vec![poi_at("y", 48.0, 2.0, "something_odd")];
        assert_eq!(day_theme(&unknown), "City Exploration");

        assert_eq!(day_theme(&[]), "Exploration");
    }

    #[test]
    fn num_days_mapping() {
        assert_eq!(num_days(None), 1);
        assert_eq!(num_days(Some(TimeConstraint::Day)), 1);
        assert_eq!(num_days(Some(TimeConstraint::ThreeDays)), 3);
    }
}
