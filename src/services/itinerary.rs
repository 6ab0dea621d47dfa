use crate::cache::{discover_cache_key, food_cache_key, poi_cache_key, CacheService};
use crate::constants::*;
use crate::error::{AppError, Result};
use crate::models::{
    Coordinates, DayPlan, Itinerary, Poi, Route, TimeConstraint, TransportMode, Warning,
};
use crate::services::day_planner::{self, organize_pois_into_days};
use crate::services::geocoder::{maps_search_url, GeocoderService};
use crate::services::llm::ReasoningService;
use crate::services::optimizer::RouteOptimizerService;
use crate::services::overpass::OverpassService;
use crate::services::wikipedia::WikipediaService;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Interests the model handles best: it knows what is famous and notable.
const LLM_INTERESTS: &[&str] = &[
    "landmarks",
    "history",
    "museums",
    "churches",
    "architecture",
    "culture",
    "art",
    "sightseeing",
    "monuments",
    "castles",
    "palaces",
    "religious",
    "temples",
    "mosques",
    "cathedrals",
    "historic",
    "parks",
    "gardens",
    "nature",
    "viewpoints",
    "famous cafes",
    "famous restaurants",
    "local food",
    "local cuisine",
];

/// Interests where live venue data beats model knowledge: a bar that
/// closed last month must not appear in the itinerary.
const SPATIAL_INTERESTS: &[&str] = &[
    "cafes",
    "coffee",
    "cafe",
    "restaurants",
    "food",
    "dining",
    "bars",
    "nightlife",
    "clubs",
    "nightclub",
    "pub",
    "pubs",
    "shopping",
    "markets",
];

/// Decide which fan-out arms to run: (use_llm, use_spatial). Both may be
/// true for mixed interests; empty or unrecognized input defaults to the
/// model path.
pub fn classify_interests(interests: Option<&[String]>) -> (bool, bool) {
    let Some(interests) = interests.filter(|i| !i.is_empty()) else {
        return (true, false);
    };

    let lower: HashSet<String> = interests.iter().map(|i| i.to_lowercase()).collect();
    let has_llm = lower.iter().any(|i| LLM_INTERESTS.contains(&i.as_str()));
    let has_spatial = lower.iter().any(|i| SPATIAL_INTERESTS.contains(&i.as_str()));

    if !has_llm && !has_spatial {
        return (true, false);
    }
    (has_llm, has_spatial)
}

/// A synthetic POI for the user's starting location (geolocation or map click).
pub fn poi_from_coordinates(coordinates: Coordinates, name: &str) -> Poi {
    let mut poi = Poi::new(
        "starting_location".to_string(),
        name.to_string(),
        coordinates,
        maps_search_url(&format!("{},{}", coordinates.lat, coordinates.lng)),
    )
    .with_confidence(1.0);
    poi.address = Some(format!("{:.6}, {:.6}", coordinates.lat, coordinates.lng));
    poi.types = Some(vec!["starting_point".to_string()]);
    poi
}

/// Build a Google Maps directions deep link with waypoints. Free URL
/// construction, no API key; coordinates keep the link unambiguous.
pub fn build_google_maps_url(
    pois: &[Poi],
    mode: TransportMode,
    round_trip: bool,
    starting_point: Option<Coordinates>,
) -> String {
    if pois.is_empty() {
        return String::new();
    }

    let coord = |poi: &Poi| format!("{},{}", poi.coordinates.lat, poi.coordinates.lng);

    let (origin, destination, waypoints): (String, String, Vec<String>) = match starting_point {
        Some(start) => {
            let origin = format!("{},{}", start.lat, start.lng);
            if round_trip {
                (origin.clone(), origin, pois.iter().map(coord).collect())
            } else {
                (
                    origin,
                    coord(&pois[pois.len() - 1]),
                    pois[..pois.len() - 1].iter().map(coord).collect(),
                )
            }
        }
        None => {
            let origin = coord(&pois[0]);
            if round_trip && pois.len() > 1 {
                (origin.clone(), origin, pois[1..].iter().map(coord).collect())
            } else if pois.len() > 2 {
                (
                    origin,
                    coord(&pois[pois.len() - 1]),
                    pois[1..pois.len() - 1].iter().map(coord).collect(),
                )
            } else {
                (origin, coord(&pois[pois.len() - 1]), Vec::new())
            }
        }
    };

    let mut url = format!(
        "https://www.google.com/maps/dir/?api=1&origin={}&destination={}&travelmode={}",
        origin, destination, mode
    );
    if !waypoints.is_empty() {
        url.push_str("&waypoints=");
        url.push_str(&urlencoding::encode(&waypoints.join("|")));
    }
    url
}

/// Template-based explanation of the assembled route. Deterministic and
/// instant; the model is not in the latency path here.
pub fn build_explanation(
    city: &str,
    mode: TransportMode,
    route: &Route,
    num_days: usize,
    has_starting_point: bool,
) -> String {
    let distance_km = route.total_distance as f64 / 1000.0;
    let duration_mins = route.total_duration / 60;
    let stop_names: Vec<&str> = route
        .ordered_pois
        .iter()
        .take(3)
        .map(|p| p.name.as_str())
        .collect();
    let mut stops_preview = stop_names.join(", ");
    if route.ordered_pois.len() > 3 {
        stops_preview.push_str(&format!(" and {} more", route.ordered_pois.len() - 3));
    }

    match (has_starting_point, num_days > 1) {
        (true, true) => format!(
            "Your {}-day {} adventure in {} covers {} amazing stops including {}. Each day starts and ends at your location. Total distance: {:.1}km.",
            num_days, mode, city, route.ordered_pois.len(), stops_preview, distance_km
        ),
        (true, false) => format!(
            "Starting from your location, this {} tour of {} takes you through {} amazing stops including {}, then returns you back. Total distance: {:.1}km (~{} minutes).",
            mode, city, route.ordered_pois.len(), stops_preview, distance_km, duration_mins
        ),
        (false, true) => format!(
            "Your {}-day {} adventure in {} covers {} amazing stops including {}. Total distance: {:.1}km.",
            num_days, mode, city, route.ordered_pois.len(), stops_preview, distance_km
        ),
        (false, false) => format!(
            "Your {} tour of {} takes you through {} amazing stops including {}. Total distance: {:.1}km (~{} minutes).",
            mode, city, route.ordered_pois.len(), stops_preview, distance_km, duration_mins
        ),
    }
}

/// Parameters for the full itinerary pipeline.
#[derive(Debug, Clone)]
pub struct ItineraryParams {
    pub location: String,
    pub transport_mode: TransportMode,
    pub interests: Option<Vec<String>>,
    pub time_available: Option<TimeConstraint>,
    pub starting_location: Option<String>,
    pub starting_coordinates: Option<Coordinates>,
}

/// The orchestrator: classifies intent, fans out to the model and spatial
/// paths, reconciles their partial outputs into a validated POI set, and
/// packages the optimized result.
pub struct ItineraryService {
    llm: Arc<ReasoningService>,
    geocoder: Arc<GeocoderService>,
    overpass: Arc<OverpassService>,
    wikipedia: Arc<WikipediaService>,
    optimizer: Arc<RouteOptimizerService>,
    cache: Arc<CacheService>,
}

impl ItineraryService {
    pub fn new(
        llm: Arc<ReasoningService>,
        geocoder: Arc<GeocoderService>,
        overpass: Arc<OverpassService>,
        wikipedia: Arc<WikipediaService>,
        optimizer: Arc<RouteOptimizerService>,
        cache: Arc<CacheService>,
    ) -> Self {
        ItineraryService {
            llm,
            geocoder,
            overpass,
            wikipedia,
            optimizer,
            cache,
        }
    }

    /// Full pipeline: interpret -> resolve start -> fan out -> dedupe ->
    /// rank/truncate -> enrich -> optimize -> partition -> package.
    pub async fn create_itinerary(
        &self,
        params: &ItineraryParams,
    ) -> Result<(Itinerary, Vec<Warning>)> {
        let mut warnings: Vec<Warning> = Vec::new();

        // 1. Parse the city out of the free-text location
        let query = self
            .llm
            .interpret_user_input(&params.location, params.interests.as_deref())
            .await;
        let city = query.city;
        tracing::info!("City parsed: {}", city);

        let city_info = self.geocoder.resolve_city(&city).await;
        let city_center = city_info.as_ref().map(|info| info.center);

        // 2. Starting location: coordinates beat an address string
        let starting_poi: Option<Poi> = if let Some(coords) = params.starting_coordinates {
            Some(poi_from_coordinates(
                coords,
                params.starting_location.as_deref().unwrap_or("My Location"),
            ))
        } else if let Some(address) = params
            .starting_location
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let geocoded = self.geocoder.geocode_address(address, &city).await;
            if geocoded.is_none() {
                warnings.push(Warning::new(
                    "STARTING_LOCATION_NOT_FOUND",
                    "Could not find your starting location. Route will start from the first attraction.",
                    Vec::new(),
                ));
            }
            geocoded
        } else {
            None
        };

        // 3. Pick fan-out arms
        let (use_llm, use_spatial) = classify_interests(params.interests.as_deref());
        tracing::info!("Fan-out: llm={}, spatial={}", use_llm, use_spatial);

        // 4. Run both arms concurrently; each arm recovers to empty on its own
        let llm_arm = async {
            if !use_llm {
                return Vec::new();
            }
            let llm_interests = filter_interests(params.interests.as_deref(), LLM_INTERESTS);
            let suggestions = self
                .llm
                .suggest_landmarks(
                    &city,
                    llm_interests.as_deref(),
                    params.transport_mode,
                    params.time_available,
                    city_center,
                )
                .await;
            tracing::info!("Got {} suggestions from the model", suggestions.len());
            self.geocoder
                .lookup_landmarks(&suggestions, &city, None)
                .await
        };

        let spatial_arm = async {
            if !use_spatial {
                return Vec::new();
            }
            let Some(info) = city_info.as_ref() else {
                tracing::info!("No city bbox available, skipping spatial path");
                return Vec::new();
            };
            let spatial_interests =
                filter_interests(params.interests.as_deref(), SPATIAL_INTERESTS);
            let places = self
                .overpass
                .query_pois(&info.bbox, spatial_interests.as_deref(), 20)
                .await;
            tracing::info!("Got {} places from the spatial query", places.len());
            places
                .iter()
                .map(|place| self.overpass.to_poi(place, &city))
                .collect()
        };

        let (llm_pois, spatial_pois) = tokio::join!(llm_arm, spatial_arm);

        // 5. Merge and deduplicate; model results come first by contract
        let mut pois = dedupe_by_name(llm_pois.into_iter().chain(spatial_pois));
        tracing::info!("POIs after dedup: {}", pois.len());

        if pois.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "No places found for: {}",
                params.location
            )));
        }

        // 6. Truncate to the time budget, ranking by relevance first when
        // the user told us what they care about
        let max_pois = params
            .time_available
            .map(|tc| tc.max_pois())
            .unwrap_or(MAX_POIS_PER_DAY);
        if let Some(interests) = params.interests.as_deref().filter(|i| !i.is_empty()) {
            if pois.len() > max_pois {
                let ranked = self.llm.rank_pois(&pois, interests).await;
                pois = ranked.into_iter().take(max_pois).map(|r| r.poi).collect();
            }
        }
        pois.truncate(max_pois);
        tracing::info!("Final POI count: {}", pois.len());

        // 7. Image enrichment, best-effort and parallel
        self.enrich_with_images(&mut pois, &city, 1).await;

        // 8. Surface partial data as a warning, not an error
        let partial: Vec<String> = pois
            .iter()
            .filter(|p| p.opening_hours.is_none())
            .map(|p| p.place_id.clone())
            .collect();
        if !partial.is_empty() {
            warnings.push(Warning::new(
                "PARTIAL_DATA",
                "Opening hours not available for some places",
                partial,
            ));
        }

        // 9. Optimize the tour; a starting point implies a round trip
        let starting_coords = starting_poi.as_ref().map(|p| p.coordinates);
        let route = self
            .optimizer
            .create_optimized_route(
                &pois,
                params.transport_mode,
                params.time_available,
                starting_coords,
                starting_coords.is_some(),
                false,
            )
            .await?;

        let num_days = day_planner::num_days(params.time_available);
        let explanation = build_explanation(
            &city,
            params.transport_mode,
            &route,
            num_days,
            starting_poi.is_some(),
        );
        let google_maps_url = build_google_maps_url(
            &route.ordered_pois,
            params.transport_mode,
            starting_poi.is_some(),
            starting_coords,
        );

        // 10. Multi-day trips get per-day plans with their own geometry
        let days = if num_days > 1 {
            Some(
                self.build_day_plans(&route.ordered_pois, num_days, params.transport_mode)
                    .await,
            )
        } else {
            None
        };

        let itinerary = Itinerary {
            id: Uuid::new_v4(),
            city,
            pois: route.ordered_pois.clone(),
            route,
            created_at: time::OffsetDateTime::now_utc(),
            transport_mode: params.transport_mode,
            time_constraint: params.time_available,
            ai_explanation: Some(explanation),
            starting_location: if starting_poi.is_some() {
                params.starting_location.clone()
            } else {
                None
            },
            google_maps_url: Some(google_maps_url),
            days,
            total_days: num_days,
        };

        Ok((itinerary, warnings))
    }

    /// Cached POI discovery without routing.
    pub async fn discover(
        &self,
        city: &str,
        interests: Option<&[String]>,
        limit: usize,
    ) -> Result<(Vec<Poi>, bool)> {
        let key = discover_cache_key(city, limit, interests);
        if let Some(cached) = self.cache.get::<Vec<Poi>>(&key).await {
            tracing::info!("Discover cache hit: {}", key);
            return Ok((cached, true));
        }

        let city_center = self.geocoder.resolve_city(city).await.map(|i| i.center);
        let suggestions = self
            .llm
            .suggest_landmarks(city, interests, TransportMode::Walking, None, city_center)
            .await;

        let mut pois = self
            .geocoder
            .lookup_landmarks(
                &suggestions,
                city,
                Some(DISCOVER_MAX_DISTANCE_FROM_CENTER_KM),
            )
            .await;

        if pois.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "No places found for: {}",
                city
            )));
        }

        pois.truncate(limit);
        self.enrich_with_images(&mut pois, city, MAX_IMAGES_PER_POI)
            .await;

        self.cache.set_default_ttl(&key, &pois).await;
        Ok((pois, false))
    }

    /// Cached famous-food discovery: the model names iconic venues, the
    /// spatial source confirms they exist; spatial famous-places fill in
    /// when nothing validates.
    pub async fn discover_food(
        &self,
        city: &str,
        category: &str,
        limit: usize,
    ) -> Result<(Vec<Poi>, bool)> {
        let key = food_cache_key(city, category, limit);
        if let Some(cached) = self.cache.get::<Vec<Poi>>(&key).await {
            tracing::info!("Food discover cache hit: {}", key);
            return Ok((cached, true));
        }

        let city_info = self.geocoder.resolve_city(city).await.ok_or_else(|| {
            AppError::InvalidInput(format!("Unknown city: {}", city))
        })?;

        let suggestions = self
            .llm
            .suggest_food_and_drinks(city, category, limit)
            .await;

        let bbox = city_info.bbox;
        let validations = suggestions.iter().map(|suggestion| async move {
            let place = self
                .overpass
                .validate_place_exists(&suggestion.name, &bbox, &suggestion.category)
                .await?;
            Some((suggestion, place))
        });
        let validated = futures::future::join_all(validations).await;

        let mut pois: Vec<Poi> = Vec::new();
        for (suggestion, place) in validated.into_iter().flatten() {
            let mut poi = self.overpass.to_poi(&place, city);
            poi.visit_duration_minutes = Some((suggestion.visit_duration_hours * 60.0) as u32);
            if !suggestion.why_visit.is_empty() {
                poi.why_visit = Some(if suggestion.specialty.is_empty() {
                    suggestion.why_visit.clone()
                } else {
                    format!("{} Try: {}.", suggestion.why_visit, suggestion.specialty)
                });
            }
            pois.push(poi);
        }
        pois = dedupe_by_name(pois.into_iter());

        if pois.is_empty() {
            tracing::info!("No validated {} suggestions, falling back to notable venues", category);
            let singular = category.trim_end_matches('s');
            pois = self
                .overpass
                .get_famous_places(&city_info.bbox, singular, limit)
                .await
                .iter()
                .map(|place| self.overpass.to_poi(place, city))
                .collect();
        }

        if pois.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "No {} found in {}",
                category, city
            )));
        }

        pois.truncate(limit);
        self.cache.set_default_ttl(&key, &pois).await;
        Ok((pois, false))
    }

    /// Build an itinerary from caller-provided POIs: no fetching, but the
    /// tour is still optimized, partitioned, and given real geometry.
    pub async fn create_route_from_selection(
        &self,
        city: &str,
        pois: &[Poi],
        transport_mode: TransportMode,
        num_days: usize,
        starting_coordinates: Option<Coordinates>,
    ) -> Result<Itinerary> {
        if pois.is_empty() {
            return Err(AppError::InvalidInput(
                "No POIs provided for route".to_string(),
            ));
        }

        let route = self
            .optimizer
            .create_optimized_route(
                pois,
                transport_mode,
                None,
                starting_coordinates,
                starting_coordinates.is_some(),
                false,
            )
            .await?;

        let num_days = num_days.max(1);
        let days = if num_days > 1 {
            Some(
                self.build_day_plans(&route.ordered_pois, num_days, transport_mode)
                    .await,
            )
        } else {
            None
        };

        let explanation = build_explanation(
            city,
            transport_mode,
            &route,
            num_days,
            starting_coordinates.is_some(),
        );
        let google_maps_url = build_google_maps_url(
            &route.ordered_pois,
            transport_mode,
            starting_coordinates.is_some(),
            starting_coordinates,
        );

        Ok(Itinerary {
            id: Uuid::new_v4(),
            city: city.to_string(),
            pois: route.ordered_pois.clone(),
            route,
            created_at: time::OffsetDateTime::now_utc(),
            transport_mode,
            time_constraint: None,
            ai_explanation: Some(explanation),
            starting_location: None,
            google_maps_url: Some(google_maps_url),
            days,
            total_days: num_days,
        })
    }

    /// Cached single-POI lookup. The endpoint carries no city context, so
    /// keys live under the shared `global` segment.
    pub async fn get_place_details(&self, place_id: &str) -> Result<(Poi, bool)> {
        let key = poi_cache_key("global", place_id);
        if let Some(cached) = self.cache.get::<Poi>(&key).await {
            return Ok((cached, true));
        }

        let poi = self.geocoder.get_place_details(place_id).await?;
        self.cache
            .set(&key, &poi, DEFAULT_POI_CACHE_TTL_SECONDS)
            .await;
        Ok((poi, false))
    }

    /// Attach day routes (geometry only, no reoptimization) to partitioned
    /// day plans. Day-route failures leave the plan without a route.
    async fn build_day_plans(
        &self,
        ordered_pois: &[Poi],
        num_days: usize,
        transport_mode: TransportMode,
    ) -> Vec<DayPlan> {
        let mut day_plans = organize_pois_into_days(ordered_pois, num_days, true);
        tracing::info!(
            "Organized {} POIs into {} days",
            ordered_pois.len(),
            day_plans.len()
        );

        for day in &mut day_plans {
            if day.pois.len() < 2 {
                continue;
            }
            match self
                .optimizer
                .get_route_geometry(&day.pois, transport_mode)
                .await
            {
                Ok(day_route) => {
                    day.total_walking_km = day_route.total_distance as f64 / 1000.0;
                    tracing::debug!(
                        "Day {} route: {}m, polyline: {} chars",
                        day.day_number,
                        day_route.total_distance,
                        day_route.polyline.len()
                    );
                    day.route = Some(day_route);
                }
                Err(e) => {
                    tracing::debug!("Failed to create route for day {}: {}", day.day_number, e);
                }
            }
        }

        day_plans
    }

    /// Look up one image per POI in parallel, skipping food venues (they
    /// rarely have encyclopedia pages). Failures leave photos empty.
    async fn enrich_with_images(&self, pois: &mut [Poi], city: &str, count: usize) {
        let lookups = pois.iter().map(|poi| async move {
            if poi.is_food_venue() {
                return None;
            }
            let images = self
                .wikipedia
                .get_images_for_landmark(&poi.name, city, count)
                .await;
            if images.is_empty() {
                None
            } else {
                Some(images)
            }
        });

        let results = futures::future::join_all(lookups).await;
        for (poi, images) in pois.iter_mut().zip(results) {
            if let Some(images) = images {
                poi.photos = Some(images);
            }
        }
    }
}

fn filter_interests(interests: Option<&[String]>, vocabulary: &[&str]) -> Option<Vec<String>> {
    let interests = interests?;
    let filtered: Vec<String> = interests
        .iter()
        .filter(|i| vocabulary.contains(&i.to_lowercase().as_str()))
        .cloned()
        .collect();
    if filtered.is_empty() {
        // No specific match: let the arm see everything the user said
        Some(interests.to_vec())
    } else {
        Some(filtered)
    }
}

/// Keep the first occurrence of each case-insensitive name.
fn dedupe_by_name<I: Iterator<Item = Poi>>(pois: I) -> Vec<Poi> {
    let mut seen = HashSet::new();
    pois.filter(|poi| seen.insert(poi.name.to_lowercase()))
        .collect()
}
