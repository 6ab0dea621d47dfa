use crate::models::{BoundingBox, Coordinates, OpeningHours, Poi};
use crate::services::geocoder::maps_search_url;
use crate::services::http::{post_form_json_with_retry, HttpClients};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
const OVERPASS_QUERY_TIMEOUT_SECONDS: u32 = 25;
const VALIDATE_QUERY_TIMEOUT_SECONDS: u32 = 8;

/// Map a user interest to OSM tag filters. Wildcard values match any tag
/// value for the key.
fn interest_tags(interest: &str) -> Option<&'static [(&'static str, &'static str)]> {
    let tags: &'static [(&'static str, &'static str)] = match interest {
        // Landmarks & tourism - major religious buildings count as landmarks
        "landmarks" => &[
            ("tourism", "attraction"),
            ("tourism", "viewpoint"),
            ("historic", "monument"),
            ("historic", "memorial"),
            ("historic", "castle"),
            ("man_made", "tower"),
            ("man_made", "bridge"),
            ("building", "tower"),
            ("building", "cathedral"),
            ("amenity", "place_of_worship"),
        ],
        "history" => &[
            ("historic", "*"),
            ("tourism", "museum"),
            ("building", "cathedral"),
            ("building", "church"),
            ("historic", "castle"),
            ("historic", "palace"),
            ("amenity", "place_of_worship"),
        ],
        "architecture" => &[
            ("building", "cathedral"),
            ("building", "church"),
            ("building", "palace"),
            ("tourism", "attraction"),
            ("man_made", "tower"),
            ("man_made", "bridge"),
            ("amenity", "place_of_worship"),
        ],
        // Religious
        "churches" => &[
            ("amenity", "place_of_worship"),
            ("building", "church"),
            ("building", "cathedral"),
            ("building", "chapel"),
        ],
        "religious" => &[
            ("amenity", "place_of_worship"),
            ("building", "mosque"),
            ("building", "synagogue"),
            ("building", "temple"),
        ],
        // Culture
        "museums" => &[("tourism", "museum"), ("tourism", "gallery")],
        "art" => &[
            ("tourism", "museum"),
            ("tourism", "gallery"),
            ("tourism", "artwork"),
        ],
        "culture" => &[
            ("tourism", "museum"),
            ("amenity", "theatre"),
            ("amenity", "arts_centre"),
        ],
        // Nature
        "parks" => &[
            ("leisure", "park"),
            ("leisure", "garden"),
            ("tourism", "viewpoint"),
        ],
        "nature" => &[
            ("leisure", "park"),
            ("leisure", "nature_reserve"),
            ("natural", "*"),
            ("tourism", "viewpoint"),
        ],
        "gardens" => &[("leisure", "garden"), ("tourism", "attraction")],
        // Food & drink
        "cafes" | "coffee" => &[("amenity", "cafe")],
        "restaurants" => &[("amenity", "restaurant")],
        "food" => &[
            ("amenity", "restaurant"),
            ("amenity", "cafe"),
            ("amenity", "fast_food"),
        ],
        // Nightlife
        "nightlife" => &[
            ("amenity", "bar"),
            ("amenity", "pub"),
            ("amenity", "nightclub"),
        ],
        "bars" => &[("amenity", "bar"), ("amenity", "pub")],
        "clubs" => &[("amenity", "nightclub"), ("leisure", "dance")],
        // Shopping
        "markets" => &[("amenity", "marketplace"), ("shop", "mall")],
        "shopping" => &[
            ("shop", "mall"),
            ("shop", "department_store"),
            ("amenity", "marketplace"),
        ],
        // Default fallback
        "sightseeing" => &[
            ("tourism", "attraction"),
            ("tourism", "viewpoint"),
            ("historic", "*"),
            ("man_made", "tower"),
            ("amenity", "place_of_worship"),
        ],
        _ => return None,
    };
    Some(tags)
}

/// General tourism tags used when no interest matches - notable places first.
const DEFAULT_TAGS: &[(&str, &str)] = &[
    ("tourism", "attraction"),
    ("tourism", "museum"),
    ("tourism", "viewpoint"),
    ("historic", "monument"),
    ("historic", "castle"),
    ("historic", "palace"),
    ("building", "cathedral"),
    ("amenity", "place_of_worship"),
    ("leisure", "park"),
    ("man_made", "tower"),
];

/// Raw place data from the spatial tag source.
#[derive(Debug, Clone)]
pub struct OsmPlace {
    pub osm_id: String,
    pub osm_type: String,
    pub name: String,
    pub coordinates: Coordinates,
    pub tags: HashMap<String, String>,
    pub notability: f64,
}

impl OsmPlace {
    pub fn place_id(&self) -> String {
        format!("osm_{}_{}", self.osm_type, self.osm_id)
    }
}

/// Notability from tag signals: wiki references dominate, then building
/// and tourism classes. Random unnamed monuments score near zero so famous
/// places sort first.
pub fn notability_score(tags: &HashMap<String, String>) -> f64 {
    let mut score: f64 = 0.0;

    let has_wiki = tags.contains_key("wikipedia") || tags.contains_key("wikidata");
    if has_wiki {
        score += 0.5;
    }

    match tags.get("building").map(String::as_str) {
        Some("cathedral") => score += 0.4,
        Some("church") | Some("chapel") => score += 0.15,
        Some("castle") | Some("palace") => score += 0.35,
        _ => {}
    }

    match tags.get("tourism").map(String::as_str) {
        Some("attraction") => score += 0.25,
        Some("museum") | Some("viewpoint") => score += 0.2,
        _ => {}
    }

    match tags.get("historic").map(String::as_str) {
        Some("castle") | Some("palace") | Some("fort") => score += 0.3,
        Some("monument") | Some("memorial") => {
            score += if has_wiki { 0.15 } else { 0.02 };
        }
        Some(_) => score += 0.1,
        None => {}
    }

    if tags.get("man_made").map(String::as_str) == Some("tower") {
        score += if has_wiki { 0.35 } else { 0.05 };
    }

    if tags.contains_key("website") || tags.contains_key("contact:website") {
        score += 0.05;
    }

    score.min(1.0)
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    id: i64,
    #[serde(rename = "type")]
    element_type: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}

impl OverpassElement {
    fn coordinates(&self) -> Option<Coordinates> {
        let (lat, lon) = if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            (lat, lon)
        } else if let Some(center) = &self.center {
            (center.lat, center.lon)
        } else {
            return None;
        };
        if lat == 0.0 || lon == 0.0 {
            return None;
        }
        Coordinates::new(lat, lon).ok()
    }
}

/// Client for the Overpass spatial tag-query endpoint. This is the source
/// of real venue data: places that exist, with accurate coordinates.
pub struct OverpassService {
    clients: HttpClients,
}

impl OverpassService {
    pub fn new(clients: HttpClients) -> Self {
        OverpassService { clients }
    }

    /// Query POIs within the city bounding box for a set of interests,
    /// sorted by notability and deduplicated by name.
    pub async fn query_pois(
        &self,
        bbox: &BoundingBox,
        interests: Option<&[String]>,
        limit: usize,
    ) -> Vec<OsmPlace> {
        let mut tags: Vec<(&str, &str)> = Vec::new();
        let mut seen_tags = HashSet::new();

        if let Some(interests) = interests {
            for interest in interests {
                let interest_lower = interest.to_lowercase();
                let matched = interest_tags(&interest_lower).or_else(|| {
                    // Partial matching: "historic sites" still maps to history
                    KNOWN_INTERESTS
                        .iter()
                        .find(|key| interest_lower.contains(*key) || key.contains(&interest_lower))
                        .and_then(|key| interest_tags(key))
                });
                if let Some(matched) = matched {
                    for pair in matched {
                        if seen_tags.insert(*pair) {
                            tags.push(*pair);
                        }
                    }
                }
            }
        }

        if tags.is_empty() {
            tags = DEFAULT_TAGS.to_vec();
        }

        // Request more than needed so notability sorting has material
        let query = build_bbox_query(bbox, &tags, limit * 3);
        tracing::debug!("Overpass query: {}", query);

        let Some(json) = post_form_json_with_retry(
            &self.clients.overpass,
            OVERPASS_URL,
            &[("data", query)],
        )
        .await
        else {
            tracing::warn!("Overpass query failed");
            return Vec::new();
        };

        let response: OverpassResponse = match serde_json::from_value(json) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Failed to parse Overpass response: {}", e);
                return Vec::new();
            }
        };

        let mut places = Vec::new();
        let mut seen_names = HashSet::new();

        for element in response.elements {
            let Some(name) = element.tags.get("name").cloned() else {
                continue;
            };
            if !seen_names.insert(name.to_lowercase()) {
                continue;
            }
            let Some(coordinates) = element.coordinates() else {
                continue;
            };

            let notability = notability_score(&element.tags);
            places.push(OsmPlace {
                osm_id: element.id.to_string(),
                osm_type: element.element_type,
                name,
                coordinates,
                tags: element.tags,
                notability,
            });
        }

        places.sort_by(|a, b| {
            b.notability
                .partial_cmp(&a.notability)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        places.truncate(limit);
        places
    }

    /// Validate that a model-suggested venue exists by matching its name
    /// within the city bbox. Scores exact > substring > regex matches with
    /// bonuses for wiki references and opening hours.
    pub async fn validate_place_exists(
        &self,
        name: &str,
        bbox: &BoundingBox,
        category: &str,
    ) -> Option<OsmPlace> {
        let name_escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
        let (south, west, north, east) = (bbox.south, bbox.west, bbox.north, bbox.east);

        let query = match category {
            "cafe" | "restaurant" | "bar" | "cafes" | "restaurants" | "bars" => format!(
                "[out:json][timeout:{t}];\n(\n\
                 node[\"amenity\"~\"cafe|restaurant|bar|pub\"][\"name\"~\"{n}\",i]({s},{w},{no},{e});\n\
                 way[\"amenity\"~\"cafe|restaurant|bar|pub\"][\"name\"~\"{n}\",i]({s},{w},{no},{e});\n\
                 node[\"tourism\"=\"attraction\"][\"name\"~\"{n}\",i]({s},{w},{no},{e});\n\
                 way[\"tourism\"=\"attraction\"][\"name\"~\"{n}\",i]({s},{w},{no},{e});\n\
                 );\nout center 3;",
                t = VALIDATE_QUERY_TIMEOUT_SECONDS,
                n = name_escaped,
                s = south,
                w = west,
                no = north,
                e = east
            ),
            "park" | "parks" => format!(
                "[out:json][timeout:{t}];\n(\n\
                 node[\"leisure\"~\"park|garden\"][\"name\"~\"{n}\",i]({s},{w},{no},{e});\n\
                 way[\"leisure\"~\"park|garden\"][\"name\"~\"{n}\",i]({s},{w},{no},{e});\n\
                 relation[\"leisure\"~\"park|garden\"][\"name\"~\"{n}\",i]({s},{w},{no},{e});\n\
                 );\nout center 3;",
                t = VALIDATE_QUERY_TIMEOUT_SECONDS,
                n = name_escaped,
                s = south,
                w = west,
                no = north,
                e = east
            ),
            _ => format!(
                "[out:json][timeout:{t}];\n(\n\
                 node[\"name\"~\"{n}\",i]({s},{w},{no},{e});\n\
                 way[\"name\"~\"{n}\",i]({s},{w},{no},{e});\n\
                 );\nout center 3;",
                t = VALIDATE_QUERY_TIMEOUT_SECONDS,
                n = name_escaped,
                s = south,
                w = west,
                no = north,
                e = east
            ),
        };

        let json = post_form_json_with_retry(
            &self.clients.overpass,
            OVERPASS_URL,
            &[("data", query)],
        )
        .await?;

        let response: OverpassResponse = serde_json::from_value(json).ok()?;
        if response.elements.is_empty() {
            tracing::info!("Not found in OSM: {} ({})", name, category);
            return None;
        }

        let mut best: Option<(i32, OverpassElement)> = None;
        for element in response.elements {
            let osm_name = element.tags.get("name").cloned().unwrap_or_default();
            let score = name_match_score(name, &osm_name, &element.tags);
            if best.as_ref().map_or(true, |(s, _)| score > *s) {
                best = Some((score, element));
            }
        }

        let (_, element) = best?;
        let coordinates = element.coordinates()?;
        let name = element
            .tags
            .get("name")
            .cloned()
            .unwrap_or_else(|| name.to_string());
        let notability = notability_score(&element.tags);

        tracing::info!(
            "Validated {}: ({:.4}, {:.4})",
            name,
            coordinates.lat,
            coordinates.lng
        );

        Some(OsmPlace {
            osm_id: element.id.to_string(),
            osm_type: element.element_type,
            name,
            coordinates,
            tags: element.tags,
            notability,
        })
    }

    /// Famous venues of a category: places carrying wiki-reference tags.
    /// Backs food discovery when model suggestions fail validation.
    pub async fn get_famous_places(
        &self,
        bbox: &BoundingBox,
        category: &str,
        limit: usize,
    ) -> Vec<OsmPlace> {
        let tag_filter = match category {
            "restaurant" | "restaurants" => "[\"amenity\"=\"restaurant\"]",
            "bar" | "bars" => "[\"amenity\"~\"bar|pub\"]",
            "park" | "parks" => "[\"leisure\"~\"park|garden\"]",
            _ => "[\"amenity\"=\"cafe\"]",
        };
        let (south, west, north, east) = (bbox.south, bbox.west, bbox.north, bbox.east);

        let query = format!(
            "[out:json][timeout:20];\n(\n\
             node{f}[\"wikidata\"]({s},{w},{n},{e});\n\
             way{f}[\"wikidata\"]({s},{w},{n},{e});\n\
             node{f}[\"wikipedia\"]({s},{w},{n},{e});\n\
             way{f}[\"wikipedia\"]({s},{w},{n},{e});\n\
             );\nout center {count};",
            f = tag_filter,
            s = south,
            w = west,
            n = north,
            e = east,
            count = limit * 2
        );

        let Some(json) = post_form_json_with_retry(
            &self.clients.overpass,
            OVERPASS_URL,
            &[("data", query)],
        )
        .await
        else {
            return Vec::new();
        };

        let response: OverpassResponse = match serde_json::from_value(json) {
            Ok(r) => r,
            Err(e) => {
                tracing::info!("Failed to parse famous-places response: {}", e);
                return Vec::new();
            }
        };

        let mut places = Vec::new();
        let mut seen_names = HashSet::new();
        for element in response.elements {
            let Some(name) = element.tags.get("name").cloned() else {
                continue;
            };
            if !seen_names.insert(name.to_lowercase()) {
                continue;
            }
            let Some(coordinates) = element.coordinates() else {
                continue;
            };
            let notability = notability_score(&element.tags);
            places.push(OsmPlace {
                osm_id: element.id.to_string(),
                osm_type: element.element_type,
                name,
                coordinates,
                tags: element.tags,
                notability,
            });
        }

        places.sort_by(|a, b| {
            b.notability
                .partial_cmp(&a.notability)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        places.truncate(limit);

        tracing::info!("Found {} notable {} venues", places.len(), category);
        places
    }

    /// Convert raw spatial data into a POI (confidence 0.9 - real data).
    pub fn to_poi(&self, place: &OsmPlace, city: &str) -> Poi {
        let tags = &place.tags;

        let opening_hours = tags
            .get("opening_hours")
            .map(|text| OpeningHours::from_display_text(text));

        let mut address_parts: Vec<String> = Vec::new();
        if let Some(street) = tags.get("addr:street") {
            let number = tags.get("addr:housenumber").cloned().unwrap_or_default();
            address_parts.push(format!("{} {}", number, street).trim().to_string());
        }
        if let Some(addr_city) = tags.get("addr:city") {
            address_parts.push(addr_city.clone());
        }
        let address = if address_parts.is_empty() {
            city.to_string()
        } else {
            address_parts.join(", ")
        };

        let mut poi = Poi::new(
            place.place_id(),
            place.name.clone(),
            place.coordinates,
            maps_search_url(&format!("{}, {}", place.name, city)),
        )
        .with_confidence(0.9);
        poi.opening_hours = opening_hours;
        poi.address = Some(address);
        poi.types = Some(vec![category_from_tags(tags)]);
        poi
    }
}

/// Interest keys with a tag mapping, used for partial matching.
const KNOWN_INTERESTS: &[&str] = &[
    "landmarks",
    "history",
    "architecture",
    "churches",
    "religious",
    "museums",
    "art",
    "culture",
    "parks",
    "nature",
    "gardens",
    "cafes",
    "coffee",
    "restaurants",
    "food",
    "nightlife",
    "bars",
    "clubs",
    "markets",
    "shopping",
    "sightseeing",
];

fn build_bbox_query(bbox: &BoundingBox, tags: &[(&str, &str)], limit: usize) -> String {
    let (south, west, north, east) = (bbox.south, bbox.west, bbox.north, bbox.east);
    let mut lines = vec![format!(
        "[out:json][timeout:{}];(",
        OVERPASS_QUERY_TIMEOUT_SECONDS
    )];

    for (key, value) in tags {
        if *value == "*" {
            lines.push(format!(
                "node[\"{key}\"]({south},{west},{north},{east});"
            ));
            lines.push(format!("way[\"{key}\"]({south},{west},{north},{east});"));
        } else {
            lines.push(format!(
                "node[\"{key}\"=\"{value}\"]({south},{west},{north},{east});"
            ));
            lines.push(format!(
                "way[\"{key}\"=\"{value}\"]({south},{west},{north},{east});"
            ));
        }
    }

    lines.push(format!(");out center {};", limit));
    lines.join("\n")
}

fn name_match_score(wanted: &str, actual: &str, tags: &HashMap<String, String>) -> i32 {
    let wanted_lower = wanted.to_lowercase();
    let actual_lower = actual.to_lowercase();

    let mut score = if actual_lower == wanted_lower {
        100
    } else if actual_lower.contains(&wanted_lower) {
        80
    } else if wanted_lower.contains(&actual_lower) && !actual_lower.is_empty() {
        70
    } else {
        50 // The Overpass-side regex already matched
    };

    if tags.contains_key("wikipedia") || tags.contains_key("wikidata") {
        score += 10;
    }
    if tags.contains_key("opening_hours") {
        score += 5;
    }
    score
}

/// Derive a display category from tags, checked in priority order.
pub fn category_from_tags(tags: &HashMap<String, String>) -> String {
    let amenity = tags.get("amenity").map(String::as_str);
    let building = tags.get("building").map(String::as_str);

    match amenity {
        Some("cafe") => return "cafe".to_string(),
        Some("restaurant") => return "restaurant".to_string(),
        Some("bar") | Some("pub") => return "bar".to_string(),
        Some("nightclub") => return "club".to_string(),
        Some("place_of_worship") => {
            return match building {
                Some("mosque") => "mosque".to_string(),
                _ => "church".to_string(),
            };
        }
        _ => {}
    }

    match tags.get("tourism").map(String::as_str) {
        Some("museum") | Some("gallery") => return "museum".to_string(),
        Some("viewpoint") => return "viewpoint".to_string(),
        Some("attraction") => return "landmark".to_string(),
        _ => {}
    }

    if let Some(historic) = tags.get("historic").map(String::as_str) {
        return match historic {
            "castle" | "palace" => "palace".to_string(),
            "monument" | "memorial" => "landmark".to_string(),
            _ => "historic_building".to_string(),
        };
    }

    match tags.get("leisure").map(String::as_str) {
        Some("park") | Some("garden") => return "park".to_string(),
        _ => {}
    }

    match building {
        Some("cathedral") | Some("church") | Some("chapel") => return "church".to_string(),
        Some("castle") | Some("palace") => return "palace".to_string(),
        _ => {}
    }

    "landmark".to_string()
}
