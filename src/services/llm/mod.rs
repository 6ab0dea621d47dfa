pub mod gemini;
pub mod groq;

pub use gemini::GeminiProvider;
pub use groq::GroqProvider;

use crate::config::Config;
use crate::constants::*;
use crate::error::{AppError, Result};
use crate::models::{Coordinates, Poi, TimeConstraint, TransportMode};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// System prompt shared by every provider: think like a local, mix iconic
/// sights with hidden gems, and answer in strict JSON.
const SYSTEM_PROMPT: &str = "You are a passionate local travel expert who has lived in cities around the world. \
Think like a local, not a tourist. You know the hidden gems — the quiet courtyard \
behind the cathedral, the tiny family-run trattoria that doesn't appear in guidebooks, \
the street art alley that only neighborhood residents know about. \
Mix iconic must-see landmarks with off-the-beaten-path spots that give travelers \
an authentic feel for the city. \
Respond ONLY with valid JSON. No explanations, no markdown, no extra text.";

/// Narrow provider contract: send a prompt, get raw text back.
/// All prompt construction and JSON parsing lives in `ReasoningService`.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String>;
    fn default_timeout(&self) -> Duration;
    fn name(&self) -> &'static str;
}

/// Structured interpretation of a free-text travel request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredQuery {
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default)]
    pub poi_types: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A model-suggested landmark. Names only — coordinates are forbidden by
/// the prompts and resolved later against real data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkSuggestion {
    pub name: String,
    pub category: String,
    pub why_visit: String,
    pub visit_duration_hours: f64,
    #[serde(default)]
    pub specialty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admission_url: Option<String>,
}

impl LandmarkSuggestion {
    fn new(name: &str, category: &str, why_visit: &str, visit_duration_hours: f64) -> Self {
        LandmarkSuggestion {
            name: name.to_string(),
            category: category.to_string(),
            why_visit: why_visit.to_string(),
            visit_duration_hours,
            specialty: String::new(),
            admission: None,
            admission_url: None,
        }
    }
}

/// A POI paired with its relevance to the user's interests.
#[derive(Debug, Clone)]
pub struct RankedPoi {
    pub poi: Poi,
    pub relevance_score: f64,
    pub reasoning: String,
}

/// Rough world regions used to compose fallback landmark names that are
/// likely to geocode when the model is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    EastAsia,
    SouthAsia,
    SoutheastAsia,
    MiddleEast,
    Americas,
    Europe,
}

/// Classify a city center into a rough region from latitude/longitude
/// bounding boxes. `None` and anything unmatched default to Europe, whose
/// templates also fit most cities elsewhere.
pub fn classify_region(center: Option<Coordinates>) -> Region {
    let Some(c) = center else {
        return Region::Europe;
    };

    if (-170.0..=-30.0).contains(&c.lng) {
        return Region::Americas;
    }
    if (-11.0..20.0).contains(&c.lat) && (92.0..=141.0).contains(&c.lng) {
        return Region::SoutheastAsia;
    }
    if (20.0..=54.0).contains(&c.lat) && (95.0..=146.0).contains(&c.lng) {
        return Region::EastAsia;
    }
    if (5.0..=35.0).contains(&c.lat) && (60.0..92.0).contains(&c.lng) {
        return Region::SouthAsia;
    }
    if (12.0..=42.0).contains(&c.lat) && (26.0..60.0).contains(&c.lng) {
        return Region::MiddleEast;
    }
    Region::Europe
}

/// Deterministic landmark names used when the model times out or returns
/// garbage. Templated per region so that most entries geocode successfully.
pub fn fallback_landmarks(city: &str, center: Option<Coordinates>) -> Vec<LandmarkSuggestion> {
    match classify_region(center) {
        Region::EastAsia => vec![
            LandmarkSuggestion::new(&format!("{} Temple", city), "landmark", "Historic temple", 1.0),
            LandmarkSuggestion::new(&format!("{} Shrine", city), "landmark", "Sacred shrine", 1.0),
            LandmarkSuggestion::new(&format!("{} Castle", city), "landmark", "Historic castle", 1.5),
            LandmarkSuggestion::new(&format!("Old Town {}", city), "landmark", "Historic old town", 2.0),
            LandmarkSuggestion::new(&format!("{} Tower", city), "viewpoint", "City viewpoint", 1.0),
            LandmarkSuggestion::new(&format!("{} Market", city), "market", "Local market", 1.0),
            LandmarkSuggestion::new(&format!("{} Museum", city), "museum", "City museum", 1.5),
            LandmarkSuggestion::new(&format!("{} Park", city), "park", "City park", 1.0),
        ],
        Region::SouthAsia => vec![
            LandmarkSuggestion::new(&format!("{} Temple", city), "landmark", "Historic temple", 1.0),
            LandmarkSuggestion::new(&format!("{} Fort", city), "landmark", "Historic fort", 1.5),
            LandmarkSuggestion::new(&format!("{} Palace", city), "palace", "Royal palace", 1.5),
            LandmarkSuggestion::new(&format!("{} Bazaar", city), "market", "Traditional bazaar", 1.0),
            LandmarkSuggestion::new(&format!("{} Gate", city), "landmark", "Historic city gate", 0.5),
            LandmarkSuggestion::new(&format!("{} Museum", city), "museum", "City museum", 1.5),
            LandmarkSuggestion::new(&format!("{} Garden", city), "park", "Historic garden", 1.0),
        ],
        Region::SoutheastAsia => vec![
            LandmarkSuggestion::new(&format!("{} Temple", city), "landmark", "Historic temple", 1.0),
            LandmarkSuggestion::new(&format!("{} Pagoda", city), "landmark", "Historic pagoda", 1.0),
            LandmarkSuggestion::new(&format!("Old Quarter {}", city), "landmark", "Historic quarter", 2.0),
            LandmarkSuggestion::new(&format!("{} Market", city), "market", "Local market", 1.0),
            LandmarkSuggestion::new(&format!("{} Night Market", city), "market", "Night market", 1.5),
            LandmarkSuggestion::new(&format!("{} Museum", city), "museum", "City museum", 1.5),
            LandmarkSuggestion::new(&format!("{} Park", city), "park", "City park", 1.0),
        ],
        Region::MiddleEast => vec![
            LandmarkSuggestion::new(&format!("{} Mosque", city), "landmark", "Historic mosque", 1.0),
            LandmarkSuggestion::new(&format!("{} Bazaar", city), "market", "Traditional bazaar", 1.5),
            LandmarkSuggestion::new(&format!("{} Citadel", city), "landmark", "Historic citadel", 1.5),
            LandmarkSuggestion::new(&format!("Old City {}", city), "landmark", "Historic old city", 2.0),
            LandmarkSuggestion::new(&format!("{} Museum", city), "museum", "City museum", 1.5),
            LandmarkSuggestion::new(&format!("{} Gate", city), "landmark", "Historic city gate", 0.5),
        ],
        Region::Americas => vec![
            LandmarkSuggestion::new(&format!("{} Cathedral", city), "church", "Historic cathedral", 1.0),
            LandmarkSuggestion::new(&format!("Plaza de Armas {}", city), "square", "Central plaza", 0.5),
            LandmarkSuggestion::new(&format!("{} City Hall", city), "landmark", "Historic city hall", 0.5),
            LandmarkSuggestion::new(&format!("Old Town {}", city), "landmark", "Historic old town", 2.0),
            LandmarkSuggestion::new(&format!("{} Museum", city), "museum", "City museum", 1.5),
            LandmarkSuggestion::new(&format!("{} Market", city), "market", "Local market", 1.0),
            LandmarkSuggestion::new(&format!("{} Park", city), "park", "City park", 1.0),
        ],
        Region::Europe => vec![
            LandmarkSuggestion::new(&format!("{} Cathedral", city), "church", "Historic cathedral", 1.0),
            LandmarkSuggestion::new(&format!("{} Castle", city), "landmark", "Historic castle", 1.5),
            LandmarkSuggestion::new(&format!("Old Town {}", city), "landmark", "Historic old town", 2.0),
            LandmarkSuggestion::new(&format!("{} City Hall", city), "landmark", "Historic city hall", 0.5),
            LandmarkSuggestion::new(&format!("{} Main Square", city), "square", "Central square", 0.5),
            LandmarkSuggestion::new(&format!("{} Museum", city), "museum", "City museum", 1.5),
            LandmarkSuggestion::new(&format!("{} Park", city), "park", "City park", 1.0),
            LandmarkSuggestion::new(&format!("{} Market", city), "market", "Local market", 1.0),
        ],
    }
}

/// Sanitize user input before it is concatenated into a prompt: strip
/// control characters (newlines and tabs stay) and cap the length.
pub fn sanitize_input(text: &str, max_length: usize) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .take(max_length)
        .collect();
    cleaned.trim().to_string()
}

/// Pull the JSON payload out of a response that may be wrapped in
/// Markdown code fences.
pub fn extract_json(text: &str) -> &str {
    if let Some(rest) = text.split("```json").nth(1) {
        return rest.split("```").next().unwrap_or("").trim();
    }
    if let Some(rest) = text.split("```").nth(1) {
        return rest.trim();
    }
    text.trim()
}

/// Normalize a landmark name into its searchable form: drop a leading
/// "The ", drop parentheticals, split camel-case, collapse whitespace.
pub fn normalize_landmark_name(name: &str) -> String {
    let mut name = name.trim();
    if let Some(stripped) = name.strip_prefix("The ") {
        name = stripped;
    }
    let name = name.split('(').next().unwrap_or("").trim();

    let chars: Vec<char> = name.chars().collect();
    let mut spaced = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_uppercase() && c.is_uppercase() && next_is_lower)
            {
                spaced.push(' ');
            }
        }
        spaced.push(c);
    }

    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// How many suggestions to request; scales with trip length.
pub fn suggestion_count(time_constraint: Option<TimeConstraint>) -> usize {
    match time_constraint {
        Some(TimeConstraint::HalfDay) => 25,
        Some(TimeConstraint::Day) | None => 30,
        Some(TimeConstraint::TwoDays) => 40,
        Some(TimeConstraint::ThreeDays) | Some(TimeConstraint::FiveDays) => 50,
    }
}

/// Provider-agnostic reasoning layer. Owns prompt construction, response
/// parsing, input sanitization, and the deterministic fallbacks; the
/// provider only moves text.
pub struct ReasoningService {
    provider: Arc<dyn LlmProvider>,
}

impl ReasoningService {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        ReasoningService { provider }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Parse a free-text travel request into a structured query. Falls back
    /// to treating the whole input as the city name.
    pub async fn interpret_user_input(
        &self,
        location: &str,
        interests: Option<&[String]>,
    ) -> StructuredQuery {
        let location = sanitize_input(location, MAX_LOCATION_INPUT_LEN);
        let interests_str = join_sanitized(interests, "general sightseeing");

        let prompt = format!(
            "Parse this travel request into a structured query.\n\n\
             User's location input: \"{}\"\n\
             User's interests: {}\n\n\
             Respond ONLY with valid JSON:\n\
             {{\"city\": \"city name\", \"area\": \"neighborhood or null\", \
             \"poi_types\": [\"types\"], \"keywords\": [\"keywords\"]}}\n\n\
             Rules:\n- Extract city name from location\n\
             - Include area/neighborhood if mentioned\n\
             - Suggest POI types based on interests\n\
             - Do NOT include coordinates or addresses",
            location, interests_str
        );

        let fallback = StructuredQuery {
            city: location.clone(),
            area: None,
            poi_types: Vec::new(),
            keywords: interests.map(|i| i.to_vec()).unwrap_or_default(),
        };

        let text = match self
            .provider
            .generate(&prompt, self.provider.default_timeout())
            .await
        {
            Ok(text) => text,
            Err(_) => return fallback,
        };

        match serde_json::from_str::<serde_json::Value>(extract_json(&text)) {
            Ok(data) => StructuredQuery {
                city: data
                    .get("city")
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.is_empty())
                    .unwrap_or(&location)
                    .to_string(),
                area: data
                    .get("area")
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.is_empty() && *s != "null")
                    .map(str::to_string),
                poi_types: string_array(&data, "poi_types"),
                keywords: string_array(&data, "keywords"),
            },
            Err(_) => fallback,
        }
    }

    /// Ask for landmark suggestions. On timeout or unparseable output,
    /// returns the region-aware fallback list so the pipeline can still
    /// produce a result.
    pub async fn suggest_landmarks(
        &self,
        city: &str,
        interests: Option<&[String]>,
        transport_mode: TransportMode,
        time_constraint: Option<TimeConstraint>,
        city_center: Option<Coordinates>,
    ) -> Vec<LandmarkSuggestion> {
        let city = sanitize_input(city, MAX_CITY_INPUT_LEN);
        let interests_str = join_sanitized(interests, "sightseeing, landmarks, culture");
        let n = suggestion_count(time_constraint);

        let prompt = format!(
            "Suggest {} places to visit in {}.\n\n\
             Interests: {}\nTransport: {}\n\n\
             Mix famous landmarks with hidden gems that only locals know about.\n\
             Include at least 30% lesser-known spots (quiet courtyards, \
             local-favorite viewpoints, neighborhood secrets).\n\n\
             Return ONLY a JSON array:\n\
             [{{\"name\": \"Place Name\", \"category\": \"landmark|church|museum|park|\
             palace|square|market|viewpoint|hidden_gem\", \"why_visit\": \"One sentence\", \
             \"visit_duration_hours\": 1.5}}]\n\n\
             Rules:\n- Only places WITHIN {} city limits, within 30 km of the center\n\
             - Use simple, searchable names (no \"The\", no parentheses)\n\
             - Start with most famous, then weave in hidden gems\n\
             - No coordinates, addresses, or opening hours",
            n, city, interests_str, transport_mode, city
        );

        let text = match self
            .provider
            .generate(
                &prompt,
                Duration::from_secs(LLM_LANDMARKS_TIMEOUT_SECONDS),
            )
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::info!(
                    "[{}] Landmark suggestion failed for {}: {}",
                    self.provider.name(),
                    city,
                    e
                );
                return fallback_landmarks(&city, city_center);
            }
        };

        match parse_suggestions(&text, n, "attraction") {
            Some(suggestions) if !suggestions.is_empty() => {
                tracing::info!(
                    "[{}] Got {} landmark suggestions for {}",
                    self.provider.name(),
                    suggestions.len(),
                    city
                );
                suggestions
            }
            _ => {
                tracing::info!(
                    "[{}] Unparseable landmark response for {}",
                    self.provider.name(),
                    city
                );
                fallback_landmarks(&city, city_center)
            }
        }
    }

    /// Rank POIs by relevance to the user's interests. POIs the model does
    /// not score default to 0.5 so nothing silently disappears.
    pub async fn rank_pois(&self, pois: &[Poi], interests: &[String]) -> Vec<RankedPoi> {
        if pois.is_empty() {
            return Vec::new();
        }
        if interests.is_empty() {
            return pois
                .iter()
                .map(|p| RankedPoi {
                    poi: p.clone(),
                    relevance_score: 0.5,
                    reasoning: "No interests".to_string(),
                })
                .collect();
        }

        let summaries: Vec<String> = pois
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let types = p
                    .types
                    .as_deref()
                    .map(|t| t.join(", "))
                    .unwrap_or_default();
                format!("{}: {} ({})", i, p.name, types)
            })
            .collect();

        let prompt = format!(
            "Rank places by relevance to interests: {}\n\n\
             Places:\n{}\n\n\
             Respond with JSON array: [{{\"index\": 0, \"score\": 0.8, \"reasoning\": \"why\"}}]\n\
             Score 0-1, higher = more relevant.",
            interests
                .iter()
                .map(|i| sanitize_input(i, MAX_INTEREST_INPUT_LEN))
                .collect::<Vec<_>>()
                .join(", "),
            summaries.join("\n")
        );

        let unavailable = || {
            pois.iter()
                .map(|p| RankedPoi {
                    poi: p.clone(),
                    relevance_score: 0.5,
                    reasoning: "Unavailable".to_string(),
                })
                .collect::<Vec<_>>()
        };

        let text = match self
            .provider
            .generate(&prompt, self.provider.default_timeout())
            .await
        {
            Ok(text) => text,
            Err(_) => return unavailable(),
        };

        let rankings: Vec<serde_json::Value> =
            match serde_json::from_str(extract_json(&text)) {
                Ok(serde_json::Value::Array(items)) => items,
                _ => return unavailable(),
            };

        let mut ranked = Vec::with_capacity(pois.len());
        let mut ranked_indices = std::collections::HashSet::new();
        for item in &rankings {
            let idx = item.get("index").and_then(|v| v.as_u64()).unwrap_or(0) as usize;
            if idx < pois.len() && ranked_indices.insert(idx) {
                let score = item
                    .get("score")
                    .and_then(|v| v.as_f64())
                    .unwrap_or(0.5)
                    .clamp(0.0, 1.0);
                ranked.push(RankedPoi {
                    poi: pois[idx].clone(),
                    relevance_score: score,
                    reasoning: item
                        .get("reasoning")
                        .and_then(|v| v.as_str())
                        .unwrap_or("")
                        .to_string(),
                });
            }
        }
        for (i, poi) in pois.iter().enumerate() {
            if !ranked_indices.contains(&i) {
                ranked.push(RankedPoi {
                    poi: poi.clone(),
                    relevance_score: 0.5,
                    reasoning: "Not evaluated".to_string(),
                });
            }
        }
        ranked.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    /// Suggest famous food and drink venues of one category. Returns an
    /// empty list on failure — food discovery has an Overpass fallback.
    pub async fn suggest_food_and_drinks(
        &self,
        city: &str,
        category: &str,
        limit: usize,
    ) -> Vec<LandmarkSuggestion> {
        let city = sanitize_input(city, MAX_CITY_INPUT_LEN);
        let category = if matches!(category, "cafes" | "restaurants" | "bars" | "parks") {
            category
        } else {
            "cafes"
        };

        let prompt = match category {
            "restaurants" => format!(
                "Suggest {} FAMOUS restaurants in {} known for local cuisine.\n\n\
                 Return ONLY a JSON array:\n\
                 [{{\"name\": \"Exact Restaurant Name\", \"category\": \"restaurant\", \"why_visit\": \"One sentence\", \
                 \"visit_duration_hours\": 1.5, \"specialty\": \"Signature dish\"}}]\n\n\
                 RULES: Only ICONIC restaurants locals and tourists love. EXACT official names. \
                 NO chains. NO closed places. WITHIN {} city limits.",
                limit, city, city
            ),
            "bars" => format!(
                "Suggest {} FAMOUS historic bars/pubs in {}.\n\n\
                 Return ONLY a JSON array:\n\
                 [{{\"name\": \"Exact Bar Name\", \"category\": \"bar\", \"why_visit\": \"One sentence\", \
                 \"visit_duration_hours\": 1.0, \"specialty\": \"Signature drink\"}}]\n\n\
                 RULES: Only ICONIC/HISTORIC bars from travel guides. EXACT official names. \
                 NO chains. NO closed places. WITHIN {} city limits.",
                limit, city, city
            ),
            "parks" => format!(
                "Suggest {} FAMOUS parks and gardens in {}.\n\n\
                 Return ONLY a JSON array:\n\
                 [{{\"name\": \"Exact Park Name\", \"category\": \"park\", \"why_visit\": \"One sentence\", \
                 \"visit_duration_hours\": 1.5, \"specialty\": \"Best feature\"}}]\n\n\
                 RULES: Only NOTABLE parks. EXACT official names. WITHIN {} city limits.",
                limit, city, city
            ),
            _ => format!(
                "Suggest {} FAMOUS historic cafes in {} that tourists should visit.\n\n\
                 Return ONLY a JSON array:\n\
                 [{{\"name\": \"Exact Cafe Name\", \"category\": \"cafe\", \"why_visit\": \"One sentence\", \
                 \"visit_duration_hours\": 0.75, \"specialty\": \"What to order\"}}]\n\n\
                 RULES: Only ICONIC/HISTORIC cafes from travel guides. EXACT official names. \
                 NO chains. NO closed places. WITHIN {} city limits.",
                limit, city, city
            ),
        };

        tracing::info!("[{}] Suggesting {} for {}", self.provider.name(), category, city);

        let text = match self
            .provider
            .generate(&prompt, Duration::from_secs(LLM_FOOD_TIMEOUT_SECONDS))
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::info!(
                    "[{}] Error getting {} suggestions: {}",
                    self.provider.name(),
                    category,
                    e
                );
                return Vec::new();
            }
        };

        parse_suggestions(&text, limit, category).unwrap_or_default()
    }
}

fn join_sanitized(items: Option<&[String]>, default: &str) -> String {
    match items {
        Some(list) if !list.is_empty() => list
            .iter()
            .map(|i| sanitize_input(i, MAX_INTEREST_INPUT_LEN))
            .collect::<Vec<_>>()
            .join(", "),
        _ => default.to_string(),
    }
}

fn string_array(data: &serde_json::Value, key: &str) -> Vec<String> {
    data.get(key)
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Parse a JSON array of suggestion objects, normalizing names and
/// dropping duplicates. Returns `None` when the payload isn't an array.
fn parse_suggestions(
    text: &str,
    limit: usize,
    default_category: &str,
) -> Option<Vec<LandmarkSuggestion>> {
    let items = match serde_json::from_str::<serde_json::Value>(extract_json(text)) {
        Ok(serde_json::Value::Array(items)) => items,
        _ => return None,
    };

    let mut suggestions = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for item in items.iter().take(limit) {
        let raw_name = item.get("name").and_then(|v| v.as_str()).unwrap_or("");
        let name = normalize_landmark_name(raw_name);
        if name.is_empty() || !seen.insert(name.to_lowercase()) {
            continue;
        }
        let duration = item
            .get("visit_duration_hours")
            .and_then(|v| v.as_f64())
            .unwrap_or(1.0);
        suggestions.push(LandmarkSuggestion {
            name,
            category: item
                .get("category")
                .and_then(|v| v.as_str())
                .unwrap_or(default_category)
                .to_string(),
            why_visit: item
                .get("why_visit")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            visit_duration_hours: duration,
            specialty: item
                .get("specialty")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            admission: item
                .get("admission")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            admission_url: item
                .get("admission_url")
                .and_then(|v| v.as_str())
                .map(str::to_string),
        });
    }
    Some(suggestions)
}

/// Create the best available reasoning service: Groq first (fast LPU
/// inference), Gemini as fallback.
pub fn create_reasoning_service(
    config: &Config,
    client: reqwest::Client,
) -> Result<ReasoningService> {
    if let Some(key) = &config.groq_api_key {
        tracing::info!("LLM provider: Groq ({})", config.groq_model);
        return Ok(ReasoningService::new(Arc::new(GroqProvider::new(
            client,
            key.clone(),
            config.groq_model.clone(),
        ))));
    }

    if let Some(key) = &config.gemini_api_key {
        tracing::info!("LLM provider: Gemini ({})", config.gemini_model);
        return Ok(ReasoningService::new(Arc::new(GeminiProvider::new(
            client,
            key.clone(),
            config.gemini_model.clone(),
        ))));
    }

    Err(AppError::Config(
        "No LLM provider available. Set GROQ_API_KEY or GEMINI_API_KEY".to_string(),
    ))
}

pub(crate) fn system_prompt() -> &'static str {
    SYSTEM_PROMPT
}
