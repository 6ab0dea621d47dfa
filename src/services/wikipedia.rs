use crate::constants::*;
use crate::services::http::{get_json_with_retry, HttpClients};
use std::time::Duration;

const WIKIPEDIA_ACTION_API: &str = "https://en.wikipedia.org/w/api.php";
const WIKIPEDIA_REST_API: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";
const COMMONS_API: &str = "https://commons.wikimedia.org/w/api.php";

/// Free image lookup for landmarks via Wikipedia and Wikimedia Commons.
/// Entirely best-effort: every failure degrades to "no images" and the
/// POI ships without photos.
pub struct WikipediaService {
    clients: HttpClients,
}

impl WikipediaService {
    pub fn new(clients: HttpClients) -> Self {
        WikipediaService { clients }
    }

    /// Fetch up to `count` image URLs for a landmark.
    ///
    /// Stage 1 fires the Wikipedia page-image and Commons searches in
    /// parallel; stage 2 falls back to the REST summary endpoint only when
    /// both came back empty. The whole pipeline runs under a hard timeout
    /// so a slow image provider cannot stall itinerary assembly.
    pub async fn get_images_for_landmark(
        &self,
        name: &str,
        city: &str,
        count: usize,
    ) -> Vec<String> {
        let result = tokio::time::timeout(
            Duration::from_secs(IMAGE_ENRICH_HARD_TIMEOUT_SECONDS),
            self.collect_images(name, city, count),
        )
        .await;

        match result {
            Ok(images) => {
                tracing::info!("{}: {} images found", name, images.len());
                images
            }
            Err(_) => {
                tracing::info!("{}: image lookup timed out", name);
                Vec::new()
            }
        }
    }

    /// Single-image convenience used by the itinerary pipeline.
    pub async fn get_image_for_landmark(&self, name: &str, city: &str) -> Option<String> {
        self.get_images_for_landmark(name, city, 1)
            .await
            .into_iter()
            .next()
    }

    async fn collect_images(&self, name: &str, city: &str, count: usize) -> Vec<String> {
        let (wiki_image, commons_images) = tokio::join!(
            self.wikipedia_page_image(name, city),
            self.commons_images(name, city, count),
        );

        let mut images: Vec<String> = Vec::new();
        if let Some(url) = wiki_image {
            images.push(url);
        }
        for url in commons_images {
            if images.len() >= count {
                break;
            }
            if !images.contains(&url) {
                images.push(url);
            }
        }

        if images.is_empty() {
            if let Some(url) = self.rest_summary_image(name, city).await {
                images.push(url);
            }
        }

        images.truncate(count);
        images
    }

    /// Main page thumbnail via the Wikipedia Action API.
    async fn wikipedia_page_image(&self, name: &str, city: &str) -> Option<String> {
        let params = vec![
            ("action", "query".to_string()),
            ("format", "json".to_string()),
            ("generator", "search".to_string()),
            ("gsrsearch", format!("{} {}", name, city)),
            ("gsrlimit", "1".to_string()),
            ("prop", "pageimages".to_string()),
            ("piprop", "thumbnail".to_string()),
            ("pithumbsize", "800".to_string()),
        ];

        let data = self
            .clients
            .throttled_image(get_json_with_retry(
                &self.clients.images,
                WIKIPEDIA_ACTION_API,
                &params,
            ))
            .await?;

        let pages = data.get("query")?.get("pages")?.as_object()?;
        let page = pages.values().next()?;
        page.get("thumbnail")?
            .get("source")?
            .as_str()
            .map(str::to_string)
    }

    /// Image search on Wikimedia Commons, restricted to the file namespace
    /// and raster MIME types (SVG maps and icons are not photos).
    async fn commons_images(&self, name: &str, city: &str, count: usize) -> Vec<String> {
        let params = vec![
            ("action", "query".to_string()),
            ("format", "json".to_string()),
            ("generator", "search".to_string()),
            ("gsrsearch", format!("{} {}", name, city)),
            ("gsrnamespace", "6".to_string()),
            ("gsrlimit", (count + 3).to_string()),
            ("prop", "imageinfo".to_string()),
            ("iiprop", "url|mime".to_string()),
            ("iiurlwidth", "800".to_string()),
        ];

        let Some(data) = self
            .clients
            .throttled_image(get_json_with_retry(
                &self.clients.images,
                COMMONS_API,
                &params,
            ))
            .await
        else {
            return Vec::new();
        };

        let mut images = Vec::new();
        let Some(pages) = data
            .get("query")
            .and_then(|q| q.get("pages"))
            .and_then(|p| p.as_object())
        else {
            return images;
        };

        for page in pages.values() {
            let Some(info) = page
                .get("imageinfo")
                .and_then(|i| i.as_array())
                .and_then(|arr| arr.first())
            else {
                continue;
            };
            let mime = info.get("mime").and_then(|m| m.as_str()).unwrap_or("");
            if !mime.starts_with("image/") || mime.contains("svg") {
                continue;
            }
            let url = info
                .get("thumburl")
                .or_else(|| info.get("url"))
                .and_then(|u| u.as_str());
            if let Some(url) = url {
                let url = url.to_string();
                if !images.contains(&url) {
                    images.push(url);
                    if images.len() >= count {
                        break;
                    }
                }
            }
        }
        images
    }

    /// Fallback via the REST page-summary endpoint, trying the bare name
    /// and two disambiguated variants.
    async fn rest_summary_image(&self, name: &str, city: &str) -> Option<String> {
        let queries = [
            name.to_string(),
            format!("{} ({})", name, city),
            format!("{} {}", name, city),
        ];

        for query in &queries {
            let url = format!("{}/{}", WIKIPEDIA_REST_API, query.replace(' ', "_"));
            let Some(data) = self
                .clients
                .throttled_image(get_json_with_retry(&self.clients.images, &url, &[]))
                .await
            else {
                continue;
            };

            if let Some(thumb) = data
                .get("thumbnail")
                .and_then(|t| t.get("source"))
                .and_then(|s| s.as_str())
            {
                // Summary thumbnails are tiny; rewrite to a usable width
                return Some(thumb.replace("/50px-", "/800px-").replace("/60px-", "/800px-"));
            }
            if let Some(original) = data
                .get("originalimage")
                .and_then(|o| o.get("source"))
                .and_then(|s| s.as_str())
            {
                return Some(original.to_string());
            }
        }
        None
    }
}
