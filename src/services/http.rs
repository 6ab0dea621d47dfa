use crate::constants::*;
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Long-lived HTTP clients shared by every service, one per upstream
/// family so timeouts match each provider's behavior. Clients are cheap
/// `Arc` handles internally and safe to clone.
#[derive(Clone)]
pub struct HttpClients {
    pub geocoder: Client,
    pub overpass: Client,
    pub images: Client,
    pub routing: Client,
    /// LLM calls carry explicit per-request timeouts instead
    pub llm: Client,
    geocoder_limit: Arc<Semaphore>,
    image_limit: Arc<Semaphore>,
}

fn build_client(timeout_seconds: Option<u64>) -> Client {
    let mut builder = Client::builder()
        .user_agent(USER_AGENT)
        .pool_max_idle_per_host(HTTP_POOL_MAX_IDLE_PER_HOST);
    if let Some(secs) = timeout_seconds {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().unwrap_or_default()
}

impl HttpClients {
    pub fn new() -> Self {
        HttpClients {
            geocoder: build_client(Some(GEOCODER_TIMEOUT_SECONDS)),
            overpass: build_client(Some(OVERPASS_TIMEOUT_SECONDS)),
            images: build_client(Some(IMAGE_TIMEOUT_SECONDS)),
            routing: build_client(Some(ROUTING_TIMEOUT_SECONDS)),
            llm: build_client(None),
            geocoder_limit: Arc::new(Semaphore::new(GEOCODER_MAX_CONCURRENCY)),
            image_limit: Arc::new(Semaphore::new(IMAGE_MAX_CONCURRENCY)),
        }
    }

    /// Run a geocoder call under the provider's concurrency cap, sleeping
    /// briefly before releasing the slot to respect the public rate limit.
    pub async fn throttled_geocode<F, T>(&self, fut: F) -> T
    where
        F: Future<Output = T>,
    {
        let _permit = self.geocoder_limit.acquire().await.ok();
        let result = fut.await;
        tokio::time::sleep(Duration::from_millis(GEOCODER_RELEASE_SLEEP_MS)).await;
        result
    }

    /// Run an image lookup under the image provider's concurrency cap.
    pub async fn throttled_image<F, T>(&self, fut: F) -> T
    where
        F: Future<Output = T>,
    {
        let _permit = self.image_limit.acquire().await.ok();
        fut.await
    }
}

impl Default for HttpClients {
    fn default() -> Self {
        Self::new()
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// GET a JSON document with at most one retry on transient failures
/// (connect errors, timeouts, HTTP 429/5xx). Every other failure logs at
/// info and yields `None` — callers treat upstream gaps as misses.
pub async fn get_json_with_retry(
    client: &Client,
    url: &str,
    params: &[(&str, String)],
) -> Option<serde_json::Value> {
    for attempt in 0..=HTTP_MAX_RETRIES {
        let response = client.get(url).query(params).send().await;

        match response {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    match resp.json().await {
                        Ok(json) => return Some(json),
                        Err(e) => {
                            tracing::info!("Failed to parse JSON from {}: {}", url, e);
                            return None;
                        }
                    }
                }
                if is_retryable_status(status) && attempt < HTTP_MAX_RETRIES {
                    let backoff = if status == StatusCode::TOO_MANY_REQUESTS {
                        HTTP_RATE_LIMIT_BACKOFF_MS
                    } else {
                        HTTP_RETRY_BACKOFF_MS
                    };
                    tracing::info!(
                        "HTTP {} from {}, retrying in {}ms (attempt {}/{})",
                        status,
                        url,
                        backoff,
                        attempt + 1,
                        HTTP_MAX_RETRIES + 1
                    );
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                    continue;
                }
                tracing::info!("HTTP {} from {}", status, url);
                return None;
            }
            Err(e) if (e.is_timeout() || e.is_connect()) && attempt < HTTP_MAX_RETRIES => {
                tracing::info!(
                    "Request to {} failed ({}), retrying in {}ms",
                    url,
                    if e.is_timeout() { "timeout" } else { "connect" },
                    HTTP_RETRY_BACKOFF_MS
                );
                tokio::time::sleep(Duration::from_millis(HTTP_RETRY_BACKOFF_MS)).await;
            }
            Err(e) => {
                tracing::info!("Request to {} failed: {}", url, e);
                return None;
            }
        }
    }
    None
}

/// POST a form body and parse a JSON response, with the same retry policy
/// as `get_json_with_retry`. Used by the Overpass client.
pub async fn post_form_json_with_retry(
    client: &Client,
    url: &str,
    form: &[(&str, String)],
) -> Option<serde_json::Value> {
    for attempt in 0..=HTTP_MAX_RETRIES {
        let response = client.post(url).form(form).send().await;

        match response {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    match resp.json().await {
                        Ok(json) => return Some(json),
                        Err(e) => {
                            tracing::info!("Failed to parse JSON from {}: {}", url, e);
                            return None;
                        }
                    }
                }
                if is_retryable_status(status) && attempt < HTTP_MAX_RETRIES {
                    let backoff = if status == StatusCode::TOO_MANY_REQUESTS {
                        HTTP_RATE_LIMIT_BACKOFF_MS
                    } else {
                        HTTP_RETRY_BACKOFF_MS
                    };
                    tracing::info!(
                        "HTTP {} from {}, retrying in {}ms (attempt {}/{})",
                        status,
                        url,
                        backoff,
                        attempt + 1,
                        HTTP_MAX_RETRIES + 1
                    );
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                    continue;
                }
                tracing::info!("HTTP {} from {}", status, url);
                return None;
            }
            Err(e) if (e.is_timeout() || e.is_connect()) && attempt < HTTP_MAX_RETRIES => {
                tracing::info!("Request to {} failed, retrying: {}", url, e);
                tokio::time::sleep(Duration::from_millis(HTTP_RETRY_BACKOFF_MS)).await;
            }
            Err(e) => {
                tracing::info!("Request to {} failed: {}", url, e);
                return None;
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses() {
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(is_retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!is_retryable_status(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn throttled_geocode_runs_future() {
        let clients = HttpClients::new();
        let value = clients.throttled_geocode(async { 42 }).await;
        assert_eq!(value, 42);
    }
}
