use crate::constants::*;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub redis_url: Option<String>,
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub discover_cache_ttl: u64,
    pub memory_cache_max_entries: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            redis_url: env::var("REDIS_URL").ok(),
            groq_api_key: env::var("GROQ_API_KEY").ok().filter(|k| !k.is_empty()),
            groq_model: env::var("GROQ_MODEL")
                .unwrap_or_else(|_| "llama-3.1-8b-instant".to_string()),
            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            gemini_model: env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemma-3-4b-it".to_string()),
            discover_cache_ttl: env::var("DISCOVER_CACHE_TTL")
                .unwrap_or_else(|_| DEFAULT_DISCOVER_CACHE_TTL_SECONDS.to_string())
                .parse()
                .map_err(|_| "Invalid DISCOVER_CACHE_TTL")?,
            memory_cache_max_entries: env::var("MEMORY_CACHE_MAX_ENTRIES")
                .unwrap_or_else(|_| DEFAULT_MEMORY_CACHE_MAX_ENTRIES.to_string())
                .parse()
                .map_err(|_| "Invalid MEMORY_CACHE_MAX_ENTRIES")?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
