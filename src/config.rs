use anyhow::{Context, Result};

pub const DEFAULT_API_BASE: &str = "https://amanthos-website-api.onrender.com";

#[derive(Debug, Clone)]
pub struct Config {
    // Reservation API
    pub api_base_url: String,

    // Translation dictionaries: a directory or an http(s) base URL
    pub locales_source: String,

    // Durable client storage
    pub preferences_path: String,

    // Warm-up ping
    pub wake_delay_ms: u64,

    // Origin label written into booking comments
    pub booking_origin: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_base_url = std::env::var("BOOKING_API_BASE")
            .unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        reqwest::Url::parse(&api_base_url)
            .with_context(|| format!("BOOKING_API_BASE is not a valid URL: {}", api_base_url))?;

        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),

            locales_source: std::env::var("LOCALES_SOURCE")
                .unwrap_or_else(|_| "locales".to_string()),

            preferences_path: std::env::var("PREFERENCES_PATH")
                .unwrap_or_else(|_| "data/preferences.json".to_string()),

            wake_delay_ms: std::env::var("WAKE_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),

            booking_origin: std::env::var("BOOKING_ORIGIN")
                .unwrap_or_else(|_| "amanthosliving.com".to_string()),
        })
    }

    /// Configuration pointing at a specific API origin, everything else defaulted.
    pub fn for_api(api_base_url: &str) -> Self {
        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            locales_source: "locales".to_string(),
            preferences_path: "data/preferences.json".to_string(),
            wake_delay_ms: 3000,
            booking_origin: "amanthosliving.com".to_string(),
        }
    }
}
