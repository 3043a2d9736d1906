pub mod credentials;
pub mod domain;
pub mod error;
pub mod lookup;
pub mod price;
pub mod sentiment;
pub mod social;
pub mod stats;

#[cfg(test)]
mod test_support;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_PRICE_API_BASE_URL: &str =
        "https://intraday.worldtradingdata.com/api/v1/intraday";
    pub const DEFAULT_SOCIAL_API_BASE_URL: &str = "https://api.twitter.com";
    pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub price_api_base_url: String,
        pub social_api_base_url: String,
        pub http_timeout_secs: u64,
        pub anthropic_api_key: Option<String>,
        pub anthropic_base_url: Option<String>,
        pub anthropic_model: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                price_api_base_url: DEFAULT_PRICE_API_BASE_URL.to_string(),
                social_api_base_url: DEFAULT_SOCIAL_API_BASE_URL.to_string(),
                http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
                anthropic_api_key: None,
                anthropic_base_url: None,
                anthropic_model: None,
                sentry_dsn: None,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let defaults = Self::default();
            let http_timeout_secs = match non_empty_var("HTTP_TIMEOUT_SECS") {
                Some(s) => s
                    .parse::<u64>()
                    .with_context(|| format!("HTTP_TIMEOUT_SECS is not a number: {s}"))?,
                None => defaults.http_timeout_secs,
            };

            Ok(Self {
                price_api_base_url: non_empty_var("PRICE_API_BASE_URL")
                    .unwrap_or(defaults.price_api_base_url),
                social_api_base_url: non_empty_var("SOCIAL_API_BASE_URL")
                    .unwrap_or(defaults.social_api_base_url),
                http_timeout_secs,
                anthropic_api_key: non_empty_var("ANTHROPIC_API_KEY"),
                anthropic_base_url: non_empty_var("ANTHROPIC_BASE_URL"),
                anthropic_model: non_empty_var("ANTHROPIC_MODEL"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }

        pub fn require_anthropic_api_key(&self) -> anyhow::Result<&str> {
            self.anthropic_api_key.as_deref().ok_or_else(|| {
                crate::error::LookupError::config("ANTHROPIC_API_KEY is required").into()
            })
        }

        pub fn http_timeout(&self) -> std::time::Duration {
            std::time::Duration::from_secs(self.http_timeout_secs)
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }
}
