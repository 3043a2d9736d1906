use crate::error::LookupError;
use serde_json::{Map, Value};
use std::path::Path;

pub const ACCESS_TOKEN: &str = "access_token";
pub const CONSUMER_KEY: &str = "consumer_key";
pub const ACCESS_TOKEN_SECRET: &str = "access_token_secret";
pub const CONSUMER_SECRET: &str = "consumer_secret";
pub const STOCK_API_KEY: &str = "STOCK_API_KEY";

pub const REQUIRED_KEYS: [&str; 5] = [
    ACCESS_TOKEN,
    CONSUMER_KEY,
    ACCESS_TOKEN_SECRET,
    CONSUMER_SECRET,
    STOCK_API_KEY,
];

/// API secrets for the social search and price providers.
///
/// The file is a flat JSON object:
/// `{"access_token": "..", "consumer_key": "..", "access_token_secret": "..",
///   "consumer_secret": "..", "STOCK_API_KEY": ".."}`.
/// Extra keys are ignored.
#[derive(Clone)]
pub struct Credentials {
    values: Map<String, Value>,
}

impl Credentials {
    pub fn from_json_str(raw: &str) -> Result<Self, LookupError> {
        let parsed = serde_json::from_str::<Value>(raw)
            .map_err(|e| LookupError::config(format!("credentials file is not valid JSON: {e}")))?;
        let Value::Object(values) = parsed else {
            return Err(LookupError::config("credentials file must contain a JSON object"));
        };

        let missing: Vec<&str> = REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| {
                !matches!(values.get(*key), Some(Value::String(s)) if !s.trim().is_empty())
            })
            .collect();
        if !missing.is_empty() {
            return Err(LookupError::config(format!(
                "credentials missing or non-string keys: {}",
                missing.join(", ")
            )));
        }

        Ok(Self { values })
    }

    /// Value of a string key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    fn required(&self, key: &str) -> &str {
        // Presence of every required key is checked in `from_json_str`.
        self.get(key).unwrap_or_default()
    }

    pub fn access_token(&self) -> &str {
        self.required(ACCESS_TOKEN)
    }

    pub fn access_token_secret(&self) -> &str {
        self.required(ACCESS_TOKEN_SECRET)
    }

    pub fn consumer_key(&self) -> &str {
        self.required(CONSUMER_KEY)
    }

    pub fn consumer_secret(&self) -> &str {
        self.required(CONSUMER_SECRET)
    }

    pub fn stock_api_key(&self) -> &str {
        self.required(STOCK_API_KEY)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<&String> = self.values.keys().collect();
        f.debug_struct("Credentials")
            .field("keys", &keys)
            .finish_non_exhaustive()
    }
}

pub fn load_credentials(path: impl AsRef<Path>) -> Result<Credentials, LookupError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| {
        LookupError::config(format!(
            "failed to read credentials file {}: {e}",
            path.display()
        ))
    })?;
    let creds = Credentials::from_json_str(&raw)?;
    tracing::debug!(path = %path.display(), "loaded credentials");
    Ok(creds)
}
