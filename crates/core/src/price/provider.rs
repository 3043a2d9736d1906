use crate::config::Settings;
use crate::error::{body_excerpt, LookupError};
use crate::price::types::{IntradayResponse, PriceSeries};
use crate::price::{PriceClient, SeriesRequest};
use anyhow::{Context, Result};
use reqwest::Url;
use std::time::Instant;

/// Client for a WorldTradingData-style intraday endpoint.
#[derive(Debug, Clone)]
pub struct HttpPriceProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpPriceProvider {
    pub fn from_settings(settings: &Settings, api_key: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.http_timeout())
            .build()
            .context("failed to build price provider http client")?;

        Ok(Self::new(http, &settings.price_api_base_url, api_key))
    }

    pub fn new(http: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim().to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// `<base>?symbol=..&interval=..&range=..&sort=asc&api_token=..`
    pub fn url(&self, req: &SeriesRequest) -> Result<Url> {
        let interval = req.interval_secs.to_string();
        let range = req.range_days.to_string();
        Url::parse_with_params(
            &self.base_url,
            &[
                ("symbol", req.symbol.as_str()),
                ("interval", interval.as_str()),
                ("range", range.as_str()),
                ("sort", "asc"),
                ("api_token", self.api_key.as_str()),
            ],
        )
        .map_err(|e| {
            LookupError::config(format!("invalid price API base url {:?}: {e}", self.base_url))
                .into()
        })
    }

    async fn fetch_once(&self, req: &SeriesRequest) -> Result<PriceSeries> {
        let url = self.url(req)?;

        let res = self.http.get(url).send().await.map_err(|e| {
            // reqwest includes the full url (and so the api token) in its Display output.
            LookupError::fetch(format!(
                "price request for {} failed: {}",
                req.symbol,
                e.without_url()
            ))
        })?;

        let status = res.status();
        let text = res.text().await.map_err(|e| {
            LookupError::fetch(format!(
                "failed to read price response for {}: {}",
                req.symbol,
                e.without_url()
            ))
        })?;

        if !status.is_success() {
            return Err(LookupError::fetch(format!(
                "price provider HTTP {status} for {}: {}",
                req.symbol,
                body_excerpt(&text)
            ))
            .into());
        }

        let parsed = serde_json::from_str::<IntradayResponse>(&text).map_err(|e| {
            LookupError::fetch(format!(
                "price response for {} is not valid JSON ({e}): {}",
                req.symbol,
                body_excerpt(&text)
            ))
        })?;

        Ok(parsed.into_series(&req.symbol)?)
    }
}

#[async_trait::async_trait]
impl PriceClient for HttpPriceProvider {
    fn provider_name(&self) -> &'static str {
        "worldtradingdata_intraday"
    }

    async fn fetch_series(&self, req: &SeriesRequest) -> Result<PriceSeries> {
        let t0 = Instant::now();
        let series = self.fetch_once(req).await?;
        tracing::info!(
            provider = self.provider_name(),
            symbol = %req.symbol,
            range_days = req.range_days,
            interval_secs = req.interval_secs,
            bars = series.len(),
            elapsed_ms = t0.elapsed().as_millis(),
            "fetched intraday series"
        );
        Ok(series)
    }
}
