//! One pass over a ticker: prices for the ticker and its reference index, post sentiment,
//! and the statistics derived from them.

use crate::config::Settings;
use crate::credentials::Credentials;
use crate::domain::report::StockReport;
use crate::error::LookupError;
use crate::price::{HttpPriceProvider, PriceClient, PriceSeries, SeriesRequest};
use crate::sentiment::{self, SentimentClassifier};
use crate::social::{self, SocialClient, TwitterClient};
use crate::stats;
use anyhow::Context;
use std::time::Instant;

pub const DEFAULT_RANGE_DAYS: u32 = 7;
pub const DEFAULT_INTERVAL_SECS: u32 = 60;
pub const DEFAULT_EXCHANGE: &str = "^IXIC";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupParams {
    pub symbol: String,
    pub range_days: u32,
    pub interval_secs: u32,
    /// Reference index the ticker's beta is measured against.
    pub exchange: String,
    pub post_limit: usize,
}

impl LookupParams {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            range_days: DEFAULT_RANGE_DAYS,
            interval_secs: DEFAULT_INTERVAL_SECS,
            exchange: DEFAULT_EXCHANGE.to_string(),
            post_limit: social::DEFAULT_POST_LIMIT,
        }
    }

    fn validate(&self) -> Result<(), LookupError> {
        if self.symbol.trim().is_empty() {
            return Err(LookupError::config("symbol must be non-empty"));
        }
        if self.exchange.trim().is_empty() {
            return Err(LookupError::config("exchange symbol must be non-empty"));
        }
        if self.range_days == 0 || self.interval_secs == 0 {
            return Err(LookupError::config(format!(
                "range and interval must be positive (range={}, interval={})",
                self.range_days, self.interval_secs
            )));
        }
        Ok(())
    }

    fn series_request(&self, symbol: &str) -> SeriesRequest {
        SeriesRequest {
            symbol: symbol.to_string(),
            range_days: self.range_days,
            interval_secs: self.interval_secs,
        }
    }
}

pub struct StockLookup {
    prices: Box<dyn PriceClient>,
    social: Box<dyn SocialClient>,
    classifier: Box<dyn SentimentClassifier>,
}

impl StockLookup {
    pub fn new(
        prices: Box<dyn PriceClient>,
        social: Box<dyn SocialClient>,
        classifier: Box<dyn SentimentClassifier>,
    ) -> Self {
        Self {
            prices,
            social,
            classifier,
        }
    }

    /// Builds the HTTP clients from loaded credentials. Authenticates the social client.
    pub async fn from_credentials(
        credentials: &Credentials,
        settings: &Settings,
        classifier: Box<dyn SentimentClassifier>,
    ) -> anyhow::Result<Self> {
        let prices = HttpPriceProvider::from_settings(settings, credentials.stock_api_key())?;
        let social = TwitterClient::authenticate(settings, credentials)
            .await
            .context("social client authentication failed")?;

        Ok(Self::new(Box::new(prices), Box::new(social), classifier))
    }

    pub async fn run(&self, params: &LookupParams) -> anyhow::Result<StockReport> {
        params.validate()?;
        let t0 = Instant::now();

        let subject_req = params.series_request(&params.symbol);
        let reference_req = params.series_request(&params.exchange);
        let (subject, reference) = tokio::try_join!(
            async {
                self.prices
                    .fetch_series(&subject_req)
                    .await
                    .with_context(|| format!("fetching prices for {}", params.symbol))
            },
            async {
                self.prices
                    .fetch_series(&reference_req)
                    .await
                    .with_context(|| format!("fetching prices for {}", params.exchange))
            },
        )?;
        ensure_aligned(&subject, &reference)?;

        let posts = social::fetch_posts(
            &params.symbol,
            self.social.as_ref(),
            self.classifier.as_ref(),
            params.post_limit,
        )
        .await
        .with_context(|| format!("fetching posts for {}", params.symbol))?;
        let sentiment = sentiment::aggregate(&posts)?;

        let price_range = stats::range(&subject.closes)?;
        let (mean_price, variance_price) = stats::mean_variance(&subject.closes)?;
        let (mean_volume, variance_volume) = stats::mean_variance(&subject.volumes)?;
        let price_delta = stats::deltas(&subject.closes);
        let volume_delta = stats::deltas(&subject.volumes);
        let beta = stats::beta(&subject.closes, &reference.closes)?;

        tracing::info!(
            symbol = %params.symbol,
            exchange = %params.exchange,
            bars = subject.len(),
            posts = posts.len(),
            beta,
            elapsed_ms = t0.elapsed().as_millis(),
            "lookup complete"
        );

        Ok(StockReport {
            ticker: params.symbol.clone(),
            exchange: params.exchange.clone(),
            dates: subject.timestamps,
            closing_prices: subject.closes,
            closing_volumes: subject.volumes,
            beta,
            price_range: price_range.range,
            price_delta,
            volume_delta,
            mean_price,
            mean_volume,
            variance_price,
            variance_volume,
            max_price: price_range.max,
            min_price: price_range.min,
            sentiment,
        })
    }
}

/// The two fetches are independent calls; the provider may drop bars for one symbol.
fn ensure_aligned(subject: &PriceSeries, reference: &PriceSeries) -> Result<(), LookupError> {
    if subject.len() != reference.len() {
        tracing::warn!(
            subject = %subject.symbol,
            subject_bars = subject.len(),
            reference = %reference.symbol,
            reference_bars = reference.len(),
            "price series lengths differ"
        );
        return Err(LookupError::insufficient_data(format!(
            "{} has {} bars but {} has {}; beta needs aligned series",
            subject.symbol,
            subject.len(),
            reference.symbol,
            reference.len()
        )));
    }
    Ok(())
}
