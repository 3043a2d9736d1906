pub mod provider;
pub mod types;

pub use provider::HttpPriceProvider;
pub use types::PriceSeries;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub symbol: String,
    /// Lookback in days.
    pub range_days: u32,
    /// Bar interval in seconds.
    pub interval_secs: u32,
}

#[async_trait::async_trait]
pub trait PriceClient: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_series(&self, req: &SeriesRequest) -> anyhow::Result<PriceSeries>;
}
