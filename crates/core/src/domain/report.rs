use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Population mean and variance of post sentiment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub polarity: f64,
    pub subjectivity: f64,
    pub polarity_var: f64,
    pub subjectivity_var: f64,
}

/// Everything one lookup produces for a ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockReport {
    pub ticker: String,
    pub exchange: String,
    pub dates: Vec<NaiveDateTime>,
    pub closing_prices: Vec<f64>,
    pub closing_volumes: Vec<f64>,
    pub beta: f64,
    pub price_range: f64,
    pub price_delta: Vec<f64>,
    pub volume_delta: Vec<f64>,
    pub mean_price: f64,
    pub mean_volume: f64,
    pub variance_price: f64,
    pub variance_volume: f64,
    pub max_price: f64,
    pub min_price: f64,
    pub sentiment: SentimentSummary,
}
