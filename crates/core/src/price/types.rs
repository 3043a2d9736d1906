use crate::error::LookupError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Close and volume per bar, aligned by index and ordered by time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub timestamps: Vec<NaiveDateTime>,
    pub closes: Vec<f64>,
    pub volumes: Vec<f64>,
}

impl PriceSeries {
    pub fn new(
        symbol: impl Into<String>,
        timestamps: Vec<NaiveDateTime>,
        closes: Vec<f64>,
        volumes: Vec<f64>,
    ) -> Result<Self, LookupError> {
        let symbol = symbol.into();
        if timestamps.len() != closes.len() || closes.len() != volumes.len() {
            return Err(LookupError::parse(format!(
                "{symbol}: misaligned series (timestamps={}, closes={}, volumes={})",
                timestamps.len(),
                closes.len(),
                volumes.len()
            )));
        }
        if let Some(w) = timestamps.windows(2).find(|w| w[0] >= w[1]) {
            return Err(LookupError::parse(format!(
                "{symbol}: timestamps not strictly increasing ({} then {})",
                w[0], w[1]
            )));
        }

        Ok(Self {
            symbol,
            timestamps,
            closes,
            volumes,
        })
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

/// Body of the intraday endpoint. Error responses carry `Message` instead of `intraday`.
#[derive(Debug, Clone, Deserialize)]
pub struct IntradayResponse {
    #[serde(default)]
    pub intraday: Option<BTreeMap<String, IntradayBar>>,

    #[serde(default, alias = "Message")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntradayBar {
    #[serde(default)]
    pub close: Option<NumField>,
    #[serde(default)]
    pub volume: Option<NumField>,
}

/// The provider quotes numbers as strings; accept plain numbers too.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumField {
    Number(f64),
    Text(String),
}

impl NumField {
    fn to_f64(&self) -> Option<f64> {
        match self {
            NumField::Number(n) => Some(*n),
            NumField::Text(s) => parse_num(s),
        }
    }
}

impl IntradayResponse {
    /// Extracts the parallel close/volume sequences. `BTreeMap` iteration gives the keys in
    /// lexicographic order, which is chronological for ISO timestamps.
    pub fn into_series(self, symbol: &str) -> Result<PriceSeries, LookupError> {
        let Some(intraday) = self.intraday else {
            let detail = match self.message {
                Some(msg) => format!("{symbol}: response has no intraday data ({msg})"),
                None => format!("{symbol}: response has no intraday data"),
            };
            return Err(LookupError::parse(detail));
        };

        let mut timestamps = Vec::with_capacity(intraday.len());
        let mut closes = Vec::with_capacity(intraday.len());
        let mut volumes = Vec::with_capacity(intraday.len());
        for (key, bar) in &intraday {
            let ts = parse_bar_timestamp(key).ok_or_else(|| {
                LookupError::parse(format!("{symbol}: unrecognised bar timestamp {key:?}"))
            })?;
            let close = bar.close.as_ref().and_then(NumField::to_f64).ok_or_else(|| {
                LookupError::parse(format!("{symbol}: bar {key} has no numeric close"))
            })?;
            let volume = bar.volume.as_ref().and_then(NumField::to_f64).ok_or_else(|| {
                LookupError::parse(format!("{symbol}: bar {key} has no numeric volume"))
            })?;

            timestamps.push(ts);
            closes.push(close);
            volumes.push(volume);
        }

        PriceSeries::new(symbol, timestamps, closes, volumes)
    }
}

fn parse_bar_timestamp(key: &str) -> Option<NaiveDateTime> {
    let t = key.trim();
    NaiveDateTime::parse_from_str(t, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(t, "%Y-%m-%d %H:%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(t, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_num(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    t.parse::<f64>().ok().filter(|v| v.is_finite())
}
