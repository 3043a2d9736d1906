use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A post as returned by the social search API, before scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    pub id: String,
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub polarity: f64,
    pub subjectivity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPost {
    pub author: String,
    pub text: String,
    pub date: NaiveDate,
    pub polarity: f64,
    pub subjectivity: f64,
    pub symbol: String,
}

impl ScoredPost {
    pub fn from_raw(raw: RawPost, score: SentimentScore, symbol: &str) -> Self {
        Self {
            author: raw.author,
            text: raw.text,
            date: raw.created_at.date_naive(),
            polarity: score.polarity,
            subjectivity: score.subjectivity,
            symbol: symbol.to_string(),
        }
    }
}
