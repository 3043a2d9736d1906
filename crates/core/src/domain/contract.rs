use crate::domain::post::SentimentScore;
use crate::error::LookupError;
use serde::{Deserialize, Serialize};

/// Sentiment score as emitted by an external classifier, before range checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierScore {
    pub polarity: f64,
    pub subjectivity: f64,
}

impl ClassifierScore {
    pub fn validate_and_into_score(self) -> Result<SentimentScore, LookupError> {
        if !(-1.0..=1.0).contains(&self.polarity) {
            return Err(LookupError::parse(format!(
                "polarity must be between -1 and 1 (got {})",
                self.polarity
            )));
        }
        if !(0.0..=1.0).contains(&self.subjectivity) {
            return Err(LookupError::parse(format!(
                "subjectivity must be between 0 and 1 (got {})",
                self.subjectivity
            )));
        }

        Ok(SentimentScore {
            polarity: self.polarity,
            subjectivity: self.subjectivity,
        })
    }
}
