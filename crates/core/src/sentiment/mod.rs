pub mod anthropic;
pub mod json;
pub mod lexicon;

use crate::domain::post::{ScoredPost, SentimentScore};
use crate::domain::report::SentimentSummary;
use crate::error::LookupError;
use crate::stats;

pub use anthropic::AnthropicClassifier;
pub use lexicon::LexiconClassifier;

/// Scores a text for polarity in [-1, 1] and subjectivity in [0, 1].
#[async_trait::async_trait]
pub trait SentimentClassifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn classify(&self, text: &str) -> anyhow::Result<SentimentScore>;
}

/// Population mean and variance of polarity and subjectivity.
///
/// An empty post set is rejected with `InsufficientData` rather than producing NaN.
pub fn aggregate(posts: &[ScoredPost]) -> Result<SentimentSummary, LookupError> {
    if posts.is_empty() {
        return Err(LookupError::insufficient_data(
            "no posts to aggregate sentiment over",
        ));
    }

    let polarity: Vec<f64> = posts.iter().map(|p| p.polarity).collect();
    let subjectivity: Vec<f64> = posts.iter().map(|p| p.subjectivity).collect();

    let (polarity_mean, polarity_var) = stats::mean_variance(&polarity)?;
    let (subjectivity_mean, subjectivity_var) = stats::mean_variance(&subjectivity)?;

    Ok(SentimentSummary {
        polarity: polarity_mean,
        subjectivity: subjectivity_mean,
        polarity_var,
        subjectivity_var,
    })
}
