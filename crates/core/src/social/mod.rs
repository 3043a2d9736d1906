pub mod twitter;

use crate::domain::post::{RawPost, ScoredPost};
use crate::sentiment::SentimentClassifier;
use anyhow::Context;
use std::time::Instant;

pub use twitter::TwitterClient;

pub const DEFAULT_POST_LIMIT: usize = 100;

#[async_trait::async_trait]
pub trait SocialClient: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Posts matching `query`, at most `limit`, in the order the API ranks them.
    async fn search_recent(&self, query: &str, limit: usize) -> anyhow::Result<Vec<RawPost>>;
}

/// `$AAPL` for `aapl`.
pub fn cashtag(symbol: &str) -> String {
    format!("${}", symbol.trim().to_ascii_uppercase())
}

/// Searches for posts mentioning `symbol` and scores each one. An empty result is not an error.
pub async fn fetch_posts(
    symbol: &str,
    social: &dyn SocialClient,
    classifier: &dyn SentimentClassifier,
    limit: usize,
) -> anyhow::Result<Vec<ScoredPost>> {
    let t0 = Instant::now();
    let query = cashtag(symbol);
    let raw = social.search_recent(&query, limit).await?;

    let mut out = Vec::with_capacity(raw.len());
    for post in raw {
        let score = classifier
            .classify(&post.text)
            .await
            .with_context(|| format!("scoring post {} failed", post.id))?;
        out.push(ScoredPost::from_raw(post, score, symbol));
    }

    tracing::info!(
        symbol,
        %query,
        provider = social.provider_name(),
        classifier = classifier.name(),
        posts = out.len(),
        elapsed_ms = t0.elapsed().as_millis(),
        "fetched and scored posts"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::post::SentimentScore;
    use crate::error::{error_kind, ErrorKind, LookupError};
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::sync::Mutex;

    struct FakeSocial {
        posts: Vec<RawPost>,
        seen: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait::async_trait]
    impl SocialClient for FakeSocial {
        fn provider_name(&self) -> &'static str {
            "fake"
        }

        async fn search_recent(&self, query: &str, limit: usize) -> anyhow::Result<Vec<RawPost>> {
            self.seen.lock().unwrap().push((query.to_string(), limit));
            Ok(self.posts.iter().take(limit).cloned().collect())
        }
    }

    /// Polarity is the text length in tenths, capped at 1.
    struct LengthClassifier;

    #[async_trait::async_trait]
    impl SentimentClassifier for LengthClassifier {
        fn name(&self) -> &'static str {
            "length"
        }

        async fn classify(&self, text: &str) -> anyhow::Result<SentimentScore> {
            if text == "fail" {
                return Err(LookupError::fetch("classifier unavailable").into());
            }
            Ok(SentimentScore {
                polarity: (text.len() as f64 / 10.0).min(1.0),
                subjectivity: 0.5,
            })
        }
    }

    fn raw(id: &str, author: &str, text: &str, day: u32) -> RawPost {
        RawPost {
            id: id.to_string(),
            author: author.to_string(),
            text: text.to_string(),
            created_at: Utc.with_ymd_and_hms(2020, 1, day, 23, 59, 0).unwrap(),
        }
    }

    #[test]
    fn builds_cashtag_query() {
        assert_eq!(cashtag("aapl"), "$AAPL");
        assert_eq!(cashtag(" TSLA "), "$TSLA");
    }

    #[tokio::test]
    async fn scores_posts_in_api_order() {
        let social = FakeSocial {
            posts: vec![
                raw("2", "bob", "abcd", 3),
                raw("1", "alice", "ab", 2),
                raw("3", "carol", "abcdef", 4),
            ],
            seen: Mutex::new(Vec::new()),
        };

        let posts = fetch_posts("tsla", &social, &LengthClassifier, 2).await.unwrap();

        assert_eq!(
            social.seen.lock().unwrap().as_slice(),
            &[("$TSLA".to_string(), 2)]
        );
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].author, "bob");
        assert_eq!(posts[0].date, NaiveDate::from_ymd_opt(2020, 1, 3).unwrap());
        assert_eq!(posts[0].polarity, 0.4);
        assert_eq!(posts[0].symbol, "tsla");
        assert_eq!(posts[1].author, "alice");
    }

    #[tokio::test]
    async fn empty_search_is_not_an_error() {
        let social = FakeSocial {
            posts: Vec::new(),
            seen: Mutex::new(Vec::new()),
        };
        let posts = fetch_posts("AAPL", &social, &LengthClassifier, DEFAULT_POST_LIMIT)
            .await
            .unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn classifier_failure_aborts() {
        let social = FakeSocial {
            posts: vec![raw("1", "alice", "fail", 2)],
            seen: Mutex::new(Vec::new()),
        };
        let err = fetch_posts("AAPL", &social, &LengthClassifier, 10)
            .await
            .unwrap_err();
        assert_eq!(error_kind(&err), Some(ErrorKind::Fetch));
    }
}
