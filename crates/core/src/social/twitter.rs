use crate::config::Settings;
use crate::credentials::Credentials;
use crate::domain::post::RawPost;
use crate::error::{body_excerpt, LookupError};
use crate::social::SocialClient;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

const TOKEN_PATH: &str = "/oauth2/token";
const SEARCH_PATH: &str = "/2/tweets/search/recent";

// Bounds the recent-search endpoint accepts for max_results.
const MIN_RESULTS: usize = 10;
const MAX_RESULTS: usize = 100;

/// Twitter v2 recent-search client using an app-only bearer token.
#[derive(Debug, Clone)]
pub struct TwitterClient {
    http: reqwest::Client,
    base_url: String,
    bearer_token: String,
}

impl TwitterClient {
    /// Exchanges the consumer key/secret for a bearer token.
    pub async fn authenticate(settings: &Settings, creds: &Credentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.http_timeout())
            .build()
            .context("failed to build social http client")?;

        Self::authenticate_with(
            http,
            &settings.social_api_base_url,
            creds.consumer_key(),
            creds.consumer_secret(),
        )
        .await
    }

    pub async fn authenticate_with(
        http: reqwest::Client,
        base_url: &str,
        consumer_key: &str,
        consumer_secret: &str,
    ) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let url = format!("{base_url}{TOKEN_PATH}");

        let res = http
            .post(url)
            .basic_auth(consumer_key, Some(consumer_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| LookupError::fetch(format!("social token request failed: {e}")))?;

        let status = res.status();
        let text = res.text().await.map_err(|e| {
            LookupError::fetch(format!("failed to read social token response: {e}"))
        })?;
        if !status.is_success() {
            return Err(LookupError::fetch(format!(
                "social authentication HTTP {status}: {}",
                body_excerpt(&text)
            ))
            .into());
        }

        let token = parse_token(&text)?;
        tracing::debug!(%base_url, "social client authenticated");

        Ok(Self {
            http,
            base_url,
            bearer_token: token,
        })
    }

    fn search_params(query: &str, limit: usize) -> Vec<(&'static str, String)> {
        vec![
            ("query", query.to_string()),
            (
                "max_results",
                limit.clamp(MIN_RESULTS, MAX_RESULTS).to_string(),
            ),
            ("tweet.fields", "created_at,author_id".to_string()),
            ("expansions", "author_id".to_string()),
            ("user.fields", "username".to_string()),
        ]
    }
}

#[async_trait::async_trait]
impl SocialClient for TwitterClient {
    fn provider_name(&self) -> &'static str {
        "twitter_recent_search"
    }

    async fn search_recent(&self, query: &str, limit: usize) -> Result<Vec<RawPost>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let url = format!("{}{SEARCH_PATH}", self.base_url);
        let res = self
            .http
            .get(url)
            .bearer_auth(&self.bearer_token)
            .query(&Self::search_params(query, limit))
            .send()
            .await
            .map_err(|e| LookupError::fetch(format!("social search request failed: {e}")))?;

        let status = res.status();
        let text = res.text().await.map_err(|e| {
            LookupError::fetch(format!("failed to read social search response: {e}"))
        })?;
        if !status.is_success() {
            return Err(LookupError::fetch(format!(
                "social search HTTP {status}: {}",
                body_excerpt(&text)
            ))
            .into());
        }

        let mut posts = parse_search_response(&text)?;
        posts.truncate(limit);
        tracing::debug!(query, limit, returned = posts.len(), "social search complete");
        Ok(posts)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token_type: String,
    access_token: String,
}

fn parse_token(text: &str) -> Result<String, LookupError> {
    let token = serde_json::from_str::<TokenResponse>(text)
        .map_err(|e| LookupError::fetch(format!("malformed social token response: {e}")))?;
    if !token.token_type.eq_ignore_ascii_case("bearer") {
        return Err(LookupError::fetch(format!(
            "unexpected social token type {:?}",
            token.token_type
        )));
    }
    Ok(token.access_token)
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Tweet>,
    #[serde(default)]
    includes: Includes,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    id: String,
    text: String,
    #[serde(default)]
    author_id: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
struct Includes {
    #[serde(default)]
    users: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct User {
    id: String,
    username: String,
}

fn parse_search_response(text: &str) -> Result<Vec<RawPost>, LookupError> {
    let body = serde_json::from_str::<SearchResponse>(text)
        .map_err(|e| LookupError::parse(format!("unexpected social search response: {e}")))?;

    let handles: HashMap<&str, &str> = body
        .includes
        .users
        .iter()
        .map(|u| (u.id.as_str(), u.username.as_str()))
        .collect();

    let mut out = Vec::with_capacity(body.data.len());
    for tweet in &body.data {
        let created_at = tweet.created_at.ok_or_else(|| {
            LookupError::parse(format!("post {} has no created_at", tweet.id))
        })?;

        let author_id = tweet.author_id.as_deref().unwrap_or_default();
        let author = match handles.get(author_id) {
            Some(handle) => handle.to_string(),
            None => {
                tracing::warn!(
                    post_id = %tweet.id,
                    author_id,
                    "author handle not in response; using id"
                );
                author_id.to_string()
            }
        };

        out.push(RawPost {
            id: tweet.id.clone(),
            author,
            text: tweet.text.clone(),
            created_at,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{error_kind, ErrorKind};
    use crate::test_support::{local_http, serve_sequence};
    use serde_json::json;

    fn token_body() -> String {
        json!({"token_type": "bearer", "access_token": "AAAA"}).to_string()
    }

    fn search_body(count: usize) -> String {
        let data: Vec<_> = (0..count)
            .map(|i| {
                json!({
                    "id": format!("{}", 100 + i),
                    "text": format!("$AAPL post {i}"),
                    "author_id": "u1",
                    "created_at": "2020-01-02T15:00:00.000Z"
                })
            })
            .collect();
        json!({
            "data": data,
            "includes": {"users": [{"id": "u1", "username": "alice"}]},
            "meta": {"result_count": count}
        })
        .to_string()
    }

    async fn authenticated(base: &str) -> TwitterClient {
        TwitterClient::authenticate_with(local_http(), base, "key", "secret")
            .await
            .unwrap()
    }

    #[test]
    fn resolves_handles_and_keeps_order() {
        let body = json!({
            "data": [
                {"id": "20", "text": "$AAPL to the moon", "author_id": "u2", "created_at": "2020-01-02T23:10:00.000Z"},
                {"id": "10", "text": "selling $AAPL", "author_id": "u1", "created_at": "2020-01-01T08:00:00.000Z"},
                {"id": "30", "text": "hmm $AAPL", "author_id": "u9", "created_at": "2020-01-03T00:00:00Z"}
            ],
            "includes": {"users": [
                {"id": "u1", "username": "alice", "name": "Alice"},
                {"id": "u2", "username": "bob", "name": "Bob"}
            ]},
            "meta": {"result_count": 3}
        })
        .to_string();

        let posts = parse_search_response(&body).unwrap();
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].id, "20");
        assert_eq!(posts[0].author, "bob");
        assert_eq!(posts[0].created_at.date_naive().to_string(), "2020-01-02");
        assert_eq!(posts[1].author, "alice");
        assert_eq!(posts[2].author, "u9");
    }

    #[test]
    fn zero_results_parse_to_empty() {
        let body = json!({"meta": {"result_count": 0}}).to_string();
        assert!(parse_search_response(&body).unwrap().is_empty());
    }

    #[test]
    fn post_without_timestamp_is_parse_error() {
        let body = json!({"data": [{"id": "1", "text": "x", "author_id": "u1"}]}).to_string();
        let err = parse_search_response(&body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn token_must_be_bearer() {
        let ok = parse_token(r#"{"token_type": "bearer", "access_token": "AAAA"}"#).unwrap();
        assert_eq!(ok, "AAAA");

        let err = parse_token(r#"{"token_type": "mac", "access_token": "AAAA"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fetch);

        let err = parse_token(r#"{"errors": [{"code": 99}]}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fetch);
    }

    #[test]
    fn clamps_max_results_to_api_bounds() {
        let max_results = |limit| {
            TwitterClient::search_params("$AAPL", limit)
                .into_iter()
                .find(|(k, _)| *k == "max_results")
                .map(|(_, v)| v)
                .unwrap()
        };
        assert_eq!(max_results(100), "100");
        assert_eq!(max_results(5), "10");
        assert_eq!(max_results(500), "100");
    }

    #[tokio::test]
    async fn rejected_token_request_is_fetch_error() {
        let body = format!("{{\"errors\": [{{\"message\": \"{}\"}}]}}", "y".repeat(3000));
        let (base, seen) = serve_sequence(vec![("401 Unauthorized", body)]).await;

        let err = TwitterClient::authenticate_with(local_http(), &base, "key", "secret")
            .await
            .unwrap_err();
        assert_eq!(error_kind(&err), Some(ErrorKind::Fetch));
        assert!(format!("{err:#}").len() < 400);

        let seen = seen.lock().unwrap();
        assert!(seen[0].starts_with("POST /oauth2/token "));
        assert!(seen[0].to_ascii_lowercase().contains("authorization: basic "));
    }

    #[tokio::test]
    async fn search_truncates_to_limit() {
        let (base, seen) = serve_sequence(vec![
            ("200 OK", token_body()),
            ("200 OK", search_body(15)),
        ])
        .await;

        let client = authenticated(&base).await;
        let posts = client.search_recent("$AAPL", 12).await.unwrap();
        assert_eq!(posts.len(), 12);
        assert_eq!(posts[0].id, "100");
        assert_eq!(posts[11].id, "111");
        assert_eq!(posts[0].author, "alice");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[1].starts_with("GET /2/tweets/search/recent?"));
        assert!(seen[1].contains("max_results=12&"));
        assert!(seen[1].to_ascii_lowercase().contains("authorization: bearer aaaa"));
    }

    #[tokio::test]
    async fn small_limit_requests_the_api_minimum() {
        let (base, seen) = serve_sequence(vec![
            ("200 OK", token_body()),
            ("200 OK", search_body(10)),
        ])
        .await;

        let posts = authenticated(&base).await.search_recent("$AAPL", 3).await.unwrap();
        assert_eq!(posts.len(), 3);
        assert!(seen.lock().unwrap()[1].contains("max_results=10&"));
    }

    #[tokio::test]
    async fn failed_search_is_fetch_error() {
        let (base, _) = serve_sequence(vec![
            ("200 OK", token_body()),
            ("503 Service Unavailable", "{\"title\": \"Service Unavailable\"}".to_string()),
        ])
        .await;

        let err = authenticated(&base)
            .await
            .search_recent("$AAPL", 12)
            .await
            .unwrap_err();
        assert_eq!(error_kind(&err), Some(ErrorKind::Fetch));
    }

    #[tokio::test]
    async fn zero_limit_skips_the_request() {
        let (base, seen) = serve_sequence(vec![("200 OK", token_body())]).await;

        let posts = authenticated(&base).await.search_recent("$AAPL", 0).await.unwrap();
        assert!(posts.is_empty());
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
