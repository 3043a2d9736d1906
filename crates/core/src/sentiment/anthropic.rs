use crate::config::Settings;
use crate::domain::contract::ClassifierScore;
use crate::domain::post::SentimentScore;
use crate::error::{body_excerpt, LookupError};
use crate::sentiment::json;
use crate::sentiment::SentimentClassifier;
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
const DEFAULT_MAX_TOKENS: u32 = 256;

const TOOL_NAME_EMIT_SENTIMENT: &str = "emit_sentiment";

/// Sentiment classifier backed by the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicClassifier {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClassifier {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.http_timeout())
            .build()
            .context("failed to build reqwest client")?;

        Self::with_http(http, settings)
    }

    pub fn with_http(http: reqwest::Client, settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_anthropic_api_key()?.to_string();
        let base_url = settings
            .anthropic_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = settings
            .anthropic_model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    async fn create_message(
        &self,
        req: CreateMessageRequest,
    ) -> anyhow::Result<CreateMessageResponse> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key).map_err(|_| {
                LookupError::config("ANTHROPIC_API_KEY is not a valid header value")
            })?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(&req)
            .send()
            .await
            .map_err(|e| LookupError::fetch(format!("Anthropic request failed: {e}")))?;

        let status = res.status();
        let text = res.text().await.map_err(|e| {
            LookupError::fetch(format!("failed to read Anthropic response body: {e}"))
        })?;
        if !status.is_success() {
            return Err(LookupError::fetch(format!(
                "Anthropic HTTP {status}: {}",
                body_excerpt(&text)
            ))
            .into());
        }

        let parsed = serde_json::from_str::<CreateMessageResponse>(&text).map_err(|e| {
            LookupError::parse(format!(
                "failed to decode Anthropic response ({e}): {}",
                body_excerpt(&text)
            ))
        })?;
        Ok(parsed)
    }

    fn request(&self, text: &str) -> CreateMessageRequest {
        CreateMessageRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: Some(Self::system_prompt()),
            messages: vec![Message {
                role: "user",
                content: format!("Post:\n{text}"),
            }],
            tools: Some(Self::tools()),
            tool_choice: Some(ToolChoice::Tool {
                name: TOOL_NAME_EMIT_SENTIMENT,
            }),
        }
    }

    fn tools() -> Vec<Tool> {
        let schema = serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["polarity", "subjectivity"],
            "properties": {
                "polarity": {"type": "number", "minimum": -1, "maximum": 1},
                "subjectivity": {"type": "number", "minimum": 0, "maximum": 1}
            }
        });

        vec![Tool {
            name: TOOL_NAME_EMIT_SENTIMENT,
            description: "Emit the sentiment scores of the post",
            input_schema: schema,
        }]
    }

    fn system_prompt() -> String {
        [
            "You score the sentiment of a single social-media post about a stock.",
            "polarity: -1 (very negative) to 1 (very positive), 0 when neutral.",
            "subjectivity: 0 (purely factual) to 1 (purely opinion).",
            "Return ONLY the two numbers via the emit_sentiment tool.",
        ]
        .join("\n")
    }

    /// Tool input if present, otherwise a JSON object found in the text blocks.
    fn response_score(res: &CreateMessageResponse) -> Result<SentimentScore, LookupError> {
        for block in &res.content {
            if let ContentBlock::ToolUse { name, input, .. } = block {
                if name == TOOL_NAME_EMIT_SENTIMENT {
                    let parsed = serde_json::from_value::<ClassifierScore>(input.clone())
                        .map_err(|e| {
                            LookupError::parse(format!(
                                "failed to decode tool_use.input into a sentiment score: {e}"
                            ))
                        })?;
                    return parsed.validate_and_into_score();
                }
            }
        }

        let text = res
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n");
        json::parse_score(&text)
    }
}

#[async_trait::async_trait]
impl SentimentClassifier for AnthropicClassifier {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn classify(&self, text: &str) -> anyhow::Result<SentimentScore> {
        let res = self.create_message(self.request(text)).await?;
        let score = Self::response_score(&res)?;
        tracing::debug!(
            model = %self.model,
            polarity = score.polarity,
            subjectivity = score.subjectivity,
            "classified post"
        );
        Ok(score)
    }
}

#[derive(Debug, Clone, Serialize)]
struct CreateMessageRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,

    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Serialize)]
struct Tool {
    name: &'static str,
    description: &'static str,
    input_schema: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
enum ToolChoice {
    #[serde(rename = "tool")]
    Tool { name: &'static str },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(rename = "tool_use")]
    ToolUse {
        #[serde(default)]
        name: String,
        #[serde(default)]
        input: serde_json::Value,
    },

    #[serde(other)]
    Unknown,
}
