use crate::domain::contract::ClassifierScore;
use crate::domain::post::SentimentScore;
use crate::error::LookupError;

pub fn extract_json(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        // Remove Markdown fences (```json ... ``` or ``` ... ```).
        let mut inner = trimmed;
        if let Some(after_first) = inner.splitn(2, '\n').nth(1) {
            inner = after_first;
        }
        if let Some(end) = inner.rfind("```") {
            inner = &inner[..end];
        }
        return Some(inner.trim().to_string());
    }

    // Best-effort extraction: first '{' to last '}'.
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(trimmed[start..=end].trim().to_string())
}

pub fn parse_score(text: &str) -> Result<SentimentScore, LookupError> {
    let json_str = extract_json(text).unwrap_or_else(|| text.trim().to_string());
    let parsed = serde_json::from_str::<ClassifierScore>(&json_str).map_err(|e| {
        LookupError::parse(format!("classifier output is not a sentiment score ({e}): {json_str}"))
    })?;
    parsed.validate_and_into_score()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn extract_json_handles_fenced_blocks() {
        let body = "{\"polarity\":0.1,\"subjectivity\":0.2}";
        let fenced = format!("```json\n{body}\n```\n");
        assert_eq!(extract_json(&fenced), Some(body.to_string()));
    }

    #[test]
    fn extract_json_falls_back_to_braces() {
        let s = "Here you go: {\"a\":1} hope that helps";
        assert_eq!(extract_json(s), Some("{\"a\":1}".to_string()));
        assert_eq!(extract_json("no json } here {"), None);
    }

    #[test]
    fn parse_score_accepts_prose_wrapped_json() {
        let s = parse_score("Scores: {\"polarity\": -0.25, \"subjectivity\": 0.5}").unwrap();
        assert_eq!(s.polarity, -0.25);
        assert_eq!(s.subjectivity, 0.5);
    }

    #[test]
    fn parse_score_rejects_missing_fields_and_bad_ranges() {
        let err = parse_score("{\"polarity\": 0.2}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);

        let err = parse_score("{\"polarity\": 2.0, \"subjectivity\": 0.5}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);

        let err = parse_score("I cannot score this.").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }
}
