//! Offline polarity/subjectivity scorer over a small adjective lexicon.
//!
//! Each known word contributes its `(polarity, subjectivity)`. An intensifier directly before a
//! word scales both values; a negator within the previous three tokens multiplies polarity by
//! `-0.5`. The text score is the mean over known words. Texts without known words score `(0, 0)`.

use crate::domain::post::SentimentScore;
use crate::sentiment::SentimentClassifier;
use std::collections::HashMap;

const NEGATION_FACTOR: f64 = -0.5;
const NEGATION_WINDOW: usize = 3;

/// (word, polarity, subjectivity)
const LEXICON: &[(&str, f64, f64)] = &[
    ("good", 0.7, 0.6),
    ("great", 0.8, 0.75),
    ("excellent", 1.0, 1.0),
    ("amazing", 0.6, 0.9),
    ("awesome", 1.0, 1.0),
    ("best", 1.0, 0.3),
    ("better", 0.5, 0.5),
    ("nice", 0.6, 1.0),
    ("happy", 0.8, 1.0),
    ("love", 0.5, 0.6),
    ("beautiful", 0.85, 1.0),
    ("interesting", 0.5, 0.5),
    ("positive", 0.227, 0.545),
    ("strong", 0.433, 0.733),
    ("solid", 0.3, 0.4),
    ("huge", 0.4, 0.9),
    ("new", 0.136, 0.455),
    ("high", 0.16, 0.54),
    ("bad", -0.7, 0.667),
    ("worse", -0.4, 0.6),
    ("worst", -1.0, 1.0),
    ("terrible", -1.0, 1.0),
    ("awful", -1.0, 1.0),
    ("horrible", -1.0, 1.0),
    ("poor", -0.4, 0.6),
    ("sad", -0.5, 1.0),
    ("hate", -0.8, 0.9),
    ("ugly", -0.7, 1.0),
    ("stupid", -0.8, 1.0),
    ("crazy", -0.6, 0.9),
    ("wrong", -0.5, 0.9),
    ("weak", -0.375, 0.625),
    ("negative", -0.3, 0.4),
    ("risky", -0.3, 0.7),
    ("low", 0.0, 0.3),
    ("bullish", 0.5, 0.6),
    ("bearish", -0.5, 0.6),
    ("rally", 0.4, 0.4),
    ("surge", 0.4, 0.4),
    ("soar", 0.5, 0.5),
    ("gain", 0.3, 0.3),
    ("gains", 0.3, 0.3),
    ("profit", 0.3, 0.3),
    ("profitable", 0.4, 0.4),
    ("upgrade", 0.3, 0.3),
    ("beat", 0.2, 0.2),
    ("moon", 0.4, 0.7),
    ("crash", -0.5, 0.5),
    ("plunge", -0.5, 0.5),
    ("dump", -0.4, 0.6),
    ("loss", -0.3, 0.3),
    ("losses", -0.3, 0.3),
    ("downgrade", -0.3, 0.3),
    ("miss", -0.2, 0.2),
    ("scam", -0.6, 0.8),
    ("fraud", -0.5, 0.6),
    ("overvalued", -0.3, 0.6),
    ("undervalued", 0.3, 0.6),
];

/// (word, multiplier)
const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("so", 1.3),
    ("super", 1.4),
    ("extremely", 1.5),
    ("incredibly", 1.5),
    ("too", 1.2),
    ("quite", 1.1),
    ("somewhat", 0.8),
    ("slightly", 0.6),
];

#[derive(Debug, Clone)]
pub struct LexiconClassifier {
    words: HashMap<&'static str, (f64, f64)>,
    intensifiers: HashMap<&'static str, f64>,
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconClassifier {
    pub fn new() -> Self {
        Self {
            words: LEXICON.iter().map(|(w, p, s)| (*w, (*p, *s))).collect(),
            intensifiers: INTENSIFIERS.iter().copied().collect(),
        }
    }

    pub fn score(&self, text: &str) -> SentimentScore {
        let tokens: Vec<String> = tokenize(text).collect();

        let mut polarity_sum = 0.0;
        let mut subjectivity_sum = 0.0;
        let mut matched: usize = 0;

        for (i, token) in tokens.iter().enumerate() {
            let Some(&(base_polarity, base_subjectivity)) = self.words.get(token.as_str()) else {
                continue;
            };
            let mut polarity = base_polarity;
            let mut subjectivity = base_subjectivity;

            if let Some(prev) = i.checked_sub(1).map(|j| tokens[j].as_str()) {
                if let Some(mult) = self.intensifiers.get(prev) {
                    polarity *= mult;
                    subjectivity *= mult;
                }
            }

            let negated = (1..=NEGATION_WINDOW).any(|k| i >= k && is_negator(&tokens[i - k]));
            if negated {
                polarity *= NEGATION_FACTOR;
            }

            polarity_sum += polarity;
            subjectivity_sum += subjectivity;
            matched += 1;
        }

        if matched == 0 {
            return SentimentScore {
                polarity: 0.0,
                subjectivity: 0.0,
            };
        }

        SentimentScore {
            polarity: (polarity_sum / matched as f64).clamp(-1.0, 1.0),
            subjectivity: (subjectivity_sum / matched as f64).clamp(0.0, 1.0),
        }
    }
}

#[async_trait::async_trait]
impl SentimentClassifier for LexiconClassifier {
    fn name(&self) -> &'static str {
        "lexicon"
    }

    async fn classify(&self, text: &str) -> anyhow::Result<SentimentScore> {
        Ok(self.score(text))
    }
}

/// Lower-cased word tokens; apostrophes stay inside words so "isn't" survives.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '’'))
        .map(|t| t.trim_matches(|c: char| c == '\'' || c == '’'))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase().replace('’', "'"))
}

fn is_negator(tok: &str) -> bool {
    matches!(tok, "not" | "no" | "never" | "nothing" | "without" | "cannot")
        || tok.ends_with("n't")
}
