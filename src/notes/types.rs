//! Note data model.
//!
//! Defines [`Sentiment`] (the closed three-value enum), [`Note`] (a persisted record, in
//! its wire shape), and [`NewNote`] (everything but the store-assigned fields).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Emotional tone of a note. Never free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// SQL-compatible string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }

    /// Lenient parse for untrusted model output: anything unrecognized is `Neutral`.
    pub fn normalize(raw: &str) -> Self {
        raw.trim().to_ascii_lowercase().parse().unwrap_or(Self::Neutral)
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Self::Positive),
            "neutral" => Ok(Self::Neutral),
            "negative" => Ok(Self::Negative),
            _ => Err(format!("unknown sentiment: {s}")),
        }
    }
}

/// A persisted note, serialized with the field names the mobile client reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Store-assigned, never reused.
    pub id: i64,
    pub title: String,
    pub summary: String,
    /// Lowercase tokens, insertion order preserved, no duplicates.
    pub tags: Vec<String>,
    pub sentiment: Sentiment,
    /// Set once at creation; non-decreasing in id order.
    pub created_at: DateTime<Utc>,
    /// The unmodified input text.
    pub source_text: String,
}

/// A note before the store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub sentiment: Sentiment,
    pub source_text: String,
    /// Name of the summarizer backend that produced the fields above.
    pub summarizer: Option<String>,
}

/// Parse a note identifier as issued by the store: a positive decimal integer with no
/// sign, leading zeros, whitespace, or other characters.
pub fn parse_note_id(raw: &str) -> Result<i64> {
    let malformed = || Error::InvalidInput(format!("malformed note id: {raw:?}"));

    // the store never issues ids with leading zeros
    if raw.is_empty() || raw.starts_with('0') || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(malformed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_round_trips_through_str() {
        for s in [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative] {
            assert_eq!(s.as_str().parse::<Sentiment>().unwrap(), s);
        }
    }

    #[test]
    fn sentiment_normalize_accepts_case_and_padding() {
        assert_eq!(Sentiment::normalize("  POSITIVE "), Sentiment::Positive);
        assert_eq!(Sentiment::normalize("Negative"), Sentiment::Negative);
    }

    #[test]
    fn sentiment_normalize_maps_unknown_to_neutral() {
        assert_eq!(Sentiment::normalize("ecstatic"), Sentiment::Neutral);
        assert_eq!(Sentiment::normalize(""), Sentiment::Neutral);
        assert_eq!(Sentiment::normalize("LABEL_2"), Sentiment::Neutral);
    }

    #[test]
    fn note_serializes_with_client_field_names() {
        let note = Note {
            id: 7,
            title: "Groceries".into(),
            summary: "Buy milk.".into(),
            tags: vec!["errands".into()],
            sentiment: Sentiment::Neutral,
            created_at: "2026-03-01T12:00:00Z".parse().unwrap(),
            source_text: "Buy milk".into(),
        };
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["sentiment"], "neutral");
        assert_eq!(json["sourceText"], "Buy milk");
        assert!(json["createdAt"].as_str().unwrap().starts_with("2026-03-01T12:00:00"));
        assert_eq!(json["tags"][0], "errands");
    }

    #[test]
    fn parse_note_id_accepts_positive_integers() {
        assert_eq!(parse_note_id("1").unwrap(), 1);
        assert_eq!(parse_note_id("999").unwrap(), 999);
    }

    #[test]
    fn parse_note_id_rejects_malformed() {
        for raw in ["", "0", "00", "007", "010", "-3", "+3", "abc", "12a", " 4", "1.5", "99999999999999999999"] {
            assert!(
                matches!(parse_note_id(raw), Err(Error::InvalidInput(_))),
                "{raw:?} should be rejected"
            );
        }
    }
}
