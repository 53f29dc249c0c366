//! Text-to-summary pipeline.
//!
//! A [`SummaryBackend`] turns raw note text into a [`RawSummary`] of untrusted strings.
//! [`Summarizer`] is the only public entry point: it rejects blank text before the
//! backend is called and normalizes whatever the backend returns into a [`Summary`]
//! whose tags are short lowercase tokens and whose sentiment is one of the three enum
//! values. Backends are created via [`create_summarizer`] from configuration.

pub mod heuristic;
pub mod remote;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::config::SummarizerConfig;
use crate::error::{Error, Result};
use crate::notes::Sentiment;

/// Most tags kept on a note.
pub const MAX_TAGS: usize = 8;
/// Longest tag kept, in characters.
pub const MAX_TAG_CHARS: usize = 24;
/// Longest title kept, in characters.
pub const MAX_TITLE_CHARS: usize = 60;
/// Longest fallback summary built from the source text, in characters.
pub const MAX_SUMMARY_CHARS: usize = 280;

const FALLBACK_TITLE: &str = "Untitled note";

/// Backend output before normalization. Nothing here is trusted.
#[derive(Debug, Clone, Default)]
pub struct RawSummary {
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub sentiment: String,
}

/// Normalized summarizer output, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub sentiment: Sentiment,
}

/// A source of summaries: a local heuristic or a remote model call.
///
/// Transient failures are returned as [`Error::UpstreamUnavailable`] and are never
/// retried here.
#[async_trait]
pub trait SummaryBackend: Send + Sync {
    /// Short identifier recorded with each note (e.g. `"heuristic"`).
    fn name(&self) -> &'static str;

    async fn generate(&self, text: &str) -> Result<RawSummary>;
}

/// Validating, normalizing front for a [`SummaryBackend`]. Cheap to clone.
#[derive(Clone)]
pub struct Summarizer {
    backend: Arc<dyn SummaryBackend>,
}

impl Summarizer {
    pub fn new(backend: Arc<dyn SummaryBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Summarize `text`. Blank input fails with `InvalidInput` without reaching the
    /// backend.
    pub async fn summarize(&self, text: &str) -> Result<Summary> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("text must not be empty".into()));
        }

        let started = Instant::now();
        let raw = self.backend.generate(text).await?;
        tracing::debug!(
            backend = self.backend.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "summary generated"
        );

        Ok(normalize(raw, text))
    }
}

/// Apply the output invariants to a backend result.
pub fn normalize(raw: RawSummary, source: &str) -> Summary {
    let summary = match collapse_whitespace(&raw.summary) {
        s if s.is_empty() => heuristic::condense(source, MAX_SUMMARY_CHARS),
        s => s,
    };
    let title = normalize_title(&raw.title, &summary);
    let sentiment = Sentiment::normalize(&raw.sentiment);
    if sentiment.as_str() != raw.sentiment {
        tracing::debug!(raw = %raw.sentiment, normalized = %sentiment, "sentiment normalized");
    }

    Summary {
        title,
        summary,
        tags: normalize_tags(&raw.tags),
        sentiment,
    }
}

/// Lowercase, hyphenate, strip, truncate, and dedupe tags, keeping first-seen order.
pub fn normalize_tags<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw {
        let tag = tag.as_ref();
        // stripping letters would leave a different word ("café" -> "caf")
        if tag.chars().any(|c| c.is_alphanumeric() && !c.is_ascii()) {
            continue;
        }
        let cleaned: String = tag
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
            .take(MAX_TAG_CHARS)
            .collect();
        let cleaned = cleaned.trim_matches('-');

        if !cleaned.is_empty() && !tags.iter().any(|t| t == cleaned) {
            tags.push(cleaned.to_string());
        }
        if tags.len() == MAX_TAGS {
            break;
        }
    }
    tags
}

/// A non-empty title of at most [`MAX_TITLE_CHARS`] characters.
pub fn normalize_title(raw: &str, summary: &str) -> String {
    let title = truncate_words(raw, MAX_TITLE_CHARS);
    if !title.is_empty() {
        return title;
    }
    let from_summary = heuristic::title_for(summary);
    if from_summary.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        from_summary
    }
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse whitespace and cut to at most `max_chars`, preferring a word boundary.
pub(crate) fn truncate_words(text: &str, max_chars: usize) -> String {
    let text = collapse_whitespace(text);
    if text.chars().count() <= max_chars {
        return text;
    }

    let mut out = String::new();
    for word in text.split(' ') {
        let needed = usize::from(!out.is_empty()) + word.chars().count();
        if out.chars().count() + needed > max_chars {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }

    if out.is_empty() {
        // a single word longer than the limit
        out = text.chars().take(max_chars).collect();
    }
    out.trim_end_matches(&[',', ';', ':', '-'][..]).to_string()
}

/// Create a summarizer from config.
///
/// Supported providers: `"heuristic"` (local, deterministic) and `"huggingface"`
/// (remote inference API).
pub fn create_summarizer(config: &SummarizerConfig) -> anyhow::Result<Summarizer> {
    let backend: Arc<dyn SummaryBackend> = match config.provider.as_str() {
        "heuristic" => Arc::new(heuristic::HeuristicSummarizer),
        "huggingface" => Arc::new(remote::HuggingFaceSummarizer::new(config)?),
        other => anyhow::bail!(
            "unknown summarizer provider: {other}. Supported: heuristic, huggingface"
        ),
    };
    Ok(Summarizer::new(backend))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed raw summary and counts calls.
    struct FixedBackend {
        raw: RawSummary,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SummaryBackend for FixedBackend {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn generate(&self, _text: &str) -> Result<RawSummary> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.raw.clone())
        }
    }

    fn fixed(raw: RawSummary) -> (Arc<FixedBackend>, Summarizer) {
        let backend = Arc::new(FixedBackend {
            raw,
            calls: AtomicUsize::new(0),
        });
        (backend.clone(), Summarizer::new(backend))
    }

    #[tokio::test]
    async fn blank_text_never_reaches_backend() {
        let (backend, summarizer) = fixed(RawSummary::default());
        for text in ["", "   ", "\n\t"] {
            let err = summarizer.summarize(text).await.unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)));
        }
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn out_of_range_model_output_is_normalized() {
        let (_, summarizer) = fixed(RawSummary {
            title: "  Weekly   plan ".into(),
            summary: "Plan the week.".into(),
            tags: vec!["Work Stuff".into(), "WORK-STUFF".into(), "  ".into(), "#urgent!".into()],
            sentiment: "Very Happy".into(),
        });

        let summary = summarizer.summarize("plan the week").await.unwrap();
        assert_eq!(summary.title, "Weekly plan");
        assert_eq!(summary.tags, vec!["work-stuff", "urgent"]);
        assert_eq!(summary.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn tags_are_capped_and_truncated() {
        let raw: Vec<String> = (0..20).map(|i| format!("tag{i}")).collect();
        assert_eq!(normalize_tags(&raw).len(), MAX_TAGS);

        let long = normalize_tags(&["a".repeat(100)]);
        assert_eq!(long[0].chars().count(), MAX_TAG_CHARS);
    }

    #[test]
    fn non_ascii_tags_are_dropped() {
        assert!(normalize_tags(&["日本語", "---"]).is_empty());
        assert_eq!(normalize_tags(&["résumé", "Polish", "café", "naïve plan"]), vec!["polish"]);
    }

    #[tokio::test]
    async fn accented_input_yields_no_truncated_tags() {
        let summarizer = Summarizer::new(Arc::new(heuristic::HeuristicSummarizer));
        let summary = summarizer
            .summarize("Résumé polish before the café interview, résumé résumé")
            .await
            .unwrap();
        for garbled in ["rsum", "caf"] {
            assert!(!summary.tags.iter().any(|t| t == garbled), "tags: {:?}", summary.tags);
        }
        assert!(summary.tags.contains(&"polish".to_string()));
    }

    #[test]
    fn empty_title_falls_back_to_summary_then_placeholder() {
        assert_eq!(normalize_title("", "Call the bank about the loan."), "Call the bank about the loan");
        assert_eq!(normalize_title("  ", "..."), FALLBACK_TITLE);
    }

    #[test]
    fn blank_summary_falls_back_to_source() {
        let summary = normalize(
            RawSummary {
                title: "T".into(),
                summary: "   ".into(),
                tags: vec![],
                sentiment: "positive".into(),
            },
            "Pick up the dry cleaning",
        );
        assert_eq!(summary.summary, "Pick up the dry cleaning.");
        assert_eq!(summary.sentiment, Sentiment::Positive);
    }

    #[test]
    fn truncate_words_prefers_word_boundaries() {
        assert_eq!(truncate_words("alpha beta gamma", 11), "alpha beta");
        assert_eq!(truncate_words("abcdefghij", 4), "abcd");
        assert_eq!(truncate_words("short", 60), "short");
    }

    #[test]
    fn create_summarizer_rejects_unknown_provider() {
        let config = SummarizerConfig {
            provider: "gpt-local".into(),
            ..SummarizerConfig::default()
        };
        assert!(create_summarizer(&config).is_err());
    }

    #[test]
    fn create_summarizer_defaults_to_heuristic() {
        let summarizer = create_summarizer(&SummarizerConfig::default()).unwrap();
        assert_eq!(summarizer.backend_name(), "heuristic");
    }
}
