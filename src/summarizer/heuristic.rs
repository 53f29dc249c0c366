//! Local, deterministic summary backend.
//!
//! Needs no network or model files: the title comes from the first clause, the summary
//! from the leading sentences, tags from a small topic lexicon plus frequent keywords,
//! and sentiment from a word lexicon with short-range negation.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{
    collapse_whitespace, truncate_words, RawSummary, SummaryBackend, MAX_SUMMARY_CHARS,
    MAX_TITLE_CHARS,
};
use crate::error::Result;
use crate::notes::Sentiment;

/// Words kept in a derived title.
const TITLE_WORDS: usize = 6;
/// Sentences kept in a derived summary.
const SUMMARY_SENTENCES: usize = 3;
/// Keyword tags added after topic tags.
const MAX_KEYWORDS: usize = 3;
/// Tags produced per note.
const MAX_HEURISTIC_TAGS: usize = 5;
const MIN_KEYWORD_CHARS: usize = 4;
const NEGATION_WINDOW: usize = 2;

const TOPICS: &[(&str, &[&str])] = &[
    ("errands", &["buy", "milk", "groceries", "grocery", "shop", "shopping", "pickup", "store", "pharmacy", "laundry", "bread", "eggs", "errand", "errands"]),
    ("work", &["report", "meeting", "deadline", "email", "project", "client", "presentation", "office", "manager", "review", "slides", "work"]),
    ("calls", &["call", "phone", "voicemail", "callback"]),
    ("health", &["doctor", "gym", "workout", "dentist", "medicine", "yoga", "appointment", "health"]),
    ("finance", &["pay", "bill", "bills", "rent", "budget", "invoice", "bank", "tax", "taxes", "salary"]),
    ("travel", &["flight", "hotel", "trip", "train", "airport", "passport", "booking", "vacation"]),
    ("family", &["mom", "dad", "kids", "family", "birthday", "sister", "brother", "wife", "husband"]),
    ("ideas", &["idea", "ideas", "brainstorm", "concept"]),
];

const STOPWORDS: &[&str] = &[
    "about", "after", "again", "also", "because", "been", "before", "being", "could", "does",
    "doing", "dont", "from", "going", "have", "having", "into", "just", "like", "make", "more",
    "most", "need", "needs", "only", "other", "over", "really", "remember", "should", "some",
    "still", "sure", "than", "that", "their", "them", "then", "there", "these", "they", "thing",
    "things", "this", "those", "through", "today", "tomorrow", "very", "want", "were", "what",
    "when", "where", "which", "while", "will", "with", "would", "your", "yours",
];

const POSITIVE: &[&str] = &[
    "good", "great", "happy", "love", "loved", "excited", "awesome", "nice", "glad", "success",
    "successful", "win", "won", "enjoy", "enjoyed", "thanks", "grateful", "fun", "excellent",
    "amazing", "wonderful", "proud", "relaxed", "progress", "finished", "celebrate",
];

const NEGATIVE: &[&str] = &[
    "bad", "sad", "angry", "hate", "worried", "worry", "stress", "stressed", "stressful", "tired",
    "fail", "failed", "failure", "problem", "problems", "sick", "annoyed", "terrible", "awful",
    "late", "broken", "overdue", "urgent", "frustrated", "upset", "lost", "missed", "anxious",
];

const NEGATORS: &[&str] = &["not", "never", "no", "dont", "didnt", "isnt", "wasnt", "cant", "wont"];

/// The built-in backend. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicSummarizer;

impl HeuristicSummarizer {
    pub fn analyze(&self, text: &str) -> RawSummary {
        RawSummary {
            title: title_for(text),
            summary: condense(text, MAX_SUMMARY_CHARS),
            tags: tags_for(text),
            sentiment: sentiment_for(text).as_str().to_string(),
        }
    }
}

#[async_trait]
impl SummaryBackend for HeuristicSummarizer {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn generate(&self, text: &str) -> Result<RawSummary> {
        Ok(self.analyze(text))
    }
}

/// Leading words of the first clause that contains any letters or digits, with the
/// first letter capitalized. Empty if the text has no such clause.
pub fn title_for(text: &str) -> String {
    let clause = text
        .split(&[',', ';', ':', '.', '!', '?', '\n'][..])
        .map(str::trim)
        .find(|c| c.chars().any(char::is_alphanumeric))
        .unwrap_or("");

    let words: Vec<&str> = clause.split_whitespace().take(TITLE_WORDS).collect();
    let title = truncate_words(&words.join(" "), MAX_TITLE_CHARS);

    let mut chars = title.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The leading sentences of `text`, each terminated, within `max_chars`.
pub fn condense(text: &str, max_chars: usize) -> String {
    let mut out = String::new();
    for sentence in sentences(text).into_iter().take(SUMMARY_SENTENCES) {
        let candidate = if out.is_empty() {
            sentence
        } else {
            format!("{out} {sentence}")
        };
        if candidate.chars().count() > max_chars {
            if out.is_empty() {
                out = truncate_words(&candidate, max_chars);
            }
            break;
        }
        out = candidate;
    }
    out
}

/// Topic tags in lexicon order, then the most frequent remaining keywords.
pub fn tags_for(text: &str) -> Vec<String> {
    let words = words(text);

    let mut tags: Vec<String> = TOPICS
        .iter()
        .filter(|(_, lexicon)| words.iter().any(|w| lexicon.contains(&w.as_str())))
        .map(|(topic, _)| topic.to_string())
        .collect();

    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, word) in words.iter().enumerate() {
        let is_keyword = word.chars().count() >= MIN_KEYWORD_CHARS
            && word.chars().all(|c| c.is_ascii_alphabetic())
            && !STOPWORDS.contains(&word.as_str())
            && !TOPICS.iter().any(|(_, lexicon)| lexicon.contains(&word.as_str()));
        if is_keyword {
            counts.entry(word.as_str()).or_insert((0, position)).0 += 1;
        }
    }
    let mut keywords: Vec<(&str, (usize, usize))> = counts.into_iter().collect();
    // most frequent first, then earliest
    keywords.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));

    tags.extend(
        keywords
            .into_iter()
            .take(MAX_KEYWORDS)
            .map(|(word, _)| word.to_string()),
    );
    tags.truncate(MAX_HEURISTIC_TAGS);
    tags
}

/// Net lexicon score; a negator within the two preceding words flips a word.
pub fn sentiment_for(text: &str) -> Sentiment {
    let words = words(text);
    let mut score: i32 = 0;
    for (i, word) in words.iter().enumerate() {
        let polarity = if POSITIVE.contains(&word.as_str()) {
            1
        } else if NEGATIVE.contains(&word.as_str()) {
            -1
        } else {
            continue;
        };
        let negated = words[i.saturating_sub(NEGATION_WINDOW)..i]
            .iter()
            .any(|w| NEGATORS.contains(&w.as_str()));
        score += if negated { -polarity } else { polarity };
    }

    match score {
        s if s > 0 => Sentiment::Positive,
        s if s < 0 => Sentiment::Negative,
        _ => Sentiment::Neutral,
    }
}

/// Lowercase alphanumeric words, apostrophes folded (`don't` → `dont`).
fn words(text: &str) -> Vec<String> {
    text.chars()
        .filter(|c| *c != '\'' && *c != '\u{2019}')
        .collect::<String>()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Sentences split on `.`, `!`, `?` and newlines, whitespace collapsed, each ending in
/// punctuation.
fn sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if ch == '\n' {
            push_sentence(&mut out, &mut current);
            continue;
        }
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            push_sentence(&mut out, &mut current);
        }
    }
    push_sentence(&mut out, &mut current);
    out
}

fn push_sentence(out: &mut Vec<String>, current: &mut String) {
    let mut sentence = collapse_whitespace(current);
    current.clear();
    if !sentence.chars().any(char::is_alphanumeric) {
        return;
    }
    if !sentence.ends_with(&['.', '!', '?'][..]) {
        sentence.push('.');
    }
    out.push(sentence);
}
