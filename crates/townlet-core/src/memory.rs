//! Append-only memory stream with TF-IDF relevance retrieval.
//!
//! Each agent owns one stream. Records are never mutated or removed; the
//! document-frequency index only ever grows. Retrieval scores each record by
//! cosine relevance against the query, exponential recency decay, and a
//! normalized importance, summed into a composite.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use contracts::{ScoredMemoryView, SimTime};

/// Hourly recency decay factor.
const RECENCY_DECAY: f64 = 0.99;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "was", "were", "been", "has", "had", "have", "not", "but", "with",
    "you", "your", "they", "them", "their", "she", "her", "him", "his", "its", "this", "that",
    "these", "those", "from", "into", "about", "than", "then", "there", "here", "when", "what",
    "who", "will", "would", "could", "should", "very", "just", "also", "some", "any", "all", "out",
    "over", "under", "again", "more", "most", "own", "same", "can", "did", "does", "doing", "because",
];

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    Observation,
    Action,
    Reflection,
}

impl MemoryKind {
    pub fn label(&self) -> &'static str {
        match self {
            MemoryKind::Observation => "observation",
            MemoryKind::Action => "action",
            MemoryKind::Reflection => "reflection",
        }
    }
}

/// One stored memory. Immutable once appended.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRecord {
    pub id: u64,
    pub time: SimTime,
    pub text: String,
    pub kind: MemoryKind,
    /// Always in `[1, 10]`.
    pub importance: i64,
    term_freqs: BTreeMap<String, u32>,
}

/// A retrieval hit with its score breakdown.
#[derive(Debug, Clone)]
pub struct ScoredMemory {
    pub record: MemoryRecord,
    pub relevance: f64,
    pub recency: f64,
    pub importance: f64,
    pub total: f64,
}

impl ScoredMemory {
    pub fn view(&self) -> ScoredMemoryView {
        ScoredMemoryView {
            id: self.record.id,
            time: self.record.time,
            text: self.record.text.clone(),
            kind: self.record.kind.label().to_string(),
            importance: self.record.importance,
            relevance: self.relevance,
            recency: self.recency,
            importance_score: self.importance,
            total: self.total,
        }
    }
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

/// Lowercase, keep Unicode alphanumerics, split on everything else, drop
/// single characters and stopwords.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= 2)
        .filter(|token| !STOPWORDS.contains(token))
        .map(str::to_string)
        .collect()
}

fn term_freqs(tokens: &[String]) -> BTreeMap<String, u32> {
    let mut freqs = BTreeMap::new();
    for token in tokens {
        *freqs.entry(token.clone()).or_insert(0) += 1;
    }
    freqs
}

// ---------------------------------------------------------------------------
// Stream
// ---------------------------------------------------------------------------

/// One agent's full experience, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStream {
    records: Vec<MemoryRecord>,
    doc_freq: BTreeMap<String, u32>,
    next_id: u64,
}

impl MemoryStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[MemoryRecord] {
        &self.records
    }

    pub fn doc_freq(&self, token: &str) -> u32 {
        self.doc_freq.get(token).copied().unwrap_or(0)
    }

    /// Appends a record. Importance is clamped to `[1, 10]`; term
    /// frequencies are computed once and the document-frequency index is
    /// bumped for each distinct token.
    pub fn append(&mut self, time: SimTime, text: &str, kind: MemoryKind, importance: i64) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let freqs = term_freqs(&tokenize(text));
        for token in freqs.keys() {
            *self.doc_freq.entry(token.clone()).or_insert(0) += 1;
        }
        self.records.push(MemoryRecord {
            id,
            time,
            text: text.to_string(),
            kind,
            importance: importance.clamp(1, 10),
            term_freqs: freqs,
        });
        id
    }

    /// Last `n` records, oldest first.
    pub fn recent(&self, n: usize) -> &[MemoryRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }

    fn idf(&self, token: &str) -> f64 {
        let n = self.records.len().max(1) as f64;
        let df = self.doc_freq(token) as f64;
        ((n + 1.0) / (df + 1.0)).ln() + 1.0
    }

    fn tfidf_vector(&self, freqs: &BTreeMap<String, u32>) -> BTreeMap<String, f64> {
        freqs
            .iter()
            .map(|(token, tf)| (token.clone(), f64::from(*tf) * self.idf(token)))
            .collect()
    }

    fn cosine(a: &BTreeMap<String, f64>, b: &BTreeMap<String, f64>) -> f64 {
        let dot: f64 = a
            .iter()
            .filter_map(|(token, wa)| b.get(token).map(|wb| wa * wb))
            .sum();
        let norm_a: f64 = a.values().map(|w| w * w).sum::<f64>().sqrt();
        let norm_b: f64 = b.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot / (norm_a * norm_b)
    }

    /// Scores every record against `query` and returns the top `k` by
    /// composite score, ties keeping insertion order.
    pub fn retrieve(
        &self,
        query: &str,
        now: SimTime,
        k: usize,
        kind_filter: Option<&[MemoryKind]>,
    ) -> Vec<ScoredMemory> {
        if k == 0 || self.records.is_empty() {
            return Vec::new();
        }
        let query_vec = self.tfidf_vector(&term_freqs(&tokenize(query)));
        let mut scored: Vec<ScoredMemory> = self
            .records
            .iter()
            .filter(|record| match kind_filter {
                Some(kinds) => kinds.contains(&record.kind),
                None => true,
            })
            .map(|record| {
                let record_vec = self.tfidf_vector(&record.term_freqs);
                let relevance = Self::cosine(&query_vec, &record_vec);
                let recency = RECENCY_DECAY.powf(now.hours_since(record.time));
                let importance = record.importance as f64 / 10.0;
                ScoredMemory {
                    record: record.clone(),
                    relevance,
                    recency,
                    importance,
                    total: relevance + recency + importance,
                }
            })
            .collect();
        scored.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }
}
