//! Discovery and profiling scans.
//!
//! Both scans pull documents strictly in order from a source, stop at the
//! scan limit, and own all of their aggregation state until they return.
//! Source errors abort the scan and are handed back unchanged.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::num::NonZeroU64;
use std::time::Instant;
use tracing::info;

use crate::classify::{NumberLabels, TypeClassifier};
use crate::document::{Document, FieldPath};
use crate::paths::field_paths;

// ============================================================================
// Options
// ============================================================================

/// How many documents a scan may consume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanLimit {
    #[default]
    Unbounded,
    Documents(NonZeroU64),
}

impl ScanLimit {
    /// Positive values bound the scan; zero and negatives mean a full scan.
    pub fn from_signed(limit: i64) -> Self {
        u64::try_from(limit)
            .ok()
            .and_then(NonZeroU64::new)
            .map_or(ScanLimit::Unbounded, ScanLimit::Documents)
    }

    pub fn max_documents(self) -> Option<u64> {
        match self {
            ScanLimit::Unbounded => None,
            ScanLimit::Documents(n) => Some(n.get()),
        }
    }

    fn take_count(self) -> usize {
        self.max_documents()
            .map_or(usize::MAX, |n| usize::try_from(n).unwrap_or(usize::MAX))
    }
}

impl fmt::Display for ScanLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanLimit::Unbounded => f.write_str("unbounded"),
            ScanLimit::Documents(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    pub limit: ScanLimit,
    pub number_labels: NumberLabels,
    /// Log a progress line every N documents.
    pub progress_interval: Option<NonZeroU64>,
}

impl ScanOptions {
    pub fn with_limit(limit: ScanLimit) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    fn should_report(&self, documents: u64) -> bool {
        self.progress_interval
            .is_some_and(|every| documents % every.get() == 0)
    }
}

// ============================================================================
// Profile types
// ============================================================================

/// Label → occurrence count, ordered by label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeCounts(BTreeMap<String, u64>);

impl TypeCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the label at 1, or bump its existing count.
    pub fn increment(&mut self, label: &str) {
        match self.0.get_mut(label) {
            Some(count) => *count += 1,
            None => {
                self.0.insert(label.to_string(), 1);
            }
        }
    }

    pub fn get(&self, label: &str) -> u64 {
        self.0.get(label).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum over all labels; equals the path's occurrence count.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.0.iter().map(|(label, count)| (label.as_str(), *count))
    }

    /// `label=count` pairs sorted by label, joined with `"; "`.
    pub fn summary(&self) -> String {
        self.iter()
            .map(|(label, count)| format!("{label}={count}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for TypeCounts {
    fn from_iter<T: IntoIterator<Item = (S, u64)>>(iter: T) -> Self {
        TypeCounts(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Per-path statistics from one profiling scan.
///
/// `present_count` counts documents (at most once each), while
/// `non_null_count` and `type_counts` count occurrences: a document holding
/// an array of three objects with key `k` adds 1 to `present_count` of the
/// nested path and up to 3 to the other two. Reports built on these numbers
/// depend on that split, so it is kept as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldProfile {
    pub field: FieldPath,
    pub total_docs: u64,
    pub present_count: u64,
    pub non_null_count: u64,
    pub type_counts: TypeCounts,
}

impl FieldProfile {
    /// Documents in which the path does not occur at all.
    pub fn missing_count(&self) -> u64 {
        self.total_docs.saturating_sub(self.present_count)
    }

    /// Share of documents missing the path, in percent. Zero for an empty
    /// scan.
    pub fn missing_pct(&self) -> f64 {
        if self.total_docs == 0 {
            return 0.0;
        }
        self.missing_count() as f64 * 100.0 / self.total_docs as f64
    }

    pub fn types_summary(&self) -> String {
        self.type_counts.summary()
    }
}

/// Result of a profiling scan: the document count plus one profile per path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSummary {
    pub total_docs: u64,
    pub profiles: Vec<FieldProfile>,
}

// ============================================================================
// Accumulators
// ============================================================================

/// Collects the distinct field paths of the documents it observes.
#[derive(Debug, Default)]
pub struct FieldDiscoverer {
    fields: BTreeSet<FieldPath>,
    documents: u64,
}

impl FieldDiscoverer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, doc: &Document) {
        self.documents += 1;
        for (path, _) in field_paths(doc) {
            self.fields.insert(path);
        }
    }

    pub fn documents(&self) -> u64 {
        self.documents
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Paths in lexicographic order.
    pub fn finish(self) -> Vec<FieldPath> {
        self.fields.into_iter().collect()
    }
}

#[derive(Debug, Default)]
struct FieldStats {
    present_count: u64,
    non_null_count: u64,
    type_counts: TypeCounts,
}

/// Accumulates per-path counters across documents.
#[derive(Debug, Default)]
pub struct FieldProfiler {
    classifier: TypeClassifier,
    stats: BTreeMap<FieldPath, FieldStats>,
    total_docs: u64,
    seen: HashSet<FieldPath>,
}

impl FieldProfiler {
    pub fn new(number_labels: NumberLabels) -> Self {
        Self {
            classifier: TypeClassifier::new(number_labels),
            ..Self::default()
        }
    }

    pub fn observe(&mut self, doc: &Document) {
        self.total_docs += 1;
        self.seen.clear();

        for (path, value) in field_paths(doc) {
            if !self.seen.contains(&path) {
                self.seen.insert(path.clone());
            }
            let stats = self.stats.entry(path).or_default();
            stats.type_counts.increment(&self.classifier.label(value));
            if !value.is_null() {
                stats.non_null_count += 1;
            }
        }

        // Presence is per document: bumped once per distinct path, after
        // every occurrence in this document has been counted.
        for path in self.seen.drain() {
            if let Some(stats) = self.stats.get_mut(&path) {
                stats.present_count += 1;
            }
        }
    }

    pub fn total_docs(&self) -> u64 {
        self.total_docs
    }

    pub fn field_count(&self) -> usize {
        self.stats.len()
    }

    /// One profile per observed path, sorted by path.
    pub fn finish(self) -> ProfileSummary {
        let total_docs = self.total_docs;
        let profiles = self
            .stats
            .into_iter()
            .map(|(field, stats)| FieldProfile {
                field,
                total_docs,
                present_count: stats.present_count,
                non_null_count: stats.non_null_count,
                type_counts: stats.type_counts,
            })
            .collect();
        ProfileSummary {
            total_docs,
            profiles,
        }
    }
}

// ============================================================================
// Scans
// ============================================================================

/// Sorted distinct field paths of the first `limit` documents of `source`.
pub fn discover<I, E>(source: I, limit: ScanLimit) -> Result<Vec<FieldPath>, E>
where
    I: IntoIterator<Item = Result<Document, E>>,
{
    discover_with(source, &ScanOptions::with_limit(limit))
}

pub fn discover_with<I, E>(source: I, options: &ScanOptions) -> Result<Vec<FieldPath>, E>
where
    I: IntoIterator<Item = Result<Document, E>>,
{
    let started = Instant::now();
    let mut discoverer = FieldDiscoverer::new();

    for doc in source.into_iter().take(options.limit.take_count()) {
        discoverer.observe(&doc?);
        if options.should_report(discoverer.documents()) {
            info!(
                documents = discoverer.documents(),
                fields = discoverer.field_count(),
                "discovery progress"
            );
        }
    }

    info!(
        documents = discoverer.documents(),
        fields = discoverer.field_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "field discovery finished"
    );
    Ok(discoverer.finish())
}

/// Profiles of every path in the first `limit` documents, sorted by path.
pub fn profile<I, E>(source: I, limit: ScanLimit) -> Result<Vec<FieldProfile>, E>
where
    I: IntoIterator<Item = Result<Document, E>>,
{
    profile_with(source, &ScanOptions::with_limit(limit)).map(|summary| summary.profiles)
}

pub fn profile_with<I, E>(source: I, options: &ScanOptions) -> Result<ProfileSummary, E>
where
    I: IntoIterator<Item = Result<Document, E>>,
{
    let started = Instant::now();
    let mut profiler = FieldProfiler::new(options.number_labels);

    for doc in source.into_iter().take(options.limit.take_count()) {
        profiler.observe(&doc?);
        if options.should_report(profiler.total_docs()) {
            info!(
                documents = profiler.total_docs(),
                fields = profiler.field_count(),
                "profiling progress"
            );
        }
    }

    info!(
        documents = profiler.total_docs(),
        fields = profiler.field_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "field profiling finished"
    );
    Ok(profiler.finish())
}
