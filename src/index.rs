//! Overlap-queryable store of annotation intervals.
//!
//! The index is built once from annotation records and never mutated
//! afterwards, so worker threads can share it behind an `Arc` without
//! locking. Per chromosome, entries are kept sorted by start; queries binary
//! search to the first entry that could still overlap (bounded by the longest
//! interval on that chromosome) and scan forward from there.

use ahash::AHashMap;
use indexmap::IndexSet;
use std::fmt;

use crate::types::{GenomicInterval, Strand};

/// Compact id for an interned feature name.
pub type FeatureId = u32;

/// One stored annotation interval. The feature name is interned; resolve it
/// through [`GenomicIntervalIndex::feature_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
    pub feature: FeatureId,
}

impl IndexEntry {
    /// Whether this entry covers the given base position.
    pub fn covers(&self, pos: i64) -> bool {
        self.start <= pos && pos <= self.end
    }
}

/// Query error: the chromosome was never seen during load.
///
/// Distinct from an empty overlap set; a read on a chromosome absent from the
/// annotation is an invalid record, not a feature-less one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChromosome {
    pub chrom: String,
}

impl fmt::Display for UnknownChromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown chromosome: {}", self.chrom)
    }
}

impl std::error::Error for UnknownChromosome {}

#[derive(Debug, Clone, Default)]
struct ChromEntries {
    entries: Vec<IndexEntry>,
    /// Longest interval length on this chromosome, for query lookback.
    max_length: i64,
}

/// Load-phase accumulator for the interval index.
///
/// Insertions are only possible here; [`IntervalIndexBuilder::build`] consumes
/// the builder and yields the immutable, queryable index.
#[derive(Debug, Clone, Default)]
pub struct IntervalIndexBuilder {
    chroms: AHashMap<String, ChromEntries>,
    feature_names: IndexSet<String>,
}

impl IntervalIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one interval for the given feature.
    pub fn insert(&mut self, interval: GenomicInterval, feature_id: &str) {
        let (feature, _) = self.feature_names.insert_full(feature_id.to_string());
        let chrom = self.chroms.entry(interval.chrom).or_default();
        if interval.end - interval.start + 1 > chrom.max_length {
            chrom.max_length = interval.end - interval.start + 1;
        }
        chrom.entries.push(IndexEntry {
            start: interval.start,
            end: interval.end,
            strand: interval.strand,
            feature: feature as FeatureId,
        });
    }

    /// Finish loading: sort every chromosome and freeze the index.
    pub fn build(mut self) -> GenomicIntervalIndex {
        for chrom in self.chroms.values_mut() {
            chrom
                .entries
                .sort_by(|a, b| (a.start, a.end, a.feature).cmp(&(b.start, b.end, b.feature)));
        }
        GenomicIntervalIndex {
            chroms: self.chroms,
            feature_names: self.feature_names,
        }
    }
}

/// Immutable, overlap-queryable annotation index.
#[derive(Debug, Clone)]
pub struct GenomicIntervalIndex {
    chroms: AHashMap<String, ChromEntries>,
    /// Feature names in first-seen load order.
    feature_names: IndexSet<String>,
}

impl GenomicIntervalIndex {
    /// All entries on `chrom` intersecting `[start, end]`.
    ///
    /// O(log n + k): binary search to the earliest entry whose interval could
    /// reach `start`, then a forward scan until entries begin past `end`.
    pub fn query(
        &self,
        chrom: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<IndexEntry>, UnknownChromosome> {
        let chrom_entries = self.chroms.get(chrom).ok_or_else(|| UnknownChromosome {
            chrom: chrom.to_string(),
        })?;

        let entries = &chrom_entries.entries;
        let earliest = start - chrom_entries.max_length + 1;
        let from = entries.partition_point(|e| e.start < earliest);

        let mut hits = Vec::new();
        for entry in &entries[from..] {
            if entry.start > end {
                break;
            }
            if entry.end >= start {
                hits.push(*entry);
            }
        }
        Ok(hits)
    }

    /// Resolve an interned feature id back to its name.
    pub fn feature_name(&self, id: FeatureId) -> &str {
        self.feature_names
            .get_index(id as usize)
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    /// All known feature names, in first-seen load order.
    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.feature_names.iter().map(|s| s.as_str())
    }

    /// Number of known features.
    pub fn num_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Number of stored intervals across all chromosomes.
    pub fn num_intervals(&self) -> usize {
        self.chroms.values().map(|c| c.entries.len()).sum()
    }

    /// Whether the chromosome was seen during load.
    pub fn has_chromosome(&self, chrom: &str) -> bool {
        self.chroms.contains_key(chrom)
    }
}
