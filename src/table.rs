//! The count table: per-feature counts plus the fixed diagnostic counters.
//!
//! Per-feature counts live in an `IndexMap` so iteration order never depends
//! on hashing; `finalize` pins it to annotation load order. Tables from
//! independent shards merge by per-key summation, which is commutative and
//! associative, so shard scheduling cannot change the combined result.

use indexmap::IndexMap;

use crate::types::Verdict;

/// Per-feature counts and fixed diagnostic counters.
///
/// Created empty; mutated by exactly one increment per classified fragment;
/// finalized by zero-filling every known feature not otherwise touched.
/// The counters are never zero-filled — they start at zero and are always
/// reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountTable {
    counts: IndexMap<String, u64>,
    pub no_feature: u64,
    pub ambiguous: u64,
    pub too_low_aqual: u64,
    pub not_aligned: u64,
    pub alignment_not_unique: u64,
    pub invalid: u64,
    pub total: u64,
}

impl CountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one verdict: exactly one counter or per-feature increment, and
    /// `total` always.
    pub fn accumulate(&mut self, verdict: &Verdict) {
        match verdict {
            Verdict::Assigned(id) => {
                *self.counts.entry(id.clone()).or_insert(0) += 1;
            }
            Verdict::NoFeature => self.no_feature += 1,
            Verdict::Ambiguous => self.ambiguous += 1,
            Verdict::LowQuality => self.too_low_aqual += 1,
            Verdict::MultiMapped => self.alignment_not_unique += 1,
            Verdict::Unmapped => self.not_aligned += 1,
            Verdict::Invalid => self.invalid += 1,
        }
        self.total += 1;
    }

    /// Zero-fill untouched known features and pin iteration order to the
    /// given id order. Counters are left untouched.
    pub fn finalize<'a, I>(&mut self, known_feature_ids: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut ordered = IndexMap::new();
        for id in known_feature_ids {
            let count = self.counts.get(id).copied().unwrap_or(0);
            ordered.insert(id.to_string(), count);
        }
        // Ids counted but absent from the known list keep their counts.
        for (id, count) in self.counts.drain(..) {
            ordered.entry(id).or_insert(count);
        }
        self.counts = ordered;
    }

    /// Merge a shard-local table into this one by per-key summation.
    pub fn merge(&mut self, other: CountTable) {
        for (id, count) in other.counts {
            *self.counts.entry(id).or_insert(0) += count;
        }
        self.no_feature += other.no_feature;
        self.ambiguous += other.ambiguous;
        self.too_low_aqual += other.too_low_aqual;
        self.not_aligned += other.not_aligned;
        self.alignment_not_unique += other.alignment_not_unique;
        self.invalid += other.invalid;
        self.total += other.total;
    }

    /// Count for one feature (0 if never touched).
    pub fn count(&self, feature_id: &str) -> u64 {
        self.counts.get(feature_id).copied().unwrap_or(0)
    }

    /// Iterate per-feature counts in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(id, &count)| (id.as_str(), count))
    }

    /// Number of features present in the table.
    pub fn num_features(&self) -> usize {
        self.counts.len()
    }

    /// Sum of all per-feature counts.
    pub fn assigned_total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Whether `total` equals the sum of every count and counter.
    ///
    /// Holds for every run; a violation means a fragment was double-counted
    /// or dropped.
    pub fn is_conserved(&self) -> bool {
        self.total
            == self.assigned_total()
                + self.no_feature
                + self.ambiguous
                + self.too_low_aqual
                + self.not_aligned
                + self.alignment_not_unique
                + self.invalid
    }
}
