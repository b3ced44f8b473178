//! Per-fragment classification: ordered pre-filters, then overlap resolution.
//!
//! The filter order is load-bearing: unmapped before multi-mapped before low
//! quality before resolution. A fragment failing an early filter must land in
//! that filter's counter even if it would also fail a later one.

use crate::config::Config;
use crate::counter::cigar::matched_intervals;
use crate::counter::resolve::resolve;
use crate::index::GenomicIntervalIndex;
use crate::types::{Fragment, GenomicInterval, Verdict};

/// Classifies fragments against a built annotation index.
///
/// Per-fragment failures (malformed record, unknown chromosome) become
/// [`Verdict::Invalid`]; no error escapes a call to [`classify`].
///
/// [`classify`]: AlignmentClassifier::classify
pub struct AlignmentClassifier<'a> {
    index: &'a GenomicIntervalIndex,
    config: &'a Config,
}

impl<'a> AlignmentClassifier<'a> {
    pub fn new(index: &'a GenomicIntervalIndex, config: &'a Config) -> Self {
        AlignmentClassifier { index, config }
    }

    /// Classify one fragment.
    ///
    /// Returns `None` only when the fragment is a secondary alignment and
    /// `ignore_secondary` is set: such fragments are skipped entirely and
    /// touch no counter, not even `total`.
    pub fn classify(&self, fragment: &Fragment) -> Option<Verdict> {
        if self.config.ignore_secondary && fragment.records().any(|r| r.secondary) {
            return None;
        }
        Some(self.classify_counted(fragment))
    }

    fn classify_counted(&self, fragment: &Fragment) -> Verdict {
        // 1. Unmapped: no mapped mate at all.
        if fragment.mapped_records().next().is_none() {
            return Verdict::Unmapped;
        }

        // 2. Multi-mapped: NH > 1 on any mate.
        if self.config.remove_nonunique
            && fragment.records().any(|r| r.nh.map_or(false, |nh| nh > 1))
        {
            return Verdict::MultiMapped;
        }

        // 3. Low mapping quality on any mapped mate. An unset quality is not
        // by itself low.
        let min_quality = self.config.min_mapping_quality;
        if fragment
            .mapped_records()
            .any(|r| r.mapping_quality.map_or(false, |q| q < min_quality))
        {
            return Verdict::LowQuality;
        }

        // 4. Resolve the union of both mates' matched intervals.
        let mut sub_intervals: Vec<GenomicInterval> = Vec::new();
        for record in fragment.mapped_records() {
            match matched_intervals(record, self.config.strand_mode) {
                Ok(intervals) => sub_intervals.extend(intervals),
                Err(_) => return Verdict::Invalid,
            }
        }

        let features = match resolve(
            &sub_intervals,
            self.index,
            self.config.overlap_mode,
            self.config.strand_mode,
        ) {
            Ok(features) => features,
            Err(_) => return Verdict::Invalid,
        };

        match features.len() {
            0 => Verdict::NoFeature,
            1 => {
                let id = *features.iter().next().unwrap();
                Verdict::Assigned(self.index.feature_name(id).to_string())
            }
            _ => Verdict::Ambiguous,
        }
    }
}
