//! Annotation loading: parsed feature records in, interval index out.
//!
//! The loader keeps records whose feature type matches the configuration
//! (default "exon") and groups them under the parent-attribute value (default
//! "gene_id"). A malformed record is fatal: silently dropping it would
//! silently corrupt every downstream count.

use std::fmt;

use crate::config::Config;
use crate::index::{GenomicIntervalIndex, IntervalIndexBuilder};
use crate::types::{AnnotationRecord, GenomicInterval};

/// Fatal error raised by a malformed annotation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationLoadError {
    /// Record has no chromosome name.
    EmptyChromosome { feature_id: String },
    /// Record has no parent-attribute value to group under.
    EmptyFeatureId { chrom: String, start: i64, end: i64 },
    /// Coordinates violate 1 <= start <= end.
    InvalidCoordinates {
        chrom: String,
        start: i64,
        end: i64,
    },
}

impl fmt::Display for AnnotationLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationLoadError::EmptyChromosome { feature_id } => {
                write!(f, "annotation record for '{}' has no chromosome", feature_id)
            }
            AnnotationLoadError::EmptyFeatureId { chrom, start, end } => {
                write!(
                    f,
                    "annotation record {}:{}-{} has no feature id",
                    chrom, start, end
                )
            }
            AnnotationLoadError::InvalidCoordinates { chrom, start, end } => {
                write!(
                    f,
                    "annotation record {}:{}-{} has invalid coordinates",
                    chrom, start, end
                )
            }
        }
    }
}

impl std::error::Error for AnnotationLoadError {}

/// Builds a [`GenomicIntervalIndex`] from a stream of annotation records.
pub struct AnnotationLoader {
    builder: IntervalIndexBuilder,
    feature_type: String,
    loaded: usize,
    skipped: usize,
}

impl AnnotationLoader {
    /// Create a loader filtering to `config.feature_type`.
    pub fn new(config: &Config) -> Self {
        AnnotationLoader {
            builder: IntervalIndexBuilder::new(),
            feature_type: config.feature_type.clone(),
            loaded: 0,
            skipped: 0,
        }
    }

    /// Consume one annotation record.
    ///
    /// Records of a different feature type are skipped; malformed records of
    /// the configured type are a fatal [`AnnotationLoadError`].
    pub fn load(&mut self, record: &AnnotationRecord) -> Result<(), AnnotationLoadError> {
        if record.feature_type != self.feature_type {
            self.skipped += 1;
            return Ok(());
        }

        if record.chrom.is_empty() {
            return Err(AnnotationLoadError::EmptyChromosome {
                feature_id: record.feature_id.clone(),
            });
        }
        if record.feature_id.is_empty() {
            return Err(AnnotationLoadError::EmptyFeatureId {
                chrom: record.chrom.clone(),
                start: record.start,
                end: record.end,
            });
        }
        if record.start < 1 || record.end < record.start {
            return Err(AnnotationLoadError::InvalidCoordinates {
                chrom: record.chrom.clone(),
                start: record.start,
                end: record.end,
            });
        }

        self.builder.insert(
            GenomicInterval::new(record.chrom.clone(), record.start, record.end, record.strand),
            &record.feature_id,
        );
        self.loaded += 1;
        Ok(())
    }

    /// Number of records inserted so far.
    pub fn loaded(&self) -> usize {
        self.loaded
    }

    /// Number of records skipped for having a different feature type.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Finish loading and freeze the index.
    pub fn finish(self) -> GenomicIntervalIndex {
        self.builder.build()
    }
}
