//! featurecount - strand-aware read-to-feature assignment and counting.
//!
//! This library turns a stream of aligned sequencing reads plus a gene
//! annotation into per-gene read counts, htseq-count style. Alignment and
//! annotation records arrive already parsed from collaborators; this engine
//! owns the overlap index, the CIGAR interval decomposition, the overlap
//! resolution policies and the count table.
//!
//! # Features
//!
//! - Overlap-queryable per-chromosome interval index, immutable after load
//! - CIGAR decomposition into strand-tagged matched intervals
//! - Union / intersection-strict / intersection-nonempty resolution policies
//! - Stranded, unstranded and reverse-stranded matching
//! - Per-fragment filter pipeline (unmapped, multi-mapped, low quality)
//! - Mergeable shard-local count tables with fixed diagnostic counters
//!
//! # Example
//!
//! ```ignore
//! use featurecount::annotation::AnnotationLoader;
//! use featurecount::config::Config;
//! use featurecount::shard::count_fragments;
//!
//! let config = Config::default();
//! let mut loader = AnnotationLoader::new(&config);
//! for record in annotation_records {
//!     loader.load(&record)?;
//! }
//! let index = loader.finish();
//!
//! let table = count_fragments(fragments, &index, &config);
//! for (feature, count) in table.iter() {
//!     println!("{}\t{}", feature, count);
//! }
//! ```

pub mod annotation;
pub mod config;
pub mod counter;
pub mod index;
pub mod shard;
pub mod table;
pub mod types;

pub use annotation::{AnnotationLoader, AnnotationLoadError};
pub use config::{Config, OverlapMode, StrandMode};
pub use counter::AlignmentClassifier;
pub use index::{GenomicIntervalIndex, IntervalIndexBuilder, UnknownChromosome};
pub use shard::{count_fragments, count_fragments_parallel};
pub use table::CountTable;
pub use types::{
    AlignmentRecord, AnnotationRecord, CigarElement, CigarOp, Fragment, GenomicInterval, Strand,
    Verdict,
};
