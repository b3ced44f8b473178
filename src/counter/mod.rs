//! Read-to-feature assignment: CIGAR decomposition, overlap resolution and
//! the per-fragment classification pipeline.

pub mod cigar;
pub mod classify;
pub mod resolve;

pub use cigar::{fragment_strand, matched_intervals, MalformedRecord};
pub use classify::AlignmentClassifier;
pub use resolve::resolve;
