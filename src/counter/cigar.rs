//! CIGAR decomposition into strand-tagged matched reference intervals.

use std::fmt;

use crate::config::StrandMode;
use crate::types::{AlignmentRecord, GenomicInterval, Strand};

/// Per-record error: the alignment record cannot be decomposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedRecord {
    /// Mapped record with a position before the first reference base.
    InvalidPosition { read_name: String, position: i64 },
    /// Mapped record with no CIGAR operations.
    EmptyCigar { read_name: String },
    /// CIGAR operation with a non-positive run length.
    InvalidCigarLength { read_name: String, len: i64 },
}

impl fmt::Display for MalformedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedRecord::InvalidPosition {
                read_name,
                position,
            } => write!(f, "read '{}' has invalid position {}", read_name, position),
            MalformedRecord::EmptyCigar { read_name } => {
                write!(f, "mapped read '{}' has an empty CIGAR", read_name)
            }
            MalformedRecord::InvalidCigarLength { read_name, len } => {
                write!(f, "read '{}' has a CIGAR run of length {}", read_name, len)
            }
        }
    }
}

impl std::error::Error for MalformedRecord {}

/// Strand to tag this record's matched intervals with.
///
/// Single-end reads and first mates carry their own orientation; second mates
/// are inverted so both mates of a fragment agree. `StrandMode::Reverse`
/// flips the final result.
pub fn fragment_strand(record: &AlignmentRecord, strand_mode: StrandMode) -> Strand {
    let own = if record.reverse_strand {
        Strand::Reverse
    } else {
        Strand::Forward
    };

    let oriented = if record.paired && !record.first_of_pair {
        own.flipped()
    } else {
        own
    };

    match strand_mode {
        StrandMode::Reverse => oriented.flipped(),
        _ => oriented,
    }
}

/// Decompose a mapped record into its matched reference intervals.
///
/// Walks a 1-based position cursor over the CIGAR: match ops (M/=/X) emit
/// `[pos, pos + len - 1]` and advance the cursor, deletions and skips (D/N)
/// advance without emitting, and read-only ops (I/S/H/P) leave the cursor in
/// place. This is standard SAM reference-consumption semantics, pinned by
/// regression tests for leading clips and deletions.
pub fn matched_intervals(
    record: &AlignmentRecord,
    strand_mode: StrandMode,
) -> Result<Vec<GenomicInterval>, MalformedRecord> {
    if record.position < 1 {
        return Err(MalformedRecord::InvalidPosition {
            read_name: record.read_name.clone(),
            position: record.position,
        });
    }
    if record.cigar.is_empty() {
        return Err(MalformedRecord::EmptyCigar {
            read_name: record.read_name.clone(),
        });
    }

    let strand = fragment_strand(record, strand_mode);
    let mut pos = record.position;
    let mut intervals = Vec::new();

    for element in &record.cigar {
        if element.len <= 0 {
            return Err(MalformedRecord::InvalidCigarLength {
                read_name: record.read_name.clone(),
                len: element.len,
            });
        }
        if element.op.is_match() {
            intervals.push(GenomicInterval::new(
                record.reference_name.clone(),
                pos,
                pos + element.len - 1,
                strand,
            ));
            pos += element.len;
        } else if element.op.consumes_reference() {
            pos += element.len;
        }
        // Read-only ops (I/S/H/P) never move the reference cursor.
    }

    Ok(intervals)
}
