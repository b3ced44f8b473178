//! Core data structures for featurecount.
//!
//! This module contains the fundamental types shared by the annotation index,
//! the CIGAR interval extractor, the classifier and the count table.

use std::fmt;
use std::str::FromStr;

/// Strand orientation for genomic intervals and annotation features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
    Unstranded,
}

/// Error type for parsing strand from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStrandError;

impl fmt::Display for ParseStrandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid strand: expected '+', '-' or '.'")
    }
}

impl std::error::Error for ParseStrandError {}

impl FromStr for Strand {
    type Err = ParseStrandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            "." => Ok(Strand::Unstranded),
            _ => Err(ParseStrandError),
        }
    }
}

impl Strand {
    /// Convert strand to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strand::Forward => "+",
            Strand::Reverse => "-",
            Strand::Unstranded => ".",
        }
    }

    /// The opposite orientation. Unstranded stays unstranded.
    pub fn flipped(&self) -> Strand {
        match self {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
            Strand::Unstranded => Strand::Unstranded,
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A genomic interval with 1-based inclusive coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenomicInterval {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
}

impl GenomicInterval {
    /// Create a new interval.
    pub fn new(chrom: String, start: i64, end: i64, strand: Strand) -> Self {
        GenomicInterval {
            chrom,
            start,
            end,
            strand,
        }
    }

    /// Get the interval length (end - start + 1).
    pub fn length(&self) -> i64 {
        self.end - self.start + 1
    }

    /// Whether this interval intersects `[start, end]`. The chromosome
    /// name is the caller's concern; this only compares coordinates.
    pub fn intersects(&self, start: i64, end: i64) -> bool {
        self.start <= end && self.end >= start
    }
}

/// A single CIGAR operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CigarOp {
    /// M: alignment match (can be a sequence match or mismatch).
    Match,
    /// I: insertion to the reference.
    Insertion,
    /// D: deletion from the reference.
    Deletion,
    /// N: skipped region from the reference (intron).
    Skip,
    /// S: soft clipping.
    SoftClip,
    /// H: hard clipping.
    HardClip,
    /// P: padding.
    Padding,
    /// =: sequence match.
    SeqMatch,
    /// X: sequence mismatch.
    SeqMismatch,
}

/// Error type for parsing a CIGAR operation character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCigarOpError(pub char);

impl fmt::Display for ParseCigarOpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid CIGAR operation: '{}'", self.0)
    }
}

impl std::error::Error for ParseCigarOpError {}

impl CigarOp {
    /// Parse a CIGAR op from its SAM character.
    pub fn from_char(c: char) -> Result<Self, ParseCigarOpError> {
        match c {
            'M' => Ok(CigarOp::Match),
            'I' => Ok(CigarOp::Insertion),
            'D' => Ok(CigarOp::Deletion),
            'N' => Ok(CigarOp::Skip),
            'S' => Ok(CigarOp::SoftClip),
            'H' => Ok(CigarOp::HardClip),
            'P' => Ok(CigarOp::Padding),
            '=' => Ok(CigarOp::SeqMatch),
            'X' => Ok(CigarOp::SeqMismatch),
            _ => Err(ParseCigarOpError(c)),
        }
    }

    /// SAM character for this op.
    pub fn as_char(&self) -> char {
        match self {
            CigarOp::Match => 'M',
            CigarOp::Insertion => 'I',
            CigarOp::Deletion => 'D',
            CigarOp::Skip => 'N',
            CigarOp::SoftClip => 'S',
            CigarOp::HardClip => 'H',
            CigarOp::Padding => 'P',
            CigarOp::SeqMatch => '=',
            CigarOp::SeqMismatch => 'X',
        }
    }

    /// Whether this op advances the reference position (M/D/N/=/X).
    pub fn consumes_reference(&self) -> bool {
        matches!(
            self,
            CigarOp::Match
                | CigarOp::Deletion
                | CigarOp::Skip
                | CigarOp::SeqMatch
                | CigarOp::SeqMismatch
        )
    }

    /// Whether this op consumes read bases (M/I/S/=/X).
    pub fn consumes_read(&self) -> bool {
        matches!(
            self,
            CigarOp::Match
                | CigarOp::Insertion
                | CigarOp::SoftClip
                | CigarOp::SeqMatch
                | CigarOp::SeqMismatch
        )
    }

    /// Whether this op aligns read bases to reference bases (M/=/X).
    pub fn is_match(&self) -> bool {
        self.consumes_reference() && self.consumes_read()
    }
}

/// One (length, op) run of a CIGAR string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CigarElement {
    pub len: i64,
    pub op: CigarOp,
}

impl CigarElement {
    pub fn new(len: i64, op: CigarOp) -> Self {
        CigarElement { len, op }
    }
}

/// The subset of a SAM/BAM alignment record this engine consumes.
///
/// Records arrive already parsed from a collaborator; this type carries no
/// sequence or quality strings. The SAM 255 "mapping quality unavailable"
/// sentinel is represented as `None`.
#[derive(Debug, Clone)]
pub struct AlignmentRecord {
    pub read_name: String,
    pub reference_name: String,
    /// 1-based leftmost mapping position.
    pub position: i64,
    pub cigar: Vec<CigarElement>,
    pub paired: bool,
    pub first_of_pair: bool,
    pub reverse_strand: bool,
    pub mate_reverse_strand: bool,
    pub secondary: bool,
    pub unmapped: bool,
    pub mapping_quality: Option<u8>,
    /// SAM NH tag: number of reported alignments for this read.
    pub nh: Option<u32>,
}

impl AlignmentRecord {
    /// Whether this record is a mapped alignment.
    pub fn is_mapped(&self) -> bool {
        !self.unmapped
    }
}

/// The unit of classification: a single-end record or a mate pair.
///
/// Either mate of a pair may be absent (mate never reported by the aligner).
#[derive(Debug, Clone)]
pub enum Fragment {
    Single(AlignmentRecord),
    Paired(Option<AlignmentRecord>, Option<AlignmentRecord>),
}

impl Fragment {
    /// Iterate over the records present in this fragment.
    pub fn records(&self) -> impl Iterator<Item = &AlignmentRecord> {
        let (a, b) = match self {
            Fragment::Single(r) => (Some(r), None),
            Fragment::Paired(r1, r2) => (r1.as_ref(), r2.as_ref()),
        };
        a.into_iter().chain(b)
    }

    /// Iterate over the mapped records in this fragment.
    pub fn mapped_records(&self) -> impl Iterator<Item = &AlignmentRecord> {
        self.records().filter(|r| r.is_mapped())
    }
}

/// One already-parsed annotation feature record (GTF/GFF collaborator input).
///
/// `feature_id` is the value of the configured parent attribute, e.g. the
/// gene_id an exon belongs to.
#[derive(Debug, Clone)]
pub struct AnnotationRecord {
    pub chrom: String,
    pub feature_type: String,
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
    pub feature_id: String,
}

/// The outcome of classifying one fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Resolved to exactly one feature.
    Assigned(String),
    /// Resolved to zero features.
    NoFeature,
    /// Resolved to two or more features.
    Ambiguous,
    /// Mapping quality below the configured minimum.
    LowQuality,
    /// NH tag > 1 with non-unique removal enabled.
    MultiMapped,
    /// No mapped mate.
    Unmapped,
    /// Malformed record or unknown chromosome.
    Invalid,
}

impl Verdict {
    /// The `(featureId, 1)` emission for external map/reduce summation.
    ///
    /// Returns the feature id for `Assigned` verdicts, `None` otherwise.
    pub fn emitted_feature(&self) -> Option<&str> {
        match self {
            Verdict::Assigned(id) => Some(id),
            _ => None,
        }
    }
}
