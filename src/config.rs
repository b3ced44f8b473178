//! Configuration and defaults for featurecount.
//!
//! All mode options are closed enums decided once at configuration time;
//! a bad mode string is a startup error, before any record is processed.

use std::fmt;
use std::str::FromStr;

/// Strand handling mode for overlap resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrandMode {
    /// Annotation strand must match the read strand.
    Yes,
    /// Strand is ignored.
    No,
    /// Annotation strand must match the opposite of the read strand.
    Reverse,
}

/// Error type for parsing strand mode from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStrandModeError;

impl fmt::Display for ParseStrandModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid strand mode: expected 'yes', 'no' or 'reverse'")
    }
}

impl std::error::Error for ParseStrandModeError {}

impl FromStr for StrandMode {
    type Err = ParseStrandModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(StrandMode::Yes),
            "no" => Ok(StrandMode::No),
            "reverse" => Ok(StrandMode::Reverse),
            _ => Err(ParseStrandModeError),
        }
    }
}

impl StrandMode {
    /// Convert strand mode to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrandMode::Yes => "yes",
            StrandMode::No => "no",
            StrandMode::Reverse => "reverse",
        }
    }
}

impl fmt::Display for StrandMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Policy for resolving reads that touch multiple features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlapMode {
    /// Union of features over all matched sub-intervals.
    Union,
    /// Per-base intersection; an uncovered base empties the result.
    IntersectionStrict,
    /// Per-base intersection over the covered bases only.
    IntersectionNonempty,
}

/// Error type for parsing overlap mode from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOverlapModeError;

impl fmt::Display for ParseOverlapModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid overlap mode: expected 'union', 'intersection-strict' or 'intersection-nonempty'"
        )
    }
}

impl std::error::Error for ParseOverlapModeError {}

impl FromStr for OverlapMode {
    type Err = ParseOverlapModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "union" => Ok(OverlapMode::Union),
            "intersection-strict" => Ok(OverlapMode::IntersectionStrict),
            "intersection-nonempty" => Ok(OverlapMode::IntersectionNonempty),
            _ => Err(ParseOverlapModeError),
        }
    }
}

impl OverlapMode {
    /// Convert overlap mode to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlapMode::Union => "union",
            OverlapMode::IntersectionStrict => "intersection-strict",
            OverlapMode::IntersectionNonempty => "intersection-nonempty",
        }
    }
}

impl fmt::Display for OverlapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration for the counting engine.
#[derive(Debug, Clone)]
pub struct Config {
    /// Strand handling mode.
    pub strand_mode: StrandMode,
    /// Overlap resolution policy.
    pub overlap_mode: OverlapMode,
    /// Annotation feature type to count (3rd GTF column).
    pub feature_type: String,
    /// Annotation attribute that groups features for counting.
    pub parent_attribute: String,
    /// Minimum mapping quality; records with a known quality below this are
    /// filtered. An unknown quality never triggers the filter.
    pub min_mapping_quality: u8,
    /// Filter reads with NH tag > 1.
    pub remove_nonunique: bool,
    /// Skip secondary alignments entirely.
    pub ignore_secondary: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            strand_mode: StrandMode::Yes,
            overlap_mode: OverlapMode::Union,
            feature_type: "exon".to_string(),
            parent_attribute: "gene_id".to_string(),
            min_mapping_quality: 10,
            remove_nonunique: true,
            ignore_secondary: false,
        }
    }
}

impl Config {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the strand and overlap modes from their string forms.
    ///
    /// This is the language-agnostic option surface; failures here are fatal
    /// configuration errors and no record may be processed after one.
    pub fn parse_modes(&mut self, stranded: &str, overlap: &str) -> Result<(), ConfigError> {
        self.strand_mode = stranded.parse().map_err(ConfigError::StrandMode)?;
        self.overlap_mode = overlap.parse().map_err(ConfigError::OverlapMode)?;
        Ok(())
    }
}

/// Fatal configuration error: a mode option did not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    StrandMode(ParseStrandModeError),
    OverlapMode(ParseOverlapModeError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::StrandMode(e) => write!(f, "{}", e),
            ConfigError::OverlapMode(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
