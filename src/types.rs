use std::fmt;

use serde::{Serialize, Deserialize};

/// Genomic strand/orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize )]
pub enum Strand {
    Plus,
    Minus,
    Unknown,
}

impl Strand {
    /// Parse a GTF/GFF3 strand column. `.` and `?` map to `Unknown`.
    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Strand::Plus),
            "-" => Some(Strand::Minus),
            "." | "?" => Some(Strand::Unknown),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
            Strand::Unknown => '.',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One exon of a transcript.
/// Coordinates are 1-based, inclusive: [start, end]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize )]
pub struct Exon {
    pub start: u64,
    pub end: u64,
}

impl Exon {
    /// Create a new exon. Panics if start > end.
    pub fn new(start: u64, end: u64) -> Self {
        assert!(start <= end, "Exon requires start <= end");
        Self { start, end }
    }

    #[inline]
    pub fn contains(self, pos: u64) -> bool {
        self.start <= pos && pos <= self.end
    }

    /// Distance from `pos` to the nearer of the two exon boundaries.
    /// Only meaningful when `pos` lies inside the exon.
    #[inline]
    pub fn boundary_distance(self, pos: u64) -> u64 {
        (pos - self.start).min(self.end - pos)
    }

    /// Check that `exons` are sorted by start and do not overlap.
    ///
    /// The splice scan stops early once it is past the variant; that is only
    /// correct on an ordered, non-overlapping list. Returns the index of the
    /// first offending exon.
    pub fn check_ordered(exons: &[Exon]) -> Result<(), usize> {
        for (i, w) in exons.windows(2).enumerate() {
            if w[1].start <= w[0].end {
                return Err(i + 1);
            }
        }
        Ok(())
    }
}

/// A point variant on a chromosome.
///
/// `start` is the 0-based input position and `end = start + 1`, so `end`
/// doubles as the 1-based coordinate compared against exon boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
}

impl Variant {
    pub fn new(chrom: impl Into<String>, pos0: u64) -> Self {
        Self {
            chrom: chrom.into(),
            start: pos0,
            end: pos0 + 1,
        }
    }

    /// Build from a 1-based position (VCF POS).
    pub fn from_one_based(chrom: impl Into<String>, pos1: u64) -> Self {
        Self::new(chrom, pos1.saturating_sub(1))
    }

    /// 1-based coordinate of the variant.
    #[inline]
    pub fn position(&self) -> u64 {
        self.end
    }
}
