use std::fmt;

use crate::error::{PseudoError, Result};

/// Genomic strand/orientation of a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strand {
    Plus,
    Minus,
}

impl Strand {
    /// Parse `+` / `-`. Anything else is rejected.
    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Strand::Plus),
            "-" => Some(Strand::Minus),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A contiguous genomic interval on a named chromosome.
/// Coordinates are 0-based, half-open: [start, end)
///
/// Fields are private so the `start < end` / non-empty chromosome invariant
/// holds for every value that exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenomicInterval {
    chrom: String,
    start: u32,
    end: u32,
}

impl GenomicInterval {
    pub fn new(chrom: impl Into<String>, start: u32, end: u32) -> Result<Self> {
        let chrom = chrom.into();
        let reason = if chrom.trim().is_empty() {
            Some("empty chromosome name")
        } else if start >= end {
            Some("start must be less than end")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(PseudoError::InvalidInterval {
                chrom,
                start,
                end,
                reason,
            }),
            None => Ok(Self { chrom, start, end }),
        }
    }

    #[inline]
    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    #[inline]
    pub fn start(&self) -> u32 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> u32 {
        self.end
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Always false: the constructor rejects empty intervals.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    pub fn overlaps(&self, other: &GenomicInterval) -> bool {
        self.chrom == other.chrom && self.overlaps_coords(other.start, other.end)
    }

    #[inline]
    pub fn contains(&self, other: &GenomicInterval) -> bool {
        self.chrom == other.chrom && self.contains_coords(other.start, other.end)
    }

    /// Overlap test on coordinates only (chromosome already resolved).
    #[inline]
    pub fn overlaps_coords(&self, start: u32, end: u32) -> bool {
        self.start < end && start < self.end
    }

    /// Containment test on coordinates only (chromosome already resolved).
    #[inline]
    pub fn contains_coords(&self, start: u32, end: u32) -> bool {
        self.start <= start && end <= self.end
    }
}

impl fmt::Display for GenomicInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_rejects_empty_and_inverted() {
        assert!(GenomicInterval::new("chr1", 10, 10).is_err());
        assert!(GenomicInterval::new("chr1", 20, 10).is_err());
        assert!(GenomicInterval::new("", 1, 10).is_err());
        let iv = GenomicInterval::new("chr1", 10, 20).unwrap();
        assert_eq!(iv.len(), 10);
        assert_eq!(iv.to_string(), "chr1:10-20");
    }

    #[test]
    fn half_open_overlap_and_containment() {
        let a = GenomicInterval::new("chr1", 100, 200).unwrap();
        let touching = GenomicInterval::new("chr1", 200, 300).unwrap();
        let inside = GenomicInterval::new("chr1", 120, 200).unwrap();
        let other_chr = GenomicInterval::new("chr2", 120, 200).unwrap();

        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&inside));
        assert!(a.contains(&inside));
        assert!(!a.contains(&touching));
        assert!(!a.overlaps(&other_chr));
        assert!(a.contains_coords(100, 200));
    }

    #[test]
    fn strand_symbols() {
        assert_eq!(Strand::from_symbol("+"), Some(Strand::Plus));
        assert_eq!(Strand::from_symbol("-"), Some(Strand::Minus));
        assert_eq!(Strand::from_symbol("."), None);
        assert_eq!(Strand::Minus.to_string(), "-");
    }
}
