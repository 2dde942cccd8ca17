pub mod fasta;

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub use fasta::{write_fasta, IndexedGenome};

/// A genomic interval written as `chrom:start-end`.
///
/// Coordinates are 0-based half-open, as used for fetching sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenomeRegion {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
}

impl GenomeRegion {
    pub fn new(chrom: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            end,
        }
    }

    /// Length in bases.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

impl FromStr for GenomeRegion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Contig names may contain ':' themselves, so split on the last one
        let (chrom, range) = s
            .rsplit_once(':')
            .ok_or_else(|| Error::Region(format!("missing ':' in '{s}'")))?;
        let (start, end) = range
            .split_once('-')
            .ok_or_else(|| Error::Region(format!("missing '-' in '{s}'")))?;

        if chrom.is_empty() {
            return Err(Error::Region(format!("empty chromosome in '{s}'")));
        }

        let parse = |v: &str| {
            v.trim()
                .parse::<u64>()
                .map_err(|_| Error::Region(format!("invalid coordinate '{v}' in '{s}'")))
        };
        let (start, end) = (parse(start)?, parse(end)?);

        if end < start {
            return Err(Error::Region(format!("end before start in '{s}'")));
        }

        Ok(Self::new(chrom, start, end))
    }
}

impl fmt::Display for GenomeRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start, self.end)
    }
}
