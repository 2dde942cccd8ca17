/// Complementary pairing between the flanking introns of a back-splice
///
/// This module reduces raw alignment hits to a single complementary score:
/// - Hit filtering into genomic region pairs (`filter`)
/// - Clustering of self-alignment endpoints (`cluster`)
/// - Competition and symmetry scoring (`score`)
/// - Selection of the best across-intron pairing (`select`)
mod cluster;
mod filter;
mod score;
mod select;

pub use cluster::RegionClusters;
pub use filter::{filter_hits, pair_score, FilterParams, PairingKind};
pub use score::{compete_score, overlap, symmetry_score};
pub use select::{select_best, ArmPairings, BestPairing};

/// A genomic interval `(start, end)` on one intron arm.
///
/// Used directly as a map key for clustering, so two halves with the same
/// coordinates always refer to the same boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Region {
    pub start: i64,
    pub end: i64,
}

impl Region {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Span in bases.
    pub fn len(&self) -> i64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Two complementary regions found by one alignment hit, with the
/// distance-weighted pair score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionPair {
    pub region1: Region,
    pub region2: Region,
    pub score: f64,
}

impl RegionPair {
    pub fn new(region1: Region, region2: Region, score: f64) -> Self {
        Self {
            region1,
            region2,
            score,
        }
    }
}
