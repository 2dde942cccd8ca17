// Alignment hit filtering and pair scoring

use log::debug;

use crate::align::AlignmentHit;
use crate::pairing::{Region, RegionPair};

/// Distance unit of the pair score (bases per kilobase).
const DISTANCE_SCALE: f64 = 1000.0;

/// Gap assumed for touching regions.
const MIN_GAP: i64 = 1;

/// Thresholds applied to every alignment hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    /// Minimum aligned span on both query and subject
    pub min_length: i64,
    /// Hits with a larger e-value are dropped
    pub max_evalue: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            min_length: 50,
            max_evalue: 1e-5,
        }
    }
}

/// Which pair of sequences produced the hits, with the genomic offsets of
/// the fetched windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingKind {
    /// Left intron (query) against right intron (subject)
    Across {
        left_offset: i64,
        right_offset: i64,
        /// Genomic end of the left intron window
        left_end: i64,
    },
    /// One intron against itself
    Within { offset: i64 },
}

/// Pair score of two regions `gap` bases apart: `raw / (gap / 1kb)^2`.
pub fn pair_score(left: i64, right: i64, raw_score: f64) -> f64 {
    let mut gap = right - left;
    if gap == 0 {
        gap = MIN_GAP;
    }
    let distance = (gap as f64 / DISTANCE_SCALE).powi(2);
    raw_score / distance
}

/// Convert raw hits to genomic region pairs.
///
/// A hit is dropped when (in order):
/// 1. it is the mirrored copy of a self-alignment (subject before query)
/// 2. either aligned span is shorter than `min_length`
/// 3. its e-value exceeds `max_evalue`
///
/// Across pairs are scored with the right intron placed directly after the
/// left intron's end, so only the offset inside the folded structure counts
/// and not the genomic gap between the two introns.
pub fn filter_hits(
    hits: &[AlignmentHit],
    kind: PairingKind,
    params: &FilterParams,
) -> Vec<RegionPair> {
    let mut pairs = Vec::with_capacity(hits.len());
    let mut dropped = 0usize;

    for hit in hits {
        if matches!(kind, PairingKind::Within { .. }) && hit.subject_start < hit.query_start {
            dropped += 1;
            continue;
        }
        if hit.query_end - hit.query_start < params.min_length
            || hit.subject_end - hit.subject_start < params.min_length
        {
            dropped += 1;
            continue;
        }
        if hit.evalue > params.max_evalue {
            dropped += 1;
            continue;
        }

        let pair = match kind {
            PairingKind::Across {
                left_offset,
                right_offset,
                left_end,
            } => {
                let region1 = Region::new(
                    left_offset + hit.query_start,
                    left_offset + hit.query_end,
                );
                let region2 = Region::new(
                    right_offset + hit.subject_start,
                    right_offset + hit.subject_end,
                );
                let folded_start = region2.start - right_offset + left_end;
                let score = pair_score(region1.end, folded_start, hit.bit_score);
                RegionPair::new(region1, region2, score)
            }
            PairingKind::Within { offset } => {
                let region1 = Region::new(offset + hit.query_start, offset + hit.query_end);
                let region2 = Region::new(offset + hit.subject_start, offset + hit.subject_end);
                let score = pair_score(region1.end, region2.start, hit.bit_score);
                RegionPair::new(region1, region2, score)
            }
        };
        pairs.push(pair);
    }

    debug!(
        "Kept {} of {} alignment hits ({} dropped)",
        pairs.len(),
        hits.len(),
        dropped
    );
    pairs
}
