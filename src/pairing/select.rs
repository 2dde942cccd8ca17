// Selection of the best complementary pairing across the two introns

use crate::pairing::{compete_score, symmetry_score, Region, RegionClusters, RegionPair};

/// Self-alignment pairs of one intron together with their clusters.
#[derive(Debug, Clone, Copy)]
pub struct ArmPairings<'a> {
    pub pairs: &'a [RegionPair],
    pub clusters: &'a RegionClusters,
}

impl<'a> ArmPairings<'a> {
    pub fn new(pairs: &'a [RegionPair], clusters: &'a RegionClusters) -> Self {
        Self { pairs, clusters }
    }

    fn compete(&self, region: &Region) -> f64 {
        compete_score(region, self.clusters, self.pairs)
    }
}

/// Winning across pairing and its sub-scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestPairing {
    /// symmetry * pairing potential * across score
    pub complementary_score: f64,
    pub symmetry_score: f64,
    pub pairing_potential: f64,
    pub across_score: f64,
    pub left_region: Region,
    pub right_region: Region,
}

/// Pick the across pairing with the highest complementary score.
///
/// `junction` is the back-splice span `(start, end)`. Only strictly larger
/// scores replace the current best, so the first of equal pairings wins.
/// Returns `None` when no pairing scores above zero.
pub fn select_best(
    across: &[RegionPair],
    junction: (i64, i64),
    left: ArmPairings<'_>,
    right: ArmPairings<'_>,
) -> Option<BestPairing> {
    let (junction_start, junction_end) = junction;
    let mut best: Option<BestPairing> = None;
    let mut max_score = 0.0;

    for pair in across {
        let symmetry = symmetry_score(
            pair.region1.end,
            junction_start,
            junction_end,
            pair.region2.start,
        );
        let left_compete = left.compete(&pair.region1);
        let right_compete = right.compete(&pair.region2);

        let across_score = pair.score;
        let potential = across_score / (across_score + left_compete + right_compete);
        let complementary = symmetry * potential * across_score;

        if complementary > max_score {
            max_score = complementary;
            best = Some(BestPairing {
                complementary_score: complementary,
                symmetry_score: symmetry,
                pairing_potential: potential,
                across_score,
                left_region: pair.region1,
                right_region: pair.region2,
            });
        }
    }

    best
}
