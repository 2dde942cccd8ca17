// Competition and symmetry scores of a candidate pairing

use crate::pairing::{Region, RegionClusters, RegionPair};

/// Overlap in bases of two half-open intervals.
pub fn overlap(a: &Region, b: &Region) -> i64 {
    (a.end.min(b.end) - a.start.max(b.start)).max(0)
}

/// Balance of the two arm lengths, in `(0, 1]`.
///
/// The left arm runs from `left_inner` to `left_outer`, the right arm from
/// `right_outer` to `right_inner`. Returns 0 when either arm is empty.
pub fn symmetry_score(left_inner: i64, left_outer: i64, right_outer: i64, right_inner: i64) -> f64 {
    let left = left_outer.abs_diff(left_inner);
    let right = right_inner.abs_diff(right_outer);
    if left == 0 || right == 0 {
        return 0.0;
    }
    left.min(right) as f64 / left.max(right) as f64
}

/// Pairing energy competing with `region` inside its own intron.
///
/// Every self-alignment pair with a half covering at least half of
/// `region` contributes `score * score / cluster_score`, where the cluster
/// is that of the pair's *other* half: the half overlapping `region` is
/// the one being competed for, its partner is where the competition comes
/// from.
pub fn compete_score(region: &Region, clusters: &RegionClusters, pairs: &[RegionPair]) -> f64 {
    let half = region.len() as f64 / 2.0;
    let mut total = 0.0;

    for pair in pairs {
        let partners = [
            (overlap(region, &pair.region1), &pair.region2),
            (overlap(region, &pair.region2), &pair.region1),
        ];
        for (covered, partner) in partners {
            if (covered as f64) < half {
                continue;
            }
            let Some(cluster_score) = clusters.reflected_score(partner) else {
                continue;
            };
            if cluster_score <= 0.0 {
                continue;
            }
            let potential = pair.score / cluster_score;
            total += pair.score * potential;
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a: (i64, i64), b: (i64, i64), score: f64) -> RegionPair {
        RegionPair::new(Region::new(a.0, a.1), Region::new(b.0, b.1), score)
    }

    #[test]
    fn test_overlap() {
        let a = Region::new(100, 200);
        assert_eq!(overlap(&a, &Region::new(150, 300)), 50);
        assert_eq!(overlap(&Region::new(150, 300), &a), 50);
        assert_eq!(overlap(&a, &Region::new(120, 130)), 10);
        assert_eq!(overlap(&a, &Region::new(200, 300)), 0);
        assert_eq!(overlap(&a, &Region::new(500, 600)), 0);
    }

    #[test]
    fn test_symmetry_equal_arms() {
        assert_eq!(symmetry_score(400, 500, 6000, 6100), 1.0);
    }

    #[test]
    fn test_symmetry_unequal_arms() {
        let s = symmetry_score(1100, 500, 6000, 5000);
        assert!((s - 0.6).abs() < 1e-12);

        for (l, r) in [(1, 2), (10, 3), (999, 1000)] {
            let s = symmetry_score(0, l, 0, r);
            assert!(s > 0.0 && s < 1.0);
        }
    }

    #[test]
    fn test_symmetry_empty_arm() {
        assert_eq!(symmetry_score(500, 500, 6000, 6100), 0.0);
    }

    #[test]
    fn test_compete_without_self_pairs() {
        let clusters = RegionClusters::default();
        assert_eq!(compete_score(&Region::new(0, 100), &clusters, &[]), 0.0);
    }

    #[test]
    fn test_compete_single_dominant_pair() {
        let pairs = vec![pair((1000, 1100), (3000, 3100), 8.0)];
        let clusters = RegionClusters::build(&pairs, 50);

        // Region fully covers region1; partner cluster holds only this pair.
        let score = compete_score(&Region::new(1000, 1100), &clusters, &pairs);
        assert!((score - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_compete_uses_partner_cluster() {
        // Partner (3000, 3100) is clustered with (3020, 3150) which carries
        // another pair; the competition is diluted by that cluster.
        let pairs = vec![
            pair((1000, 1100), (3000, 3100), 2.0),
            pair((3020, 3150), (7000, 7100), 6.0),
        ];
        let clusters = RegionClusters::build(&pairs, 50);
        assert_eq!(clusters.reflected_score(&Region::new(3000, 3100)), Some(8.0));

        let score = compete_score(&Region::new(1000, 1100), &clusters, &pairs);
        assert!((score - 2.0 * 2.0 / 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_compete_requires_half_coverage() {
        let pairs = vec![pair((1000, 1100), (3000, 3100), 4.0)];
        let clusters = RegionClusters::build(&pairs, 50);

        // 40 bases of a 100 base region
        assert_eq!(compete_score(&Region::new(1060, 1160), &clusters, &pairs), 0.0);
        // exactly half
        let score = compete_score(&Region::new(1050, 1150), &clusters, &pairs);
        assert!((score - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_compete_both_halves_count() {
        // A self pair whose halves both cover the region contributes twice.
        let pairs = vec![pair((1000, 1100), (1010, 1110), 5.0)];
        let clusters = RegionClusters::build(&pairs, 50);
        let score = compete_score(&Region::new(1000, 1100), &clusters, &pairs);
        assert!((score - 2.0 * 5.0 * 5.0 / 10.0).abs() < 1e-12);
    }
}
