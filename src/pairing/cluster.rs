// Clustering of self-alignment region endpoints

use std::collections::HashMap;

use crate::pairing::{Region, RegionPair};

/// Canonical clusters of the regions found by aligning one intron against
/// itself.
///
/// Every region half of the input maps (through `reflection`) to the
/// canonical region that starts its cluster; `score` holds the summed pair
/// score of each canonical cluster.
#[derive(Debug, Clone, Default)]
pub struct RegionClusters {
    score: HashMap<Region, f64>,
    reflection: HashMap<Region, Region>,
}

impl RegionClusters {
    /// Cluster the region halves of a self-alignment.
    ///
    /// Boundaries are swept in `(start, end)` order. A boundary joins the
    /// current canonical one when it starts at least `min_length` bases
    /// before the canonical end; otherwise it opens a new cluster. The
    /// canonical end is never widened by the boundaries it absorbs, so a
    /// chain of boundaries each overlapping only its predecessor can still
    /// be split into several clusters.
    pub fn build(pairs: &[RegionPair], min_length: i64) -> Self {
        let mut clusters = Self::default();

        let mut boundary_score: HashMap<Region, f64> = HashMap::new();
        for pair in pairs {
            *boundary_score.entry(pair.region1).or_insert(0.0) += pair.score;
            *boundary_score.entry(pair.region2).or_insert(0.0) += pair.score;
        }

        let mut boundaries: Vec<Region> = boundary_score.keys().copied().collect();
        boundaries.sort_unstable();

        let Some((&first, rest)) = boundaries.split_first() else {
            return clusters;
        };

        let mut canonical = first;
        clusters.reflection.insert(canonical, canonical);
        clusters.score.insert(canonical, boundary_score[&canonical]);

        for &boundary in rest {
            let own = boundary_score[&boundary];
            if canonical.end - boundary.start >= min_length {
                clusters.reflection.insert(boundary, canonical);
                *clusters.score.entry(canonical).or_insert(0.0) += own;
            } else {
                clusters.reflection.insert(boundary, boundary);
                clusters.score.insert(boundary, own);
                canonical = boundary;
            }
        }

        clusters
    }

    /// Canonical region of an observed region half.
    pub fn reflect(&self, region: &Region) -> Option<Region> {
        self.reflection.get(region).copied()
    }

    /// Summed score of a canonical cluster.
    pub fn cluster_score(&self, canonical: &Region) -> Option<f64> {
        self.score.get(canonical).copied()
    }

    /// Total score of the cluster a region half belongs to.
    pub fn reflected_score(&self, region: &Region) -> Option<f64> {
        self.reflect(region).and_then(|c| self.cluster_score(&c))
    }

    /// Number of canonical clusters.
    pub fn len(&self) -> usize {
        self.score.len()
    }

    pub fn is_empty(&self) -> bool {
        self.score.is_empty()
    }

    /// Number of distinct region halves seen.
    pub fn n_boundaries(&self) -> usize {
        self.reflection.len()
    }
}
