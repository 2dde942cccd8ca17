/// Run statistics tracking and reporting
use log::info;

use crate::junction::SkipReason;

/// Counts of candidate records by outcome
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RunStats {
    /// Non-comment records read from the candidate list
    pub records: u64,
    /// Intronic circRNAs skipped
    pub skipped_circular_intron: u64,
    /// Records without both flanking introns
    pub skipped_missing_intron: u64,
    /// Candidates with a winning pairing
    pub scored: u64,
    /// Candidates scored without any across pairing
    pub no_pairing: u64,
    /// Candidates lost to aligner or sequence errors
    pub failed: u64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::CircularIntron => self.skipped_circular_intron += 1,
            SkipReason::MissingIntron => self.skipped_missing_intron += 1,
        }
    }

    /// Candidates handed to the scoring pool
    pub fn candidates(&self) -> u64 {
        self.records - self.skipped_circular_intron - self.skipped_missing_intron
    }

    /// Print summary statistics to log
    pub fn print_summary(&self) {
        if self.records == 0 {
            info!("No candidate records processed");
            return;
        }

        info!("=== Complementary Score Summary ===");
        info!("Input records: {}", self.records);
        info!("Skipped ciRNA records: {}", self.skipped_circular_intron);
        info!(
            "Skipped records without flanking introns: {}",
            self.skipped_missing_intron
        );

        let candidates = self.candidates();
        if candidates == 0 {
            info!("No candidates scored");
            return;
        }

        let pct = |n: u64| 100.0 * n as f64 / candidates as f64;
        info!("Candidates: {}", candidates);
        info!("With pairing: {} ({:.2}%)", self.scored, pct(self.scored));
        info!("Without pairing: {} ({:.2}%)", self.no_pairing, pct(self.no_pairing));
        if self.failed > 0 {
            info!("Failed: {} ({:.2}%)", self.failed, pct(self.failed));
        }
    }
}
