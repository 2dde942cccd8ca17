/// Local alignment of intron sequences
///
/// The scorer only needs the tabular hits of a local aligner run on two
/// FASTA files. `LocalAligner` is that capability; `BlastnAligner` provides
/// it by running NCBI blastn.
pub mod blastn;
pub mod hit;

use std::path::Path;

use crate::error::Error;

// Re-export commonly used types
pub use blastn::{BlastnAligner, BlastnParams};
pub use hit::{parse_tabular, AlignmentHit};

/// Runs a reverse-complement local alignment between two sequence files.
pub trait LocalAligner: Sync {
    /// Align `query` against `subject`, returning hits with 1-based offsets
    /// local to the two sequences.
    fn align(&self, query: &Path, subject: &Path) -> Result<Vec<AlignmentHit>, Error>;
}
