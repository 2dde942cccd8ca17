use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::align::BlastnParams;
use crate::error::Error;
use crate::pairing::FilterParams;

// ---------------------------------------------------------------------------
// Parameters struct
// ---------------------------------------------------------------------------

/// csscore command-line parameters.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "csscore",
    about = "Complementary sequence score of circRNA flanking introns",
    version
)]
pub struct Parameters {
    // ── Input ───────────────────────────────────────────────────────────
    /// Circular RNA file (CIRCexplorer format, plain or gzipped)
    #[arg(value_name = "CIRC_FILE")]
    pub circ_file: PathBuf,

    /// Genome FASTA file; an index (.fai) is built next to it when missing
    #[arg(short = 'g', long = "genome", value_name = "GENOME")]
    pub genome: PathBuf,

    // ── Scoring ─────────────────────────────────────────────────────────
    /// Minimum element length
    #[arg(short = 'l', long = "length", default_value_t = 50)]
    pub length: u32,

    /// Maximum e-value of a retained alignment hit
    #[arg(long = "max-evalue", default_value_t = 1e-5)]
    pub max_evalue: f64,

    // ── Run ─────────────────────────────────────────────────────────────
    /// Running threads
    #[arg(short = 'p', long = "thread", default_value_t = 10)]
    pub thread: usize,

    /// Output prefix: scores go to <OUT>.txt, kept work files to <OUT>/
    #[arg(short = 'o', long = "output", default_value = "circ_cs")]
    pub output: PathBuf,

    /// Keep temporary BLAST results
    #[arg(long = "tmp")]
    pub tmp: bool,

    // ── Aligner ─────────────────────────────────────────────────────────
    /// blastn executable
    #[arg(long = "blastn", default_value = "blastn")]
    pub blastn: PathBuf,

    /// Per-alignment timeout in seconds; 0 waits forever
    #[arg(long = "timeout", default_value_t = 600)]
    pub timeout: u64,

    /// Word size for the initial exact match
    #[arg(long = "word-size", default_value_t = 11)]
    pub word_size: u32,

    /// Cost to open a gap
    #[arg(long = "gap-open", default_value_t = 5)]
    pub gap_open: u32,

    /// Cost to extend a gap
    #[arg(long = "gap-extend", default_value_t = 2)]
    pub gap_extend: u32,

    /// Penalty for a nucleotide mismatch
    #[arg(long = "penalty", default_value_t = -3, allow_hyphen_values = true)]
    pub penalty: i32,

    /// Reward for a nucleotide match
    #[arg(long = "reward", default_value_t = 2)]
    pub reward: i32,
}

impl Parameters {
    /// Hit filter thresholds shared by all three alignments of a candidate.
    pub fn filter_params(&self) -> FilterParams {
        FilterParams {
            min_length: i64::from(self.length),
            max_evalue: self.max_evalue,
        }
    }

    /// blastn invocation settings.
    pub fn blastn_params(&self) -> BlastnParams {
        BlastnParams {
            word_size: self.word_size,
            gap_open: self.gap_open,
            gap_extend: self.gap_extend,
            penalty: self.penalty,
            reward: self.reward,
        }
    }

    /// Aligner timeout, `None` when disabled.
    pub fn aligner_timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }

    /// File receiving one score line per candidate.
    pub fn report_path(&self) -> PathBuf {
        let mut name = self.output.clone().into_os_string();
        name.push(".txt");
        PathBuf::from(name)
    }

    /// Validate parameter combinations that clap alone cannot enforce.
    pub fn validate(&self) -> Result<(), Error> {
        if self.length == 0 {
            return Err(Error::Parameter("--length must be >= 1".into()));
        }

        if self.thread == 0 {
            return Err(Error::Parameter("--thread must be >= 1".into()));
        }

        if !(self.max_evalue > 0.0) {
            return Err(Error::Parameter("--max-evalue must be > 0".into()));
        }

        if !self.circ_file.is_file() {
            return Err(Error::Parameter(format!(
                "circ file {} does not exist",
                self.circ_file.display()
            )));
        }

        if !self.genome.is_file() {
            return Err(Error::Parameter(format!(
                "genome file {} does not exist",
                self.genome.display()
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
