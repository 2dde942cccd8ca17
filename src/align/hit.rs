/// Tabular alignment hits (BLAST -outfmt 6)
use std::fmt;

use log::debug;

/// Number of columns in BLAST's default tabular format.
const TABULAR_COLUMNS: usize = 12;

/// One local alignment between a query and a subject sequence.
///
/// Offsets are 1-based within the aligned sequences, with
/// `subject_start <= subject_end` even for minus-strand hits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentHit {
    pub query_start: i64,
    pub query_end: i64,
    pub subject_start: i64,
    pub subject_end: i64,
    /// Expect value
    pub evalue: f64,
    /// Bit score
    pub bit_score: f64,
}

impl AlignmentHit {
    /// Parse one tabular line:
    /// `qseqid sseqid pident length mismatch gapopen qstart qend sstart send evalue bitscore`
    pub fn from_tabular(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        if fields.len() < TABULAR_COLUMNS {
            return None;
        }

        let int = |i: usize| fields[i].parse::<i64>().ok();
        let float = |i: usize| fields[i].parse::<f64>().ok();

        let (qstart, qend, sstart, send) = (int(6)?, int(7)?, int(8)?, int(9)?);

        Some(Self {
            query_start: qstart.min(qend),
            query_end: qstart.max(qend),
            subject_start: sstart.min(send),
            subject_end: sstart.max(send),
            evalue: float(10)?,
            bit_score: float(11)?,
        })
    }
}

impl fmt::Display for AlignmentHit {
    /// Coordinates, e-value and bit score, tab-separated.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{:e}\t{}",
            self.query_start,
            self.query_end,
            self.subject_start,
            self.subject_end,
            self.evalue,
            self.bit_score
        )
    }
}

/// Parse aligner output, skipping blank, comment and malformed lines.
pub fn parse_tabular(text: &str) -> Vec<AlignmentHit> {
    text.lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let hit = AlignmentHit::from_tabular(line);
            if hit.is_none() {
                debug!("Skipping malformed alignment line: {}", line);
            }
            hit
        })
        .collect()
}
