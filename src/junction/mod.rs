/// Candidate back-splice junctions from a CIRCexplorer circRNA list
///
/// Each record names the junction and, in column 17, the two flanking
/// introns as `left|right`. Intronic circRNAs and records lacking a
/// flanking intron are skipped.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use log::{debug, info, warn};

use crate::error::Error;
use crate::genome::GenomeRegion;
use crate::stats::RunStats;

/// 0-based column holding the circRNA type
const TYPE_COLUMN: usize = 13;
/// 0-based column holding the flanking introns
const INTRON_COLUMN: usize = 16;

const CIRCULAR_INTRON_TYPE: &str = "ciRNA";
const MISSING_INTRON: &str = "None";

/// One candidate junction with its flanking introns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateJunction {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub left_intron: GenomeRegion,
    pub right_intron: GenomeRegion,
}

impl CandidateJunction {
    /// Identifier written as the first three report columns.
    pub fn id(&self) -> String {
        format!("{}\t{}\t{}", self.chrom, self.start, self.end)
    }

    /// Name of the retained work directory for this candidate.
    pub fn dir_name(&self) -> String {
        format!("{}_{}_{}", self.chrom, self.start, self.end)
    }

    /// Junction span as signed coordinates for scoring.
    pub fn span(&self) -> (i64, i64) {
        (self.start as i64, self.end as i64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Intronic circRNA (`ciRNA`), which has no flanking introns to pair
    CircularIntron,
    /// First or last exon: one flanking intron is `None`
    MissingIntron,
}

/// A record whose junction id parsed but whose remaining fields did not.
///
/// It is reported as a failed candidate instead of aborting the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRecord {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    /// 1-based line number in the input
    pub line: usize,
    pub reason: String,
}

impl InvalidRecord {
    pub fn id(&self) -> String {
        format!("{}\t{}\t{}", self.chrom, self.start, self.end)
    }
}

/// A scorable candidate, or the failure to read one.
pub type CandidateRecord = Result<CandidateJunction, InvalidRecord>;

/// Classification of one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Candidate(CandidateJunction),
    Skip(SkipReason),
}

/// Parse one whitespace-delimited CIRCexplorer line.
pub fn parse_record(line: &str) -> Result<Record, Error> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() <= INTRON_COLUMN {
        return Err(Error::Input(format!(
            "expected at least {} columns, found {}",
            INTRON_COLUMN + 1,
            fields.len()
        )));
    }

    if fields[TYPE_COLUMN] == CIRCULAR_INTRON_TYPE {
        return Ok(Record::Skip(SkipReason::CircularIntron));
    }

    let (left, right) = fields[INTRON_COLUMN].split_once('|').ok_or_else(|| {
        Error::Input(format!(
            "intron column '{}' is not of the form left|right",
            fields[INTRON_COLUMN]
        ))
    })?;
    if left == MISSING_INTRON || right == MISSING_INTRON {
        return Ok(Record::Skip(SkipReason::MissingIntron));
    }

    let coord = |v: &str| {
        v.parse::<u64>()
            .map_err(|_| Error::Input(format!("invalid junction coordinate '{v}'")))
    };

    Ok(Record::Candidate(CandidateJunction {
        chrom: fields[0].to_string(),
        start: coord(fields[1])?,
        end: coord(fields[2])?,
        left_intron: left.parse()?,
        right_intron: right.parse()?,
    }))
}

/// Junction id (first three columns) of a line, if those parse.
fn parse_id(line: &str) -> Option<(String, u64, u64)> {
    let mut fields = line.split_whitespace();
    let chrom = fields.next()?;
    let start = fields.next()?.parse().ok()?;
    let end = fields.next()?.parse().ok()?;
    Some((chrom.to_string(), start, end))
}

/// Open a candidate list, decompressing `.gz` files on the fly.
fn open_input(path: &Path) -> Result<Box<dyn BufRead>, Error> {
    let file = File::open(path).map_err(|e| Error::io(e, path))?;

    let is_gzipped = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s == "gz")
        .unwrap_or(false);

    if is_gzipped {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Read every candidate from `path`, counting skipped records in `stats`.
///
/// A line whose junction id parses but whose other fields do not becomes
/// an `InvalidRecord`. A line without a usable id aborts the read with
/// its line number.
pub fn read_candidates(
    path: &Path,
    stats: &mut RunStats,
) -> Result<Vec<CandidateRecord>, Error> {
    let reader = open_input(path)?;
    let mut records = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::io(e, path))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        stats.records += 1;
        let line_num = idx + 1;
        let record = match parse_record(trimmed) {
            Ok(record) => record,
            Err(e) => {
                let reason = match e {
                    Error::Input(msg) => msg,
                    other => other.to_string(),
                };
                let Some((chrom, start, end)) = parse_id(trimmed) else {
                    return Err(Error::Input(format!(
                        "{}:{}: {}",
                        path.display(),
                        line_num,
                        reason
                    )));
                };
                warn!("{}:{}: {}", path.display(), line_num, reason);
                records.push(Err(InvalidRecord {
                    chrom,
                    start,
                    end,
                    line: line_num,
                    reason,
                }));
                continue;
            }
        };

        match record {
            Record::Candidate(candidate) => records.push(Ok(candidate)),
            Record::Skip(reason) => {
                debug!("Skipping line {} ({:?})", line_num, reason);
                stats.record_skip(reason);
            }
        }
    }

    info!(
        "Read {} candidate junctions from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}
