/// Per-candidate scoring and the parallel run driver
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::align::{AlignmentHit, BlastnAligner, LocalAligner};
use crate::error::Error;
use crate::genome::{write_fasta, IndexedGenome};
use crate::io::{format_score, ScoreWriter, TempPolicy};
use crate::junction::{read_candidates, CandidateJunction, InvalidRecord};
use crate::pairing::{
    filter_hits, select_best, ArmPairings, BestPairing, FilterParams, PairingKind, Region,
    RegionClusters,
};
use crate::params::Parameters;
use crate::stats::RunStats;

const LEFT_FASTA: &str = "left_intron.fa";
const RIGHT_FASTA: &str = "right_intron.fa";
const ACROSS_HITS: &str = "across_blast.txt";

/// Region column value when no pairing was found
const NO_REGION: &str = "NULL";

/// Scoring outcome of one candidate junction.
#[derive(Debug, Clone, PartialEq)]
pub struct JunctionResult {
    /// `chrom\tstart\tend`
    pub id: String,
    pub chrom: String,
    /// `None` when no across pairing scored above zero
    pub best: Option<BestPairing>,
}

impl JunctionResult {
    pub fn new(candidate: &CandidateJunction, best: Option<BestPairing>) -> Self {
        Self {
            id: candidate.id(),
            chrom: candidate.chrom.clone(),
            best,
        }
    }

    fn region_string(&self, region: Option<Region>) -> String {
        match region {
            Some(r) => format!("{}:{}-{}", self.chrom, r.start, r.end),
            None => NO_REGION.to_string(),
        }
    }
}

impl fmt::Display for JunctionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (scores, left, right) = match &self.best {
            Some(b) => (
                [
                    b.complementary_score,
                    b.symmetry_score,
                    b.pairing_potential,
                    b.across_score,
                ],
                Some(b.left_region),
                Some(b.right_region),
            ),
            None => ([0.0; 4], None, None),
        };

        write!(f, "{}", self.id)?;
        for s in scores {
            write!(f, "\t{}", format_score(s))?;
        }
        write!(
            f,
            "\t{}\t{}",
            self.region_string(left),
            self.region_string(right)
        )
    }
}

/// Reduce the three hit lists of a candidate to its best pairing.
pub fn score_hits(
    candidate: &CandidateJunction,
    across_hits: &[AlignmentHit],
    left_hits: &[AlignmentHit],
    right_hits: &[AlignmentHit],
    filter: &FilterParams,
) -> JunctionResult {
    let left_offset = candidate.left_intron.start as i64;
    let right_offset = candidate.right_intron.start as i64;

    let across = filter_hits(
        across_hits,
        PairingKind::Across {
            left_offset,
            right_offset,
            left_end: candidate.left_intron.end as i64,
        },
        filter,
    );
    let left_pairs = filter_hits(
        left_hits,
        PairingKind::Within {
            offset: left_offset,
        },
        filter,
    );
    let right_pairs = filter_hits(
        right_hits,
        PairingKind::Within {
            offset: right_offset,
        },
        filter,
    );

    let left_clusters = RegionClusters::build(&left_pairs, filter.min_length);
    let right_clusters = RegionClusters::build(&right_pairs, filter.min_length);

    let best = select_best(
        &across,
        candidate.span(),
        ArmPairings::new(&left_pairs, &left_clusters),
        ArmPairings::new(&right_pairs, &right_clusters),
    );

    JunctionResult::new(candidate, best)
}

/// Fetch, align and score one candidate.
pub fn score_candidate<A: LocalAligner + ?Sized>(
    candidate: &CandidateJunction,
    genome: &mut IndexedGenome,
    aligner: &A,
    policy: &TempPolicy,
    filter: &FilterParams,
) -> Result<JunctionResult, Error> {
    let work = policy.work_dir(candidate)?;
    let left_fa = work.path().join(LEFT_FASTA);
    let right_fa = work.path().join(RIGHT_FASTA);

    let left_seq = genome.fetch(&candidate.left_intron)?;
    let right_seq = genome.fetch(&candidate.right_intron)?;
    write_fasta(&left_fa, &candidate.left_intron.to_string(), &left_seq)?;
    write_fasta(&right_fa, &candidate.right_intron.to_string(), &right_seq)?;

    let across_hits = aligner.align(&left_fa, &right_fa)?;
    let left_hits = aligner.align(&left_fa, &left_fa)?;
    let right_hits = aligner.align(&right_fa, &right_fa)?;

    if work.is_retained() {
        write_hits(&work.path().join(ACROSS_HITS), &across_hits)?;
    }

    Ok(score_hits(
        candidate,
        &across_hits,
        &left_hits,
        &right_hits,
        filter,
    ))
}

fn write_hits(path: &Path, hits: &[AlignmentHit]) -> Result<(), Error> {
    let file = File::create(path).map_err(|e| Error::io(e, path))?;
    let mut writer = BufWriter::new(file);
    for hit in hits {
        writeln!(writer, "{}", hit).map_err(|e| Error::io(e, path))?;
    }
    writer.flush().map_err(|e| Error::io(e, path))
}

/// Score every candidate with blastn.
pub fn run(params: &Parameters) -> anyhow::Result<()> {
    let aligner = BlastnAligner::new(
        &params.blastn,
        params.blastn_params(),
        params.aligner_timeout(),
    );
    run_with(params, &aligner)
}

/// Score every candidate with the given aligner and write the report.
pub fn run_with<A: LocalAligner>(params: &Parameters, aligner: &A) -> anyhow::Result<()> {
    params.validate()?;

    info!("csscore v{}", env!("CARGO_PKG_VERSION"));
    info!("circ file: {}", params.circ_file.display());
    info!("genome: {}", params.genome.display());
    info!("threads: {}", params.thread);

    let mut stats = RunStats::new();
    let records = read_candidates(&params.circ_file, &mut stats)?;

    // Builds a missing index before any rayon job opens its own handle
    IndexedGenome::open(&params.genome)?;

    let policy = TempPolicy::new(params.tmp, &params.output);
    policy.prepare()?;

    let report_path = params.report_path();
    let mut writer = ScoreWriter::create(&report_path)?;

    let filter = params.filter_params();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(params.thread)
        .build()?;

    info!("Scoring {} candidates...", records.len());
    // map_init opens one genome handle per rayon job, not per thread
    let results: Vec<Result<JunctionResult, Error>> = pool.install(|| {
        records
            .par_iter()
            .map_init(
                || IndexedGenome::open(&params.genome),
                |genome, record| {
                    let candidate = record
                        .as_ref()
                        .map_err(|invalid| Error::Input(invalid.reason.clone()))?;
                    let genome = genome
                        .as_mut()
                        .map_err(|e| Error::Fasta(e.to_string()))?;
                    debug!("Scoring {}", candidate.dir_name());
                    score_candidate(candidate, genome, aligner, &policy, &filter)
                },
            )
            .collect()
    });

    for (record, result) in records.iter().zip(&results) {
        let id = record
            .as_ref()
            .map_or_else(InvalidRecord::id, CandidateJunction::id);
        match result {
            Ok(r) => {
                if r.best.is_some() {
                    stats.scored += 1;
                } else {
                    stats.no_pairing += 1;
                }
                writer.write_result(r)?;
            }
            Err(e) => {
                warn!("Candidate {} failed: {}", id.replace('\t', " "), e);
                stats.failed += 1;
                writer.write_failure(&id)?;
            }
        }
    }
    writer.flush()?;

    info!("Scores written to {}", report_path.display());
    stats.print_summary();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::GenomeRegion;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns fixed hits per alignment kind, keyed on the FASTA file names.
    struct CannedAligner {
        across: Vec<AlignmentHit>,
        left: Vec<AlignmentHit>,
        right: Vec<AlignmentHit>,
        calls: AtomicUsize,
    }

    impl CannedAligner {
        fn new(across: Vec<AlignmentHit>) -> Self {
            Self {
                across,
                left: Vec::new(),
                right: Vec::new(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl LocalAligner for CannedAligner {
        fn align(&self, query: &Path, subject: &Path) -> Result<Vec<AlignmentHit>, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let name = |p: &Path| p.file_name().and_then(|n| n.to_str()).map(str::to_string);
            match (name(query).as_deref(), name(subject).as_deref()) {
                (Some(LEFT_FASTA), Some(RIGHT_FASTA)) => Ok(self.across.clone()),
                (Some(LEFT_FASTA), Some(LEFT_FASTA)) => Ok(self.left.clone()),
                (Some(RIGHT_FASTA), Some(RIGHT_FASTA)) => Ok(self.right.clone()),
                other => Err(Error::Aligner(format!("unexpected pair {:?}", other))),
            }
        }
    }

    struct FailingAligner;

    impl LocalAligner for FailingAligner {
        fn align(&self, _query: &Path, _subject: &Path) -> Result<Vec<AlignmentHit>, Error> {
            Err(Error::AlignerTimeout(1))
        }
    }

    fn hit(qs: i64, qe: i64, ss: i64, se: i64, bits: f64) -> AlignmentHit {
        AlignmentHit {
            query_start: qs,
            query_end: qe,
            subject_start: ss,
            subject_end: se,
            evalue: 1e-30,
            bit_score: bits,
        }
    }

    fn candidate() -> CandidateJunction {
        CandidateJunction {
            chrom: "chr1".to_string(),
            start: 500,
            end: 6000,
            left_intron: GenomeRegion::new("chr1", 900, 1200),
            right_intron: GenomeRegion::new("chr1", 4900, 5200),
        }
    }

    /// chr1 of 7000 bases in 60-base lines.
    fn genome_fixture(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("genome.fa");
        let seq: String = "ACGTTGCA".repeat(875);
        let mut content = String::from(">chr1\n");
        for chunk in seq.as_bytes().chunks(60) {
            content.push_str(std::str::from_utf8(chunk).unwrap());
            content.push('\n');
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_score_hits_single_pairing() {
        let result = score_hits(
            &candidate(),
            &[hit(100, 200, 100, 200, 200.0)],
            &[],
            &[],
            &FilterParams::default(),
        );

        let best = result.best.unwrap();
        assert_eq!(best.left_region, Region::new(1000, 1100));
        assert_eq!(best.right_region, Region::new(5000, 5100));
        assert_eq!(best.pairing_potential, 1.0);
        assert!((best.symmetry_score - 0.6).abs() < 1e-12);
        assert!((best.complementary_score - 0.6 * best.across_score).abs() < 1e-9);
        assert!(result.to_string().ends_with("\tchr1:1000-1100\tchr1:5000-5100"));
    }

    #[test]
    fn test_score_hits_no_pairing() {
        // Too short to survive the length filter
        let result = score_hits(
            &candidate(),
            &[hit(100, 120, 100, 120, 50.0)],
            &[],
            &[],
            &FilterParams::default(),
        );
        assert_eq!(result.best, None);
        assert_eq!(
            result.to_string(),
            "chr1\t500\t6000\t0.0\t0.0\t0.0\t0.0\tNULL\tNULL"
        );
    }

    #[test]
    fn test_score_hits_self_pairing_competes() {
        let mut with_competition = score_hits(
            &candidate(),
            &[hit(100, 200, 100, 200, 200.0)],
            &[hit(100, 200, 150, 250, 100.0)],
            &[],
            &FilterParams::default(),
        );
        let alone = score_hits(
            &candidate(),
            &[hit(100, 200, 100, 200, 200.0)],
            &[],
            &[],
            &FilterParams::default(),
        );

        let competed = with_competition.best.take().unwrap();
        assert!(competed.pairing_potential < 1.0);
        assert!(competed.complementary_score < alone.best.unwrap().complementary_score);
    }

    #[test]
    fn test_score_candidate_retains_files() {
        let dir = tempfile::tempdir().unwrap();
        let fasta = genome_fixture(dir.path());
        let mut genome = IndexedGenome::open(&fasta).unwrap();
        let aligner = CannedAligner::new(vec![hit(100, 200, 100, 200, 200.0)]);
        let policy = TempPolicy::new(true, &dir.path().join("circ_cs"));
        policy.prepare().unwrap();

        let result = score_candidate(
            &candidate(),
            &mut genome,
            &aligner,
            &policy,
            &FilterParams::default(),
        )
        .unwrap();
        assert!(result.best.is_some());
        assert_eq!(aligner.calls.load(Ordering::SeqCst), 3);

        let work = dir.path().join("circ_cs").join("chr1_500_6000");
        let left = std::fs::read_to_string(work.join(LEFT_FASTA)).unwrap();
        assert!(left.starts_with(">chr1:900-1200\n"));
        assert_eq!(left.lines().skip(1).map(str::len).sum::<usize>(), 300);
        assert!(work.join(RIGHT_FASTA).exists());

        let across = std::fs::read_to_string(work.join(ACROSS_HITS)).unwrap();
        assert_eq!(across.lines().count(), 1);
        assert!(across.starts_with("100\t200\t100\t200\t"));
    }

    #[test]
    fn test_score_candidate_errors() {
        let dir = tempfile::tempdir().unwrap();
        let fasta = genome_fixture(dir.path());
        let mut genome = IndexedGenome::open(&fasta).unwrap();

        let err = score_candidate(
            &candidate(),
            &mut genome,
            &FailingAligner,
            &TempPolicy::Discard,
            &FilterParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::AlignerTimeout(_)));

        let mut off_genome = candidate();
        off_genome.right_intron = GenomeRegion::new("chr1", 6900, 7200);
        let err = score_candidate(
            &off_genome,
            &mut genome,
            &CannedAligner::new(Vec::new()),
            &TempPolicy::Discard,
            &FilterParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Fasta(_)));
    }

    #[test]
    fn test_run_with_writes_report_in_input_order() {
        use clap::Parser;

        let dir = tempfile::tempdir().unwrap();
        let fasta = genome_fixture(dir.path());
        let circ = dir.path().join("circ.txt");

        let row = |chrom: &str, start: u64, end: u64, introns: &str| {
            format!(
                "{chrom}\t{start}\t{end}\tcirc\t0\t+\t{start}\t{start}\t0,0,0\t1\t10\t0\t1\tcircRNA\tG\tT\t{introns}\n"
            )
        };
        let mut content = String::new();
        content.push_str(&row("chr1", 500, 6000, "chr1:900-1200|chr1:4900-5200"));
        content.push_str(&row("chr1", 700, 6100, "None|chr1:4900-5200"));
        content.push_str(&row("chrZ", 10, 20, "chrZ:0-10|chrZ:20-30"));
        content.push_str(&row("chr1", 1500, 4600, "chr1:900-1200|chr1:4900-5200"));
        content.push_str(&row("chr1", 2000, 6000, "chr1:900-1200|chr1:5200-4900"));
        std::fs::write(&circ, content).unwrap();

        let output = dir.path().join("out");
        let params = Parameters::try_parse_from([
            "csscore",
            circ.to_str().unwrap(),
            "-g",
            fasta.to_str().unwrap(),
            "-p",
            "2",
            "-o",
            output.to_str().unwrap(),
        ])
        .unwrap();

        let aligner = CannedAligner::new(vec![hit(100, 200, 100, 200, 200.0)]);
        run_with(&params, &aligner).unwrap();

        let report = std::fs::read_to_string(dir.path().join("out.txt")).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("chr1\t500\t6000\t"));
        assert!(lines[1].starts_with("chrZ\t10\t20\tNA\t"));
        assert!(lines[1].ends_with("FAILED\tFAILED"));
        assert!(lines[2].starts_with("chr1\t1500\t4600\t"));
        assert_eq!(lines[3], "chr1\t2000\t6000\tNA\tNA\tNA\tNA\tFAILED\tFAILED");
        assert!(!output.exists());
    }
}
