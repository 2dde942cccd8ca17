/// blastn subprocess wrapper
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use crate::align::{parse_tabular, AlignmentHit, LocalAligner};
use crate::error::Error;

/// Interval between checks of a running aligner process.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// blastn scoring settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlastnParams {
    pub word_size: u32,
    pub gap_open: u32,
    pub gap_extend: u32,
    pub penalty: i32,
    pub reward: i32,
}

impl Default for BlastnParams {
    fn default() -> Self {
        Self {
            word_size: 11,
            gap_open: 5,
            gap_extend: 2,
            penalty: -3,
            reward: 2,
        }
    }
}

/// `LocalAligner` backed by an external blastn executable.
///
/// Only minus-strand (reverse-complement) hits are requested, in tabular
/// format 6.
#[derive(Debug, Clone)]
pub struct BlastnAligner {
    program: PathBuf,
    params: BlastnParams,
    timeout: Option<Duration>,
}

impl BlastnAligner {
    pub fn new(
        program: impl Into<PathBuf>,
        params: BlastnParams,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            program: program.into(),
            params,
            timeout,
        }
    }

    /// Full argument list for one query/subject pair.
    pub fn args(&self, query: &Path, subject: &Path) -> Vec<String> {
        let p = &self.params;
        vec![
            "-query".to_string(),
            query.display().to_string(),
            "-subject".to_string(),
            subject.display().to_string(),
            "-word_size".to_string(),
            p.word_size.to_string(),
            "-gapopen".to_string(),
            p.gap_open.to_string(),
            "-gapextend".to_string(),
            p.gap_extend.to_string(),
            "-penalty".to_string(),
            p.penalty.to_string(),
            "-reward".to_string(),
            p.reward.to_string(),
            "-strand".to_string(),
            "minus".to_string(),
            "-outfmt".to_string(),
            "6".to_string(),
        ]
    }

    /// Run blastn and return its raw tabular output.
    pub fn run(&self, query: &Path, subject: &Path) -> Result<String, Error> {
        let mut child = Command::new(&self.program)
            .args(self.args(query, subject))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                Error::Aligner(format!(
                    "failed to start {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        // Drain both pipes while waiting so a chatty process cannot block.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match self.timeout {
            Some(limit) => wait_with_timeout(&mut child, limit)?,
            None => child.wait()?,
        };

        let stdout = self.collect(stdout, "stdout")?;
        let stderr = self.collect(stderr, "stderr")?;

        if !status.success() {
            return Err(Error::Aligner(format!(
                "{} exited with {}: {}",
                self.program.display(),
                status,
                String::from_utf8_lossy(&stderr).trim()
            )));
        }

        String::from_utf8(stdout).map_err(|e| {
            Error::Aligner(format!(
                "{} wrote non-UTF-8 output: {}",
                self.program.display(),
                e
            ))
        })
    }

    /// Join a pipe reader, turning read failures into aligner errors.
    fn collect(&self, handle: Drained, pipe: &str) -> Result<Vec<u8>, Error> {
        match handle.join() {
            Ok(Ok(buf)) => Ok(buf),
            Ok(Err(e)) => Err(Error::Aligner(format!(
                "cannot read {} {}: {}",
                self.program.display(),
                pipe,
                e
            ))),
            Err(_) => Err(Error::Aligner(format!(
                "{} reader for {} panicked",
                pipe,
                self.program.display()
            ))),
        }
    }
}

impl Default for BlastnAligner {
    fn default() -> Self {
        Self::new("blastn", BlastnParams::default(), None)
    }
}

impl LocalAligner for BlastnAligner {
    fn align(&self, query: &Path, subject: &Path) -> Result<Vec<AlignmentHit>, Error> {
        let output = self.run(query, subject)?;
        let hits = parse_tabular(&output);
        debug!(
            "blastn {} vs {}: {} hits",
            query.display(),
            subject.display(),
            hits.len()
        );
        Ok(hits)
    }
}

type Drained = thread::JoinHandle<io::Result<Vec<u8>>>;

/// Read a child pipe to the end on a background thread.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Drained {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

/// Wait for the child, killing it once `limit` has elapsed.
fn wait_with_timeout(child: &mut Child, limit: Duration) -> Result<ExitStatus, Error> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::AlignerTimeout(limit.as_secs()));
        }
        thread::sleep(POLL_INTERVAL);
    }
}
