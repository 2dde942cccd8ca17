// Per-candidate working directories for aligner input and output

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::Error;
use crate::junction::CandidateJunction;

/// Where a candidate's sequence and hit files live, chosen once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TempPolicy {
    /// Keep `<root>/<chrom>_<start>_<end>/` after scoring
    Retain { root: PathBuf },
    /// Use a temporary directory removed when the candidate finishes
    Discard,
}

impl TempPolicy {
    pub fn new(retain: bool, root: &Path) -> Self {
        if retain {
            Self::Retain {
                root: root.to_path_buf(),
            }
        } else {
            Self::Discard
        }
    }

    /// Create the retained root. Nothing to do when discarding.
    pub fn prepare(&self) -> Result<(), Error> {
        match self {
            Self::Retain { root } => fs::create_dir_all(root).map_err(|e| Error::io(e, root)),
            Self::Discard => Ok(()),
        }
    }

    /// Working directory for one candidate.
    pub fn work_dir(&self, candidate: &CandidateJunction) -> Result<WorkDir, Error> {
        match self {
            Self::Retain { root } => {
                let dir = root.join(candidate.dir_name());
                fs::create_dir_all(&dir).map_err(|e| Error::io(e, &dir))?;
                Ok(WorkDir::Retained(dir))
            }
            Self::Discard => {
                let dir = tempfile::Builder::new()
                    .prefix("csscore_")
                    .tempdir()
                    .map_err(|e| Error::io(e, std::env::temp_dir()))?;
                Ok(WorkDir::Scoped(dir))
            }
        }
    }
}

/// A candidate's working directory. `Scoped` is deleted on drop.
#[derive(Debug)]
pub enum WorkDir {
    Retained(PathBuf),
    Scoped(TempDir),
}

impl WorkDir {
    pub fn path(&self) -> &Path {
        match self {
            Self::Retained(dir) => dir,
            Self::Scoped(dir) => dir.path(),
        }
    }

    pub fn is_retained(&self) -> bool {
        matches!(self, Self::Retained(_))
    }
}
