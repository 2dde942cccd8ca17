use std::path::PathBuf;

/// Errors that can occur in csscore.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    Parameter(String),

    #[error("I/O error: {source} ({path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("FASTA error: {0}")]
    Fasta(String),

    #[error("invalid region: {0}")]
    Region(String),

    #[error("candidate input error: {0}")]
    Input(String),

    #[error("aligner error: {0}")]
    Aligner(String),

    #[error("aligner timed out after {0}s")]
    AlignerTimeout(u64),
}

impl Error {
    /// Convenience for wrapping an `io::Error` with a path context.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            source: err,
            path: PathBuf::from("<unknown>"),
        }
    }
}
