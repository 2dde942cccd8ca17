/// Output and scratch-file handling
pub mod report;
pub mod workdir;

pub use report::{format_score, ScoreWriter};
pub use workdir::{TempPolicy, WorkDir};
