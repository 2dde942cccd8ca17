pub mod error;
pub mod params;

pub mod align;
pub mod genome;
pub mod io;
pub mod junction;
pub mod pairing;
pub mod pipeline;
pub mod stats;

pub use pipeline::{run, run_with};
