// Complementary score report writer

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::pipeline::JunctionResult;

/// Score and region columns of a candidate that could not be scored.
const FAILED_COLUMNS: &str = "NA\tNA\tNA\tNA\tFAILED\tFAILED";

/// Render a score the way Python's `repr(float)` does.
///
/// Positional notation with at least one decimal for exponents in
/// `-4..16`, otherwise scientific with a signed two-digit exponent
/// (`1e-05`, `2.5e+16`).
pub fn format_score(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return format!("{:?}", value);
    }

    // Shortest round-trip digits, e.g. "1.5e16"
    let sci = format!("{:e}", value);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);

    if (-4..16).contains(&exp) {
        let plain = value.to_string();
        if plain.contains('.') {
            plain
        } else {
            plain + ".0"
        }
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exp.abs())
    }
}

/// Writer for the `<prefix>.txt` score report
pub struct ScoreWriter {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl ScoreWriter {
    pub fn create(path: &Path) -> Result<Self, Error> {
        let file = File::create(path).map_err(|e| Error::io(e, path))?;
        Ok(Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
        })
    }

    /// Write one scored candidate
    ///
    /// Format: 9 tab-separated columns
    /// 1-3. Chromosome, start, end of the junction
    /// 4. Complementary (max) score
    /// 5. Symmetry score
    /// 6. Pairing potential
    /// 7. Across score
    /// 8. Left region (`chrom:start-end` or `NULL`)
    /// 9. Right region
    pub fn write_result(&mut self, result: &JunctionResult) -> Result<(), Error> {
        writeln!(self.writer, "{}", result).map_err(|e| Error::io(e, &self.path))
    }

    /// Write the failure marker line of a candidate given its id columns.
    pub fn write_failure(&mut self, id: &str) -> Result<(), Error> {
        writeln!(self.writer, "{}\t{}", id, FAILED_COLUMNS)
            .map_err(|e| Error::io(e, &self.path))
    }

    pub fn flush(&mut self) -> Result<(), Error> {
        self.writer.flush().map_err(|e| Error::io(e, &self.path))
    }
}
