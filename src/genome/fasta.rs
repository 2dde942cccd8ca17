use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bio::io::fasta;
use log::info;
use rust_htslib::faidx;

use crate::error::Error;
use crate::genome::GenomeRegion;

/// Path of the index belonging to a FASTA file (`<fasta>.fai`).
pub fn fai_path(fasta: &Path) -> PathBuf {
    let mut name = fasta.as_os_str().to_owned();
    name.push(".fai");
    PathBuf::from(name)
}

/// Random-access genome backed by an indexed FASTA file.
///
/// Handles are not shared between threads; each rayon job opens its own.
pub struct IndexedGenome {
    reader: faidx::Reader,
    /// Contig lengths from the index
    lengths: HashMap<String, u64>,
}

impl IndexedGenome {
    /// Open a FASTA file. htslib builds `<fasta>.fai` when it is missing.
    pub fn open(path: &Path) -> Result<Self, Error> {
        if !fai_path(path).exists() {
            info!("Building FASTA index {}", fai_path(path).display());
        }

        let reader = faidx::Reader::from_path(path).map_err(|e| {
            Error::Fasta(format!("cannot open indexed FASTA {}: {}", path.display(), e))
        })?;

        let names = reader.seq_names().map_err(|e| {
            Error::Fasta(format!("cannot read index of {}: {}", path.display(), e))
        })?;
        let lengths = names
            .into_iter()
            .map(|name| {
                let len = reader.fetch_seq_len(&name);
                (name, len)
            })
            .collect();

        Ok(Self { reader, lengths })
    }

    /// Length of a contig, `None` when the index does not list it.
    pub fn contig_len(&self, chrom: &str) -> Option<u64> {
        self.lengths.get(chrom).copied()
    }

    /// Raw bases of `region` (0-based, half-open).
    pub fn fetch(&mut self, region: &GenomeRegion) -> Result<Vec<u8>, Error> {
        if region.is_empty() {
            return Err(Error::Fasta(format!("empty region {}", region)));
        }

        let contig_len = self
            .contig_len(&region.chrom)
            .ok_or_else(|| Error::Fasta(format!("unknown contig in {}", region)))?;
        if region.end > contig_len {
            return Err(Error::Fasta(format!(
                "region {} extends past the end of {} ({} bases)",
                region, region.chrom, contig_len
            )));
        }

        // htslib takes an inclusive end
        let seq = self
            .reader
            .fetch_seq(&region.chrom, region.start as usize, region.end as usize - 1)
            .map_err(|e| Error::Fasta(format!("cannot fetch {}: {}", region, e)))?;

        if (seq.len() as u64) != region.len() {
            return Err(Error::Fasta(format!(
                "fetched {} bases for {}",
                seq.len(),
                region
            )));
        }

        Ok(seq)
    }
}

/// Write a single-record FASTA file.
pub fn write_fasta(path: &Path, name: &str, seq: &[u8]) -> Result<(), Error> {
    let mut writer = fasta::Writer::to_file(path).map_err(|e| Error::io(e, path))?;
    writer
        .write(name, None, seq)
        .map_err(|e| Error::io(e, path))?;
    writer.flush().map_err(|e| Error::io(e, path))
}
