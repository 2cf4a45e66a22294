use std::fs::File;
use std::path::{Path, PathBuf};

use fxhash::FxHashMap;
use log::{info, warn};
use memmap2::Mmap;

use varpred_core::models::{Interval, Region, Sequence};

use crate::error::{FastaError, Result};
use crate::faidx::{FaiRecord, compute_fai, fai_path, read_fai};

///
/// Random access to an uncompressed, indexed FASTA file.
///
/// The file is memory-mapped; the index is read from `<fasta>.fai` when present and
/// computed on the fly otherwise.
///
pub struct IndexedFasta {
    path: PathBuf,
    mmap: Mmap,
    index: FxHashMap<String, FaiRecord>,
}

impl IndexedFasta {
    pub fn open<T: AsRef<Path>>(path: T) -> Result<Self> {
        let path = path.as_ref();
        let index_path = fai_path(path);

        let records = match index_path.is_file() {
            true => read_fai(&index_path)?,
            false => {
                warn!(
                    "No index found at {}, indexing {} in memory",
                    index_path.display(),
                    path.display()
                );
                compute_fai(path)?
            }
        };

        let file = File::open(path)?;
        // SAFETY: the file is opened read-only and not expected to change while mapped.
        let mmap = unsafe { Mmap::map(&file)? };

        info!(
            "Opened reference {} with {} sequences",
            path.display(),
            records.len()
        );

        Ok(IndexedFasta {
            path: path.to_path_buf(),
            mmap,
            index: records.into_iter().map(|r| (r.name.clone(), r)).collect(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn sequence_length(&self, name: &str) -> Option<u64> {
        self.index.get(name).map(|r| r.length)
    }

    ///
    /// Fetch the bases of `[start, end)` (0-based, half-open) of a sequence.
    ///
    /// # Arguments
    /// - name: sequence name
    /// - start: first base, 0-based
    /// - end: one past the last base
    pub fn fetch(&self, name: &str, start: u64, end: u64) -> Result<String> {
        let record = self
            .index
            .get(name)
            .ok_or_else(|| FastaError::UnknownSequence(name.to_string()))?;

        if start > end || end > record.length {
            return Err(FastaError::OutOfBounds {
                name: name.to_string(),
                start,
                end,
                length: record.length,
            });
        }
        if start == end {
            return Ok(String::new());
        }

        let first = record.byte_offset(start) as usize;
        let last = record.byte_offset(end - 1) as usize + 1;
        let raw = self.mmap.get(first..last).ok_or_else(|| FastaError::OutOfBounds {
            name: name.to_string(),
            start,
            end,
            length: record.length,
        })?;

        if !raw.is_ascii() {
            return Err(FastaError::NonAsciiSequence {
                name: name.to_string(),
                start,
                end,
            });
        }

        let bases: String = raw
            .iter()
            .filter(|b| !matches!(b, b'\n' | b'\r'))
            .map(|b| *b as char)
            .collect();

        Ok(bases)
    }

    ///
    /// Read the bases covered by an interval. A window running past the end of its
    /// contig is truncated there, so the returned sequence can be shorter than
    /// `interval.length`.
    ///
    pub fn read_sequence(&self, interval: &Interval) -> anyhow::Result<Sequence> {
        let region = Region::try_from(interval)?;
        let length = self
            .sequence_length(&region.chr)
            .ok_or_else(|| FastaError::UnknownSequence(region.chr.clone()))?;

        let end = region.end.min(length);
        let start = region.start.min(end);
        let bases = self.fetch(&region.chr, start, end)?;

        Ok(Sequence::new(bases, interval.clone()))
    }
}
