use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use varpred_core::utils::is_gzipped;

use crate::error::{FastaError, Result};

/// One line of a FASTA index (`.fai`), samtools-compatible.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaiRecord {
    pub name: String,
    pub length: u64,
    /// byte offset of the first base
    pub offset: u64,
    pub line_bases: u64,
    /// line width in bytes, including the line terminator
    pub line_bytes: u64,
}

impl FaiRecord {
    /// Byte offset of a 0-based base position within the FASTA file.
    pub fn byte_offset(&self, position: u64) -> u64 {
        if self.line_bases == 0 {
            return self.offset;
        }
        self.offset + (position / self.line_bases) * self.line_bytes + position % self.line_bases
    }

    pub fn as_string(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}",
            self.name, self.length, self.offset, self.line_bases, self.line_bytes
        )
    }
}

/// Path of the index that belongs to a FASTA file: `<fasta>.fai`.
pub fn fai_path<T: AsRef<Path>>(fasta_path: T) -> PathBuf {
    let mut path = fasta_path.as_ref().as_os_str().to_owned();
    path.push(".fai");
    PathBuf::from(path)
}

/// Builds records for one sequence while scanning the FASTA file.
struct RecordBuilder {
    name: String,
    offset: u64,
    length: u64,
    line_bases: Option<u64>,
    line_bytes: Option<u64>,
    saw_short_line: bool,
}

impl RecordBuilder {
    fn new(name: String, offset: u64) -> Self {
        RecordBuilder {
            name,
            offset,
            length: 0,
            line_bases: None,
            line_bytes: None,
            saw_short_line: false,
        }
    }

    fn push_line(&mut self, bases: u64, bytes: u64) -> Result<()> {
        match self.line_bases {
            None => {
                self.line_bases = Some(bases);
                self.line_bytes = Some(bytes);
            }
            Some(expected) => {
                if self.saw_short_line || bases > expected {
                    return Err(FastaError::IrregularLineLength {
                        name: self.name.clone(),
                    });
                }
                if bases < expected {
                    self.saw_short_line = true;
                }
            }
        }
        self.length += bases;
        Ok(())
    }

    fn finish(self) -> FaiRecord {
        FaiRecord {
            name: self.name,
            length: self.length,
            offset: self.offset,
            line_bases: self.line_bases.unwrap_or(0),
            line_bytes: self.line_bytes.unwrap_or(0),
        }
    }
}

///
/// Compute the FASTA index for an uncompressed FASTA file, like `samtools faidx`.
///
/// Sequence names are the first whitespace-delimited word of each header.
///
/// # Arguments
/// - file_path: path to the FASTA file
pub fn compute_fai<T: AsRef<Path>>(file_path: T) -> Result<Vec<FaiRecord>> {
    let file_path = file_path.as_ref();
    if is_gzipped(file_path) {
        return Err(FastaError::CompressedFasta(file_path.display().to_string()));
    }

    let mut reader = BufReader::new(File::open(file_path)?);
    let mut results = Vec::new();
    let mut line: Vec<u8> = Vec::new();
    let mut byte_position: u64 = 0;
    let mut current: Option<RecordBuilder> = None;

    loop {
        line.clear();
        let bytes_read = reader.read_until(b'\n', &mut line)? as u64;
        if bytes_read == 0 {
            break;
        }
        byte_position += bytes_read;

        if line.first() == Some(&b'>') {
            if let Some(builder) = current.take() {
                results.push(builder.finish());
            }
            let header = String::from_utf8_lossy(&line[1..]);
            let name = header.split_whitespace().next().unwrap_or_default().to_string();
            current = Some(RecordBuilder::new(name, byte_position));
            continue;
        }

        let bases = line
            .iter()
            .rev()
            .skip_while(|b| **b == b'\n' || **b == b'\r')
            .count() as u64;
        if bases == 0 {
            continue;
        }

        if let Some(builder) = current.as_mut() {
            builder.push_line(bases, bytes_read)?;
        }
    }

    if let Some(builder) = current.take() {
        results.push(builder.finish());
    }

    Ok(results)
}

///
/// Read a `.fai` file.
///
pub fn read_fai<T: AsRef<Path>>(fai_path: T) -> Result<Vec<FaiRecord>> {
    let reader = BufReader::new(File::open(fai_path.as_ref())?);

    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 5 {
            return Err(FastaError::MalformedIndex(line.clone()));
        }
        let parse = |s: &str| {
            s.parse::<u64>()
                .map_err(|_| FastaError::MalformedIndex(line.clone()))
        };

        records.push(FaiRecord {
            name: fields[0].to_string(),
            length: parse(fields[1])?,
            offset: parse(fields[2])?,
            line_bases: parse(fields[3])?,
            line_bytes: parse(fields[4])?,
        });
    }

    Ok(records)
}

///
/// Write records as a `.fai` file.
///
pub fn write_fai<T: AsRef<Path>>(records: &[FaiRecord], fai_path: T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(fai_path.as_ref())?);
    for record in records {
        writeln!(writer, "{}", record.as_string())?;
    }
    writer.flush()?;

    info!(
        "Wrote index for {} sequences to {}",
        records.len(),
        fai_path.as_ref().display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn get_test_path(file_name: &str) -> PathBuf {
        std::env::current_dir()
            .unwrap()
            .join("../tests/data/varpred")
            .join(file_name)
    }

    #[rstest]
    fn test_compute_fai_matches_index_on_disk() {
        let computed = compute_fai(get_test_path("genome.fa")).unwrap();
        let on_disk = read_fai(get_test_path("genome.fa.fai")).unwrap();
        assert_eq!(computed, on_disk);
    }

    #[rstest]
    fn test_compute_fai_values() {
        let records = compute_fai(get_test_path("genome.fa")).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "chr1");
        assert_eq!(records[0].length, 64);
        assert_eq!(records[0].offset, 6);
        assert_eq!(records[1].offset, 80);
        assert_eq!(records[1].length, 20);
    }

    #[rstest]
    fn test_compute_fai_header_description_is_dropped() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("desc.fa");
        std::fs::write(&path, ">seq1 some description\nACGT\nAC\n").unwrap();

        let records = compute_fai(&path).unwrap();
        assert_eq!(records[0].name, "seq1");
        assert_eq!(records[0].length, 6);
        assert_eq!(records[0].offset, 23);
    }

    #[rstest]
    fn test_compute_fai_irregular_lines() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("irregular.fa");
        std::fs::write(&path, ">seq1\nACGT\nAC\nACGT\n").unwrap();

        assert!(matches!(
            compute_fai(&path),
            Err(FastaError::IrregularLineLength { .. })
        ));
    }

    #[rstest]
    fn test_compute_fai_rejects_gzip() {
        assert!(matches!(
            compute_fai("genome.fa.gz"),
            Err(FastaError::CompressedFasta(_))
        ));
    }

    #[rstest]
    fn test_byte_offset_across_lines() {
        let records = read_fai(get_test_path("genome.fa.fai")).unwrap();
        let chr1 = &records[0];
        assert_eq!(chr1.byte_offset(0), 6);
        assert_eq!(chr1.byte_offset(15), 21);
        assert_eq!(chr1.byte_offset(16), 23);
    }

    #[rstest]
    fn test_fai_path() {
        assert_eq!(fai_path("ref/genome.fa"), PathBuf::from("ref/genome.fa.fai"));
    }

    #[rstest]
    fn test_write_then_read_fai() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("genome.fa.fai");
        let records = compute_fai(get_test_path("genome.fa")).unwrap();

        write_fai(&records, &path).unwrap();

        assert_eq!(read_fai(&path).unwrap(), records);
    }
}
