use std::ffi::OsStr;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use fxhash::FxHashMap;

use crate::errors::CoreError;

/// Contig name to contig length.
pub type ChromSizes = FxHashMap<String, u64>;

///
/// Check whether a path points to a gzip'd file, by extension.
///
pub fn is_gzipped(path: &Path) -> bool {
    matches!(
        path.extension().and_then(OsStr::to_str),
        Some("gz") | Some("bgz")
    )
}

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    let file: Box<dyn Read> = match is_gzipped(path) {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    let reader = BufReader::new(file);

    Ok(reader)
}

///
/// Read a genome size file: one `chrom<whitespace>size` pair per line.
/// Empty lines and lines starting with `#` are ignored.
///
/// # Arguments
///
/// - path: path to the genome size file
///
pub fn get_chrom_sizes<T: AsRef<Path>>(path: T) -> Result<ChromSizes> {
    let reader = get_dynamic_reader(path.as_ref())
        .with_context(|| "Failed to open chrom sizes file.")?;

    let mut chrom_sizes = ChromSizes::default();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        let (Some(chrom), Some(size)) = (parts.next(), parts.next()) else {
            return Err(CoreError::ChromSizeParseError(line).into());
        };
        let size = size
            .parse::<u64>()
            .map_err(|_| CoreError::ChromSizeParseError(line.clone()))?;

        chrom_sizes.insert(chrom.to_string(), size);
    }

    Ok(chrom_sizes)
}

///
/// Reverse complement a DNA string. IUPAC ambiguity codes are complemented,
/// case is preserved and anything else is passed through unchanged.
///
pub fn reverse_complement(bases: &str) -> String {
    bases.bytes().rev().map(|b| complement(b) as char).collect()
}

fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' => b'A',
        b'a' => b't',
        b'c' => b'g',
        b'g' => b'c',
        b't' => b'a',
        b'R' => b'Y',
        b'Y' => b'R',
        b'K' => b'M',
        b'M' => b'K',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        b'r' => b'y',
        b'y' => b'r',
        b'k' => b'm',
        b'm' => b'k',
        b'b' => b'v',
        b'v' => b'b',
        b'd' => b'h',
        b'h' => b'd',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn get_test_path(file_name: &str) -> PathBuf {
        std::env::current_dir()
            .unwrap()
            .join("../tests/data/varpred")
            .join(file_name)
    }

    #[rstest]
    fn test_get_chrom_sizes() {
        let sizes = get_chrom_sizes(get_test_path("genome.chrom.sizes")).unwrap();
        assert_eq!(sizes.len(), 2);
        assert_eq!(sizes.get("chr1"), Some(&64));
        assert_eq!(sizes.get("chr2"), Some(&20));
    }

    #[rstest]
    fn test_get_chrom_sizes_malformed() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("bad.chrom.sizes");
        std::fs::write(&path, "chr1\tnot_a_number\n").unwrap();
        assert!(get_chrom_sizes(&path).is_err());
    }

    #[rstest]
    #[case("variants.tsv.gz", true)]
    #[case("variants.vcf.bgz", true)]
    #[case("variants.tsv", false)]
    fn test_is_gzipped(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_gzipped(Path::new(name)), expected);
    }

    #[rstest]
    #[case("ACGT", "ACGT")]
    #[case("AACCN", "NGGTT")]
    #[case("acgR", "Ycgt")]
    fn test_reverse_complement(#[case] bases: &str, #[case] expected: &str) {
        assert_eq!(reverse_complement(bases), expected);
    }
}
