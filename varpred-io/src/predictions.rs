use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use varpred_core::models::Variant;

use crate::error::{Result, VarpredIoError};

pub const IDENTITY_COLUMNS: [&str; 4] = ["#Chr", "Pos", "Ref", "Alt"];

///
/// Header of a prediction table with `num_tasks` model outputs.
///
pub fn prediction_header(num_tasks: usize) -> Vec<String> {
    let mut names: Vec<String> = IDENTITY_COLUMNS.iter().map(|s| s.to_string()).collect();
    for task in 0..num_tasks {
        names.push(format!("Task_{}_PredictionDelta", task));
        names.push(format!("Task_{}_PredictionRef", task));
        names.push(format!("Task_{}_PredictionAlt", task));
    }
    names
}

///
/// Streaming writer for gzip'd, tab-separated prediction tables.
///
/// One row per variant: identity columns, then for each task the delta, the
/// reference score and the alternate score.
///
pub struct PredictionWriter {
    encoder: GzEncoder<BufWriter<File>>,
    num_tasks: usize,
    alt_minus_ref: bool,
}

impl PredictionWriter {
    ///
    /// Create the output file (and its parent directories) and write the header.
    ///
    /// # Arguments
    /// - path: path to the `.tsv.gz` file to create
    /// - num_tasks: number of model outputs per allele
    /// - alt_minus_ref: delta is `alt - ref` when true, `ref - alt` otherwise
    pub fn create<T: AsRef<Path>>(path: T, num_tasks: usize, alt_minus_ref: bool) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        writeln!(encoder, "{}", prediction_header(num_tasks).join("\t"))?;

        Ok(PredictionWriter {
            encoder,
            num_tasks,
            alt_minus_ref,
        })
    }

    ///
    /// Write a table with only the identity header, used when there is nothing to score.
    ///
    pub fn write_header_only<T: AsRef<Path>>(path: T) -> Result<()> {
        PredictionWriter::create(path, 0, true)?.finish()
    }

    pub fn write_row(&mut self, variant: &Variant, reference: &[f32], alternate: &[f32]) -> Result<()> {
        for scores in [reference, alternate] {
            if scores.len() != self.num_tasks {
                return Err(VarpredIoError::TaskCountMismatch {
                    expected: self.num_tasks,
                    found: scores.len(),
                });
            }
        }

        write!(
            self.encoder,
            "{}\t{}\t{}\t{}",
            variant.chr, variant.position, variant.ref_allele, variant.alt_allele
        )?;

        for (ref_score, alt_score) in reference.iter().zip(alternate) {
            let delta = match self.alt_minus_ref {
                true => alt_score - ref_score,
                false => ref_score - alt_score,
            };
            write!(self.encoder, "\t{}\t{}\t{}", delta, ref_score, alt_score)?;
        }
        writeln!(self.encoder)?;

        Ok(())
    }

    pub fn finish(self) -> Result<()> {
        let mut inner = self.encoder.finish()?;
        inner.flush()?;
        Ok(())
    }
}
