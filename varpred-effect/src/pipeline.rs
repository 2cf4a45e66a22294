use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use ndarray::Axis;

use varpred_core::models::Variant;
use varpred_core::utils::{ChromSizes, get_chrom_sizes};
use varpred_fasta::IndexedFasta;
use varpred_io::{PredictionWriter, load_variants_from_files};
use varpred_model::{Model, SequentialModel};

use crate::config::PredictionConfig;
use crate::diagnostics::{Diagnostics, SkipLog};
use crate::scorer::{BatchScorer, PairScores};
use crate::sequences::{SequencePair, SequenceSource, extract_pair};
use crate::window::center_interval;

///
/// Input and output locations of a prediction run.
///
#[derive(Debug, Clone)]
pub struct PredictionPaths {
    pub variants: Vec<PathBuf>,
    pub architecture: PathBuf,
    pub weights: PathBuf,
    pub reference: PathBuf,
    pub genome: PathBuf,
    pub output: PathBuf,
}

/// What happened to the variants of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PredictionSummary {
    pub variants: usize,
    pub scored: usize,
    pub skipped: usize,
}

///
/// Center, adjust and read the sequences of every variant, in input order.
/// Variants that can't be scored are reported to `diagnostics` and left out.
///
pub fn build_sequence_pairs<S: SequenceSource + ?Sized, D: Diagnostics + ?Sized>(
    variants: &[Variant],
    source: &S,
    chrom_sizes: &ChromSizes,
    input_length: usize,
    diagnostics: &mut D,
) -> Result<Vec<SequencePair>> {
    let pb = ProgressBar::new(variants.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?,
    );
    pb.set_message("Extracting sequences");

    let mut pairs = Vec::with_capacity(variants.len());

    for variant in variants {
        pb.inc(1);

        let centered = match center_interval(variant, input_length, chrom_sizes) {
            Ok(interval) => interval,
            Err(reason) => {
                diagnostics.skipped(variant, &reason);
                continue;
            }
        };

        let pair = extract_pair(source, variant, &centered, input_length)
            .with_context(|| format!("Failed to read sequences for variant {}", variant))?;

        match pair {
            Ok(pair) => pairs.push(pair),
            Err(reason) => diagnostics.skipped(variant, &reason),
        }
    }

    pb.finish_and_clear();

    Ok(pairs)
}

///
/// Write one row per scored pair, in pair order.
///
pub fn write_predictions<P: AsRef<Path>>(
    output: P,
    pairs: &[SequencePair],
    scores: &PairScores,
    num_tasks: usize,
    alt_minus_ref: bool,
) -> Result<()> {
    let mut writer = PredictionWriter::create(output.as_ref(), num_tasks, alt_minus_ref)?;

    let rows = scores
        .reference
        .axis_iter(Axis(0))
        .zip(scores.alternate.axis_iter(Axis(0)));

    for (pair, (reference, alternate)) in pairs.iter().zip(rows) {
        writer.write_row(&pair.variant, &reference.to_vec(), &alternate.to_vec())?;
    }

    writer.finish()?;

    Ok(())
}

///
/// Score already loaded variants with an already loaded model and write the table.
///
/// # Arguments
/// - variants: variants in output order
/// - model: the model to evaluate
/// - source: reference genome
/// - chrom_sizes: contig sizes used to clamp windows
/// - config: run settings
/// - output: path of the `.tsv.gz` table
/// - diagnostics: receives skipped variants
pub fn predict_variants<M, S, D, P>(
    variants: &[Variant],
    model: &M,
    source: &S,
    chrom_sizes: &ChromSizes,
    config: &PredictionConfig,
    output: P,
    diagnostics: &mut D,
) -> Result<PredictionSummary>
where
    M: Model + ?Sized,
    S: SequenceSource + ?Sized,
    D: Diagnostics + ?Sized,
    P: AsRef<Path>,
{
    let pairs = build_sequence_pairs(
        variants,
        source,
        chrom_sizes,
        model.input_length(),
        diagnostics,
    )?;

    let scores = BatchScorer::new(model, config.threads)?.score(&pairs)?;

    write_predictions(
        output.as_ref(),
        &pairs,
        &scores,
        model.num_tasks(),
        config.alt_minus_ref,
    )?;

    Ok(PredictionSummary {
        variants: variants.len(),
        scored: pairs.len(),
        skipped: variants.len() - pairs.len(),
    })
}

///
/// Run a full prediction: load variants, model and reference, score every variant
/// and write the gzip'd table. Without any variants only the header is written and
/// the model is never loaded.
///
pub fn run_prediction(paths: &PredictionPaths, config: &PredictionConfig) -> Result<PredictionSummary> {
    let variants = load_variants_from_files(&paths.variants, config.file_type)?;

    if variants.is_empty() {
        info!("No variants to score, writing header only");
        PredictionWriter::write_header_only(&paths.output)?;
        return Ok(PredictionSummary::default());
    }

    let model = SequentialModel::load(&paths.architecture, &paths.weights).with_context(|| {
        format!(
            "Failed to load model from {} and {}",
            paths.architecture.display(),
            paths.weights.display()
        )
    })?;

    let chrom_sizes = get_chrom_sizes(&paths.genome)?;
    let fasta = IndexedFasta::open(&paths.reference)
        .with_context(|| format!("Failed to open reference {}", paths.reference.display()))?;

    let mut diagnostics = SkipLog::new();
    let summary = predict_variants(
        &variants,
        &model,
        &fasta,
        &chrom_sizes,
        config,
        &paths.output,
        &mut diagnostics,
    )?;

    diagnostics.summarize();
    info!(
        "Scored {} of {} variants, predictions written to {}",
        summary.scored,
        summary.variants,
        paths.output.display()
    );

    Ok(summary)
}
