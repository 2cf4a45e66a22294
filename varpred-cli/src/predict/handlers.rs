use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::debug;

use varpred_effect::{PredictionConfig, PredictionPaths, run_prediction};
use varpred_io::VariantFileType;

use super::cli::DEFAULT_OUT;

///
/// Settings from the optional `--config` file, overridden by explicit flags.
///
fn resolve_config(matches: &ArgMatches) -> Result<PredictionConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => PredictionConfig::try_from(Path::new(path))
            .with_context(|| format!("Failed to load config {}", path))?,
        None => PredictionConfig::default(),
    };

    if let Some(file_type) = matches.get_one::<String>("file-type") {
        config.file_type = VariantFileType::from_str(file_type)?;
    }
    if matches.get_flag("ref-minus-alt") {
        config.alt_minus_ref = false;
    }
    if let Some(threads) = matches.get_one::<usize>("threads") {
        config.threads = *threads;
    }

    Ok(config)
}

fn resolve_paths(matches: &ArgMatches) -> PredictionPaths {
    let path = |id: &str| {
        PathBuf::from(
            matches
                .get_one::<String>(id)
                .expect("required argument checked by clap"),
        )
    };

    PredictionPaths {
        variants: matches
            .get_many::<String>("variants")
            .expect("At least one variant file is required.")
            .map(PathBuf::from)
            .collect(),
        architecture: path("model"),
        weights: path("weights"),
        reference: path("reference"),
        genome: path("genome"),
        output: matches
            .get_one::<String>("output")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT)),
    }
}

pub fn run_predict(matches: &ArgMatches) -> Result<()> {
    // validate settings before touching any input
    let config = resolve_config(matches)?;
    let paths = resolve_paths(matches);

    debug!("Running prediction with {:?}", config);

    run_prediction(&paths, &config)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::predict::cli::create_predict_cli;

    fn parse(extra: &[&str]) -> ArgMatches {
        let mut args = vec![
            "predict",
            "variants.tsv",
            "--model",
            "model.json",
            "--weights",
            "weights.npz",
            "--reference",
            "genome.fa",
            "--genome",
            "genome.chrom.sizes",
        ];
        args.extend_from_slice(extra);
        create_predict_cli().try_get_matches_from(args).unwrap()
    }

    #[rstest]
    fn test_defaults() {
        let matches = parse(&[]);
        assert_eq!(resolve_config(&matches).unwrap(), PredictionConfig::default());

        let paths = resolve_paths(&matches);
        assert_eq!(paths.variants, vec![PathBuf::from("variants.tsv")]);
        assert_eq!(paths.output, PathBuf::from(DEFAULT_OUT));
    }

    #[rstest]
    fn test_flags() {
        let matches = parse(&["--file-type", "vcf", "--ref-minus-alt", "--threads", "2"]);
        assert_eq!(
            resolve_config(&matches).unwrap(),
            PredictionConfig {
                alt_minus_ref: false,
                file_type: VariantFileType::VCF,
                threads: 2,
            }
        );
    }

    #[rstest]
    fn test_unknown_file_type_fails_before_reading() {
        let matches = parse(&["--file-type", "BED"]);
        let err = resolve_config(&matches).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown file format identifier BED. Can only be VCF or TSV"
        );

        // the variant file doesn't exist: the error above must come first
        assert!(run_predict(&matches).unwrap_err().to_string().contains("BED"));
    }

    #[rstest]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "file_type = \"VCF\"").unwrap();
        writeln!(file, "threads = 8").unwrap();
        let config_path = file.path().to_str().unwrap().to_string();

        let matches = parse(&["--config", config_path.as_str(), "--threads", "1"]);
        let config = resolve_config(&matches).unwrap();

        assert_eq!(config.file_type, VariantFileType::VCF);
        assert_eq!(config.threads, 1);
        assert_eq!(config.alt_minus_ref, true);
    }

    #[rstest]
    fn test_multiple_variant_files() {
        let matches = create_predict_cli()
            .try_get_matches_from([
                "predict", "a.tsv", "b.tsv", "--model", "m", "--weights", "w", "--reference", "r",
                "--genome", "g",
            ])
            .unwrap();
        assert_eq!(resolve_paths(&matches).variants.len(), 2);
    }
}
