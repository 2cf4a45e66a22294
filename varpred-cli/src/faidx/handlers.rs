use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ArgMatches;

use varpred_fasta::{compute_fai, fai_path, write_fai};

pub fn run_faidx(matches: &ArgMatches) -> Result<()> {
    let fasta = matches
        .get_one::<String>("fasta")
        .expect("A path to a FASTA file is required.");
    let fasta = Path::new(fasta);

    let output = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| fai_path(fasta));

    let records =
        compute_fai(fasta).with_context(|| format!("Failed to index {}", fasta.display()))?;
    write_fai(&records, &output)?;

    Ok(())
}
