use clap::{Arg, ArgAction, Command, arg, value_parser};

pub const PREDICT_CMD: &str = "predict";
pub const DEFAULT_OUT: &str = "predictions.tsv.gz";

pub fn create_predict_cli() -> Command {
    Command::new(PREDICT_CMD)
        .author("Databio")
        .about("Score reference and alternate sequences around each variant and report the per-task delta.")
        .arg(
            Arg::new("variants")
                .help("Variant files, tab-separated (chr, pos, ref, alt) or VCF, optionally gzip'd")
                .required(true)
                .num_args(1..),
        )
        .arg(arg!(--model <model> "Model architecture (JSON)").required(true))
        .arg(arg!(--weights <weights> "Model weights (NPZ)").required(true))
        .arg(arg!(--reference <reference> "Reference genome FASTA, indexed or not").required(true))
        .arg(arg!(--genome <genome> "Genome size file: chrom<TAB>size").required(true))
        .arg(arg!(--output <output> "Output table (gzip'd TSV)"))
        .arg(arg!(--"file-type" <file_type> "Layout of the variant files: TSV or VCF"))
        .arg(
            arg!(--"ref-minus-alt" "Report ref - alt as delta instead of alt - ref")
                .action(ArgAction::SetTrue),
        )
        .arg(arg!(--config <config> "TOML file with prediction settings"))
        .arg(
            arg!(--threads <threads> "Threads used to evaluate the model, 0 for one per core")
                .value_parser(value_parser!(usize)),
        )
}
