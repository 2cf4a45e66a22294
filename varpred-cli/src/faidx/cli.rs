use clap::{Arg, Command, arg};

pub const FAIDX_CMD: &str = "faidx";

pub fn create_faidx_cli() -> Command {
    Command::new(FAIDX_CMD)
        .author("Databio")
        .about("Write a samtools-compatible .fai index for a FASTA file.")
        .arg(Arg::new("fasta").required(true))
        .arg(arg!(--output <output> "Index path, defaults to <fasta>.fai"))
}
