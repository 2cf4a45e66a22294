mod faidx;
mod predict;

use anyhow::Result;
use clap::{ArgAction, Command, arg};
use log::Level;
use simple_logger::init_with_level;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "varpred";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Databio")
        .about("Predict the functional effect of genetic variants by scoring reference and alternate sequences with a trained model.")
        .subcommand_required(true)
        .arg(
            arg!(-v --verbose "Log debug messages")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(predict::cli::create_predict_cli())
        .subcommand(faidx::cli::create_faidx_cli())
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    let level = match matches.get_flag("verbose") {
        true => Level::Debug,
        false => Level::Info,
    };
    init_with_level(level)?;

    match matches.subcommand() {
        //
        // PREDICT
        //
        Some((predict::cli::PREDICT_CMD, matches)) => {
            predict::handlers::run_predict(matches)?;
        }

        //
        // FAIDX
        //
        Some((faidx::cli::FAIDX_CMD, matches)) => {
            faidx::handlers::run_faidx(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::*;

    #[rstest]
    fn test_parser_is_valid() {
        build_parser().debug_assert();
    }

    #[rstest]
    fn test_subcommand_is_required() {
        assert!(build_parser().try_get_matches_from(["varpred"]).is_err());
    }

    #[rstest]
    fn test_verbose_is_global() {
        let matches = build_parser()
            .try_get_matches_from(["varpred", "faidx", "genome.fa", "--verbose"])
            .unwrap();
        assert!(matches.get_flag("verbose"));
    }
}
