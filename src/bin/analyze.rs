use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueHint};
use rusty_respiro::data::export::analyze_file;

#[derive(Parser, Debug)]
#[command(author, version, about = "Derive glucose-utilisation columns from respirometry files")]
struct Cli {
    /// Respirometry files (CSV, JSON records or Parquet)
    #[arg(required = true, value_hint = ValueHint::FilePath)]
    inputs: Vec<PathBuf>,

    /// Directory receiving `analyzed_<name>` outputs
    #[arg(short, long, default_value = "analyzed", value_hint = ValueHint::DirPath)]
    out_dir: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut failed = 0usize;
    for input in &cli.inputs {
        match analyze_file(input, &cli.out_dir) {
            Ok(out) => println!("{}", out.display()),
            Err(e) => {
                log::error!("{e:#}");
                failed += 1;
            }
        }
    }

    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        log::error!("{failed} of {} file(s) failed", cli.inputs.len());
        ExitCode::FAILURE
    }
}
