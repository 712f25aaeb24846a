use std::path::PathBuf;

use clap::Parser;

/// Reconcile invoice movements from a folder of ledger export spreadsheets
#[derive(Parser, Debug)]
pub struct Args {
    /// Folder containing the .xls/.xlsx/.csv ledger exports
    #[clap(short, long)]
    pub input_dir: PathBuf,

    /// Folder where the _report.txt files are written
    #[clap(short, long)]
    pub output_dir: PathBuf,
}

pub fn parse() -> Args {
    Args::parse()
}
