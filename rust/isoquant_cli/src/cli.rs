use clap::{
    Parser,
    Subcommand,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Quantify labelled identifications against one run.
    Run(RunArgs),
    /// Write a template configuration file.
    WriteTemplate(WriteTemplateArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to the JSON configuration file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Path to the identifications (.tsv, .csv or .ndjson, will over-write the config file)
    #[arg(short, long)]
    pub identifications: Option<PathBuf>,

    /// Path to the run (.json, .msgpack, optionally .zst compressed, will over-write the config file)
    #[arg(short, long)]
    pub run: Option<PathBuf>,

    /// Path to the output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Replace existing output files
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(Parser, Debug)]
pub struct WriteTemplateArgs {
    /// Where to write the template.
    #[arg(short, long)]
    pub output_path: PathBuf,
}
