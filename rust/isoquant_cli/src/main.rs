mod cli;
mod commands;
mod config;
mod errors;
mod processing;

use clap::Parser;
use tracing::error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli::{
    Args,
    Commands,
};

// mimalloc noticeably outperforms the default allocator on windows
#[cfg(target_os = "windows")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let args = Args::parse();
    let result = match args.command {
        Some(Commands::Run(run_args)) => commands::main_run(run_args),
        Some(Commands::WriteTemplate(template_args)) => {
            commands::main_write_template(template_args)
        }
        None => {
            println!("No command provided, run with --help for usage");
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
