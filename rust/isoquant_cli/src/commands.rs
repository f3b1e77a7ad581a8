use isoquant::data_sources::read_identifications;
use isoquant::output::{
    FailureLogWriter,
    open_output_file,
};
use isoquant::{
    EventAssessor,
    InMemoryRun,
    QuantPipeline,
    Quantifier,
    SpectrumSource,
};
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::cli::{
    RunArgs,
    WriteTemplateArgs,
};
use crate::config::Config;
use crate::errors::CliError;
use crate::processing::{
    Sinks,
    main_loop,
};

pub const SUMMARY_FILE_NAME: &str = "run_summary.json";

pub fn main_run(args: RunArgs) -> Result<(), CliError> {
    let mut config = Config::from_file(&args.config)?;
    config.apply_overrides(&args);
    let (labels, paths) = config.validate()?;
    info!("Labels: {:?}", labels.labels());

    std::fs::create_dir_all(&paths.output_dir)?;
    let (mut sinks, summary_file) = open_outputs(&paths.output_dir, &config)?;

    let run = InMemoryRun::from_file(&paths.run)?;
    let identifications = read_identifications(&paths.identifications)?;
    info!(
        "Loaded {} identifications for run '{}' ({} MS1 scans)",
        identifications.len(),
        run.run_name(),
        run.scan_count()
    );

    let assessor = config
        .assess
        .then(|| EventAssessor::new(config.assessment.clone()));
    let mut pipeline = QuantPipeline::new(run, Quantifier::new(config.quant.clone()), assessor);
    if let Some(ms) = config.processing.event_time_budget_ms {
        pipeline = pipeline.with_event_time_budget(Duration::from_millis(ms));
    }

    let summary = main_loop(
        &identifications,
        &pipeline,
        &labels,
        config.processing.chunk_size,
        &mut sinks,
    )?;
    summary.log();

    serde_json::to_writer_pretty(summary_file, &summary)?;
    info!("Results written to {}", paths.output_dir.display());
    Ok(())
}

/// Opened up front so a collision fails before any work is done.
fn open_outputs(output_dir: &Path, config: &Config) -> Result<(Sinks, File), CliError> {
    let overwrite = config.output.overwrite;
    let summary_file = open_output_file(&output_dir.join(SUMMARY_FILE_NAME), overwrite)?;
    let sinks = Sinks {
        results: config
            .output
            .format
            .open_sink(output_dir.join(config.output.format.file_name()), overwrite)?,
        failures: FailureLogWriter::new(output_dir.join(FailureLogWriter::FILE_NAME), overwrite)?,
        options: config.output.record_options(),
    };
    Ok((sinks, summary_file))
}

pub fn main_write_template(args: WriteTemplateArgs) -> Result<(), CliError> {
    write_template(&args.output_path)?;
    info!("Template written to {}", args.output_path.display());
    Ok(())
}

fn write_template(path: &Path) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(&Config::template())?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use isoquant::errors::{
        ConfigError,
        IsoQuantError,
    };

    #[test]
    fn test_write_template_reads_back() {
        let path = std::env::temp_dir().join("isoquant_cli_template.json");
        write_template(&path).unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.labels.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_existing_summary_is_not_overwritten() {
        let dir = std::env::temp_dir().join("isoquant_cli_existing_summary");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let summary_path = dir.join(SUMMARY_FILE_NAME);
        std::fs::write(&summary_path, "{}").unwrap();

        let mut config = Config::template();
        let res = open_outputs(&dir, &config);
        assert!(matches!(
            res,
            Err(CliError::IsoQuant(IsoQuantError::Config(
                ConfigError::OutputExists { .. }
            )))
        ));
        assert_eq!(std::fs::read_to_string(&summary_path).unwrap(), "{}");
        assert!(!dir.join(FailureLogWriter::FILE_NAME).exists());

        config.output.overwrite = true;
        assert!(open_outputs(&dir, &config).is_ok());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
