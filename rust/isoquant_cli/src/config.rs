use isoquant::models::RatioSentinels;
use isoquant::output::{
    OutputFormat,
    RecordOptions,
};
use isoquant::{
    AssessorConfig,
    LabelDefinition,
    LabelSet,
    MzTolerance,
    QuantConfig,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::path::PathBuf;

use crate::cli::RunArgs;
use crate::errors::CliError;

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub labels: Vec<LabelDefinition>,
    #[serde(default)]
    pub quant: QuantConfig,
    /// Run the assessment checks on every event.
    #[serde(default = "default_true")]
    pub assess: bool,
    #[serde(default)]
    pub assessment: AssessorConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct InputConfig {
    pub identifications: Option<PathBuf>,
    pub run: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ProcessingConfig {
    pub chunk_size: usize,
    /// Events slower than this are logged.
    pub event_time_budget_ms: Option<u64>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            event_time_budget_ms: Some(1000),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: Option<PathBuf>,
    pub format: OutputFormat,
    pub overwrite: bool,
    pub ratio_sentinels: RatioSentinels,
    pub include_raw_areas: bool,
}

impl OutputConfig {
    pub fn record_options(&self) -> RecordOptions {
        RecordOptions {
            ratio_sentinels: self.ratio_sentinels,
            include_raw_areas: self.include_raw_areas,
        }
    }
}

/// Paths the run needs, once every override has been applied.
#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub identifications: PathBuf,
    pub run: PathBuf,
    pub output_dir: PathBuf,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, CliError> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    /// Command line values take precedence over the file.
    pub fn apply_overrides(&mut self, args: &RunArgs) {
        if let Some(ids) = &args.identifications {
            self.input.identifications = Some(ids.clone());
        }
        if let Some(run) = &args.run {
            self.input.run = Some(run.clone());
        }
        if let Some(dir) = &args.output_dir {
            self.output.directory = Some(dir.clone());
        }
        if args.overwrite {
            self.output.overwrite = true;
        }
    }

    /// Checks everything that would otherwise fail halfway through a batch.
    pub fn validate(&self) -> Result<(LabelSet, ResolvedPaths), CliError> {
        let labels = LabelSet::try_new(self.labels.clone())?;
        self.quant.tolerance.validate()?;
        self.assessment.validate()?;
        if self.processing.chunk_size == 0 {
            return Err(isoquant::errors::ConfigError::Other(
                "processing.chunk_size must be positive".to_string(),
            )
            .into());
        }

        let identifications = self.input.identifications.clone().ok_or_else(|| {
            CliError::MissingInput(
                "no identifications provided, set input.identifications or pass --identifications"
                    .to_string(),
            )
        })?;
        let run = self.input.run.clone().ok_or_else(|| {
            CliError::MissingInput("no run provided, set input.run or pass --run".to_string())
        })?;
        let output_dir = self.output.directory.clone().ok_or_else(|| {
            CliError::MissingInput(
                "no output directory provided, set output.directory or pass --output-dir"
                    .to_string(),
            )
        })?;
        Ok((
            labels,
            ResolvedPaths {
                identifications,
                run,
                output_dir,
            },
        ))
    }

    /// Example configuration with SILAC-style lysine and arginine labels.
    pub fn template() -> Self {
        Self {
            input: InputConfig {
                identifications: Some(PathBuf::from("identifications.tsv")),
                run: Some(PathBuf::from("run.msgpack.zst")),
            },
            labels: vec![
                LabelDefinition {
                    residue: 'K',
                    light_delta: 0.0,
                    heavy_delta: 8.014199,
                },
                LabelDefinition {
                    residue: 'R',
                    light_delta: 0.0,
                    heavy_delta: 10.008269,
                },
            ],
            quant: QuantConfig {
                tolerance: MzTolerance::Ppm(25.0),
                ..Default::default()
            },
            assess: true,
            assessment: AssessorConfig::default(),
            processing: ProcessingConfig::default(),
            output: OutputConfig {
                directory: Some(PathBuf::from("isoquant_results")),
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_roundtrips_and_validates() {
        let template = Config::template();
        let json = serde_json::to_string_pretty(&template).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        let (labels, paths) = parsed.validate().unwrap();
        assert_eq!(labels.labels().len(), 2);
        assert_eq!(paths.output_dir, PathBuf::from("isoquant_results"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{"labels": [{"residue": "K", "light_delta": 0.0, "heavy_delta": 6.0}]}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.assess);
        assert_eq!(config.quant.scans_before, 10);
        assert_eq!(config.output.format, OutputFormat::Tsv);
        assert!(matches!(
            config.validate(),
            Err(CliError::MissingInput(_))
        ));
    }

    #[test]
    fn test_missing_labels_are_fatal() {
        let mut config = Config::template();
        config.labels.clear();
        assert!(matches!(config.validate(), Err(CliError::Config(_))));
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::template();
        let args = RunArgs {
            config: PathBuf::from("c.json"),
            identifications: None,
            run: Some(PathBuf::from("other.json")),
            output_dir: Some(PathBuf::from("out")),
            overwrite: true,
        };
        config.apply_overrides(&args);
        assert_eq!(config.input.run, Some(PathBuf::from("other.json")));
        assert_eq!(config.output.directory, Some(PathBuf::from("out")));
        assert!(config.output.overwrite);
        assert_eq!(
            config.input.identifications,
            Some(PathBuf::from("identifications.tsv"))
        );
    }
}
