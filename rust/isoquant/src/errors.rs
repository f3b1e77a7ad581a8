use std::path::PathBuf;
use thiserror::Error;

/// Problems found in the run configuration.
///
/// These are fatal for the whole batch and are checked before any
/// identification is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No isotopic label definitions were provided")]
    MissingLabels,

    #[error(
        "Label on residue '{residue}' has heavy delta {heavy_delta} <= light delta {light_delta}"
    )]
    InconsistentLabel {
        residue: char,
        light_delta: f64,
        heavy_delta: f64,
    },

    #[error("Tolerance must be positive and finite, got {0}")]
    InvalidTolerance(f64),

    #[error("Output file {} already exists (set `overwrite` to replace it)", path.display())]
    OutputExists { path: PathBuf },

    #[error("Invalid configuration: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum DataReadingError {
    #[error("Error reading {}: {source}", path.display())]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("Error parsing JSON from {}: {source}", path.display())]
    Json {
        source: serde_json::Error,
        path: PathBuf,
    },

    #[error("Error parsing MessagePack from {}: {source}", path.display())]
    MessagePack {
        source: rmp_serde::decode::Error,
        path: PathBuf,
    },

    #[error("Error parsing delimited file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unable to detect the format of {}", path.display())]
    UnknownFormat { path: PathBuf },

    #[error("Malformed data in run '{run}': {context}")]
    MalformedRun { run: String, context: String },

    #[error("Malformed identification '{peptide}': {context}")]
    MalformedIdentification { peptide: String, context: String },
}

/// Per-event failures.
///
/// None of these abort a batch; they resolve to an `Unevaluated` event.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DataProcessingError {
    #[error("Run contains no MS1 scans")]
    EmptyRun,

    #[error("No scans available in the window around scan {scan}")]
    EmptyWindow { scan: u32 },

    #[error("Scan {scan} is not present in the run")]
    ScanNotFound { scan: u32 },

    #[error("Extent starts at scan {first_scan} after it ends at scan {last_scan}")]
    InvertedExtent { first_scan: u32, last_scan: u32 },

    #[error("Charge must be >= 1, got {charge}")]
    InvalidCharge { charge: u8 },

    #[error("Heavy mass {heavy_mass} must exceed light mass {light_mass}")]
    InconsistentMasses { light_mass: f64, heavy_mass: f64 },

    #[error("Light/heavy separation of {separation:.4} Da rounds to less than one isotope")]
    InsufficientSeparation { separation: f64 },

    #[error("Peptide '{peptide}' carries no labelled residues")]
    NoLabelledResidues { peptide: String },

    #[error("Unable to parse peptide '{peptide}': {context}")]
    UnparseablePeptide { peptide: String, context: String },

    #[error("Cancelled before processing")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Error writing {}: {source}", path.display())]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("Error writing delimited output: {0}")]
    Csv(#[from] csv::Error),

    #[error("Error writing parquet output: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

#[derive(Debug, Error)]
pub enum IsoQuantError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    DataReading(#[from] DataReadingError),

    #[error(transparent)]
    DataProcessing(#[from] DataProcessingError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

pub type Result<T> = std::result::Result<T, IsoQuantError>;
