use isoquant::errors::{
    ConfigError,
    DataReadingError,
    IsoQuantError,
    OutputError,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Error interpreting the config: {0}")]
    Config(#[from] ConfigError),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Data reading error: {0}")]
    DataReading(#[from] DataReadingError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error(transparent)]
    IsoQuant(#[from] IsoQuantError),
}
