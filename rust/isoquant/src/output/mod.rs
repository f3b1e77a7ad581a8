//! Result and failure writers.

pub mod parquet_writer;
pub mod records;
pub mod tsv;

use crate::errors::{
    ConfigError,
    IsoQuantError,
    OutputError,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::fs::File;
use std::path::Path;
use tracing::error;

pub use parquet_writer::ParquetResultWriter;
pub use records::{
    FailureRecord,
    QuantEventRecord,
    RecordOptions,
};
pub use tsv::{
    FailureLogWriter,
    TsvResultWriter,
};

/// Rows per parquet row group.
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10_000;

/// Receives one record per quantitation event.
pub trait ResultSink {
    fn add(&mut self, record: QuantEventRecord) -> Result<(), OutputError>;

    /// Flushes buffered records. Nothing may be added afterwards.
    fn finish(&mut self) -> Result<(), OutputError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Tsv,
    Parquet,
}

impl OutputFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            OutputFormat::Tsv => "quant_results.tsv",
            OutputFormat::Parquet => "quant_results.parquet",
        }
    }

    pub fn open_sink(
        &self,
        path: impl AsRef<Path>,
        overwrite: bool,
    ) -> Result<Box<dyn ResultSink>, IsoQuantError> {
        Ok(match self {
            OutputFormat::Tsv => Box::new(TsvResultWriter::new(path, overwrite)?),
            OutputFormat::Parquet => Box::new(ParquetResultWriter::new(
                path,
                overwrite,
                DEFAULT_ROW_GROUP_SIZE,
            )?),
        })
    }
}

/// Opens `path` for writing, refusing to clobber existing files unless
/// `overwrite` is set.
pub fn open_output_file(path: &Path, overwrite: bool) -> Result<File, IsoQuantError> {
    let res = if overwrite {
        File::create(path)
    } else {
        File::create_new(path)
    };
    match res {
        Ok(file) => Ok(file),
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
            error!("Output file {:?} already exists", path);
            Err(ConfigError::OutputExists {
                path: path.to_path_buf(),
            }
            .into())
        }
        Err(err) => {
            error!("Failed to open file {:?} with error: {}", path, err);
            Err(OutputError::Io {
                source: err,
                path: path.to_path_buf(),
            }
            .into())
        }
    }
}
