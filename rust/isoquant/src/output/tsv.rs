use super::records::{
    FailureRecord,
    QuantEventRecord,
};
use super::{
    ResultSink,
    open_output_file,
};
use crate::errors::{
    IsoQuantError,
    OutputError,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{
    Path,
    PathBuf,
};
use tracing::debug;

fn tab_writer(file: File) -> csv::Writer<BufWriter<File>> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(BufWriter::new(file))
}

fn flush(writer: &mut csv::Writer<BufWriter<File>>, path: &Path) -> Result<(), OutputError> {
    writer.flush().map_err(|e| OutputError::Io {
        source: e,
        path: path.to_path_buf(),
    })
}

pub struct TsvResultWriter {
    path: PathBuf,
    writer: csv::Writer<BufWriter<File>>,
    written: usize,
}

impl TsvResultWriter {
    pub fn new(path: impl AsRef<Path>, overwrite: bool) -> Result<Self, IsoQuantError> {
        let path = path.as_ref().to_path_buf();
        let file = open_output_file(&path, overwrite)?;
        Ok(Self {
            writer: tab_writer(file),
            path,
            written: 0,
        })
    }
}

impl ResultSink for TsvResultWriter {
    fn add(&mut self, record: QuantEventRecord) -> Result<(), OutputError> {
        self.writer.serialize(record)?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), OutputError> {
        debug!("Wrote {} records to {}", self.written, self.path.display());
        flush(&mut self.writer, &self.path)
    }
}

/// Writes per-event failures (`failed_events.tsv`).
pub struct FailureLogWriter {
    path: PathBuf,
    writer: csv::Writer<BufWriter<File>>,
    written: usize,
}

impl FailureLogWriter {
    pub const FILE_NAME: &'static str = "failed_events.tsv";

    pub fn new(path: impl AsRef<Path>, overwrite: bool) -> Result<Self, IsoQuantError> {
        let path = path.as_ref().to_path_buf();
        let file = open_output_file(&path, overwrite)?;
        Ok(Self {
            writer: tab_writer(file),
            path,
            written: 0,
        })
    }

    pub fn add(&mut self, record: FailureRecord) -> Result<(), OutputError> {
        self.writer.serialize(record)?;
        self.written += 1;
        Ok(())
    }

    pub fn num_written(&self) -> usize {
        self.written
    }

    pub fn finish(&mut self) -> Result<(), OutputError> {
        flush(&mut self.writer, &self.path)
    }
}
