use super::records::QuantEventRecord;
use super::{
    ResultSink,
    open_output_file,
};
use crate::errors::{
    IsoQuantError,
    OutputError,
};
use parquet::file::writer::SerializedFileWriter;
use parquet::record::RecordWriter;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Buffers records and writes them one row group at a time.
pub struct ParquetResultWriter {
    row_group_size: usize,
    writer: Option<SerializedFileWriter<File>>,
    buffer: Vec<QuantEventRecord>,
}

impl ParquetResultWriter {
    pub fn new(
        out_path: impl AsRef<Path>,
        overwrite: bool,
        row_group_size: usize,
    ) -> Result<Self, IsoQuantError> {
        let file = open_output_file(out_path.as_ref(), overwrite)?;
        let records: &[QuantEventRecord] = &[];
        let schema = records.schema().map_err(OutputError::from)?;
        let writer = SerializedFileWriter::new(file, schema, Default::default())
            .map_err(OutputError::from)?;
        Ok(Self {
            buffer: Vec::with_capacity(row_group_size),
            writer: Some(writer),
            row_group_size: row_group_size.max(1),
        })
    }

    fn flush_to_file(&mut self) -> Result<(), OutputError> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        debug!("Flushing {} results to file", self.buffer.len());
        let mut row_group = writer.next_row_group()?;
        self.buffer.as_slice().write_to_row_group(&mut row_group)?;
        row_group.close()?;
        self.buffer.clear();
        Ok(())
    }
}

impl ResultSink for ParquetResultWriter {
    fn add(&mut self, record: QuantEventRecord) -> Result<(), OutputError> {
        self.buffer.push(record);
        if self.buffer.len() >= self.row_group_size {
            self.flush_to_file()?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), OutputError> {
        if !self.buffer.is_empty() {
            self.flush_to_file()?;
        }
        if let Some(writer) = self.writer.take() {
            writer.close()?;
        }
        Ok(())
    }
}
