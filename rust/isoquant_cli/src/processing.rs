use indicatif::{
    ProgressIterator,
    ProgressStyle,
};
use isoquant::errors::OutputError;
use isoquant::output::{
    FailureLogWriter,
    FailureRecord,
    QuantEventRecord,
    RecordOptions,
    ResultSink,
};
use isoquant::timings::QuantTimings;
use isoquant::{
    AssessmentFlag,
    IdentificationRecord,
    LabelSet,
    QuantEvent,
    QuantPipeline,
    SpectrumSource,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Totals for one run, logged at the end and written next to the results.
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub run: String,
    pub num_identifications: usize,
    pub num_failed: usize,
    pub flag_counts: BTreeMap<String, usize>,
    pub timings: QuantTimings,
}

impl RunSummary {
    fn new(run: &str) -> Self {
        Self {
            run: run.to_string(),
            flag_counts: AssessmentFlag::ALL
                .iter()
                .map(|f| (f.name().to_string(), 0))
                .collect(),
            ..Default::default()
        }
    }

    fn record(&mut self, event: &QuantEvent) {
        self.num_identifications += 1;
        if event.is_failure() {
            self.num_failed += 1;
        }
        *self
            .flag_counts
            .entry(event.flag().name().to_string())
            .or_insert(0) += 1;
    }

    pub fn log(&self) {
        info!(
            "Run '{}': {} identifications, {} could not be quantified",
            self.run, self.num_identifications, self.num_failed
        );
        for flag in AssessmentFlag::ALL {
            let count = self.flag_counts.get(flag.name()).copied().unwrap_or(0);
            info!("{:>24}: {}", flag.name(), count);
        }
        info!(
            "Extent: {}ms, assessment: {}ms (summed over threads)",
            self.timings.extent.as_millis(),
            self.timings.assessment.as_millis()
        );
    }
}

pub struct Sinks {
    pub results: Box<dyn ResultSink>,
    pub failures: FailureLogWriter,
    pub options: RecordOptions,
}

impl Sinks {
    fn write_event(&mut self, run: &str, event: &QuantEvent) -> Result<(), OutputError> {
        if let Some(failure) = FailureRecord::from_event(run, event) {
            self.failures.add(failure)?;
        }
        self.results
            .add(QuantEventRecord::from_event(run, event, &self.options))
    }

    pub fn finish(&mut self) -> Result<(), OutputError> {
        self.results.finish()?;
        self.failures.finish()
    }
}

/// Processes identifications in chunks, streaming each chunk to the sinks
/// before starting the next.
pub fn main_loop<S: SpectrumSource + Sync>(
    identifications: &[IdentificationRecord],
    pipeline: &QuantPipeline<S>,
    labels: &LabelSet,
    chunk_size: usize,
    sinks: &mut Sinks,
) -> Result<RunSummary, OutputError> {
    let run_name = pipeline.run().run_name().to_string();
    let mut summary = RunSummary::new(&run_name);

    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());

    for chunk in identifications
        .chunks(chunk_size)
        .progress_with_style(style)
    {
        let (events, timings) = pipeline.process_identifications(chunk, labels);
        summary.timings += timings;
        for event in events.iter() {
            summary.record(event);
            sinks.write_event(&run_name, event)?;
        }
    }

    sinks.finish()?;
    Ok(summary)
}
