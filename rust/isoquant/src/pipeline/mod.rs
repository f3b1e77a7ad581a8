//! Per-identification orchestration and the parallel batch runner.
//!
//! Every identification resolves to exactly one [`QuantEvent`]. Per-event
//! failures (empty windows, unlabelled peptides, cancellation) become
//! `Unevaluated` events carrying the reason and never stop the batch.

mod accumulator;

use crate::assessment::EventAssessor;
use crate::data_sources::{
    IdentificationRecord,
    LabelSet,
};
use crate::errors::DataProcessingError;
use crate::models::{
    AssessmentFlag,
    AssessmentResult,
    PeptideQuantRequest,
    QuantResult,
};
use crate::quant::Quantifier;
use crate::timings::QuantTimings;
use crate::traits::SpectrumSource;
use accumulator::QuantEventAccumulator;
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use std::time::{
    Duration,
    Instant,
};
use tracing::{
    info,
    warn,
};

/// Outcome of processing one identification.
#[derive(Debug, Clone)]
pub struct QuantEvent {
    pub peptide: Arc<str>,
    pub protein: Option<String>,
    pub charge: u8,
    pub scan: u32,
    /// Absent when quantitation could not run.
    pub quant: Option<QuantResult>,
    pub assessment: AssessmentResult,
    /// Why the event could not be processed, for the failure log.
    pub failure: Option<String>,
}

impl QuantEvent {
    fn failed(
        peptide: Arc<str>,
        protein: Option<String>,
        charge: u8,
        scan: u32,
        reason: String,
    ) -> Self {
        Self {
            peptide,
            protein,
            charge,
            scan,
            quant: None,
            assessment: AssessmentResult::unevaluated(reason.clone()),
            failure: Some(reason),
        }
    }

    pub fn flag(&self) -> AssessmentFlag {
        self.assessment.flag
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

pub struct QuantPipeline<S: SpectrumSource> {
    run: S,
    quantifier: Quantifier,
    assessor: Option<EventAssessor>,
    cancelled: Arc<AtomicBool>,
    event_time_budget: Option<Duration>,
}

impl<S: SpectrumSource> QuantPipeline<S> {
    pub fn new(run: S, quantifier: Quantifier, assessor: Option<EventAssessor>) -> Self {
        Self {
            run,
            quantifier,
            assessor,
            cancelled: Arc::new(AtomicBool::new(false)),
            event_time_budget: None,
        }
    }

    /// Events slower than `budget` are logged as warnings.
    pub fn with_event_time_budget(mut self, budget: Duration) -> Self {
        self.event_time_budget = Some(budget);
        self
    }

    pub fn run(&self) -> &S {
        &self.run
    }

    /// Shared flag that, once set, makes every remaining event resolve as
    /// cancelled without reading spectra.
    pub fn cancellation_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn process(&self, request: &PeptideQuantRequest) -> QuantEvent {
        let mut timings = QuantTimings::default();
        self.process_timed(request, None, &mut timings)
    }

    pub fn process_identification(
        &self,
        record: &IdentificationRecord,
        labels: &LabelSet,
        timings: &mut QuantTimings,
    ) -> QuantEvent {
        match labels.request_for(record) {
            Ok(request) => self.process_timed(&request, record.protein.clone(), timings),
            Err(e) => {
                warn!(
                    "Skipping {} (scan {}) in run '{}': {}",
                    record.peptide,
                    record.scan,
                    self.run.run_name(),
                    e
                );
                QuantEvent::failed(
                    Arc::from(record.peptide.as_str()),
                    record.protein.clone(),
                    record.charge,
                    record.scan,
                    e.to_string(),
                )
            }
        }
    }

    fn process_timed(
        &self,
        request: &PeptideQuantRequest,
        protein: Option<String>,
        timings: &mut QuantTimings,
    ) -> QuantEvent {
        let peptide: Arc<str> = Arc::from(request.peptide());
        if self.is_cancelled() {
            return QuantEvent::failed(
                peptide,
                protein,
                request.charge(),
                request.scan(),
                DataProcessingError::Cancelled.to_string(),
            );
        }

        let event_start = Instant::now();
        let st = Instant::now();
        let quant = self.quantifier.quantify(&self.run, request);
        timings.extent += st.elapsed();

        let event = match quant {
            Ok(quant) => {
                let st = Instant::now();
                let assessment = match &self.assessor {
                    Some(assessor) => assessor.assess(&self.run, &quant),
                    None => AssessmentResult::unevaluated("Assessment disabled"),
                };
                timings.assessment += st.elapsed();
                QuantEvent {
                    peptide,
                    protein,
                    charge: request.charge(),
                    scan: request.scan(),
                    quant: Some(quant),
                    assessment,
                    failure: None,
                }
            }
            Err(e) => {
                warn!(
                    "Unable to quantify {} z={} scan {} in run '{}': {}",
                    request.peptide(),
                    request.charge(),
                    request.scan(),
                    self.run.run_name(),
                    e
                );
                QuantEvent::failed(
                    peptide,
                    protein,
                    request.charge(),
                    request.scan(),
                    e.to_string(),
                )
            }
        };

        if let Some(budget) = self.event_time_budget {
            let elapsed = event_start.elapsed();
            if elapsed > budget {
                warn!(
                    "{} z={} scan {} took {:?} (budget {:?})",
                    request.peptide(),
                    request.charge(),
                    request.scan(),
                    elapsed,
                    budget
                );
            }
        }
        event
    }
}

impl<S: SpectrumSource + Sync> QuantPipeline<S> {
    /// Processes requests in parallel. Events come back in input order.
    pub fn process_batch(&self, requests: &[PeptideQuantRequest]) -> (Vec<QuantEvent>, QuantTimings) {
        let st = Instant::now();
        let results: QuantEventAccumulator = requests
            .par_iter()
            .map(|request| {
                let mut timings = QuantTimings::default();
                let event = self.process_timed(request, None, &mut timings);
                (event, timings)
            })
            .collect();
        log_throughput(requests.len(), st.elapsed(), &results.timings);
        (results.events, results.timings)
    }

    /// Resolves labels and processes identifications in parallel.
    pub fn process_identifications(
        &self,
        records: &[IdentificationRecord],
        labels: &LabelSet,
    ) -> (Vec<QuantEvent>, QuantTimings) {
        let st = Instant::now();
        let results: QuantEventAccumulator = records
            .par_iter()
            .map(|record| {
                let mut timings = QuantTimings::default();
                let event = self.process_identification(record, labels, &mut timings);
                (event, timings)
            })
            .collect();
        log_throughput(records.len(), st.elapsed(), &results.timings);
        (results.events, results.timings)
    }
}

fn log_throughput(num_items: usize, elapsed: Duration, timings: &QuantTimings) {
    if num_items == 0 {
        return;
    }
    let throughput = num_items as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
    info!(
        "Quantified {} identifications in {:?} ({:#.1}/s)",
        num_items, elapsed, throughput
    );
    info!("{:?}", timings);
}
