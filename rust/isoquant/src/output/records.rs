use crate::models::RatioSentinels;
use crate::pipeline::QuantEvent;
use serde::{
    Deserialize,
    Serialize,
};

/// How events are flattened into records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordOptions {
    pub ratio_sentinels: RatioSentinels,
    /// Also report the areas before overlap correction.
    pub include_raw_areas: bool,
}

/// One row of the results table.
///
/// Kept flat since neither csv nor parquet_derive support nested fields.
/// Quantitation columns are empty for events that could not be quantified.
#[derive(Debug, Clone, Serialize, ParquetRecordWriter)]
pub struct QuantEventRecord {
    pub run: String,
    pub peptide: String,
    pub protein: Option<String>,
    pub charge: u8,
    pub scan: u32,

    pub light_mass: Option<f64>,
    pub heavy_mass: Option<f64>,
    pub first_scan: Option<u32>,
    pub last_scan: Option<u32>,
    pub light_area: Option<f64>,
    pub heavy_area: Option<f64>,
    pub decimal_ratio: Option<f64>,
    pub raw_light_area: Option<f64>,
    pub raw_heavy_area: Option<f64>,
    pub center_match_count: Option<u32>,

    pub flag_code: u8,
    pub flag: String,
    pub flag_description: String,
    pub explanation: String,
    pub single_peak_ratio: f64,
    /// Per-check explanations as a JSON object.
    pub checks: String,
}

impl QuantEventRecord {
    pub fn from_event(run: &str, event: &QuantEvent, options: &RecordOptions) -> Self {
        let quant = event.quant.as_ref();
        let raw = |v: f64| options.include_raw_areas.then_some(v);
        let flag = event.assessment.flag;
        Self {
            run: run.to_string(),
            peptide: event.peptide.to_string(),
            protein: event.protein.clone(),
            charge: event.charge,
            scan: event.scan,

            light_mass: quant.map(|q| q.request.light_mass()),
            heavy_mass: quant.map(|q| q.request.heavy_mass()),
            first_scan: quant.map(|q| q.first_scan),
            last_scan: quant.map(|q| q.last_scan),
            light_area: quant.map(|q| q.q3_light),
            heavy_area: quant.map(|q| q.q3_heavy),
            decimal_ratio: quant.map(|q| q.ratio(&options.ratio_sentinels)),
            raw_light_area: quant.and_then(|q| raw(q.q2_light)),
            raw_heavy_area: quant.and_then(|q| raw(q.q2_heavy)),
            center_match_count: quant.map(|q| q.center_match_count as u32),

            flag_code: flag.code(),
            flag: flag.name().to_string(),
            flag_description: flag.description().to_string(),
            explanation: event.assessment.explanation.clone(),
            single_peak_ratio: event.assessment.single_peak_ratio,
            checks: event.assessment.checks_json(),
        }
    }
}

/// One row of the failure log.
#[derive(Debug, Clone, Serialize)]
pub struct FailureRecord {
    pub run: String,
    pub peptide: String,
    pub charge: u8,
    pub scan: u32,
    pub reason: String,
}

impl FailureRecord {
    pub fn from_event(run: &str, event: &QuantEvent) -> Option<Self> {
        event.failure.as_ref().map(|reason| Self {
            run: run.to_string(),
            peptide: event.peptide.to_string(),
            charge: event.charge,
            scan: event.scan,
            reason: reason.clone(),
        })
    }
}
