//! Light/heavy isotope-label quantitation of peptide identifications from
//! MS1 scans, with automated quality assessment of every event.

pub mod assessment;
pub mod data_sources;
pub mod errors;
pub mod isotopes;
pub mod models;
pub mod output;
pub mod peaks;
pub mod pipeline;
pub mod quant;
pub mod timings;
pub mod tolerance;
pub mod traits;
extern crate parquet;
#[macro_use]
extern crate parquet_derive;

pub use assessment::{
    AssessorConfig,
    EventAssessor,
};
pub use data_sources::{
    IdentificationRecord,
    InMemoryRun,
    LabelDefinition,
    LabelSet,
};
pub use errors::{
    IsoQuantError,
    Result,
};
pub use models::{
    AssessmentFlag,
    AssessmentResult,
    PeptideQuantRequest,
    QuantResult,
    RatioSentinels,
};
pub use pipeline::{
    QuantEvent,
    QuantPipeline,
};
pub use quant::{
    QuantConfig,
    Quantifier,
};
pub use tolerance::MzTolerance;
pub use traits::SpectrumSource;
