pub mod assessment;
pub mod quant_result;
pub mod request;

pub use assessment::{
    AssessmentCheck,
    AssessmentFlag,
    AssessmentResult,
    CheckOutcome,
};
pub use quant_result::{
    QuantResult,
    RatioSentinels,
};
pub use request::{
    MAX_LIGHT_ISOTOPE,
    NUM_HEAVY_TARGETS,
    PeptideQuantRequest,
    TargetList,
};
