//! Peak picking and peak/target matching primitives.

pub mod local_maxima;
pub mod matching;

pub use local_maxima::local_maxima;
pub use matching::{
    PeakMatches,
    match_peaks,
};
