//! Stage timings, summed across events and threads.

use serde::Serialize;
use std::time::Duration;

/// Accumulated time spent in each stage of the quantitation pipeline.
///
/// # Example
///
/// ```ignore
/// let (events, timings) = pipeline.process_batch(&requests);
/// println!("Extent: {}ms", timings.extent.as_millis());
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct QuantTimings {
    /// Building the scan window, matching isotopes and solving the areas.
    pub extent: Duration,

    /// Running the assessment checks.
    pub assessment: Duration,
}

impl Serialize for QuantTimings {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("QuantTimings", 2)?;
        state.serialize_field("extent_ms", &self.extent.as_millis())?;
        state.serialize_field("assessment_ms", &self.assessment.as_millis())?;
        state.end()
    }
}

impl std::ops::AddAssign for QuantTimings {
    fn add_assign(&mut self, rhs: Self) {
        self.extent += rhs.extent;
        self.assessment += rhs.assessment;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_serialize() {
        let mut t = QuantTimings {
            extent: Duration::from_millis(5),
            assessment: Duration::from_millis(1),
        };
        t += QuantTimings {
            extent: Duration::from_millis(7),
            assessment: Duration::from_millis(2),
        };
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, r#"{"extent_ms":12,"assessment_ms":3}"#);
    }
}
