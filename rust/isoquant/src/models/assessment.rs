use serde::{
    Deserialize,
    Serialize,
};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Primary verdict on a quantitation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssessmentFlag {
    #[serde(rename = "OK")]
    Ok,
    Coeluting,
    #[serde(rename = "DissimilarKL")]
    DissimilarKl,
    #[serde(rename = "DissimilarMS1Ratio")]
    DissimilarMs1Ratio,
    #[serde(rename = "Big2PeakKL")]
    Big2PeakKl,
    MissingPeaks,
    Unevaluated,
    Other,
}

impl AssessmentFlag {
    pub const ALL: [AssessmentFlag; 8] = [
        AssessmentFlag::Ok,
        AssessmentFlag::Coeluting,
        AssessmentFlag::DissimilarKl,
        AssessmentFlag::DissimilarMs1Ratio,
        AssessmentFlag::Big2PeakKl,
        AssessmentFlag::MissingPeaks,
        AssessmentFlag::Unevaluated,
        AssessmentFlag::Other,
    ];

    /// Stable numeric code used in result files.
    pub fn code(&self) -> u8 {
        match self {
            AssessmentFlag::Ok => 0,
            AssessmentFlag::Coeluting => 1,
            AssessmentFlag::DissimilarKl => 2,
            AssessmentFlag::DissimilarMs1Ratio => 3,
            AssessmentFlag::Big2PeakKl => 4,
            AssessmentFlag::MissingPeaks => 5,
            AssessmentFlag::Unevaluated => 6,
            AssessmentFlag::Other => 7,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.code() == code)
    }

    pub fn name(&self) -> &'static str {
        match self {
            AssessmentFlag::Ok => "OK",
            AssessmentFlag::Coeluting => "Coeluting",
            AssessmentFlag::DissimilarKl => "DissimilarKL",
            AssessmentFlag::DissimilarMs1Ratio => "DissimilarMS1Ratio",
            AssessmentFlag::Big2PeakKl => "Big2PeakKL",
            AssessmentFlag::MissingPeaks => "MissingPeaks",
            AssessmentFlag::Unevaluated => "Unevaluated",
            AssessmentFlag::Other => "Other",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AssessmentFlag::Ok => "OK",
            AssessmentFlag::Coeluting => "Coeluting peptide",
            AssessmentFlag::DissimilarKl => "Light and heavy KL scores differ",
            AssessmentFlag::DissimilarMs1Ratio => "Single-peak ratio differs from algorithm ratio",
            AssessmentFlag::Big2PeakKl => "Large 2-peak KL divergence",
            AssessmentFlag::MissingPeaks => "Missing monoisotopic or second peak",
            AssessmentFlag::Unevaluated => "Unevaluated",
            AssessmentFlag::Other => "Other problem",
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, AssessmentFlag::Ok)
    }
}

impl Display for AssessmentFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The individual checks, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentCheck {
    MissingPeaks,
    SinglePeakRatio,
    KlDivergence,
    TwoPeakKl,
    Coelution,
}

impl AssessmentCheck {
    /// Flag raised when this check fails.
    pub fn failure_flag(&self) -> AssessmentFlag {
        match self {
            AssessmentCheck::MissingPeaks => AssessmentFlag::MissingPeaks,
            AssessmentCheck::SinglePeakRatio => AssessmentFlag::DissimilarMs1Ratio,
            AssessmentCheck::KlDivergence => AssessmentFlag::DissimilarKl,
            AssessmentCheck::TwoPeakKl => AssessmentFlag::Big2PeakKl,
            AssessmentCheck::Coelution => AssessmentFlag::Coeluting,
        }
    }
}

/// Result of a single check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub passed: bool,
    pub explanation: String,
}

impl CheckOutcome {
    pub fn pass(explanation: impl Into<String>) -> Self {
        Self {
            passed: true,
            explanation: explanation.into(),
        }
    }

    pub fn fail(explanation: impl Into<String>) -> Self {
        Self {
            passed: false,
            explanation: explanation.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub flag: AssessmentFlag,
    /// Why the primary flag was assigned.
    pub explanation: String,
    /// Explanations of every check that ran.
    pub checks: BTreeMap<AssessmentCheck, CheckOutcome>,
    pub single_peak_ratio: f64,
}

impl AssessmentResult {
    pub fn unevaluated(reason: impl Into<String>) -> Self {
        Self {
            flag: AssessmentFlag::Unevaluated,
            explanation: reason.into(),
            checks: BTreeMap::new(),
            single_peak_ratio: f64::NAN,
        }
    }

    pub fn other(reason: impl Into<String>) -> Self {
        Self {
            flag: AssessmentFlag::Other,
            ..Self::unevaluated(reason)
        }
    }

    /// Builds the result from check outcomes, in run order.
    ///
    /// The first failing check determines the primary flag.
    pub fn from_checks(
        outcomes: impl IntoIterator<Item = (AssessmentCheck, CheckOutcome)>,
        single_peak_ratio: f64,
    ) -> Self {
        let mut checks = BTreeMap::new();
        let mut primary: Option<(AssessmentFlag, String)> = None;
        for (check, outcome) in outcomes {
            if !outcome.passed && primary.is_none() {
                primary = Some((check.failure_flag(), outcome.explanation.clone()));
            }
            checks.insert(check, outcome);
        }
        let (flag, explanation) =
            primary.unwrap_or((AssessmentFlag::Ok, "All checks passed".to_string()));
        Self {
            flag,
            explanation,
            checks,
            single_peak_ratio,
        }
    }

    /// Per-check explanations as a JSON object, for flat output formats.
    pub fn checks_json(&self) -> String {
        let map: BTreeMap<AssessmentCheck, &str> = self
            .checks
            .iter()
            .map(|(k, v)| (*k, v.explanation.as_str()))
            .collect();
        serde_json::to_string(&map).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_roundtrip() {
        for flag in AssessmentFlag::ALL {
            assert_eq!(AssessmentFlag::from_code(flag.code()), Some(flag));
        }
        assert_eq!(AssessmentFlag::from_code(8), None);
    }

    #[test]
    fn test_first_failure_is_primary() {
        let res = AssessmentResult::from_checks(
            vec![
                (AssessmentCheck::SinglePeakRatio, CheckOutcome::pass("fine")),
                (AssessmentCheck::KlDivergence, CheckOutcome::fail("kl off")),
                (AssessmentCheck::TwoPeakKl, CheckOutcome::fail("kl big")),
            ],
            1.0,
        );
        assert_eq!(res.flag, AssessmentFlag::DissimilarKl);
        assert_eq!(res.explanation, "kl off");
        assert_eq!(res.checks.len(), 3);
    }

    #[test]
    fn test_checks_json() {
        let res = AssessmentResult::from_checks(
            vec![(AssessmentCheck::TwoPeakKl, CheckOutcome::pass("ok"))],
            1.0,
        );
        assert_eq!(res.checks_json(), r#"{"two_peak_kl":"ok"}"#);
        assert!(res.flag.is_ok());
    }
}
