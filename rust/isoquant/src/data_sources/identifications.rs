use crate::errors::{
    ConfigError,
    DataProcessingError,
    DataReadingError,
};
use crate::models::PeptideQuantRequest;
use regex::Regex;
use serde::{
    Deserialize,
    Serialize,
};
use std::io::{
    BufRead,
    BufReader,
};
use std::path::{
    Path,
    PathBuf,
};
use std::sync::{
    Arc,
    LazyLock,
};
use tracing::info;

/// Residue, optionally followed by a bracketed mass delta: `K`, `K[+8.0142]`, `M[15.9949]`.
static RESIDUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z])(?:\[([+-]?[0-9]*\.?[0-9]+)\])?").expect("This is valid regex")
});

/// Modifications within this distance of a label delta are taken to be that label.
const LABEL_MATCH_TOLERANCE: f64 = 0.01;

/// One identified spectrum to be quantified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentificationRecord {
    /// Modified sequence, modifications in bracket notation.
    pub peptide: String,
    pub charge: u8,
    pub scan: u32,
    pub calc_neutral_mass: f64,
    #[serde(default)]
    pub protein: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentificationFormat {
    Tsv,
    Csv,
    NdJson,
}

impl IdentificationFormat {
    pub fn detect_from_path(path: &Path) -> Result<Self, DataReadingError> {
        let path_str = path.to_string_lossy().to_lowercase();
        if path_str.ends_with(".tsv") || path_str.ends_with(".txt") {
            Ok(Self::Tsv)
        } else if path_str.ends_with(".csv") {
            Ok(Self::Csv)
        } else if path_str.ends_with(".ndjson") || path_str.ends_with(".jsonl") {
            Ok(Self::NdJson)
        } else {
            Err(DataReadingError::UnknownFormat {
                path: PathBuf::from(path),
            })
        }
    }
}

pub fn read_identifications(path: &Path) -> Result<Vec<IdentificationRecord>, DataReadingError> {
    let format = IdentificationFormat::detect_from_path(path)?;
    let file = std::fs::File::open(path).map_err(|e| DataReadingError::Io {
        source: e,
        path: PathBuf::from(path),
    })?;
    let reader = BufReader::new(file);
    let out = match format {
        IdentificationFormat::Tsv => read_delimited(reader, b'\t')?,
        IdentificationFormat::Csv => read_delimited(reader, b',')?,
        IdentificationFormat::NdJson => read_ndjson(reader, path)?,
    };
    info!("Read {} identifications from {}", out.len(), path.display());
    Ok(out)
}

pub fn read_delimited<R: BufRead>(
    reader: R,
    delimiter: u8,
) -> Result<Vec<IdentificationRecord>, DataReadingError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut out = Vec::new();
    for record in csv_reader.deserialize() {
        out.push(record?);
    }
    Ok(out)
}

pub fn read_ndjson<R: BufRead>(
    reader: R,
    path: &Path,
) -> Result<Vec<IdentificationRecord>, DataReadingError> {
    let mut out = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|e| DataReadingError::Io {
            source: e,
            path: PathBuf::from(path),
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|e| DataReadingError::Json {
            source: e,
            path: PathBuf::from(path),
        })?;
        out.push(record);
    }
    Ok(out)
}

/// Residue with the mass delta of its modification, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedResidue {
    pub residue: char,
    pub delta: Option<f64>,
}

/// Splits a modified sequence into residues.
///
/// Lowercase letters mark termini (`n[+42.01]PEPTIDE`) and are kept so that
/// label definitions can target them.
pub fn parse_modified_sequence(sequence: &str) -> Result<Vec<ParsedResidue>, DataReadingError> {
    let mut out = Vec::with_capacity(sequence.len());
    let mut consumed = 0;
    for caps in RESIDUE_RE.captures_iter(sequence) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() != consumed {
            return Err(DataReadingError::MalformedIdentification {
                peptide: sequence.to_string(),
                context: format!("unexpected text at position {}", consumed),
            });
        }
        consumed = whole.end();

        let residue = caps
            .get(1)
            .and_then(|m| m.as_str().chars().next())
            .ok_or_else(|| DataReadingError::MalformedIdentification {
                peptide: sequence.to_string(),
                context: "empty residue".to_string(),
            })?;
        let delta = match caps.get(2) {
            Some(m) => Some(m.as_str().parse::<f64>().map_err(|e| {
                DataReadingError::MalformedIdentification {
                    peptide: sequence.to_string(),
                    context: format!("bad modification mass '{}': {}", m.as_str(), e),
                }
            })?),
            None => None,
        };
        out.push(ParsedResidue { residue, delta });
    }
    if consumed != sequence.len() {
        return Err(DataReadingError::MalformedIdentification {
            peptide: sequence.to_string(),
            context: format!("unexpected text at position {}", consumed),
        });
    }
    Ok(out)
}

/// Mass shift carried by one residue in its light and heavy form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelDefinition {
    pub residue: char,
    pub light_delta: f64,
    pub heavy_delta: f64,
}

impl LabelDefinition {
    pub fn mass_difference(&self) -> f64 {
        self.heavy_delta - self.light_delta
    }

    fn is_heavy(&self, delta: Option<f64>) -> bool {
        delta.is_some_and(|d| (d - self.heavy_delta).abs() <= LABEL_MATCH_TOLERANCE)
    }
}

/// Validated set of label definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSet {
    labels: Vec<LabelDefinition>,
}

impl LabelSet {
    pub fn try_new(labels: Vec<LabelDefinition>) -> Result<Self, ConfigError> {
        if labels.is_empty() {
            return Err(ConfigError::MissingLabels);
        }
        for label in labels.iter() {
            if !(label.heavy_delta > label.light_delta) {
                return Err(ConfigError::InconsistentLabel {
                    residue: label.residue,
                    light_delta: label.light_delta,
                    heavy_delta: label.heavy_delta,
                });
            }
        }
        Ok(Self { labels })
    }

    pub fn labels(&self) -> &[LabelDefinition] {
        &self.labels
    }

    fn label_for(&self, residue: char) -> Option<&LabelDefinition> {
        self.labels.iter().find(|l| l.residue == residue)
    }

    /// Light and heavy neutral masses of an identification.
    pub fn request_for(
        &self,
        record: &IdentificationRecord,
    ) -> Result<PeptideQuantRequest, DataProcessingError> {
        let residues = parse_modified_sequence(&record.peptide).map_err(|e| {
            DataProcessingError::UnparseablePeptide {
                peptide: record.peptide.clone(),
                context: e.to_string(),
            }
        })?;

        let mut diff = 0.0;
        let mut labelled = 0;
        let mut is_heavy = false;
        for res in residues.iter() {
            if let Some(label) = self.label_for(res.residue) {
                labelled += 1;
                diff += label.mass_difference();
                is_heavy |= label.is_heavy(res.delta);
            }
        }
        if labelled == 0 {
            return Err(DataProcessingError::NoLabelledResidues {
                peptide: record.peptide.clone(),
            });
        }

        let (light_mass, heavy_mass) = if is_heavy {
            (record.calc_neutral_mass - diff, record.calc_neutral_mass)
        } else {
            (record.calc_neutral_mass, record.calc_neutral_mass + diff)
        };
        PeptideQuantRequest::try_new(
            Arc::<str>::from(record.peptide.as_str()),
            record.charge,
            record.scan,
            light_mass,
            heavy_mass,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lys_label() -> LabelSet {
        LabelSet::try_new(vec![LabelDefinition {
            residue: 'K',
            light_delta: 0.0,
            heavy_delta: 8.0142,
        }])
        .unwrap()
    }

    fn record(peptide: &str) -> IdentificationRecord {
        IdentificationRecord {
            peptide: peptide.to_string(),
            charge: 2,
            scan: 100,
            calc_neutral_mass: 1000.0,
            protein: None,
        }
    }

    #[test]
    fn test_parse_modified_sequence() {
        let res = parse_modified_sequence("PEM[15.9949]K[+8.0142]").unwrap();
        assert_eq!(res.len(), 4);
        assert_eq!(res[2].residue, 'M');
        assert_eq!(res[2].delta, Some(15.9949));
        assert_eq!(res[3].delta, Some(8.0142));
        assert_eq!(res[0].delta, None);

        assert!(parse_modified_sequence("PEP[abc]K").is_err());
        assert!(parse_modified_sequence("PEP-K").is_err());
    }

    #[test]
    fn test_light_and_heavy_assignment() {
        let labels = lys_label();
        let light = labels.request_for(&record("PEPTIDEK")).unwrap();
        assert_eq!(light.light_mass(), 1000.0);
        assert!((light.heavy_mass() - 1008.0142).abs() < 1e-9);

        let heavy = labels.request_for(&record("PEPTIDEK[+8.0142]")).unwrap();
        assert_eq!(heavy.heavy_mass(), 1000.0);
        assert!((heavy.light_mass() - 991.9858).abs() < 1e-9);
    }

    #[test]
    fn test_difference_sums_over_labelled_residues() {
        let labels = lys_label();
        let req = labels.request_for(&record("PEKPTIDEK")).unwrap();
        assert!((req.heavy_mass() - req.light_mass() - 2.0 * 8.0142).abs() < 1e-9);
    }

    #[test]
    fn test_no_labelled_residues() {
        let labels = lys_label();
        let err = labels.request_for(&record("PEPTIDER")).unwrap_err();
        assert!(matches!(err, DataProcessingError::NoLabelledResidues { .. }));
    }

    #[test]
    fn test_label_validation() {
        assert!(matches!(
            LabelSet::try_new(vec![]),
            Err(ConfigError::MissingLabels)
        ));
        let bad = LabelDefinition {
            residue: 'K',
            light_delta: 8.0,
            heavy_delta: 4.0,
        };
        assert!(matches!(
            LabelSet::try_new(vec![bad]),
            Err(ConfigError::InconsistentLabel { .. })
        ));
    }

    #[test]
    fn test_read_delimited() {
        let data = "peptide\tcharge\tscan\tcalc_neutral_mass\tprotein\nPEPTIDEK\t2\t10\t1000.5\tP1\nPEPK\t3\t12\t500.0\t\n";
        let recs = read_delimited(data.as_bytes(), b'\t').unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].protein.as_deref(), Some("P1"));
        assert_eq!(recs[1].charge, 3);
        assert_eq!(recs[1].protein, None);
    }

    #[test]
    fn test_read_ndjson() {
        let data = "{\"peptide\": \"PEPK\", \"charge\": 2, \"scan\": 5, \"calc_neutral_mass\": 600.0}\n\n";
        let recs = read_ndjson(data.as_bytes(), Path::new("mem.ndjson")).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].scan, 5);
    }
}
