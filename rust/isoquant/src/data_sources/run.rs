use crate::errors::DataReadingError;
use crate::traits::{
    ScanPeaks,
    SpectrumSource,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::io::{
    BufReader,
    Read,
};
use std::path::{
    Path,
    PathBuf,
};
use tracing::{
    debug,
    info,
};

const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

fn default_ms_level() -> u8 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub scan_num: u32,
    #[serde(default = "default_ms_level")]
    pub ms_level: u8,
    pub mz: Vec<f64>,
    pub intensity: Vec<f64>,
}

/// Serialized form of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunFile {
    pub run: String,
    pub scans: Vec<ScanRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunFormat {
    Json,
    JsonZstd,
    MessagePack,
    MessagePackZstd,
}

impl RunFormat {
    pub fn detect_from_path(path: &Path) -> Result<Self, DataReadingError> {
        let path_str = path.to_string_lossy().to_lowercase();

        if path_str.ends_with(".msgpack.zst") {
            Ok(RunFormat::MessagePackZstd)
        } else if path_str.ends_with(".msgpack") {
            Ok(RunFormat::MessagePack)
        } else if path_str.ends_with(".json.zst") {
            Ok(RunFormat::JsonZstd)
        } else if path_str.ends_with(".json") {
            Ok(RunFormat::Json)
        } else {
            Self::detect_from_content(path)
        }
    }

    fn detect_from_content(path: &Path) -> Result<Self, DataReadingError> {
        let file = std::fs::File::open(path).map_err(|e| DataReadingError::Io {
            source: e,
            path: PathBuf::from(path),
        })?;
        let mut reader = BufReader::new(file);
        let mut buffer = [0u8; 4];
        let bytes_read = reader.read(&mut buffer).map_err(|e| DataReadingError::Io {
            source: e,
            path: PathBuf::from(path),
        })?;
        if bytes_read < 4 {
            return Err(DataReadingError::UnknownFormat {
                path: PathBuf::from(path),
            });
        }

        if buffer == ZSTD_MAGIC {
            // Peek into the compressed stream to tell JSON from MessagePack.
            let file = std::fs::File::open(path).map_err(|e| DataReadingError::Io {
                source: e,
                path: PathBuf::from(path),
            })?;
            let mut decoder = zstd::Decoder::new(file).map_err(|e| DataReadingError::Io {
                source: e,
                path: PathBuf::from(path),
            })?;
            let mut first = [0u8; 1];
            decoder
                .read_exact(&mut first)
                .map_err(|e| DataReadingError::Io {
                    source: e,
                    path: PathBuf::from(path),
                })?;
            if first[0] == b'{' || first[0].is_ascii_whitespace() {
                Ok(RunFormat::JsonZstd)
            } else {
                Ok(RunFormat::MessagePackZstd)
            }
        } else if buffer[0] == b'{' || buffer[0].is_ascii_whitespace() {
            Ok(RunFormat::Json)
        } else {
            Ok(RunFormat::MessagePack)
        }
    }
}

/// MS1 scans of a run held in memory.
///
/// Loaded once, read-only afterwards, so it can be shared across threads.
#[derive(Debug, Clone)]
pub struct InMemoryRun {
    name: String,
    scan_nums: Vec<u32>,
    mzs: Vec<Vec<f64>>,
    intensities: Vec<Vec<f64>>,
}

impl InMemoryRun {
    /// Keeps MS1 scans only, sorts scans by number and peaks by m/z.
    pub fn try_new(
        name: impl Into<String>,
        scans: Vec<ScanRecord>,
    ) -> Result<Self, DataReadingError> {
        let name = name.into();
        let mut scans: Vec<ScanRecord> = scans.into_iter().filter(|s| s.ms_level == 1).collect();
        scans.sort_by_key(|s| s.scan_num);

        let mut scan_nums = Vec::with_capacity(scans.len());
        let mut mzs = Vec::with_capacity(scans.len());
        let mut intensities = Vec::with_capacity(scans.len());
        for scan in scans {
            if scan.mz.len() != scan.intensity.len() {
                return Err(DataReadingError::MalformedRun {
                    run: name,
                    context: format!(
                        "scan {} has {} m/z values but {} intensities",
                        scan.scan_num,
                        scan.mz.len(),
                        scan.intensity.len()
                    ),
                });
            }
            if scan_nums.last() == Some(&scan.scan_num) {
                return Err(DataReadingError::MalformedRun {
                    run: name,
                    context: format!("duplicated scan number {}", scan.scan_num),
                });
            }
            let (mz, intensity) = sorted_peaks(scan.mz, scan.intensity);
            scan_nums.push(scan.scan_num);
            mzs.push(mz);
            intensities.push(intensity);
        }

        debug!("Run '{}' holds {} MS1 scans", name, scan_nums.len());
        Ok(Self {
            name,
            scan_nums,
            mzs,
            intensities,
        })
    }

    pub fn from_run_file(file: RunFile) -> Result<Self, DataReadingError> {
        Self::try_new(file.run, file.scans)
    }

    pub fn from_file(path: &Path) -> Result<Self, DataReadingError> {
        let format = RunFormat::detect_from_path(path)?;
        Self::from_file_with_format(path, format)
    }

    pub fn from_file_with_format(path: &Path, format: RunFormat) -> Result<Self, DataReadingError> {
        let st = std::time::Instant::now();
        let file = std::fs::File::open(path).map_err(|e| DataReadingError::Io {
            source: e,
            path: PathBuf::from(path),
        })?;

        let run_file = match format {
            RunFormat::Json => read_json(BufReader::new(file), path)?,
            RunFormat::JsonZstd => read_json(BufReader::new(zstd_decoder(file, path)?), path)?,
            RunFormat::MessagePack => read_msgpack(BufReader::new(file), path)?,
            RunFormat::MessagePackZstd => {
                read_msgpack(BufReader::new(zstd_decoder(file, path)?), path)?
            }
        };
        let out = Self::from_run_file(run_file)?;
        info!(
            "Loaded run '{}' ({} MS1 scans) from {} in {:?}",
            out.name,
            out.scan_count(),
            path.display(),
            st.elapsed()
        );
        Ok(out)
    }
}

fn zstd_decoder<R: Read>(
    reader: R,
    path: &Path,
) -> Result<zstd::Decoder<'static, BufReader<R>>, DataReadingError> {
    zstd::Decoder::new(reader).map_err(|e| DataReadingError::Io {
        source: e,
        path: PathBuf::from(path),
    })
}

fn read_json<R: Read>(reader: R, path: &Path) -> Result<RunFile, DataReadingError> {
    serde_json::from_reader(reader).map_err(|e| DataReadingError::Json {
        source: e,
        path: PathBuf::from(path),
    })
}

fn read_msgpack<R: Read>(reader: R, path: &Path) -> Result<RunFile, DataReadingError> {
    rmp_serde::from_read(reader).map_err(|e| DataReadingError::MessagePack {
        source: e,
        path: PathBuf::from(path),
    })
}

fn sorted_peaks(mz: Vec<f64>, intensity: Vec<f64>) -> (Vec<f64>, Vec<f64>) {
    if mz.windows(2).all(|w| w[0] <= w[1]) {
        return (mz, intensity);
    }
    let mut pairs: Vec<(f64, f64)> = mz.into_iter().zip(intensity).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    pairs.into_iter().unzip()
}

impl SpectrumSource for InMemoryRun {
    fn scan_count(&self) -> usize {
        self.scan_nums.len()
    }

    fn index_for_scan_num(&self, scan: u32) -> usize {
        self.scan_nums.partition_point(|&s| s < scan)
    }

    fn scan_at(&self, index: usize) -> Option<ScanPeaks<'_>> {
        Some(ScanPeaks {
            mz: self.mzs.get(index)?,
            intensity: self.intensities.get(index)?,
        })
    }

    fn scan_num_at(&self, index: usize) -> Option<u32> {
        self.scan_nums.get(index).copied()
    }

    fn run_name(&self) -> &str {
        &self.name
    }
}
