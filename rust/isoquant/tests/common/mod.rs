#![allow(dead_code)]

use isoquant::data_sources::ScanRecord;
use isoquant::isotopes::{
    envelope,
    isotope_mz,
    mass_to_mz,
    mz_to_mass,
};
use isoquant::{
    InMemoryRun,
    PeptideQuantRequest,
};

pub const LIGHT_MASS: f64 = 1000.0;
pub const HEAVY_MASS: f64 = 1006.0;
pub const CHARGE: u8 = 2;
pub const NUM_MS1_SCANS: usize = 40;

/// Identification scan. MS1 scans are odd-numbered, so the first MS1 scan at
/// or after it is run index 21 and the window center lands on run index 20.
pub const ID_SCAN: u32 = 42;
pub const APEX_INDEX: usize = 20;

/// Relative elution profile over `APEX_INDEX - 3 ..= APEX_INDEX + 3`.
pub const ELUTION: [f64; 7] = [0.2, 0.5, 0.8, 1.0, 0.8, 0.5, 0.2];

pub const SCALE: f64 = 1e6;

pub fn ms1_scan_num(index: usize) -> u32 {
    2 * index as u32 + 1
}

pub fn request() -> PeptideQuantRequest {
    request_with_charge(CHARGE)
}

pub fn request_with_charge(charge: u8) -> PeptideQuantRequest {
    PeptideQuantRequest::try_new("PEPTIDEK", charge, ID_SCAN, LIGHT_MASS, HEAVY_MASS).unwrap()
}

/// Centroided scan with a peak at every `(mz, intensity)` and zero-intensity
/// valleys in between, so each peak is a local maximum.
pub fn scan_with_peaks(scan_num: u32, mut peaks: Vec<(f64, f64)>) -> ScanRecord {
    peaks.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut mz = Vec::new();
    let mut intensity = Vec::new();
    if let Some(first) = peaks.first() {
        mz.push(first.0 - 0.25);
        intensity.push(0.0);
    }
    for (i, (pmz, pint)) in peaks.iter().enumerate() {
        mz.push(*pmz);
        intensity.push(*pint);
        let next = peaks.get(i + 1).map(|p| p.0).unwrap_or(pmz + 0.5);
        mz.push(0.5 * (pmz + next));
        intensity.push(0.0);
    }
    ScanRecord {
        scan_num,
        ms_level: 1,
        mz,
        intensity,
    }
}

/// Light and heavy isotope peaks at `weight` of the apex, light bleeding
/// into the heavy positions as it would physically.
pub fn labelled_peaks(light_scale: f64, heavy_scale: f64, weight: f64) -> Vec<(f64, f64)> {
    labelled_peaks_at_charge(CHARGE, light_scale, heavy_scale, weight)
}

pub fn labelled_peaks_at_charge(
    charge: u8,
    light_scale: f64,
    heavy_scale: f64,
    weight: f64,
) -> Vec<(f64, f64)> {
    let light_mz = mass_to_mz(LIGHT_MASS, charge);
    let heavy_mz = mass_to_mz(HEAVY_MASS, charge);
    let light_env = envelope(LIGHT_MASS, 12);
    let heavy_env = envelope(HEAVY_MASS, 6);

    let mut peaks = Vec::new();
    for i in 0..6 {
        peaks.push((
            isotope_mz(light_mz, i, charge),
            SCALE * weight * light_scale * light_env[i],
        ));
    }
    for i in 0..6 {
        let intensity = heavy_scale * heavy_env[i] + light_scale * light_env[6 + i];
        peaks.push((isotope_mz(heavy_mz, i, charge), SCALE * weight * intensity));
    }
    peaks
}

/// First three isotope peaks of an unrelated species at `mono_mz`, with the
/// monoisotope at `mono_intensity`.
pub fn species_peaks(mono_mz: f64, charge: u8, mono_intensity: f64) -> Vec<(f64, f64)> {
    let env = envelope(mz_to_mass(mono_mz, charge), 3);
    (0..3)
        .map(|i| {
            (
                isotope_mz(mono_mz, i, charge),
                mono_intensity * env[i] / env[0],
            )
        })
        .collect()
}

/// A run where the labelled pair elutes around [`APEX_INDEX`], with MS2
/// scans interleaved on the even scan numbers.
pub fn synthetic_run(light_scale: f64, heavy_scale: f64) -> InMemoryRun {
    synthetic_run_with(|index| {
        let offset = index as i64 - APEX_INDEX as i64;
        if offset.abs() <= 3 {
            labelled_peaks(light_scale, heavy_scale, ELUTION[(offset + 3) as usize])
        } else {
            Vec::new()
        }
    })
}

pub fn synthetic_run_with(peaks_at: impl Fn(usize) -> Vec<(f64, f64)>) -> InMemoryRun {
    let mut scans = Vec::new();
    for index in 0..NUM_MS1_SCANS {
        scans.push(scan_with_peaks(ms1_scan_num(index), peaks_at(index)));
        scans.push(ScanRecord {
            scan_num: ms1_scan_num(index) + 1,
            ms_level: 2,
            mz: vec![150.0, 250.0],
            intensity: vec![1e9, 1e9],
        });
    }
    InMemoryRun::try_new("synthetic", scans).unwrap()
}
