// annorank-isotope/src/pattern.rs
//! Isotope patterns as plain peak lists.

use alloc::vec::Vec;
use crate::tolerance::MzTolerance;

/// A single centroided signal.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataPoint {
    pub mz: f64,
    pub intensity: f64,
}

impl DataPoint {
    pub const fn new(mz: f64, intensity: f64) -> Self {
        Self { mz, intensity }
    }
}

/// A measured or predicted isotope pattern. Peaks are kept sorted by m/z.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "Vec<DataPoint>", into = "Vec<DataPoint>"))]
pub struct IsotopePattern {
    peaks: Vec<DataPoint>,
}

impl From<Vec<DataPoint>> for IsotopePattern {
    fn from(peaks: Vec<DataPoint>) -> Self {
        Self::new(peaks)
    }
}

impl From<IsotopePattern> for Vec<DataPoint> {
    fn from(pattern: IsotopePattern) -> Self {
        pattern.peaks
    }
}

impl IsotopePattern {
    /// Builds a pattern, dropping non-finite peaks and sorting by m/z.
    pub fn new(mut peaks: Vec<DataPoint>) -> Self {
        peaks.retain(|p| p.mz.is_finite() && p.intensity.is_finite());
        peaks.sort_by(|a, b| a.mz.total_cmp(&b.mz));
        Self { peaks }
    }

    pub fn peaks(&self) -> &[DataPoint] {
        &self.peaks
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    /// Intensity of the most intense peak, 0 for an empty pattern.
    pub fn base_peak_intensity(&self) -> f64 {
        self.peaks.iter().map(|p| p.intensity).fold(0.0, f64::max)
    }

    pub fn total_intensity(&self) -> f64 {
        self.peaks.iter().map(|p| p.intensity).sum()
    }

    /// Scales all intensities so that the base peak has intensity 1.
    ///
    /// Patterns without a positive base peak are returned unchanged.
    pub fn normalized(&self) -> Self {
        let base = self.base_peak_intensity();
        if base <= 0.0 {
            return self.clone();
        }
        let peaks = self
            .peaks
            .iter()
            .map(|p| DataPoint::new(p.mz, p.intensity / base))
            .collect();
        Self { peaks }
    }

    /// Merges neighbouring peaks that fall inside `tolerance` of each other.
    ///
    /// A merged peak carries the summed intensity and the intensity-weighted m/z.
    pub fn merged(&self, tolerance: &MzTolerance) -> Self {
        let mut merged: Vec<DataPoint> = Vec::with_capacity(self.peaks.len());

        for peak in &self.peaks {
            match merged.last_mut() {
                Some(last) if tolerance.matches(last.mz, peak.mz) => {
                    let intensity = last.intensity + peak.intensity;
                    if intensity > 0.0 {
                        last.mz = (last.mz * last.intensity + peak.mz * peak.intensity) / intensity;
                    }
                    last.intensity = intensity;
                }
                _ => merged.push(*peak),
            }
        }

        Self { peaks: merged }
    }
}
