// annorank-isotope/src/tolerance.rs
use libm::fabs;

/// An m/z tolerance expressed as "absolute or relative, whichever is larger".
///
/// The effective window at a given m/z is `max(absolute, ppm * mz / 1e6)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MzTolerance {
    /// Absolute tolerance in m/z units (Da for singly charged ions).
    pub absolute: f64,
    /// Relative tolerance in parts per million.
    pub ppm: f64,
}

impl Default for MzTolerance {
    /// 5 mDa or 15 ppm.
    fn default() -> Self {
        Self::new(0.005, 15.0)
    }
}

impl MzTolerance {
    pub const fn new(absolute: f64, ppm: f64) -> Self {
        Self { absolute, ppm }
    }

    /// Returns the maximum allowed deviation at `mz`.
    pub fn tolerance_at(&self, mz: f64) -> f64 {
        let relative = fabs(mz) * self.ppm / 1_000_000.0;
        self.absolute.max(relative)
    }

    /// Checks whether `other` lies inside the tolerance window centred on `reference`.
    pub fn matches(&self, reference: f64, other: f64) -> bool {
        fabs(reference - other) <= self.tolerance_at(reference)
    }

    /// A tolerance is usable when both parts are finite, non-negative and at least one
    /// of them opens a non-empty window.
    pub fn is_valid(&self) -> bool {
        self.absolute.is_finite()
            && self.ppm.is_finite()
            && self.absolute >= 0.0
            && self.ppm >= 0.0
            && (self.absolute > 0.0 || self.ppm > 0.0)
    }
}
