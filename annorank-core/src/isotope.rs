//! The isotope-pattern similarity seam.
//!
//! Scoring consumes isotope similarity as a black box. [`PatternOverlapSimilarity`]
//! adapts the `annorank-isotope` crate to that seam and is used unless the caller
//! injects another implementation.

use std::fmt::Debug;

use annorank_isotope::{similarity_score, IsotopePattern, MzTolerance};

/// Tolerance used to pair isotope peaks when scoring: 5 mDa or 15 ppm.
pub const ISOTOPE_SCORE_TOLERANCE: MzTolerance = MzTolerance::new(0.005, 15.0);

/// Relative intensity below which isotope peaks are ignored when scoring.
pub const ISOTOPE_NOISE_FLOOR: f64 = 0.0;

/// Compares a predicted isotope pattern with a measured one.
pub trait IsotopeSimilarity: Debug + Send + Sync {
    /// Returns a similarity in `[0, 1]`.
    fn similarity(
        &self,
        predicted: &IsotopePattern,
        measured: &IsotopePattern,
        tolerance: &MzTolerance,
        noise_floor: f64,
    ) -> f64;
}

/// Product-of-intensity-deviations similarity from `annorank-isotope`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternOverlapSimilarity;

impl IsotopeSimilarity for PatternOverlapSimilarity {
    fn similarity(
        &self,
        predicted: &IsotopePattern,
        measured: &IsotopePattern,
        tolerance: &MzTolerance,
        noise_floor: f64,
    ) -> f64 {
        similarity_score(predicted, measured, tolerance, noise_floor)
    }
}
