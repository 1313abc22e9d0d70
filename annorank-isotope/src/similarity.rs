// annorank-isotope/src/similarity.rs
//! Intensity-overlap similarity between two isotope patterns.

extern crate alloc;
use alloc::vec::Vec;
use libm::fabs;

use crate::pattern::{DataPoint, IsotopePattern};
use crate::tolerance::MzTolerance;
use crate::SimilarityScore;

/// Scores how well a measured isotope pattern agrees with a predicted one.
///
/// Both patterns are normalized to a base peak of 1 and merged within `tolerance`.
/// Every predicted peak is paired with the first unused measured peak inside its
/// tolerance window; measured peaks left over are paired with nothing. The score is
/// the product of `1 - |i1 - i2| / total_intensity` over all pairs, where
/// `total_intensity` sums both normalized patterns. Pairs whose intensities are both
/// below `noise_intensity` are ignored.
///
/// Returns a value in `[0, 1]`, or 0 when either pattern is empty.
pub fn similarity_score(
    predicted: &IsotopePattern,
    measured: &IsotopePattern,
    tolerance: &MzTolerance,
    noise_intensity: f64,
) -> SimilarityScore {
    if predicted.is_empty() || measured.is_empty() {
        return 0.0;
    }

    let predicted = predicted.normalized().merged(tolerance);
    let measured = measured.normalized().merged(tolerance);

    let total_intensity = predicted.total_intensity() + measured.total_intensity();
    if !(total_intensity > 0.0) {
        return 0.0;
    }

    let mut unused: Vec<Option<DataPoint>> = measured.peaks().iter().copied().map(Some).collect();
    let mut result = 1.0;

    for peak in predicted.peaks() {
        let partner = unused
            .iter_mut()
            .find(|slot| matches!(slot, Some(p) if tolerance.matches(peak.mz, p.mz)))
            .and_then(Option::take);

        let intensity1 = peak.intensity;
        let intensity2 = partner.map_or(0.0, |p| p.intensity);

        if intensity1 < noise_intensity && intensity2 < noise_intensity {
            continue;
        }

        result *= 1.0 - fabs(intensity1 - intensity2) / total_intensity;
    }

    for peak in unused.into_iter().flatten() {
        if peak.intensity < noise_intensity {
            continue;
        }
        result *= 1.0 - peak.intensity / total_intensity;
    }

    result.clamp(0.0, 1.0)
}
