//! Axis weights for the weighted-combination ranking policy.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::AnnorankError;
use crate::scoring::{Axis, EvidenceScores, FeatureListAxes};

/// Attribute key prefix for persisted weights, e.g. `weight.ms2`.
pub const WEIGHT_ATTRIBUTE_PREFIX: &str = "weight.";

/// One non-negative weight per evidence axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct AxisWeights {
    pub ms2: f64,
    pub isotope: f64,
    pub mz: f64,
    pub ri: f64,
    pub rt: f64,
    pub ccs: f64,
}

impl Default for AxisWeights {
    fn default() -> Self {
        Self {
            ms2: 6.0,
            isotope: 4.0,
            mz: 3.0,
            ri: 2.0,
            rt: 1.0,
            ccs: 1.0,
        }
    }
}

impl AxisWeights {
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Ms2 => self.ms2,
            Axis::Isotope => self.isotope,
            Axis::Mz => self.mz,
            Axis::Ri => self.ri,
            Axis::Rt => self.rt,
            Axis::Ccs => self.ccs,
        }
    }

    fn slot_mut(&mut self, axis: Axis) -> &mut f64 {
        match axis {
            Axis::Ms2 => &mut self.ms2,
            Axis::Isotope => &mut self.isotope,
            Axis::Mz => &mut self.mz,
            Axis::Ri => &mut self.ri,
            Axis::Rt => &mut self.rt,
            Axis::Ccs => &mut self.ccs,
        }
    }

    /// Returns a copy with one weight replaced. The result is not validated.
    pub fn with(mut self, axis: Axis, weight: f64) -> Self {
        *self.slot_mut(axis) = weight;
        self
    }

    pub fn total(&self) -> f64 {
        Axis::ALL.iter().map(|&axis| self.get(axis)).sum()
    }

    /// Every weight must be finite and non-negative.
    pub fn validate(&self) -> Result<(), AnnorankError> {
        for axis in Axis::ALL {
            let value = self.get(axis);
            if !value.is_finite() || value < 0.0 {
                return Err(AnnorankError::InvalidWeight { axis: axis.id(), value });
            }
        }
        Ok(())
    }

    /// Total weight of the axes a feature list can supply.
    pub fn active_total(&self, axes: &FeatureListAxes) -> f64 {
        axes.active().map(|axis| self.get(axis)).sum()
    }

    /// Σ weight × score over the active axes. Unavailable scores count as 0.
    pub fn combined_score(&self, scores: &EvidenceScores, axes: &FeatureListAxes) -> f64 {
        axes.active().map(|axis| self.get(axis) * scores.score(axis)).sum()
    }

    /// The combined score divided by the active total weight, in `[0, 1]`.
    pub fn normalized_combined_score(&self, scores: &EvidenceScores, axes: &FeatureListAxes) -> f64 {
        let total = self.active_total(axes);
        if total > 0.0 {
            self.combined_score(scores, axes) / total
        } else {
            0.0
        }
    }

    pub fn to_attributes(&self) -> BTreeMap<String, String> {
        Axis::ALL
            .iter()
            .map(|&axis| (format!("{WEIGHT_ATTRIBUTE_PREFIX}{}", axis.id()), self.get(axis).to_string()))
            .collect()
    }

    /// Reads weights from attributes. Missing, unparseable or negative values fall back
    /// to the default weight of that axis.
    pub fn from_attributes(attributes: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();
        let mut weights = defaults;

        for axis in Axis::ALL {
            let key = format!("{WEIGHT_ATTRIBUTE_PREFIX}{}", axis.id());
            let Some(raw) = attributes.get(&key) else {
                debug!("Attribute '{}' missing, using default weight {}.", key, defaults.get(axis));
                continue;
            };
            match raw.trim().parse::<f64>() {
                Ok(value) if value.is_finite() && value >= 0.0 => *weights.slot_mut(axis) = value,
                _ => warn!(
                    "Attribute '{}' has invalid weight '{}', using default {}.",
                    key,
                    raw,
                    defaults.get(axis)
                ),
            }
        }

        weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let w = AxisWeights::default();
        assert_eq!(w.get(Axis::Ms2), 6.0);
        assert_eq!(w.get(Axis::Isotope), 4.0);
        assert_eq!(w.get(Axis::Mz), 3.0);
        assert_eq!(w.get(Axis::Ri), 2.0);
        assert_eq!(w.get(Axis::Rt), 1.0);
        assert_eq!(w.get(Axis::Ccs), 1.0);
        assert_eq!(w.total(), 17.0);
        assert!(w.validate().is_ok());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let w = AxisWeights::default().with(Axis::Rt, -1.0);
        assert!(matches!(
            w.validate(),
            Err(AnnorankError::InvalidWeight { axis: "rt", .. })
        ));
    }

    #[test]
    fn test_combined_score() {
        let scores = EvidenceScores {
            ms2: Some(0.5),
            mz: Some(1.0),
            ..Default::default()
        };
        let w = AxisWeights::default();
        let all = FeatureListAxes::ALL;
        assert!((w.combined_score(&scores, &all) - 6.0).abs() < 1e-12);
        assert!((w.normalized_combined_score(&scores, &all) - 6.0 / 17.0).abs() < 1e-12);

        let zero = AxisWeights { ms2: 0.0, isotope: 0.0, mz: 0.0, ri: 0.0, rt: 0.0, ccs: 0.0 };
        assert_eq!(zero.normalized_combined_score(&scores, &all), 0.0);
    }

    #[test]
    fn test_inactive_axes_leave_the_total_weight() {
        // Direct infusion: no RT, RI or CCS anywhere in the list.
        let axes = FeatureListAxes { rt: false, ri: false, ccs: false };
        let perfect = EvidenceScores {
            ms2: Some(1.0),
            isotope: Some(1.0),
            mz: Some(1.0),
            ..Default::default()
        };
        let w = AxisWeights::default();
        assert_eq!(w.active_total(&axes), 13.0);
        assert!((w.normalized_combined_score(&perfect, &axes) - 1.0).abs() < 1e-12);
        assert!((w.normalized_combined_score(&perfect, &FeatureListAxes::ALL) - 13.0 / 17.0).abs() < 1e-12);

        // An RT score is ignored while RT is inactive.
        let with_rt = EvidenceScores { rt: Some(0.5), ..perfect };
        assert_eq!(w.combined_score(&with_rt, &axes), w.combined_score(&perfect, &axes));
    }

    #[test]
    fn test_attribute_fallback() {
        let mut attributes = AxisWeights::default().with(Axis::Ccs, 0.5).to_attributes();
        attributes.insert("weight.ms2".to_string(), "not-a-number".to_string());
        attributes.insert("weight.rt".to_string(), "-3".to_string());
        attributes.remove("weight.mz");

        let w = AxisWeights::from_attributes(&attributes);
        assert_eq!(w.ccs, 0.5);
        assert_eq!(w.ms2, 6.0);
        assert_eq!(w.rt, 1.0);
        assert_eq!(w.mz, 3.0);
    }
}
