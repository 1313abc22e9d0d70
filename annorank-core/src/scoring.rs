//! Evidence scoring: six normalised agreement scores per (feature, candidate) pair.
//!
//! Distance axes (m/z, RT, RI) score `1 - min(|measured - predicted|, tol) / tol`, the
//! CCS axis does the same on the relative deviation. Isotope similarity is delegated to
//! an [`IsotopeSimilarity`] collaborator and the MS2 axis reads the candidate's own
//! match score. A score is unavailable (`None`) whenever an input is missing; the public
//! [`EvidenceScores::score`] accessor reports unavailable scores as `0`.

use serde::{Deserialize, Serialize};

use crate::config::SortConfig;
use crate::isotope::{IsotopeSimilarity, PatternOverlapSimilarity, ISOTOPE_NOISE_FLOOR, ISOTOPE_SCORE_TOLERANCE};
use crate::model::{CandidateAnnotation, Feature};

/// An evidence axis. The declaration order is the order of the tie-break score chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Ms2,
    Isotope,
    Mz,
    Rt,
    Ri,
    Ccs,
}

impl Axis {
    pub const ALL: [Axis; 6] = [Axis::Ms2, Axis::Isotope, Axis::Mz, Axis::Rt, Axis::Ri, Axis::Ccs];

    /// Short label for table cells.
    pub fn label(&self) -> &'static str {
        match self {
            Axis::Ms2 => "MS2",
            Axis::Isotope => "IP",
            Axis::Mz => "m/z",
            Axis::Rt => "RT",
            Axis::Ri => "RI",
            Axis::Ccs => "CCS",
        }
    }

    pub fn full_name(&self) -> &'static str {
        match self {
            Axis::Isotope => "Isotope pattern (IP)",
            _ => self.label(),
        }
    }

    /// Stable identifier used in persisted attributes.
    pub fn id(&self) -> &'static str {
        match self {
            Axis::Ms2 => "ms2",
            Axis::Isotope => "isotope_pattern",
            Axis::Mz => "mz",
            Axis::Rt => "rt",
            Axis::Ri => "ri",
            Axis::Ccs => "ccs",
        }
    }

    pub fn from_id(id: &str) -> Option<Axis> {
        Axis::ALL.into_iter().find(|axis| axis.id() == id)
    }
}

/// Scores `1 - min(|measured - predicted|, max_diff) / max_diff`.
///
/// `None` for NaN inputs or a tolerance that is not strictly positive.
pub fn distance_score(measured: f64, predicted: f64, max_diff: f64) -> Option<f64> {
    deviation_score(measured - predicted, max_diff)
}

/// Scores `1 - min(|deviation|, max_deviation) / max_deviation`.
pub fn deviation_score(deviation: f64, max_deviation: f64) -> Option<f64> {
    if deviation.is_nan() || !(max_deviation > 0.0) || !max_deviation.is_finite() {
        return None;
    }
    Some(1.0 - deviation.abs().min(max_deviation) / max_deviation)
}

/// All six axis scores of one (feature, candidate) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EvidenceScores {
    pub ms2: Option<f64>,
    pub isotope: Option<f64>,
    pub mz: Option<f64>,
    pub rt: Option<f64>,
    pub ri: Option<f64>,
    pub ccs: Option<f64>,
}

impl EvidenceScores {
    /// The score of `axis`, `None` when it could not be computed.
    pub fn get(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::Ms2 => self.ms2,
            Axis::Isotope => self.isotope,
            Axis::Mz => self.mz,
            Axis::Rt => self.rt,
            Axis::Ri => self.ri,
            Axis::Ccs => self.ccs,
        }
    }

    /// The score of `axis` in `[0, 1]`, `0` when unavailable.
    pub fn score(&self, axis: Axis) -> f64 {
        self.get(axis).unwrap_or(0.0)
    }

    /// Display label: the score with three decimals, or a note saying whether the
    /// feature list or the annotation lacks the data.
    pub fn label(&self, axis: Axis, axes: &FeatureListAxes) -> String {
        if !axes.is_active(axis) {
            return "(unavailable for feature list)".to_string();
        }
        match self.get(axis) {
            Some(score) => format!("{score:.3}"),
            None => "(unavailable for annotation)".to_string(),
        }
    }
}

/// Which optional axes the features of a list can supply at all.
///
/// A list without RT, RI or CCS values, or an imaging list (where RT is meaningless),
/// cannot score those axes for any candidate. Combined scores leave inactive axes out of
/// both the sum and the total weight. m/z, isotope and MS2 are always active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct FeatureListAxes {
    pub rt: bool,
    pub ri: bool,
    pub ccs: bool,
}

impl Default for FeatureListAxes {
    fn default() -> Self {
        Self::ALL
    }
}

impl FeatureListAxes {
    pub const ALL: FeatureListAxes = FeatureListAxes { rt: true, ri: true, ccs: true };

    /// Derives the active axes from the measured values of a feature list.
    pub fn from_features<'a>(features: impl IntoIterator<Item = &'a Feature>, imaging: bool) -> Self {
        let mut axes = FeatureListAxes { rt: false, ri: false, ccs: false };
        for feature in features {
            axes.rt |= feature.rt.is_some();
            axes.ri |= feature.ri.is_some();
            axes.ccs |= feature.ccs.is_some();
        }
        axes.rt &= !imaging;
        axes
    }

    pub fn is_active(&self, axis: Axis) -> bool {
        match axis {
            Axis::Rt => self.rt,
            Axis::Ri => self.ri,
            Axis::Ccs => self.ccs,
            Axis::Ms2 | Axis::Isotope | Axis::Mz => true,
        }
    }

    /// Active axes in tie-break chain order.
    pub fn active(&self) -> impl Iterator<Item = Axis> + '_ {
        Axis::ALL.into_iter().filter(move |&axis| self.is_active(axis))
    }
}

/// Computes axis scores against one configuration snapshot.
#[derive(Debug, Clone, Copy)]
pub struct EvidenceScorer<'c> {
    config: &'c SortConfig,
    isotope: &'c dyn IsotopeSimilarity,
}

static DEFAULT_ISOTOPE_SIMILARITY: PatternOverlapSimilarity = PatternOverlapSimilarity;

impl<'c> EvidenceScorer<'c> {
    /// A scorer using the built-in isotope similarity.
    pub fn new(config: &'c SortConfig) -> Self {
        Self::with_isotope_similarity(config, &DEFAULT_ISOTOPE_SIMILARITY)
    }

    pub fn with_isotope_similarity(config: &'c SortConfig, isotope: &'c dyn IsotopeSimilarity) -> Self {
        Self { config, isotope }
    }

    pub fn config(&self) -> &SortConfig {
        self.config
    }

    /// Score of one axis, `None` when the measured or predicted value is missing.
    pub fn score_opt(&self, feature: &Feature, candidate: &CandidateAnnotation, axis: Axis) -> Option<f64> {
        let score = match axis {
            Axis::Mz => self.mz_score(feature, candidate),
            Axis::Rt => self.rt_score(feature, candidate),
            Axis::Ri => self.ri_score(feature, candidate),
            Axis::Ccs => self.ccs_score(feature, candidate),
            Axis::Isotope => self.isotope_score(feature, candidate),
            Axis::Ms2 => self.ms2_score(candidate),
        };
        score.map(|s| s.clamp(0.0, 1.0))
    }

    /// Score of one axis in `[0, 1]`, `0` when unavailable.
    pub fn score(&self, feature: &Feature, candidate: &CandidateAnnotation, axis: Axis) -> f64 {
        self.score_opt(feature, candidate, axis).unwrap_or(0.0)
    }

    pub fn score_all(&self, feature: &Feature, candidate: &CandidateAnnotation) -> EvidenceScores {
        EvidenceScores {
            ms2: self.score_opt(feature, candidate, Axis::Ms2),
            isotope: self.score_opt(feature, candidate, Axis::Isotope),
            mz: self.score_opt(feature, candidate, Axis::Mz),
            rt: self.score_opt(feature, candidate, Axis::Rt),
            ri: self.score_opt(feature, candidate, Axis::Ri),
            ccs: self.score_opt(feature, candidate, Axis::Ccs),
        }
    }

    fn mz_score(&self, feature: &Feature, candidate: &CandidateAnnotation) -> Option<f64> {
        let measured = feature.mz?;
        let predicted = candidate.predicted().precursor_mz?;
        let max_diff = self.config.mz_tolerance().tolerance_at(predicted);
        distance_score(measured, predicted, max_diff)
    }

    fn rt_score(&self, feature: &Feature, candidate: &CandidateAnnotation) -> Option<f64> {
        let measured = feature.rt?;
        let predicted = candidate.predicted().rt?;
        let max_diff = self.config.rt_tolerance().tolerance_in_minutes(predicted);
        distance_score(f64::from(measured), f64::from(predicted), f64::from(max_diff))
    }

    fn ri_score(&self, feature: &Feature, candidate: &CandidateAnnotation) -> Option<f64> {
        let measured = feature.ri?;
        let predicted = candidate.predicted().ri?;
        distance_score(f64::from(measured), f64::from(predicted), self.config.ri_tolerance())
    }

    fn ccs_score(&self, feature: &Feature, candidate: &CandidateAnnotation) -> Option<f64> {
        let measured = f64::from(feature.ccs?);
        let predicted = f64::from(candidate.predicted().ccs?);
        if predicted == 0.0 {
            return None;
        }
        deviation_score((measured - predicted) / predicted, self.config.ccs_tolerance_relative())
    }

    fn isotope_score(&self, feature: &Feature, candidate: &CandidateAnnotation) -> Option<f64> {
        let measured = feature.isotope_pattern.as_ref()?;
        let predicted = candidate.predicted().isotope_pattern.as_ref()?;
        let similarity =
            self.isotope.similarity(predicted, measured, &ISOTOPE_SCORE_TOLERANCE, ISOTOPE_NOISE_FLOOR);
        (!similarity.is_nan()).then_some(similarity)
    }

    fn ms2_score(&self, candidate: &CandidateAnnotation) -> Option<f64> {
        candidate.ms2_score().filter(|s| !s.is_nan())
    }
}

/// Scores one axis with the built-in isotope similarity.
pub fn score(feature: &Feature, candidate: &CandidateAnnotation, config: &SortConfig, axis: Axis) -> f64 {
    EvidenceScorer::new(config).score(feature, candidate, axis)
}
