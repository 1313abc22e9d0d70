//! A scored and classified (feature, candidate) pair.

use crate::classification::{derive_msi_level, derive_schymanski_level, type_priority, MsiLevel, SchymanskiLevel};
use crate::model::{CandidateAnnotation, Feature};
use crate::scoring::{Axis, EvidenceScorer, EvidenceScores, FeatureListAxes};
use crate::weights::AxisWeights;

/// Everything a ranking engine needs to compare one candidate with another.
///
/// Built once per candidate and ranking pass, so comparisons never recompute scores.
#[derive(Debug, Clone, Copy)]
pub struct AnnotationSummary<'a> {
    feature: &'a Feature,
    candidate: Option<&'a CandidateAnnotation>,
    scores: EvidenceScores,
    axes: FeatureListAxes,
    msi: MsiLevel,
    schymanski: SchymanskiLevel,
    type_priority: u8,
}

impl<'a> AnnotationSummary<'a> {
    pub fn new(scorer: &EvidenceScorer<'_>, feature: &'a Feature, candidate: Option<&'a CandidateAnnotation>) -> Self {
        let scores = match candidate {
            Some(candidate) => scorer.score_all(feature, candidate),
            None => EvidenceScores::default(),
        };
        Self {
            feature,
            candidate,
            msi: derive_msi_level(candidate, &scores),
            schymanski: derive_schymanski_level(candidate, &scores),
            type_priority: type_priority(candidate, &scores),
            scores,
            axes: *scorer.config().feature_list_axes(),
        }
    }

    pub fn feature(&self) -> &'a Feature {
        self.feature
    }

    pub fn candidate(&self) -> Option<&'a CandidateAnnotation> {
        self.candidate
    }

    pub fn scores(&self) -> &EvidenceScores {
        &self.scores
    }

    /// Score of one axis in `[0, 1]`, `0` when unavailable.
    pub fn score(&self, axis: Axis) -> f64 {
        self.scores.score(axis)
    }

    pub fn score_label(&self, axis: Axis) -> String {
        self.scores.label(axis, &self.axes)
    }

    /// Optional axes of the feature list this summary was scored in.
    pub fn feature_list_axes(&self) -> &FeatureListAxes {
        &self.axes
    }

    pub fn msi_level(&self) -> MsiLevel {
        self.msi
    }

    pub fn schymanski_level(&self) -> SchymanskiLevel {
        self.schymanski
    }

    pub fn type_priority(&self) -> u8 {
        self.type_priority
    }

    pub fn combined_score(&self, weights: &AxisWeights) -> f64 {
        weights.combined_score(&self.scores, &self.axes)
    }

    pub fn normalized_combined_score(&self, weights: &AxisWeights) -> f64 {
        weights.normalized_combined_score(&self.scores, &self.axes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SortConfig;
    use crate::model::{PredictedProperties, SpectralLibraryMatch};

    #[test]
    fn test_summary_of_library_match() {
        let config = SortConfig::default();
        let scorer = EvidenceScorer::new(&config);
        let candidate: CandidateAnnotation = SpectralLibraryMatch {
            compound_name: "adenosine".to_string(),
            similarity: 0.7,
            predicted: PredictedProperties { rt: Some(2.0), ..Default::default() },
            ..Default::default()
        }
        .into();
        let feature = Feature::new(4).with_rt(2.15);

        let summary = AnnotationSummary::new(&scorer, &feature, Some(&candidate));
        assert!((summary.score(Axis::Rt) - 0.5).abs() < 1e-5);
        assert_eq!(summary.score(Axis::Ms2), 0.7);
        assert_eq!(summary.type_priority(), 1);
        assert_eq!(summary.schymanski_level(), SchymanskiLevel::Level1);
        assert_eq!(summary.msi_level(), MsiLevel::Level2);
        assert_eq!(summary.score_label(Axis::Ccs), "(unavailable for annotation)");
        assert!((summary.combined_score(&AxisWeights::default()) - (6.0 * 0.7 + 0.5)).abs() < 1e-5);
    }

    #[test]
    fn test_direct_infusion_list_reaches_full_score() {
        let pattern = annorank_isotope::IsotopePattern::new(vec![
            annorank_isotope::DataPoint::new(322.1, 1.0),
            annorank_isotope::DataPoint::new(323.1, 0.18),
        ]);
        let config = SortConfig::builder()
            .feature_list_axes(FeatureListAxes { rt: false, ri: false, ccs: false })
            .build()
            .unwrap();
        let scorer = EvidenceScorer::new(&config);
        let candidate: CandidateAnnotation = SpectralLibraryMatch {
            compound_name: "perfect".to_string(),
            similarity: 1.0,
            predicted: PredictedProperties {
                precursor_mz: Some(322.1),
                rt: Some(7.5),
                isotope_pattern: Some(pattern.clone()),
                ..Default::default()
            },
            ..Default::default()
        }
        .into();
        let feature = Feature::new(6).with_mz(322.1).with_isotope_pattern(pattern);

        let summary = AnnotationSummary::new(&scorer, &feature, Some(&candidate));
        let weights = AxisWeights::default();
        assert!((summary.normalized_combined_score(&weights) - 1.0).abs() < 1e-12);
        assert_eq!(summary.score_label(Axis::Rt), "(unavailable for feature list)");
        assert_eq!(summary.score_label(Axis::Mz), "1.000");
    }

    #[test]
    fn test_summary_without_candidate() {
        let config = SortConfig::default();
        let scorer = EvidenceScorer::new(&config);
        let feature = Feature::new(5).with_mz(120.0);
        let summary = AnnotationSummary::new(&scorer, &feature, None);
        assert_eq!(summary.type_priority(), 10);
        assert_eq!(summary.msi_level(), MsiLevel::WORST);
        assert_eq!(summary.schymanski_level(), SchymanskiLevel::WORST);
        assert_eq!(summary.normalized_combined_score(&AxisWeights::default()), 0.0);
    }
}
