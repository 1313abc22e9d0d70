// annorank-core/src/engines/weighted.rs
//! Weighted-combination ranking: one scalar per candidate, `Σ weight × score` over the
//! axes the feature list can supply.
//!
//! License: MIT OR APACHE 2.0

use std::cmp::Ordering;

use crate::config::RankingPolicy;
use crate::engine::RankingEngine;
use crate::summary::AnnotationSummary;
use crate::weights::AxisWeights;

#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedEngine {
    weights: AxisWeights,
}

impl WeightedEngine {
    pub fn new(weights: AxisWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &AxisWeights {
        &self.weights
    }
}

impl RankingEngine for WeightedEngine {
    fn name(&self) -> &'static str {
        RankingPolicy::Weighted.id()
    }

    fn compare_worst_first(&self, a: &AnnotationSummary<'_>, b: &AnnotationSummary<'_>) -> Ordering {
        a.combined_score(&self.weights).total_cmp(&b.combined_score(&self.weights))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SortConfig;
    use crate::model::{CandidateAnnotation, Feature, PredictedProperties, SpectralLibraryMatch};
    use crate::scoring::{Axis, EvidenceScorer};

    fn library(name: &str, similarity: f64, mz: f64) -> CandidateAnnotation {
        SpectralLibraryMatch {
            compound_name: name.to_string(),
            similarity,
            predicted: PredictedProperties { precursor_mz: Some(mz), ..Default::default() },
            ..Default::default()
        }
        .into()
    }

    #[test]
    fn test_weights_decide_the_order() {
        let config = SortConfig::default();
        let scorer = EvidenceScorer::new(&config);
        let feature = Feature::new(1).with_mz(400.0);
        // "spectral" wins on MS2, "mass" wins on m/z.
        let spectral = library("spectral", 0.9, 400.004);
        let mass = library("mass", 0.5, 400.0);
        let a = AnnotationSummary::new(&scorer, &feature, Some(&spectral));
        let b = AnnotationSummary::new(&scorer, &feature, Some(&mass));

        let default_engine = WeightedEngine::default();
        assert_eq!(default_engine.compare_best_first(&a, &b), Ordering::Less);

        let mass_heavy = WeightedEngine::new(AxisWeights::default().with(Axis::Mz, 20.0));
        assert_eq!(mass_heavy.compare_best_first(&b, &a), Ordering::Less);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let config = SortConfig::default();
        let scorer = EvidenceScorer::new(&config);
        let feature = Feature::new(1);
        let first = library("first", 0.4, 100.0);
        let second = library("second", 0.4, 100.0);
        let mut summaries = vec![
            AnnotationSummary::new(&scorer, &feature, Some(&first)),
            AnnotationSummary::new(&scorer, &feature, Some(&second)),
        ];

        let engine = WeightedEngine::default();
        engine.sort_best_first(&mut summaries);
        assert_eq!(summaries[0].candidate().map(|c| c.name()), Some("first"));
        assert_eq!(engine.best(&summaries).and_then(|s| s.candidate()).map(|c| c.name()), Some("first"));
        assert_eq!(engine.name(), "weighted");
    }
}
