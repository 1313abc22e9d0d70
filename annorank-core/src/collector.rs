//! Gathers the candidates of a feature that take part in a ranking pass.

use log::debug;

use crate::model::{AnnotationSource, CandidateAnnotation, Feature};

/// Takes up to `top_n` candidates from each source, in source registration order.
///
/// The order within a source is kept; the result is not sorted by confidence.
pub fn collect(feature: Option<&Feature>, top_n: usize) -> Vec<&CandidateAnnotation> {
    let Some(feature) = feature else {
        return Vec::new();
    };

    let collected: Vec<_> = AnnotationSource::REGISTRATION_ORDER
        .iter()
        .flat_map(|&source| feature.annotations(source).iter().take(top_n))
        .collect();
    debug!("Feature {}: collected {} candidate(s) with top_n = {}.", feature.id, collected.len(), top_n);
    collected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CompoundDatabaseMatch, LipidMatch, LipidSpecificity, SpectralLibraryMatch};

    fn feature() -> Feature {
        let lipid = |name: &str| LipidMatch {
            lipid_name: name.to_string(),
            specificity: LipidSpecificity::Species,
            ion_notation: "[M+Na]+".to_string(),
            msms_score: None,
            matched_fragments: Vec::new(),
            predicted: Default::default(),
        };
        let db = |name: &str| CompoundDatabaseMatch { compound_name: name.to_string(), ..Default::default() };
        let lib = |name: &str| SpectralLibraryMatch { compound_name: name.to_string(), ..Default::default() };

        Feature::new(9)
            .with_annotation(db("db-1"))
            .with_annotation(lipid("lipid-1"))
            .with_annotation(lib("lib-1"))
            .with_annotation(db("db-2"))
            .with_annotation(lib("lib-2"))
            .with_annotation(lib("lib-3"))
    }

    fn names(candidates: &[&CandidateAnnotation]) -> Vec<String> {
        candidates.iter().map(|c| c.name().to_string()).collect()
    }

    #[test]
    fn test_top_one_per_source_in_registration_order() {
        let feature = feature();
        assert_eq!(names(&collect(Some(&feature), 1)), ["lib-1", "lipid-1", "db-1"]);
    }

    #[test]
    fn test_top_n_caps_each_source() {
        let feature = feature();
        assert_eq!(
            names(&collect(Some(&feature), 2)),
            ["lib-1", "lib-2", "lipid-1", "db-1", "db-2"]
        );
        assert_eq!(collect(Some(&feature), usize::MAX).len(), 6);
    }

    #[test]
    fn test_degenerate_inputs() {
        let feature = feature();
        assert!(collect(None, 3).is_empty());
        assert!(collect(Some(&feature), 0).is_empty());
        assert!(collect(Some(&Feature::new(1)), 5).is_empty());
    }
}
