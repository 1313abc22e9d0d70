// annorank-core/tests/ranking_tests.rs
use std::sync::Arc;

use anyhow::Result;
use test_log::test; // For integrating with `env_logger` in tests

use annorank_core::{
    derive_msi_level, derive_schymanski_level, rank_all, score, select_best, AnnotationRanker, Axis,
    CandidateAnnotation, CompoundDatabaseMatch, DataPoint, EvidenceScorer, Feature, IsotopePattern, LipidMatch,
    LipidSpecificity, MsiLevel, MzTolerance, PredictedProperties, RankingEngine, RankingPolicy, SchymanskiLevel,
    SharedSortConfig, SortConfig, SpectralLibraryMatch,
};

fn library(name: &str, similarity: f64, predicted: PredictedProperties) -> SpectralLibraryMatch {
    SpectralLibraryMatch {
        compound_name: name.to_string(),
        entry_id: Some(format!("LIB-{name}")),
        similarity,
        explained_signals: 12,
        predicted,
    }
}

fn lipid(name: &str, specificity: LipidSpecificity, msms_score: Option<f64>) -> LipidMatch {
    LipidMatch {
        lipid_name: name.to_string(),
        specificity,
        ion_notation: "[M+H]+".to_string(),
        msms_score,
        matched_fragments: Vec::new(),
        predicted: PredictedProperties { precursor_mz: Some(760.5851), ..Default::default() },
    }
}

fn compound(name: &str) -> CompoundDatabaseMatch {
    CompoundDatabaseMatch {
        compound_name: name.to_string(),
        database: "local".to_string(),
        adduct: Some("[M+H]+".to_string()),
        in_silico_score: None,
        predicted: PredictedProperties::default(),
    }
}

fn ppm_only_config() -> Result<SortConfig> {
    Ok(SortConfig::builder().mz_tolerance(MzTolerance::new(0.0, 15.0)).build()?)
}

#[test]
fn test_mz_and_rt_agreement() -> Result<()> {
    let config = ppm_only_config()?;
    let feature = Feature::new(1).with_mz(300.1000).with_rt(5.00);

    let close: CandidateAnnotation = library(
        "close",
        0.8,
        PredictedProperties { precursor_mz: Some(300.1005), rt: Some(5.00), ..Default::default() },
    )
    .into();
    let mz = score(&feature, &close, &config, Axis::Mz);
    assert!((mz - 0.889).abs() < 1e-3, "unexpected m/z score {mz}");
    assert_eq!(score(&feature, &close, &config, Axis::Rt), 1.0);

    let far: CandidateAnnotation =
        library("far", 0.8, PredictedProperties { precursor_mz: Some(300.3000), ..Default::default() }).into();
    assert_eq!(score(&feature, &far, &config, Axis::Mz), 0.0);
    Ok(())
}

#[test]
fn test_missing_ccs_scores_zero() {
    let config = SortConfig::default();
    let feature = Feature::new(1).with_mz(300.1);
    for predicted_ccs in [0.0_f32, 150.0, 1e6] {
        let candidate: CandidateAnnotation =
            library("x", 0.5, PredictedProperties { ccs: Some(predicted_ccs), ..Default::default() }).into();
        assert_eq!(score(&feature, &candidate, &config, Axis::Ccs), 0.0);
    }
}

#[test]
fn test_lipid_levels() {
    let config = SortConfig::default();
    let feature = Feature::new(1).with_mz(760.5851);
    let candidate: CandidateAnnotation = lipid("PC 16:0_18:1", LipidSpecificity::MolecularSpecies, Some(0.6)).into();
    let scores = EvidenceScorer::new(&config).score_all(&feature, &candidate);

    assert_eq!(derive_msi_level(Some(&candidate), &scores), MsiLevel::Level2);
    assert_eq!(derive_schymanski_level(Some(&candidate), &scores), SchymanskiLevel::Level2a);
}

#[test]
fn test_compound_database_isotope_level() {
    let measured = IsotopePattern::new(vec![
        DataPoint::new(195.0877, 1.0),
        DataPoint::new(196.0911, 0.10),
        DataPoint::new(197.0919, 0.01),
    ]);
    let predicted = IsotopePattern::new(vec![
        DataPoint::new(195.0877, 1.0),
        DataPoint::new(196.0910, 0.11),
        DataPoint::new(197.0920, 0.012),
    ]);
    let feature = Feature::new(7).with_mz(195.0877).with_isotope_pattern(measured).with_annotation(
        CompoundDatabaseMatch {
            predicted: PredictedProperties { isotope_pattern: Some(predicted), ..Default::default() },
            ..compound("caffeine")
        },
    );

    let ranker = AnnotationRanker::new(Arc::new(SortConfig::default()));
    let summary = ranker.best_summary(&feature).expect("one candidate");
    assert!(summary.score(Axis::Isotope) >= 0.75);
    assert_eq!(summary.schymanski_level(), SchymanskiLevel::Level4);
    assert_eq!(ranker.schymanski_level(&feature), SchymanskiLevel::Level4);
    assert_eq!(ranker.msi_level(&feature), MsiLevel::Level4);
}

/// One candidate per bucket 1, 3 and 4. The bucket-4 hit has the best raw scores.
fn bucketed_feature() -> Feature {
    Feature::new(42)
        .with_mz(250.1000)
        .with_rt(4.20)
        .with_annotation(CompoundDatabaseMatch {
            in_silico_score: Some(1.0),
            predicted: PredictedProperties { precursor_mz: Some(250.1000), ..Default::default() },
            ..compound("bucket-4")
        })
        .with_annotation(library(
            "bucket-1",
            0.31,
            PredictedProperties { precursor_mz: Some(250.1040), rt: Some(4.10), ..Default::default() },
        ))
        .with_annotation(library(
            "bucket-3",
            0.55,
            PredictedProperties { precursor_mz: Some(250.1020), ..Default::default() },
        ))
}

#[test]
fn test_default_policy_ranks_by_bucket() {
    let feature = bucketed_feature();
    let config = SortConfig::default();
    let names: Vec<_> = rank_all(&feature, &config, 5).into_iter().map(CandidateAnnotation::name).collect();
    assert_eq!(names, ["bucket-1", "bucket-3", "bucket-4"]);
}

#[test]
fn test_select_best_uses_top_candidate_per_source() {
    let feature = bucketed_feature();
    let config = SortConfig::default();
    // Only "bucket-1" represents the library source with top_n = 1.
    assert_eq!(select_best(&feature, &config).map(CandidateAnnotation::name), Some("bucket-1"));
    assert_eq!(rank_all(&feature, &config, 1).len(), 2);
    assert!(rank_all(&feature, &config, 0).is_empty());
}

#[test]
fn test_weighted_policy_ignores_buckets() {
    let feature = bucketed_feature();
    let config = SortConfig::default().with_policy(RankingPolicy::Weighted);
    let ranked = rank_all(&feature, &config, 5);
    assert_eq!(ranked[0].name(), "bucket-4");
}

#[test]
fn test_ranking_is_deterministic() {
    let feature = bucketed_feature();
    for policy in RankingPolicy::ALL {
        let config = Arc::new(SortConfig::default().with_policy(policy));
        let ranker = AnnotationRanker::new(Arc::clone(&config));
        let first: Vec<_> = ranker.rank_all(&feature, 5).into_iter().map(CandidateAnnotation::name).collect();
        for _ in 0..10 {
            let again: Vec<_> =
                AnnotationRanker::new(Arc::clone(&config)).rank_all(&feature, 5).into_iter().map(CandidateAnnotation::name).collect();
            assert_eq!(first, again, "policy {policy} is not deterministic");
        }
    }
}

#[test]
fn test_reversal_law_for_every_policy() {
    let feature = bucketed_feature()
        .with_annotation(lipid("PE 38:4", LipidSpecificity::Species, Some(0.7)))
        .with_annotation(lipid("PE 18:0_20:4", LipidSpecificity::MolecularSpecies, None));

    for policy in RankingPolicy::ALL {
        let ranker = AnnotationRanker::new(Arc::new(SortConfig::default().with_policy(policy)));
        let mut summaries = ranker.summaries(&feature, usize::MAX);
        summaries.push(ranker.summarize(&feature, None));
        let engine = ranker.engine();
        for a in &summaries {
            for b in &summaries {
                assert_eq!(engine.compare_best_first(a, b), engine.compare_worst_first(a, b).reverse());
            }
        }
    }
}

#[test]
fn test_batch_selection_keeps_feature_order() {
    let features = vec![
        bucketed_feature(),
        Feature::new(2).with_mz(100.0),
        Feature::new(3).with_annotation(lipid("PC 34:1", LipidSpecificity::Species, Some(0.2))),
    ];
    let ranker = AnnotationRanker::new(Arc::new(SortConfig::default()));
    let best: Vec<_> = ranker
        .select_best_for_all(&features)
        .into_iter()
        .map(|c| c.map(CandidateAnnotation::name))
        .collect();
    assert_eq!(best, [Some("bucket-1"), None, Some("PC 34:1")]);
}

#[test]
fn test_ranker_keeps_its_snapshot() -> Result<()> {
    let shared = SharedSortConfig::new(SortConfig::default());
    let ranker = AnnotationRanker::from_shared(&shared);
    assert_eq!(ranker.config_version(), 0);
    assert!(!ranker.is_stale(&shared));

    let version = shared.replace(SortConfig::default().with_policy(RankingPolicy::Weighted));
    assert_eq!(version, 1);
    assert_eq!(ranker.config().ranking_policy(), RankingPolicy::Default);
    assert_eq!(ranker.engine().name(), "default");
    assert!(ranker.is_stale(&shared));

    let rebuilt = AnnotationRanker::from_shared(&shared);
    assert_eq!(rebuilt.engine().name(), "weighted");
    assert_eq!(rebuilt.config_version(), 1);
    assert!(!rebuilt.is_stale(&shared));
    Ok(())
}
