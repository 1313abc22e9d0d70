// annorank-core/src/selector.rs
//! Picks the best candidate of a feature, or ranks all of them.
//!
//! [`AnnotationRanker`] binds one configuration snapshot to the engine of its ranking
//! policy and to an isotope similarity implementation. Every call on it is a pure query
//! and can run concurrently with other calls. The free functions [`select_best`] and
//! [`rank_all`] are one-shot wrappers for callers that hold a plain [`SortConfig`].
//!
//! License: MIT OR APACHE 2.0

use std::fmt;
use std::sync::Arc;

use log::debug;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::classification::{MsiLevel, SchymanskiLevel};
use crate::collector::collect;
use crate::config::{RankingPolicy, SharedSortConfig, SortConfig};
use crate::engine::RankingEngine;
use crate::engines::tie_break::TieBreakEngine;
use crate::engines::weighted::WeightedEngine;
use crate::isotope::{IsotopeSimilarity, PatternOverlapSimilarity};
use crate::model::{CandidateAnnotation, Feature};
use crate::scoring::EvidenceScorer;
use crate::summary::AnnotationSummary;

/// Instantiates the engine of the configured ranking policy.
pub fn engine_for(config: &SortConfig) -> Box<dyn RankingEngine> {
    match config.ranking_policy() {
        RankingPolicy::Default => Box::new(TieBreakEngine::default_policy()),
        RankingPolicy::SchymanskiFirst => Box::new(TieBreakEngine::schymanski_first()),
        RankingPolicy::MsiFirst => Box::new(TieBreakEngine::msi_first()),
        RankingPolicy::Weighted => Box::new(WeightedEngine::new(*config.weights())),
    }
}

pub struct AnnotationRanker {
    config: Arc<SortConfig>,
    engine: Box<dyn RankingEngine>,
    isotope: Arc<dyn IsotopeSimilarity>,
    config_version: u64,
}

impl fmt::Debug for AnnotationRanker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationRanker")
            .field("config", &self.config)
            .field("engine", &self.engine.name())
            .field("isotope", &self.isotope)
            .field("config_version", &self.config_version)
            .finish()
    }
}

impl AnnotationRanker {
    pub fn new(config: Arc<SortConfig>) -> Self {
        Self::with_isotope_similarity(config, Arc::new(PatternOverlapSimilarity))
    }

    pub fn with_isotope_similarity(config: Arc<SortConfig>, isotope: Arc<dyn IsotopeSimilarity>) -> Self {
        let engine = engine_for(&config);
        debug!("Ranking with the '{}' policy.", engine.name());
        Self { config, engine, isotope, config_version: 0 }
    }

    /// Binds the current snapshot of a shared configuration. Later replacements of
    /// the shared configuration do not affect this ranker; check
    /// [`is_stale`](Self::is_stale) to find out whether it should be rebuilt.
    pub fn from_shared(shared: &SharedSortConfig) -> Self {
        let (config, version) = shared.versioned_snapshot();
        Self { config_version: version, ..Self::new(config) }
    }

    /// Version of the shared configuration this ranker was built from, `0` for a
    /// ranker built from a plain configuration.
    pub fn config_version(&self) -> u64 {
        self.config_version
    }

    pub fn is_stale(&self, shared: &SharedSortConfig) -> bool {
        !shared.is_current(self.config_version)
    }

    pub fn config(&self) -> &SortConfig {
        &self.config
    }

    pub fn engine(&self) -> &dyn RankingEngine {
        self.engine.as_ref()
    }

    fn scorer(&self) -> EvidenceScorer<'_> {
        EvidenceScorer::with_isotope_similarity(&self.config, self.isotope.as_ref())
    }

    /// Scores and classifies one candidate, or the absence of one.
    pub fn summarize<'f>(
        &self,
        feature: &'f Feature,
        candidate: Option<&'f CandidateAnnotation>,
    ) -> AnnotationSummary<'f> {
        AnnotationSummary::new(&self.scorer(), feature, candidate)
    }

    /// Summaries of up to `top_n` candidates per source, best first.
    pub fn summaries<'f>(&self, feature: &'f Feature, top_n: usize) -> Vec<AnnotationSummary<'f>> {
        let scorer = self.scorer();
        let mut summaries: Vec<_> = collect(Some(feature), top_n)
            .into_iter()
            .map(|candidate| AnnotationSummary::new(&scorer, feature, Some(candidate)))
            .collect();
        self.engine.sort_best_first(&mut summaries);
        summaries
    }

    /// The summary of the best top-ranked candidate per source.
    pub fn best_summary<'f>(&self, feature: &'f Feature) -> Option<AnnotationSummary<'f>> {
        let scorer = self.scorer();
        let summaries: Vec<_> = collect(Some(feature), 1)
            .into_iter()
            .map(|candidate| AnnotationSummary::new(&scorer, feature, Some(candidate)))
            .collect();
        self.engine.best(&summaries)
    }

    /// The most confident candidate of a feature, `None` when it has no candidates.
    pub fn select_best<'f>(&self, feature: &'f Feature) -> Option<&'f CandidateAnnotation> {
        let best = self.best_summary(feature).and_then(|summary| summary.candidate());
        match best {
            Some(candidate) => debug!("Feature {}: selected '{}'.", feature.id, candidate.name()),
            None => debug!("Feature {}: no candidate to select.", feature.id),
        }
        best
    }

    /// Up to `top_n` candidates per source, ranked best first across sources.
    pub fn rank_all<'f>(&self, feature: &'f Feature, top_n: usize) -> Vec<&'f CandidateAnnotation> {
        self.summaries(feature, top_n)
            .into_iter()
            .filter_map(|summary| summary.candidate())
            .collect()
    }

    /// Best candidate of every feature, in input order.
    #[cfg(feature = "parallel")]
    pub fn select_best_for_all<'f>(&self, features: &'f [Feature]) -> Vec<Option<&'f CandidateAnnotation>> {
        debug!("Selecting best annotations for {} feature(s) in parallel.", features.len());
        features.par_iter().map(|feature| self.select_best(feature)).collect()
    }

    /// Best candidate of every feature, in input order.
    #[cfg(not(feature = "parallel"))]
    pub fn select_best_for_all<'f>(&self, features: &'f [Feature]) -> Vec<Option<&'f CandidateAnnotation>> {
        debug!("Selecting best annotations for {} feature(s).", features.len());
        features.iter().map(|feature| self.select_best(feature)).collect()
    }

    /// MSI level of the best candidate, the worst level without candidates.
    pub fn msi_level(&self, feature: &Feature) -> MsiLevel {
        self.best_summary(feature)
            .map(|summary| summary.msi_level())
            .unwrap_or(MsiLevel::WORST)
    }

    /// Schymanski level of the best candidate, the worst level without candidates.
    pub fn schymanski_level(&self, feature: &Feature) -> SchymanskiLevel {
        self.best_summary(feature)
            .map(|summary| summary.schymanski_level())
            .unwrap_or(SchymanskiLevel::WORST)
    }
}

/// One-shot [`AnnotationRanker::select_best`].
pub fn select_best<'f>(feature: &'f Feature, config: &SortConfig) -> Option<&'f CandidateAnnotation> {
    AnnotationRanker::new(Arc::new(config.clone())).select_best(feature)
}

/// One-shot [`AnnotationRanker::rank_all`].
pub fn rank_all<'f>(feature: &'f Feature, config: &SortConfig, top_n: usize) -> Vec<&'f CandidateAnnotation> {
    AnnotationRanker::new(Arc::new(config.clone())).rank_all(feature, top_n)
}
