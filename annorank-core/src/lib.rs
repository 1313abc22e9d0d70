// annorank-core/src/lib.rs
//! # annorank Core Library
//!
//! `annorank-core` decides which of the candidate annotations of a detected feature is the
//! most trustworthy, and how trustworthy it is on the MSI and Schymanski identification
//! confidence scales. Candidates come from independent evidence sources (spectral
//! library search, lipid fragment matching, compound database search) and already carry
//! their own match scores and predicted properties.
//!
//! The library is pure: every score, level and ranking is a function of the feature,
//! its candidates and an immutable [`SortConfig`] snapshot. It performs no I/O apart from
//! the optional YAML configuration loader.
//!
//! ## Modules
//!
//! * `model`: features, candidate annotations and their provenance.
//! * `collector`: gathers up to `top_n` candidates per evidence source.
//! * `scoring`: the six normalised evidence axes (m/z, RT, RI, CCS, isotope pattern, MS2).
//! * `isotope`: the isotope-similarity seam and its default implementation.
//! * `classification`: MSI and Schymanski levels and the type-priority bucket.
//! * `summary`: a scored and classified (feature, candidate) pair.
//! * `engine`: the `RankingEngine` trait.
//! * `engines`: tie-break chain and weighted-combination engines.
//! * `selector`: best-candidate selection and full ranking.
//! * `config`: tolerances, ranking policy, YAML and attribute persistence.
//! * `weights`: axis weights of the weighted policy.
//! * `errors`: the `AnnorankError` type.
//!
//! ## Usage Example
//!
//! ```rust
//! use annorank_core::{rank_all, select_best, Feature, PredictedProperties, SortConfig, SpectralLibraryMatch};
//!
//! let feature = Feature::new(1)
//!     .with_mz(300.1)
//!     .with_rt(5.0)
//!     .with_annotation(SpectralLibraryMatch {
//!         compound_name: "kynurenine".to_string(),
//!         similarity: 0.82,
//!         predicted: PredictedProperties { precursor_mz: Some(300.1002), ..Default::default() },
//!         ..Default::default()
//!     });
//!
//! let config = SortConfig::default();
//! let best = select_best(&feature, &config).expect("one candidate");
//! assert_eq!(best.name(), "kynurenine");
//! assert_eq!(rank_all(&feature, &config, 10).len(), 1);
//! ```
//!
//! License: MIT OR APACHE 2.0

pub mod classification;
pub mod collector;
pub mod config;
pub mod engine;
pub mod engines;
pub mod errors;
pub mod isotope;
pub mod model;
pub mod scoring;
pub mod selector;
pub mod summary;
pub mod weights;

pub use annorank_isotope::{DataPoint, IsotopePattern, MzTolerance};
pub use classification::{
    derive_msi_level, derive_schymanski_level, type_priority, MsiLevel, SchymanskiLevel, ISOTOPE_MATCH_THRESHOLD,
};
pub use collector::collect;
pub use config::{RankingPolicy, RtTolerance, RtToleranceUnit, SharedSortConfig, SortConfig, SortConfigBuilder};
pub use engine::RankingEngine;
pub use engines::tie_break::{MissingPolicy, SortKey, TieBreakEngine, TieBreakKey};
pub use engines::weighted::WeightedEngine;
pub use errors::AnnorankError;
pub use isotope::{IsotopeSimilarity, PatternOverlapSimilarity};
pub use model::{
    AnnotationSource, CandidateAnnotation, CompoundDatabaseMatch, Feature, LipidFragment, LipidMatch,
    LipidSpecificity, MassSpectrum, PredictedProperties, SpectralLibraryMatch,
};
pub use scoring::{score, Axis, EvidenceScorer, EvidenceScores, FeatureListAxes};
pub use selector::{engine_for, rank_all, select_best, AnnotationRanker};
pub use summary::AnnotationSummary;
pub use weights::AxisWeights;
