//! Data model for features and their candidate annotations.
//!
//! A [`Feature`] is a detected signal with measured, possibly absent, physicochemical
//! properties. Search modules upstream attach [`CandidateAnnotation`]s to it, grouped by
//! the [`AnnotationSource`] that produced them. Candidates are immutable values; they
//! are replaced, never edited.

use std::collections::BTreeMap;

use annorank_isotope::{DataPoint, IsotopePattern};
use log::warn;
use serde::{Deserialize, Serialize};

/// The evidence source that produced a candidate annotation.
///
/// The declaration order is the registration order used when candidates are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationSource {
    SpectralLibrary,
    Lipid,
    CompoundDatabase,
}

impl AnnotationSource {
    pub const REGISTRATION_ORDER: [AnnotationSource; 3] = [
        AnnotationSource::SpectralLibrary,
        AnnotationSource::Lipid,
        AnnotationSource::CompoundDatabase,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AnnotationSource::SpectralLibrary => "Spectral library match",
            AnnotationSource::Lipid => "Lipid match",
            AnnotationSource::CompoundDatabase => "Compound database match",
        }
    }
}

/// Values a candidate predicts for the feature it was matched against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct PredictedProperties {
    pub precursor_mz: Option<f64>,
    /// Retention time in minutes.
    pub rt: Option<f32>,
    pub ri: Option<f32>,
    /// Collision cross section in Å².
    pub ccs: Option<f32>,
    pub isotope_pattern: Option<IsotopePattern>,
    pub formula: Option<String>,
}

/// A match against a spectral library entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SpectralLibraryMatch {
    pub compound_name: String,
    #[serde(default)]
    pub entry_id: Option<String>,
    /// Spectral similarity in `[0, 1]`.
    pub similarity: f64,
    #[serde(default)]
    pub explained_signals: usize,
    #[serde(default)]
    pub predicted: PredictedProperties,
}

/// How specific a lipid annotation is about its acyl chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LipidSpecificity {
    /// Sum composition only, e.g. `PC 34:1`.
    Species,
    /// Individual chains resolved, e.g. `PC 16:0_18:1`.
    MolecularSpecies,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LipidFragment {
    pub annotation: String,
    pub mz: f64,
}

/// A lipid annotation produced by fragment matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LipidMatch {
    pub lipid_name: String,
    pub specificity: LipidSpecificity,
    #[serde(default)]
    pub ion_notation: String,
    /// `None` when no MS/MS scan was available, `0` when unconfirmed matches were kept.
    #[serde(default)]
    pub msms_score: Option<f64>,
    #[serde(default)]
    pub matched_fragments: Vec<LipidFragment>,
    #[serde(default)]
    pub predicted: PredictedProperties,
}

impl LipidMatch {
    /// True when at least one fragment matched or the MS/MS score is positive.
    pub fn has_ms2_evidence(&self) -> bool {
        !self.matched_fragments.is_empty() || self.msms_score.is_some_and(|s| s > 0.0)
    }
}

/// A hit from a local compound database or an in-silico structure search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CompoundDatabaseMatch {
    pub compound_name: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub adduct: Option<String>,
    /// Independent in-silico confidence (e.g. a fragmentation-tree score) in `[0, 1]`.
    #[serde(default)]
    pub in_silico_score: Option<f64>,
    #[serde(default)]
    pub predicted: PredictedProperties,
}

/// A proposed identity for a feature, tagged by provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CandidateAnnotation {
    SpectralLibrary(SpectralLibraryMatch),
    Lipid(LipidMatch),
    CompoundDatabase(CompoundDatabaseMatch),
}

impl CandidateAnnotation {
    pub fn source(&self) -> AnnotationSource {
        match self {
            CandidateAnnotation::SpectralLibrary(_) => AnnotationSource::SpectralLibrary,
            CandidateAnnotation::Lipid(_) => AnnotationSource::Lipid,
            CandidateAnnotation::CompoundDatabase(_) => AnnotationSource::CompoundDatabase,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CandidateAnnotation::SpectralLibrary(m) => &m.compound_name,
            CandidateAnnotation::Lipid(m) => &m.lipid_name,
            CandidateAnnotation::CompoundDatabase(m) => &m.compound_name,
        }
    }

    pub fn predicted(&self) -> &PredictedProperties {
        match self {
            CandidateAnnotation::SpectralLibrary(m) => &m.predicted,
            CandidateAnnotation::Lipid(m) => &m.predicted,
            CandidateAnnotation::CompoundDatabase(m) => &m.predicted,
        }
    }

    /// The variant's own MS/MS evidence, if it carries any.
    pub fn ms2_score(&self) -> Option<f64> {
        match self {
            CandidateAnnotation::SpectralLibrary(m) => Some(m.similarity),
            CandidateAnnotation::Lipid(m) => m.msms_score,
            CandidateAnnotation::CompoundDatabase(m) => m.in_silico_score,
        }
    }
}

impl From<SpectralLibraryMatch> for CandidateAnnotation {
    fn from(m: SpectralLibraryMatch) -> Self {
        CandidateAnnotation::SpectralLibrary(m)
    }
}

impl From<LipidMatch> for CandidateAnnotation {
    fn from(m: LipidMatch) -> Self {
        CandidateAnnotation::Lipid(m)
    }
}

impl From<CompoundDatabaseMatch> for CandidateAnnotation {
    fn from(m: CompoundDatabaseMatch) -> Self {
        CandidateAnnotation::CompoundDatabase(m)
    }
}

/// The best MS/MS spectrum recorded for a feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MassSpectrum {
    pub precursor_mz: Option<f64>,
    pub peaks: Vec<DataPoint>,
}

/// A detected feature (one row of a feature list).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Feature {
    pub id: u32,
    pub mz: Option<f64>,
    /// Average retention time in minutes.
    pub rt: Option<f32>,
    pub ri: Option<f32>,
    pub ccs: Option<f32>,
    pub isotope_pattern: Option<IsotopePattern>,
    pub ms2_spectrum: Option<MassSpectrum>,
    annotations: BTreeMap<AnnotationSource, Vec<CandidateAnnotation>>,
}

impl Feature {
    pub fn new(id: u32) -> Self {
        Self { id, ..Default::default() }
    }

    pub fn with_mz(mut self, mz: f64) -> Self {
        self.mz = Some(mz);
        self
    }

    pub fn with_rt(mut self, rt: f32) -> Self {
        self.rt = Some(rt);
        self
    }

    pub fn with_ri(mut self, ri: f32) -> Self {
        self.ri = Some(ri);
        self
    }

    pub fn with_ccs(mut self, ccs: f32) -> Self {
        self.ccs = Some(ccs);
        self
    }

    pub fn with_isotope_pattern(mut self, pattern: IsotopePattern) -> Self {
        self.isotope_pattern = Some(pattern);
        self
    }

    pub fn with_ms2_spectrum(mut self, spectrum: MassSpectrum) -> Self {
        self.ms2_spectrum = Some(spectrum);
        self
    }

    /// Appends a candidate to the list of its source, keeping the source's order.
    pub fn with_annotation(mut self, candidate: impl Into<CandidateAnnotation>) -> Self {
        self.attach(candidate.into());
        self
    }

    pub fn attach(&mut self, candidate: CandidateAnnotation) {
        self.annotations.entry(candidate.source()).or_default().push(candidate);
    }

    /// Replaces every candidate of `source`. Candidates of another source are dropped.
    pub fn replace_annotations(&mut self, source: AnnotationSource, candidates: Vec<CandidateAnnotation>) {
        let (kept, dropped): (Vec<_>, Vec<_>) =
            candidates.into_iter().partition(|c| c.source() == source);
        if !dropped.is_empty() {
            warn!(
                "Feature {}: dropped {} candidate(s) not produced by source '{}'.",
                self.id,
                dropped.len(),
                source.label()
            );
        }
        if kept.is_empty() {
            self.annotations.remove(&source);
        } else {
            self.annotations.insert(source, kept);
        }
    }

    /// Candidates of one source in the order the source ranked them.
    pub fn annotations(&self, source: AnnotationSource) -> &[CandidateAnnotation] {
        self.annotations.get(&source).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sources with at least one candidate, in registration order.
    pub fn sources(&self) -> impl Iterator<Item = AnnotationSource> + '_ {
        self.annotations
            .iter()
            .filter(|(_, candidates)| !candidates.is_empty())
            .map(|(source, _)| *source)
    }

    pub fn has_annotations(&self) -> bool {
        self.annotations.values().any(|c| !c.is_empty())
    }
}
