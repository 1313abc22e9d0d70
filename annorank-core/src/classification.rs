//! Confidence classification on the MSI and Schymanski identification scales.
//!
//! Both classifiers are total: every candidate variant, and the absence of any
//! candidate, maps to a level. Lipid annotations without MS/MS evidence stay at the
//! worst level even when the isotope pattern matches, since isotope data cannot resolve
//! acyl chain positions.
//!
//! License: MIT OR Apache-2.0

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AnnorankError;
use crate::model::{CandidateAnnotation, LipidSpecificity};
use crate::scoring::{Axis, EvidenceScores};

/// Minimum isotope score for a compound-database match to reach Schymanski level 4.
pub const ISOTOPE_MATCH_THRESHOLD: f64 = 0.75;

/// RT or RI score above which a library match counts as chromatographically corroborated.
pub const CORROBORATION_THRESHOLD: f64 = 0.01;

/// Type-priority bucket of a candidate when no candidate exists.
pub const NO_CANDIDATE_PRIORITY: u8 = 10;

/// Metabolomics Standards Initiative levels. `Level1` is best, `Level4` is unclassified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MsiLevel {
    Level1,
    Level2,
    Level3,
    Level4,
}

impl MsiLevel {
    pub const ALL: [MsiLevel; 4] = [MsiLevel::Level1, MsiLevel::Level2, MsiLevel::Level3, MsiLevel::Level4];
    pub const WORST: MsiLevel = MsiLevel::Level4;

    pub fn label(&self) -> &'static str {
        match self {
            MsiLevel::Level1 => "1",
            MsiLevel::Level2 => "2",
            MsiLevel::Level3 => "3",
            MsiLevel::Level4 => "4",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MsiLevel::Level1 => "Identified compound, confirmed by a reference standard",
            MsiLevel::Level2 => "Putatively annotated compound",
            MsiLevel::Level3 => "Putatively characterized compound class",
            MsiLevel::Level4 => "Unknown compound",
        }
    }
}

impl fmt::Display for MsiLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MSI level {}", self.label())
    }
}

impl FromStr for MsiLevel {
    type Err = AnnorankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        MsiLevel::ALL
            .into_iter()
            .find(|level| level.label() == label)
            .ok_or_else(|| AnnorankError::UnknownLevel { scale: "MSI", label: label.to_string() })
    }
}

/// Schymanski et al. (2014) levels. `Level1` is best, `Level5` is unclassified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SchymanskiLevel {
    Level1,
    Level2a,
    Level2b,
    Level3,
    Level4,
    Level5,
}

impl SchymanskiLevel {
    pub const ALL: [SchymanskiLevel; 6] = [
        SchymanskiLevel::Level1,
        SchymanskiLevel::Level2a,
        SchymanskiLevel::Level2b,
        SchymanskiLevel::Level3,
        SchymanskiLevel::Level4,
        SchymanskiLevel::Level5,
    ];
    pub const WORST: SchymanskiLevel = SchymanskiLevel::Level5;

    pub fn label(&self) -> &'static str {
        match self {
            SchymanskiLevel::Level1 => "1",
            SchymanskiLevel::Level2a => "2a",
            SchymanskiLevel::Level2b => "2b",
            SchymanskiLevel::Level3 => "3",
            SchymanskiLevel::Level4 => "4",
            SchymanskiLevel::Level5 => "5",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SchymanskiLevel::Level1 => "Confirmed structure",
            SchymanskiLevel::Level2a => "Probable structure by library spectrum match",
            SchymanskiLevel::Level2b => "Probable structure by diagnostic evidence",
            SchymanskiLevel::Level3 => "Tentative candidate",
            SchymanskiLevel::Level4 => "Unequivocal molecular formula",
            SchymanskiLevel::Level5 => "Exact mass of interest",
        }
    }
}

impl fmt::Display for SchymanskiLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Schymanski level {}", self.label())
    }
}

impl FromStr for SchymanskiLevel {
    type Err = AnnorankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_lowercase();
        SchymanskiLevel::ALL
            .into_iter()
            .find(|level| level.label() == label)
            .ok_or_else(|| AnnorankError::UnknownLevel { scale: "Schymanski", label })
    }
}

fn is_positive(score: Option<f64>) -> bool {
    score.is_some_and(|s| s > 0.0)
}

/// Specificity of a lipid annotation backed by a positive MS/MS score. Matched
/// fragments alone do not lift a lipid above the worst level.
fn lipid_specificity_with_ms2(candidate: &CandidateAnnotation) -> Option<LipidSpecificity> {
    match candidate {
        CandidateAnnotation::Lipid(lipid) if is_positive(lipid.msms_score) => Some(lipid.specificity),
        _ => None,
    }
}

/// Grades a candidate on the MSI scale.
pub fn derive_msi_level(candidate: Option<&CandidateAnnotation>, scores: &EvidenceScores) -> MsiLevel {
    let Some(candidate) = candidate else {
        return MsiLevel::WORST;
    };
    match candidate {
        CandidateAnnotation::Lipid(_) => match lipid_specificity_with_ms2(candidate) {
            Some(LipidSpecificity::MolecularSpecies) => MsiLevel::Level2,
            Some(LipidSpecificity::Species) => MsiLevel::Level3,
            None => MsiLevel::Level4,
        },
        CandidateAnnotation::SpectralLibrary(_) => MsiLevel::Level2,
        CandidateAnnotation::CompoundDatabase(db) => {
            if is_positive(scores.rt) || is_positive(scores.ri) {
                MsiLevel::Level2
            } else if db.in_silico_score.is_some() {
                MsiLevel::Level3
            } else {
                MsiLevel::Level4
            }
        }
    }
}

/// Grades a candidate on the Schymanski scale.
pub fn derive_schymanski_level(
    candidate: Option<&CandidateAnnotation>,
    scores: &EvidenceScores,
) -> SchymanskiLevel {
    let Some(candidate) = candidate else {
        return SchymanskiLevel::WORST;
    };
    match candidate {
        CandidateAnnotation::Lipid(_) => match lipid_specificity_with_ms2(candidate) {
            Some(LipidSpecificity::MolecularSpecies) => SchymanskiLevel::Level2a,
            Some(LipidSpecificity::Species) => SchymanskiLevel::Level2b,
            None => SchymanskiLevel::Level5,
        },
        CandidateAnnotation::SpectralLibrary(_) => {
            if is_positive(scores.ri) || is_positive(scores.rt) {
                SchymanskiLevel::Level1
            } else {
                SchymanskiLevel::Level2a
            }
        }
        CandidateAnnotation::CompoundDatabase(db) => {
            if db.in_silico_score.is_some() {
                SchymanskiLevel::Level3
            } else if scores.score(Axis::Isotope) >= ISOTOPE_MATCH_THRESHOLD {
                SchymanskiLevel::Level4
            } else {
                SchymanskiLevel::Level5
            }
        }
    }
}

/// Coarse evidence-type bucket, lower is better.
///
/// | bucket | candidate |
/// |---|---|
/// | 1 | library match corroborated by RT or RI |
/// | 2 | lipid match with MS/MS evidence |
/// | 3 | library match without RT/RI corroboration |
/// | 4 | lipid match without MS/MS evidence, compound-database match |
/// | 10 | no candidate |
pub fn type_priority(candidate: Option<&CandidateAnnotation>, scores: &EvidenceScores) -> u8 {
    let corroborated = |score: Option<f64>| score.is_some_and(|s| s > CORROBORATION_THRESHOLD);
    match candidate {
        None => NO_CANDIDATE_PRIORITY,
        Some(CandidateAnnotation::SpectralLibrary(_)) => {
            if corroborated(scores.rt) || corroborated(scores.ri) {
                1
            } else {
                3
            }
        }
        Some(CandidateAnnotation::Lipid(lipid)) => {
            if lipid.has_ms2_evidence() {
                2
            } else {
                4
            }
        }
        Some(CandidateAnnotation::CompoundDatabase(_)) => 4,
    }
}
