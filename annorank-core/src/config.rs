//! Configuration management for `annorank-core`.
//!
//! A [`SortConfig`] bundles the tolerances that normalise evidence scores and the
//! ranking policy used to order candidates. It is validated when it is built, so a
//! ranking pass can never hit a zero or negative tolerance. Configurations are loaded
//! from YAML, or recovered from attribute key/value pairs where bad values fall back
//! to defaults instead of failing.
//!
//! A feature list shares its configuration through [`SharedSortConfig`], which only
//! ever swaps whole snapshots.
//!
//! License: MIT OR Apache-2.0

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use annorank_isotope::MzTolerance;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::AnnorankError;
use crate::scoring::FeatureListAxes;
use crate::weights::AxisWeights;

pub const DEFAULT_MZ_TOLERANCE: MzTolerance = MzTolerance::new(0.005, 15.0);
pub const DEFAULT_RT_TOLERANCE_MINUTES: f32 = 0.3;
pub const DEFAULT_CCS_TOLERANCE_PERCENT: f64 = 10.0;
pub const DEFAULT_RI_TOLERANCE: f64 = 2.0;

/// Unit of a retention time tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RtToleranceUnit {
    #[default]
    Minutes,
    /// Percent of the retention time the tolerance is evaluated at.
    Percent,
}

impl RtToleranceUnit {
    pub fn id(&self) -> &'static str {
        match self {
            RtToleranceUnit::Minutes => "minutes",
            RtToleranceUnit::Percent => "percent",
        }
    }
}

impl FromStr for RtToleranceUnit {
    type Err = AnnorankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minutes" | "min" => Ok(RtToleranceUnit::Minutes),
            "percent" | "%" => Ok(RtToleranceUnit::Percent),
            _ => Err(AnnorankError::UnknownRtUnit(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RtTolerance {
    pub value: f32,
    #[serde(default)]
    pub unit: RtToleranceUnit,
}

impl Default for RtTolerance {
    fn default() -> Self {
        Self::minutes(DEFAULT_RT_TOLERANCE_MINUTES)
    }
}

impl RtTolerance {
    pub const fn minutes(value: f32) -> Self {
        Self { value, unit: RtToleranceUnit::Minutes }
    }

    pub const fn percent(value: f32) -> Self {
        Self { value, unit: RtToleranceUnit::Percent }
    }

    /// The maximum allowed deviation in minutes around `rt`.
    pub fn tolerance_in_minutes(&self, rt: f32) -> f32 {
        match self.unit {
            RtToleranceUnit::Minutes => self.value,
            RtToleranceUnit::Percent => rt.abs() * self.value / 100.0,
        }
    }

    fn is_valid(&self) -> bool {
        self.value.is_finite() && self.value > 0.0
    }
}

/// How candidates of one feature are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingPolicy {
    /// Type priority, then Schymanski level, then the per-axis score chain.
    #[default]
    Default,
    /// Schymanski level, then type priority, then the score chain.
    SchymanskiFirst,
    /// MSI level, then the score chain.
    MsiFirst,
    /// Weighted sum of all axis scores.
    Weighted,
}

impl RankingPolicy {
    pub const ALL: [RankingPolicy; 4] = [
        RankingPolicy::Default,
        RankingPolicy::SchymanskiFirst,
        RankingPolicy::MsiFirst,
        RankingPolicy::Weighted,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            RankingPolicy::Default => "default",
            RankingPolicy::SchymanskiFirst => "schymanski_first",
            RankingPolicy::MsiFirst => "msi_first",
            RankingPolicy::Weighted => "weighted",
        }
    }
}

impl fmt::Display for RankingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for RankingPolicy {
    type Err = AnnorankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        RankingPolicy::ALL
            .into_iter()
            .find(|p| p.id() == needle)
            .ok_or_else(|| AnnorankError::UnknownPolicy(s.to_string()))
    }
}

/// Unvalidated configuration values. Every field falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct SortConfigBuilder {
    pub mz_tolerance: MzTolerance,
    pub rt_tolerance: RtTolerance,
    pub ccs_tolerance_percent: f64,
    pub ri_tolerance: f64,
    pub ranking_policy: RankingPolicy,
    pub weights: AxisWeights,
    pub feature_list_axes: FeatureListAxes,
}

impl Default for SortConfigBuilder {
    fn default() -> Self {
        Self {
            mz_tolerance: DEFAULT_MZ_TOLERANCE,
            rt_tolerance: RtTolerance::default(),
            ccs_tolerance_percent: DEFAULT_CCS_TOLERANCE_PERCENT,
            ri_tolerance: DEFAULT_RI_TOLERANCE,
            ranking_policy: RankingPolicy::default(),
            weights: AxisWeights::default(),
            feature_list_axes: FeatureListAxes::default(),
        }
    }
}

impl SortConfigBuilder {
    pub fn mz_tolerance(mut self, tolerance: MzTolerance) -> Self {
        self.mz_tolerance = tolerance;
        self
    }

    pub fn rt_tolerance(mut self, tolerance: RtTolerance) -> Self {
        self.rt_tolerance = tolerance;
        self
    }

    pub fn ccs_tolerance_percent(mut self, percent: f64) -> Self {
        self.ccs_tolerance_percent = percent;
        self
    }

    pub fn ri_tolerance(mut self, tolerance: f64) -> Self {
        self.ri_tolerance = tolerance;
        self
    }

    pub fn ranking_policy(mut self, policy: RankingPolicy) -> Self {
        self.ranking_policy = policy;
        self
    }

    pub fn weights(mut self, weights: AxisWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn feature_list_axes(mut self, axes: FeatureListAxes) -> Self {
        self.feature_list_axes = axes;
        self
    }

    /// Validates all values and produces an immutable configuration.
    pub fn build(self) -> Result<SortConfig, AnnorankError> {
        if !self.mz_tolerance.is_valid() {
            return Err(invalid_mz_tolerance(&self.mz_tolerance));
        }
        if !self.rt_tolerance.is_valid() {
            return Err(AnnorankError::InvalidTolerance {
                name: "RT",
                value: f64::from(self.rt_tolerance.value),
            });
        }
        if !is_positive(self.ccs_tolerance_percent) {
            return Err(AnnorankError::InvalidTolerance { name: "CCS", value: self.ccs_tolerance_percent });
        }
        if !is_positive(self.ri_tolerance) {
            return Err(AnnorankError::InvalidTolerance { name: "RI", value: self.ri_tolerance });
        }
        self.weights.validate()?;

        Ok(SortConfig {
            mz_tolerance: self.mz_tolerance,
            rt_tolerance: self.rt_tolerance,
            ccs_tolerance_percent: self.ccs_tolerance_percent,
            ri_tolerance: self.ri_tolerance,
            ranking_policy: self.ranking_policy,
            weights: self.weights,
            feature_list_axes: self.feature_list_axes,
        })
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// A validated, immutable sort configuration for one feature list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SortConfigBuilder", into = "SortConfigBuilder")]
pub struct SortConfig {
    mz_tolerance: MzTolerance,
    rt_tolerance: RtTolerance,
    ccs_tolerance_percent: f64,
    ri_tolerance: f64,
    ranking_policy: RankingPolicy,
    weights: AxisWeights,
    feature_list_axes: FeatureListAxes,
}

impl Default for SortConfig {
    /// 15 ppm or 5 mDa, 0.3 min, 10 % CCS, 2.0 RI units, default policy.
    fn default() -> Self {
        Self {
            mz_tolerance: DEFAULT_MZ_TOLERANCE,
            rt_tolerance: RtTolerance::default(),
            ccs_tolerance_percent: DEFAULT_CCS_TOLERANCE_PERCENT,
            ri_tolerance: DEFAULT_RI_TOLERANCE,
            ranking_policy: RankingPolicy::Default,
            weights: AxisWeights::default(),
            feature_list_axes: FeatureListAxes::default(),
        }
    }
}

impl TryFrom<SortConfigBuilder> for SortConfig {
    type Error = AnnorankError;

    fn try_from(builder: SortConfigBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

impl From<SortConfig> for SortConfigBuilder {
    fn from(config: SortConfig) -> Self {
        config.to_builder()
    }
}

// Attribute keys of the persisted configuration.
const ATTR_MZ_ABSOLUTE: &str = "mz_tolerance_absolute";
const ATTR_MZ_PPM: &str = "mz_tolerance_ppm";
const ATTR_RT: &str = "rt_tolerance";
const ATTR_RT_UNIT: &str = "rt_tolerance_unit";
const ATTR_CCS: &str = "ccs_tolerance_percent";
const ATTR_RI: &str = "ri_tolerance";
const ATTR_POLICY: &str = "ranking_policy";
const ATTR_LIST_RT: &str = "feature_list_rt";
const ATTR_LIST_RI: &str = "feature_list_ri";
const ATTR_LIST_CCS: &str = "feature_list_ccs";

impl SortConfig {
    pub fn builder() -> SortConfigBuilder {
        SortConfigBuilder::default()
    }

    /// Returns the current values as an unvalidated builder, for editing a copy.
    pub fn to_builder(&self) -> SortConfigBuilder {
        SortConfigBuilder {
            mz_tolerance: self.mz_tolerance,
            rt_tolerance: self.rt_tolerance,
            ccs_tolerance_percent: self.ccs_tolerance_percent,
            ri_tolerance: self.ri_tolerance,
            ranking_policy: self.ranking_policy,
            weights: self.weights,
            feature_list_axes: self.feature_list_axes,
        }
    }

    /// A copy of this configuration ranked by another policy.
    pub fn with_policy(&self, policy: RankingPolicy) -> Self {
        Self { ranking_policy: policy, ..self.clone() }
    }

    pub fn mz_tolerance(&self) -> &MzTolerance {
        &self.mz_tolerance
    }

    pub fn rt_tolerance(&self) -> &RtTolerance {
        &self.rt_tolerance
    }

    pub fn ccs_tolerance_percent(&self) -> f64 {
        self.ccs_tolerance_percent
    }

    /// CCS tolerance as a fraction, e.g. `0.1` for 10 %.
    pub fn ccs_tolerance_relative(&self) -> f64 {
        self.ccs_tolerance_percent / 100.0
    }

    pub fn ri_tolerance(&self) -> f64 {
        self.ri_tolerance
    }

    pub fn ranking_policy(&self) -> RankingPolicy {
        self.ranking_policy
    }

    pub fn weights(&self) -> &AxisWeights {
        &self.weights
    }

    /// Optional axes the attached feature list can supply.
    pub fn feature_list_axes(&self) -> &FeatureListAxes {
        &self.feature_list_axes
    }

    /// Parses and validates a configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, AnnorankError> {
        let config: SortConfig = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Loads a sort configuration from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading sort configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        info!(
            "Loaded sort configuration from {} (policy: {}).",
            path.display(),
            config.ranking_policy
        );
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, AnnorankError> {
        Ok(serde_yml::to_string(self)?)
    }

    /// Flattens the configuration, weights included, into attribute key/value pairs.
    pub fn to_attributes(&self) -> BTreeMap<String, String> {
        let mut attributes = BTreeMap::new();
        attributes.insert(ATTR_MZ_ABSOLUTE.to_string(), self.mz_tolerance.absolute.to_string());
        attributes.insert(ATTR_MZ_PPM.to_string(), self.mz_tolerance.ppm.to_string());
        attributes.insert(ATTR_RT.to_string(), self.rt_tolerance.value.to_string());
        attributes.insert(ATTR_RT_UNIT.to_string(), self.rt_tolerance.unit.id().to_string());
        attributes.insert(ATTR_CCS.to_string(), self.ccs_tolerance_percent.to_string());
        attributes.insert(ATTR_RI.to_string(), self.ri_tolerance.to_string());
        attributes.insert(ATTR_POLICY.to_string(), self.ranking_policy.id().to_string());
        attributes.insert(ATTR_LIST_RT.to_string(), self.feature_list_axes.rt.to_string());
        attributes.insert(ATTR_LIST_RI.to_string(), self.feature_list_axes.ri.to_string());
        attributes.insert(ATTR_LIST_CCS.to_string(), self.feature_list_axes.ccs.to_string());
        attributes.extend(self.weights.to_attributes());
        attributes
    }

    /// Restores a configuration from attributes.
    ///
    /// Never fails: every missing, unparseable or invalid value is replaced by its
    /// default and reported through the log.
    pub fn from_attributes(attributes: &BTreeMap<String, String>) -> Self {
        let defaults = SortConfigBuilder::default();

        let mz_absolute = read_attribute(attributes, ATTR_MZ_ABSOLUTE, defaults.mz_tolerance.absolute, |v: &f64| {
            v.is_finite() && *v >= 0.0
        });
        let mz_ppm = read_attribute(attributes, ATTR_MZ_PPM, defaults.mz_tolerance.ppm, |v: &f64| {
            v.is_finite() && *v >= 0.0
        });
        let mut mz_tolerance = MzTolerance::new(mz_absolute, mz_ppm);
        if !mz_tolerance.is_valid() {
            warn!("Attributes describe an empty m/z tolerance window, using default.");
            mz_tolerance = defaults.mz_tolerance;
        }

        let rt_value = read_attribute(attributes, ATTR_RT, defaults.rt_tolerance.value, |v: &f32| {
            v.is_finite() && *v > 0.0
        });
        let rt_unit = read_attribute(attributes, ATTR_RT_UNIT, defaults.rt_tolerance.unit, |_| true);

        let builder = SortConfigBuilder {
            mz_tolerance,
            rt_tolerance: RtTolerance { value: rt_value, unit: rt_unit },
            ccs_tolerance_percent: read_attribute(attributes, ATTR_CCS, defaults.ccs_tolerance_percent, |v| {
                is_positive(*v)
            }),
            ri_tolerance: read_attribute(attributes, ATTR_RI, defaults.ri_tolerance, |v| is_positive(*v)),
            ranking_policy: read_attribute(attributes, ATTR_POLICY, defaults.ranking_policy, |_| true),
            weights: AxisWeights::from_attributes(attributes),
            feature_list_axes: FeatureListAxes {
                rt: read_attribute(attributes, ATTR_LIST_RT, defaults.feature_list_axes.rt, |_| true),
                ri: read_attribute(attributes, ATTR_LIST_RI, defaults.feature_list_axes.ri, |_| true),
                ccs: read_attribute(attributes, ATTR_LIST_CCS, defaults.feature_list_axes.ccs, |_| true),
            },
        };

        builder.build().unwrap_or_else(|e| {
            warn!("Restored sort configuration is invalid ({}), using defaults.", e);
            SortConfig::default()
        })
    }
}

/// Names the part of an unusable m/z tolerance that is out of range. Two valid parts
/// that are both zero leave an empty window.
fn invalid_mz_tolerance(tolerance: &MzTolerance) -> AnnorankError {
    let out_of_range = |v: f64| !v.is_finite() || v < 0.0;
    if out_of_range(tolerance.absolute) {
        AnnorankError::InvalidTolerance { name: "m/z absolute", value: tolerance.absolute }
    } else if out_of_range(tolerance.ppm) {
        AnnorankError::InvalidTolerance { name: "m/z ppm", value: tolerance.ppm }
    } else {
        AnnorankError::InvalidTolerance { name: "m/z", value: 0.0 }
    }
}

/// Reads one attribute, falling back to `default` when it is missing, fails to parse,
/// or is rejected by `valid`.
fn read_attribute<T, F>(attributes: &BTreeMap<String, String>, key: &str, default: T, valid: F) -> T
where
    T: FromStr + fmt::Debug,
    F: Fn(&T) -> bool,
{
    let Some(raw) = attributes.get(key) else {
        debug!("Attribute '{}' missing, using default {:?}.", key, default);
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => value,
        Ok(value) => {
            warn!("Attribute '{}' has invalid value {:?}, using default {:?}.", key, value, default);
            default
        }
        Err(_) => {
            warn!("Attribute '{}' could not be parsed from '{}', using default {:?}.", key, raw, default);
            default
        }
    }
}

/// The sort configuration attached to a feature list.
///
/// Readers take a [`snapshot`](Self::snapshot) and use it for a whole ranking pass;
/// writers [`replace`](Self::replace) the configuration as a whole. Each replacement
/// bumps a version counter; [`AnnotationRanker`](crate::AnnotationRanker) records the
/// version it was built from and [`is_current`](Self::is_current) tells whether a newer
/// configuration has been swapped in since.
#[derive(Debug, Default)]
pub struct SharedSortConfig {
    current: RwLock<Arc<SortConfig>>,
    version: AtomicU64,
}

impl SharedSortConfig {
    pub fn new(config: SortConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
            version: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> Arc<SortConfig> {
        self.versioned_snapshot().0
    }

    /// The current configuration together with its version. Both are read under the
    /// same lock, so the pair is consistent.
    pub fn versioned_snapshot(&self) -> (Arc<SortConfig>, u64) {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        (Arc::clone(&*guard), self.version.load(Ordering::Acquire))
    }

    /// Swaps in a new configuration and returns the new version.
    pub fn replace(&self, config: SortConfig) -> u64 {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(config);
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        debug!("Sort configuration replaced, now at version {}.", version);
        version
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    pub fn is_current(&self, version: u64) -> bool {
        self.version() == version
    }
}
