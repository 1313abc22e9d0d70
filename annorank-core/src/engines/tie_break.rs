// annorank-core/src/engines/tie_break.rs
//! Lexicographic tie-break ranking.
//!
//! A [`TieBreakEngine`] holds an explicit, ordered list of [`TieBreakKey`]s. Two
//! candidates are compared key by key until one key tells them apart. Every key is
//! oriented so that the less confident candidate sorts first: a higher type-priority
//! bucket, a higher (worse) confidence level, a lower score, or a missing score.
//!
//! License: MIT OR APACHE 2.0

use std::cmp::Ordering;

use crate::config::RankingPolicy;
use crate::engine::RankingEngine;
use crate::scoring::Axis;
use crate::summary::AnnotationSummary;

/// Something a candidate can be compared on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    TypePriority,
    Schymanski,
    Msi,
    Score(Axis),
}

/// Where candidates without a value for a key sort in the worst-first order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPolicy {
    /// Missing values are the worst.
    #[default]
    First,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TieBreakKey {
    pub key: SortKey,
    pub missing: MissingPolicy,
}

impl TieBreakKey {
    pub const fn new(key: SortKey) -> Self {
        Self { key, missing: MissingPolicy::First }
    }

    /// Compares two candidates on this key alone, worst first.
    pub fn compare(&self, a: &AnnotationSummary<'_>, b: &AnnotationSummary<'_>) -> Ordering {
        match self.key {
            SortKey::TypePriority => b.type_priority().cmp(&a.type_priority()),
            SortKey::Schymanski => b.schymanski_level().cmp(&a.schymanski_level()),
            SortKey::Msi => b.msi_level().cmp(&a.msi_level()),
            SortKey::Score(axis) => compare_optional(a.scores().get(axis), b.scores().get(axis), self.missing),
        }
    }
}

fn compare_optional(a: Option<f64>, b: Option<f64>, missing: MissingPolicy) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => match missing {
            MissingPolicy::First => Ordering::Less,
            MissingPolicy::Last => Ordering::Greater,
        },
        (Some(_), None) => match missing {
            MissingPolicy::First => Ordering::Greater,
            MissingPolicy::Last => Ordering::Less,
        },
    }
}

/// Axis order shared by all tie-break policies once the levels are exhausted.
pub const SCORE_CHAIN: [Axis; 6] = [Axis::Ms2, Axis::Isotope, Axis::Mz, Axis::Rt, Axis::Ri, Axis::Ccs];

#[derive(Debug, Clone)]
pub struct TieBreakEngine {
    name: &'static str,
    keys: Vec<TieBreakKey>,
}

impl TieBreakEngine {
    /// A custom chain of keys.
    pub fn with_keys(name: &'static str, keys: Vec<TieBreakKey>) -> Self {
        Self { name, keys }
    }

    fn with_leading(policy: RankingPolicy, leading: &[SortKey]) -> Self {
        let keys = leading
            .iter()
            .copied()
            .chain(SCORE_CHAIN.iter().map(|&axis| SortKey::Score(axis)))
            .map(TieBreakKey::new)
            .collect();
        Self::with_keys(policy.id(), keys)
    }

    /// Type-priority bucket, then Schymanski level, then the score chain.
    pub fn default_policy() -> Self {
        Self::with_leading(RankingPolicy::Default, &[SortKey::TypePriority, SortKey::Schymanski])
    }

    /// Schymanski level, then type-priority bucket, then the score chain.
    pub fn schymanski_first() -> Self {
        Self::with_leading(RankingPolicy::SchymanskiFirst, &[SortKey::Schymanski, SortKey::TypePriority])
    }

    /// MSI level, then the score chain.
    pub fn msi_first() -> Self {
        Self::with_leading(RankingPolicy::MsiFirst, &[SortKey::Msi])
    }

    pub fn keys(&self) -> &[TieBreakKey] {
        &self.keys
    }
}

impl RankingEngine for TieBreakEngine {
    fn name(&self) -> &'static str {
        self.name
    }

    fn compare_worst_first(&self, a: &AnnotationSummary<'_>, b: &AnnotationSummary<'_>) -> Ordering {
        self.keys
            .iter()
            .map(|key| key.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}
