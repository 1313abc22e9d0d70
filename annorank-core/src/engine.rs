// annorank-core/src/engine.rs
//! Defines the core `RankingEngine` trait.
//!
//! A ranking engine totally orders [`AnnotationSummary`] values of one feature. Each
//! engine implements the ascending ("worst first") comparison; the descending ("best
//! first") comparison is its exact reverse, and the best candidate is the head of the
//! best-first ordering.
//!
//! License: MIT OR APACHE 2.0

use std::cmp::Ordering;

use crate::summary::AnnotationSummary;

/// A pluggable ordering policy over scored and classified candidates.
///
/// Engines are stateless apart from their configuration and can be shared across
/// threads.
pub trait RankingEngine: Send + Sync {
    /// Short identifier of the policy, e.g. `"default"` or `"weighted"`.
    fn name(&self) -> &'static str;

    /// Orders `a` before `b` when `a` is the less confident candidate.
    fn compare_worst_first(&self, a: &AnnotationSummary<'_>, b: &AnnotationSummary<'_>) -> Ordering;

    /// Orders `a` before `b` when `a` is the more confident candidate.
    fn compare_best_first(&self, a: &AnnotationSummary<'_>, b: &AnnotationSummary<'_>) -> Ordering {
        self.compare_worst_first(a, b).reverse()
    }

    /// Sorts best first. The sort is stable, so equal candidates keep their input order.
    fn sort_best_first(&self, summaries: &mut [AnnotationSummary<'_>]) {
        summaries.sort_by(|a, b| self.compare_best_first(a, b));
    }

    /// The head of the best-first ordering, i.e. the first of several equally good
    /// candidates.
    fn best<'a>(&self, summaries: &[AnnotationSummary<'a>]) -> Option<AnnotationSummary<'a>> {
        summaries
            .iter()
            .min_by(|a, b| self.compare_best_first(a, b))
            .copied()
    }
}
