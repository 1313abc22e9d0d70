// annorank-core/src/engines/mod.rs
//! Implementations of the `RankingEngine` trait.
//!
//! * `tie_break`: lexicographic key chains (default, Schymanski-first, MSI-first).
//! * `weighted`: a single weighted sum of the axis scores.
//!
//! To add a policy, create a new file here implementing `RankingEngine` and register
//! it in `selector::engine_for`.
//!
//! License: MIT OR APACHE 2.0

pub mod tie_break;
pub mod weighted;
