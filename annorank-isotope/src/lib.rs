// annorank-isotope/src/lib.rs
#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod tolerance;
pub mod pattern;
pub mod similarity;

pub use pattern::{DataPoint, IsotopePattern};
pub use similarity::similarity_score;
pub use tolerance::MzTolerance;

/// Common type definitions
pub type SimilarityScore = f64;
