//! Community classification: label trees and pattern matching.
//!
//! - [`tree`]: nested wildcard-capable classification trees mapping
//!   communities to human-readable label templates (reject reasons,
//!   no-export reasons)
//! - [`range`]: exact/open-range pattern matching for RPKI status and
//!   blackhole detection

pub mod range;
pub mod tree;

pub use range::*;
pub use tree::*;
