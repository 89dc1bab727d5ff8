//! The facet filter engine: merging per-result-set facets and persisting
//! applied filters in the URL.

pub mod codec;
pub mod merge;

pub use codec::{decode, encode, parse_query};
pub use merge::{merge_facets, merge_facets_all, merge_groups};
