//! Data structures for looking-glass routes, communities and facet filters.

pub mod community;
pub mod filter;
pub mod route;

pub use community::*;
pub use filter::*;
pub use route::*;
