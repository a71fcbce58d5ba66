//! Value representation and mutation engine for search-based test generation.
//!
//! Test inputs are trees of [`genes::Gene`]. The [`engines`] module mutates
//! them (standard and archive-adaptive mutation), keeps bound values equal and
//! binds parameters across dependent actions; [`data::DataPool`] reuses values
//! observed at runtime.

pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod genes;
pub mod types;
pub mod utils;

pub use error::{EvogeneError, Result};
