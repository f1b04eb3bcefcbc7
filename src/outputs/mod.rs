//! Export of a finished run for the display and spreadsheet side.
//!
//! # Submodules
//!
//! - [`csv`]: One row per [`VideoRecord`](crate::models::VideoRecord), columns in field order
//! - [`json`]: The whole run, including per-platform counts and warnings
//!
//! Both writers take the records already narrowed by the optional platform
//! filter (see [`ResultAggregate::select`](crate::models::ResultAggregate::select)).

pub mod csv;
pub mod json;
