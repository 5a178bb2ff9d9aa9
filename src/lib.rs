//! Analytics over in-memory student cognitive-performance records.
//!
//! Every function takes the collection it works on and returns new values;
//! nothing here keeps state between calls or touches the filesystem.

pub mod aggregate;
pub mod classify;
pub mod codec;
pub mod config;
pub mod error;
pub mod insights;
pub mod integrity;
pub mod models;
pub mod query;
pub mod report;
pub mod roster;
pub mod stats;

pub use error::{AnalyticsError, Result};
pub use models::{validate_record, FieldErrors, RawRecord, Student, StudentField};
