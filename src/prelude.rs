//! Convenient re-exports for common schemacompare usage.
//!
//! # Example
//!
//! ```no_run
//! use schemacompare::prelude::*;
//!
//! let result = compare(&CompareOptions::new(
//!     vec!["json:model.json".into()],
//!     vec!["json:database.json".into()],
//! )).unwrap();
//!
//! println!("{} difference(s)", result.comparison.differences.len());
//! ```

// Functions
pub use crate::api::{compare, compare_schemas, snapshot};

// Options
pub use crate::api::{CompareOptions, SnapshotOptions};
pub use crate::options::{EngineOptions, ExtraTablePolicy};

// Results
pub use crate::api::{CompareResult, SnapshotResult};
pub use crate::report::{ComparisonResult, SeverityCounts};

// Error types
pub use crate::api::Error;
pub use crate::util::AdapterError;

// Core types
pub use crate::diff::{Difference, DifferenceKind, Location, Severity};
pub use crate::filter::Filter;
pub use crate::model::{ElementKind, Side, Snapshot};
pub use crate::source::{SourceSchema, SourceTable};
