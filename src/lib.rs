//! schemacompare - verify a code-first database model against the live
//! database schema.
//!
//! Both sides are described as a [`source::SourceSchema`], turned into a
//! canonical [`model::Snapshot`], normalized so that equivalent unique
//! indexes and unique constraints collapse into one, and compared
//! structurally. The outcome is a deterministic list of differences plus a
//! validity verdict.
//!
//! # Quick Start
//!
//! ```no_run
//! use schemacompare::prelude::*;
//!
//! let result = compare(&CompareOptions::new(
//!     vec!["json:model.json".into()],
//!     vec!["json:database.json".into()],
//! )).unwrap();
//!
//! print!("{}", result.comparison.render_text());
//! ```
//!
//! # Modules
//!
//! - [`api`] - High-level API mirroring CLI commands
//! - [`prelude`] - Convenient re-exports for common usage
//! - [`source`] - Source descriptions and the metadata adapter
//! - [`model`] - Canonical snapshot types (Table, Column, Index, etc.)
//! - [`normalize`] - Index/unique constraint normalization
//! - [`diff`] - Structural comparison
//! - [`report`] - Comparison result and rendering
//! - [`filter`] - Table filtering by name

pub mod api;
pub mod diff;
pub mod filter;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod options;
pub mod prelude;
pub mod report;
pub mod source;
pub mod util;
