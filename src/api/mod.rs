//! High-level API for embedding schemacompare in other applications.
//!
//! This module provides functions that mirror CLI commands with structured
//! inputs and outputs.
//!
//! # Example
//!
//! ```no_run
//! use schemacompare::api::{compare, CompareOptions};
//!
//! let result = compare(&CompareOptions::new(
//!     vec!["json:model.json".into()],
//!     vec!["json:database.json".into()],
//! )).unwrap();
//!
//! for difference in &result.comparison.differences {
//!     println!("{difference}");
//! }
//! ```
//!
//! Callers that already hold [`SourceSchema`] values in memory use
//! [`compare_schemas`] and skip the loader.

mod error;
mod options;
mod results;

pub use error::Error;
pub use options::{CompareOptions, SnapshotOptions};
pub use results::{CompareResult, SnapshotResult};

use crate::diff;
use crate::filter::{filter_snapshot, Filter};
use crate::model::{Side, Snapshot};
use crate::normalize::normalize_snapshot;
use crate::options::EngineOptions;
use crate::report::ComparisonResult;
use crate::source::{build_snapshot, load_sources, SourceSchema};

fn build_filter(include: &[String], exclude: &[String], engine: &EngineOptions) -> Result<Filter, Error> {
    Filter::new(include, exclude)
        .map(|filter| filter.case_sensitive(engine.case_sensitive))
        .map_err(|e| Error::invalid_filter(e.to_string()))
}

fn prepare_snapshot(
    source: &SourceSchema,
    side: Side,
    engine: &EngineOptions,
    filter: Option<&Filter>,
) -> Result<Snapshot, Error> {
    let snapshot = build_snapshot(source, side, engine).map_err(|e| Error::adapter(side, e))?;
    let snapshot = match filter {
        Some(f) if !f.is_empty() => filter_snapshot(&snapshot, f),
        _ => snapshot,
    };
    Ok(normalize_snapshot(snapshot, engine))
}

fn load_side(sources: &[String], side: Side) -> Result<SourceSchema, Error> {
    load_sources(sources).map_err(|e| Error::adapter(side, e))
}

/// Compare the schema loaded from `expected_sources` against the one loaded
/// from `actual_sources`.
pub fn compare(options: &CompareOptions) -> Result<CompareResult, Error> {
    let filter = build_filter(&options.include, &options.exclude, &options.engine)?;

    let expected_source = load_side(&options.expected_sources, Side::Expected)?;
    let actual_source = load_side(&options.actual_sources, Side::Actual)?;

    let expected = prepare_snapshot(&expected_source, Side::Expected, &options.engine, Some(&filter))?;
    let actual = prepare_snapshot(&actual_source, Side::Actual, &options.engine, Some(&filter))?;

    Ok(CompareResult {
        comparison: diff::compare(&expected, &actual, &options.engine),
        expected_fingerprint: expected.fingerprint(),
        actual_fingerprint: actual.fingerprint(),
    })
}

/// Compare two in-memory schema descriptions.
pub fn compare_schemas(
    expected: &SourceSchema,
    actual: &SourceSchema,
    options: &EngineOptions,
) -> Result<ComparisonResult, Error> {
    let expected = prepare_snapshot(expected, Side::Expected, options, None)?;
    let actual = prepare_snapshot(actual, Side::Actual, options, None)?;
    Ok(diff::compare(&expected, &actual, options))
}

/// Load, filter and normalize one schema without comparing it.
pub fn snapshot(options: &SnapshotOptions) -> Result<SnapshotResult, Error> {
    let filter = build_filter(&options.include, &options.exclude, &options.engine)?;
    let source = load_side(&options.sources, Side::Actual)?;
    let snapshot = prepare_snapshot(&source, Side::Actual, &options.engine, Some(&filter))?;
    let fingerprint = snapshot.fingerprint();

    Ok(SnapshotResult {
        snapshot,
        fingerprint,
    })
}
