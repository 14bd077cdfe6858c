mod table_elements;
mod types;

pub use types::{Difference, DifferenceKind, Location, Severity};

use table_elements::{diff_columns, diff_foreign_keys, diff_indexes, diff_primary_keys};

use crate::model::{Side, Snapshot, SourceIssue};
use crate::options::{EngineOptions, ExtraTablePolicy};
use crate::report::ComparisonResult;

/// Compares the expected snapshot against the actual one.
///
/// Both snapshots must have been built and normalized with the same
/// `options`; table keys are only comparable under the same folding rules.
pub fn compare(expected: &Snapshot, actual: &Snapshot, options: &EngineOptions) -> ComparisonResult {
    let mut differences = Vec::new();

    differences.extend(diff_issues(expected, actual, options));
    differences.extend(diff_issues(actual, expected, options));
    differences.extend(diff_tables(expected, actual, options));

    for (key, expected_table) in &expected.tables {
        if options.is_ignored(expected_table) {
            continue;
        }
        if let Some(actual_table) = actual.tables.get(key) {
            tracing::debug!(table = %expected_table.qualified_name(), "comparing table");
            differences.extend(diff_columns(expected_table, actual_table, options));
            differences.extend(diff_primary_keys(expected_table, actual_table, options));
            differences.extend(diff_indexes(expected_table, actual_table, options));
            differences.extend(diff_foreign_keys(expected_table, actual_table, options));
        }
    }

    let result = ComparisonResult::new(differences);
    tracing::info!(
        expected_tables = expected.tables.len(),
        actual_tables = actual.tables.len(),
        differences = result.differences.len(),
        valid = result.is_valid,
        "schema comparison finished"
    );
    result
}

fn diff_tables(expected: &Snapshot, actual: &Snapshot, options: &EngineOptions) -> Vec<Difference> {
    let mut differences = Vec::new();

    for (key, table) in &expected.tables {
        if !actual.tables.contains_key(key) && !options.is_ignored(table) {
            differences.push(Difference::missing(
                Location::table(table.qualified_name()),
                None,
            ));
        }
    }

    let severity = match options.extra_tables {
        ExtraTablePolicy::Ignore => return differences,
        ExtraTablePolicy::Error => Severity::Error,
        ExtraTablePolicy::Warning => Severity::Warning,
    };

    for (key, table) in &actual.tables {
        if !expected.tables.contains_key(key) && !options.is_ignored(table) {
            differences.push(
                Difference::extra(Location::table(table.qualified_name()), None)
                    .with_severity(severity),
            );
        }
    }

    differences
}

/// Issues of tables hidden by `ExtraTablePolicy::Ignore` are dropped with them.
fn diff_issues(snapshot: &Snapshot, other: &Snapshot, options: &EngineOptions) -> Vec<Difference> {
    let hide_extra =
        snapshot.side == Side::Actual && options.extra_tables == ExtraTablePolicy::Ignore;

    snapshot
        .issues
        .iter()
        .filter(|issue| match &issue.table {
            Some(table) => {
                let extra_only = !other.tables.contains_key(&options.fold(table));
                !options.is_ignored_name(table) && !(hide_extra && extra_only)
            }
            None => true,
        })
        .map(issue_to_difference)
        .collect()
}

fn issue_to_difference(issue: &SourceIssue) -> Difference {
    let (expected, actual) = match issue.side {
        Side::Expected => (Some(issue.reason.clone()), None),
        Side::Actual => (None, Some(issue.reason.clone())),
    };

    Difference {
        kind: DifferenceKind::Unsupported,
        location: Location {
            table: issue.table.clone(),
            element: issue.element,
            name: Some(issue.name.clone()),
            attribute: None,
        },
        expected,
        actual,
        severity: Severity::Error,
    }
}
