use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::api::Error;
use crate::diff::{Difference, Severity};

/// Outcome of one schema comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Differences in report order
    pub differences: Vec<Difference>,
    /// False when any difference has `Error` severity. Under default options
    /// every difference is an error, so this equals "no differences".
    pub is_valid: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

impl SeverityCounts {
    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.info
    }
}

impl ComparisonResult {
    pub fn new(mut differences: Vec<Difference>) -> Self {
        differences.sort_by(Difference::report_order);
        differences.dedup();
        let is_valid = !differences.iter().any(Difference::is_error);
        Self {
            differences,
            is_valid,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.differences.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Difference> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Difference> {
        self.with_severity(Severity::Warning)
    }

    pub fn notes(&self) -> impl Iterator<Item = &Difference> {
        self.with_severity(Severity::Info)
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Difference> {
        self.differences
            .iter()
            .filter(move |d| d.severity == severity)
    }

    pub fn count_by_severity(&self) -> SeverityCounts {
        let mut counts = SeverityCounts::default();
        for difference in &self.differences {
            match difference.severity {
                Severity::Error => counts.errors += 1,
                Severity::Warning => counts.warnings += 1,
                Severity::Info => counts.info += 1,
            }
        }
        counts
    }

    /// Tables that carry at least one difference, in report order.
    pub fn tables(&self) -> Vec<&str> {
        let mut tables: Vec<&str> = self
            .differences
            .iter()
            .filter_map(|d| d.location.table.as_deref())
            .collect();
        tables.dedup();
        tables
    }

    /// Fails with [`Error::Invalid`] when any error-severity difference exists.
    pub fn assert_valid(&self) -> Result<(), Error> {
        if self.is_valid {
            return Ok(());
        }
        Err(Error::Invalid {
            errors: self.count_by_severity().errors,
            report: self.render_text(),
        })
    }

    pub fn render_text(&self) -> String {
        let mut output = String::new();
        let counts = self.count_by_severity();

        output.push_str("=== schemacompare ===\n");
        output.push_str(&format!(
            "Differences: {} ({} errors, {} warnings, {} info)\n",
            counts.total(),
            counts.errors,
            counts.warnings,
            counts.info
        ));

        for (table, differences) in group_by_table(&self.differences) {
            output.push('\n');
            output.push_str(&format!("{}:\n", table.unwrap_or("(schema)")));
            for difference in differences {
                output.push_str(&format!(
                    "  {} {}\n",
                    severity_marker(difference.severity),
                    difference.describe()
                ));
            }
        }

        output.push('\n');
        output.push_str(&format!("Result: {}\n", verdict(self.is_valid)));
        output
    }

    pub fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).expect("ComparisonResult must serialize")
    }
}

fn group_by_table(differences: &[Difference]) -> BTreeMap<Option<&str>, Vec<&Difference>> {
    let mut grouped: BTreeMap<Option<&str>, Vec<&Difference>> = BTreeMap::new();
    for difference in differences {
        grouped
            .entry(difference.location.table.as_deref())
            .or_default()
            .push(difference);
    }
    grouped
}

fn severity_marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "✗",
        Severity::Warning => "⚠",
        Severity::Info => "ℹ",
    }
}

fn verdict(valid: bool) -> &'static str {
    if valid {
        "VALID"
    } else {
        "INVALID"
    }
}
