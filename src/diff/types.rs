use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::model::ElementKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifferenceKind {
    /// Declared by the model, absent from the database
    Missing,
    /// Present in the database, not declared by the model
    Extra,
    /// Present on both sides with diverging attributes
    Mismatched,
    /// A source construct with no canonical mapping
    Unsupported,
}

impl DifferenceKind {
    pub fn label(&self) -> &'static str {
        match self {
            DifferenceKind::Missing => "MISSING",
            DifferenceKind::Extra => "EXTRA",
            DifferenceKind::Mismatched => "DIFFERENT",
            DifferenceKind::Unsupported => "UNSUPPORTED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        write!(f, "{s}")
    }
}

/// Where in the schema a difference was found.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Qualified table name; `None` for schema-level findings.
    pub table: Option<String>,
    pub element: ElementKind,
    /// Element identifier: a column name, an index or foreign key identity.
    pub name: Option<String>,
    /// The attribute that diverges, for `Mismatched` differences.
    pub attribute: Option<String>,
}

impl Location {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            element: ElementKind::Table,
            name: None,
            attribute: None,
        }
    }

    pub fn element(table: impl Into<String>, element: ElementKind, name: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            element,
            name: Some(name.into()),
            attribute: None,
        }
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Renders the location as a path such as `Books/column:Title/nullable`.
    pub fn path(&self) -> String {
        let mut path = self
            .table
            .clone()
            .unwrap_or_else(|| "(schema)".to_string());
        if self.element != ElementKind::Table {
            path.push('/');
            path.push_str(&self.element.to_string());
            if let Some(name) = &self.name {
                path.push(':');
                path.push_str(name);
            }
        }
        if let Some(attribute) = &self.attribute {
            path.push('/');
            path.push_str(attribute);
        }
        path
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Difference {
    pub kind: DifferenceKind,
    pub location: Location,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub severity: Severity,
}

impl Difference {
    pub fn missing(location: Location, expected: Option<String>) -> Self {
        Self {
            kind: DifferenceKind::Missing,
            location,
            expected,
            actual: None,
            severity: Severity::Error,
        }
    }

    pub fn extra(location: Location, actual: Option<String>) -> Self {
        Self {
            kind: DifferenceKind::Extra,
            location,
            expected: None,
            actual,
            severity: Severity::Error,
        }
    }

    pub fn mismatched(
        location: Location,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            kind: DifferenceKind::Mismatched,
            location,
            expected: Some(expected.into()),
            actual: Some(actual.into()),
            severity: Severity::Error,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Report order: table, element kind, element name, attribute, then
    /// difference kind and values so equal locations still sort stably.
    pub fn report_order(&self, other: &Self) -> Ordering {
        self.location
            .table
            .cmp(&other.location.table)
            .then(self.location.element.cmp(&other.location.element))
            .then_with(|| self.location.name.cmp(&other.location.name))
            .then_with(|| self.location.attribute.cmp(&other.location.attribute))
            .then(self.kind.cmp(&other.kind))
            .then_with(|| self.expected.cmp(&other.expected))
            .then_with(|| self.actual.cmp(&other.actual))
    }

    /// One-line description without the table, used under a table heading.
    pub fn describe(&self) -> String {
        let mut subject = match (&self.location.element, &self.location.name) {
            (ElementKind::Table, _) => "table".to_string(),
            (element, Some(name)) => format!("{element} '{name}'"),
            (element, None) => element.to_string(),
        };
        if let Some(attribute) = &self.location.attribute {
            subject.push_str(&format!(", {attribute}"));
        }

        let detail = match self.kind {
            DifferenceKind::Mismatched => format!(
                ". Expected = {}, found = {}",
                self.expected.as_deref().unwrap_or("<none>"),
                self.actual.as_deref().unwrap_or("<none>")
            ),
            DifferenceKind::Missing => value_suffix(&self.expected),
            DifferenceKind::Extra => value_suffix(&self.actual),
            DifferenceKind::Unsupported => {
                let reason = self.expected.as_ref().or(self.actual.as_ref());
                let side = if self.expected.is_some() {
                    "model"
                } else {
                    "database"
                };
                match reason {
                    Some(reason) => format!(" in {side}: {reason}"),
                    None => String::new(),
                }
            }
        };

        format!("{}: {subject}{detail}", self.kind.label())
    }
}

fn value_suffix(value: &Option<String>) -> String {
    match value {
        Some(value) => format!(" ({value})"),
        None => String::new(),
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location.table {
            Some(table) => write!(f, "{table} -> {}", self.describe()),
            None => write!(f, "{}", self.describe()),
        }
    }
}
