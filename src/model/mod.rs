//! Canonical, source-agnostic schema snapshot.
//!
//! Both the expected model and the actual database end up in these types
//! before anything is compared. Nothing here knows where the data came from.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which side of a comparison a snapshot or issue belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Expected,
    Actual,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Expected => write!(f, "expected"),
            Side::Actual => write!(f, "actual"),
        }
    }
}

/// Kind of schema element a difference or issue is attached to.
///
/// The declaration order is the order elements appear in a report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Table,
    Column,
    PrimaryKey,
    Index,
    ForeignKey,
    Feature,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ElementKind::Table => "table",
            ElementKind::Column => "column",
            ElementKind::PrimaryKey => "primary key",
            ElementKind::Index => "index",
            ElementKind::ForeignKey => "foreign key",
            ElementKind::Feature => "feature",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    pub side: Side,
    /// Tables keyed by their identity key (see [`crate::options::EngineOptions::table_key`]).
    pub tables: BTreeMap<String, Table>,
    pub issues: Vec<SourceIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Table {
    pub schema: Option<String>,
    pub name: String,
    pub columns: Vec<Column>,
    pub primary_key: Option<PrimaryKey>,
    pub indexes: Vec<Index>,
    pub foreign_keys: Vec<ForeignKey>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub default: Option<String>,
    pub computed: Option<String>,
    /// 1-based position within the table.
    pub ordinal: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrimaryKey {
    pub name: Option<String>,
    pub columns: Vec<String>,
}

/// Where an index-like construct was declared.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IndexOrigin {
    Index,
    UniqueConstraint,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Index {
    pub name: Option<String>,
    /// Set by the normalizer when `name` was generated rather than declared.
    #[serde(default)]
    pub synthesized_name: bool,
    pub columns: Vec<String>,
    pub unique: bool,
    pub origin: IndexOrigin,
}

impl Index {
    pub fn has_explicit_name(&self) -> bool {
        self.name.is_some() && !self.synthesized_name
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForeignKey {
    pub name: Option<String>,
    pub columns: Vec<String>,
    /// Qualified name of the referenced table as resolved against the source.
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    pub on_delete: ReferentialAction,
    pub on_update: ReferentialAction,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReferentialAction {
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl ReferentialAction {
    /// Parses the spellings used by catalogs (`NO ACTION`, `SET_NULL`) and by
    /// model configuration (`NoAction`, `ClientSetNull`).
    ///
    /// Client-side delete behaviors have no database effect and map to
    /// `NoAction`, which is what the database ends up enforcing.
    pub fn parse(raw: &str) -> Option<Self> {
        let folded: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match folded.as_str() {
            "noaction" | "clientsetnull" | "clientnoaction" | "clientcascade" => {
                Some(ReferentialAction::NoAction)
            }
            "restrict" => Some(ReferentialAction::Restrict),
            "cascade" => Some(ReferentialAction::Cascade),
            "setnull" => Some(ReferentialAction::SetNull),
            "setdefault" => Some(ReferentialAction::SetDefault),
            _ => None,
        }
    }
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
        };
        write!(f, "{s}")
    }
}

/// A per-element problem found while building a snapshot. The element is left
/// out of the snapshot and the problem is reported instead of aborting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceIssue {
    pub side: Side,
    pub table: Option<String>,
    pub element: ElementKind,
    pub name: String,
    pub reason: String,
}

pub fn qualified_name(schema: &Option<String>, name: &str) -> String {
    match schema {
        Some(schema) => format!("{schema}.{name}"),
        None => name.to_string(),
    }
}

/// Renders an ordered column list as `(A, B)`.
pub fn column_list(columns: &[String]) -> String {
    format!("({})", columns.join(", "))
}

impl Snapshot {
    pub fn new(side: Side) -> Self {
        Snapshot {
            side,
            tables: BTreeMap::new(),
            issues: Vec::new(),
        }
    }

    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let json = serde_json::to_string(&(&self.tables, &self.issues))
            .expect("Snapshot must serialize");
        let hash = Sha256::digest(json.as_bytes());
        hex::encode(hash)
    }
}

impl Table {
    pub fn new(schema: Option<String>, name: impl Into<String>) -> Self {
        Table {
            schema,
            name: name.into(),
            columns: Vec::new(),
            primary_key: None,
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn qualified_name(&self) -> String {
        qualified_name(&self.schema, &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn books() -> Table {
        let mut table = Table::new(Some("dbo".to_string()), "Books");
        table.columns.push(Column {
            name: "BookId".to_string(),
            data_type: "int".to_string(),
            nullable: false,
            default: None,
            computed: None,
            ordinal: 1,
        });
        table
    }

    #[test]
    fn same_snapshot_produces_same_fingerprint() {
        let empty_a = Snapshot::new(Side::Expected);
        let empty_b = Snapshot::new(Side::Actual);
        assert_eq!(empty_a.fingerprint(), empty_b.fingerprint());

        let mut with_books = Snapshot::new(Side::Expected);
        with_books.tables.insert("dbo.books".to_string(), books());
        let mut with_books_again = Snapshot::new(Side::Actual);
        with_books_again
            .tables
            .insert("dbo.books".to_string(), books());

        assert_eq!(with_books.fingerprint(), with_books_again.fingerprint());
        assert_ne!(empty_a.fingerprint(), with_books.fingerprint());
    }

    #[test]
    fn qualified_name_with_and_without_schema() {
        assert_eq!(books().qualified_name(), "dbo.Books");
        assert_eq!(qualified_name(&None, "Books"), "Books");
    }

    #[test]
    fn referential_action_parses_catalog_and_model_spellings() {
        assert_eq!(
            ReferentialAction::parse("NO ACTION"),
            Some(ReferentialAction::NoAction)
        );
        assert_eq!(
            ReferentialAction::parse("SET_NULL"),
            Some(ReferentialAction::SetNull)
        );
        assert_eq!(
            ReferentialAction::parse("Cascade"),
            Some(ReferentialAction::Cascade)
        );
        assert_eq!(
            ReferentialAction::parse("ClientSetNull"),
            Some(ReferentialAction::NoAction)
        );
        assert_eq!(ReferentialAction::parse("explode"), None);
    }

    #[test]
    fn element_kinds_sort_in_report_order() {
        let mut kinds = vec![
            ElementKind::ForeignKey,
            ElementKind::Table,
            ElementKind::Index,
            ElementKind::Column,
        ];
        kinds.sort();
        assert_eq!(
            kinds,
            vec![
                ElementKind::Table,
                ElementKind::Column,
                ElementKind::Index,
                ElementKind::ForeignKey
            ]
        );
    }
}
