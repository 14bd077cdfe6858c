use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::{qualified_name, Table};

/// Table the code-first tooling creates for its own bookkeeping.
pub const MIGRATIONS_HISTORY_TABLE: &str = "__EFMigrationsHistory";

/// How tables that exist only in the database are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExtraTablePolicy {
    #[default]
    Error,
    Warning,
    Ignore,
}

impl FromStr for ExtraTablePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(ExtraTablePolicy::Error),
            "warning" | "warn" => Ok(ExtraTablePolicy::Warning),
            "ignore" => Ok(ExtraTablePolicy::Ignore),
            _ => Err(format!(
                "Invalid extra table policy '{s}'. Valid policies: error, warning, ignore"
            )),
        }
    }
}

impl fmt::Display for ExtraTablePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExtraTablePolicy::Error => "error",
            ExtraTablePolicy::Warning => "warning",
            ExtraTablePolicy::Ignore => "ignore",
        };
        write!(f, "{s}")
    }
}

/// Settings shared by the adapter, the normalizer and the differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Compare table, column and index names case-sensitively
    pub case_sensitive: bool,
    /// Severity of tables present only in the database
    pub extra_tables: ExtraTablePolicy,
    /// Emit informational notes when equivalent indexes, keys or foreign keys
    /// carry different explicit names
    pub report_name_mismatches: bool,
    /// Report columns whose ordinal position differs
    pub compare_column_order: bool,
    /// Schema assumed for tables and references declared without one
    pub default_schema: Option<String>,
    /// Tables left out of the comparison entirely (bare or qualified names)
    pub ignored_tables: Vec<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            extra_tables: ExtraTablePolicy::Error,
            report_name_mismatches: false,
            compare_column_order: false,
            default_schema: None,
            ignored_tables: vec![MIGRATIONS_HISTORY_TABLE.into()],
        }
    }
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    pub fn with_extra_tables(mut self, policy: ExtraTablePolicy) -> Self {
        self.extra_tables = policy;
        self
    }

    pub fn report_name_mismatches(mut self) -> Self {
        self.report_name_mismatches = true;
        self
    }

    pub fn compare_column_order(mut self) -> Self {
        self.compare_column_order = true;
        self
    }

    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = Some(schema.into());
        self
    }

    /// Replace the ignored table list (the migrations history table is
    /// ignored by default).
    pub fn with_ignored_tables(mut self, tables: Vec<String>) -> Self {
        self.ignored_tables = tables;
        self
    }

    /// Folds an identifier into its comparison key.
    pub fn fold(&self, name: &str) -> String {
        if self.case_sensitive {
            name.to_string()
        } else {
            name.to_lowercase()
        }
    }

    pub fn fold_all(&self, names: &[String]) -> Vec<String> {
        names.iter().map(|n| self.fold(n)).collect()
    }

    pub fn names_equal(&self, a: &str, b: &str) -> bool {
        self.fold(a) == self.fold(b)
    }

    pub fn table_key(&self, schema: &Option<String>, name: &str) -> String {
        self.fold(&qualified_name(schema, name))
    }

    pub fn is_ignored(&self, table: &Table) -> bool {
        self.matches_ignored(&table.qualified_name(), &table.name)
    }

    /// Same as [`Self::is_ignored`] for a qualified name such as `dbo.Books`.
    pub fn is_ignored_name(&self, qualified: &str) -> bool {
        let bare = qualified.rsplit('.').next().unwrap_or(qualified);
        self.matches_ignored(qualified, bare)
    }

    fn matches_ignored(&self, qualified: &str, bare: &str) -> bool {
        let qualified = self.fold(qualified);
        let bare = self.fold(bare);
        self.ignored_tables.iter().any(|ignored| {
            let ignored = self.fold(ignored);
            ignored == bare || ignored == qualified
        })
    }
}
