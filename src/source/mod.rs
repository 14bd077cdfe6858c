//! Metadata adapter: turns a source description of a schema into a canonical
//! [`Snapshot`].
//!
//! The expected model (entity configuration) and the actual database
//! (catalog introspection) are both handed over as a [`SourceSchema`]. The
//! adapter performs a structural copy only. It never renames elements or
//! guesses intent; it validates references, resolves column and table names
//! against their declarations, and records per-element problems as
//! [`SourceIssue`]s instead of failing.

pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::model::{
    qualified_name, Column, ElementKind, ForeignKey, Index, IndexOrigin, PrimaryKey,
    ReferentialAction, Side, Snapshot, SourceIssue, Table,
};
use crate::options::EngineOptions;
use crate::util::{AdapterError, Result};

pub use loader::{load_source, load_sources};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceSchema {
    #[serde(default)]
    pub tables: Vec<SourceTable>,
    /// Schema-level constructs without a canonical mapping (sequences,
    /// synonyms, ...).
    #[serde(default)]
    pub unsupported: Vec<SourceFeature>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceTable {
    #[serde(default)]
    pub schema: Option<String>,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<SourceColumn>,
    #[serde(default)]
    pub primary_key: Option<SourcePrimaryKey>,
    #[serde(default)]
    pub indexes: Vec<SourceIndex>,
    #[serde(default)]
    pub unique_constraints: Vec<SourceUniqueConstraint>,
    #[serde(default)]
    pub foreign_keys: Vec<SourceForeignKey>,
    #[serde(default)]
    pub unsupported: Vec<SourceFeature>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceColumn {
    pub name: String,
    #[serde(alias = "type")]
    pub data_type: String,
    pub nullable: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub computed: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourcePrimaryKey {
    #[serde(default)]
    pub name: Option<String>,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceIndex {
    #[serde(default)]
    pub name: Option<String>,
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceUniqueConstraint {
    #[serde(default)]
    pub name: Option<String>,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceForeignKey {
    #[serde(default)]
    pub name: Option<String>,
    pub columns: Vec<String>,
    #[serde(default)]
    pub referenced_schema: Option<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    #[serde(default)]
    pub on_delete: Option<String>,
    #[serde(default)]
    pub on_update: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceFeature {
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl SourceTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn column(mut self, name: &str, data_type: &str, nullable: bool) -> Self {
        self.columns.push(SourceColumn {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
            default: None,
            computed: None,
        });
        self
    }

    pub fn primary_key(mut self, name: Option<&str>, columns: &[&str]) -> Self {
        self.primary_key = Some(SourcePrimaryKey {
            name: name.map(Into::into),
            columns: to_strings(columns),
        });
        self
    }

    pub fn index(mut self, name: Option<&str>, columns: &[&str], unique: bool) -> Self {
        self.indexes.push(SourceIndex {
            name: name.map(Into::into),
            columns: to_strings(columns),
            unique,
        });
        self
    }

    pub fn unique_constraint(mut self, name: Option<&str>, columns: &[&str]) -> Self {
        self.unique_constraints.push(SourceUniqueConstraint {
            name: name.map(Into::into),
            columns: to_strings(columns),
        });
        self
    }

    pub fn foreign_key(
        mut self,
        name: Option<&str>,
        columns: &[&str],
        referenced_table: &str,
        referenced_columns: &[&str],
    ) -> Self {
        self.foreign_keys.push(SourceForeignKey {
            name: name.map(Into::into),
            columns: to_strings(columns),
            referenced_schema: None,
            referenced_table: referenced_table.into(),
            referenced_columns: to_strings(referenced_columns),
            on_delete: None,
            on_update: None,
        });
        self
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Builds a canonical snapshot of one side of the comparison.
///
/// Fails only when the source cannot be materialized at all: blank or
/// duplicate table/column names, or a foreign key referencing a table the
/// source does not declare. Everything else degrades to a [`SourceIssue`].
pub fn build_snapshot(
    source: &SourceSchema,
    side: Side,
    options: &EngineOptions,
) -> Result<Snapshot> {
    let mut builder = SnapshotBuilder {
        side,
        options,
        issues: Vec::new(),
    };
    let mut tables: BTreeMap<String, Table> = BTreeMap::new();
    let mut keyed_sources: Vec<(String, &SourceTable)> = Vec::new();

    for source_table in &source.tables {
        let table = builder.table(source_table)?;
        let key = options.table_key(&table.schema, &table.name);
        if tables.contains_key(&key) {
            return Err(AdapterError::DuplicateTable(table.qualified_name()));
        }
        tables.insert(key.clone(), table);
        keyed_sources.push((key, source_table));
    }

    // Foreign keys need every table declared before references resolve.
    for (key, source_table) in &keyed_sources {
        let foreign_keys = builder.foreign_keys(&tables[key], source_table, &tables)?;
        if let Some(table) = tables.get_mut(key) {
            table.foreign_keys = foreign_keys;
        }
    }

    for feature in &source.unsupported {
        builder.unsupported(None, feature);
    }

    tracing::debug!(
        side = %side,
        tables = tables.len(),
        issues = builder.issues.len(),
        "built schema snapshot"
    );

    Ok(Snapshot {
        side,
        tables,
        issues: builder.issues,
    })
}

struct SnapshotBuilder<'a> {
    side: Side,
    options: &'a EngineOptions,
    issues: Vec<SourceIssue>,
}

impl SnapshotBuilder<'_> {
    fn table(&mut self, source: &SourceTable) -> Result<Table> {
        if source.name.trim().is_empty() {
            return Err(AdapterError::BlankName {
                element: "table",
                context: format!("{} schema", self.side),
            });
        }

        let schema = source
            .schema
            .clone()
            .or_else(|| self.options.default_schema.clone());
        let mut table = Table::new(schema, source.name.clone());
        table.columns = self.columns(&table, source)?;
        table.primary_key = self.primary_key(&table, source);
        table.indexes = self.indexes(&table, source);

        for feature in &source.unsupported {
            self.unsupported(Some(table.qualified_name()), feature);
        }

        Ok(table)
    }

    fn columns(&self, table: &Table, source: &SourceTable) -> Result<Vec<Column>> {
        let mut seen = HashSet::new();
        let mut columns = Vec::with_capacity(source.columns.len());

        for (position, column) in source.columns.iter().enumerate() {
            if column.name.trim().is_empty() {
                return Err(AdapterError::BlankName {
                    element: "column",
                    context: format!("table \"{}\"", table.qualified_name()),
                });
            }
            if !seen.insert(self.options.fold(&column.name)) {
                return Err(AdapterError::DuplicateColumn {
                    table: table.qualified_name(),
                    column: column.name.clone(),
                });
            }
            columns.push(Column {
                name: column.name.clone(),
                data_type: column.data_type.clone(),
                nullable: column.nullable,
                default: column.default.clone(),
                computed: column.computed.clone(),
                ordinal: position + 1,
            });
        }

        Ok(columns)
    }

    fn primary_key(&mut self, table: &Table, source: &SourceTable) -> Option<PrimaryKey> {
        let key = source.primary_key.as_ref()?;
        let label = key.name.clone().unwrap_or_else(|| "primary key".to_string());
        let columns = self.resolve_columns(table, table, ElementKind::PrimaryKey, &label, &key.columns)?;
        Some(PrimaryKey {
            name: key.name.clone(),
            columns,
        })
    }

    fn indexes(&mut self, table: &Table, source: &SourceTable) -> Vec<Index> {
        let mut indexes = Vec::new();

        for index in &source.indexes {
            let label = index_label(&index.name, &index.columns);
            if let Some(columns) =
                self.resolve_columns(table, table, ElementKind::Index, &label, &index.columns)
            {
                indexes.push(Index {
                    name: index.name.clone(),
                    synthesized_name: false,
                    columns,
                    unique: index.unique,
                    origin: IndexOrigin::Index,
                });
            }
        }

        for constraint in &source.unique_constraints {
            let label = index_label(&constraint.name, &constraint.columns);
            if let Some(columns) =
                self.resolve_columns(table, table, ElementKind::Index, &label, &constraint.columns)
            {
                indexes.push(Index {
                    name: constraint.name.clone(),
                    synthesized_name: false,
                    columns,
                    unique: true,
                    origin: IndexOrigin::UniqueConstraint,
                });
            }
        }

        indexes
    }

    fn foreign_keys(
        &mut self,
        table: &Table,
        source: &SourceTable,
        tables: &BTreeMap<String, Table>,
    ) -> Result<Vec<ForeignKey>> {
        let mut foreign_keys = Vec::new();

        for fk in &source.foreign_keys {
            let label = fk.name.clone().unwrap_or_else(|| {
                format!(
                    "{} -> {}",
                    crate::model::column_list(&fk.columns),
                    fk.referenced_table
                )
            });

            let Some(referenced) =
                self.resolve_table(tables, &fk.referenced_schema, &fk.referenced_table)
            else {
                return Err(AdapterError::UnknownReferencedTable {
                    table: table.qualified_name(),
                    foreign_key: label,
                    referenced: qualified_name(&fk.referenced_schema, &fk.referenced_table),
                });
            };

            if fk.columns.len() != fk.referenced_columns.len() {
                self.issue(
                    Some(table.qualified_name()),
                    ElementKind::ForeignKey,
                    &label,
                    format!(
                        "{} constrained column(s) but {} referenced column(s)",
                        fk.columns.len(),
                        fk.referenced_columns.len()
                    ),
                );
                continue;
            }

            let Some(columns) =
                self.resolve_columns(table, table, ElementKind::ForeignKey, &label, &fk.columns)
            else {
                continue;
            };
            let Some(referenced_columns) = self.resolve_columns(
                table,
                referenced,
                ElementKind::ForeignKey,
                &label,
                &fk.referenced_columns,
            ) else {
                continue;
            };
            let Some(on_delete) = self.action(table, &label, "ON DELETE", &fk.on_delete) else {
                continue;
            };
            let Some(on_update) = self.action(table, &label, "ON UPDATE", &fk.on_update) else {
                continue;
            };

            foreign_keys.push(ForeignKey {
                name: fk.name.clone(),
                columns,
                referenced_table: referenced.qualified_name(),
                referenced_columns,
                on_delete,
                on_update,
            });
        }

        Ok(foreign_keys)
    }

    fn resolve_table<'t>(
        &self,
        tables: &'t BTreeMap<String, Table>,
        schema: &Option<String>,
        name: &str,
    ) -> Option<&'t Table> {
        if schema.is_some() {
            return tables.get(&self.options.table_key(schema, name));
        }
        let default_schema = &self.options.default_schema;
        if let Some(table) = tables.get(&self.options.table_key(default_schema, name)) {
            return Some(table);
        }

        // An unqualified reference resolves when exactly one table carries the name.
        let mut candidates = tables
            .values()
            .filter(|t| self.options.names_equal(&t.name, name));
        match (candidates.next(), candidates.next()) {
            (Some(table), None) => Some(table),
            _ => None,
        }
    }

    /// Maps referenced column names onto the table's declared column names.
    /// Records an issue and returns `None` if any name is unknown.
    fn resolve_columns(
        &mut self,
        owner: &Table,
        table: &Table,
        element: ElementKind,
        label: &str,
        names: &[String],
    ) -> Option<Vec<String>> {
        // Issues are attributed to the owning table even for referenced columns.
        let owner = Some(owner.qualified_name());
        if names.is_empty() {
            self.issue(owner, element, label, "declares no columns".to_string());
            return None;
        }

        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            match table
                .columns
                .iter()
                .find(|c| self.options.names_equal(&c.name, name))
            {
                Some(column) => resolved.push(column.name.clone()),
                None => {
                    self.issue(
                        owner,
                        element,
                        label,
                        format!(
                            "references unknown column \"{name}\" of \"{}\"",
                            table.qualified_name()
                        ),
                    );
                    return None;
                }
            }
        }
        Some(resolved)
    }

    fn action(
        &mut self,
        table: &Table,
        label: &str,
        clause: &str,
        raw: &Option<String>,
    ) -> Option<ReferentialAction> {
        let Some(raw) = raw else {
            return Some(ReferentialAction::NoAction);
        };
        let parsed = ReferentialAction::parse(raw);
        if parsed.is_none() {
            self.issue(
                Some(table.qualified_name()),
                ElementKind::ForeignKey,
                label,
                format!("{clause} behavior \"{raw}\" has no canonical mapping"),
            );
        }
        parsed
    }

    fn unsupported(&mut self, table: Option<String>, feature: &SourceFeature) {
        let name = feature.name.clone().unwrap_or_else(|| feature.kind.clone());
        let reason = match &feature.detail {
            Some(detail) => format!("{} is not supported: {detail}", feature.kind),
            None => format!("{} is not supported", feature.kind),
        };
        self.issue(table, ElementKind::Feature, &name, reason);
    }

    fn issue(&mut self, table: Option<String>, element: ElementKind, name: &str, reason: String) {
        tracing::warn!(
            side = %self.side,
            table = table.as_deref().unwrap_or("-"),
            element = %element,
            name,
            "{reason}"
        );
        self.issues.push(SourceIssue {
            side: self.side,
            table,
            element,
            name: name.to_string(),
            reason,
        });
    }
}

fn index_label(name: &Option<String>, columns: &[String]) -> String {
    name.clone()
        .unwrap_or_else(|| crate::model::column_list(columns))
}
