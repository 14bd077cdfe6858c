//! Index normalization.
//!
//! A unique index and a unique constraint over the same ordered columns
//! enforce the same guarantee, and sources disagree about which one they
//! report. After normalization every table holds at most one index per
//! (ordered column sequence, uniqueness) identity.

use std::collections::BTreeMap;

use crate::model::{Index, Snapshot, Table};
use crate::options::EngineOptions;

/// Identity of a normalized index: folded ordered columns plus uniqueness.
pub type IndexKey = (Vec<String>, bool);

pub fn index_key(index: &Index, options: &EngineOptions) -> IndexKey {
    (options.fold_all(&index.columns), index.unique)
}

pub fn normalize_snapshot(snapshot: Snapshot, options: &EngineOptions) -> Snapshot {
    let Snapshot {
        side,
        tables,
        issues,
    } = snapshot;

    let tables = tables
        .into_iter()
        .map(|(key, table)| (key, normalize_table(table, options)))
        .collect();

    Snapshot {
        side,
        tables,
        issues,
    }
}

pub fn normalize_table(mut table: Table, options: &EngineOptions) -> Table {
    let mut groups: BTreeMap<IndexKey, Vec<Index>> = BTreeMap::new();
    for index in table.indexes.drain(..) {
        groups
            .entry(index_key(&index, options))
            .or_default()
            .push(index);
    }

    let before = groups.values().map(Vec::len).sum::<usize>();
    // Groups iterate in key order, so the result is sorted by identity.
    let indexes: Vec<Index> = groups
        .into_values()
        .filter_map(|group| pick_representative(group, &table.name))
        .collect();

    if indexes.len() != before {
        tracing::trace!(
            table = %table.qualified_name(),
            merged = before - indexes.len(),
            "merged equivalent indexes"
        );
    }

    table.indexes = indexes;
    table
}

/// Keeps one index of a group of equivalent ones: the lexically smallest
/// explicit name wins, otherwise a name is synthesized.
fn pick_representative(group: Vec<Index>, table_name: &str) -> Option<Index> {
    let named = group
        .iter()
        .filter(|i| i.has_explicit_name())
        .min_by(|a, b| a.name.cmp(&b.name).then(a.origin.cmp(&b.origin)))
        .cloned();

    if named.is_some() {
        return named;
    }

    let mut index = group.into_iter().min_by(|a, b| a.origin.cmp(&b.origin))?;
    index.name = Some(synthesize_name(table_name, &index));
    index.synthesized_name = true;
    Some(index)
}

fn synthesize_name(table_name: &str, index: &Index) -> String {
    let prefix = if index.unique { "UX" } else { "IX" };
    format!("{prefix}_{table_name}_{}", index.columns.join("_"))
}
