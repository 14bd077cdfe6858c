use std::collections::BTreeMap;

use super::{Difference, Location, Severity};
use crate::model::{column_list, Column, ElementKind, ForeignKey, Index, PrimaryKey, Table};
use crate::normalize::{index_key, IndexKey};
use crate::options::EngineOptions;
use crate::util::{normalize_type, optional_expressions_equal};

type ForeignKeyKey = (Vec<String>, String, Vec<String>);

const NONE: &str = "<none>";

pub(super) fn diff_columns(
    expected_table: &Table,
    actual_table: &Table,
    options: &EngineOptions,
) -> Vec<Difference> {
    let mut differences = Vec::new();
    let table_name = expected_table.qualified_name();

    for column in &expected_table.columns {
        match find_column(actual_table, &column.name, options) {
            Some(actual_column) => {
                differences.extend(compare_column(&table_name, column, actual_column, options));
            }
            None => differences.push(Difference::missing(
                Location::element(&table_name, ElementKind::Column, &column.name),
                Some(column.data_type.clone()),
            )),
        }
    }

    for column in &actual_table.columns {
        if find_column(expected_table, &column.name, options).is_none() {
            differences.push(Difference::extra(
                Location::element(&table_name, ElementKind::Column, &column.name),
                Some(column.data_type.clone()),
            ));
        }
    }

    differences
}

fn find_column<'a>(table: &'a Table, name: &str, options: &EngineOptions) -> Option<&'a Column> {
    table
        .columns
        .iter()
        .find(|c| options.names_equal(&c.name, name))
}

pub(super) fn compare_column(
    table_name: &str,
    expected: &Column,
    actual: &Column,
    options: &EngineOptions,
) -> Vec<Difference> {
    let mut differences = Vec::new();
    let location = Location::element(table_name, ElementKind::Column, &expected.name);

    if normalize_type(&expected.data_type) != normalize_type(&actual.data_type) {
        differences.push(Difference::mismatched(
            location.clone().with_attribute("type"),
            &expected.data_type,
            &actual.data_type,
        ));
    }

    if expected.nullable != actual.nullable {
        differences.push(Difference::mismatched(
            location.clone().with_attribute("nullable"),
            nullability(expected.nullable),
            nullability(actual.nullable),
        ));
    }

    if !optional_expressions_equal(&expected.default, &actual.default) {
        differences.push(Difference::mismatched(
            location.clone().with_attribute("default"),
            expected.default.as_deref().unwrap_or(NONE),
            actual.default.as_deref().unwrap_or(NONE),
        ));
    }

    if !optional_expressions_equal(&expected.computed, &actual.computed) {
        differences.push(Difference::mismatched(
            location.clone().with_attribute("computed"),
            expected.computed.as_deref().unwrap_or(NONE),
            actual.computed.as_deref().unwrap_or(NONE),
        ));
    }

    if options.compare_column_order && expected.ordinal != actual.ordinal {
        differences.push(
            Difference::mismatched(
                location.with_attribute("ordinal"),
                expected.ordinal.to_string(),
                actual.ordinal.to_string(),
            )
            .with_severity(Severity::Warning),
        );
    }

    differences
}

fn nullability(nullable: bool) -> &'static str {
    if nullable {
        "NULL"
    } else {
        "NOT NULL"
    }
}

pub(super) fn diff_primary_keys(
    expected_table: &Table,
    actual_table: &Table,
    options: &EngineOptions,
) -> Vec<Difference> {
    let mut differences = Vec::new();
    let location = Location {
        table: Some(expected_table.qualified_name()),
        element: ElementKind::PrimaryKey,
        name: None,
        attribute: None,
    };

    match (&expected_table.primary_key, &actual_table.primary_key) {
        (Some(pk), None) => {
            differences.push(Difference::missing(location, Some(primary_key_label(pk))));
        }
        (None, Some(pk)) => {
            differences.push(Difference::extra(location, Some(primary_key_label(pk))));
        }
        (Some(expected), Some(actual)) => {
            if options.fold_all(&expected.columns) != options.fold_all(&actual.columns) {
                differences.push(Difference::mismatched(
                    location.clone().with_attribute("columns"),
                    column_list(&expected.columns),
                    column_list(&actual.columns),
                ));
            }
            if let (Some(expected_name), Some(actual_name)) = (&expected.name, &actual.name) {
                if options.report_name_mismatches
                    && !options.names_equal(expected_name, actual_name)
                {
                    differences.push(
                        Difference::mismatched(
                            location.with_attribute("name"),
                            expected_name,
                            actual_name,
                        )
                        .with_severity(Severity::Info),
                    );
                }
            }
        }
        (None, None) => {}
    }

    differences
}

fn primary_key_label(pk: &PrimaryKey) -> String {
    match &pk.name {
        Some(name) => format!("{name} {}", column_list(&pk.columns)),
        None => column_list(&pk.columns),
    }
}

/// Indexes match on (ordered columns, uniqueness). Names are provider
/// generated as often as not and never decide a match.
pub(super) fn diff_indexes(
    expected_table: &Table,
    actual_table: &Table,
    options: &EngineOptions,
) -> Vec<Difference> {
    let mut differences = Vec::new();
    let table_name = expected_table.qualified_name();
    let expected_by_key = indexes_by_key(expected_table, options);
    let actual_by_key = indexes_by_key(actual_table, options);

    for (key, index) in &expected_by_key {
        let location = Location::element(&table_name, ElementKind::Index, index_identity(index));
        match actual_by_key.get(key) {
            None => differences.push(Difference::missing(location, index.name.clone())),
            Some(actual) => {
                if let Some(note) = name_note(location, index, actual, options) {
                    differences.push(note);
                }
            }
        }
    }

    for (key, index) in &actual_by_key {
        if !expected_by_key.contains_key(key) {
            differences.push(Difference::extra(
                Location::element(&table_name, ElementKind::Index, index_identity(index)),
                index.name.clone(),
            ));
        }
    }

    differences
}

fn indexes_by_key<'a>(table: &'a Table, options: &EngineOptions) -> BTreeMap<IndexKey, &'a Index> {
    table
        .indexes
        .iter()
        .map(|index| (index_key(index, options), index))
        .collect()
}

fn index_identity(index: &Index) -> String {
    if index.unique {
        format!("unique {}", column_list(&index.columns))
    } else {
        column_list(&index.columns)
    }
}

fn name_note(
    location: Location,
    expected: &Index,
    actual: &Index,
    options: &EngineOptions,
) -> Option<Difference> {
    if !options.report_name_mismatches
        || !expected.has_explicit_name()
        || !actual.has_explicit_name()
    {
        return None;
    }
    let (Some(expected_name), Some(actual_name)) = (&expected.name, &actual.name) else {
        return None;
    };
    if options.names_equal(expected_name, actual_name) {
        return None;
    }
    Some(
        Difference::mismatched(location.with_attribute("name"), expected_name, actual_name)
            .with_severity(Severity::Info),
    )
}

pub(super) fn diff_foreign_keys(
    expected_table: &Table,
    actual_table: &Table,
    options: &EngineOptions,
) -> Vec<Difference> {
    let mut differences = Vec::new();
    let table_name = expected_table.qualified_name();
    let expected_by_key = foreign_keys_by_key(expected_table, options);
    let actual_by_key = foreign_keys_by_key(actual_table, options);

    for (key, fk) in &expected_by_key {
        let location =
            Location::element(&table_name, ElementKind::ForeignKey, foreign_key_identity(fk));
        let Some(actual) = actual_by_key.get(key) else {
            differences.push(Difference::missing(location, fk.name.clone()));
            continue;
        };

        if fk.on_delete != actual.on_delete {
            differences.push(Difference::mismatched(
                location.clone().with_attribute("on delete"),
                fk.on_delete.to_string(),
                actual.on_delete.to_string(),
            ));
        }
        if fk.on_update != actual.on_update {
            differences.push(Difference::mismatched(
                location.clone().with_attribute("on update"),
                fk.on_update.to_string(),
                actual.on_update.to_string(),
            ));
        }
        if let (Some(expected_name), Some(actual_name)) = (&fk.name, &actual.name) {
            if options.report_name_mismatches && !options.names_equal(expected_name, actual_name) {
                differences.push(
                    Difference::mismatched(
                        location.with_attribute("name"),
                        expected_name,
                        actual_name,
                    )
                    .with_severity(Severity::Info),
                );
            }
        }
    }

    for (key, fk) in &actual_by_key {
        if !expected_by_key.contains_key(key) {
            differences.push(Difference::extra(
                Location::element(&table_name, ElementKind::ForeignKey, foreign_key_identity(fk)),
                fk.name.clone(),
            ));
        }
    }

    differences
}

fn foreign_keys_by_key<'a>(
    table: &'a Table,
    options: &EngineOptions,
) -> BTreeMap<ForeignKeyKey, &'a ForeignKey> {
    table
        .foreign_keys
        .iter()
        .map(|fk| {
            let key = (
                options.fold_all(&fk.columns),
                options.fold(&fk.referenced_table),
                options.fold_all(&fk.referenced_columns),
            );
            (key, fk)
        })
        .collect()
}

fn foreign_key_identity(fk: &ForeignKey) -> String {
    format!(
        "{} -> {}{}",
        column_list(&fk.columns),
        fk.referenced_table,
        column_list(&fk.referenced_columns)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::DifferenceKind;
    use crate::model::{IndexOrigin, ReferentialAction};

    fn column(name: &str, data_type: &str, nullable: bool, ordinal: usize) -> Column {
        Column {
            name: name.to_string(),
            data_type: data_type.to_string(),
            nullable,
            default: None,
            computed: None,
            ordinal,
        }
    }

    fn books(columns: Vec<Column>) -> Table {
        let mut table = Table::new(None, "Books");
        table.columns = columns;
        table
    }

    fn index(name: Option<&str>, columns: &[&str], unique: bool) -> Index {
        Index {
            name: name.map(Into::into),
            synthesized_name: false,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique,
            origin: IndexOrigin::Index,
        }
    }

    fn author_fk(name: &str, on_delete: ReferentialAction) -> ForeignKey {
        ForeignKey {
            name: Some(name.to_string()),
            columns: vec!["AuthorId".into()],
            referenced_table: "Authors".into(),
            referenced_columns: vec!["AuthorId".into()],
            on_delete,
            on_update: ReferentialAction::NoAction,
        }
    }

    #[test]
    fn detects_extra_column() {
        let expected = books(vec![
            column("BookId", "int", false, 1),
            column("Title", "varchar", false, 2),
        ]);
        let actual = books(vec![
            column("BookId", "int", false, 1),
            column("Title", "varchar", false, 2),
            column("Price", "decimal", false, 3),
        ]);

        let diffs = diff_columns(&expected, &actual, &EngineOptions::default());
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DifferenceKind::Extra);
        assert_eq!(diffs[0].location.name.as_deref(), Some("Price"));
        assert_eq!(diffs[0].actual.as_deref(), Some("decimal"));
    }

    #[test]
    fn detects_missing_column() {
        let expected = books(vec![
            column("BookId", "int", false, 1),
            column("Title", "varchar", false, 2),
        ]);
        let actual = books(vec![column("BookId", "int", false, 1)]);

        let diffs = diff_columns(&expected, &actual, &EngineOptions::default());
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DifferenceKind::Missing);
    }

    #[test]
    fn column_names_match_case_insensitively_by_default() {
        let expected = books(vec![column("Title", "varchar", false, 1)]);
        let actual = books(vec![column("TITLE", "VARCHAR", false, 1)]);

        assert!(diff_columns(&expected, &actual, &EngineOptions::default()).is_empty());
        assert_eq!(
            diff_columns(&expected, &actual, &EngineOptions::new().case_sensitive()).len(),
            2
        );
    }

    #[test]
    fn detects_type_and_nullability_mismatch() {
        let expected = column("Title", "nvarchar(256)", false, 1);
        let actual = column("Title", "nvarchar(max)", true, 1);

        let diffs = compare_column("Books", &expected, &actual, &EngineOptions::default());
        assert_eq!(diffs.len(), 2);
        assert_eq!(diffs[0].location.attribute.as_deref(), Some("type"));
        assert_eq!(diffs[1].location.attribute.as_deref(), Some("nullable"));
        assert_eq!(diffs[1].expected.as_deref(), Some("NOT NULL"));
        assert_eq!(diffs[1].actual.as_deref(), Some("NULL"));
    }

    #[test]
    fn defaults_compare_after_normalization() {
        let mut expected = column("Rating", "int", false, 1);
        expected.default = Some("0".into());
        let mut actual = column("Rating", "int", false, 1);
        actual.default = Some("((0))".into());

        assert!(compare_column("Books", &expected, &actual, &EngineOptions::default()).is_empty());

        actual.default = Some("((5))".into());
        let diffs = compare_column("Books", &expected, &actual, &EngineOptions::default());
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].location.attribute.as_deref(), Some("default"));
    }

    #[test]
    fn missing_default_is_a_mismatch() {
        let mut expected = column("CreatedOn", "datetime2", false, 1);
        expected.default = Some("getutcdate()".into());
        let actual = column("CreatedOn", "datetime2", false, 1);

        let diffs = compare_column("Books", &expected, &actual, &EngineOptions::default());
        assert_eq!(diffs[0].actual.as_deref(), Some("<none>"));
    }

    #[test]
    fn column_order_only_compared_when_enabled() {
        let expected = column("Title", "text", false, 2);
        let actual = column("Title", "text", false, 5);

        assert!(compare_column("Books", &expected, &actual, &EngineOptions::default()).is_empty());

        let diffs = compare_column(
            "Books",
            &expected,
            &actual,
            &EngineOptions::new().compare_column_order(),
        );
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].severity, Severity::Warning);
    }

    #[test]
    fn detects_primary_key_column_mismatch() {
        let mut expected = books(vec![]);
        expected.primary_key = Some(PrimaryKey {
            name: Some("PK_Books".into()),
            columns: vec!["BookId".into()],
        });
        let mut actual = books(vec![]);
        actual.primary_key = Some(PrimaryKey {
            name: Some("PK_Books".into()),
            columns: vec!["BookId".into(), "Edition".into()],
        });

        let diffs = diff_primary_keys(&expected, &actual, &EngineOptions::default());
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].expected.as_deref(), Some("(BookId)"));
        assert_eq!(diffs[0].actual.as_deref(), Some("(BookId, Edition)"));
    }

    #[test]
    fn detects_missing_primary_key() {
        let mut expected = books(vec![]);
        expected.primary_key = Some(PrimaryKey {
            name: None,
            columns: vec!["BookId".into()],
        });

        let diffs = diff_primary_keys(&expected, &books(vec![]), &EngineOptions::default());
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DifferenceKind::Missing);
        assert_eq!(diffs[0].expected.as_deref(), Some("(BookId)"));
    }

    #[test]
    fn equivalent_indexes_with_different_names_match() {
        let mut expected = books(vec![]);
        expected.indexes = vec![index(Some("IX_Email"), &["Email"], true)];
        let mut actual = books(vec![]);
        actual.indexes = vec![index(Some("UQ_Users_Email"), &["Email"], true)];

        assert!(diff_indexes(&expected, &actual, &EngineOptions::default()).is_empty());

        let notes = diff_indexes(
            &expected,
            &actual,
            &EngineOptions::new().report_name_mismatches(),
        );
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, Severity::Info);
        assert_eq!(notes[0].location.attribute.as_deref(), Some("name"));
    }

    #[test]
    fn synthesized_names_never_produce_notes() {
        let mut expected = books(vec![]);
        let mut synthesized = index(Some("UX_Books_Email"), &["Email"], true);
        synthesized.synthesized_name = true;
        expected.indexes = vec![synthesized];
        let mut actual = books(vec![]);
        actual.indexes = vec![index(Some("UQ_Books_Email"), &["Email"], true)];

        let notes = diff_indexes(
            &expected,
            &actual,
            &EngineOptions::new().report_name_mismatches(),
        );
        assert!(notes.is_empty());
    }

    #[test]
    fn swapped_index_columns_are_a_structural_difference() {
        let mut expected = books(vec![]);
        expected.indexes = vec![index(Some("IX_AB"), &["A", "B"], false)];
        let mut actual = books(vec![]);
        actual.indexes = vec![index(Some("IX_AB"), &["B", "A"], false)];

        let diffs = diff_indexes(&expected, &actual, &EngineOptions::default());
        assert_eq!(diffs.len(), 2);
        assert_eq!(diffs[0].kind, DifferenceKind::Missing);
        assert_eq!(diffs[0].location.name.as_deref(), Some("(A, B)"));
        assert_eq!(diffs[1].kind, DifferenceKind::Extra);
        assert_eq!(diffs[1].location.name.as_deref(), Some("(B, A)"));
    }

    #[test]
    fn uniqueness_change_is_missing_plus_extra() {
        let mut expected = books(vec![]);
        expected.indexes = vec![index(Some("IX_Isbn"), &["Isbn"], true)];
        let mut actual = books(vec![]);
        actual.indexes = vec![index(Some("IX_Isbn"), &["Isbn"], false)];

        let diffs = diff_indexes(&expected, &actual, &EngineOptions::default());
        assert_eq!(diffs.len(), 2);
        assert_eq!(diffs[0].location.name.as_deref(), Some("unique (Isbn)"));
    }

    #[test]
    fn detects_foreign_key_delete_behavior_mismatch() {
        let mut expected = books(vec![]);
        expected.foreign_keys = vec![author_fk("FK_Books_Authors", ReferentialAction::Cascade)];
        let mut actual = books(vec![]);
        actual.foreign_keys = vec![author_fk("FK_Books_Authors", ReferentialAction::NoAction)];

        let diffs = diff_foreign_keys(&expected, &actual, &EngineOptions::default());
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].location.attribute.as_deref(), Some("on delete"));
        assert_eq!(diffs[0].expected.as_deref(), Some("CASCADE"));
        assert_eq!(diffs[0].actual.as_deref(), Some("NO ACTION"));
        assert_eq!(
            diffs[0].location.name.as_deref(),
            Some("(AuthorId) -> Authors(AuthorId)")
        );
    }

    #[test]
    fn foreign_keys_match_by_columns_not_name() {
        let mut expected = books(vec![]);
        expected.foreign_keys = vec![author_fk("FK_Books_Authors_AuthorId", ReferentialAction::NoAction)];
        let mut actual = books(vec![]);
        actual.foreign_keys = vec![author_fk("fk_books_author", ReferentialAction::NoAction)];

        assert!(diff_foreign_keys(&expected, &actual, &EngineOptions::default()).is_empty());
    }

    #[test]
    fn detects_missing_and_extra_foreign_keys() {
        let mut expected = books(vec![]);
        expected.foreign_keys = vec![author_fk("FK_Books_Authors", ReferentialAction::NoAction)];
        let mut actual = books(vec![]);
        let mut other = author_fk("FK_Books_Publishers", ReferentialAction::NoAction);
        other.columns = vec!["PublisherId".into()];
        other.referenced_table = "Publishers".into();
        other.referenced_columns = vec!["PublisherId".into()];
        actual.foreign_keys = vec![other];

        let diffs = diff_foreign_keys(&expected, &actual, &EngineOptions::default());
        assert_eq!(diffs.len(), 2);
        assert_eq!(diffs[0].kind, DifferenceKind::Missing);
        assert_eq!(diffs[1].kind, DifferenceKind::Extra);
        assert_eq!(diffs[1].actual.as_deref(), Some("FK_Books_Publishers"));
    }
}
