#![allow(dead_code, unused_imports)]

pub use schemacompare::prelude::*;
pub use schemacompare::source::{SourceColumn, SourceFeature, SourceForeignKey};
pub use std::io::Write;
pub use tempfile;
pub use tempfile::NamedTempFile;

pub fn schema(tables: Vec<SourceTable>) -> SourceSchema {
    SourceSchema {
        tables,
        unsupported: Vec::new(),
    }
}

/// `Books(BookId int PK, Title nvarchar(200))` plus optional extra columns.
pub fn books(extra: &[(&str, &str)]) -> SourceTable {
    let mut table = SourceTable::new("Books")
        .column("BookId", "int", false)
        .column("Title", "nvarchar(200)", false)
        .primary_key(Some("PK_Books"), &["BookId"]);
    for (name, data_type) in extra {
        table = table.column(name, data_type, false);
    }
    table
}

pub fn authors() -> SourceTable {
    SourceTable::new("Authors")
        .column("AuthorId", "int", false)
        .column("Name", "nvarchar(100)", false)
        .primary_key(Some("PK_Authors"), &["AuthorId"])
}

pub fn users() -> SourceTable {
    SourceTable::new("Users")
        .column("UserId", "int", false)
        .column("Email", "nvarchar(256)", false)
        .primary_key(Some("PK_Users"), &["UserId"])
}

pub fn compare_default(expected: &SourceSchema, actual: &SourceSchema) -> ComparisonResult {
    compare_schemas(expected, actual, &EngineOptions::default()).unwrap()
}

pub fn write_schema(schema: &SourceSchema) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(serde_json::to_string_pretty(schema).unwrap().as_bytes())
        .unwrap();
    file.flush().unwrap();
    file
}

pub fn source_arg(file: &NamedTempFile) -> String {
    format!("json:{}", file.path().display())
}
