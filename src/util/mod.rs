use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static SPACE_AROUND_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*([(),])\s*").unwrap());

pub fn normalize_sql_whitespace(sql: &str) -> String {
    WHITESPACE.replace_all(sql.trim(), " ").to_string()
}

/// Normalizes a declared column type so that `DECIMAL(18, 2)` and
/// `decimal(18,2)` compare equal.
pub fn normalize_type(data_type: &str) -> String {
    let collapsed = normalize_sql_whitespace(data_type).to_lowercase();
    SPACE_AROUND_PUNCT.replace_all(&collapsed, "$1").to_string()
}

/// Normalizes a default or computed-column SQL expression.
///
/// Catalogs tend to wrap stored expressions in redundant parentheses
/// (`((0))`, `(getdate())`) while model configuration holds the bare
/// expression. Keywords and function names are compared case-insensitively;
/// the contents of string literals are left untouched.
pub fn normalize_expression(expr: &str) -> String {
    let mut result = normalize_sql_whitespace(expr);
    loop {
        let stripped = strip_wrapping_parens(&result);
        if stripped.len() == result.len() {
            break;
        }
        result = stripped.trim().to_string();
    }
    let result = SPACE_AROUND_PUNCT.replace_all(&result, "$1");
    lowercase_outside_literals(&result)
}

pub fn optional_expressions_equal(from: &Option<String>, to: &Option<String>) -> bool {
    match (from, to) {
        (None, None) => true,
        (Some(a), Some(b)) => normalize_expression(a) == normalize_expression(b),
        _ => false,
    }
}

/// Returns the inner text when the whole expression is enclosed by one
/// matching pair of parentheses, otherwise the input unchanged.
fn strip_wrapping_parens(expr: &str) -> &str {
    let bytes = expr.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'(' || bytes[bytes.len() - 1] != b')' {
        return expr;
    }

    let mut depth = 0usize;
    let mut in_literal = false;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'\'' => in_literal = !in_literal,
            b'(' if !in_literal => depth += 1,
            b')' if !in_literal => {
                depth = depth.saturating_sub(1);
                // The opening paren closes before the end: `(a) + (b)`.
                if depth == 0 && i != bytes.len() - 1 {
                    return expr;
                }
            }
            _ => {}
        }
    }

    if depth == 0 && !in_literal {
        &expr[1..expr.len() - 1]
    } else {
        expr
    }
}

fn lowercase_outside_literals(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len());
    let mut in_literal = false;
    for c in expr.chars() {
        if c == '\'' {
            in_literal = !in_literal;
            out.push(c);
        } else if in_literal {
            out.push(c);
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// Errors raised when a schema source cannot be turned into a snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("Failed to read schema source {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse schema source {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid schema source: {0}")]
    InvalidSource(String),

    #[error("Table \"{table}\" is declared by both {first} and {second}")]
    DuplicateSource {
        table: String,
        first: String,
        second: String,
    },

    #[error("Blank {element} name in {context}")]
    BlankName {
        element: &'static str,
        context: String,
    },

    #[error("Duplicate table \"{0}\"")]
    DuplicateTable(String),

    #[error("Duplicate column \"{column}\" in table \"{table}\"")]
    DuplicateColumn { table: String, column: String },

    #[error("Foreign key {foreign_key} on \"{table}\" references unknown table \"{referenced}\"")]
    UnknownReferencedTable {
        table: String,
        foreign_key: String,
        referenced: String,
    },
}

pub type Result<T> = std::result::Result<T, AdapterError>;
