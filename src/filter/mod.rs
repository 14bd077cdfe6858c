use glob::{MatchOptions, Pattern};

use crate::model::Snapshot;

/// Table include/exclude filter over glob patterns.
///
/// A pattern matches either the qualified name (`dbo.Books`) or the bare
/// table name (`Books`). Exclusion wins over inclusion; an empty include list
/// includes everything.
#[derive(Debug, Clone)]
pub struct Filter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    match_options: MatchOptions,
}

impl Filter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, glob::PatternError> {
        let include_patterns = include
            .iter()
            .map(|s| Pattern::new(s))
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_patterns = exclude
            .iter()
            .map(|s| Pattern::new(s))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Filter {
            include: include_patterns,
            exclude: exclude_patterns,
            match_options: MatchOptions {
                case_sensitive: false,
                ..MatchOptions::new()
            },
        })
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.match_options.case_sensitive = case_sensitive;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    pub fn should_include(&self, name: &str) -> bool {
        self.should_include_with_both(name, name)
    }

    pub fn should_include_with_both(&self, qualified_name: &str, unqualified_name: &str) -> bool {
        let matches = |pattern: &Pattern| {
            pattern.matches_with(qualified_name, self.match_options)
                || pattern.matches_with(unqualified_name, self.match_options)
        };

        if self.exclude.iter().any(matches) {
            return false;
        }

        self.include.is_empty() || self.include.iter().any(matches)
    }
}

/// Keeps the tables (and the source issues attached to them) that pass the
/// filter. Schema-level issues are always kept.
pub fn filter_snapshot(snapshot: &Snapshot, filter: &Filter) -> Snapshot {
    let tables = snapshot
        .tables
        .iter()
        .filter(|(_, table)| filter.should_include_with_both(&table.qualified_name(), &table.name))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let issues = snapshot
        .issues
        .iter()
        .filter(|issue| match &issue.table {
            Some(table) => {
                let bare = table.rsplit('.').next().unwrap_or(table);
                filter.should_include_with_both(table, bare)
            }
            None => true,
        })
        .cloned()
        .collect();

    Snapshot {
        side: snapshot.side,
        tables,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementKind, Side, SourceIssue, Table};

    fn snapshot(tables: &[(Option<&str>, &str)]) -> Snapshot {
        let mut snapshot = Snapshot::new(Side::Actual);
        for (schema, name) in tables {
            let table = Table::new(schema.map(Into::into), *name);
            snapshot
                .tables
                .insert(table.qualified_name().to_lowercase(), table);
        }
        snapshot
    }

    #[test]
    fn empty_filter_includes_everything() {
        let filter = Filter::new(&[], &[]).unwrap();
        assert!(filter.is_empty());
        assert!(filter.should_include("Books"));
    }

    #[test]
    fn include_patterns() {
        let filter = Filter::new(&["Book*".into()], &[]).unwrap();
        assert!(filter.should_include("Books"));
        assert!(filter.should_include("BookTags"));
        assert!(!filter.should_include("Authors"));
    }

    #[test]
    fn exclude_wins_over_include() {
        let filter = Filter::new(&["*".into()], &["*_archive".into()]).unwrap();
        assert!(filter.should_include("Orders"));
        assert!(!filter.should_include("Orders_archive"));
    }

    #[test]
    fn matches_qualified_or_bare_name() {
        let filter = Filter::new(&["audit.*".into()], &[]).unwrap();
        assert!(filter.should_include_with_both("audit.Events", "Events"));
        assert!(!filter.should_include_with_both("dbo.Events", "Events"));

        let bare = Filter::new(&["Events".into()], &[]).unwrap();
        assert!(bare.should_include_with_both("audit.Events", "Events"));
    }

    #[test]
    fn matching_is_case_insensitive_unless_requested() {
        let filter = Filter::new(&["books".into()], &[]).unwrap();
        assert!(filter.should_include("Books"));
        assert!(!filter.case_sensitive(true).should_include("Books"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(Filter::new(&["[".into()], &[]).is_err());
    }

    #[test]
    fn filter_snapshot_drops_tables_and_their_issues() {
        let mut snapshot = snapshot(&[(Some("dbo"), "Books"), (Some("staging"), "Import")]);
        snapshot.issues.push(SourceIssue {
            side: Side::Actual,
            table: Some("staging.Import".into()),
            element: ElementKind::Feature,
            name: "trigger".into(),
            reason: "triggers are not supported".into(),
        });
        snapshot.issues.push(SourceIssue {
            side: Side::Actual,
            table: None,
            element: ElementKind::Feature,
            name: "OrderNumbers".into(),
            reason: "sequences are not supported".into(),
        });

        let filter = Filter::new(&[], &["staging.*".into()]).unwrap();
        let filtered = filter_snapshot(&snapshot, &filter);

        assert_eq!(filtered.tables.len(), 1);
        assert!(filtered.tables.contains_key("dbo.books"));
        assert_eq!(filtered.issues.len(), 1);
        assert_eq!(filtered.issues[0].table, None);
    }
}
