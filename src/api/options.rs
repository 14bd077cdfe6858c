use crate::options::{EngineOptions, ExtraTablePolicy};

/// Options for comparing an expected (model) schema against an actual
/// (database) schema.
#[derive(Debug, Clone, Default)]
pub struct CompareOptions {
    /// Sources describing the model, e.g. `json:model.json`
    pub expected_sources: Vec<String>,
    /// Sources describing the live database
    pub actual_sources: Vec<String>,
    /// Matching and severity rules
    pub engine: EngineOptions,
    /// Table glob patterns to include (empty = all)
    pub include: Vec<String>,
    /// Table glob patterns to exclude
    pub exclude: Vec<String>,
}

impl CompareOptions {
    /// Create new compare options with required fields.
    pub fn new(expected_sources: Vec<String>, actual_sources: Vec<String>) -> Self {
        Self {
            expected_sources,
            actual_sources,
            ..Default::default()
        }
    }

    /// Replace the engine options wholesale.
    pub fn with_engine(mut self, engine: EngineOptions) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_extra_tables(mut self, policy: ExtraTablePolicy) -> Self {
        self.engine.extra_tables = policy;
        self
    }

    pub fn case_sensitive(mut self) -> Self {
        self.engine.case_sensitive = true;
        self
    }

    pub fn report_name_mismatches(mut self) -> Self {
        self.engine.report_name_mismatches = true;
        self
    }

    pub fn compare_column_order(mut self) -> Self {
        self.engine.compare_column_order = true;
        self
    }

    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.engine.default_schema = Some(schema.into());
        self
    }

    /// Set table include patterns.
    pub fn with_include(mut self, patterns: Vec<String>) -> Self {
        self.include = patterns;
        self
    }

    /// Set table exclude patterns.
    pub fn with_exclude(mut self, patterns: Vec<String>) -> Self {
        self.exclude = patterns;
        self
    }
}

/// Options for building a single normalized snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotOptions {
    pub sources: Vec<String>,
    pub engine: EngineOptions,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl SnapshotOptions {
    pub fn new(sources: Vec<String>) -> Self {
        Self {
            sources,
            ..Default::default()
        }
    }

    pub fn with_engine(mut self, engine: EngineOptions) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_include(mut self, patterns: Vec<String>) -> Self {
        self.include = patterns;
        self
    }

    pub fn with_exclude(mut self, patterns: Vec<String>) -> Self {
        self.exclude = patterns;
        self
    }
}
