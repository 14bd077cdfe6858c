use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::process::ExitCode;

use schemacompare::api::{self, CompareOptions, SnapshotOptions};
use schemacompare::logging::init_logging;
use schemacompare::options::{EngineOptions, ExtraTablePolicy};

pub const EXIT_VALID: u8 = 0;
pub const EXIT_INVALID: u8 = 1;

#[derive(Parser)]
#[command(name = "schemacompare")]
#[command(
    about = "Verify a code-first database model against the live database schema",
    long_about = None,
    version
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, env = "SCHEMACOMPARE_QUIET")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the expected model against the actual database schema
    Compare {
        /// Expected (model) schema sources, e.g. json:model.json
        #[arg(long, required = true, num_args = 1.., value_delimiter = ',', env = "SCHEMACOMPARE_EXPECTED")]
        expected: Vec<String>,

        /// Actual (database) schema sources
        #[arg(long, required = true, num_args = 1.., value_delimiter = ',', env = "SCHEMACOMPARE_ACTUAL")]
        actual: Vec<String>,

        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text, env = "SCHEMACOMPARE_FORMAT")]
        format: OutputFormat,

        #[command(flatten)]
        scope: ScopeArgs,

        /// Severity of tables that exist only in the database: error, warning or ignore
        #[arg(long, default_value_t = ExtraTablePolicy::Error, env = "SCHEMACOMPARE_EXTRA_TABLES")]
        extra_tables: ExtraTablePolicy,

        /// Report informational notes for equivalent elements with different names
        #[arg(long, env = "SCHEMACOMPARE_NAME_NOTES")]
        name_notes: bool,

        /// Report columns whose ordinal position differs
        #[arg(long, env = "SCHEMACOMPARE_COLUMN_ORDER")]
        column_order: bool,
    },

    /// Print the normalized snapshot of a schema source as JSON
    Snapshot {
        /// Schema sources to load
        #[arg(long, required = true, num_args = 1.., value_delimiter = ',')]
        source: Vec<String>,

        #[command(flatten)]
        scope: ScopeArgs,
    },
}

#[derive(Args)]
struct ScopeArgs {
    /// Only compare tables matching these glob patterns
    #[arg(long, num_args = 1.., value_delimiter = ',', env = "SCHEMACOMPARE_INCLUDE")]
    include: Vec<String>,

    /// Skip tables matching these glob patterns
    #[arg(long, num_args = 1.., value_delimiter = ',', env = "SCHEMACOMPARE_EXCLUDE")]
    exclude: Vec<String>,

    /// Compare identifiers case-sensitively
    #[arg(long, env = "SCHEMACOMPARE_CASE_SENSITIVE")]
    case_sensitive: bool,

    /// Schema assumed for tables declared without one
    #[arg(long, env = "SCHEMACOMPARE_DEFAULT_SCHEMA")]
    default_schema: Option<String>,
}

impl ScopeArgs {
    fn engine(&self) -> EngineOptions {
        let mut engine = EngineOptions::new();
        if self.case_sensitive {
            engine = engine.case_sensitive();
        }
        if let Some(schema) = &self.default_schema {
            engine = engine.with_default_schema(schema);
        }
        engine
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet)?;

    match cli.command {
        Commands::Compare {
            expected,
            actual,
            format,
            scope,
            extra_tables,
            name_notes,
            column_order,
        } => {
            let mut engine = scope.engine().with_extra_tables(extra_tables);
            if name_notes {
                engine = engine.report_name_mismatches();
            }
            if column_order {
                engine = engine.compare_column_order();
            }

            let options = CompareOptions::new(expected, actual)
                .with_engine(engine)
                .with_include(scope.include)
                .with_exclude(scope.exclude);
            let result = api::compare(&options)?;

            match format {
                OutputFormat::Text => print!("{}", result.comparison.render_text()),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&result)
                        .context("Failed to serialize comparison result")?
                ),
            }

            let code = if result.is_valid() {
                EXIT_VALID
            } else {
                EXIT_INVALID
            };
            Ok(ExitCode::from(code))
        }
        Commands::Snapshot { source, scope } => {
            let options = SnapshotOptions::new(source)
                .with_engine(scope.engine())
                .with_include(scope.include)
                .with_exclude(scope.exclude);
            let result = api::snapshot(&options)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&result).context("Failed to serialize snapshot")?
            );
            Ok(ExitCode::from(EXIT_VALID))
        }
    }
}
