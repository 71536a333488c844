//! BasedDB CLI
//!
//! Command-line front end for a local BasedDB root directory.

use std::process::ExitCode;

use basedb::command::{Command, Outcome};
use basedb::config::{MissingDocumentPolicy, SyncStrategy};
use basedb::{BasedError, Config, Engine, FieldType, Fields, Result, TableDefinition};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

/// BasedDB CLI
#[derive(Parser, Debug)]
#[command(name = "basedb")]
#[command(about = "File-per-document storage engine")]
#[command(version)]
struct Args {
    /// Root directory (tables live under <root>/tables)
    #[arg(short, long, env = "BASED_DB_HOME", default_value = "./basedb_data")]
    root: String,

    /// When writes are pushed to disk
    #[arg(long, value_enum, default_value_t = SyncArg::OsBuffered)]
    sync: SyncArg,

    /// Leave out documents the primary index points at but that are missing
    #[arg(long)]
    skip_missing: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SyncArg {
    EveryWrite,
    OsBuffered,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create (or recreate) a table
    CreateTable {
        /// Table name
        name: String,

        /// Field declaration, `name:TYPE` (INT, STRING, DATE, DOUBLE, BOOLEAN)
        #[arg(short, long = "field")]
        fields: Vec<String>,

        /// Index declaration, `name` or `name:primary`
        #[arg(short, long = "index", required = true)]
        indices: Vec<String>,
    },

    /// Insert a row
    Insert {
        /// Table name
        table: String,

        /// Field values, `field=value`
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Print every document of a table, one JSON object per line
    List {
        /// Table name
        table: String,
    },

    /// Look a document up through an index
    Get {
        table: String,
        index: String,
        key: String,
    },

    /// Delete the documents an index maps a key to
    Delete {
        table: String,
        index: String,
        key: String,
    },

    /// Report dangling index entries and orphan documents
    Verify {
        /// Table name
        table: String,
    },

    /// Create the `people` sample table, insert three rows and list them
    Demo,
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,basedb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::debug!("BasedDB CLI v{}", basedb::VERSION);
    tracing::debug!("Root directory: {}", args.root);

    // Build config from args
    let config = Config::builder()
        .root_dir(&args.root)
        .sync_strategy(match args.sync {
            SyncArg::EveryWrite => SyncStrategy::EveryWrite,
            SyncArg::OsBuffered => SyncStrategy::OsBuffered,
        })
        .missing_documents(if args.skip_missing {
            MissingDocumentPolicy::Skip
        } else {
            MissingDocumentPolicy::Fail
        })
        .build();

    let engine = match Engine::open(config) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&engine, args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(engine: &Engine, command: Commands) -> Result<()> {
    let command = match command {
        Commands::CreateTable {
            name,
            fields,
            indices,
        } => Command::CreateTable {
            definition: parse_definition(name, &fields, &indices)?,
        },
        Commands::Insert { table, values } => Command::Insert {
            table,
            fields: parse_values(&values)?,
        },
        Commands::List { table } => Command::RetrieveAll { table },
        Commands::Get { table, index, key } => Command::Lookup { table, index, key },
        Commands::Delete { table, index, key } => Command::DeleteByIndex { table, index, key },
        Commands::Verify { table } => Command::Verify { table },
        Commands::Demo => return demo(engine),
    };

    print_outcome(engine.execute(command)?)
}

fn print_outcome(outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Created => println!("OK"),
        Outcome::Inserted { document } => println!("{}", document),
        Outcome::Documents(documents) => {
            if documents.is_empty() {
                println!("(empty)");
            }
            for document in documents {
                let line = serde_json::to_string(&document.fields)
                    .map_err(|e| BasedError::Serialization(e.to_string()))?;
                println!("{}", line);
            }
        }
        Outcome::Deleted { count } => println!("deleted {}", count),
        Outcome::Report(report) => {
            println!("table:     {}", report.table);
            println!("documents: {}", report.documents);
            for entry in &report.dangling_entries {
                println!("dangling:  {}:{} in index '{}'", entry.key, entry.document, entry.index);
            }
            for orphan in &report.orphan_documents {
                println!("orphan:    {}", orphan);
            }
            println!("status:    {}", if report.is_clean() { "clean" } else { "inconsistent" });
        }
    }
    Ok(())
}

fn demo(engine: &Engine) -> Result<()> {
    let definition = TableDefinition::new("people")
        .field("id", FieldType::Int)
        .field("name", FieldType::String)
        .field("date_of_birth", FieldType::Date)
        .primary_index("id");
    engine.create_table(&definition)?;

    for (id, name, dob) in [
        ("1", "John Doe", "2000-01-01"),
        ("2", "Jane Doe", "2001-01-01"),
        ("3", "Glenn Doe", "2002-01-01"),
    ] {
        let fields = Fields::from([
            ("id".to_string(), id.to_string()),
            ("name".to_string(), name.to_string()),
            ("date_of_birth".to_string(), dob.to_string()),
        ]);
        engine.insert("people", &fields)?;
    }

    print_outcome(Outcome::Documents(engine.retrieve_all("people")?))
}

// =============================================================================
// Argument Parsing
// =============================================================================

fn parse_definition(name: String, fields: &[String], indices: &[String]) -> Result<TableDefinition> {
    let mut definition = TableDefinition::new(name);

    for decl in fields {
        let (field, tag) = decl
            .split_once(':')
            .ok_or_else(|| BasedError::Config(format!("field '{}' must be name:TYPE", decl)))?;
        let data_type = FieldType::parse(tag)
            .ok_or_else(|| BasedError::Config(format!("unknown field type '{}'", tag)))?;
        definition = definition.field(field, data_type);
    }

    for decl in indices {
        definition = match decl.split_once(':') {
            None => definition.index(decl.as_str()),
            Some((index, "primary")) => definition.primary_index(index),
            Some((_, other)) => {
                return Err(BasedError::Config(format!(
                    "index flag '{}' is not recognised (expected 'primary')",
                    other
                )))
            }
        };
    }

    Ok(definition)
}

fn parse_values(values: &[String]) -> Result<Fields> {
    values
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| BasedError::Config(format!("value '{}' must be field=value", pair)))
        })
        .collect()
}
