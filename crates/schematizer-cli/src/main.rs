// crates/schematizer-cli/src/main.rs
// ============================================================================
// Module: Schematizer CLI Entry Point
// Description: Command dispatcher for schema registration and DDL conversion.
// Purpose: Provide an operator CLI over the schema repository.
// Dependencies: clap, schematizer-config, schematizer-core, schematizer-store-sqlite,
//               serde_jcs, thiserror, tracing-subscriber.
// ============================================================================

//! ## Overview
//! The Schematizer CLI loads `schematizer.toml`, opens the configured schema
//! store, and runs one repository operation per invocation. Results are
//! written to stdout as canonical JSON; errors go to stderr with a non-zero
//! exit status. File inputs are untrusted and read with hard size limits.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::num::NonZeroU64;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use schematizer_config::LoggingConfig;
use schematizer_config::SchematizerConfig;
use schematizer_config::StoreType;
use schematizer_config::config_toml_example;
use schematizer_core::AvroConverter;
use schematizer_core::InMemorySchemaStore;
use schematizer_core::RegisterSchemaFromDdlRequest;
use schematizer_core::RegisterSchemaRequest;
use schematizer_core::SchemaId;
use schematizer_core::SchemaKind;
use schematizer_core::SchemaRepository;
use schematizer_core::SharedSchemaStore;
use schematizer_core::SqlDialect;
use schematizer_core::UpdateSourceOwnerRequest;
use schematizer_core::convert_schema;
use schematizer_core::ddl::split_statements;
use schematizer_store_sqlite::SqliteSchemaStore;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Schema repository type used by the registry commands.
type Repository = SchemaRepository<SharedSchemaStore>;

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(
    name = "schematizer",
    version,
    about = "Register, convert, and inspect Avro schemas.",
    disable_help_subcommand = true
)]
struct Cli {
    /// Path to schematizer.toml (defaults to `SCHEMATIZER_CONFIG`, then ./schematizer.toml).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected command.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Register an Avro schema document.
    Register(RegisterCommand),
    /// Convert a DDL script to Avro and register the result.
    RegisterDdl(RegisterDdlCommand),
    /// Convert a DDL script to Avro without registering it.
    Convert(ConvertCommand),
    /// Show a schema by identifier.
    Get(SchemaIdCommand),
    /// List the schemas of a source in creation order.
    List(SourceArgs),
    /// Show the lineage chain of a schema, newest first.
    Lineage(SchemaIdCommand),
    /// Replace the owner email of an existing source.
    SetOwner(SetOwnerCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Namespace and source selection.
#[derive(Args, Debug, Clone)]
struct SourceArgs {
    /// Namespace name.
    #[arg(long)]
    namespace: String,
    /// Source name within the namespace.
    #[arg(long)]
    source: String,
}

/// Arguments for `register`.
#[derive(Args, Debug)]
struct RegisterCommand {
    /// Target namespace and source.
    #[command(flatten)]
    target: SourceArgs,
    /// Owner email applied when the source is new.
    #[arg(long, value_name = "EMAIL")]
    owner_email: String,
    /// Explicit lineage predecessor (defaults to the source's latest schema).
    #[arg(long, value_name = "ID")]
    base_schema_id: Option<NonZeroU64>,
    /// Path to the Avro schema JSON document.
    #[arg(long, value_name = "PATH")]
    schema_file: PathBuf,
}

/// Arguments for `register-ddl`.
#[derive(Args, Debug)]
struct RegisterDdlCommand {
    /// Target namespace and source.
    #[command(flatten)]
    target: SourceArgs,
    /// Owner email applied when the source is new.
    #[arg(long, value_name = "EMAIL")]
    owner_email: String,
    /// Explicit lineage predecessor (defaults to the source's latest schema).
    #[arg(long, value_name = "ID")]
    base_schema_id: Option<NonZeroU64>,
    /// Path to a DDL script (CREATE TABLE followed by ALTER TABLE statements).
    #[arg(long, value_name = "PATH")]
    ddl_file: PathBuf,
    /// SQL dialect of the script.
    #[arg(long, value_enum, default_value_t = DialectArg::Mysql)]
    dialect: DialectArg,
}

/// Arguments for `convert`.
#[derive(Args, Debug)]
struct ConvertCommand {
    /// Path to a DDL script.
    #[arg(long, value_name = "PATH")]
    ddl_file: PathBuf,
    /// Avro namespace for the produced record.
    #[arg(long)]
    namespace: Option<String>,
    /// SQL dialect of the script.
    #[arg(long, value_enum, default_value_t = DialectArg::Mysql)]
    dialect: DialectArg,
}

/// Arguments naming a single schema.
#[derive(Args, Debug)]
struct SchemaIdCommand {
    /// Schema identifier.
    #[arg(long, value_name = "ID")]
    schema_id: NonZeroU64,
}

/// Arguments for `set-owner`.
#[derive(Args, Debug)]
struct SetOwnerCommand {
    /// Target namespace and source.
    #[command(flatten)]
    target: SourceArgs,
    /// New owner email.
    #[arg(long, value_name = "EMAIL")]
    owner_email: String,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate the configuration file.
    Validate,
    /// Print an example configuration file.
    Example,
}

/// SQL dialects accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum DialectArg {
    /// MySQL / MariaDB DDL.
    Mysql,
}

impl From<DialectArg> for SqlDialect {
    fn from(value: DialectArg) -> Self {
        match value {
            DialectArg::Mysql => Self::MySql,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Message reported on stderr.
    message: String,
}

impl CliError {
    /// Creates a new CLI error.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// Result alias for CLI operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Parses arguments and dispatches the selected command.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();
    if let Commands::Config {
        command,
    } = &cli.command
    {
        return command_config(config_path, command);
    }

    let config = load_config(config_path)?;
    init_logging(&config.logging)?;
    let output = match &cli.command {
        Commands::Register(command) => command_register(&open_repository(&config)?, command)?,
        Commands::RegisterDdl(command) => {
            command_register_ddl(&open_repository(&config)?, command)?
        }
        Commands::Convert(command) => command_convert(&config, command)?,
        Commands::Get(command) => command_get(&open_repository(&config)?, command)?,
        Commands::List(command) => command_list(&open_repository(&config)?, command)?,
        Commands::Lineage(command) => command_lineage(&open_repository(&config)?, command)?,
        Commands::SetOwner(command) => command_set_owner(&open_repository(&config)?, command)?,
        Commands::Config {
            ..
        } => return Err(CliError::new("config commands do not open a store".to_string())),
    };
    write_json_value(&output)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Setup
// ============================================================================

/// Loads and validates configuration.
fn load_config(path: Option<&Path>) -> CliResult<SchematizerConfig> {
    SchematizerConfig::load(path).map_err(|err| CliError::new(err.to_string()))
}

/// Installs the stderr log subscriber; `RUST_LOG` overrides the config level.
fn init_logging(logging: &LoggingConfig) -> CliResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(logging.level.trim())
            .map_err(|err| CliError::new(format!("invalid logging level: {err}")))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| CliError::new(format!("failed to initialize logging: {err}")))
}

/// Opens the configured store and builds the repository.
fn open_repository(config: &SchematizerConfig) -> CliResult<Repository> {
    let store = match config.store.sqlite_config() {
        Some(sqlite) => {
            let store = SqliteSchemaStore::new(sqlite)
                .map_err(|err| CliError::new(format!("failed to open schema store: {err}")))?;
            SharedSchemaStore::from_store(store)
        }
        None => SharedSchemaStore::from_store(InMemorySchemaStore::new()),
    };
    debug!(store = store_label(config.store.store_type), "schema store opened");
    Ok(SchemaRepository::new(store, AvroConverter::default(), config.registry.limits()))
}

/// Returns the stable label for a store backend.
const fn store_label(store_type: StoreType) -> &'static str {
    match store_type {
        StoreType::Memory => "memory",
        StoreType::Sqlite => "sqlite",
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes `register`.
fn command_register(repository: &Repository, command: &RegisterCommand) -> CliResult<Value> {
    let schema = read_text_with_limit(
        &command.schema_file,
        "schema",
        repository_input_limit(repository),
    )?;
    let request = RegisterSchemaRequest {
        schema,
        namespace: command.target.namespace.clone(),
        source: command.target.source.clone(),
        source_owner_email: command.owner_email.clone(),
        base_schema_id: command.base_schema_id.map(SchemaId::new),
    };
    let record = repository.register(&request).map_err(|err| CliError::new(err.to_string()))?;
    to_json(&record)
}

/// Executes `register-ddl`.
fn command_register_ddl(
    repository: &Repository,
    command: &RegisterDdlCommand,
) -> CliResult<Value> {
    let dialect = SqlDialect::from(command.dialect);
    let script =
        read_text_with_limit(&command.ddl_file, "ddl", repository_input_limit(repository))?;
    let request = RegisterSchemaFromDdlRequest {
        ddl_statements: split_script(&script, dialect)?,
        dialect,
        namespace: command.target.namespace.clone(),
        source: command.target.source.clone(),
        source_owner_email: command.owner_email.clone(),
        base_schema_id: command.base_schema_id.map(SchemaId::new),
    };
    let record =
        repository.register_from_ddl(&request).map_err(|err| CliError::new(err.to_string()))?;
    to_json(&record)
}

/// Executes `convert`.
fn command_convert(config: &SchematizerConfig, command: &ConvertCommand) -> CliResult<Value> {
    let dialect = SqlDialect::from(command.dialect);
    let script =
        read_text_with_limit(&command.ddl_file, "ddl", config.registry.max_schema_bytes)?;
    let statements = split_script(&script, dialect)?;
    let from = match dialect {
        SqlDialect::MySql => SchemaKind::MySql,
    };
    convert_schema(from, SchemaKind::Avro, &statements, command.namespace.as_deref())
        .map_err(|err| CliError::new(err.to_string()))
}

/// Executes `get`.
fn command_get(repository: &Repository, command: &SchemaIdCommand) -> CliResult<Value> {
    let record = repository
        .get_schema(SchemaId::new(command.schema_id))
        .map_err(|err| CliError::new(err.to_string()))?;
    to_json(&record)
}

/// Executes `list`.
fn command_list(repository: &Repository, command: &SourceArgs) -> CliResult<Value> {
    let records = repository
        .list_schemas(&command.namespace, &command.source)
        .map_err(|err| CliError::new(err.to_string()))?;
    to_json(&records)
}

/// Executes `lineage`.
fn command_lineage(repository: &Repository, command: &SchemaIdCommand) -> CliResult<Value> {
    let chain = repository
        .lineage(SchemaId::new(command.schema_id))
        .map_err(|err| CliError::new(err.to_string()))?;
    to_json(&chain)
}

/// Executes `set-owner`.
fn command_set_owner(repository: &Repository, command: &SetOwnerCommand) -> CliResult<Value> {
    let request = UpdateSourceOwnerRequest {
        namespace: command.target.namespace.clone(),
        source: command.target.source.clone(),
        source_owner_email: command.owner_email.clone(),
    };
    let record =
        repository.update_source_owner(&request).map_err(|err| CliError::new(err.to_string()))?;
    to_json(&record)
}

/// Executes config subcommands.
fn command_config(path: Option<&Path>, command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate => {
            let config = load_config(path)?;
            write_json_value(&json!({
                "status": "valid",
                "store": store_label(config.store.store_type),
                "max_schema_bytes": config.registry.max_schema_bytes,
            }))?;
        }
        ConfigCommand::Example => {
            write_stdout_bytes(config_toml_example().as_bytes())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Reads a UTF-8 input file with a size limit.
fn read_text_with_limit(path: &Path, kind: &str, max_bytes: usize) -> CliResult<String> {
    let bytes = read_bytes_with_limit(path, max_bytes).map_err(|err| match err {
        ReadLimitError::Io(err) => {
            CliError::new(format!("failed to read {kind} file {}: {err}", path.display()))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(format!(
            "{kind} file {} is {size} bytes, exceeding the {limit} byte limit",
            path.display()
        )),
    })?;
    String::from_utf8(bytes)
        .map_err(|_| CliError::new(format!("{kind} file {} is not utf-8", path.display())))
}

/// Returns the input read limit configured on the repository.
const fn repository_input_limit(repository: &Repository) -> usize {
    repository.limits().max_schema_bytes
}

/// Splits a DDL script into statements.
fn split_script(script: &str, dialect: SqlDialect) -> CliResult<Vec<String>> {
    let statements =
        split_statements(script, dialect).map_err(|err| CliError::new(err.to_string()))?;
    if statements.is_empty() {
        return Err(CliError::new("ddl script contains no statements".to_string()));
    }
    Ok(statements)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Serializes a value to JSON.
fn to_json<T: Serialize>(value: &T) -> CliResult<Value> {
    serde_json::to_value(value)
        .map_err(|err| CliError::new(format!("failed to serialize output: {err}")))
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes canonical JSON to stdout followed by a newline.
fn write_json_value(value: &Value) -> CliResult<()> {
    let mut bytes = serde_jcs::to_vec(value)
        .map_err(|err| CliError::new(format!("failed to encode output: {err}")))?;
    bytes.push(b'\n');
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream failure.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
