use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use rowtree_core::{PropertyMap, PropertyValue, Resource};
use rowtree_provider::{ProviderConfig, ProviderFactory};
use rowtree_sqlite::{PutOutcome, ResourceDataFactory};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Data source name used when the database is given on the command line.
const CLI_DATASOURCE: &str = "rowtree-cli";

/// CLI output format.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "rowtree")]
#[command(about = "Read and write SQL table rows as a resource tree")]
struct Cli {
    #[command(flatten)]
    target: TargetArgs,
    /// Output format for resources and status.
    #[arg(long, value_enum, default_value = "json", global = true)]
    format: CliOutputFormat,
    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct TargetArgs {
    /// Provider configuration YAML file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// SQLite database file (used with --root when no --config is given).
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Root path served by the provider.
    #[arg(long, global = true)]
    root: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the resource at a path.
    Get(PathArgs),
    /// Insert or overwrite the row at a path.
    Put(PutArgs),
    /// Delete the row at a path.
    Delete(PathArgs),
    /// List the child paths of a path.
    List(PathArgs),
    /// Show table existence and row counts.
    Status,
    /// Print the table-level resources served under the root.
    Tables,
}

#[derive(Debug, Args)]
struct PathArgs {
    /// Resource path, absolute or relative to the root.
    path: String,
}

#[derive(Debug, Args)]
struct PutArgs {
    /// Resource path of the row.
    path: String,
    /// Property to set (repeatable). Values that parse as integers are
    /// stored as integers.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,
    /// Properties as a JSON object; `--set` entries override it.
    #[arg(long)]
    json: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli);

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let filter_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<(), String> {
    let factory = open_provider(&cli.target)?;
    let provider = factory
        .resource_provider()
        .map_err(|e| format!("Failed to get resource provider: {e}"))?;

    let result = match cli.command {
        Command::Get(args) => run_get(&provider, &args.path, cli.format),
        Command::Put(args) => run_put(&provider, args),
        Command::Delete(args) => run_delete(&provider, &args.path),
        Command::List(args) => run_list(&provider, &args.path),
        Command::Status => run_status(&provider, cli.format),
        Command::Tables => run_tables(&provider, cli.format),
    };

    drop(provider);
    factory.deactivate();
    result
}

/// Builds the provider configuration from the command line, activates it,
/// and binds its data source.
fn open_provider(args: &TargetArgs) -> Result<ProviderFactory, String> {
    let config = match (&args.config, &args.db, &args.root) {
        (Some(path), _, _) => ProviderConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?,
        (None, Some(db), Some(root)) => {
            ProviderConfig::new(CLI_DATASOURCE, root.as_str()).with_database_path(db)
        }
        _ => return Err("either --config or both --db and --root are required".to_string()),
    };
    debug!(?config, "provider configuration");

    let source = Arc::new(config.data_source());
    let mut factory = ProviderFactory::activate(config)
        .map_err(|e| format!("Failed to activate provider: {e}"))?;
    factory
        .attach(source)
        .map_err(|e| format!("Failed to bind data source: {e}"))?;
    Ok(factory)
}

// ---------------------------------------------------------------------------
// commands
// ---------------------------------------------------------------------------

fn run_get(
    provider: &ResourceDataFactory,
    path: &str,
    format: CliOutputFormat,
) -> Result<(), String> {
    let resource = provider
        .get(path)
        .map_err(|e| format!("Failed to read '{path}': {e}"))?
        .ok_or_else(|| format!("not found: {path}"))?;
    println!("{}", render(&resource, format)?);
    Ok(())
}

fn run_put(provider: &ResourceDataFactory, args: PutArgs) -> Result<(), String> {
    let properties = build_properties(args.json.as_deref(), &args.set)?;
    let resource = Resource::record(args.path.as_str(), properties);
    let outcome = provider
        .put(&args.path, Some(&resource))
        .map_err(|e| format!("Failed to write '{}': {e}", args.path))?;
    report_outcome(&args.path, outcome)
}

fn run_delete(provider: &ResourceDataFactory, path: &str) -> Result<(), String> {
    let outcome = provider
        .put(path, None)
        .map_err(|e| format!("Failed to delete '{path}': {e}"))?;
    report_outcome(path, outcome)
}

fn run_list(provider: &ResourceDataFactory, path: &str) -> Result<(), String> {
    let children = provider
        .list_children(path)
        .map_err(|e| format!("Failed to list '{path}': {e}"))?;
    for child in children {
        println!("{child}");
    }
    Ok(())
}

fn run_status(provider: &ResourceDataFactory, format: CliOutputFormat) -> Result<(), String> {
    let status = provider
        .status()
        .map_err(|e| format!("Failed to get status: {e}"))?;
    println!("{}", render(&status, format)?);
    Ok(())
}

fn run_tables(provider: &ResourceDataFactory, format: CliOutputFormat) -> Result<(), String> {
    println!("{}", render(&provider.table_resources(), format)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn report_outcome(path: &str, outcome: PutOutcome) -> Result<(), String> {
    match outcome {
        PutOutcome::Stored => println!("stored {path}"),
        PutOutcome::Deleted => println!("deleted {path}"),
        PutOutcome::Rejected(reason) => return Err(format!("rejected: {reason}")),
    }
    Ok(())
}

/// Merges `--json` and `--set` inputs into one property map.
fn build_properties(json: Option<&str>, set: &[String]) -> Result<PropertyMap, String> {
    let mut properties: PropertyMap = match json {
        Some(text) => {
            serde_json::from_str(text).map_err(|e| format!("Invalid --json object: {e}"))?
        }
        None => PropertyMap::new(),
    };

    for entry in set {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| format!("Invalid --set '{entry}': expected KEY=VALUE"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("Invalid --set '{entry}': empty key"));
        }
        properties.insert(key.to_string(), parse_value(value));
    }

    Ok(properties)
}

fn parse_value(raw: &str) -> PropertyValue {
    match raw.parse::<i64>() {
        Ok(n) => PropertyValue::Integer(n),
        Err(_) => PropertyValue::String(raw.to_string()),
    }
}

fn render<T: Serialize>(value: &T, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => {
            serde_json::to_string_pretty(value).map_err(|e| format!("Failed to render JSON: {e}"))
        }
        CliOutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| format!("Failed to render YAML: {e}"))
        }
    }
}
