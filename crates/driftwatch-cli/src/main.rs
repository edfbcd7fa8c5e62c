use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs::File;
use std::path::{Path, PathBuf};

use driftwatch_catalog::{SnowflakeCatalog, WarehouseAdapter};
use driftwatch_core::{ColumnDescriptor, Config, DriftReport, TableRef};
use driftwatch_engine::diff;
use driftwatch_ingest::infer_file_schema;
use driftwatch_router::{approval_request, MemoryHistory, MemorySink, Notifier, Router, WebhookNotifier};

/// Driftwatch - schema drift detection for warehouse ingestion
#[derive(Parser)]
#[command(name = "driftwatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: driftwatch.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare an incoming CSV file against a warehouse table
    Detect {
        /// Incoming CSV file
        #[arg(short, long)]
        file: PathBuf,

        /// Table name to compare against
        #[arg(short, long)]
        table: String,

        /// JSON column listing to use instead of querying the warehouse
        #[arg(long)]
        current_schema: Option<PathBuf>,

        /// Output file for the drift report
        #[arg(short, long, default_value = "drift-report.json")]
        output: PathBuf,
    },

    /// Render DDL plans and approval routing for a drift report
    Plan {
        /// Drift report produced by `detect`
        #[arg(short, long, default_value = "drift-report.json")]
        report: PathBuf,

        /// Post approval requests to the configured webhook
        #[arg(long)]
        send: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new("driftwatch.toml").exists() {
        Config::from_file(Path::new("driftwatch.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    match cli.command {
        Commands::Detect {
            file,
            table,
            current_schema,
            output,
        } => cmd_detect(&config, &file, &table, current_schema.as_deref(), &output).await,
        Commands::Plan { report, send } => cmd_plan(&config, &report, send).await,
    }
}

async fn cmd_detect(
    config: &Config,
    file: &Path,
    table: &str,
    current_schema: Option<&Path>,
    output: &Path,
) -> Result<()> {
    if config.monitor.database.is_empty() || config.monitor.schema.is_empty() {
        bail!("monitor.database and monitor.schema must be set in driftwatch.toml");
    }
    if !config.monitor.tables.is_empty() && !config.monitors(table) {
        eprintln!(
            "{}",
            format!("warning: table {} is not on the monitored list", table).yellow()
        );
    }

    let table_ref = TableRef::new(&config.monitor.database, &config.monitor.schema, table);

    let reader = File::open(file).with_context(|| format!("cannot open {}", file.display()))?;
    let incoming = infer_file_schema(reader)?;

    let current = match current_schema {
        Some(path) => load_column_listing(path)?,
        None => fetch_from_warehouse(config, &table_ref).await?,
    };

    let now = chrono::Utc::now();
    let changes = diff(&current, &incoming, &table_ref, now)?;
    let report = DriftReport::new(table_ref.clone(), now.to_rfc3339(), changes);

    report
        .save_to_file(output)
        .with_context(|| format!("cannot write {}", output.display()))?;

    if report.has_changes() {
        println!(
            "{} {} change(s) detected for {}",
            "drift:".red().bold(),
            report.summary.total,
            table_ref.fqn()
        );
        for change in &report.changes {
            println!("  {}", driftwatch_router::change_summary(change));
        }
        println!("report written to {}", output.display());
    } else {
        println!(
            "{} no schema changes for {}",
            "ok:".green().bold(),
            table_ref.fqn()
        );
    }

    Ok(())
}

async fn cmd_plan(config: &Config, report_path: &Path, send: bool) -> Result<()> {
    let report = DriftReport::from_file(report_path)
        .with_context(|| format!("cannot read {}", report_path.display()))?;

    let router = Router::new(MemoryHistory::new(), MemorySink::new());
    let plans = router.route(&report).await?;

    if plans.is_empty() {
        println!("{} nothing to plan, data can load normally", "ok:".green().bold());
        return Ok(());
    }

    for stored in &plans {
        let heading = if stored.plan.requires_approval {
            format!("{} (approval required)", stored.plan.table.fqn()).yellow()
        } else {
            format!("{} (auto-deploy)", stored.plan.table.fqn()).green()
        };
        println!("{}", heading.bold());
        print!("{}", stored.plan.script());
        println!();
    }

    if send {
        let Some(webhook_url) = &config.notify.webhook_url else {
            bail!("--send requires notify.webhook_url in the config");
        };
        let notifier = WebhookNotifier::new(webhook_url);
        for stored in plans.iter().filter(|p| p.plan.requires_approval) {
            let message = approval_request(stored)?;
            notifier.send(&message).await?;
            println!("approval request sent for {}", stored.plan.table.fqn());
        }
    }

    Ok(())
}

fn load_column_listing(path: &Path) -> Result<Vec<ColumnDescriptor>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("invalid column listing in {}", path.display()))
}

async fn fetch_from_warehouse(config: &Config, table: &TableRef) -> Result<Vec<ColumnDescriptor>> {
    let password = std::env::var("DRIFTWATCH_PASSWORD")
        .context("DRIFTWATCH_PASSWORD is not set (or pass --current-schema)")?;

    let mut builder = SnowflakeCatalog::with_password(
        &config.warehouse.account,
        &config.warehouse.user,
        password,
    )
    .with_database(&config.warehouse.database);

    if let Some(warehouse) = &config.warehouse.warehouse {
        builder = builder.with_warehouse(warehouse);
    }
    if let Some(role) = &config.warehouse.role {
        builder = builder.with_role(role);
    }

    let catalog = builder.build()?;
    let columns = catalog.fetch_columns(table).await?;
    Ok(columns)
}
