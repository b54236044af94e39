#![forbid(unsafe_code)]

//! a2am — Assistants-to-Agents Migrator.
//!
//! CLI entry point: parses arguments, dispatches subcommands, renders output.

use std::path::PathBuf;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use a2am::auth::{self, CredentialSource};
use a2am::clients::agents::AgentsClient;
use a2am::clients::assistants::AssistantsClient;
use a2am::config::{Config, ProjectConfig, optional_env};
use a2am::migrate::{self, MigrateOptions, MigrationReport};

/// Assistants-to-Agents Migrator — copy Azure OpenAI assistants and
/// threads into the Azure AI Agent Service.
///
/// Reads configuration from the environment (a `.env` file in the working
/// directory is honored) and migrates sequentially, backing up every
/// fetched resource to local JSON first.
#[derive(Parser, Debug)]
#[command(
    name = "a2am",
    version = long_version(),
    about,
    long_about = None,
)]
struct Cli {
    /// Show detailed migration progress.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show everything including per-request details.
    #[arg(long, global = true)]
    trace: bool,

    /// Output the migration report as JSON for machine consumption.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Migrate assistants to Agent Service agents.
    Agents {
        #[command(flatten)]
        args: MigrationArgs,
    },

    /// Migrate threads (messages are summarized into the new thread).
    Threads {
        #[command(flatten)]
        args: MigrationArgs,
    },

    /// Offline preflight: report configuration and credential status.
    Check,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for (bash, zsh, fish).
        shell: String,
    },
}

#[derive(clap::Args, Debug)]
struct MigrationArgs {
    /// Show what would happen without creating anything.
    #[arg(long)]
    dry_run: bool,

    /// Migrate at most this many resources.
    #[arg(long)]
    limit: Option<usize>,

    /// Skip local JSON backups.
    #[arg(long)]
    no_backup: bool,

    /// Directory for backup files.
    #[arg(long, default_value = "backup")]
    backup_dir: PathBuf,

    /// Delay in milliseconds between destination create calls.
    #[arg(long, default_value = "1000")]
    pace_ms: u64,
}

impl MigrationArgs {
    fn to_options(&self) -> MigrateOptions {
        MigrateOptions {
            dry_run: self.dry_run,
            limit: self.limit,
            backup: !self.no_backup,
            backup_dir: self.backup_dir.clone(),
            pace: Duration::from_millis(self.pace_ms),
        }
    }
}

/// Build the long version string with embedded build metadata.
///
/// vergen-gix always emits these env vars (uses placeholders when values are
/// unavailable), so `env!()` is safe here.
fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("VERGEN_GIT_SHA"),
        " ",
        env!("VERGEN_BUILD_TIMESTAMP"),
        " ",
        env!("VERGEN_CARGO_TARGET_TRIPLE"),
        ")",
    )
}

/// Initialize the tracing subscriber based on CLI flags.
///
/// Priority: `--trace` > `--verbose` > `RUST_LOG` env var > default (warn).
fn init_tracing(cli: &Cli) {
    let filter = if cli.trace {
        EnvFilter::new("a2am=trace")
    } else if cli.verbose {
        EnvFilter::new("a2am=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli);

    let json = cli.json;
    let result = match cli.command {
        Command::Agents { ref args } => run_migration(Resource::Agents, args, json),
        Command::Threads { ref args } => run_migration(Resource::Threads, args, json),
        Command::Check => run_check(json),
        Command::Completions { ref shell } => run_completions(shell),
    };

    if let Err(e) = result {
        eprintln!("{} {e:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[derive(Debug, Clone, Copy)]
enum Resource {
    Agents,
    Threads,
}

fn run_migration(resource: Resource, args: &MigrationArgs, json: bool) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let source = AssistantsClient::new(&config.source);

    // Dry runs never touch the destination, so skip token acquisition.
    let token = if args.dry_run {
        String::new()
    } else {
        auth::acquire_token()?
    };
    let dest = AgentsClient::new(&config.agents_endpoint, token);

    let opts = args.to_options();
    let report = match resource {
        Resource::Agents => {
            migrate::migrate_agents(&source, &dest, &config.model_deployment, &opts)?
        }
        Resource::Threads => {
            migrate::migrate_threads(&source, &dest, &config.model_deployment, &opts)?
        }
    };

    render_report(&report, json)
}

fn render_report(report: &MigrationReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Migrated:".green().bold(),
        report.migrated.len()
    );
    for item in &report.migrated {
        println!("  {} -> {}", item.source_id, item.dest_id);
    }
    if !report.planned.is_empty() {
        println!(
            "{} {}",
            "Planned (dry run):".cyan().bold(),
            report.planned.len()
        );
        for id in &report.planned {
            println!("  {id}");
        }
    }
    if !report.skipped.is_empty() {
        println!("{} {}", "Skipped:".yellow().bold(), report.skipped.len());
        for item in &report.skipped {
            println!("  {}: {}", item.id, item.reason);
        }
    }
    if !report.failed.is_empty() {
        println!("{} {}", "Failed:".red().bold(), report.failed.len());
        for item in &report.failed {
            println!("  {}: {}", item.id, item.error);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CheckReport {
    variables: Vec<VarCheck>,
    agents_endpoint: Option<String>,
    connection_string_error: Option<String>,
    credential_source: &'static str,
    ok: bool,
}

#[derive(Debug, Serialize)]
struct VarCheck {
    name: &'static str,
    set: bool,
}

fn run_check(json: bool) -> anyhow::Result<()> {
    const REQUIRED_VARS: [&str; 4] = [
        "AZURE_OPENAI_API_KEY",
        "AZURE_OPENAI_ENDPOINT",
        "OPENAI_API_VERSION",
        "MODEL_DEPLOYMENT_NAME",
    ];

    let variables: Vec<VarCheck> = REQUIRED_VARS
        .iter()
        .map(|name| VarCheck {
            name,
            set: optional_env(name).is_some(),
        })
        .collect();

    let (agents_endpoint, connection_string_error) = match optional_env("PROJECT_ENDPOINT") {
        Some(endpoint) => (Some(endpoint), None),
        None => match optional_env("PROJECT_CONNECTION_STRING") {
            Some(conn_str) => match ProjectConfig::parse(&conn_str) {
                Ok(project) => (Some(project.agents_base_url()), None),
                Err(e) => (None, Some(e.to_string())),
            },
            None => (
                None,
                Some("neither PROJECT_ENDPOINT nor PROJECT_CONNECTION_STRING is set".to_string()),
            ),
        },
    };

    let credential = auth::detect_credential_source();
    let credential_source = match credential {
        CredentialSource::EnvToken => "env-token",
        CredentialSource::AzureCli => "azure-cli",
        CredentialSource::None => "none",
    };

    let ok = variables.iter().all(|v| v.set)
        && agents_endpoint.is_some()
        && credential != CredentialSource::None;

    let report = CheckReport {
        variables,
        agents_endpoint,
        connection_string_error,
        credential_source,
        ok,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for var in &report.variables {
            let mark = if var.set {
                "ok".green()
            } else {
                "missing".red()
            };
            println!("{:28} {mark}", var.name);
        }
        match &report.agents_endpoint {
            Some(endpoint) => println!("{:28} {} ({endpoint})", "destination", "ok".green()),
            None => println!(
                "{:28} {} ({})",
                "destination",
                "missing".red(),
                report
                    .connection_string_error
                    .as_deref()
                    .unwrap_or("unknown")
            ),
        }
        let credential_mark = match credential {
            CredentialSource::None => "missing".red(),
            _ => "ok".green(),
        };
        println!(
            "{:28} {credential_mark} ({})",
            "credential", report.credential_source
        );
    }

    if !report.ok {
        anyhow::bail!("preflight check failed, see output above");
    }
    Ok(())
}

fn run_completions(shell: &str) -> anyhow::Result<()> {
    let shell: clap_complete::Shell = shell
        .parse()
        .map_err(|e| anyhow::anyhow!("unknown shell '{shell}': {e}"))?;
    let mut command = Cli::command();
    clap_complete::generate(shell, &mut command, "a2am", &mut std::io::stdout());
    Ok(())
}
