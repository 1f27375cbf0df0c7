use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use tracing::error;
use tracing_subscriber::EnvFilter;

use sastsync_kernel::lifecycle::{self, LifecycleError, RefreshOutcome};
use sastsync_kernel::reconciler::diagnostics::Diagnostic;
use sastsync_kernel::schema::sast_resource_schema;
use sastsync_kernel::state::file::JsonFileStateStore;
use sastsync_kernel::state::StateStore;
use sastsync_kernel::{ClientConfig, HttpSettingsClient, SettingsReconciler, SettingsRecord};

/// Sastsync CLI
#[derive(Parser, Debug)]
#[command(name = "sastsync")]
#[command(about = "Manage an organization's SAST setting", long_about = None)]
struct Cli {
    /// Path to the tracked state file
    #[arg(long, global = true, default_value = "sastsync.state.json")]
    state: PathBuf,

    /// Path to client config JSON
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the API endpoint from config
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// API token
    #[arg(long, global = true, env = "SASTSYNC_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the resource schema
    Schema {
        /// Provider type name the resource is registered under
        #[arg(long, default_value = "snyk")]
        provider: String,
    },

    /// Create or update the setting for an organization
    Apply {
        #[arg(long)]
        id: String,

        #[arg(long, action = ArgAction::Set)]
        sast_enabled: bool,

        #[arg(long = "type")]
        resource_type: Option<String>,
    },

    /// Re-read a tracked setting and report drift
    Refresh {
        #[arg(long)]
        id: String,
    },

    /// Stop managing a setting without changing it remotely
    Forget {
        #[arg(long)]
        id: String,
    },

    /// List tracked settings
    Show,
}

#[derive(Debug, Serialize)]
struct RefreshOutput {
    #[serde(flatten)]
    outcome: RefreshOutcome,
    diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Serialize)]
struct ForgetOutput {
    id: String,
    forgotten: Option<SettingsRecord>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match &cli.command {
        Command::Schema { provider } => print_json(&sast_resource_schema(provider)),

        Command::Show => {
            let store = JsonFileStateStore::open(&cli.state)?;
            print_json(&store.list()?)
        }

        Command::Apply {
            id,
            sast_enabled,
            resource_type,
        } => {
            let reconciler = build_reconciler(&cli)?;
            let mut store = JsonFileStateStore::open(&cli.state)?;

            let mut planned = SettingsRecord::planned(id.clone(), *sast_enabled);
            if let Some(resource_type) = resource_type {
                planned = planned.with_resource_type(resource_type.clone());
            }

            let outcome = lifecycle::apply(&reconciler, &mut store, &planned)
                .await
                .map_err(surface)?;
            print_json(&outcome)
        }

        Command::Refresh { id } => {
            let reconciler = build_reconciler(&cli)?;
            let mut store = JsonFileStateStore::open(&cli.state)?;

            let outcome = lifecycle::refresh(&reconciler, &mut store, id)
                .await
                .map_err(surface)?;
            let diagnostics = outcome.drift.diagnostics();
            print_json(&RefreshOutput {
                outcome,
                diagnostics,
            })
        }

        Command::Forget { id } => {
            // Forgetting is local only, so no token or endpoint is needed.
            let mut store = JsonFileStateStore::open(&cli.state)?;

            let forgotten = lifecycle::forget(&SettingsReconciler::detached(), &mut store, id)
                .map_err(surface)?;
            print_json(&ForgetOutput {
                id: id.clone(),
                forgotten,
            })
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries JSON results only
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_reconciler(cli: &Cli) -> Result<SettingsReconciler<HttpSettingsClient>> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ClientConfig::default(),
    };

    if let Some(endpoint) = &cli.endpoint {
        config = config.with_endpoint(endpoint.clone());
    }

    let token = cli
        .token
        .as_deref()
        .context("an API token is required: pass --token or set SASTSYNC_TOKEN")?;

    Ok(SettingsReconciler::new(HttpSettingsClient::new(config, token)?))
}

/// Log the user-facing diagnostic for reconciler failures before bailing out.
fn surface(err: LifecycleError) -> anyhow::Error {
    if let LifecycleError::Reconcile(e) = &err {
        let diag = e.diagnostic();
        error!(summary = %diag.summary, "{}", diag.detail);
    }
    err.into()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
