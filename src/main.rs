//! exchange-ping
//!
//! Probes exchange APIs and publishes latency as a time-series metric.
//!
//! # Architecture Overview
//!
//! ```text
//!   scheduler trigger ──┐        ┌────────────────────────────────────────┐
//!   (external, or `run`)│        │              invocation                │
//!                       ▼        │                                        │
//!   {"name","url",   ┌─────────┐ │  ┌────────┐   ┌─────────┐   ┌───────┐  │
//!    "environment"}─▶│ handler │─┼─▶│ probe  │──▶│ emitter │──▶│backend│──┼──▶ metrics store
//!                    └─────────┘ │  └────────┘   └────┬────┘   └───────┘  │
//!                                │                    │                   │
//!                                │                    └──▶ log record ────┼──▶ stdout
//!                                └────────────────────────────────────────┘
//! ```
//!
//! # Commands
//! - `invoke`: one invocation, descriptor from `--input` or stdin; needs the
//!   `http` or `memory` metrics backend
//! - `run`: built-in 5-minute scheduler over the configured targets
//! - `targets`: print the catalog

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;

use exchange_ping::catalog::{self, Environment};
use exchange_ping::config::{self, BackendKind, PingConfig};
use exchange_ping::emitter::StdoutSink;
use exchange_ping::lifecycle::{signals, DeadLetterQueue, Scheduler, Shutdown};
use exchange_ping::observability::{logging, metrics};
use exchange_ping::Handler;

#[derive(Parser)]
#[command(name = "exchange-ping")]
#[command(about = "Probe exchange APIs and publish latency metrics", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single invocation
    Invoke {
        /// Invocation input object; read from stdin when omitted
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Probe configured targets on the built-in schedule
    Run {
        /// Fire every target once and exit
        #[arg(long)]
        once: bool,
    },
    /// List catalog targets as JSON lines
    Targets {
        #[arg(short, long)]
        environment: Option<Environment>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => PingConfig::default(),
    };

    logging::init_logging(&config.observability);

    match cli.command {
        Commands::Invoke { input } => invoke(&config, input).await,
        Commands::Run { once } => run(&config, once).await,
        Commands::Targets { environment } => {
            let environments = match environment {
                Some(env) => vec![env],
                None => Environment::ALL.to_vec(),
            };
            for env in environments {
                for target in catalog::targets_for(env) {
                    println!("{}", serde_json::to_string(&target)?);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn invoke(config: &PingConfig, input: Option<String>) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let input = match input {
        Some(input) => input,
        None => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };

    config::validate_one_shot(config)?;

    let handler = Handler::from_config(config, Arc::new(StdoutSink));
    match handler.handle_json(&input).await {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            tracing::error!(error = %e, "Invocation failed");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(config: &PingConfig, once: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing::info!(
        environment = %config.environment,
        region = %config.region,
        backend = ?config.metrics.backend,
        "exchange-ping v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    if once {
        config::validate_one_shot(config)?;
    }

    if config.observability.metrics_enabled {
        if let Err(e) = metrics::init_metrics_at(&config.observability.metrics_address) {
            // Latency points have nowhere else to go with the scrape backend.
            if config.metrics.backend == BackendKind::Prometheus {
                return Err(e.into());
            }
            tracing::error!(error = %e, "Self-metrics disabled");
        }
    }

    let targets = config.resolved_targets()?;
    let dead_letters = Arc::new(DeadLetterQueue::new(config.dead_letter.capacity));
    let handler = Handler::from_config(config, Arc::new(StdoutSink));
    let scheduler = Scheduler::new(handler, targets, dead_letters.clone());

    if once {
        let outcomes = scheduler.run_once().await;
        let failed = outcomes.iter().filter(|o| o.is_err()).count();
        tracing::info!(invocations = outcomes.len(), failed, "Single pass complete");
        return Ok(if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    let shutdown = Shutdown::new();
    let scheduler_run = scheduler.run(&shutdown);
    tokio::pin!(scheduler_run);

    tokio::select! {
        _ = &mut scheduler_run => {}
        _ = signals::wait_for_termination() => {
            shutdown.trigger();
            scheduler_run.await;
        }
    }

    tracing::info!(dead_letters = dead_letters.len(), "Shutdown complete");
    Ok(ExitCode::SUCCESS)
}
