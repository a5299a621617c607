//! Atelier CLI
//!
//! Main entry point for running the learner progression platform server.

use std::net::SocketAddr;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use atelier_domain::{Enrollment, ModuleRef};
use atelier_orchestrator::{create_router, AppState, Config};
use atelier_scoring::{AnthropicEvaluator, Evaluator, ScriptedEvaluator};
use atelier_store::MemoryStore;
use uuid::Uuid;

/// Default port for the HTTP API server.
const DEFAULT_PORT: u16 = 3000;

/// Environment variable holding the evaluator API key.
const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Atelier - Learner Progression Platform
///
/// Serves the submission, feedback, and certification API for simulation
/// based training programs.
#[derive(Parser, Debug)]
#[command(name = "atelier")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (default: atelier.json in current directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,

    /// Port for the HTTP API server
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Use a canned evaluator instead of the external scoring API
    #[arg(long)]
    offline: bool,

    /// Seed a demo simulation and enrollment, printing their identifiers
    #[arg(long)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Atelier starting");
    tracing::debug!(config = ?args.config, "Config file");

    match run_server(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Runs the HTTP server.
async fn run_server(args: Args) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    print_config(&config);

    let evaluator = build_evaluator(&config, args.offline)?;

    let store = Arc::new(MemoryStore::new());
    if args.seed_demo {
        seed_demo(&store).await;
    }

    let state = AppState::new(config, store, evaluator);
    let router = create_router(state);

    let addr: SocketAddr = ([127, 0, 0, 1], args.port).into();
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {addr}: {e}\n\nSuggestion: Try a different port with --port"
        )
    })?;

    println!("HTTP API server running on http://{addr}");
    println!("Press Ctrl+C to stop");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Atelier stopped");
    Ok(())
}

/// Resolves until Ctrl+C is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Received Ctrl+C, shutting down");
}

/// Loads configuration from the specified path or default location.
fn load_config(config_path: Option<&str>) -> anyhow::Result<Config> {
    match config_path {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            Config::load_from_file(path).map_err(|e| anyhow::anyhow!("{e}"))
        }
        None => Config::load_from_dir(Path::new(".")).map_err(|e| anyhow::anyhow!("{e}")),
    }
}

/// Builds the scoring evaluator.
///
/// Offline mode returns a canned "Très bien" report so the full pipeline
/// can be exercised without the external API.
fn build_evaluator(config: &Config, offline: bool) -> anyhow::Result<Arc<dyn Evaluator>> {
    if offline {
        tracing::warn!("Running with the offline evaluator; scores are canned");
        return Ok(Arc::new(ScriptedEvaluator::always(demo_report())));
    }

    let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
        anyhow::anyhow!(
            "{API_KEY_ENV} is not set\n\nSuggestion: export the API key or run with --offline"
        )
    })?;

    Ok(Arc::new(
        AnthropicEvaluator::new(api_key)
            .with_model(config.evaluator_model.clone())
            .with_max_tokens(config.evaluator_max_tokens),
    ))
}

/// Seeds a two-module demo simulation with one enrollment.
async fn seed_demo(store: &MemoryStore) {
    let simulation = Uuid::new_v4();
    let learner = Uuid::new_v4();
    let modules = vec![
        ModuleRef {
            id: Uuid::new_v4(),
            position: 0,
        },
        ModuleRef {
            id: Uuid::new_v4(),
            position: 1,
        },
    ];
    let first_module = modules[0].id;
    let second_module = modules[1].id;
    store.seed_modules(simulation, modules).await;

    let enrollment = Enrollment::new(learner, simulation, first_module);
    let enrollment_id = enrollment.id;
    store.seed_enrollment(enrollment).await;

    println!("Demo data seeded:");
    println!("  Learner (x-learner-id header): {learner}");
    println!("  Simulation: {simulation}");
    println!("  Enrollment: {enrollment_id}");
    println!("  Module 1: {first_module}");
    println!("  Module 2: {second_module}");
}

/// Canned evaluation used by the offline evaluator.
fn demo_report() -> String {
    r#"{
        "score_global": 82,
        "score_pertinence": 80,
        "score_analyse": 85,
        "score_clarte": 78,
        "score_creativite": 83,
        "mention": "Très bien",
        "points_forts": ["Structure claire", "Recommandations concrètes"],
        "axes_amelioration": ["Chiffrer davantage les hypothèses"],
        "commentaire_detaille": "Un livrable solide, bien structuré et argumenté."
    }"#
    .to_string()
}

/// Prints the loaded configuration.
fn print_config(config: &Config) {
    println!("Configuration loaded:");
    println!("  Scoring timeout: {}s", config.scoring_timeout_secs);
    println!(
        "  Daily submission limit: {}",
        config.daily_submission_limit
    );
    println!(
        "  Minimum deliverable length: {} characters",
        config.min_deliverable_chars
    );
    println!("  Certificate prefix: {}", config.certificate_prefix);
    println!("  Evaluator model: {}", config.evaluator_model);
}
