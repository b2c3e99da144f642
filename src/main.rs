use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use outreach_ai::config::AppConfig;
use outreach_ai::error::AppError;
use outreach_ai::http::{evaluation_router, ApiState, PackRegistry};
use outreach_ai::packs::{validate_root, PackError, PackOutcome, PackStore};
use outreach_ai::telemetry;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Pack directories shipped as intentionally-invalid validation fixtures.
/// `validate-packs` skips these unless told otherwise.
const FIXTURE_PACKS: &[&str] = &["fixture-invalid"];

#[derive(Clone)]
struct OpsState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Outreach Suitability Service",
    about = "Score accounts and gate outreach recommendations against versioned policy packs",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Load and validate every pack bundle under the packs root
    ValidatePacks(ValidatePacksArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
    /// Override the configured packs root directory
    #[arg(long)]
    packs_root: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct ValidatePacksArgs {
    /// Packs root to validate (defaults to the configured root)
    #[arg(long)]
    root: Option<PathBuf>,
    /// Additional pack ids to skip, on top of the built-in fixture list
    #[arg(long = "skip")]
    skip: Vec<String>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::ValidatePacks(args) => run_validate_packs(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(root) = args.packs_root.take() {
        config.packs.root = root;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let ops_state = OpsState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };
    let registry = Arc::new(PackRegistry::new(PackStore::new(config.packs.root.clone())));

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(ops_state)
        .merge(evaluation_router(ApiState { registry }))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, packs_root = %config.packs.root.display(), "outreach suitability service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_validate_packs(args: ValidatePacksArgs) -> Result<(), AppError> {
    let root = match args.root {
        Some(root) => root,
        None => AppConfig::load()?.packs.root,
    };
    let store = PackStore::new(root);

    let mut skipped: Vec<&str> = FIXTURE_PACKS.to_vec();
    skipped.extend(args.skip.iter().map(String::as_str));

    let report = validate_root(&store, &skipped)?;
    for (pack_id, outcome) in &report.outcomes {
        match outcome {
            PackOutcome::Skipped => println!("SKIP {pack_id} (known fixture)"),
            PackOutcome::Passed { version, checksum } => {
                println!("PASS {pack_id}@{version} checksum={checksum}");
            }
            PackOutcome::Failed(PackError::ValidationFailure { violations }) => {
                println!("FAIL {pack_id}: {} violation(s)", violations.len());
                for violation in violations {
                    println!("  - {violation}");
                }
            }
            PackOutcome::Failed(err) => println!("FAIL {pack_id}: {err}"),
        }
    }

    if !report.all_valid() {
        return Err(AppError::PacksInvalid {
            failed: report.failed(),
            total: report.checked(),
        });
    }

    println!("{} pack(s) valid", report.checked());
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<OpsState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<OpsState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
