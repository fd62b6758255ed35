//! Essay Review Server
//!
//! Serves the review logic both clients share, so the mobile app and the
//! teacher panel render the same segments and rows for the same analysis:
//!
//! - Span highlighting (errors and OCR uncertainty markers)
//! - Error list rows and rule labels
//! - Sanitizing raw model output against the essay text
//! - Rubric scoring and class statistics
//! - Classroom join codes
//!
//! ## Architecture
//!
//! Handlers are stateless apart from the shared engine configuration.
//! Rate limiting is per client IP via tower-governor.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use highlight_engine::{HighlightEngine, PASS_THRESHOLD};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;

use api::{
    handle_class_code, handle_error_rows, handle_health, handle_highlight, handle_list_rules,
    handle_normalize_class_code, handle_review, handle_rubric, handle_sanitize, handle_stats,
};

/// Command-line arguments for the review server
#[derive(Parser, Debug)]
#[command(name = "review-server")]
#[command(about = "Essay review server for span highlighting and scoring")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "10")]
    rate_limit: u32,

    /// Minimum rubric total for a passing essay
    #[arg(long, default_value_t = PASS_THRESHOLD)]
    pass_threshold: i64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<HighlightEngine>,
}

impl AppState {
    pub fn new(pass_threshold: i64) -> Self {
        Self {
            engine: Arc::new(HighlightEngine::with_pass_threshold(pass_threshold)),
        }
    }
}

/// All routes with CORS, without rate limiting
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // API endpoints
        .route("/api/rules", get(handle_list_rules))
        .route("/api/highlight", post(handle_highlight))
        .route("/api/errors", post(handle_error_rows))
        .route("/api/sanitize", post(handle_sanitize))
        .route("/api/rubric", post(handle_rubric))
        .route("/api/review", post(handle_review))
        .route("/api/stats", post(handle_stats))
        .route("/api/class-code", get(handle_class_code))
        .route("/api/class-code/normalize", post(handle_normalize_class_code))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting review server on {}:{}", args.host, args.port);

    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(args.rate_limit * 2)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("invalid rate limit: {}", args.rate_limit))?,
    );

    let app = build_router(AppState::new(args.pass_threshold)).layer(GovernorLayer {
        config: governor_conf,
    });

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    info!("Pass threshold: {}", args.pass_threshold);

    // The governor keys on peer IP, which needs connect info
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
