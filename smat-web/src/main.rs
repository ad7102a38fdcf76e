//! smat-web - Sustainability Maturity Assessment web service
//!
//! Serves the login, questionnaire and report pages, scores submissions and
//! renders reports as HTML and PDF.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use smat_common::config::ConfigResolver;
use smat_scoring::{AssessmentPipeline, Advisors, RasterChartRenderer, ReferenceData};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use smat_web::services::{ChromiumPdfRenderer, LangflowClient, LlmAdvisor, OpenAiCompatibleProvider};
use smat_web::session::spawn_purge_task;
use smat_web::AppState;

/// Command-line arguments for smat-web
#[derive(Parser, Debug)]
#[command(name = "smat-web")]
#[command(about = "Sustainability maturity assessment web service")]
#[command(version)]
struct Args {
    /// Configuration file (TOML); SMAT_CONFIG is consulted when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides [server] port)
    #[arg(short, long, env = "SMAT_PORT")]
    port: Option<u16>,

    /// Reference data directory (overrides [data] dir)
    #[arg(short, long, env = "SMAT_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let resolver = ConfigResolver::new(args.config.clone());
    let mut config = resolver.load().context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dir) = args.data_dir {
        config.data.dir = dir;
    }

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("smat_web={0},smat_scoring={0},smat_common={0},tower_http=info", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting smat-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Configuration source: {:?}", resolver.resolve());

    let reference = ReferenceData::load(&config.data.dir);

    let advisors = match &config.llm.api_key {
        Some(_) => {
            let provider = OpenAiCompatibleProvider::new(
                config.llm.base_url.clone(),
                config.llm.api_key.clone(),
                Duration::from_secs(config.llm.timeout_secs),
            )
            .context("Failed to build LLM client")?;
            info!(base_url = %config.llm.base_url, "LLM advisors enabled");
            Advisors::shared(Arc::new(LlmAdvisor::new(Arc::new(provider), &config.llm)))
        }
        None => {
            warn!("No LLM API key configured; summaries and insights use fallback text");
            Advisors::offline()
        }
    };

    let pipeline = AssessmentPipeline::new(
        Arc::new(reference),
        advisors,
        Arc::new(RasterChartRenderer::new()),
    );

    let langflow = if config.langflow.enabled {
        let client = LangflowClient::new(
            config.langflow.url.clone(),
            Duration::from_secs(config.langflow.timeout_secs),
        )
        .context("Failed to build flow client")?;
        info!(url = %client.url(), "External flow analysis enabled");
        Some(client)
    } else {
        None
    };

    let pdf = Arc::new(ChromiumPdfRenderer::new(
        config.pdf.chromium_path.clone(),
        config.pdf.timeout_secs,
    ));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, pipeline, langflow, pdf);
    if let Some(ttl) = state.config.session.ttl_secs.filter(|secs| *secs > 0) {
        let every = Duration::from_secs(ttl);
        spawn_purge_task(state.sessions.clone(), every, "sessions");
        spawn_purge_task(state.results.clone(), every, "results");
        info!(ttl_secs = ttl, "Expired session sweep enabled");
    }
    let app = smat_web::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
