use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod allocator;
mod cache;
mod config;
mod error;
mod handlers;
mod models;
mod store;
mod validation;

use allocator::CodeAllocator;
use store::LinkStore;

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    /// Sole owner of every link record.
    pub store: Arc<dyn LinkStore>,
    pub allocator: CodeAllocator,
}

// ── Entry point ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (ignore error if file is absent; env vars may already be set)
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "microlink=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = config::AppConfig::from_env()?;
    tracing::info!("Starting MicroLink on {}", config.bind_addr());

    let allocator = CodeAllocator::with_length(config.code_length, config.max_allocation_attempts)?;

    // Open the mapping store (runs migrations for durable backends)
    let store = store::open(&config).await?;
    report_capacity(&allocator, store.count().await?);

    let state = Arc::new(AppState {
        store: store.clone(),
        allocator,
    });
    let app = handlers::router(state, &config.cors_origins);

    // ── Serve ──────────────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await?;

    store.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Log how full the code space is so operators can widen CODE_LENGTH in time.
fn report_capacity(allocator: &CodeAllocator, existing: u64) {
    let fill = allocator.fill_ratio(existing);
    tracing::info!(
        "{} live link(s) in a space of {} codes ({:.6}% used)",
        existing,
        allocator.code_space(),
        fill * 100.0
    );

    match allocator.expected_attempts(existing) {
        Some(expected) if fill > 0.5 => tracing::warn!(
            "Code space is over half full; expect {:.1} attempts per allocation. Increase CODE_LENGTH",
            expected
        ),
        None => tracing::warn!("Code space is full; every allocation will fail. Increase CODE_LENGTH"),
        Some(_) => {}
    }
}

/// Resolve on SIGINT (Ctrl+C) or, on Unix, SIGTERM.
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down gracefully"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down gracefully"),
    }
}
