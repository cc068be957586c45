mod api;
mod middleware;

use std::sync::Arc;

use custard_signals::Thresholds;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(custard_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool = match config.database_url.as_deref() {
        Some(_) => {
            let pool = custard_db::connect_pool_from_config(&config).await?;
            let applied = custard_db::run_migrations(&pool).await?;
            tracing::info!(applied, "migrations up to date");
            Some(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; data routes will report storage unavailable");
            None
        }
    };

    let thresholds = match config.thresholds_path.as_deref() {
        Some(path) => custard_signals::load_thresholds(path)?,
        None => Thresholds::default(),
    };

    let baseline = config
        .national_baseline_path
        .as_deref()
        .map(custard_core::load_national_baseline)
        .transpose()?;
    match &baseline {
        Some(b) => tracing::info!(
            flavors = b.flavors.len(),
            span_start = %b.span_start,
            span_end = %b.span_end,
            "national baseline loaded"
        ),
        None => tracing::warn!("no national baseline configured; cadence variance disabled"),
    }

    let app = build_app(AppState::new(Arc::clone(&config), pool, thresholds, baseline));

    tracing::info!(bind_addr = %config.bind_addr, env = %config.env, "custard-server listening");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
