use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use tourbook::engine::Engine;
use tourbook::http::{AppState, app};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let metrics_port: Option<u16> = std::env::var("TOURBOOK_METRICS_PORT")
        .ok()
        .and_then(|s| s.parse().ok());
    tourbook::observability::init(metrics_port);

    let port = std::env::var("TOURBOOK_PORT").unwrap_or_else(|_| "8080".into());
    let bind = std::env::var("TOURBOOK_BIND").unwrap_or_else(|_| "0.0.0.0".into());
    let data_dir = std::env::var("TOURBOOK_DATA_DIR").unwrap_or_else(|_| "./data".into());

    let engine = Engine::open(&PathBuf::from(&data_dir))?;
    let state = AppState { engine: Arc::new(engine) };

    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("tourbook listening on {addr}");
    info!("  data_dir: {data_dir}");
    info!(
        "  metrics: {}",
        metrics_port.map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics"))
    );

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("tourbook stopped");
    Ok(())
}

/// Resolve on SIGTERM or ctrl-c; axum then stops accepting and drains
/// in-flight requests.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to register SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
    }
    info!("shutdown signal received");
}
