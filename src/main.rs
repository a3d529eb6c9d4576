use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use vault_notes::{NoteService, config, repository::PgRepository, router};

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load config
    let cfg = config::load_config().unwrap_or_else(|e| {
        tracing::error!("Failed to load configuration: {e}");
        panic!("failed to load configuration: {e}");
    });

    // Repository creation and migration
    let repo = PgRepository::connect(&cfg.database).unwrap_or_else(|e| {
        tracing::error!("Failed to create connection pool: {e}");
        panic!("failed to create connection pool: {e}");
    });

    repo.migrate().await.unwrap_or_else(|e| {
        tracing::error!("Failed to migrate database: {e}");
        panic!("failed to migrate database: {e}");
    });

    // Service creation
    let repo = Arc::new(repo);
    let service = Arc::new(NoteService::new(repo.clone()));

    let app = router(service, &cfg.cors_origins);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", cfg.port))
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind port {}: {e}", cfg.port);
            panic!("failed to bind port {}: {e}", cfg.port);
        });

    match listener.local_addr() {
        Ok(addr) => tracing::info!("Started listening on {}", addr),
        Err(e) => tracing::warn!("Started listening, local address unknown: {e}"),
    }

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("HTTP server error: {e}");
    }

    repo.close();
    tracing::info!("Server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
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
                tracing::error!("Failed to listen for SIGTERM: {e}");
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

    tracing::info!("Shutdown signal received, draining connections");
}
