use std::net::SocketAddr;
use std::sync::Arc;

use lambda_runtime::{LambdaEvent, service_fn};
use serde_json::Value;

use notebin::gateway;
use notebin::http::handlers::{AppState, router};
use notebin::note::service::NoteService;
use notebin::storage::local::LocalStorage;
use notebin::storage::s3::S3Storage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // Deployment mode is detected from the environment: inside a function
    // runtime the service answers gateway events against S3, otherwise it
    // serves HTTP directly against local disk.
    if std::env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok() {
        run_gateway().await
    } else {
        run_http_server().await
    }
}

async fn run_http_server() -> anyhow::Result<()> {
    tracing::info!("Initializing HTTP server mode with local disk storage");

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let note_dir = std::env::var("NOTE_DIR").unwrap_or_else(|_| "/note".to_string());

    let storage = LocalStorage::new(&note_dir)?;
    tracing::info!("Local storage configured: directory={}", note_dir);

    let state = Arc::new(AppState::new(NoteService::new(Arc::new(storage))));
    let app = router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;
    tracing::info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn run_gateway() -> anyhow::Result<()> {
    tracing::info!("Initializing gateway mode with S3 storage");

    let bucket = std::env::var("S3_BUCKET")
        .map_err(|_| anyhow::anyhow!("S3_BUCKET environment variable is required"))?;
    let prefix = std::env::var("S3_PREFIX").unwrap_or_else(|_| "note".to_string());

    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let client = aws_sdk_s3::Client::new(&config);
    let storage = S3Storage::new(client, &bucket, &prefix);
    tracing::info!("S3 storage configured: bucket={}, prefix={}", bucket, prefix);

    let state = Arc::new(AppState::new(NoteService::new(Arc::new(storage))));

    let handler = service_fn(move |event: LambdaEvent<Value>| {
        let state = state.clone();
        async move {
            Ok::<Value, lambda_runtime::Error>(gateway::adapter::handle_event(&state, event.payload).await)
        }
    });

    lambda_runtime::run(handler)
        .await
        .map_err(|err| anyhow::anyhow!("gateway runtime error: {}", err))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!("Failed to install SIGTERM handler: {}", err),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down server...");
}
