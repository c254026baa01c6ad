//! galleria-api server binary.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::{self, writer::BoxMakeWriter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use galleria_api::{build_router, AppState, PipelineLimits, ServerConfig};
use galleria_db::{log_pool_metrics, DatabaseHandle, FilesystemBackend, PoolConfig};
use galleria_inference::VisionConfig;

/// Logging from `LOG_FORMAT` (`text` or `json`), `LOG_FILE` (daily rotation),
/// `LOG_ANSI` and `RUST_LOG`. The guard must live until shutdown.
fn init_tracing() -> Option<WorkerGuard> {
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| matches!(v.as_str(), "1" | "true"));
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("galleria_api=debug,galleria_db=info,tower_http=debug"));

    let (writer, guard) = match std::env::var("LOG_FILE").ok().map(PathBuf::from) {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            let name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "galleria-api.log".into());
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, name));
            (BoxMakeWriter::new(writer), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };
    let to_file = guard.is_some();

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_writer(writer)).init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(ansi.unwrap_or(!to_file)),
            )
            .init();
    }
    info!(json, to_file, "Logging initialized");
    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = init_tracing();

    let config = ServerConfig::from_env();

    // Database
    let handle = DatabaseHandle::with_config(&config.database_url, PoolConfig::from_env());
    let db = handle.connect().await?;
    db.migrate().await?;
    log_pool_metrics(db.pool());
    info!(subsystem = "db", "Database ready");

    // Blob storage
    let storage = FilesystemBackend::new(&config.file_storage_path);
    storage.validate().await?;
    info!(
        subsystem = "storage",
        path = %config.file_storage_path,
        "File storage ready"
    );

    // Vision backend
    let vision_config = VisionConfig::from_env()?;
    let vision = vision_config.build();
    if vision.is_none() {
        warn!(
            subsystem = "inference",
            provider = %vision_config.provider,
            "No vision backend available, uploads will get empty suggestions"
        );
    }

    let state = AppState::from_database(db, Arc::new(storage))
        .with_vision(vision)
        .with_limits(PipelineLimits {
            hash_timeout: config.hash_timeout,
            vision_timeout: vision_config.timeout,
        });

    let app = build_router(state, &config);

    // Start server
    let addr: SocketAddr = config.bind_address().parse()?;
    info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
