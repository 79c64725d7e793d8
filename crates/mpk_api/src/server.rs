//! Server setup and lifecycle management.

use crate::config::ApiConfig;
use crate::router::create_router;
use crate::state::AppState;
use log::info;
use mpk_core::db::{open_db, DbError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use tokio::net::TcpListener;

/// Failure to start or run the server.
#[derive(Debug)]
pub enum ServerError {
    Logging(String),
    Db(DbError),
    Io(std::io::Error),
}

impl Display for ServerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(message) => write!(f, "failed to initialize logging: {message}"),
            Self::Db(err) => write!(f, "failed to open database: {err}"),
            Self::Io(err) => write!(f, "server i/o error: {err}"),
        }
    }
}

impl Error for ServerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(_) => None,
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<DbError> for ServerError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Initializes logging, opens the database, binds the listener and serves
/// until Ctrl-C.
pub async fn serve(config: ApiConfig) -> Result<(), ServerError> {
    init_server_logging(&config)?;
    let conn = open_db(&config.db_path)?;
    let app = create_router(AppState::new(conn), &config.cors_origins);

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!(
        "event=server_start module=api status=ok listen_addr={} cors_origins={}",
        listener.local_addr()?,
        config.cors_origins.len()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=api status=ok");
    Ok(())
}

/// Starts logging from `config`; a repeat call with the same settings is a
/// no-op.
fn init_server_logging(config: &ApiConfig) -> Result<(), ServerError> {
    let log_dir = match config.log_dir.as_deref() {
        Some(dir) => Some(dir.to_str().ok_or_else(|| {
            ServerError::Logging(format!("log dir `{}` is not valid UTF-8", dir.display()))
        })?),
        None => None,
    };
    mpk_core::init_logging(&config.log_level, log_dir).map_err(ServerError::Logging)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the process is killed.
        std::future::pending::<()>().await;
    }
}
