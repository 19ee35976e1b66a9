//! HTTP surface of the grimoire catalog.
//!
//! # Responsibility
//! - Route REST calls for spells and houses onto the record services.
//! - Wrap every response in the shared envelope with a mapped status.
//!
//! # Invariants
//! - Handlers hold no state of their own; the store is the only shared
//!   resource.
//! - Error responses carry `success: false` and a human-readable `error`.

use std::future::Future;
use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    Router,
};
use grimoire_core::db::open_db;
use log::{error, info};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};

pub mod config;
pub mod error;
mod routes;
pub mod state;

pub use config::{Config, ConfigError};
pub use error::{ApiError, ApiResult, ServeError};
pub use state::AppState;

/// Builds the catalog router over `state`.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(routes::root))
        .route("/api/health", get(routes::health))
        .route(
            "/api/spells",
            get(routes::spells::list).post(routes::spells::create),
        )
        .route(
            "/api/spells/{id}",
            get(routes::spells::get)
                .put(routes::spells::update)
                .delete(routes::spells::delete),
        )
        .route(
            "/api/houses",
            get(routes::houses::list).post(routes::houses::create),
        )
        .route(
            "/api/houses/{id}",
            get(routes::houses::get)
                .put(routes::houses::update)
                .delete(routes::houses::delete),
        )
        .fallback(routes::not_found)
        .layer(cors)
        .with_state(state)
}

/// Opens the store at `config.db_path` and serves until a shutdown signal.
pub async fn serve(config: &Config) -> Result<(), ServeError> {
    let conn = open_db(&config.db_path)?;
    let state = AppState::new(conn);

    let address = config.address();
    info!("event=server_bind module=http status=start address={address}");
    let listener = TcpListener::bind(address).await?;
    info!("event=server_bind module=http status=ok address={address}");

    serve_with(listener, state, shutdown_signal()).await
}

/// Serves the catalog on an already bound listener until `shutdown` resolves.
pub async fn serve_with(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServeError> {
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("event=server_stop module=http status=ok");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("event=server_signal module=http signal=ctrl_c"),
            Err(err) => {
                error!("event=server_signal module=http status=error signal=ctrl_c error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("event=server_signal module=http signal=terminate");
            }
            Err(err) => {
                error!("event=server_signal module=http status=error signal=terminate error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
