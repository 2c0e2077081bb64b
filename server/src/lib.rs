//! HTTP CRUD service for a list of todos.
//!
//! # Overview
//! Five REST endpoints over a single ordered [`store::TodoStore`]. Two
//! variants share the same router: in-memory only, or backed by a JSON file
//! that is rewritten after every request.
//!
//! # Design
//! - The store sits behind `Arc<RwLock<_>>` in [`AppState`]; handlers never
//!   reach for globals.
//! - The file-backed variant adds nothing to the handlers. A middleware layer
//!   publishes a snapshot once the response exists and a single save worker
//!   writes it (see [`persist`]).

pub mod config;
pub mod error;
pub mod persist;
pub mod routes;
pub mod state;
pub mod store;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::{PersistError, StoreError};
pub use state::AppState;
pub use store::{IdPolicy, Todo, TodoStore};

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/todos", get(routes::list_todos).post(routes::create_todo))
        .route(
            "/todos/{id}",
            get(routes::get_todo)
                .put(routes::update_todo)
                .delete(routes::delete_todo),
        )
        .fallback(routes::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::persist_after_response,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

/// Binds the configured address and serves until Ctrl-C or SIGTERM. In the
/// file-backed variant the last snapshot is written before returning.
#[tracing::instrument(skip(config))]
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind_address()).await?;
    let (state, worker) = AppState::from_config(&config).await;

    match &config.data_file {
        Some(path) => tracing::info!(
            address = %listener.local_addr()?,
            data_file = %path.display(),
            id_policy = ?config.id_policy,
            "todo server running with backing file"
        ),
        None => tracing::info!(
            address = %listener.local_addr()?,
            id_policy = ?config.id_policy,
            "todo server running in memory"
        ),
    }

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(worker) = worker {
        worker.finish().await;
    }
    tracing::info!("todo server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
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
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
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
    tracing::info!("shutdown signal received");
}
