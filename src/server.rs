use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{extract::FromRef, routing::get, Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    cors,
    customers::services::CustomerService,
    database::PostgresConnection,
    payments::services::PaymentService,
    repos::{DynCustomerRepo, DynPaymentRepo},
};

pub struct Options {
    pub bind_address: SocketAddr,

    pub database_pool_size: u32,
    pub database_timeout_seconds: u8,
    pub database_url: String,
}

#[derive(Clone)]
pub struct AppState {
    customer_service: CustomerService,
    payment_service: PaymentService,
}

impl AppState {
    pub fn new(customer_repo: DynCustomerRepo, payment_repo: DynPaymentRepo) -> Self {
        Self {
            customer_service: CustomerService::new(customer_repo.clone()),
            payment_service: PaymentService::new(customer_repo, payment_repo),
        }
    }
}

impl FromRef<AppState> for CustomerService {
    fn from_ref(state: &AppState) -> Self {
        state.customer_service.clone()
    }
}

impl FromRef<AppState> for PaymentService {
    fn from_ref(state: &AppState) -> Self {
        state.payment_service.clone()
    }
}

#[derive(Serialize)]
struct HealthRep {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthRep> {
    Json(HealthRep {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the application's router with all routes and middleware attached.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(crate::customers::http::routes())
        .merge(crate::payments::http::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors::layer())
        .with_state(state)
}

pub async fn serve(opts: Options) -> anyhow::Result<()> {
    let db = PostgresConnection::connect(
        &opts.database_url,
        opts.database_pool_size,
        Duration::from_secs(opts.database_timeout_seconds.into()),
    )
    .await?;

    let customer_repo: DynCustomerRepo = Arc::new(db.clone());
    let payment_repo: DynPaymentRepo = Arc::new(db.clone());

    let state = AppState::new(customer_repo, payment_repo);

    info!(address = %opts.bind_address, "Starting server.");

    axum::Server::bind(&opts.bind_address)
        .serve(app(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped. Closing database connections.");
    db.close().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down."),
            Err(error) => {
                error!(?error, "Failed to install Ctrl+C handler.");
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
                info!("Received terminate signal, shutting down.");
            }
            Err(error) => {
                error!(?error, "Failed to install terminate signal handler.");
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
