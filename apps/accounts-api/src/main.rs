//! Accounts API - registration, authentication and profile server

use core_config::tracing::{init_tracing, install_color_eyre};
use domain_accounts::reset::ResetTokens;
use domain_accounts::{
    AccountsService, AccountsState, PostgresAddressStore, PostgresUserStore,
};
use mailer::{MailerService, SmtpProvider};
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use web_core::JwtAuth;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!("Connecting to PostgreSQL");
    let db = sea_orm::Database::connect(&config.database_url).await?;
    info!("Database connection established");

    let provider = SmtpProvider::new(&config.smtp, &config.mail)?;
    let mailer = MailerService::new(Arc::new(provider), config.mail.clone());

    let service = AccountsService::new(
        PostgresUserStore::new(db.clone()),
        PostgresAddressStore::new(db.clone()),
        ResetTokens::new(&config.auth),
        mailer,
    );

    let state = AccountsState {
        service,
        jwt: JwtAuth::new(&config.auth),
    };

    let app = api::routes(state, db.clone(), config.environment.debug());

    let listener = tokio::net::TcpListener::bind(config.server.address()).await?;
    info!("Accounts API listening on {}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        })?;

    info!("Closing database connection");
    db.close().await?;

    info!("Accounts API shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
