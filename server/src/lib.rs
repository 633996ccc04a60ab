pub mod auth;
pub mod categories;
pub mod email;
pub mod leaderboards;
pub mod runs;
pub mod users;


use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;

use email::{EmailService, SmtpConfig};
use leaderboard::LeaderboardService;

#[derive(Debug, Parser)]
#[command(name = "podium", about = "Leaderboard web API")]
pub struct Cli {
    /// Address to serve the API on.
    #[arg(long, env = "PODIUM_LISTEN_ADDR", default_value = "0.0.0.0:3000")]
    pub listen_addr: SocketAddr,
    /// Database URL; falls back to an ephemeral in-memory database.
    #[arg(long, env = "PODIUM_DATABASE_URL")]
    pub database_url: Option<String>,
    #[arg(long, env = "PODIUM_DB_MAX_CONNECTIONS", default_value_t = 10)]
    pub db_max_connections: u32,
    #[command(flatten)]
    pub smtp: SmtpConfig,
}

pub struct AppState {
    pub db: DatabaseConnection,
    pub leaderboard: LeaderboardService,
    pub email: Arc<EmailService>,
    pub smtp: SmtpConfig,
}

/// Connect, migrate and assemble the shared state.
pub async fn setup(
    smtp: SmtpConfig,
    database_url: Option<String>,
    max_connections: u32,
) -> anyhow::Result<Arc<AppState>> {
    let db_url = database_url.unwrap_or_else(|| storage::EPHEMERAL_URL.to_owned());
    let db = storage::connect(&db_url, max_connections).await?;
    Migrator::up(&db, None).await?;
    let email = Arc::new(EmailService::new(smtp.clone())?);
    Ok(Arc::new(AppState {
        leaderboard: LeaderboardService::new(db.clone()),
        db,
        email,
        smtp,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/run/:id", get(runs::get_run))
        .route("/api/run/:id/category", get(runs::get_run_category))
        .route(
            "/api/category/:id",
            get(categories::get_category).delete(categories::delete_category),
        )
        .route(
            "/api/category/:id/runs",
            get(runs::list_runs).post(runs::create_run),
        )
        .route(
            "/api/leaderboards",
            get(leaderboards::list).post(leaderboards::create),
        )
        .route(
            "/api/leaderboards/:id/categories",
            post(categories::create_category),
        )
        .route("/api/leaderboard/:slug", get(leaderboards::get_by_slug))
        .route("/api/users/register", post(users::register))
        .route("/api/users/confirm", post(users::confirm))
        .route("/api/users/login", post(users::login))
        .route("/api/users/recover", post(users::recover))
        .route("/api/users/recover/confirm", post(users::recover_confirm))
        .route("/admin/mail/config", get(email::mail_config_handler))
        .route("/admin/mail/test", post(email::mail_test_handler))
        .with_state(state)
}

pub(crate) fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
