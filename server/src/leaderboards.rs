//! Leaderboard curation and browsing.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use leaderboard::{CategoryView, CreateLeaderboardError, LeaderboardView};

use crate::auth::CurrentUser;
use crate::runs::db_error;
use crate::{json_error, AppState};

/// GET /api/leaderboards
pub async fn list(State(state): State<Arc<AppState>>) -> Response {
    match state.leaderboard.leaderboards().await {
        Ok(boards) => {
            Json(boards.iter().map(LeaderboardView::from).collect::<Vec<_>>()).into_response()
        }
        Err(e) => db_error("listing leaderboards", e),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardDetail {
    #[serde(flatten)]
    pub leaderboard: LeaderboardView,
    pub categories: Vec<CategoryView>,
}

/// GET /api/leaderboard/:slug
pub async fn get_by_slug(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Response {
    match state.leaderboard.leaderboard_by_slug(&slug).await {
        Ok(Some((board, categories))) => Json(LeaderboardDetail {
            leaderboard: LeaderboardView::from(&board),
            categories: categories.iter().map(CategoryView::from).collect(),
        })
        .into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "leaderboard not found"),
        Err(e) => db_error("fetching leaderboard", e),
    }
}

#[derive(Debug, Deserialize)]
pub struct NewLeaderboard {
    pub name: String,
    pub slug: String,
}

/// POST /api/leaderboards
pub async fn create(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(board): Json<NewLeaderboard>,
) -> Response {
    match state
        .leaderboard
        .create_leaderboard(&user, &board.name, &board.slug)
        .await
    {
        Ok(created) => {
            (StatusCode::CREATED, Json(LeaderboardView::from(&created))).into_response()
        }
        Err(CreateLeaderboardError::BadRole) => {
            json_error(StatusCode::FORBIDDEN, "administrator role required")
        }
        Err(CreateLeaderboardError::SlugTaken) => json_error(
            StatusCode::CONFLICT,
            "a leaderboard with this slug already exists",
        ),
        Err(CreateLeaderboardError::Invalid(reason)) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, &reason)
        }
        Err(CreateLeaderboardError::Db(e)) => db_error("creating leaderboard", e),
    }
}
