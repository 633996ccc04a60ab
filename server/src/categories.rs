//! Category curation and lookup.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use leaderboard::{CategoryView, CreateCategoryError, DeleteCategoryError, NewCategory};

use crate::auth::CurrentUser;
use crate::runs::db_error;
use crate::{json_error, AppState};

/// GET /api/category/:id
///
/// Soft-deleted categories are still served; the view carries `deletedAt`.
pub async fn get_category(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Response {
    match state.leaderboard.get_category(id).await {
        Ok(Some(category)) => Json(CategoryView::from(&category)).into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "category not found"),
        Err(e) => db_error("fetching category", e),
    }
}

/// POST /api/leaderboards/:id/categories
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Path(leaderboard_id): Path<Uuid>,
    CurrentUser(user): CurrentUser,
    Json(category): Json<NewCategory>,
) -> Response {
    match state
        .leaderboard
        .create_category(&user, leaderboard_id, &category)
        .await
    {
        Ok(created) => {
            (StatusCode::CREATED, Json(CategoryView::from(&created))).into_response()
        }
        Err(CreateCategoryError::BadRole) => {
            json_error(StatusCode::FORBIDDEN, "administrator role required")
        }
        Err(CreateCategoryError::LeaderboardNotFound) => {
            json_error(StatusCode::NOT_FOUND, "leaderboard not found")
        }
        Err(CreateCategoryError::SlugTaken) => json_error(
            StatusCode::CONFLICT,
            "a category with this slug already exists on this leaderboard",
        ),
        Err(CreateCategoryError::Invalid(reason)) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, &reason)
        }
        Err(CreateCategoryError::Db(e)) => db_error("creating category", e),
    }
}

/// DELETE /api/category/:id — soft delete.
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    CurrentUser(user): CurrentUser,
) -> Response {
    match state.leaderboard.delete_category(&user, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(DeleteCategoryError::BadRole) => {
            json_error(StatusCode::FORBIDDEN, "administrator role required")
        }
        Err(DeleteCategoryError::NotFound) => {
            json_error(StatusCode::NOT_FOUND, "category not found")
        }
        Err(DeleteCategoryError::Db(e)) => db_error("deleting category", e),
    }
}
