//! Run endpoints: submission, single lookup, paginated listing.
//!
//! Every service outcome is matched exhaustively here; the service never
//! throws for an expected domain failure.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use leaderboard::service::DEFAULT_PAGE_LIMIT;
use leaderboard::{
    run_id, CategoryView, CreateRunError, ListRunsError, NewRun, Page, RunView,
};

use crate::auth::CurrentUser;
use crate::{json_error, AppState};

/// GET /api/run/:id
///
/// The id is the URL-safe token; anything that does not decode to a stored,
/// live run is a plain 404.
pub async fn get_run(State(state): State<Arc<AppState>>, Path(token): Path<String>) -> Response {
    let Some(id) = run_id::decode(&token) else {
        return json_error(StatusCode::NOT_FOUND, "run not found");
    };
    match state.leaderboard.get_run(id).await {
        Ok(Some((run, category))) => Json(RunView::from_model(&run, &category)).into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "run not found"),
        Err(e) => db_error("fetching run", e),
    }
}

/// GET /api/run/:id/category
pub async fn get_run_category(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Response {
    let Some(id) = run_id::decode(&token) else {
        return json_error(StatusCode::NOT_FOUND, "run not found");
    };
    match state.leaderboard.category_for_run(id).await {
        Ok(Some(category)) => Json(CategoryView::from(&category)).into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "run not found"),
        Err(e) => db_error("fetching run category", e),
    }
}

/// POST /api/category/:id/runs
pub async fn create_run(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<Uuid>,
    CurrentUser(user): CurrentUser,
    Json(submission): Json<NewRun>,
) -> Response {
    match state
        .leaderboard
        .create_run(&user, category_id, &submission)
        .await
    {
        Ok((run, category)) => {
            let view = RunView::from_model(&run, &category);
            let location = format!("/api/run/{}", view.id());
            (
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(view),
            )
                .into_response()
        }
        Err(CreateRunError::BadRole) => json_error(
            StatusCode::FORBIDDEN,
            "submitting runs requires a confirmed account",
        ),
        Err(CreateRunError::CategoryNotFound) => {
            json_error(StatusCode::NOT_FOUND, "category not found")
        }
        Err(CreateRunError::CategoryDeleted) => {
            json_error(StatusCode::NOT_FOUND, "category is deleted")
        }
        Err(CreateRunError::Invalid(reason)) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, &reason)
        }
        Err(CreateRunError::Db(e)) => db_error("creating run", e),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRunsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    #[serde(default)]
    pub include_deleted: bool,
}

#[derive(Debug, Serialize)]
pub struct RunsPageBody {
    pub data: Vec<RunView>,
    pub total: u64,
}

/// GET /api/category/:id/runs?limit=&offset=&includeDeleted=
pub async fn list_runs(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<Uuid>,
    Query(query): Query<ListRunsQuery>,
) -> Response {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT as i64);
    let offset = query.offset.unwrap_or(0);
    if limit < 0 || offset < 0 {
        return json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "limit and offset must not be negative",
        );
    }
    let page = Page {
        limit: limit as u64,
        offset: offset as u64,
    };
    match state
        .leaderboard
        .runs_for_category(category_id, page, query.include_deleted)
        .await
    {
        Ok(page) => {
            let data = page
                .runs
                .iter()
                .map(|run| RunView::from_model(run, &page.category))
                .collect();
            Json(RunsPageBody {
                data,
                total: page.total,
            })
            .into_response()
        }
        Err(ListRunsError::CategoryNotFound) => {
            json_error(StatusCode::NOT_FOUND, "category not found")
        }
        Err(ListRunsError::Db(e)) => db_error("listing runs", e),
    }
}

pub(crate) fn db_error(context: &str, e: DbErr) -> Response {
    log::error!("{context}: {e}");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
}
