//! Wire views over persisted models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::{RunType, SortDirection, UserRole, categories, leaderboards, runs, users};
use crate::{run_id, run_time};

/// A run presented with its value correctly typed. Which variant applies is
/// decided by the owning category, which callers must resolve first; the
/// constructor takes it by reference so an unresolved category cannot reach
/// this point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "runType")]
pub enum RunView {
    #[serde(rename_all = "camelCase")]
    Time {
        id: String,
        category_id: Uuid,
        user_id: Uuid,
        info: String,
        played_on: NaiveDate,
        time: String,
        created_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    Score {
        id: String,
        category_id: Uuid,
        user_id: Uuid,
        info: String,
        played_on: NaiveDate,
        score: i64,
        created_at: DateTime<Utc>,
    },
}

impl RunView {
    pub fn from_model(run: &runs::Model, category: &categories::Model) -> Self {
        let id = run_id::encode(run.id);
        match category.run_type {
            RunType::Time => RunView::Time {
                id,
                category_id: run.category_id,
                user_id: run.user_id,
                info: run.info.clone(),
                played_on: run.played_on,
                time: run_time::format_run_time(run.time_or_score),
                created_at: run.created_at,
            },
            RunType::Score => RunView::Score {
                id,
                category_id: run.category_id,
                user_id: run.user_id,
                info: run.info.clone(),
                played_on: run.played_on,
                score: run.time_or_score,
                created_at: run.created_at,
            },
        }
    }

    pub fn id(&self) -> &str {
        match self {
            RunView::Time { id, .. } | RunView::Score { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub id: Uuid,
    pub leaderboard_id: Uuid,
    pub name: String,
    pub slug: String,
    pub run_type: RunType,
    pub sort_direction: SortDirection,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<&categories::Model> for CategoryView {
    fn from(category: &categories::Model) -> Self {
        Self {
            id: category.id,
            leaderboard_id: category.leaderboard_id,
            name: category.name.clone(),
            slug: category.slug.clone(),
            run_type: category.run_type,
            sort_direction: category.sort_direction,
            deleted_at: category.deleted_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardView {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<&leaderboards::Model> for LeaderboardView {
    fn from(board: &leaderboards::Model) -> Self {
        Self {
            id: board.id,
            name: board.name.clone(),
            slug: board.slug.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub role: UserRole,
}

impl From<&users::Model> for UserView {
    fn from(user: &users::Model) -> Self {
        Self {
            id: user.id,
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn category(run_type: RunType) -> categories::Model {
        categories::Model {
            id: Uuid::new_v4(),
            leaderboard_id: Uuid::new_v4(),
            name: "Any%".into(),
            slug: "any".into(),
            run_type,
            sort_direction: SortDirection::Ascending,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn run(category: &categories::Model, value: i64) -> runs::Model {
        runs::Model {
            id: Uuid::new_v4(),
            category_id: category.id,
            user_id: Uuid::new_v4(),
            info: String::new(),
            played_on: "2025-01-01".parse().unwrap(),
            time_or_score: value,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn timed_category_yields_a_time_view() {
        let category = category(RunType::Time);
        let run = run(&category, 622_111_000_000);
        let view = RunView::from_model(&run, &category);
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["runType"], json!("Time"));
        assert_eq!(value["time"], json!("00:10:22.111"));
        assert!(value.get("score").is_none());
    }

    #[test]
    fn scored_category_yields_a_score_view() {
        let category = category(RunType::Score);
        let run = run(&category, 9_001);
        let view = RunView::from_model(&run, &category);
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["runType"], json!("Score"));
        assert_eq!(value["score"], json!(9_001));
        assert!(value.get("time").is_none());
    }

    #[test]
    fn view_id_is_the_encoded_token() {
        let category = category(RunType::Score);
        let run = run(&category, 1);
        let view = RunView::from_model(&run, &category);
        assert_eq!(crate::run_id::decode(view.id()), Some(run.id));
    }
}
