//! Run submission and leaderboard catalog queries.
//!
//! Every fallible domain outcome is an explicit enum variant so the HTTP
//! layer can match exhaustively; nothing here reaches callers as a panic.

use chrono::{NaiveDate, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{RunType, SortDirection, categories, leaderboards, runs, users};
use crate::run_time;

/// Window over an ordered result set. Handlers validate raw query integers
/// before building one, so both fields are already known non-negative.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

pub const DEFAULT_PAGE_LIMIT: u64 = 64;

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

/// Run submission payload. `time` and `score` are mutually exclusive and
/// selected by `run_type`, which must match the category's configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRun {
    pub run_type: RunType,
    pub played_on: NaiveDate,
    #[serde(default)]
    pub info: String,
    pub time: Option<String>,
    pub score: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub run_type: RunType,
    pub sort_direction: SortDirection,
}

#[derive(Debug, Error)]
pub enum CreateRunError {
    #[error("submitting runs requires a confirmed account")]
    BadRole,
    #[error("category not found")]
    CategoryNotFound,
    #[error("category is deleted")]
    CategoryDeleted,
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Db(#[from] DbErr),
}

#[derive(Debug, Error)]
pub enum ListRunsError {
    #[error("category not found")]
    CategoryNotFound,
    #[error(transparent)]
    Db(#[from] DbErr),
}

#[derive(Debug, Error)]
pub enum CreateLeaderboardError {
    #[error("administrator role required")]
    BadRole,
    #[error("a leaderboard with this slug already exists")]
    SlugTaken,
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Db(#[from] DbErr),
}

#[derive(Debug, Error)]
pub enum CreateCategoryError {
    #[error("administrator role required")]
    BadRole,
    #[error("leaderboard not found")]
    LeaderboardNotFound,
    #[error("a category with this slug already exists on this leaderboard")]
    SlugTaken,
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Db(#[from] DbErr),
}

#[derive(Debug, Error)]
pub enum DeleteCategoryError {
    #[error("administrator role required")]
    BadRole,
    #[error("category not found")]
    NotFound,
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// One page of runs under a category, with the category itself so callers
/// can type the views, and the filtered total for pagination.
#[derive(Debug)]
pub struct RunsPage {
    pub category: categories::Model,
    pub runs: Vec<runs::Model>,
    pub total: u64,
}

#[derive(Clone)]
pub struct LeaderboardService {
    db: DatabaseConnection,
}

impl LeaderboardService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a run under a category on behalf of `user`.
    ///
    /// Exactly one durable write happens on success, none on any failure.
    /// Returns the created run with its resolved category.
    pub async fn create_run(
        &self,
        user: &users::Model,
        category_id: Uuid,
        submission: &NewRun,
    ) -> Result<(runs::Model, categories::Model), CreateRunError> {
        if !user.role.can_submit_runs() {
            return Err(CreateRunError::BadRole);
        }
        let category = categories::Entity::find_by_id(category_id)
            .one(&self.db)
            .await?
            .ok_or(CreateRunError::CategoryNotFound)?;
        if category.deleted_at.is_some() {
            return Err(CreateRunError::CategoryDeleted);
        }
        let value = normalize_value(&category, submission)?;

        let run = runs::ActiveModel {
            id: Set(Uuid::new_v4()),
            category_id: Set(category.id),
            user_id: Set(user.id),
            info: Set(submission.info.clone()),
            played_on: Set(submission.played_on),
            time_or_score: Set(value),
            created_at: Set(Utc::now()),
            deleted_at: Set(None),
        }
        .insert(&self.db)
        .await?;
        Ok((run, category))
    }

    /// Fetch a single run with its category. Soft-deleted runs are not
    /// returned; there is no include-deleted toggle for single lookup.
    pub async fn get_run(
        &self,
        id: Uuid,
    ) -> Result<Option<(runs::Model, categories::Model)>, DbErr> {
        let found = runs::Entity::find_by_id(id)
            .filter(runs::Column::DeletedAt.is_null())
            .find_also_related(categories::Entity)
            .one(&self.db)
            .await?;
        match found {
            Some((run, Some(category))) => Ok(Some((run, category))),
            // a run's category FK is immutable and never hard-deleted
            Some((run, None)) => Err(DbErr::RecordNotFound(format!(
                "category {} for run {}",
                run.category_id, run.id
            ))),
            None => Ok(None),
        }
    }

    pub async fn category_for_run(&self, id: Uuid) -> Result<Option<categories::Model>, DbErr> {
        Ok(self.get_run(id).await?.map(|(_, category)| category))
    }

    /// List runs under a category, oldest `played_on` first, insertion order
    /// breaking ties. A soft-deleted category is still listable; only run
    /// creation rejects it.
    pub async fn runs_for_category(
        &self,
        category_id: Uuid,
        page: Page,
        include_deleted: bool,
    ) -> Result<RunsPage, ListRunsError> {
        let category = categories::Entity::find_by_id(category_id)
            .one(&self.db)
            .await?
            .ok_or(ListRunsError::CategoryNotFound)?;

        let mut query = runs::Entity::find().filter(runs::Column::CategoryId.eq(category_id));
        if !include_deleted {
            query = query.filter(runs::Column::DeletedAt.is_null());
        }
        let total = query.clone().count(&self.db).await?;
        let runs = query
            .order_by_asc(runs::Column::PlayedOn)
            .order_by_asc(runs::Column::CreatedAt)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await?;
        Ok(RunsPage {
            category,
            runs,
            total,
        })
    }

    pub async fn get_category(&self, id: Uuid) -> Result<Option<categories::Model>, DbErr> {
        categories::Entity::find_by_id(id).one(&self.db).await
    }

    pub async fn leaderboards(&self) -> Result<Vec<leaderboards::Model>, DbErr> {
        leaderboards::Entity::find()
            .order_by_asc(leaderboards::Column::Name)
            .all(&self.db)
            .await
    }

    /// A leaderboard with its live (non-deleted) categories.
    pub async fn leaderboard_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<(leaderboards::Model, Vec<categories::Model>)>, DbErr> {
        let Some(board) = leaderboards::Entity::find()
            .filter(leaderboards::Column::Slug.eq(slug))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };
        let categories = categories::Entity::find()
            .filter(categories::Column::LeaderboardId.eq(board.id))
            .filter(categories::Column::DeletedAt.is_null())
            .order_by_asc(categories::Column::Name)
            .all(&self.db)
            .await?;
        Ok(Some((board, categories)))
    }

    pub async fn create_leaderboard(
        &self,
        user: &users::Model,
        name: &str,
        slug: &str,
    ) -> Result<leaderboards::Model, CreateLeaderboardError> {
        if !user.role.is_admin() {
            return Err(CreateLeaderboardError::BadRole);
        }
        validate_name_and_slug(name, slug).map_err(CreateLeaderboardError::Invalid)?;
        let taken = leaderboards::Entity::find()
            .filter(leaderboards::Column::Slug.eq(slug))
            .count(&self.db)
            .await?;
        if taken > 0 {
            return Err(CreateLeaderboardError::SlugTaken);
        }
        let board = leaderboards::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_owned()),
            slug: Set(slug.to_owned()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;
        Ok(board)
    }

    pub async fn create_category(
        &self,
        user: &users::Model,
        leaderboard_id: Uuid,
        category: &NewCategory,
    ) -> Result<categories::Model, CreateCategoryError> {
        if !user.role.is_admin() {
            return Err(CreateCategoryError::BadRole);
        }
        validate_name_and_slug(&category.name, &category.slug)
            .map_err(CreateCategoryError::Invalid)?;
        if leaderboards::Entity::find_by_id(leaderboard_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(CreateCategoryError::LeaderboardNotFound);
        }
        let taken = categories::Entity::find()
            .filter(categories::Column::LeaderboardId.eq(leaderboard_id))
            .filter(categories::Column::Slug.eq(category.slug.as_str()))
            .count(&self.db)
            .await?;
        if taken > 0 {
            return Err(CreateCategoryError::SlugTaken);
        }
        let created = categories::ActiveModel {
            id: Set(Uuid::new_v4()),
            leaderboard_id: Set(leaderboard_id),
            name: Set(category.name.clone()),
            slug: Set(category.slug.clone()),
            run_type: Set(category.run_type),
            sort_direction: Set(category.sort_direction),
            created_at: Set(Utc::now()),
            deleted_at: Set(None),
        }
        .insert(&self.db)
        .await?;
        Ok(created)
    }

    /// Soft-delete a category. Its runs stay browsable; new submissions are
    /// rejected from this point on. Deleting twice reports not-found.
    pub async fn delete_category(
        &self,
        user: &users::Model,
        id: Uuid,
    ) -> Result<(), DeleteCategoryError> {
        if !user.role.is_admin() {
            return Err(DeleteCategoryError::BadRole);
        }
        let category = categories::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DeleteCategoryError::NotFound)?;
        if category.deleted_at.is_some() {
            return Err(DeleteCategoryError::NotFound);
        }
        let mut active: categories::ActiveModel = category.into();
        active.deleted_at = Set(Some(Utc::now()));
        active.update(&self.db).await?;
        Ok(())
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

fn normalize_value(
    category: &categories::Model,
    submission: &NewRun,
) -> Result<i64, CreateRunError> {
    if submission.run_type != category.run_type {
        return Err(CreateRunError::Invalid(
            "run type does not match the category".into(),
        ));
    }
    match category.run_type {
        RunType::Time => {
            if submission.score.is_some() {
                return Err(CreateRunError::Invalid(
                    "a timed category does not accept a score".into(),
                ));
            }
            let time = submission.time.as_deref().ok_or_else(|| {
                CreateRunError::Invalid("a timed category requires a time".into())
            })?;
            run_time::parse_run_time(time)
                .ok_or_else(|| CreateRunError::Invalid("time could not be parsed".into()))
        }
        RunType::Score => {
            if submission.time.is_some() {
                return Err(CreateRunError::Invalid(
                    "a scored category does not accept a time".into(),
                ));
            }
            let score = submission.score.ok_or_else(|| {
                CreateRunError::Invalid("a scored category requires a score".into())
            })?;
            if score < 0 {
                return Err(CreateRunError::Invalid("score must not be negative".into()));
            }
            Ok(score)
        }
    }
}

fn validate_name_and_slug(name: &str, slug: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("name must not be empty".into());
    }
    if slug.is_empty()
        || !slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    {
        return Err("slug must be non-empty lowercase letters, digits or dashes".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::UserRole;
    use crate::views::RunView;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database};

    async fn test_db() -> DatabaseConnection {
        let mut opts = ConnectOptions::new("sqlite::memory:".to_owned());
        opts.max_connections(1);
        let db = Database::connect(opts).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn seed_user(db: &DatabaseConnection, role: UserRole) -> users::Model {
        let id = Uuid::new_v4();
        users::ActiveModel {
            id: Set(id),
            email: Set(format!("{id}@example.com")),
            password_hash: Set("x".into()),
            role: Set(role),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .unwrap()
    }

    async fn seed_board(service: &LeaderboardService) -> leaderboards::Model {
        let admin = seed_user(service.db(), UserRole::Administrator).await;
        let slug = format!("board-{}", Uuid::new_v4().simple());
        service
            .create_leaderboard(&admin, "Celeste", &slug)
            .await
            .unwrap()
    }

    async fn seed_category(service: &LeaderboardService, run_type: RunType) -> categories::Model {
        let admin = seed_user(service.db(), UserRole::Administrator).await;
        let board = seed_board(service).await;
        service
            .create_category(
                &admin,
                board.id,
                &NewCategory {
                    name: "Any%".into(),
                    slug: "any".into(),
                    run_type,
                    sort_direction: SortDirection::Ascending,
                },
            )
            .await
            .unwrap()
    }

    fn timed_submission(time: &str) -> NewRun {
        NewRun {
            run_type: RunType::Time,
            played_on: "2025-01-01".parse().unwrap(),
            info: String::new(),
            time: Some(time.to_owned()),
            score: None,
        }
    }

    fn scored_submission(score: i64) -> NewRun {
        NewRun {
            run_type: RunType::Score,
            played_on: "2025-01-01".parse().unwrap(),
            info: String::new(),
            time: None,
            score: Some(score),
        }
    }

    async fn soft_delete_run(db: &DatabaseConnection, run: runs::Model) {
        let mut active: runs::ActiveModel = run.into();
        active.deleted_at = Set(Some(Utc::now()));
        active.update(db).await.unwrap();
    }

    #[tokio::test]
    async fn created_run_is_immediately_fetchable() {
        let service = LeaderboardService::new(test_db().await);
        let category = seed_category(&service, RunType::Time).await;
        let user = seed_user(service.db(), UserRole::Confirmed).await;

        let (run, cat) = service
            .create_run(&user, category.id, &timed_submission("00:10:22.111"))
            .await
            .unwrap();
        assert_eq!(run.time_or_score, 622_111 * 1_000_000);

        let (fetched, fetched_cat) = service.get_run(run.id).await.unwrap().unwrap();
        assert_eq!(fetched, run);
        assert_eq!(
            RunView::from_model(&fetched, &fetched_cat),
            RunView::from_model(&run, &cat)
        );
    }

    #[tokio::test]
    async fn role_gate_rejects_unconfirmed_and_banned() {
        let service = LeaderboardService::new(test_db().await);
        let category = seed_category(&service, RunType::Time).await;

        for role in [UserRole::Registered, UserRole::Banned] {
            let user = seed_user(service.db(), role).await;
            let err = service
                .create_run(&user, category.id, &timed_submission("00:01:00"))
                .await
                .unwrap_err();
            assert!(matches!(err, CreateRunError::BadRole), "{role:?}: {err}");
        }
        // a perfectly valid payload makes no difference
        let page = service
            .runs_for_category(category.id, Page::default(), true)
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn missing_category_is_distinguished_from_deleted() {
        let service = LeaderboardService::new(test_db().await);
        let category = seed_category(&service, RunType::Time).await;
        let admin = seed_user(service.db(), UserRole::Administrator).await;
        let user = seed_user(service.db(), UserRole::Confirmed).await;

        let err = service
            .create_run(&user, Uuid::new_v4(), &timed_submission("00:01:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, CreateRunError::CategoryNotFound));

        service.delete_category(&admin, category.id).await.unwrap();
        let err = service
            .create_run(&user, category.id, &timed_submission("00:01:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, CreateRunError::CategoryDeleted));
    }

    #[tokio::test]
    async fn deleted_category_blocks_creation_but_not_listing() {
        let service = LeaderboardService::new(test_db().await);
        let category = seed_category(&service, RunType::Score).await;
        let admin = seed_user(service.db(), UserRole::Administrator).await;
        let user = seed_user(service.db(), UserRole::Confirmed).await;

        service
            .create_run(&user, category.id, &scored_submission(10))
            .await
            .unwrap();
        service.delete_category(&admin, category.id).await.unwrap();

        assert!(matches!(
            service
                .create_run(&user, category.id, &scored_submission(11))
                .await,
            Err(CreateRunError::CategoryDeleted)
        ));
        let page = service
            .runs_for_category(category.id, Page::default(), false)
            .await
            .unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn payload_must_match_the_category_run_type() {
        let service = LeaderboardService::new(test_db().await);
        let timed = seed_category(&service, RunType::Time).await;
        let user = seed_user(service.db(), UserRole::Confirmed).await;

        let cases = [
            scored_submission(5),
            NewRun {
                time: None,
                ..timed_submission("00:01:00")
            },
            timed_submission("not a time"),
            NewRun {
                score: Some(3),
                ..timed_submission("00:01:00")
            },
        ];
        for submission in &cases {
            let err = service
                .create_run(&user, timed.id, submission)
                .await
                .unwrap_err();
            assert!(
                matches!(err, CreateRunError::Invalid(_)),
                "{submission:?}: {err}"
            );
        }

        let scored = seed_category(&service, RunType::Score).await;
        let err = service
            .create_run(&user, scored.id, &scored_submission(-1))
            .await
            .unwrap_err();
        assert!(matches!(err, CreateRunError::Invalid(_)));

        // nothing was written by any failure path
        for category in [timed.id, scored.id] {
            let page = service
                .runs_for_category(category, Page::default(), true)
                .await
                .unwrap();
            assert_eq!(page.total, 0);
        }
    }

    async fn three_run_fixture(
        service: &LeaderboardService,
    ) -> (categories::Model, Vec<runs::Model>) {
        let category = seed_category(service, RunType::Score).await;
        let user = seed_user(service.db(), UserRole::Confirmed).await;
        let mut created = Vec::new();
        for (played_on, score) in [("2025-01-01", 10), ("2025-01-02", 20), ("2025-01-03", 30)] {
            let submission = NewRun {
                played_on: played_on.parse().unwrap(),
                ..scored_submission(score)
            };
            let (run, _) = service
                .create_run(&user, category.id, &submission)
                .await
                .unwrap();
            created.push(run);
        }
        // the middle run disappears from default listings
        soft_delete_run(service.db(), created[1].clone()).await;
        (category, created)
    }

    #[tokio::test]
    async fn soft_deleted_runs_are_filtered_by_default() {
        let service = LeaderboardService::new(test_db().await);
        let (category, created) = three_run_fixture(&service).await;

        let page = service
            .runs_for_category(category.id, Page::default(), false)
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(
            page.runs.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![created[0].id, created[2].id]
        );

        let page = service
            .runs_for_category(category.id, Page::default(), true)
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(
            page.runs.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![created[0].id, created[1].id, created[2].id]
        );
    }

    #[tokio::test]
    async fn pagination_windows_the_ordered_set() {
        let service = LeaderboardService::new(test_db().await);
        let (category, created) = three_run_fixture(&service).await;

        let page = service
            .runs_for_category(category.id, Page { limit: 1, offset: 1 }, true)
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.runs.len(), 1);
        assert_eq!(page.runs[0].id, created[1].id);
    }

    #[tokio::test]
    async fn offset_past_the_end_yields_an_empty_page() {
        let service = LeaderboardService::new(test_db().await);
        let (category, _) = three_run_fixture(&service).await;

        let page = service
            .runs_for_category(category.id, Page { limit: 10, offset: 50 }, true)
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert!(page.runs.is_empty());
    }

    #[tokio::test]
    async fn listing_an_unknown_category_fails() {
        let service = LeaderboardService::new(test_db().await);
        let err = service
            .runs_for_category(Uuid::new_v4(), Page::default(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, ListRunsError::CategoryNotFound));
    }

    #[tokio::test]
    async fn played_on_orders_before_insertion_order() {
        let service = LeaderboardService::new(test_db().await);
        let category = seed_category(&service, RunType::Score).await;
        let user = seed_user(service.db(), UserRole::Confirmed).await;

        // inserted newest date first; same-date runs keep insertion order
        let mut ids = Vec::new();
        for (played_on, score) in [("2025-02-01", 1), ("2025-01-01", 2), ("2025-01-01", 3)] {
            let submission = NewRun {
                played_on: played_on.parse().unwrap(),
                ..scored_submission(score)
            };
            let (run, _) = service
                .create_run(&user, category.id, &submission)
                .await
                .unwrap();
            ids.push(run.id);
        }
        let page = service
            .runs_for_category(category.id, Page::default(), false)
            .await
            .unwrap();
        assert_eq!(
            page.runs.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![ids[1], ids[2], ids[0]]
        );
    }

    #[tokio::test]
    async fn soft_deleted_run_is_gone_from_single_lookup() {
        let service = LeaderboardService::new(test_db().await);
        let category = seed_category(&service, RunType::Score).await;
        let user = seed_user(service.db(), UserRole::Confirmed).await;
        let (run, _) = service
            .create_run(&user, category.id, &scored_submission(1))
            .await
            .unwrap();
        soft_delete_run(service.db(), run.clone()).await;

        assert!(service.get_run(run.id).await.unwrap().is_none());
        assert!(service.category_for_run(run.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn category_for_run_resolves_the_owner() {
        let service = LeaderboardService::new(test_db().await);
        let category = seed_category(&service, RunType::Time).await;
        let user = seed_user(service.db(), UserRole::Confirmed).await;
        let (run, _) = service
            .create_run(&user, category.id, &timed_submission("00:01:00"))
            .await
            .unwrap();

        let owner = service.category_for_run(run.id).await.unwrap().unwrap();
        assert_eq!(owner.id, category.id);
        assert!(service
            .category_for_run(Uuid::new_v4())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn category_slugs_are_unique_per_leaderboard() {
        let service = LeaderboardService::new(test_db().await);
        let admin = seed_user(service.db(), UserRole::Administrator).await;
        let board = seed_board(&service).await;
        let other = service
            .create_leaderboard(&admin, "Hollow Knight", "hollow-knight")
            .await
            .unwrap();

        let new_category = NewCategory {
            name: "Glitchless".into(),
            slug: "glitchless".into(),
            run_type: RunType::Time,
            sort_direction: SortDirection::Ascending,
        };
        service
            .create_category(&admin, board.id, &new_category)
            .await
            .unwrap();
        let err = service
            .create_category(&admin, board.id, &new_category)
            .await
            .unwrap_err();
        assert!(matches!(err, CreateCategoryError::SlugTaken));
        // the same slug is fine under a different leaderboard
        service
            .create_category(&admin, other.id, &new_category)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn curation_requires_the_administrator_role() {
        let service = LeaderboardService::new(test_db().await);
        let user = seed_user(service.db(), UserRole::Confirmed).await;
        let board = seed_board(&service).await;

        assert!(matches!(
            service.create_leaderboard(&user, "Nope", "nope").await,
            Err(CreateLeaderboardError::BadRole)
        ));
        assert!(matches!(
            service
                .create_category(
                    &user,
                    board.id,
                    &NewCategory {
                        name: "Nope".into(),
                        slug: "nope".into(),
                        run_type: RunType::Time,
                        sort_direction: SortDirection::Ascending,
                    }
                )
                .await,
            Err(CreateCategoryError::BadRole)
        ));
        assert!(matches!(
            service.delete_category(&user, Uuid::new_v4()).await,
            Err(DeleteCategoryError::BadRole)
        ));
    }

    #[tokio::test]
    async fn leaderboard_slugs_are_validated_and_unique() {
        let service = LeaderboardService::new(test_db().await);
        let admin = seed_user(service.db(), UserRole::Administrator).await;

        service
            .create_leaderboard(&admin, "Portal", "portal")
            .await
            .unwrap();
        assert!(matches!(
            service.create_leaderboard(&admin, "Portal 2", "portal").await,
            Err(CreateLeaderboardError::SlugTaken)
        ));
        assert!(matches!(
            service.create_leaderboard(&admin, "Bad", "Not A Slug").await,
            Err(CreateLeaderboardError::Invalid(_))
        ));
        assert!(matches!(
            service.create_leaderboard(&admin, "", "empty-name").await,
            Err(CreateLeaderboardError::Invalid(_))
        ));

        let (board, categories) = service
            .leaderboard_by_slug("portal")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(board.name, "Portal");
        assert!(categories.is_empty());
        assert!(service.leaderboard_by_slug("absent").await.unwrap().is_none());
    }
}
