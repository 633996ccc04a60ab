//! Account lifecycle: registration, confirmation, login, recovery.
//!
//! Mail enqueueing is all-or-nothing with the record that triggered it: a
//! confirmation or recovery row is only persisted after its email was
//! accepted by the queue.

use std::sync::Arc;

use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Duration, Utc};
use email_address::EmailAddress;
use rand::distributions::Alphanumeric;
use rand::Rng;
use rand_core::OsRng;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use leaderboard::entities::{account_confirmations, account_recoveries, users, UserRole};
use leaderboard::UserView;

use crate::runs::db_error;
use crate::{auth, json_error, AppState};

const MIN_PASSWORD_LENGTH: usize = 8;
const CODE_LENGTH: usize = 32;
const CONFIRMATION_TTL_HOURS: i64 = 24;
const RECOVERY_TTL_HOURS: i64 = 1;

fn random_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| rng.sample(Alphanumeric) as char)
        .collect()
}

pub(crate) fn hash_password(password: &str) -> Option<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .ok()
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/users/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Response {
    if body.email.parse::<EmailAddress>().is_err() {
        return json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid email address");
    }
    if body.password.chars().count() < MIN_PASSWORD_LENGTH {
        return json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "password must be at least 8 characters",
        );
    }
    match users::Entity::find()
        .filter(users::Column::Email.eq(body.email.as_str()))
        .one(&state.db)
        .await
    {
        Ok(Some(_)) => {
            return json_error(StatusCode::CONFLICT, "an account with this email exists")
        }
        Ok(None) => {}
        Err(e) => return db_error("checking email", e),
    }
    let Some(password_hash) = hash_password(&body.password) else {
        log::error!("password hashing failed");
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error");
    };

    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(body.email.clone()),
        password_hash: Set(password_hash),
        role: Set(UserRole::Registered),
        created_at: Set(Utc::now()),
    };
    let user = match user.insert(&state.db).await {
        Ok(user) => user,
        Err(e) => return db_error("creating user", e),
    };

    // the confirmation row only exists once its mail is queued
    let code = random_code();
    match state.email.send_confirmation_code(&user.email, &code) {
        Ok(()) => {
            let confirmation = account_confirmations::ActiveModel {
                code: Set(code),
                user_id: Set(user.id),
                created_at: Set(Utc::now()),
                expires_at: Set(Utc::now() + Duration::hours(CONFIRMATION_TTL_HOURS)),
            };
            if let Err(e) = confirmation.insert(&state.db).await {
                return db_error("creating confirmation", e);
            }
        }
        Err(e) => log::warn!("confirmation mail for {} not queued: {e}", user.id),
    }

    (StatusCode::CREATED, Json(UserView::from(&user))).into_response()
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub code: String,
}

/// POST /api/users/confirm
pub async fn confirm(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ConfirmRequest>,
) -> Response {
    let confirmation = match account_confirmations::Entity::find_by_id(body.code)
        .filter(account_confirmations::Column::ExpiresAt.gt(Utc::now()))
        .one(&state.db)
        .await
    {
        Ok(Some(confirmation)) => confirmation,
        Ok(None) => return json_error(StatusCode::NOT_FOUND, "confirmation code not found"),
        Err(e) => return db_error("fetching confirmation", e),
    };
    let user = match users::Entity::find_by_id(confirmation.user_id)
        .one(&state.db)
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => return json_error(StatusCode::NOT_FOUND, "confirmation code not found"),
        Err(e) => return db_error("fetching user", e),
    };

    // only a freshly registered account gets promoted; admins keep their
    // role and bans stick
    let user = if user.role == UserRole::Registered {
        let mut active: users::ActiveModel = user.into();
        active.role = Set(UserRole::Confirmed);
        match active.update(&state.db).await {
            Ok(user) => user,
            Err(e) => return db_error("promoting user", e),
        }
    } else {
        user
    };

    if let Err(e) = account_confirmations::Entity::delete_by_id(confirmation.code)
        .exec(&state.db)
        .await
    {
        return db_error("deleting confirmation", e);
    }
    Json(UserView::from(&user)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /api/users/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Response {
    let user = match users::Entity::find()
        .filter(users::Column::Email.eq(body.email.as_str()))
        .one(&state.db)
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => return json_error(StatusCode::UNAUTHORIZED, "invalid credentials"),
        Err(e) => return db_error("fetching user", e),
    };
    if !verify_password(&body.password, &user.password_hash) {
        return json_error(StatusCode::UNAUTHORIZED, "invalid credentials");
    }
    if user.role == UserRole::Banned {
        return json_error(StatusCode::UNAUTHORIZED, "account is banned");
    }
    match auth::issue_token(&state.db, user.id).await {
        Ok(token) => Json(LoginResponse { token }).into_response(),
        Err(e) => db_error("issuing token", e),
    }
}

#[derive(Debug, Deserialize)]
pub struct RecoverRequest {
    pub email: String,
}

/// POST /api/users/recover
///
/// Replies 200 whether or not the address is known, so the endpoint cannot
/// be used to enumerate accounts.
pub async fn recover(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RecoverRequest>,
) -> Response {
    if body.email.parse::<EmailAddress>().is_err() {
        return json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid email address");
    }
    let user = match users::Entity::find()
        .filter(users::Column::Email.eq(body.email.as_str()))
        .one(&state.db)
        .await
    {
        Ok(user) => user,
        Err(e) => return db_error("fetching user", e),
    };
    if let Some(user) = user.filter(|user| user.role != UserRole::Banned) {
        let code = random_code();
        match state.email.send_recovery_code(&user.email, &code) {
            Ok(()) => {
                let recovery = account_recoveries::ActiveModel {
                    code: Set(code),
                    user_id: Set(user.id),
                    created_at: Set(Utc::now()),
                    expires_at: Set(Utc::now() + Duration::hours(RECOVERY_TTL_HOURS)),
                    used_at: Set(None),
                };
                if let Err(e) = recovery.insert(&state.db).await {
                    return db_error("creating recovery", e);
                }
            }
            Err(e) => log::warn!("recovery mail for {} not queued: {e}", user.id),
        }
    }
    StatusCode::OK.into_response()
}

#[derive(Debug, Deserialize)]
pub struct RecoverConfirmRequest {
    pub code: String,
    pub password: String,
}

/// POST /api/users/recover/confirm
pub async fn recover_confirm(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RecoverConfirmRequest>,
) -> Response {
    if body.password.chars().count() < MIN_PASSWORD_LENGTH {
        return json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "password must be at least 8 characters",
        );
    }
    let recovery = match account_recoveries::Entity::find_by_id(body.code)
        .filter(account_recoveries::Column::ExpiresAt.gt(Utc::now()))
        .filter(account_recoveries::Column::UsedAt.is_null())
        .one(&state.db)
        .await
    {
        Ok(Some(recovery)) => recovery,
        Ok(None) => return json_error(StatusCode::NOT_FOUND, "recovery code not found"),
        Err(e) => return db_error("fetching recovery", e),
    };
    let user = match users::Entity::find_by_id(recovery.user_id)
        .one(&state.db)
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => return json_error(StatusCode::NOT_FOUND, "recovery code not found"),
        Err(e) => return db_error("fetching user", e),
    };
    let Some(password_hash) = hash_password(&body.password) else {
        log::error!("password hashing failed");
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error");
    };

    let mut active: users::ActiveModel = user.into();
    active.password_hash = Set(password_hash);
    let user = match active.update(&state.db).await {
        Ok(user) => user,
        Err(e) => return db_error("updating password", e),
    };
    let mut used: account_recoveries::ActiveModel = recovery.into();
    used.used_at = Set(Some(Utc::now()));
    if let Err(e) = used.update(&state.db).await {
        return db_error("marking recovery used", e);
    }
    // a recovered password invalidates every open session
    if let Err(e) = auth::revoke_tokens(&state.db, user.id).await {
        return db_error("revoking tokens", e);
    }
    Json(UserView::from(&user)).into_response()
}
