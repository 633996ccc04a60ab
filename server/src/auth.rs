//! Bearer-token authentication.
//!
//! Session tokens are random alphanumeric strings handed out at login and
//! stored only as SHA-256 hashes. Handlers that need a caller take a
//! [`CurrentUser`] argument; the extractor answers 401 before the handler
//! body runs when the token is missing, unknown or expired.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::Response;
use chrono::{Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use leaderboard::entities::{login_tokens, users};

use crate::{json_error, AppState};

const TOKEN_LENGTH: usize = 64;
const TOKEN_TTL_DAYS: i64 = 30;

pub fn hash_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LENGTH)
        .map(|_| rng.sample(Alphanumeric) as char)
        .collect()
}

/// Mint a session token for `user_id`. The raw token is returned exactly
/// once; only its hash is stored.
pub async fn issue_token(db: &DatabaseConnection, user_id: Uuid) -> Result<String, DbErr> {
    let raw = generate_token();
    login_tokens::ActiveModel {
        token_hash: Set(hash_token(&raw)),
        user_id: Set(user_id),
        created_at: Set(Utc::now()),
        expires_at: Set(Utc::now() + Duration::days(TOKEN_TTL_DAYS)),
    }
    .insert(db)
    .await?;
    Ok(raw)
}

pub async fn session_user(
    db: &DatabaseConnection,
    raw: &str,
) -> Result<Option<users::Model>, DbErr> {
    let Some(token) = login_tokens::Entity::find_by_id(hash_token(raw))
        .filter(login_tokens::Column::ExpiresAt.gt(Utc::now()))
        .one(db)
        .await?
    else {
        return Ok(None);
    };
    users::Entity::find_by_id(token.user_id).one(db).await
}

/// Drop every session belonging to `user_id` (password changes).
pub async fn revoke_tokens(db: &DatabaseConnection, user_id: Uuid) -> Result<(), DbErr> {
    login_tokens::Entity::delete_many()
        .filter(login_tokens::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(())
}

pub struct CurrentUser(pub users::Model);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| json_error(StatusCode::UNAUTHORIZED, "authentication required"))?;
        match session_user(&state.db, token).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => Err(json_error(
                StatusCode::UNAUTHORIZED,
                "invalid or expired token",
            )),
            Err(e) => {
                log::error!("session lookup failed: {e}");
                Err(json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{seed_user, test_db};
    use leaderboard::UserRole;

    #[test]
    fn token_hashing_is_stable_and_hex() {
        let a = hash_token("token");
        assert_eq!(a, hash_token("token"));
        assert_ne!(a, hash_token("other"));
        assert_eq!(a.len(), 64);
        assert!(a.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn issued_tokens_resolve_to_their_user() {
        let db = test_db().await;
        let user = seed_user(&db, UserRole::Confirmed).await;
        let raw = issue_token(&db, user.id).await.unwrap();
        assert_eq!(raw.len(), TOKEN_LENGTH);

        let resolved = session_user(&db, &raw).await.unwrap().unwrap();
        assert_eq!(resolved.id, user.id);
        assert!(session_user(&db, "bogus").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_tokens_do_not_resolve() {
        let db = test_db().await;
        let user = seed_user(&db, UserRole::Confirmed).await;
        let raw = generate_token();
        login_tokens::ActiveModel {
            token_hash: Set(hash_token(&raw)),
            user_id: Set(user.id),
            created_at: Set(Utc::now() - Duration::days(31)),
            expires_at: Set(Utc::now() - Duration::days(1)),
        }
        .insert(&db)
        .await
        .unwrap();
        assert!(session_user(&db, &raw).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn revocation_drops_all_sessions() {
        let db = test_db().await;
        let user = seed_user(&db, UserRole::Confirmed).await;
        let first = issue_token(&db, user.id).await.unwrap();
        let second = issue_token(&db, user.id).await.unwrap();

        revoke_tokens(&db, user.id).await.unwrap();
        assert!(session_user(&db, &first).await.unwrap().is_none());
        assert!(session_user(&db, &second).await.unwrap().is_none());
    }
}
