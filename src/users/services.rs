use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;
use crate::ideas;
use crate::users::dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest, UserProfile};
use crate::users::repo;
use crate::users::repo_types::User;

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]{3,32}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

fn validate_credentials(username: &str, password: &str) -> Result<(), ApiError> {
    if !is_valid_username(username) {
        warn!(%username, "invalid username");
        return Err(ApiError::Validation(
            "Username must be 3-32 characters of letters, digits, '_' or '-'".into(),
        ));
    }
    if password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::Validation("Password too short".into()));
    }
    Ok(())
}

pub async fn register(
    db: &PgPool,
    keys: &JwtKeys,
    payload: RegisterRequest,
) -> Result<AuthResponse, ApiError> {
    let username = payload.username.trim().to_string();
    validate_credentials(&username, &payload.password)?;

    if repo::find_by_username(db, &username).await?.is_some() {
        warn!(%username, "username already registered");
        return Err(ApiError::UserExists);
    }

    let hash = hash_password(&payload.password)?;
    let user = repo::create(db, &username, &hash).await?;
    let token = keys.sign(user.id, &user.username)?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(AuthResponse {
        token,
        user: PublicUser::from(&user),
    })
}

pub async fn login(
    db: &PgPool,
    keys: &JwtKeys,
    payload: LoginRequest,
) -> Result<AuthResponse, ApiError> {
    let username = payload.username.trim();

    // Unknown username and wrong password are indistinguishable to the caller.
    let user = repo::find_by_username(db, username)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = keys.sign(user.id, &user.username)?;
    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(AuthResponse {
        token,
        user: PublicUser::from(&user),
    })
}

/// All users with their authored ideas and bookmarks, sanitized.
pub async fn list(db: &PgPool) -> Result<Vec<UserProfile>, ApiError> {
    let users = repo::list_all(db).await?;
    let mut profiles = Vec::with_capacity(users.len());
    for user in users {
        profiles.push(profile(db, user).await?);
    }
    Ok(profiles)
}

pub async fn profile(db: &PgPool, user: User) -> Result<UserProfile, ApiError> {
    let ideas = ideas::repo::by_author(db, user.id).await?;
    let bookmarks = ideas::repo::bookmarked_ideas(db, user.id).await?;
    Ok(UserProfile {
        id: user.id,
        username: user.username,
        created_at: user.created_at,
        ideas: ideas.iter().map(Into::into).collect(),
        bookmarks: bookmarks.iter().map(Into::into).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_reasonable_usernames() {
        assert!(is_valid_username("alice"));
        assert!(is_valid_username("user_42"));
        assert!(is_valid_username("kebab-case"));
    }

    #[test]
    fn rejects_bad_usernames() {
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username("way@too@odd"));
        assert!(!is_valid_username(&"x".repeat(33)));
    }

    #[test]
    fn validate_credentials_flags_short_password() {
        let err = validate_credentials("alice", "short").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
