use axum::Extension;
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ConnectionTrait, DatabaseConnection, SqlErr, TransactionTrait};
use tracing::{info, warn};

use crate::color::HexColor;
use crate::db::entities::user;
use crate::db::services::user_service;
use crate::web::error::AppError;
use crate::web::models::{AuthenticatedUser, Claims, Credentials, LoginResponse, UserResponse};

const MIN_PASSWORD_LEN: usize = 8;
const TOKEN_TTL_HOURS: i64 = 24;

/// Creates the account and seeds its palette in one transaction.
pub async fn register_user(
    pool: &DatabaseConnection,
    req: Credentials,
    starter_palette: &[HexColor],
) -> Result<UserResponse, AppError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::InvalidInput("Users must have an email address.".to_string()));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }

    if user_service::get_user_by_email(pool, &email).await?.is_some() {
        return Err(AppError::UserAlreadyExists("This email address is already registered.".to_string()));
    }

    let password_hash = hash(&req.password, DEFAULT_COST)
        .map_err(|e| AppError::PasswordHashingError(e.to_string()))?;

    let txn = pool.begin().await?;
    let user_model = user_service::create_user(&txn, &email, &password_hash)
        .await
        .map_err(|e| match e.sql_err() {
            // Lost a race with a concurrent registration of the same email.
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::UserAlreadyExists("This email address is already registered.".to_string())
            }
            _ => AppError::from(e),
        })?;
    user_service::seed_default_palette(&txn, user_model.id, starter_palette).await?;
    txn.commit().await?;

    info!(user_id = user_model.id, "User registered.");
    Ok(UserResponse {
        id: user_model.id,
        email: user_model.email,
    })
}

pub async fn login_user(
    pool: &DatabaseConnection,
    req: Credentials,
    jwt_secret: &str,
) -> Result<LoginResponse, AppError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::InvalidInput("Email and password are required.".to_string()));
    }

    let email = req.email.trim().to_lowercase();
    let user = user_service::get_user_by_email(pool, &email)
        .await?
        .ok_or(AppError::UserNotFound)?;

    if !user.is_active {
        return Err(AppError::InvalidCredentials);
    }

    let valid_password = verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::InternalServerError(format!("Password verification failed: {e}")))?;
    if !valid_password {
        return Err(AppError::InvalidCredentials);
    }

    create_jwt_for_user(&user, jwt_secret)
}

/// Signs an HS256 token for `user`, valid for 24 hours.
pub fn create_jwt_for_user(user: &user::Model, jwt_secret: &str) -> Result<LoginResponse, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
    };

    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(jwt_secret.as_ref()))
        .map_err(|e| AppError::TokenCreationError(e.to_string()))?;

    Ok(LoginResponse {
        token,
        user: UserResponse {
            id: user.id,
            email: user.email.clone(),
        },
    })
}

pub fn decode_jwt(token: &str, jwt_secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        warn!(error = ?e, "Rejected JWT.");
        AppError::InvalidCredentials
    })
}

/// Resolves a token to its owner. Accounts deleted or deactivated after the
/// token was issued are rejected.
pub async fn authenticate_token<C: ConnectionTrait>(
    db: &C,
    token: &str,
    jwt_secret: &str,
) -> Result<AuthenticatedUser, AppError> {
    let claims = decode_jwt(token, jwt_secret)?;
    let user_id = claims.user_id().ok_or(AppError::InvalidCredentials)?;

    let user = user_service::get_user_by_id(db, user_id)
        .await?
        .filter(|user| user.is_active)
        .ok_or(AppError::InvalidCredentials)?;

    Ok(AuthenticatedUser {
        id: user.id,
        email: user.email,
    })
}

pub async fn me(
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<axum::Json<UserResponse>, AppError> {
    Ok(axum::Json(UserResponse {
        id: user.id,
        email: user.email,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_model(id: i32) -> user::Model {
        let now = Utc::now();
        user::Model {
            id,
            email: "alice@example.com".to_string(),
            password_hash: String::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_token_subject_is_user_id() {
        let response = create_jwt_for_user(&user_model(42), "secret").unwrap();
        assert_eq!(response.user.id, 42);

        let claims = decode_jwt(&response.token, "secret").unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_token_with_wrong_secret_is_rejected() {
        let response = create_jwt_for_user(&user_model(1), "secret").unwrap();
        assert!(matches!(
            decode_jwt(&response.token, "other-secret"),
            Err(AppError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issued = Utc::now() - Duration::hours(48);
        let claims = Claims {
            sub: "1".to_string(),
            iat: issued.timestamp() as usize,
            exp: (issued + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"secret")).unwrap();
        assert!(matches!(decode_jwt(&token, "secret"), Err(AppError::InvalidCredentials)));
    }

    #[test]
    fn test_non_numeric_subject_has_no_user_id() {
        let claims = Claims {
            sub: "alice@example.com".to_string(),
            iat: 0,
            exp: 0,
        };
        assert_eq!(claims.user_id(), None);
    }
}
