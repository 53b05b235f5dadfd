use axum::{
    body::Body as AxumBody,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::services::auth_service;
use crate::web::{AppState, error::AppError};

pub const TOKEN_COOKIE: &str = "token";

fn request_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
        .or_else(|| jar.get(TOKEN_COOKIE).map(|c| c.value().to_string()))
}

/// Guards palette and diary routes: the bearer token (or the login cookie) must
/// belong to an existing, active user, who is attached as `AuthenticatedUser`.
pub async fn auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request<AxumBody>,
    next: Next,
) -> Result<Response, AppError> {
    let token = request_token(req.headers(), &jar).ok_or(AppError::InvalidCredentials)?;
    let user =
        auth_service::authenticate_token(&state.db_pool, &token, &state.config.jwt_secret).await?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum_extra::extract::cookie::Cookie;

    #[test]
    fn test_bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        let jar = CookieJar::new().add(Cookie::new(TOKEN_COOKIE, "from-cookie"));

        assert_eq!(request_token(&headers, &jar).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_cookie_is_used_without_header() {
        let jar = CookieJar::new().add(Cookie::new(TOKEN_COOKIE, "from-cookie"));
        assert_eq!(request_token(&HeaderMap::new(), &jar).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_non_bearer_header_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(request_token(&headers, &CookieJar::new()), None);
    }
}
