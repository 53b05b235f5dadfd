use axum::{
    extract::State,
    middleware as axum_middleware,
    http::{HeaderValue, Method, header},
    response::IntoResponse,
    routing::{get, post},
    Json,
    Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::server::config::AppConfig;
use crate::services::auth_service;
use crate::web::{
    middleware::auth::{self, TOKEN_COOKIE},
    models::{Credentials, UserResponse},
    routes::*,
};

pub use crate::web::error::AppError;

pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DatabaseConnection,
    pub config: Arc<AppConfig>,
}

async fn register_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<Credentials>,
) -> Result<(axum::http::StatusCode, Json<UserResponse>), AppError> {
    let starter_palette = app_state.config.starter_palette();
    let user_response =
        auth_service::register_user(&app_state.db_pool, payload, &starter_palette).await?;
    Ok((axum::http::StatusCode::CREATED, Json(user_response)))
}

async fn login_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<Credentials>,
) -> Result<impl IntoResponse, AppError> {
    let login_response =
        auth_service::login_user(&app_state.db_pool, payload, &app_state.config.jwt_secret).await?;

    let auth_cookie = Cookie::build((TOKEN_COOKIE, login_response.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(true)
        .build();
    let cookie_header = HeaderValue::from_str(&auth_cookie.to_string())
        .map_err(|e| AppError::InternalServerError(format!("Invalid auth cookie: {e}")))?;

    let mut response = Json(login_response).into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie_header);

    Ok(response)
}

async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn create_axum_router(db_pool: DatabaseConnection, config: Arc<AppConfig>) -> Router {
    let app_state = Arc::new(AppState { db_pool, config });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check_handler))
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/me", get(auth_service::me).route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)))
        .nest(
            "/api/colors",
            color_routes::create_colors_router().route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .nest(
            "/api/diaries",
            diary_routes::create_diaries_router().route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .with_state(app_state)
        .layer(cors)
}
