use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::color::{parse_hex_color, PaletteColor};
use crate::db::services::{color_service, ColorServiceError};
use crate::web::models::AuthenticatedUser;
use crate::web::{AppError, AppState};

// --- Request/Response Structs ---

#[derive(Deserialize)]
pub struct ColorRequest {
    hex_color: String,
}

// --- Route Handlers ---

async fn get_palette_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<PaletteColor>>, AppError> {
    let palette = color_service::get_palette(&app_state.db_pool, authenticated_user.id).await?;
    Ok(Json(palette))
}

async fn add_color_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<ColorRequest>,
) -> Result<(StatusCode, Json<PaletteColor>), AppError> {
    let hex = parse_hex_color(&payload.hex_color)?;
    let color =
        color_service::add_color_to_palette(&app_state.db_pool, authenticated_user.id, &hex).await?;
    Ok((StatusCode::CREATED, Json(color.to_palette_color().map_err(ColorServiceError::from)?)))
}

async fn recolor_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(color_id): Path<i32>,
    Json(payload): Json<ColorRequest>,
) -> Result<Json<PaletteColor>, AppError> {
    let hex = parse_hex_color(&payload.hex_color)?;
    let color =
        color_service::recolor(&app_state.db_pool, authenticated_user.id, color_id, &hex).await?;
    Ok(Json(color.to_palette_color().map_err(ColorServiceError::from)?))
}

async fn remove_color_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(color_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    color_service::remove_color_from_palette(&app_state.db_pool, authenticated_user.id, color_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Router ---

pub fn create_colors_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_palette_handler).post(add_color_handler))
        .route("/{color_id}", put(recolor_handler).delete(remove_color_handler))
}
