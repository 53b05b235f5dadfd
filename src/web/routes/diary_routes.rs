use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::entities::diary;
use crate::db::services::{diary_service, DiaryChanges};
use crate::web::models::AuthenticatedUser;
use crate::web::{AppError, AppState};

// --- Request/Response Structs ---

#[derive(Deserialize)]
pub struct CreateDiaryRequest {
    color_id: i32,
    color_level: i16,
    #[serde(default)]
    context: String,
}

#[derive(Deserialize)]
pub struct UpdateDiaryRequest {
    color_id: Option<i32>,
    color_level: Option<i16>,
    context: Option<String>,
}

// --- Route Handlers ---

async fn list_diaries_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<diary::Model>>, AppError> {
    let diaries =
        diary_service::get_diaries_by_user(&app_state.db_pool, authenticated_user.id).await?;
    Ok(Json(diaries))
}

async fn create_diary_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateDiaryRequest>,
) -> Result<(StatusCode, Json<diary::Model>), AppError> {
    let diary = diary_service::create_diary(
        &app_state.db_pool,
        authenticated_user.id,
        payload.color_id,
        payload.color_level,
        &payload.context,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(diary)))
}

async fn get_diary_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(diary_id): Path<i32>,
) -> Result<Json<diary::Model>, AppError> {
    diary_service::get_diary(&app_state.db_pool, authenticated_user.id, diary_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Diary not found".to_string()))
}

async fn update_diary_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(diary_id): Path<i32>,
    Json(payload): Json<UpdateDiaryRequest>,
) -> Result<Json<diary::Model>, AppError> {
    let changes = DiaryChanges {
        color_id: payload.color_id,
        color_level: payload.color_level,
        context: payload.context,
    };
    let diary =
        diary_service::update_diary(&app_state.db_pool, authenticated_user.id, diary_id, changes)
            .await?;
    Ok(Json(diary))
}

async fn delete_diary_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(diary_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    if diary_service::delete_diary(&app_state.db_pool, authenticated_user.id, diary_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Diary not found".to_string()))
    }
}

// --- Router ---

pub fn create_diaries_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_diaries_handler).post(create_diary_handler))
        .route(
            "/{diary_id}",
            get(get_diary_handler)
                .put(update_diary_handler)
                .delete(delete_diary_handler),
        )
}
