use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use thiserror::Error;
use tracing::info;

use crate::db::entities::diary::{self, MAX_COLOR_LEVEL, MIN_COLOR_LEVEL};
use crate::db::entities::user_color;

#[derive(Error, Debug)]
pub enum DiaryServiceError {
    #[error("Color level must be between 1 and 10, got {0}.")]
    InvalidLevel(i16),
    #[error("This is an invalid color. You don't have this color.")]
    ColorNotOwned,
    #[error("Diary not found.")]
    NotFound,
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Fields that may change on an existing diary. `None` leaves the field as is.
#[derive(Debug, Default, Clone)]
pub struct DiaryChanges {
    pub color_id: Option<i32>,
    pub color_level: Option<i16>,
    pub context: Option<String>,
}

fn check_level(color_level: i16) -> Result<(), DiaryServiceError> {
    if (MIN_COLOR_LEVEL..=MAX_COLOR_LEVEL).contains(&color_level) {
        Ok(())
    } else {
        Err(DiaryServiceError::InvalidLevel(color_level))
    }
}

/// Checks palette membership and holds a shared lock on the link row until the
/// transaction ends, so the color cannot leave the palette before the diary is written.
async fn lock_owned_color<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    color_id: i32,
) -> Result<(), DiaryServiceError> {
    user_color::Entity::find_by_id((user_id, color_id))
        .lock_shared()
        .one(db)
        .await?
        .map(|_| ())
        .ok_or(DiaryServiceError::ColorNotOwned)
}

// --- Diary Service Functions ---

/// Writes a new diary entry colored with one of the user's own colors.
pub async fn create_diary<C: TransactionTrait>(
    db: &C,
    user_id: i32,
    color_id: i32,
    color_level: i16,
    context: &str,
) -> Result<diary::Model, DiaryServiceError> {
    check_level(color_level)?;

    let txn = db.begin().await?;
    lock_owned_color(&txn, user_id, color_id).await?;

    let now = Utc::now();
    let new_diary = diary::ActiveModel {
        user_id: Set(user_id),
        color_id: Set(color_id),
        color_level: Set(color_level),
        context: Set(context.to_owned()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = new_diary.insert(&txn).await?;
    txn.commit().await?;

    info!(user_id, diary_id = created.id, color_id, "Diary created.");
    Ok(created)
}

/// All of the user's diaries, newest first.
pub async fn get_diaries_by_user<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Vec<diary::Model>, DbErr> {
    diary::Entity::find()
        .filter(diary::Column::UserId.eq(user_id))
        .order_by_desc(diary::Column::CreatedAt)
        .order_by_desc(diary::Column::Id)
        .all(db)
        .await
}

pub async fn get_diary<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    diary_id: i32,
) -> Result<Option<diary::Model>, DbErr> {
    diary::Entity::find_by_id(diary_id)
        .filter(diary::Column::UserId.eq(user_id))
        .one(db)
        .await
}

pub async fn update_diary<C: TransactionTrait>(
    db: &C,
    user_id: i32,
    diary_id: i32,
    changes: DiaryChanges,
) -> Result<diary::Model, DiaryServiceError> {
    if let Some(color_level) = changes.color_level {
        check_level(color_level)?;
    }

    let txn = db.begin().await?;
    let existing = get_diary(&txn, user_id, diary_id)
        .await?
        .ok_or(DiaryServiceError::NotFound)?;

    if let Some(color_id) = changes.color_id {
        if color_id != existing.color_id {
            lock_owned_color(&txn, user_id, color_id).await?;
        }
    }

    let mut active_model = existing.into_active_model();
    if let Some(color_id) = changes.color_id {
        active_model.color_id = Set(color_id);
    }
    if let Some(color_level) = changes.color_level {
        active_model.color_level = Set(color_level);
    }
    if let Some(context) = changes.context {
        active_model.context = Set(context);
    }
    active_model.updated_at = Set(Utc::now());

    let updated = active_model.update(&txn).await?;
    txn.commit().await?;
    Ok(updated)
}

/// Deletes one of the user's diaries. Returns false if it did not exist.
pub async fn delete_diary<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    diary_id: i32,
) -> Result<bool, DbErr> {
    let result = diary::Entity::delete_many()
        .filter(diary::Column::Id.eq(diary_id))
        .filter(diary::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}
