use chrono::Utc;
use sea_orm::{
    prelude::Expr, sea_query::OnConflict, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::color::{sort_palette, HexColor, HexColorError, PaletteColor};
use crate::db::entities::{color, diary, user_color};

#[derive(Error, Debug)]
pub enum ColorServiceError {
    #[error("The default color cannot be edited or deleted.")]
    DefaultColorLocked,
    #[error("Color not found.")]
    NotFound,
    #[error("Invalid color: {0}")]
    InvalidColor(#[from] HexColorError),
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

// --- Color Service Functions ---

/// Looks up the single row holding `hex`, if any.
pub async fn find_color_by_hex<C: ConnectionTrait>(
    db: &C,
    hex: &HexColor,
) -> Result<Option<color::Model>, DbErr> {
    color::Entity::find()
        .filter(color::Column::HexColor.eq(hex.to_storage_string()))
        .one(db)
        .await
}

pub async fn get_color_by_id<C: ConnectionTrait>(
    db: &C,
    color_id: i32,
) -> Result<Option<color::Model>, DbErr> {
    color::Entity::find_by_id(color_id).one(db).await
}

/// Returns the row for `hex`, inserting it if it does not exist yet.
///
/// Concurrent callers racing on the same value both end up with the winner's
/// row: the insert is `ON CONFLICT (hex_color) DO NOTHING` and is followed by
/// a re-read.
pub async fn create_color<C: ConnectionTrait>(
    db: &C,
    hex: &HexColor,
) -> Result<color::Model, DbErr> {
    if let Some(existing) = find_color_by_hex(db, hex).await? {
        return Ok(existing);
    }

    let new_color = color::ActiveModel {
        hex_color: Set(hex.to_storage_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    color::Entity::insert(new_color)
        .on_conflict(
            OnConflict::column(color::Column::HexColor)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    let created = find_color_by_hex(db, hex)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("color {hex} missing after insert")))?;
    debug!(color_id = created.id, hex_color = %hex, "Color row resolved.");
    Ok(created)
}

/// The transparent sentinel every user starts with. Created on first use.
pub async fn get_default_color<C: ConnectionTrait>(db: &C) -> Result<color::Model, DbErr> {
    create_color(db, &HexColor::transparent()).await
}

pub fn is_default_color(color: &color::Model) -> bool {
    color
        .hex()
        .is_ok_and(|hex| hex == HexColor::transparent())
}

/// Adds `color_id` to the user's palette. Already-present associations are left alone.
pub async fn associate_user<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    color_id: i32,
) -> Result<(), DbErr> {
    let link = user_color::ActiveModel {
        user_id: Set(user_id),
        color_id: Set(color_id),
    };
    user_color::Entity::insert(link)
        .on_conflict(
            OnConflict::columns([user_color::Column::UserId, user_color::Column::ColorId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

async fn dissociate_user<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    color_id: i32,
) -> Result<u64, DbErr> {
    let result = user_color::Entity::delete_many()
        .filter(user_color::Column::UserId.eq(user_id))
        .filter(user_color::Column::ColorId.eq(color_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

pub async fn user_has_color<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    color_id: i32,
) -> Result<bool, DbErr> {
    Ok(user_color::Entity::find_by_id((user_id, color_id))
        .one(db)
        .await?
        .is_some())
}

/// Ids of every user whose palette contains the color, ascending.
pub async fn get_color_users<C: ConnectionTrait>(
    db: &C,
    color_id: i32,
) -> Result<Vec<i32>, DbErr> {
    let links = user_color::Entity::find()
        .filter(user_color::Column::ColorId.eq(color_id))
        .order_by_asc(user_color::Column::UserId)
        .all(db)
        .await?;
    Ok(links.into_iter().map(|link| link.user_id).collect())
}

/// The user's colors in display order. Also used for the diary color choice list.
pub async fn get_palette<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Vec<PaletteColor>, ColorServiceError> {
    let color_ids: Vec<i32> = user_color::Entity::find()
        .filter(user_color::Column::UserId.eq(user_id))
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.color_id)
        .collect();

    if color_ids.is_empty() {
        return Ok(Vec::new());
    }

    let colors = color::Entity::find()
        .filter(color::Column::Id.is_in(color_ids))
        .all(db)
        .await?;

    let palette = colors
        .iter()
        .map(color::Model::to_palette_color)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(sort_palette(palette))
}

/// Resolves a color that must be in the user's palette.
async fn owned_color<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    color_id: i32,
) -> Result<color::Model, ColorServiceError> {
    if !user_has_color(db, user_id, color_id).await? {
        return Err(ColorServiceError::NotFound);
    }
    get_color_by_id(db, color_id)
        .await?
        .ok_or(ColorServiceError::NotFound)
}

/// Dedup-creates `hex` and puts it in the user's palette.
pub async fn add_color_to_palette<C: TransactionTrait>(
    db: &C,
    user_id: i32,
    hex: &HexColor,
) -> Result<color::Model, ColorServiceError> {
    let txn = db.begin().await?;
    let color = create_color(&txn, hex).await?;
    associate_user(&txn, user_id, color.id).await?;
    txn.commit().await?;

    info!(user_id, color_id = color.id, hex_color = %hex, "Color added to palette.");
    Ok(color)
}

/// Changes the user's color `color_id` to `new_hex`, keeping their diaries attached.
///
/// The user's diaries move to the new row, the user leaves the old row, and
/// the old row is deleted once nobody references it. Runs as one transaction.
pub async fn recolor<C: TransactionTrait>(
    db: &C,
    user_id: i32,
    color_id: i32,
    new_hex: &HexColor,
) -> Result<color::Model, ColorServiceError> {
    let txn = db.begin().await?;

    let old_color = owned_color(&txn, user_id, color_id).await?;
    if is_default_color(&old_color) {
        return Err(ColorServiceError::DefaultColorLocked);
    }
    if old_color.hex()? == *new_hex {
        txn.commit().await?;
        return Ok(old_color);
    }

    let new_color = create_color(&txn, new_hex).await?;
    associate_user(&txn, user_id, new_color.id).await?;

    // Unlink first: the delete waits out diary writes holding the link row.
    dissociate_user(&txn, user_id, old_color.id).await?;
    let moved = diary::Entity::update_many()
        .col_expr(diary::Column::ColorId, Expr::value(new_color.id))
        .filter(diary::Column::UserId.eq(user_id))
        .filter(diary::Column::ColorId.eq(old_color.id))
        .exec(&txn)
        .await?
        .rows_affected;
    let removed = delete_if_orphaned(&txn, &old_color).await?;

    txn.commit().await?;

    info!(
        user_id,
        old_color_id = old_color.id,
        new_color_id = new_color.id,
        diaries_moved = moved,
        old_color_removed = removed,
        "Color edited."
    );
    Ok(new_color)
}

/// Takes a color out of the user's palette, deleting the row if it became unused.
///
/// Returns whether the color row itself was deleted.
pub async fn remove_color_from_palette<C: TransactionTrait>(
    db: &C,
    user_id: i32,
    color_id: i32,
) -> Result<bool, ColorServiceError> {
    let txn = db.begin().await?;

    let color = owned_color(&txn, user_id, color_id).await?;
    if is_default_color(&color) {
        return Err(ColorServiceError::DefaultColorLocked);
    }

    dissociate_user(&txn, user_id, color.id).await?;
    let removed = delete_if_orphaned(&txn, &color).await?;

    txn.commit().await?;

    info!(user_id, color_id, color_removed = removed, "Color removed from palette.");
    Ok(removed)
}

/// Deletes a color row outright. Diaries pointing at it fall back to the default color.
pub async fn delete_color<C: TransactionTrait>(
    db: &C,
    color_id: i32,
) -> Result<(), ColorServiceError> {
    let txn = db.begin().await?;

    let color = get_color_by_id(&txn, color_id)
        .await?
        .ok_or(ColorServiceError::NotFound)?;
    if is_default_color(&color) {
        return Err(ColorServiceError::DefaultColorLocked);
    }
    delete_color_row(&txn, &color).await?;

    txn.commit().await?;
    Ok(())
}

async fn delete_if_orphaned<C: ConnectionTrait>(
    db: &C,
    color: &color::Model,
) -> Result<bool, DbErr> {
    if is_default_color(color) {
        return Ok(false);
    }

    if !get_color_users(db, color.id).await?.is_empty() {
        return Ok(false);
    }

    delete_color_row(db, color).await?;
    Ok(true)
}

async fn delete_color_row<C: ConnectionTrait>(db: &C, color: &color::Model) -> Result<(), DbErr> {
    let fallback = get_default_color(db).await?;

    let reassigned = diary::Entity::update_many()
        .col_expr(diary::Column::ColorId, Expr::value(fallback.id))
        .filter(diary::Column::ColorId.eq(color.id))
        .exec(db)
        .await?
        .rows_affected;

    user_color::Entity::delete_many()
        .filter(user_color::Column::ColorId.eq(color.id))
        .exec(db)
        .await?;
    color::Entity::delete_by_id(color.id).exec(db).await?;

    debug!(
        color_id = color.id,
        diaries_reassigned = reassigned,
        "Color row deleted."
    );
    Ok(())
}
