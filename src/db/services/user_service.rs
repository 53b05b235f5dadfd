use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set};
use tracing::info;

use crate::color::HexColor;
use crate::db::entities::user;
use crate::db::services::color_service;

// --- User Service Functions ---

/// Inserts a new, active user.
pub async fn create_user<C: ConnectionTrait>(
    db: &C,
    email: &str,
    password_hash: &str,
) -> Result<user::Model, DbErr> {
    let now = Utc::now();
    let new_user = user::ActiveModel {
        email: Set(email.to_owned()),
        password_hash: Set(password_hash.to_owned()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    new_user.insert(db).await
}

pub async fn get_user_by_id<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find_by_id(user_id).one(db).await
}

pub async fn get_user_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await
}

/// Gives a freshly registered user their starting palette: the default color
/// plus any configured starter colors.
pub async fn seed_default_palette<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    starter_palette: &[HexColor],
) -> Result<(), DbErr> {
    let default_color = color_service::get_default_color(db).await?;
    color_service::associate_user(db, user_id, default_color.id).await?;

    for hex in starter_palette {
        let color = color_service::create_color(db, hex).await?;
        color_service::associate_user(db, user_id, color.id).await?;
    }

    info!(
        user_id,
        starter_colors = starter_palette.len(),
        "Default palette seeded."
    );
    Ok(())
}
