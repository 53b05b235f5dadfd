use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const MIN_COLOR_LEVEL: i16 = 1;
pub const MAX_COLOR_LEVEL: i16 = 10;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "diaries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub color_id: i32,
    pub color_level: i16,
    #[sea_orm(column_type = "Text")]
    pub context: String,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade", // A user's diaries go with the user
        on_update = "Cascade"
    )]
    User,
    // Deleting a color re-points its diaries to the default color first
    // (see color_service::delete_color), so the row is never left dangling.
    #[sea_orm(
        belongs_to = "super::color::Entity",
        from = "Column::ColorId",
        to = "super::color::Column::Id",
        on_delete = "Restrict",
        on_update = "Cascade"
    )]
    Color,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::color::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Color.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
