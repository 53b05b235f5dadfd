use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::color::{parse_hex_color, HexColor, HexColorError, PaletteColor};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "colors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    // Storage form of a HexColor, e.g. "FFFFFF1.0". One row per distinct value.
    #[sea_orm(unique)]
    pub hex_color: String,
    pub created_at: ChronoDateTimeUtc,
}

impl Model {
    pub fn hex(&self) -> Result<HexColor, HexColorError> {
        parse_hex_color(&self.hex_color)
    }

    pub fn to_palette_color(&self) -> Result<PaletteColor, HexColorError> {
        Ok(PaletteColor {
            id: self.id,
            hex_color: self.hex()?,
        })
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::diary::Entity")]
    Diaries,

    #[sea_orm(has_many = "super::user_color::Entity")]
    UserColors,
}

impl Related<super::diary::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Diaries.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_color::Relation::User.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::user_color::Relation::Color.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
