//! SeaORM entities for the diary schema.

pub mod color;
pub mod diary;
pub mod user;
pub mod user_color;
