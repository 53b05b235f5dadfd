#![allow(dead_code)]

use color_diary::color::{parse_hex_color, HexColor};
use color_diary::db::entities::{color, diary, user};
use color_diary::db::schema;
use color_diary::db::services::{color_service, diary_service, user_service};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait, PaginatorTrait};
use std::path::Path;

/// A fresh in-memory database with the schema applied.
pub async fn setup_db() -> DatabaseConnection {
    // One pooled connection that never closes, otherwise the in-memory database is lost.
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.expect("connect to in-memory sqlite");
    schema::create_tables(&db).await.expect("create tables");
    db
}

/// A database file under `dir` behind a pool of `connections`, for tests that
/// need real concurrency.
pub async fn setup_file_db(dir: &Path, connections: u32) -> DatabaseConnection {
    let url = format!("sqlite://{}?mode=rwc", dir.join("colors.db").display());
    let mut opt = ConnectOptions::new(url);
    opt.max_connections(connections).sqlx_logging(false);
    let db = Database::connect(opt).await.expect("connect to sqlite file");
    schema::create_tables(&db).await.expect("create tables");
    db
}

/// A registered user with the default palette, as the registration flow leaves them.
pub async fn create_user(db: &DatabaseConnection, email: &str) -> user::Model {
    let user = user_service::create_user(db, email, "not-a-real-hash")
        .await
        .expect("create user");
    user_service::seed_default_palette(db, user.id, &[])
        .await
        .expect("seed palette");
    user
}

pub fn hex(code: &str) -> HexColor {
    parse_hex_color(code).expect("valid test color")
}

pub async fn add_color(db: &DatabaseConnection, user_id: i32, code: &str) -> color::Model {
    color_service::add_color_to_palette(db, user_id, &hex(code))
        .await
        .expect("add color")
}

pub async fn write_diary(db: &DatabaseConnection, user_id: i32, color_id: i32) -> diary::Model {
    diary_service::create_diary(db, user_id, color_id, 5, "something context")
        .await
        .expect("create diary")
}

pub async fn color_count(db: &DatabaseConnection) -> u64 {
    color::Entity::find().count(db).await.expect("count colors")
}

pub async fn reload_diary(db: &DatabaseConnection, diary_id: i32) -> diary::Model {
    diary::Entity::find_by_id(diary_id)
        .one(db)
        .await
        .expect("load diary")
        .expect("diary exists")
}
