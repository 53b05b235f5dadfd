//! Data access for users, colors and diaries.
//!
//! Every function takes any sea-orm connection (`DatabaseConnection` or an
//! open `DatabaseTransaction`) so callers can compose them inside their own
//! transaction. Functions that must be atomic on their own take a
//! `TransactionTrait` and open one themselves.

pub mod color_service;
pub mod diary_service;
pub mod user_service;

pub use color_service::ColorServiceError;
pub use diary_service::{DiaryChanges, DiaryServiceError};
