//! Table bootstrap derived from the entity definitions.

use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Schema};
use tracing::debug;

use crate::db::entities::{color, diary, user, user_color};

/// Creates every table that does not exist yet, referenced tables first.
pub async fn create_tables<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, user::Entity).await?;
    create_table(db, &schema, color::Entity).await?;
    create_table(db, &schema, user_color::Entity).await?;
    create_table(db, &schema, diary::Entity).await?;

    Ok(())
}

async fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> Result<(), DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let table = entity.table_name().to_owned();
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(db.get_database_backend().build(&stmt)).await?;
    debug!(table = %table, "Ensured table exists.");
    Ok(())
}
