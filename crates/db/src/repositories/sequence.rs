//! Transactional id allocation from the `id_counters` table.
//!
//! The counter row is locked for the duration of the caller's
//! transaction, so two concurrent inserts can never be handed the same
//! value.

use pactfile_shared::types::EntityKind;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, QuerySelect, Set};

use crate::entities::id_counters;

/// Allocate the next id for an entity kind.
///
/// Must be called inside the transaction that inserts the new row;
/// the row lock is what makes allocation race-free.
///
/// # Errors
///
/// Returns an error if the counter row cannot be read or updated.
pub async fn next_id<C: ConnectionTrait>(conn: &C, kind: EntityKind) -> Result<String, DbErr> {
    let row = id_counters::Entity::find_by_id(kind.prefix())
        .lock_exclusive()
        .one(conn)
        .await?;

    let next = match row {
        Some(row) => {
            let next = row.value + 1;
            let mut counter: id_counters::ActiveModel = row.into();
            counter.value = Set(next);
            counter.update(conn).await?;
            next
        }
        None => {
            // Seeded by the migration; recreate if someone dropped it.
            id_counters::ActiveModel {
                entity: Set(kind.prefix().to_string()),
                value: Set(1),
            }
            .insert(conn)
            .await?;
            1
        }
    };

    Ok(kind.format_id(next))
}
