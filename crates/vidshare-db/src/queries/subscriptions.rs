use anyhow::Result;
use rusqlite::Connection;
use uuid::Uuid;

use vidshare_types::models::{OwnerProfile, Subscription};

use crate::models::{OWNER_COLUMNS, owner_at, time_at, uuid_at};

/// Subscriptions to `channel`, each with the subscriber's projection.
pub fn channel_subscribers(
    conn: &Connection,
    channel: Uuid,
) -> Result<Vec<Subscription<OwnerProfile, Uuid>>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT s.id, s.channel_id, s.created_at, {OWNER_COLUMNS}
         FROM subscriptions s JOIN users u ON u.id = s.subscriber_id
         WHERE s.channel_id = ?1
         ORDER BY s.created_at DESC, s.rowid DESC"
    ))?;
    let rows = stmt
        .query_map([channel.to_string()], |row| {
            Ok(Subscription {
                id: uuid_at(row, 0)?,
                channel: uuid_at(row, 1)?,
                created_at: time_at(row, 2)?,
                subscriber: owner_at(row, 3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Subscriptions held by `subscriber`, each with the channel's projection.
pub fn subscribed_channels(
    conn: &Connection,
    subscriber: Uuid,
) -> Result<Vec<Subscription<Uuid, OwnerProfile>>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT s.id, s.subscriber_id, s.created_at, {OWNER_COLUMNS}
         FROM subscriptions s JOIN users u ON u.id = s.channel_id
         WHERE s.subscriber_id = ?1
         ORDER BY s.created_at DESC, s.rowid DESC"
    ))?;
    let rows = stmt
        .query_map([subscriber.to_string()], |row| {
            Ok(Subscription {
                id: uuid_at(row, 0)?,
                subscriber: uuid_at(row, 1)?,
                created_at: time_at(row, 2)?,
                channel: owner_at(row, 3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
