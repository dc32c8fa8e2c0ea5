use anyhow::Result;
use rusqlite::{Connection, params};
use uuid::Uuid;

use vidshare_types::models::{OwnerProfile, Tweet};

use super::OptionalExt;
use crate::models::{OWNER_COLUMNS, TWEET_COLUMNS, now, timestamp, tweet_at, tweet_with_owner};
use crate::paginate::{Page, Paginated};

pub fn insert_tweet(conn: &Connection, owner: Uuid, content: &str) -> Result<Tweet> {
    let at = now();
    let tweet = Tweet {
        id: Uuid::new_v4(),
        content: content.to_string(),
        owner,
        created_at: at,
        updated_at: at,
    };

    conn.execute(
        "INSERT INTO tweets (id, owner_id, content, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        params![
            tweet.id.to_string(),
            owner.to_string(),
            tweet.content,
            timestamp(at)
        ],
    )?;
    Ok(tweet)
}

pub fn find_tweet(conn: &Connection, id: Uuid) -> Result<Option<Tweet>> {
    conn.query_row(
        &format!("SELECT {TWEET_COLUMNS} FROM tweets t WHERE t.id = ?1"),
        [id.to_string()],
        |row| tweet_at(row, 0),
    )
    .optional()
}

pub fn save_tweet(conn: &Connection, tweet: &mut Tweet) -> Result<()> {
    tweet.updated_at = now();
    conn.execute(
        "UPDATE tweets SET content = ?2, updated_at = ?3 WHERE id = ?1",
        params![
            tweet.id.to_string(),
            tweet.content,
            timestamp(tweet.updated_at)
        ],
    )?;
    Ok(())
}

pub fn delete_tweet(conn: &Connection, id: Uuid) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM tweets WHERE id = ?1", [id.to_string()])?;
    Ok(deleted > 0)
}

pub fn list_user_tweets(
    conn: &Connection,
    owner: Uuid,
    page: &Page,
) -> Result<Paginated<Tweet<OwnerProfile>>> {
    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM tweets WHERE owner_id = ?1",
        [owner.to_string()],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {TWEET_COLUMNS}, {OWNER_COLUMNS}
         FROM tweets t JOIN users u ON u.id = t.owner_id
         WHERE t.owner_id = ?1
         ORDER BY t.created_at DESC, t.rowid DESC
         {}",
        page.sql()
    ))?;
    let items = stmt
        .query_map([owner.to_string()], tweet_with_owner)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Paginated {
        items,
        total: total as u64,
    })
}
