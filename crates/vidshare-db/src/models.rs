//! Row mapping between SQLite columns and the shared domain types.
//!
//! Ids are stored as hyphenated UUID text, timestamps as RFC 3339 text with
//! nanosecond precision so lexical order matches chronological order.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use rusqlite::types::Type;
use uuid::Uuid;

use vidshare_types::models::{Comment, OwnerProfile, Tweet, Video};

/// Credential-bearing user row. Stays inside the identity adapter; joins
/// only ever select the [`OwnerProfile`] columns.
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
}

pub const VIDEO_COLUMNS: &str = "v.id, v.title, v.description, v.duration, v.video_file, \
     v.thumbnail, v.views, v.is_published, v.owner_id, v.created_at, v.updated_at";
pub const VIDEO_COLUMN_COUNT: usize = 11;

pub const COMMENT_COLUMNS: &str = "c.id, c.content, c.video_id, c.owner_id, c.created_at, c.updated_at";
pub const COMMENT_COLUMN_COUNT: usize = 6;

pub const TWEET_COLUMNS: &str = "t.id, t.content, t.owner_id, t.created_at, t.updated_at";
pub const TWEET_COLUMN_COUNT: usize = 5;

/// Projection of the `users` table aliased `u`.
pub const OWNER_COLUMNS: &str = "u.id, u.username, u.full_name, u.avatar";

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub fn time_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub fn owner_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<OwnerProfile> {
    Ok(OwnerProfile {
        id: uuid_at(row, offset)?,
        username: row.get(offset + 1)?,
        full_name: row.get(offset + 2)?,
        avatar: row.get(offset + 3)?,
    })
}

pub fn video_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Video> {
    Ok(Video {
        id: uuid_at(row, offset)?,
        title: row.get(offset + 1)?,
        description: row.get(offset + 2)?,
        duration: row.get(offset + 3)?,
        video_file: row.get(offset + 4)?,
        thumbnail: row.get(offset + 5)?,
        views: row.get(offset + 6)?,
        is_published: row.get(offset + 7)?,
        owner: uuid_at(row, offset + 8)?,
        created_at: time_at(row, offset + 9)?,
        updated_at: time_at(row, offset + 10)?,
    })
}

/// Expects `VIDEO_COLUMNS, OWNER_COLUMNS` in that order.
pub fn video_with_owner(row: &Row<'_>) -> rusqlite::Result<Video<OwnerProfile>> {
    let video = video_at(row, 0)?;
    let owner = owner_at(row, VIDEO_COLUMN_COUNT)?;
    Ok(video.with_owner(owner))
}

pub fn comment_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: uuid_at(row, offset)?,
        content: row.get(offset + 1)?,
        video: uuid_at(row, offset + 2)?,
        owner: uuid_at(row, offset + 3)?,
        created_at: time_at(row, offset + 4)?,
        updated_at: time_at(row, offset + 5)?,
    })
}

pub fn comment_with_owner(row: &Row<'_>) -> rusqlite::Result<Comment<OwnerProfile>> {
    let comment = comment_at(row, 0)?;
    let owner = owner_at(row, COMMENT_COLUMN_COUNT)?;
    Ok(comment.with_owner(owner))
}

pub fn tweet_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Tweet> {
    Ok(Tweet {
        id: uuid_at(row, offset)?,
        content: row.get(offset + 1)?,
        owner: uuid_at(row, offset + 2)?,
        created_at: time_at(row, offset + 3)?,
        updated_at: time_at(row, offset + 4)?,
    })
}

pub fn tweet_with_owner(row: &Row<'_>) -> rusqlite::Result<Tweet<OwnerProfile>> {
    let tweet = tweet_at(row, 0)?;
    let owner = owner_at(row, TWEET_COLUMN_COUNT)?;
    Ok(tweet.with_owner(owner))
}
