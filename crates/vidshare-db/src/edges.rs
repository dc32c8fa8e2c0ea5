//! Toggleable edges between a user and something they point at.
//!
//! A toggle deletes the (subject, target) edge if one exists, otherwise
//! inserts it. Each edge table carries a unique index on that pair, and
//! toggles are expected to run inside [`Database::with_tx`], whose immediate
//! transaction serialises concurrent toggles on the writer.
//!
//! [`Database::with_tx`]: crate::Database::with_tx

use anyhow::Result;
use rusqlite::{Connection, params};
use uuid::Uuid;

use vidshare_types::models::LikeTarget;

use crate::models::{now, timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

/// An edge row identified by a subject column and a target column.
pub trait Edge {
    const TABLE: &'static str;

    fn subject(&self) -> (&'static str, Uuid);
    fn target(&self) -> (&'static str, Uuid);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeEdge {
    pub liked_by: Uuid,
    pub target: LikeTarget,
}

impl Edge for LikeEdge {
    const TABLE: &'static str = "likes";

    fn subject(&self) -> (&'static str, Uuid) {
        ("liked_by", self.liked_by)
    }

    fn target(&self) -> (&'static str, Uuid) {
        match self.target {
            LikeTarget::Video(id) => ("video_id", id),
            LikeTarget::Comment(id) => ("comment_id", id),
            LikeTarget::Tweet(id) => ("tweet_id", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionEdge {
    pub subscriber: Uuid,
    pub channel: Uuid,
}

impl Edge for SubscriptionEdge {
    const TABLE: &'static str = "subscriptions";

    fn subject(&self) -> (&'static str, Uuid) {
        ("subscriber_id", self.subscriber)
    }

    fn target(&self) -> (&'static str, Uuid) {
        ("channel_id", self.channel)
    }
}

/// Remove the edge if present, insert it otherwise.
pub fn toggle<E: Edge>(conn: &Connection, edge: &E) -> Result<Toggle> {
    let (subject_col, subject) = edge.subject();
    let (target_col, target) = edge.target();
    let subject = subject.to_string();
    let target = target.to_string();

    let removed = conn.execute(
        &format!(
            "DELETE FROM {} WHERE {subject_col} = ?1 AND {target_col} = ?2",
            E::TABLE
        ),
        params![subject, target],
    )?;
    if removed > 0 {
        return Ok(Toggle::Removed);
    }

    conn.execute(
        &format!(
            "INSERT INTO {} (id, {subject_col}, {target_col}, created_at) VALUES (?1, ?2, ?3, ?4)",
            E::TABLE
        ),
        params![Uuid::new_v4().to_string(), subject, target, timestamp(now())],
    )?;
    Ok(Toggle::Added)
}

#[cfg(test)]
pub fn exists<E: Edge>(conn: &Connection, edge: &E) -> Result<bool> {
    let (subject_col, subject) = edge.subject();
    let (target_col, target) = edge.target();

    let found: bool = conn.query_row(
        &format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {subject_col} = ?1 AND {target_col} = ?2)",
            E::TABLE
        ),
        params![subject.to_string(), target.to_string()],
        |row| row.get(0),
    )?;
    Ok(found)
}

/// Number of edges for the pair; never more than one.
#[cfg(test)]
pub fn count<E: Edge>(conn: &Connection, edge: &E) -> Result<u64> {
    let (subject_col, subject) = edge.subject();
    let (target_col, target) = edge.target();

    let n: i64 = conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM {} WHERE {subject_col} = ?1 AND {target_col} = ?2",
            E::TABLE
        ),
        params![subject.to_string(), target.to_string()],
        |row| row.get(0),
    )?;
    Ok(n as u64)
}
