use anyhow::Result;
use rusqlite::{Connection, params};
use uuid::Uuid;

use vidshare_types::models::OwnerProfile;

use super::OptionalExt;
use crate::Database;
use crate::models::{OWNER_COLUMNS, UserRow, now, owner_at, timestamp};

impl Database {
    pub fn create_user(
        &self,
        id: Uuid,
        username: &str,
        full_name: &str,
        avatar: &str,
        password_hash: &str,
    ) -> Result<()> {
        self.with_tx(|tx| insert_user(tx, id, username, full_name, avatar, password_hash))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| find_user_by_username(conn, username))
    }
}

pub fn insert_user(
    conn: &Connection,
    id: Uuid,
    username: &str,
    full_name: &str,
    avatar: &str,
    password_hash: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO users (id, username, full_name, avatar, password, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id.to_string(),
            username,
            full_name,
            avatar,
            password_hash,
            timestamp(now())
        ],
    )?;
    Ok(())
}

pub fn find_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    conn.query_row(
        "SELECT id, username, password FROM users WHERE username = ?1",
        [username],
        |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
            })
        },
    )
    .optional()
}

pub fn owner_profile(conn: &Connection, id: Uuid) -> Result<Option<OwnerProfile>> {
    conn.query_row(
        &format!("SELECT {OWNER_COLUMNS} FROM users u WHERE u.id = ?1"),
        [id.to_string()],
        |row| owner_at(row, 0),
    )
    .optional()
}

pub fn user_exists(conn: &Connection, id: Uuid) -> Result<bool> {
    let found: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(found)
}
