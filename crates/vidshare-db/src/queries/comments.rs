use anyhow::Result;
use rusqlite::{Connection, params};
use uuid::Uuid;

use vidshare_types::models::{Comment, OwnerProfile};

use super::OptionalExt;
use crate::models::{
    COMMENT_COLUMNS, OWNER_COLUMNS, comment_at, comment_with_owner, now, timestamp,
};
use crate::paginate::{Page, Paginated};

pub fn insert_comment(conn: &Connection, video: Uuid, owner: Uuid, content: &str) -> Result<Comment> {
    let at = now();
    let comment = Comment {
        id: Uuid::new_v4(),
        content: content.to_string(),
        video,
        owner,
        created_at: at,
        updated_at: at,
    };

    conn.execute(
        "INSERT INTO comments (id, video_id, owner_id, content, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![
            comment.id.to_string(),
            video.to_string(),
            owner.to_string(),
            comment.content,
            timestamp(at),
        ],
    )?;
    Ok(comment)
}

pub fn find_comment(conn: &Connection, id: Uuid) -> Result<Option<Comment>> {
    conn.query_row(
        &format!("SELECT {COMMENT_COLUMNS} FROM comments c WHERE c.id = ?1"),
        [id.to_string()],
        |row| comment_at(row, 0),
    )
    .optional()
}

pub fn find_comment_with_owner(conn: &Connection, id: Uuid) -> Result<Option<Comment<OwnerProfile>>> {
    conn.query_row(
        &format!(
            "SELECT {COMMENT_COLUMNS}, {OWNER_COLUMNS}
             FROM comments c JOIN users u ON u.id = c.owner_id
             WHERE c.id = ?1"
        ),
        [id.to_string()],
        comment_with_owner,
    )
    .optional()
}

pub fn save_comment(conn: &Connection, comment: &mut Comment) -> Result<()> {
    comment.updated_at = now();
    conn.execute(
        "UPDATE comments SET content = ?2, updated_at = ?3 WHERE id = ?1",
        params![
            comment.id.to_string(),
            comment.content,
            timestamp(comment.updated_at)
        ],
    )?;
    Ok(())
}

pub fn delete_comment(conn: &Connection, id: Uuid) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM comments WHERE id = ?1", [id.to_string()])?;
    Ok(deleted > 0)
}

/// Comments on a video with their author projection, newest first.
pub fn list_video_comments(
    conn: &Connection,
    video: Uuid,
    page: &Page,
) -> Result<Paginated<Comment<OwnerProfile>>> {
    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM comments WHERE video_id = ?1",
        [video.to_string()],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {COMMENT_COLUMNS}, {OWNER_COLUMNS}
         FROM comments c JOIN users u ON u.id = c.owner_id
         WHERE c.video_id = ?1
         ORDER BY c.created_at DESC, c.rowid DESC
         {}",
        page.sql()
    ))?;
    let items = stmt
        .query_map([video.to_string()], comment_with_owner)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Paginated {
        items,
        total: total as u64,
    })
}
