use anyhow::Result;
use rusqlite::{Connection, params, params_from_iter};
use uuid::Uuid;

use vidshare_types::api::NewVideo;
use vidshare_types::models::{OwnerProfile, Video};

use super::OptionalExt;
use crate::models::{OWNER_COLUMNS, VIDEO_COLUMNS, now, timestamp, video_at, video_with_owner};
use crate::paginate::{Page, Paginated, VideoSort};

/// Listing filter. Title matching is a case-insensitive substring search.
#[derive(Debug, Clone, Default)]
pub struct VideoFilter {
    pub title: Option<String>,
    pub owner: Option<Uuid>,
    pub published_only: bool,
}

impl VideoFilter {
    /// WHERE clause over the `v` alias plus its positional arguments.
    fn sql(&self) -> (String, Vec<String>) {
        let mut clauses = Vec::new();
        let mut args = Vec::new();

        if self.published_only {
            clauses.push("v.is_published = 1".to_string());
        }
        if let Some(title) = self.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            args.push(title.to_lowercase());
            clauses.push(format!("instr(fold_case(v.title), ?{}) > 0", args.len()));
        }
        if let Some(owner) = self.owner {
            args.push(owner.to_string());
            clauses.push(format!("v.owner_id = ?{}", args.len()));
        }

        if clauses.is_empty() {
            (String::new(), args)
        } else {
            (format!("WHERE {}", clauses.join(" AND ")), args)
        }
    }
}

/// Predicate over the `v` alias: the video is published, or is owned by the
/// viewer bound at `?{param}`. A NULL viewer sees published videos only.
pub(crate) fn visible_to(param: usize) -> String {
    format!("(v.is_published = 1 OR v.owner_id = ?{param})")
}

pub fn insert_video(conn: &Connection, owner: Uuid, new: &NewVideo) -> Result<Video> {
    let at = now();
    let video = Video {
        id: Uuid::new_v4(),
        title: new.title.clone(),
        description: new.description.clone(),
        duration: new.duration,
        video_file: new.video_file.clone(),
        thumbnail: new.thumbnail.clone(),
        views: 0,
        is_published: true,
        owner,
        created_at: at,
        updated_at: at,
    };

    conn.execute(
        "INSERT INTO videos (id, owner_id, title, description, duration, video_file, thumbnail,
                             views, is_published, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            video.id.to_string(),
            owner.to_string(),
            video.title,
            video.description,
            video.duration,
            video.video_file,
            video.thumbnail,
            video.views,
            video.is_published,
            timestamp(at),
            timestamp(at),
        ],
    )?;
    Ok(video)
}

pub fn find_video(conn: &Connection, id: Uuid) -> Result<Option<Video>> {
    conn.query_row(
        &format!("SELECT {VIDEO_COLUMNS} FROM videos v WHERE v.id = ?1"),
        [id.to_string()],
        |row| video_at(row, 0),
    )
    .optional()
}

/// The video, unless it is an unpublished draft of someone other than `viewer`.
pub fn find_visible_video(
    conn: &Connection,
    id: Uuid,
    viewer: Option<Uuid>,
) -> Result<Option<Video>> {
    conn.query_row(
        &format!(
            "SELECT {VIDEO_COLUMNS} FROM videos v WHERE v.id = ?1 AND {}",
            visible_to(2)
        ),
        params![id.to_string(), viewer.map(|v| v.to_string())],
        |row| video_at(row, 0),
    )
    .optional()
}

pub fn find_video_with_owner(conn: &Connection, id: Uuid) -> Result<Option<Video<OwnerProfile>>> {
    conn.query_row(
        &format!(
            "SELECT {VIDEO_COLUMNS}, {OWNER_COLUMNS}
             FROM videos v JOIN users u ON u.id = v.owner_id
             WHERE v.id = ?1"
        ),
        [id.to_string()],
        video_with_owner,
    )
    .optional()
}

/// Increment the view counter of a published video and return it with the
/// new count. Missing or unpublished videos are left untouched.
pub fn record_view(conn: &Connection, id: Uuid) -> Result<Option<Video<OwnerProfile>>> {
    let updated = conn.execute(
        "UPDATE videos SET views = views + 1 WHERE id = ?1 AND is_published = 1",
        [id.to_string()],
    )?;
    if updated == 0 {
        return Ok(None);
    }
    find_video_with_owner(conn, id)
}

/// Persist the mutable fields of `video` and stamp `updated_at`.
pub fn save_video(conn: &Connection, video: &mut Video) -> Result<()> {
    video.updated_at = now();
    conn.execute(
        "UPDATE videos
         SET title = ?2, description = ?3, thumbnail = ?4, is_published = ?5, updated_at = ?6
         WHERE id = ?1",
        params![
            video.id.to_string(),
            video.title,
            video.description,
            video.thumbnail,
            video.is_published,
            timestamp(video.updated_at),
        ],
    )?;
    Ok(())
}

pub fn delete_video(conn: &Connection, id: Uuid) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM videos WHERE id = ?1", [id.to_string()])?;
    Ok(deleted > 0)
}

pub fn list_videos(
    conn: &Connection,
    filter: &VideoFilter,
    sort: &VideoSort,
    page: &Page,
) -> Result<Paginated<Video<OwnerProfile>>> {
    let (where_sql, args) = filter.sql();

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM videos v {where_sql}"),
        params_from_iter(args.iter()),
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {VIDEO_COLUMNS}, {OWNER_COLUMNS}
         FROM videos v JOIN users u ON u.id = v.owner_id
         {where_sql} {} {}",
        sort.sql(),
        page.sql()
    ))?;
    let items = stmt
        .query_map(params_from_iter(args.iter()), video_with_owner)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Paginated {
        items,
        total: total as u64,
    })
}
