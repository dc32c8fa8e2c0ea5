use anyhow::Result;
use rusqlite::{Connection, params};
use uuid::Uuid;

use vidshare_types::models::{Playlist, PlaylistView, Video};

use super::OptionalExt;
use super::users::owner_profile;
use super::videos::visible_to;
use crate::models::{VIDEO_COLUMNS, now, time_at, timestamp, uuid_at, video_at};

const PLAYLIST_COLUMNS: &str = "p.id, p.name, p.description, p.owner_id, p.created_at, p.updated_at";

fn playlist_at(row: &rusqlite::Row<'_>) -> rusqlite::Result<Playlist<Uuid, Uuid>> {
    Ok(Playlist {
        id: uuid_at(row, 0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        owner: uuid_at(row, 3)?,
        videos: Vec::new(),
        created_at: time_at(row, 4)?,
        updated_at: time_at(row, 5)?,
    })
}

pub fn insert_playlist(conn: &Connection, owner: Uuid, name: &str, description: &str) -> Result<Playlist> {
    let at = now();
    let playlist = Playlist {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: description.to_string(),
        owner,
        videos: Vec::new(),
        created_at: at,
        updated_at: at,
    };

    conn.execute(
        "INSERT INTO playlists (id, owner_id, name, description, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![
            playlist.id.to_string(),
            owner.to_string(),
            playlist.name,
            playlist.description,
            timestamp(at)
        ],
    )?;
    Ok(playlist)
}

/// Playlist with its video ids in playlist order.
pub fn find_playlist(conn: &Connection, id: Uuid) -> Result<Option<Playlist>> {
    let Some(mut playlist) = conn
        .query_row(
            &format!("SELECT {PLAYLIST_COLUMNS} FROM playlists p WHERE p.id = ?1"),
            [id.to_string()],
            playlist_at,
        )
        .optional()?
    else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT video_id FROM playlist_videos WHERE playlist_id = ?1 ORDER BY position",
    )?;
    playlist.videos = stmt
        .query_map([id.to_string()], |row| uuid_at(row, 0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(Some(playlist))
}

/// Member videos in playlist order, minus drafts `viewer` does not own.
fn playlist_videos(conn: &Connection, id: Uuid, viewer: Option<Uuid>) -> Result<Vec<Video>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {VIDEO_COLUMNS}
         FROM playlist_videos pv JOIN videos v ON v.id = pv.video_id
         WHERE pv.playlist_id = ?1 AND {}
         ORDER BY pv.position",
        visible_to(2)
    ))?;
    let rows = stmt
        .query_map(params![id.to_string(), viewer.map(|v| v.to_string())], |row| {
            video_at(row, 0)
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn populate(
    conn: &Connection,
    playlist: Playlist<Uuid, Uuid>,
    viewer: Option<Uuid>,
) -> Result<Option<PlaylistView>> {
    let Some(owner) = owner_profile(conn, playlist.owner)? else {
        return Ok(None);
    };
    let videos = playlist_videos(conn, playlist.id, viewer)?;
    Ok(Some(Playlist {
        id: playlist.id,
        name: playlist.name,
        description: playlist.description,
        owner,
        videos,
        created_at: playlist.created_at,
        updated_at: playlist.updated_at,
    }))
}

/// Playlist with owner projection and the video records `viewer` may see.
pub fn playlist_view(conn: &Connection, id: Uuid, viewer: Option<Uuid>) -> Result<Option<PlaylistView>> {
    let playlist = conn
        .query_row(
            &format!("SELECT {PLAYLIST_COLUMNS} FROM playlists p WHERE p.id = ?1"),
            [id.to_string()],
            playlist_at,
        )
        .optional()?;
    match playlist {
        Some(playlist) => populate(conn, playlist, viewer),
        None => Ok(None),
    }
}

pub fn user_playlists(
    conn: &Connection,
    owner: Uuid,
    viewer: Option<Uuid>,
) -> Result<Vec<PlaylistView>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PLAYLIST_COLUMNS} FROM playlists p
         WHERE p.owner_id = ?1
         ORDER BY p.created_at DESC, p.rowid DESC"
    ))?;
    let playlists = stmt
        .query_map([owner.to_string()], playlist_at)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut views = Vec::with_capacity(playlists.len());
    for playlist in playlists {
        if let Some(view) = populate(conn, playlist, viewer)? {
            views.push(view);
        }
    }
    Ok(views)
}

pub fn save_playlist(conn: &Connection, playlist: &mut Playlist) -> Result<()> {
    playlist.updated_at = now();
    conn.execute(
        "UPDATE playlists SET name = ?2, description = ?3, updated_at = ?4 WHERE id = ?1",
        params![
            playlist.id.to_string(),
            playlist.name,
            playlist.description,
            timestamp(playlist.updated_at)
        ],
    )?;
    Ok(())
}

/// Append `video` at the end of the playlist. The primary key on
/// (playlist, video) rejects a second copy.
pub fn append_video(conn: &Connection, playlist: Uuid, video: Uuid) -> Result<()> {
    conn.execute(
        "INSERT INTO playlist_videos (playlist_id, video_id, position)
         SELECT ?1, ?2, COALESCE(MAX(position), 0) + 1 FROM playlist_videos WHERE playlist_id = ?1",
        params![playlist.to_string(), video.to_string()],
    )?;
    touch(conn, playlist)
}

/// Returns whether the video was in the playlist.
pub fn remove_video(conn: &Connection, playlist: Uuid, video: Uuid) -> Result<bool> {
    let removed = conn.execute(
        "DELETE FROM playlist_videos WHERE playlist_id = ?1 AND video_id = ?2",
        params![playlist.to_string(), video.to_string()],
    )?;
    if removed > 0 {
        touch(conn, playlist)?;
    }
    Ok(removed > 0)
}

fn touch(conn: &Connection, playlist: Uuid) -> Result<()> {
    conn.execute(
        "UPDATE playlists SET updated_at = ?2 WHERE id = ?1",
        params![playlist.to_string(), timestamp(now())],
    )?;
    Ok(())
}

pub fn delete_playlist(conn: &Connection, id: Uuid) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM playlists WHERE id = ?1", [id.to_string()])?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use crate::queries::test_support::{seed_user, seed_video};
    use crate::queries::videos::delete_video;

    #[test]
    fn videos_keep_insertion_order() {
        let db = Database::open_in_memory().unwrap();
        let owner = seed_user(&db, "owner");
        let a = seed_video(&db, owner, "a", true);
        let b = seed_video(&db, owner, "b", true);
        let c = seed_video(&db, owner, "c", true);

        let playlist = db
            .with_tx(|tx| {
                let p = insert_playlist(tx, owner, "mix", "things")?;
                for v in [c, a, b] {
                    append_video(tx, p.id, v)?;
                }
                Ok::<_, anyhow::Error>(p.id)
            })
            .unwrap();

        let stored = db.with_conn(|conn| find_playlist(conn, playlist)).unwrap().unwrap();
        assert_eq!(stored.videos, vec![c, a, b]);

        let view = db
            .with_conn(|conn| playlist_view(conn, playlist, None))
            .unwrap()
            .unwrap();
        let titles: Vec<_> = view.videos.iter().map(|v| v.title.as_str()).collect();
        assert_eq!(titles, ["c", "a", "b"]);
        assert_eq!(view.owner.username, "owner");
    }

    #[test]
    fn drafts_are_hidden_from_other_viewers() {
        let db = Database::open_in_memory().unwrap();
        let owner = seed_user(&db, "owner");
        let other = seed_user(&db, "other");
        let live = seed_video(&db, owner, "live", true);
        let draft = seed_video(&db, owner, "draft", false);
        let playlist = db
            .with_tx(|tx| {
                let p = insert_playlist(tx, owner, "mix", "things")?;
                append_video(tx, p.id, live)?;
                append_video(tx, p.id, draft)?;
                Ok::<_, anyhow::Error>(p.id)
            })
            .unwrap();

        let titles = |viewer| {
            let view = db
                .with_conn(|conn| playlist_view(conn, playlist, viewer))
                .unwrap()
                .unwrap();
            view.videos.into_iter().map(|v| v.title).collect::<Vec<_>>()
        };
        assert_eq!(titles(None), ["live"]);
        assert_eq!(titles(Some(other)), ["live"]);
        assert_eq!(titles(Some(owner)), ["live", "draft"]);

        let listed = db.with_conn(|conn| user_playlists(conn, owner, None)).unwrap();
        assert_eq!(listed[0].videos.len(), 1);
    }

    #[test]
    fn duplicate_membership_is_rejected_by_the_store() {
        let db = Database::open_in_memory().unwrap();
        let owner = seed_user(&db, "owner");
        let video = seed_video(&db, owner, "clip", true);
        let playlist = db
            .with_tx(|tx| insert_playlist(tx, owner, "mix", "things"))
            .unwrap()
            .id;

        db.with_tx(|tx| append_video(tx, playlist, video)).unwrap();
        assert!(db.with_tx(|tx| append_video(tx, playlist, video)).is_err());

        let stored = db.with_conn(|conn| find_playlist(conn, playlist)).unwrap().unwrap();
        assert_eq!(stored.videos, vec![video]);
    }

    #[test]
    fn removing_absent_video_is_harmless() {
        let db = Database::open_in_memory().unwrap();
        let owner = seed_user(&db, "owner");
        let kept = seed_video(&db, owner, "kept", true);
        let playlist = db
            .with_tx(|tx| {
                let p = insert_playlist(tx, owner, "mix", "things")?;
                append_video(tx, p.id, kept)?;
                Ok::<_, anyhow::Error>(p.id)
            })
            .unwrap();

        let removed = db
            .with_tx(|tx| remove_video(tx, playlist, Uuid::new_v4()))
            .unwrap();
        assert!(!removed);
        let stored = db.with_conn(|conn| find_playlist(conn, playlist)).unwrap().unwrap();
        assert_eq!(stored.videos, vec![kept]);
    }

    #[test]
    fn deleted_videos_leave_playlists() {
        let db = Database::open_in_memory().unwrap();
        let owner = seed_user(&db, "owner");
        let gone = seed_video(&db, owner, "gone", true);
        let playlist = db
            .with_tx(|tx| {
                let p = insert_playlist(tx, owner, "mix", "things")?;
                append_video(tx, p.id, gone)?;
                Ok::<_, anyhow::Error>(p.id)
            })
            .unwrap();

        db.with_tx(|tx| delete_video(tx, gone)).unwrap();
        let stored = db.with_conn(|conn| find_playlist(conn, playlist)).unwrap().unwrap();
        assert!(stored.videos.is_empty());
    }
}
