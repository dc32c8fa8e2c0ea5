use anyhow::Result;
use rusqlite::Connection;
use uuid::Uuid;

use vidshare_types::models::{LikeTarget, OwnerProfile, Video};

use super::videos::visible_to;
use crate::models::{OWNER_COLUMNS, VIDEO_COLUMNS, video_with_owner};

/// Whether the entity a like would point at exists and `viewer` can see it.
/// Drafts, and comments under drafts, are visible to the video owner only.
pub fn target_visible(conn: &Connection, viewer: Uuid, target: &LikeTarget) -> Result<bool> {
    let id = target.id().to_string();
    let found: bool = match target {
        LikeTarget::Video(_) => conn.query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM videos v WHERE v.id = ?1 AND {})",
                visible_to(2)
            ),
            [id, viewer.to_string()],
            |row| row.get(0),
        )?,
        LikeTarget::Comment(_) => conn.query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM comments c JOIN videos v ON v.id = c.video_id
                               WHERE c.id = ?1 AND {})",
                visible_to(2)
            ),
            [id, viewer.to_string()],
            |row| row.get(0),
        )?,
        LikeTarget::Tweet(_) => conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM tweets WHERE id = ?1)",
            [id],
            |row| row.get(0),
        )?,
    };
    Ok(found)
}

/// Videos the user has liked and can still see, most recent like first.
pub fn liked_videos(conn: &Connection, user: Uuid) -> Result<Vec<Video<OwnerProfile>>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {VIDEO_COLUMNS}, {OWNER_COLUMNS}
         FROM likes l
         JOIN videos v ON v.id = l.video_id
         JOIN users u ON u.id = v.owner_id
         WHERE l.liked_by = ?1 AND {}
         ORDER BY l.created_at DESC, l.rowid DESC",
        visible_to(1)
    ))?;
    let rows = stmt
        .query_map([user.to_string()], video_with_owner)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
pub fn count_likes(conn: &Connection, target: &LikeTarget) -> Result<u64> {
    let column = match target {
        LikeTarget::Video(_) => "video_id",
        LikeTarget::Comment(_) => "comment_id",
        LikeTarget::Tweet(_) => "tweet_id",
    };
    let n: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM likes WHERE {column} = ?1"),
        [target.id().to_string()],
        |row| row.get(0),
    )?;
    Ok(n as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use crate::edges::{LikeEdge, toggle};
    use crate::queries::test_support::{seed_tweet, seed_user, seed_video};
    use crate::queries::videos::delete_video;

    #[test]
    fn liked_videos_ignore_other_targets() {
        let db = Database::open_in_memory().unwrap();
        let owner = seed_user(&db, "owner");
        let fan = seed_user(&db, "fan");
        let first = seed_video(&db, owner, "first", true);
        let second = seed_video(&db, owner, "second", true);
        let tweet = seed_tweet(&db, owner, "news");

        db.with_tx(|tx| {
            for target in [
                LikeTarget::Video(first),
                LikeTarget::Tweet(tweet),
                LikeTarget::Video(second),
            ] {
                toggle(tx, &LikeEdge { liked_by: fan, target })?;
            }
            Ok::<_, anyhow::Error>(())
        })
        .unwrap();

        let videos = db.with_conn(|c| liked_videos(c, fan)).unwrap();
        let titles: Vec<_> = videos.iter().map(|v| v.title.as_str()).collect();
        assert_eq!(titles, ["second", "first"]);
        assert_eq!(videos[0].owner.username, "owner");
    }

    #[test]
    fn deleting_a_video_prunes_its_likes() {
        let db = Database::open_in_memory().unwrap();
        let owner = seed_user(&db, "owner");
        let fan = seed_user(&db, "fan");
        let video = seed_video(&db, owner, "clip", true);
        let target = LikeTarget::Video(video);

        db.with_tx(|tx| toggle(tx, &LikeEdge { liked_by: fan, target }))
            .unwrap();
        assert_eq!(db.with_conn(|c| count_likes(c, &target)).unwrap(), 1);

        db.with_tx(|tx| delete_video(tx, video)).unwrap();
        assert_eq!(db.with_conn(|c| count_likes(c, &target)).unwrap(), 0);
        assert!(!db.with_conn(|c| target_visible(c, fan, &target)).unwrap());
    }

    #[test]
    fn unpublished_videos_drop_out_of_other_users_likes() {
        let db = Database::open_in_memory().unwrap();
        let owner = seed_user(&db, "owner");
        let fan = seed_user(&db, "fan");
        let video = seed_video(&db, owner, "clip", true);
        let target = LikeTarget::Video(video);

        db.with_tx(|tx| toggle(tx, &LikeEdge { liked_by: fan, target }))
            .unwrap();
        db.with_tx(|tx| toggle(tx, &LikeEdge { liked_by: owner, target }))
            .unwrap();
        db.with_tx(|tx| {
            tx.execute(
                "UPDATE videos SET is_published = 0 WHERE id = ?1",
                [video.to_string()],
            )
            .map_err(anyhow::Error::from)
        })
        .unwrap();

        assert!(db.with_conn(|c| liked_videos(c, fan)).unwrap().is_empty());
        assert_eq!(db.with_conn(|c| liked_videos(c, owner)).unwrap().len(), 1);
        assert!(!db.with_conn(|c| target_visible(c, fan, &target)).unwrap());
        assert!(db.with_conn(|c| target_visible(c, owner, &target)).unwrap());
    }
}
