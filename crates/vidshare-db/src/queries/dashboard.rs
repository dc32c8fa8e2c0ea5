use anyhow::Result;
use rusqlite::Connection;
use uuid::Uuid;

use vidshare_types::models::ChannelStats;

/// Aggregates for one channel. Likes count only likes on the channel's
/// videos, not on its comments or tweets.
pub fn channel_stats(conn: &Connection, channel: Uuid) -> Result<ChannelStats> {
    let channel = channel.to_string();

    let (total_videos, total_views): (i64, i64) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(views), 0) FROM videos WHERE owner_id = ?1",
        [&channel],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let total_subscribers: i64 = conn.query_row(
        "SELECT COUNT(*) FROM subscriptions WHERE channel_id = ?1",
        [&channel],
        |row| row.get(0),
    )?;

    let total_video_likes: i64 = conn.query_row(
        "SELECT COUNT(*) FROM likes l JOIN videos v ON v.id = l.video_id WHERE v.owner_id = ?1",
        [&channel],
        |row| row.get(0),
    )?;

    Ok(ChannelStats {
        total_videos: total_videos as u64,
        total_subscribers: total_subscribers as u64,
        total_video_likes: total_video_likes as u64,
        total_views: total_views as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use crate::edges::{LikeEdge, SubscriptionEdge, toggle};
    use crate::queries::test_support::{seed_tweet, seed_user, seed_video};
    use crate::queries::videos::record_view;
    use vidshare_types::models::LikeTarget;

    #[test]
    fn empty_channel_has_zero_stats() {
        let db = Database::open_in_memory().unwrap();
        let user = seed_user(&db, "new");
        let stats = db.with_conn(|c| channel_stats(c, user)).unwrap();
        assert_eq!(
            stats,
            ChannelStats {
                total_videos: 0,
                total_subscribers: 0,
                total_video_likes: 0,
                total_views: 0,
            }
        );
    }

    #[test]
    fn stats_count_only_video_likes() {
        let db = Database::open_in_memory().unwrap();
        let creator = seed_user(&db, "creator");
        let fan = seed_user(&db, "fan");
        let other = seed_user(&db, "other");
        let v1 = seed_video(&db, creator, "one", true);
        let v2 = seed_video(&db, creator, "two", false);
        let tweet = seed_tweet(&db, creator, "hello");
        let foreign = seed_video(&db, other, "foreign", true);

        db.with_tx(|tx| {
            for (by, target) in [
                (fan, LikeTarget::Video(v1)),
                (other, LikeTarget::Video(v1)),
                (fan, LikeTarget::Video(v2)),
                (fan, LikeTarget::Tweet(tweet)),
                (creator, LikeTarget::Video(foreign)),
            ] {
                toggle(tx, &LikeEdge { liked_by: by, target })?;
            }
            toggle(
                tx,
                &SubscriptionEdge {
                    subscriber: fan,
                    channel: creator,
                },
            )?;
            record_view(tx, v1)?;
            record_view(tx, v1)?;
            record_view(tx, foreign)?;
            Ok::<_, anyhow::Error>(())
        })
        .unwrap();

        let stats = db.with_conn(|c| channel_stats(c, creator)).unwrap();
        assert_eq!(stats.total_videos, 2);
        assert_eq!(stats.total_subscribers, 1);
        assert_eq!(stats.total_video_likes, 3);
        assert_eq!(stats.total_views, 2);
    }
}
