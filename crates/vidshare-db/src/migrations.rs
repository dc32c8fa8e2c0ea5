use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                username    TEXT NOT NULL UNIQUE,
                full_name   TEXT NOT NULL,
                avatar      TEXT NOT NULL DEFAULT '',
                password    TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE videos (
                id           TEXT PRIMARY KEY,
                owner_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title        TEXT NOT NULL,
                description  TEXT NOT NULL,
                duration     REAL NOT NULL,
                video_file   TEXT NOT NULL,
                thumbnail    TEXT NOT NULL,
                views        INTEGER NOT NULL DEFAULT 0 CHECK (views >= 0),
                is_published INTEGER NOT NULL DEFAULT 1,
                created_at   TEXT NOT NULL,
                updated_at   TEXT NOT NULL
            );

            CREATE INDEX idx_videos_owner ON videos(owner_id, created_at);
            CREATE INDEX idx_videos_published ON videos(is_published, created_at);

            CREATE TABLE comments (
                id          TEXT PRIMARY KEY,
                video_id    TEXT NOT NULL REFERENCES videos(id) ON DELETE CASCADE,
                owner_id    TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                content     TEXT NOT NULL CHECK (length(trim(content)) > 0),
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE INDEX idx_comments_video ON comments(video_id, created_at);

            CREATE TABLE tweets (
                id          TEXT PRIMARY KEY,
                owner_id    TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                content     TEXT NOT NULL CHECK (length(trim(content)) > 0),
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE INDEX idx_tweets_owner ON tweets(owner_id, created_at);

            -- Exactly one target column is set per row.
            CREATE TABLE likes (
                id          TEXT PRIMARY KEY,
                liked_by    TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                video_id    TEXT REFERENCES videos(id) ON DELETE CASCADE,
                comment_id  TEXT REFERENCES comments(id) ON DELETE CASCADE,
                tweet_id    TEXT REFERENCES tweets(id) ON DELETE CASCADE,
                created_at  TEXT NOT NULL,
                CHECK ((video_id IS NOT NULL) + (comment_id IS NOT NULL) + (tweet_id IS NOT NULL) = 1)
            );

            CREATE UNIQUE INDEX uq_likes_video ON likes(liked_by, video_id) WHERE video_id IS NOT NULL;
            CREATE UNIQUE INDEX uq_likes_comment ON likes(liked_by, comment_id) WHERE comment_id IS NOT NULL;
            CREATE UNIQUE INDEX uq_likes_tweet ON likes(liked_by, tweet_id) WHERE tweet_id IS NOT NULL;
            CREATE INDEX idx_likes_video ON likes(video_id);

            CREATE TABLE subscriptions (
                id             TEXT PRIMARY KEY,
                subscriber_id  TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                channel_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at     TEXT NOT NULL,
                UNIQUE(subscriber_id, channel_id),
                CHECK (subscriber_id <> channel_id)
            );

            CREATE INDEX idx_subscriptions_channel ON subscriptions(channel_id);

            CREATE TABLE playlists (
                id           TEXT PRIMARY KEY,
                owner_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name         TEXT NOT NULL,
                description  TEXT NOT NULL,
                created_at   TEXT NOT NULL,
                updated_at   TEXT NOT NULL
            );

            CREATE INDEX idx_playlists_owner ON playlists(owner_id);

            CREATE TABLE playlist_videos (
                playlist_id  TEXT NOT NULL REFERENCES playlists(id) ON DELETE CASCADE,
                video_id     TEXT NOT NULL REFERENCES videos(id) ON DELETE CASCADE,
                position     INTEGER NOT NULL,
                PRIMARY KEY (playlist_id, video_id)
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
