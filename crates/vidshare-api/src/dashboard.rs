use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::Response,
};
use uuid::Uuid;

use vidshare_db::Database;
use vidshare_db::paginate::{Page, VideoSort};
use vidshare_db::queries::dashboard as store;
use vidshare_db::queries::videos::{self, VideoFilter};
use vidshare_types::api::{Claims, PageQuery, VideoPage};
use vidshare_types::models::ChannelStats;

use crate::error::{ApiResult, respond};
use crate::extract::ApiQuery;
use crate::{AppState, run_blocking};

pub fn channel_stats(db: &Database, channel: Uuid) -> ApiResult<ChannelStats> {
    Ok(db.with_conn(|conn| store::channel_stats(conn, channel))?)
}

/// Every video the channel owns, drafts included, newest first.
pub fn channel_videos(db: &Database, channel: Uuid, query: &PageQuery) -> ApiResult<VideoPage> {
    let page = Page::new(query.page, query.limit)?;
    let filter = VideoFilter {
        owner: Some(channel),
        ..Default::default()
    };
    let result = db.with_conn(|conn| videos::list_videos(conn, &filter, &VideoSort::default(), &page))?;
    Ok(VideoPage {
        total: result.total,
        page: page.page,
        limit: page.limit,
        videos: result.items,
    })
}

/// GET /dashboard/stats
pub async fn get_channel_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Response> {
    let channel = claims.sub;
    let stats = run_blocking(&state, move |db| channel_stats(db, channel)).await?;
    Ok(respond(StatusCode::OK, stats, "Channel stats fetched successfully"))
}

/// GET /dashboard/videos
pub async fn get_channel_videos(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Response> {
    let channel = claims.sub;
    let page = run_blocking(&state, move |db| channel_videos(db, channel, &query)).await?;
    Ok(respond(StatusCode::OK, page, "Channel videos fetched successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::likes::toggle_like;
    use crate::subscriptions::toggle_subscription;
    use crate::test_support::{user, video};
    use crate::videos::{toggle_publish, view_video};
    use vidshare_types::models::LikeTarget;

    #[test]
    fn stats_cover_views_likes_and_subscribers() {
        let db = Database::open_in_memory().unwrap();
        let creator = user(&db, "creator");
        let fan = user(&db, "fan");
        let a = video(&db, creator, "a");
        let b = video(&db, creator, "b");

        view_video(&db, a).unwrap();
        view_video(&db, a).unwrap();
        view_video(&db, b).unwrap();
        toggle_like(&db, fan, LikeTarget::Video(a)).unwrap();
        toggle_like(&db, creator, LikeTarget::Video(b)).unwrap();
        toggle_subscription(&db, fan, creator).unwrap();

        let stats = channel_stats(&db, creator).unwrap();
        assert_eq!(
            stats,
            ChannelStats {
                total_videos: 2,
                total_subscribers: 1,
                total_video_likes: 2,
                total_views: 3,
            }
        );
        assert_eq!(channel_stats(&db, fan).unwrap().total_views, 0);
    }

    #[test]
    fn channel_videos_include_drafts() {
        let db = Database::open_in_memory().unwrap();
        let creator = user(&db, "creator");
        let other = user(&db, "other");
        let draft = video(&db, creator, "draft");
        video(&db, creator, "live");
        video(&db, other, "elsewhere");
        toggle_publish(&db, creator, draft).unwrap();

        let page = channel_videos(&db, creator, &PageQuery::default()).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.videos[0].title, "live");
        assert!(page.videos.iter().any(|v| !v.is_published));
    }
}
