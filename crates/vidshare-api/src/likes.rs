use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use tracing::info;
use uuid::Uuid;

use vidshare_db::Database;
use vidshare_db::edges::{self, LikeEdge, Toggle};
use vidshare_db::queries::likes as store;
use vidshare_types::api::{Claims, Empty};
use vidshare_types::models::{LikeTarget, OwnerProfile, Video};

use crate::error::{ApiError, ApiResult, respond};
use crate::guard::parse_id;
use crate::{AppState, run_blocking};

/// Like the target if the caller hasn't, unlike it otherwise.
pub fn toggle_like(db: &Database, caller: Uuid, target: LikeTarget) -> ApiResult<Toggle> {
    let outcome = db.with_tx(|tx| {
        if !store::target_visible(tx, caller, &target)? {
            return Err(ApiError::NotFound(format!("{} not found", target.label())));
        }
        let edge = LikeEdge {
            liked_by: caller,
            target,
        };
        Ok(edges::toggle(tx, &edge)?)
    })?;

    info!(
        "User {} {:?} like on {} {}",
        caller,
        outcome,
        target.label(),
        target.id()
    );
    Ok(outcome)
}

pub fn liked_videos(db: &Database, caller: Uuid) -> ApiResult<Vec<Video<OwnerProfile>>> {
    Ok(db.with_conn(|conn| store::liked_videos(conn, caller))?)
}

async fn toggle_handler(
    state: AppState,
    caller: Uuid,
    target: LikeTarget,
) -> ApiResult<Response> {
    let outcome = run_blocking(&state, move |db| toggle_like(db, caller, target)).await?;
    let verb = match outcome {
        Toggle::Added => "liked",
        Toggle::Removed => "unliked",
    };
    Ok(respond(
        StatusCode::OK,
        Empty {},
        format!("{} {}", target.label(), verb),
    ))
}

/// POST /likes/toggle/v/{video_id}
pub async fn toggle_video_like(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Response> {
    let target = LikeTarget::Video(parse_id(&video_id, "video")?);
    toggle_handler(state, claims.sub, target).await
}

/// POST /likes/toggle/c/{comment_id}
pub async fn toggle_comment_like(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Response> {
    let target = LikeTarget::Comment(parse_id(&comment_id, "comment")?);
    toggle_handler(state, claims.sub, target).await
}

/// POST /likes/toggle/t/{tweet_id}
pub async fn toggle_tweet_like(
    State(state): State<AppState>,
    Path(tweet_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Response> {
    let target = LikeTarget::Tweet(parse_id(&tweet_id, "tweet")?);
    toggle_handler(state, claims.sub, target).await
}

/// GET /likes/videos
pub async fn get_liked_videos(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Response> {
    let caller = claims.sub;
    let videos = run_blocking(&state, move |db| liked_videos(db, caller)).await?;
    Ok(respond(StatusCode::OK, videos, "Liked videos fetched successfully"))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use super::*;
    use crate::comments::add_comment;
    use crate::test_support::{user, video};
    use crate::tweets::create_tweet;
    use crate::videos::toggle_publish;

    #[test]
    fn like_then_unlike_leaves_nothing() {
        let db = Database::open_in_memory().unwrap();
        let owner = user(&db, "owner");
        let fan = user(&db, "fan");
        let v = video(&db, owner, "clip");

        assert_eq!(toggle_like(&db, fan, LikeTarget::Video(v)).unwrap(), Toggle::Added);
        let liked = liked_videos(&db, fan).unwrap();
        assert_eq!(liked.len(), 1);
        assert_eq!(liked[0].owner.username, "owner");

        assert_eq!(toggle_like(&db, fan, LikeTarget::Video(v)).unwrap(), Toggle::Removed);
        assert!(liked_videos(&db, fan).unwrap().is_empty());
    }

    #[test]
    fn comment_and_tweet_likes_are_not_liked_videos() {
        let db = Database::open_in_memory().unwrap();
        let owner = user(&db, "owner");
        let v = video(&db, owner, "clip");
        let comment = add_comment(&db, owner, v, Some("hi")).unwrap();
        let tweet = create_tweet(&db, owner, Some("hello")).unwrap();

        toggle_like(&db, owner, LikeTarget::Comment(comment.id)).unwrap();
        toggle_like(&db, owner, LikeTarget::Tweet(tweet.id)).unwrap();
        assert!(liked_videos(&db, owner).unwrap().is_empty());
    }

    #[test]
    fn missing_target_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let fan = user(&db, "fan");
        let err = toggle_like(&db, fan, LikeTarget::Tweet(Uuid::new_v4())).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(msg) if msg == "Tweet not found"));
    }

    #[test]
    fn drafts_cannot_be_liked_by_others() {
        let db = Database::open_in_memory().unwrap();
        let owner = user(&db, "owner");
        let fan = user(&db, "fan");
        let v = video(&db, owner, "clip");
        let comment = add_comment(&db, owner, v, Some("first")).unwrap();

        toggle_like(&db, fan, LikeTarget::Video(v)).unwrap();
        toggle_publish(&db, owner, v).unwrap();

        assert!(liked_videos(&db, fan).unwrap().is_empty());
        for target in [LikeTarget::Video(v), LikeTarget::Comment(comment.id)] {
            assert!(matches!(toggle_like(&db, fan, target), Err(ApiError::NotFound(_))));
        }
        assert_eq!(toggle_like(&db, owner, LikeTarget::Video(v)).unwrap(), Toggle::Added);
        assert_eq!(liked_videos(&db, owner).unwrap().len(), 1);
    }

    #[test]
    fn concurrent_toggles_settle_to_parity() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let owner = user(&db, "owner");
        let fan = user(&db, "fan");
        let v = video(&db, owner, "clip");

        const N: usize = 9;
        let barrier = Arc::new(Barrier::new(N));
        let handles: Vec<_> = (0..N)
            .map(|_| {
                let db = db.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    toggle_like(&db, fan, LikeTarget::Video(v)).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(liked_videos(&db, fan).unwrap().len(), N % 2);
    }
}
