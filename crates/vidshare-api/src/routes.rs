use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::Response,
    routing::{get, patch, post},
};

use vidshare_types::api::HealthStatus;

use crate::error::{ApiError, respond};
use crate::middleware::require_auth;
use crate::{AppState, auth, comments, dashboard, likes, playlists, subscriptions, tweets, videos};

/// The full `/api/v1` surface. Routes that act on behalf of a caller sit
/// behind bearer-token auth; reads are public.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/healthcheck", get(healthcheck))
        .route("/users/register", post(auth::register))
        .route("/users/login", post(auth::login))
        .route("/videos", get(videos::get_all_videos))
        .route("/videos/{video_id}", get(videos::get_video_by_id))
        .route("/comments/{video_id}", get(comments::get_video_comments))
        .route("/subscriptions/c/{channel_id}", get(subscriptions::get_channel_subscribers))
        .route("/subscriptions/u/{subscriber_id}", get(subscriptions::get_subscribed_channels))
        .route("/tweets/user/{user_id}", get(tweets::get_user_tweets))
        .route("/playlists/user/{user_id}", get(playlists::get_user_playlists))
        .route("/playlists/{playlist_id}", get(playlists::get_playlist_by_id));

    let protected_routes = Router::new()
        .route("/videos", post(videos::publish_a_video))
        .route(
            "/videos/{video_id}",
            patch(videos::update_video_details).delete(videos::delete_video_by_id),
        )
        .route("/videos/toggle/publish/{video_id}", patch(videos::toggle_publish_status))
        .route("/comments/{video_id}", post(comments::post_comment))
        .route(
            "/comments/c/{comment_id}",
            patch(comments::patch_comment).delete(comments::remove_comment),
        )
        .route("/likes/toggle/v/{video_id}", post(likes::toggle_video_like))
        .route("/likes/toggle/c/{comment_id}", post(likes::toggle_comment_like))
        .route("/likes/toggle/t/{tweet_id}", post(likes::toggle_tweet_like))
        .route("/likes/videos", get(likes::get_liked_videos))
        .route("/subscriptions/c/{channel_id}", post(subscriptions::toggle))
        .route("/tweets", post(tweets::post_tweet))
        .route(
            "/tweets/{tweet_id}",
            patch(tweets::patch_tweet).delete(tweets::remove_tweet),
        )
        .route("/playlists", post(playlists::post_playlist))
        .route(
            "/playlists/{playlist_id}",
            patch(playlists::patch_playlist).delete(playlists::remove_playlist),
        )
        .route(
            "/playlists/{playlist_id}/videos/{video_id}",
            patch(playlists::add_video_to_playlist).delete(playlists::remove_video_from_playlist),
        )
        .route("/dashboard/stats", get(dashboard::get_channel_stats))
        .route("/dashboard/videos", get(dashboard::get_channel_videos))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .nest("/api/v1", public_routes.merge(protected_routes))
        .fallback(route_not_found)
        .with_state(state)
}

async fn healthcheck() -> Response {
    respond(
        StatusCode::OK,
        HealthStatus {
            status: "OK".into(),
        },
        "Health check passed",
    )
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".into())
}
