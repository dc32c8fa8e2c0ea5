use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use tracing::info;
use uuid::Uuid;

use vidshare_db::Database;
use vidshare_db::paginate::Page;
use vidshare_db::queries::{tweets as store, users};
use vidshare_types::api::{Claims, ContentRequest, Empty, PageQuery, TweetPage};
use vidshare_types::models::Tweet;

use crate::error::{ApiError, ApiResult, respond};
use crate::extract::{ApiJson, ApiQuery};
use crate::guard::{non_blank, owned_by, parse_id};
use crate::{AppState, run_blocking};

fn required_content(content: Option<&str>) -> ApiResult<&str> {
    non_blank(content).ok_or_else(|| ApiError::InvalidInput("Content is required".into()))
}

pub fn create_tweet(db: &Database, caller: Uuid, content: Option<&str>) -> ApiResult<Tweet> {
    let content = required_content(content)?;
    let tweet = db.with_tx(|tx| store::insert_tweet(tx, caller, content))?;
    info!("User {} posted tweet {}", caller, tweet.id);
    Ok(tweet)
}

pub fn user_tweets(db: &Database, owner: Uuid, query: &PageQuery) -> ApiResult<TweetPage> {
    let page = Page::new(query.page, query.limit)?;
    db.with_conn(|conn| {
        if !users::user_exists(conn, owner)? {
            return Err(ApiError::NotFound("User not found".into()));
        }
        let result = store::list_user_tweets(conn, owner, &page)?;
        Ok(TweetPage {
            tweets: result.items,
            total: result.total,
            page: page.page,
            limit: page.limit,
        })
    })
}

pub fn update_tweet(db: &Database, caller: Uuid, id: Uuid, content: Option<&str>) -> ApiResult<Tweet> {
    let content = required_content(content)?;
    db.with_tx(|tx| {
        let mut tweet = owned_by(caller, store::find_tweet(tx, id)?, "update")?;
        tweet.content = content.to_string();
        store::save_tweet(tx, &mut tweet)?;
        Ok(tweet)
    })
}

pub fn delete_tweet(db: &Database, caller: Uuid, id: Uuid) -> ApiResult<()> {
    db.with_tx(|tx| {
        owned_by(caller, store::find_tweet(tx, id)?, "delete")?;
        store::delete_tweet(tx, id)?;
        Ok::<_, ApiError>(())
    })?;
    info!("User {} deleted tweet {}", caller, id);
    Ok(())
}

// ── Handlers ────────────────────────────────────────────────────────────

/// POST /tweets
pub async fn post_tweet(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<ContentRequest>,
) -> ApiResult<Response> {
    let caller = claims.sub;
    let tweet = run_blocking(&state, move |db| {
        create_tweet(db, caller, req.content.as_deref())
    })
    .await?;
    Ok(respond(StatusCode::CREATED, tweet, "Tweet created successfully"))
}

/// GET /tweets/user/{user_id}
pub async fn get_user_tweets(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Response> {
    let owner = parse_id(&user_id, "user")?;
    let page = run_blocking(&state, move |db| user_tweets(db, owner, &query)).await?;
    Ok(respond(StatusCode::OK, page, "Tweets fetched successfully"))
}

/// PATCH /tweets/{tweet_id}
pub async fn patch_tweet(
    State(state): State<AppState>,
    Path(tweet_id): Path<String>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<ContentRequest>,
) -> ApiResult<Response> {
    let id = parse_id(&tweet_id, "tweet")?;
    let caller = claims.sub;
    let tweet = run_blocking(&state, move |db| {
        update_tweet(db, caller, id, req.content.as_deref())
    })
    .await?;
    Ok(respond(StatusCode::OK, tweet, "Tweet updated successfully"))
}

/// DELETE /tweets/{tweet_id}
pub async fn remove_tweet(
    State(state): State<AppState>,
    Path(tweet_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Response> {
    let id = parse_id(&tweet_id, "tweet")?;
    let caller = claims.sub;
    run_blocking(&state, move |db| delete_tweet(db, caller, id)).await?;
    Ok(respond(StatusCode::OK, Empty {}, "Tweet deleted successfully"))
}
