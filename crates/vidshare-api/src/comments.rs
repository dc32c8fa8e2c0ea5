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
use vidshare_db::queries::{comments as store, videos};
use vidshare_types::api::{Claims, CommentPage, ContentRequest, Empty, PageQuery};
use vidshare_types::models::{Comment, OwnerProfile};

use crate::error::{ApiError, ApiResult, respond};
use crate::extract::{ApiJson, ApiQuery};
use crate::guard::{non_blank, owned_by, parse_id};
use crate::{AppState, run_blocking};

fn required_content(content: Option<&str>) -> ApiResult<&str> {
    non_blank(content).ok_or_else(|| ApiError::InvalidInput("Content is required".into()))
}

/// Comments on a published video, newest first.
pub fn list_comments(db: &Database, video: Uuid, query: &PageQuery) -> ApiResult<CommentPage> {
    let page = Page::new(query.page, query.limit)?;
    db.with_conn(|conn| {
        if videos::find_visible_video(conn, video, None)?.is_none() {
            return Err(ApiError::NotFound("Video not found".into()));
        }
        let result = store::list_video_comments(conn, video, &page)?;
        Ok(CommentPage {
            comments: result.items,
            total: result.total,
            page: page.page,
            limit: page.limit,
        })
    })
}

/// Comment on a video the caller can see: published ones, or their own drafts.
pub fn add_comment(
    db: &Database,
    caller: Uuid,
    video: Uuid,
    content: Option<&str>,
) -> ApiResult<Comment<OwnerProfile>> {
    let content = required_content(content)?;
    db.with_tx(|tx| {
        if videos::find_visible_video(tx, video, Some(caller))?.is_none() {
            return Err(ApiError::NotFound("Video not found".into()));
        }
        let comment = store::insert_comment(tx, video, caller, content)?;
        store::find_comment_with_owner(tx, comment.id)?
            .ok_or_else(|| ApiError::Store(anyhow::anyhow!("comment {} vanished after insert", comment.id)))
    })
}

pub fn update_comment(
    db: &Database,
    caller: Uuid,
    id: Uuid,
    content: Option<&str>,
) -> ApiResult<Comment> {
    let content = required_content(content)?;
    db.with_tx(|tx| {
        let mut comment = owned_by(caller, store::find_comment(tx, id)?, "update")?;
        comment.content = content.to_string();
        store::save_comment(tx, &mut comment)?;
        Ok(comment)
    })
}

pub fn delete_comment(db: &Database, caller: Uuid, id: Uuid) -> ApiResult<()> {
    db.with_tx(|tx| {
        owned_by(caller, store::find_comment(tx, id)?, "delete")?;
        store::delete_comment(tx, id)?;
        Ok::<_, ApiError>(())
    })?;
    info!("User {} deleted comment {}", caller, id);
    Ok(())
}

// ── Handlers ────────────────────────────────────────────────────────────

/// GET /comments/{video_id}
pub async fn get_video_comments(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Response> {
    let video = parse_id(&video_id, "video")?;
    let page = run_blocking(&state, move |db| list_comments(db, video, &query)).await?;
    Ok(respond(StatusCode::OK, page, "Comments fetched successfully"))
}

/// POST /comments/{video_id}
pub async fn post_comment(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<ContentRequest>,
) -> ApiResult<Response> {
    let video = parse_id(&video_id, "video")?;
    let caller = claims.sub;
    let comment = run_blocking(&state, move |db| {
        add_comment(db, caller, video, req.content.as_deref())
    })
    .await?;
    Ok(respond(StatusCode::CREATED, comment, "Comment added successfully"))
}

/// PATCH /comments/c/{comment_id}
pub async fn patch_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<ContentRequest>,
) -> ApiResult<Response> {
    let id = parse_id(&comment_id, "comment")?;
    let caller = claims.sub;
    let comment = run_blocking(&state, move |db| {
        update_comment(db, caller, id, req.content.as_deref())
    })
    .await?;
    Ok(respond(StatusCode::OK, comment, "Comment updated successfully"))
}

/// DELETE /comments/c/{comment_id}
pub async fn remove_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Response> {
    let id = parse_id(&comment_id, "comment")?;
    let caller = claims.sub;
    run_blocking(&state, move |db| delete_comment(db, caller, id)).await?;
    Ok(respond(StatusCode::OK, Empty {}, "Comment deleted successfully"))
}
