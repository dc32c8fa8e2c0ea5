use std::collections::HashMap;

use axum::{
    Extension,
    body::Bytes,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    http::StatusCode,
    response::Response,
};
use tracing::info;
use uuid::Uuid;

use vidshare_db::Database;
use vidshare_db::paginate::{Page, VideoSort};
use vidshare_db::queries::videos::{self as store, VideoFilter};
use vidshare_types::api::{Claims, Empty, NewVideo, VideoListQuery, VideoPage, VideoPatch};
use vidshare_types::models::{OwnerProfile, Video};

use crate::error::{ApiError, ApiResult, respond};
use crate::extract::ApiQuery;
use crate::guard::{non_blank, owned_by, parse_id};
use crate::{AppState, run_blocking};

// ── Core operations ─────────────────────────────────────────────────────

/// Published videos, optionally narrowed by title substring and owner.
pub fn list_videos(db: &Database, query: &VideoListQuery) -> ApiResult<VideoPage> {
    let page = Page::new(query.page, query.limit)?;
    let sort = VideoSort::parse(query.sort_by.as_deref(), query.sort_type.as_deref())?;
    // A malformed owner filter is ignored rather than rejected.
    let owner = non_blank(query.user_id.as_deref()).and_then(|raw| raw.parse::<Uuid>().ok());
    let filter = VideoFilter {
        title: query.query.clone(),
        owner,
        published_only: true,
    };

    let result = db.with_conn(|conn| store::list_videos(conn, &filter, &sort, &page))?;
    Ok(VideoPage {
        total: result.total,
        page: page.page,
        limit: page.limit,
        videos: result.items,
    })
}

fn incomplete() -> ApiError {
    ApiError::InvalidInput("All fields are required including video and thumbnail".into())
}

/// Text fields of a new video. Runs before any file reaches the asset store.
pub fn check_details(title: &str, description: &str, duration: f64) -> ApiResult<()> {
    if title.trim().is_empty() || description.trim().is_empty() {
        return Err(incomplete());
    }
    if !duration.is_finite() || duration <= 0.0 {
        return Err(ApiError::InvalidInput("Duration must be a positive number".into()));
    }
    Ok(())
}

pub fn publish_video(db: &Database, caller: Uuid, new: NewVideo) -> ApiResult<Video> {
    check_details(&new.title, &new.description, new.duration)?;
    if new.video_file.trim().is_empty() || new.thumbnail.trim().is_empty() {
        return Err(incomplete());
    }

    let new = NewVideo {
        title: new.title.trim().to_string(),
        description: new.description.trim().to_string(),
        ..new
    };
    let video = db.with_tx(|tx| store::insert_video(tx, caller, &new))?;
    info!("User {} published video {}", caller, video.id);
    Ok(video)
}

/// Fetch a published video and count the view. The increment and the read
/// happen in one transaction; missing or unpublished videos are untouched.
pub fn view_video(db: &Database, id: Uuid) -> ApiResult<Video<OwnerProfile>> {
    db.with_tx(|tx| store::record_view(tx, id))?
        .ok_or_else(|| ApiError::NotFound("Video not found or unpublished".into()))
}

/// Found-then-owned check without mutating anything.
pub fn ensure_video_owner(db: &Database, caller: Uuid, id: Uuid, action: &str) -> ApiResult<Video> {
    let video = db.with_conn(|conn| store::find_video(conn, id))?;
    owned_by(caller, video, action)
}

pub fn update_video(db: &Database, caller: Uuid, id: Uuid, patch: VideoPatch) -> ApiResult<Video> {
    db.with_tx(|tx| {
        let mut video = owned_by(caller, store::find_video(tx, id)?, "update")?;
        if let Some(title) = non_blank(patch.title.as_deref()) {
            video.title = title.to_string();
        }
        if let Some(description) = non_blank(patch.description.as_deref()) {
            video.description = description.to_string();
        }
        if let Some(thumbnail) = non_blank(patch.thumbnail.as_deref()) {
            video.thumbnail = thumbnail.to_string();
        }
        store::save_video(tx, &mut video)?;
        Ok(video)
    })
}

pub fn delete_video(db: &Database, caller: Uuid, id: Uuid) -> ApiResult<()> {
    db.with_tx(|tx| {
        owned_by(caller, store::find_video(tx, id)?, "delete")?;
        store::delete_video(tx, id)?;
        Ok::<_, ApiError>(())
    })?;
    info!("User {} deleted video {}", caller, id);
    Ok(())
}

pub fn toggle_publish(db: &Database, caller: Uuid, id: Uuid) -> ApiResult<Video> {
    let video = db.with_tx(|tx| {
        let mut video = owned_by(caller, store::find_video(tx, id)?, "change publish status of")?;
        video.is_published = !video.is_published;
        store::save_video(tx, &mut video)?;
        Ok::<_, ApiError>(video)
    })?;
    info!(
        "User {} set video {} published={}",
        caller, id, video.is_published
    );
    Ok(video)
}

// ── Multipart forms ─────────────────────────────────────────────────────

struct Upload {
    file_name: Option<String>,
    bytes: Bytes,
}

#[derive(Default)]
struct VideoForm {
    fields: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

impl VideoForm {
    async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::InvalidInput(format!("Malformed form data: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::InvalidInput(format!("Malformed form data: {}", e)))?;

            if file_name.is_some() {
                form.files.insert(name, Upload { file_name, bytes });
            } else {
                let text = String::from_utf8(bytes.to_vec())
                    .map_err(|_| ApiError::InvalidInput(format!("Field '{}' is not text", name)))?;
                form.fields.insert(name, text);
            }
        }
        Ok(form)
    }

    fn text(&self, name: &str) -> Option<&str> {
        non_blank(self.fields.get(name).map(String::as_str))
    }

    fn file(&self, name: &str) -> Option<&Upload> {
        self.files.get(name).filter(|f| !f.bytes.is_empty())
    }
}

async fn upload(state: &AppState, file: &Upload, what: &str) -> ApiResult<String> {
    state
        .assets
        .store(file.file_name.as_deref(), &file.bytes)
        .await
        .map_err(|e| ApiError::Upstream(format!("Error uploading {}: {}", what, e)))
}

// ── Handlers ────────────────────────────────────────────────────────────

/// GET /videos
pub async fn get_all_videos(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<VideoListQuery>,
) -> ApiResult<Response> {
    let page = run_blocking(&state, move |db| list_videos(db, &query)).await?;
    Ok(respond(StatusCode::OK, page, "Videos fetched successfully"))
}

/// POST /videos, multipart with `title`, `description`, `duration`,
/// `videoFile` and `thumbnail`.
pub async fn publish_a_video(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Response> {
    let form = VideoForm::read(multipart?).await?;

    let title = form.text("title").ok_or_else(incomplete)?.to_string();
    let description = form.text("description").ok_or_else(incomplete)?.to_string();
    let duration: f64 = form
        .text("duration")
        .and_then(|d| d.parse().ok())
        .ok_or_else(incomplete)?;
    let video_file = form.file("videoFile").ok_or_else(incomplete)?;
    let thumbnail = form.file("thumbnail").ok_or_else(incomplete)?;
    check_details(&title, &description, duration)?;

    let video_file = upload(&state, video_file, "video").await?;
    let thumbnail = upload(&state, thumbnail, "thumbnail").await?;

    let new = NewVideo {
        title,
        description,
        duration,
        video_file,
        thumbnail,
    };
    let caller = claims.sub;
    let video = run_blocking(&state, move |db| publish_video(db, caller, new)).await?;
    Ok(respond(StatusCode::CREATED, video, "Video published successfully"))
}

/// GET /videos/{video_id}
pub async fn get_video_by_id(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Response> {
    let id = parse_id(&video_id, "video")?;
    let video = run_blocking(&state, move |db| view_video(db, id)).await?;
    Ok(respond(StatusCode::OK, video, "Video fetched successfully"))
}

/// PATCH /videos/{video_id}, multipart with optional `title`,
/// `description` and `thumbnail`.
pub async fn update_video_details(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Extension(claims): Extension<Claims>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Response> {
    let id = parse_id(&video_id, "video")?;
    let caller = claims.sub;
    let form = VideoForm::read(multipart?).await?;

    let thumbnail = match form.file("thumbnail") {
        Some(file) => {
            // Settle existence and ownership before touching the asset store.
            run_blocking(&state, move |db| ensure_video_owner(db, caller, id, "update")).await?;
            Some(upload(&state, file, "thumbnail").await?)
        }
        None => None,
    };

    let patch = VideoPatch {
        title: form.text("title").map(str::to_string),
        description: form.text("description").map(str::to_string),
        thumbnail,
    };
    let video = run_blocking(&state, move |db| update_video(db, caller, id, patch)).await?;
    Ok(respond(StatusCode::OK, video, "Video updated successfully"))
}

/// DELETE /videos/{video_id}
pub async fn delete_video_by_id(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Response> {
    let id = parse_id(&video_id, "video")?;
    let caller = claims.sub;
    run_blocking(&state, move |db| delete_video(db, caller, id)).await?;
    Ok(respond(StatusCode::OK, Empty {}, "Video deleted successfully"))
}

/// PATCH /videos/toggle/publish/{video_id}
pub async fn toggle_publish_status(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Response> {
    let id = parse_id(&video_id, "video")?;
    let caller = claims.sub;
    let video = run_blocking(&state, move |db| toggle_publish(db, caller, id)).await?;
    let message = if video.is_published {
        "Video published successfully"
    } else {
        "Video unpublished successfully"
    };
    Ok(respond(StatusCode::OK, video, message))
}
