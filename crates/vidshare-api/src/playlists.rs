use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use tracing::info;
use uuid::Uuid;

use vidshare_db::{Connection, Database};
use vidshare_db::queries::{playlists as store, users, videos};
use vidshare_types::api::{Claims, CreatePlaylistRequest, Empty, UpdatePlaylistRequest};
use vidshare_types::models::{Playlist, PlaylistView};

use crate::error::{ApiError, ApiResult, respond};
use crate::extract::ApiJson;
use crate::guard::{non_blank, owned_by, parse_id};
use crate::{AppState, run_blocking};

/// Populated view of a playlist that must exist, as `viewer` sees it.
fn view(conn: &Connection, id: Uuid, viewer: Option<Uuid>) -> ApiResult<PlaylistView> {
    store::playlist_view(conn, id, viewer)?
        .ok_or_else(|| ApiError::NotFound("Playlist not found".into()))
}

fn owned_playlist(conn: &Connection, caller: Uuid, id: Uuid, action: &str) -> ApiResult<Playlist> {
    owned_by(caller, store::find_playlist(conn, id)?, action)
}

pub fn create_playlist(db: &Database, caller: Uuid, req: &CreatePlaylistRequest) -> ApiResult<PlaylistView> {
    let (Some(name), Some(description)) = (
        non_blank(req.name.as_deref()),
        non_blank(req.description.as_deref()),
    ) else {
        return Err(ApiError::InvalidInput(
            "Name and description are required".into(),
        ));
    };

    let playlist = db.with_tx(|tx| {
        let playlist = store::insert_playlist(tx, caller, name, description)?;
        view(tx, playlist.id, Some(caller))
    })?;
    info!("User {} created playlist {}", caller, playlist.id);
    Ok(playlist)
}

pub fn user_playlists(db: &Database, owner: Uuid) -> ApiResult<Vec<PlaylistView>> {
    db.with_conn(|conn| {
        if !users::user_exists(conn, owner)? {
            return Err(ApiError::NotFound("User not found".into()));
        }
        Ok(store::user_playlists(conn, owner, None)?)
    })
}

pub fn get_playlist(db: &Database, id: Uuid) -> ApiResult<PlaylistView> {
    db.with_conn(|conn| view(conn, id, None))
}

pub fn update_playlist(
    db: &Database,
    caller: Uuid,
    id: Uuid,
    req: &UpdatePlaylistRequest,
) -> ApiResult<PlaylistView> {
    db.with_tx(|tx| {
        let mut playlist = owned_playlist(tx, caller, id, "update")?;
        if let Some(name) = non_blank(req.name.as_deref()) {
            playlist.name = name.to_string();
        }
        if let Some(description) = non_blank(req.description.as_deref()) {
            playlist.description = description.to_string();
        }
        store::save_playlist(tx, &mut playlist)?;
        view(tx, id, Some(caller))
    })
}

pub fn delete_playlist(db: &Database, caller: Uuid, id: Uuid) -> ApiResult<()> {
    db.with_tx(|tx| {
        owned_playlist(tx, caller, id, "delete")?;
        store::delete_playlist(tx, id)?;
        Ok::<_, ApiError>(())
    })?;
    info!("User {} deleted playlist {}", caller, id);
    Ok(())
}

pub fn add_video(db: &Database, caller: Uuid, playlist: Uuid, video: Uuid) -> ApiResult<PlaylistView> {
    db.with_tx(|tx| {
        let current = owned_playlist(tx, caller, playlist, "modify")?;
        if videos::find_visible_video(tx, video, Some(caller))?.is_none() {
            return Err(ApiError::NotFound("Video not found".into()));
        }
        if current.videos.contains(&video) {
            return Err(ApiError::InvalidOperation(
                "Video already exists in the playlist".into(),
            ));
        }
        store::append_video(tx, playlist, video)?;
        view(tx, playlist, Some(caller))
    })
}

/// Removing a video that isn't in the playlist succeeds without change.
pub fn remove_video(db: &Database, caller: Uuid, playlist: Uuid, video: Uuid) -> ApiResult<PlaylistView> {
    db.with_tx(|tx| {
        owned_playlist(tx, caller, playlist, "modify")?;
        store::remove_video(tx, playlist, video)?;
        view(tx, playlist, Some(caller))
    })
}

// ── Handlers ────────────────────────────────────────────────────────────

/// POST /playlists
pub async fn post_playlist(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<CreatePlaylistRequest>,
) -> ApiResult<Response> {
    let caller = claims.sub;
    let playlist = run_blocking(&state, move |db| create_playlist(db, caller, &req)).await?;
    Ok(respond(StatusCode::CREATED, playlist, "Playlist created successfully"))
}

/// GET /playlists/user/{user_id}
pub async fn get_user_playlists(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Response> {
    let owner = parse_id(&user_id, "user")?;
    let playlists = run_blocking(&state, move |db| user_playlists(db, owner)).await?;
    Ok(respond(StatusCode::OK, playlists, "User playlists fetched successfully"))
}

/// GET /playlists/{playlist_id}
pub async fn get_playlist_by_id(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
) -> ApiResult<Response> {
    let id = parse_id(&playlist_id, "playlist")?;
    let playlist = run_blocking(&state, move |db| get_playlist(db, id)).await?;
    Ok(respond(StatusCode::OK, playlist, "Playlist fetched successfully"))
}

/// PATCH /playlists/{playlist_id}
pub async fn patch_playlist(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<UpdatePlaylistRequest>,
) -> ApiResult<Response> {
    let id = parse_id(&playlist_id, "playlist")?;
    let caller = claims.sub;
    let playlist = run_blocking(&state, move |db| update_playlist(db, caller, id, &req)).await?;
    Ok(respond(StatusCode::OK, playlist, "Playlist updated successfully"))
}

/// DELETE /playlists/{playlist_id}
pub async fn remove_playlist(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Response> {
    let id = parse_id(&playlist_id, "playlist")?;
    let caller = claims.sub;
    run_blocking(&state, move |db| delete_playlist(db, caller, id)).await?;
    Ok(respond(StatusCode::OK, Empty {}, "Playlist deleted successfully"))
}

/// PATCH /playlists/{playlist_id}/videos/{video_id}
pub async fn add_video_to_playlist(
    State(state): State<AppState>,
    Path((playlist_id, video_id)): Path<(String, String)>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Response> {
    let playlist = parse_id(&playlist_id, "playlist")?;
    let video = parse_id(&video_id, "video")?;
    let caller = claims.sub;
    let view = run_blocking(&state, move |db| add_video(db, caller, playlist, video)).await?;
    Ok(respond(StatusCode::OK, view, "Video added to playlist successfully"))
}

/// DELETE /playlists/{playlist_id}/videos/{video_id}
pub async fn remove_video_from_playlist(
    State(state): State<AppState>,
    Path((playlist_id, video_id)): Path<(String, String)>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Response> {
    let playlist = parse_id(&playlist_id, "playlist")?;
    let video = parse_id(&video_id, "video")?;
    let caller = claims.sub;
    let view = run_blocking(&state, move |db| remove_video(db, caller, playlist, video)).await?;
    Ok(respond(StatusCode::OK, view, "Video removed from playlist successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{user, video};
    use crate::videos::toggle_publish;

    fn request(name: &str, description: &str) -> CreatePlaylistRequest {
        CreatePlaylistRequest {
            name: Some(name.into()),
            description: Some(description.into()),
        }
    }

    fn ids(view: &PlaylistView) -> Vec<Uuid> {
        view.videos.iter().map(|v| v.id).collect()
    }

    #[test]
    fn duplicate_video_is_refused_without_reordering() {
        let db = Database::open_in_memory().unwrap();
        let owner = user(&db, "owner");
        let a = video(&db, owner, "a");
        let b = video(&db, owner, "b");
        let list = create_playlist(&db, owner, &request("mix", "songs")).unwrap();
        assert_eq!(list.owner.username, "owner");

        add_video(&db, owner, list.id, a).unwrap();
        let after = add_video(&db, owner, list.id, b).unwrap();
        assert_eq!(ids(&after), vec![a, b]);

        let err = add_video(&db, owner, list.id, a).unwrap_err();
        assert!(matches!(err, ApiError::InvalidOperation(msg) if msg == "Video already exists in the playlist"));
        assert_eq!(ids(&get_playlist(&db, list.id).unwrap()), vec![a, b]);
    }

    #[test]
    fn removing_absent_video_is_a_no_op() {
        let db = Database::open_in_memory().unwrap();
        let owner = user(&db, "owner");
        let a = video(&db, owner, "a");
        let list = create_playlist(&db, owner, &request("mix", "songs")).unwrap();
        add_video(&db, owner, list.id, a).unwrap();

        let unchanged = remove_video(&db, owner, list.id, Uuid::new_v4()).unwrap();
        assert_eq!(ids(&unchanged), vec![a]);
        let emptied = remove_video(&db, owner, list.id, a).unwrap();
        assert!(emptied.videos.is_empty());
    }

    #[test]
    fn membership_changes_require_playlist_owner() {
        let db = Database::open_in_memory().unwrap();
        let owner = user(&db, "owner");
        let other = user(&db, "other");
        let theirs = video(&db, other, "theirs");
        let list = create_playlist(&db, owner, &request("mix", "songs")).unwrap();

        // Owning the video does not grant access to the playlist.
        assert!(matches!(add_video(&db, other, list.id, theirs), Err(ApiError::Forbidden(_))));
        // Anyone's video may go into your own playlist.
        assert_eq!(ids(&add_video(&db, owner, list.id, theirs).unwrap()), vec![theirs]);
        assert!(matches!(
            add_video(&db, owner, list.id, Uuid::new_v4()),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            add_video(&db, owner, Uuid::new_v4(), theirs),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn drafts_stay_out_of_public_playlist_views() {
        let db = Database::open_in_memory().unwrap();
        let owner = user(&db, "owner");
        let other = user(&db, "other");
        let own_draft = video(&db, owner, "own draft");
        let their_draft = video(&db, other, "their draft");
        toggle_publish(&db, owner, own_draft).unwrap();
        toggle_publish(&db, other, their_draft).unwrap();
        let list = create_playlist(&db, owner, &request("mix", "songs")).unwrap();

        assert!(matches!(
            add_video(&db, owner, list.id, their_draft),
            Err(ApiError::NotFound(_))
        ));
        let added = add_video(&db, owner, list.id, own_draft).unwrap();
        assert_eq!(ids(&added), vec![own_draft]);

        assert!(get_playlist(&db, list.id).unwrap().videos.is_empty());
        assert!(user_playlists(&db, owner).unwrap()[0].videos.is_empty());
    }

    #[test]
    fn create_requires_name_and_description() {
        let db = Database::open_in_memory().unwrap();
        let owner = user(&db, "owner");
        let missing = CreatePlaylistRequest {
            name: Some("mix".into()),
            description: None,
        };
        assert!(matches!(create_playlist(&db, owner, &missing), Err(ApiError::InvalidInput(_))));
        assert!(matches!(
            create_playlist(&db, owner, &request(" ", "x")),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn update_patches_and_delete_removes() {
        let db = Database::open_in_memory().unwrap();
        let owner = user(&db, "owner");
        let other = user(&db, "other");
        let list = create_playlist(&db, owner, &request("mix", "songs")).unwrap();

        let patch = UpdatePlaylistRequest {
            name: Some("renamed".into()),
            description: Some("".into()),
        };
        assert!(matches!(update_playlist(&db, other, list.id, &patch), Err(ApiError::Forbidden(_))));
        let updated = update_playlist(&db, owner, list.id, &patch).unwrap();
        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.description, "songs");

        assert_eq!(user_playlists(&db, owner).unwrap().len(), 1);
        assert!(matches!(delete_playlist(&db, other, list.id), Err(ApiError::Forbidden(_))));
        delete_playlist(&db, owner, list.id).unwrap();
        assert!(matches!(get_playlist(&db, list.id), Err(ApiError::NotFound(_))));
        assert!(user_playlists(&db, owner).unwrap().is_empty());
    }
}
