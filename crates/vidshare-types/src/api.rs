use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Comment, OwnerProfile, Tweet, Video};

// -- JWT Claims --

/// Bearer token claims issued by the identity boundary. `sub` is the
/// caller id threaded through every core operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Envelope --

/// Every response body, success or failure, has this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(status_code: u16, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code,
            data,
            message: message.into(),
            success: status_code < 400,
        }
    }
}

/// Stand-in for the `{}` payload of delete and like-toggle responses.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Empty {}

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub full_name: String,
    pub password: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

// -- Pagination --

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Case-insensitive title substring.
    pub query: Option<String>,
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VideoPage {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub videos: Vec<Video<OwnerProfile>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentPage {
    pub comments: Vec<Comment<OwnerProfile>>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TweetPage {
    pub tweets: Vec<Tweet<OwnerProfile>>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

// -- Videos --

/// Fields of a video about to be published. Media URLs come from the
/// asset store, never from the client.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub video_file: String,
    pub thumbnail: String,
}

/// Patch semantics: `None` (or a blank string) leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct VideoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
}

// -- Comments & Tweets --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentRequest {
    #[serde(default)]
    pub content: Option<String>,
}

// -- Playlists --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePlaylistRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Patch semantics: absent or blank fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePlaylistRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

// -- Health --

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::LikeTarget;

    #[test]
    fn envelope_success_follows_status() {
        let ok = serde_json::to_value(ApiResponse::new(201, Empty {}, "created")).unwrap();
        assert_eq!(ok, json!({"statusCode": 201, "data": {}, "message": "created", "success": true}));

        let failed = ApiResponse::new(404, (), "missing");
        assert!(!failed.success);
    }

    #[test]
    fn like_target_is_tagged() {
        let id = Uuid::nil();
        let value = serde_json::to_value(LikeTarget::Comment(id)).unwrap();
        assert_eq!(value, json!({"kind": "comment", "targetId": id}));
    }

    #[test]
    fn video_query_uses_camel_case() {
        let q: VideoListQuery =
            serde_json::from_value(json!({"sortBy": "views", "sortType": "asc", "userId": "x"})).unwrap();
        assert_eq!(q.sort_by.as_deref(), Some("views"));
        assert_eq!(q.sort_type.as_deref(), Some("asc"));
        assert_eq!(q.user_id.as_deref(), Some("x"));
    }
}
