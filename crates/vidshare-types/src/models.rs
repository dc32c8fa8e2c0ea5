use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public subset of a user profile attached to content.
/// Never carries credentials or any other private field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerProfile {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar: String,
}

/// `O` is the owner representation: a bare id as stored, or an
/// [`OwnerProfile`] once joined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video<O = Uuid> {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Seconds.
    pub duration: f64,
    pub video_file: String,
    pub thumbnail: String,
    pub views: i64,
    pub is_published: bool,
    pub owner: O,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<O> Video<O> {
    pub fn with_owner<P>(self, owner: P) -> Video<P> {
        Video {
            id: self.id,
            title: self.title,
            description: self.description,
            duration: self.duration,
            video_file: self.video_file,
            thumbnail: self.thumbnail,
            views: self.views,
            is_published: self.is_published,
            owner,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment<O = Uuid> {
    pub id: Uuid,
    pub content: String,
    pub video: Uuid,
    pub owner: O,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<O> Comment<O> {
    pub fn with_owner<P>(self, owner: P) -> Comment<P> {
        Comment {
            id: self.id,
            content: self.content,
            video: self.video,
            owner,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tweet<O = Uuid> {
    pub id: Uuid,
    pub content: String,
    pub owner: O,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<O> Tweet<O> {
    pub fn with_owner<P>(self, owner: P) -> Tweet<P> {
        Tweet {
            id: self.id,
            content: self.content,
            owner,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// The single entity a like points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "targetId", rename_all = "lowercase")]
pub enum LikeTarget {
    Video(Uuid),
    Comment(Uuid),
    Tweet(Uuid),
}

impl LikeTarget {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Video(id) | Self::Comment(id) | Self::Tweet(id) => *id,
        }
    }

    /// Human label, also used in response messages ("Video liked").
    pub fn label(&self) -> &'static str {
        match self {
            Self::Video(_) => "Video",
            Self::Comment(_) => "Comment",
            Self::Tweet(_) => "Tweet",
        }
    }
}

/// `S` and `C` are the subscriber and channel representations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription<S = Uuid, C = Uuid> {
    pub id: Uuid,
    pub subscriber: S,
    pub channel: C,
    pub created_at: DateTime<Utc>,
}

/// Videos keep their playlist order; a video id appears at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist<O = Uuid, V = Uuid> {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub owner: O,
    pub videos: Vec<V>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Playlist with owner projection and full video records.
pub type PlaylistView = Playlist<OwnerProfile, Video>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub total_videos: u64,
    pub total_subscribers: u64,
    pub total_video_likes: u64,
    pub total_views: u64,
}
