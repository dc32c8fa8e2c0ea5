//! Ownership rule for every update and delete: only the creator of an
//! entity may mutate it. Existence is always settled first, so a missing
//! entity reports 404 regardless of who asks.

use tracing::warn;
use uuid::Uuid;

use vidshare_types::models::{Comment, Playlist, Tweet, Video};

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

pub fn authorize(caller: Uuid, owner: Uuid) -> Access {
    if caller == owner {
        Access::Allow
    } else {
        Access::Deny
    }
}

/// Entities carrying a single owning user.
pub trait Owned {
    const KIND: &'static str;

    fn owner_id(&self) -> Uuid;
}

impl Owned for Video {
    const KIND: &'static str = "Video";

    fn owner_id(&self) -> Uuid {
        self.owner
    }
}

impl Owned for Comment {
    const KIND: &'static str = "Comment";

    fn owner_id(&self) -> Uuid {
        self.owner
    }
}

impl Owned for Tweet {
    const KIND: &'static str = "Tweet";

    fn owner_id(&self) -> Uuid {
        self.owner
    }
}

impl Owned for Playlist {
    const KIND: &'static str = "Playlist";

    fn owner_id(&self) -> Uuid {
        self.owner
    }
}

/// Resolve a lookup into the entity the caller may mutate: `NotFound` when
/// absent, `Forbidden` when owned by someone else.
pub fn owned_by<T: Owned>(caller: Uuid, entity: Option<T>, action: &str) -> ApiResult<T> {
    let entity = entity.ok_or_else(|| ApiError::NotFound(format!("{} not found", T::KIND)))?;

    match authorize(caller, entity.owner_id()) {
        Access::Allow => Ok(entity),
        Access::Deny => {
            warn!(
                "User {} denied {} on {} owned by {}",
                caller,
                action,
                T::KIND,
                entity.owner_id()
            );
            Err(ApiError::Forbidden(format!(
                "You are not allowed to {} this {}",
                action,
                T::KIND.to_lowercase()
            )))
        }
    }
}

/// Parse a path id, reporting which kind of id was malformed.
pub fn parse_id(raw: &str, kind: &str) -> ApiResult<Uuid> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::InvalidInput(format!("Invalid {} ID", kind)))
}

/// Trimmed, non-empty text or `None`.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn tweet(owner: Uuid) -> Tweet {
        Tweet {
            id: Uuid::new_v4(),
            content: "hi".into(),
            owner,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn owner_is_allowed() {
        let me = Uuid::new_v4();
        assert_eq!(authorize(me, me), Access::Allow);
        assert!(owned_by(me, Some(tweet(me)), "update").is_ok());
    }

    #[test]
    fn stranger_is_forbidden() {
        let me = Uuid::new_v4();
        let err = owned_by(me, Some(tweet(Uuid::new_v4())), "delete").unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(msg) if msg == "You are not allowed to delete this tweet"));
    }

    #[test]
    fn missing_beats_forbidden() {
        let err = owned_by::<Tweet>(Uuid::new_v4(), None, "update").unwrap_err();
        assert!(matches!(err, ApiError::NotFound(msg) if msg == "Tweet not found"));
    }

    #[test]
    fn malformed_ids_are_invalid_input() {
        assert!(matches!(parse_id("not-a-uuid", "video"), Err(ApiError::InvalidInput(msg)) if msg == "Invalid video ID"));
        assert!(parse_id(&Uuid::new_v4().to_string(), "video").is_ok());
    }

    #[test]
    fn blank_text_is_absent() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" x ")), Some("x"));
        assert_eq!(non_blank(None), None);
    }
}
