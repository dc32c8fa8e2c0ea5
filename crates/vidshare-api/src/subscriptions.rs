use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use tracing::info;
use uuid::Uuid;

use vidshare_db::Database;
use vidshare_db::edges::{self, SubscriptionEdge, Toggle};
use vidshare_db::queries::{subscriptions as store, users};
use vidshare_types::api::Claims;
use vidshare_types::models::{OwnerProfile, Subscription};

use crate::error::{ApiError, ApiResult, respond};
use crate::guard::parse_id;
use crate::{AppState, run_blocking};

pub fn toggle_subscription(db: &Database, caller: Uuid, channel: Uuid) -> ApiResult<Toggle> {
    if caller == channel {
        return Err(ApiError::InvalidOperation(
            "You cannot subscribe to your own channel".into(),
        ));
    }

    let outcome = db.with_tx(|tx| {
        if !users::user_exists(tx, channel)? {
            return Err(ApiError::NotFound("Channel not found".into()));
        }
        let edge = SubscriptionEdge {
            subscriber: caller,
            channel,
        };
        Ok(edges::toggle(tx, &edge)?)
    })?;

    info!("User {} {:?} subscription to {}", caller, outcome, channel);
    Ok(outcome)
}

pub fn channel_subscribers(
    db: &Database,
    channel: Uuid,
) -> ApiResult<Vec<Subscription<OwnerProfile, Uuid>>> {
    Ok(db.with_conn(|conn| store::channel_subscribers(conn, channel))?)
}

pub fn subscribed_channels(
    db: &Database,
    subscriber: Uuid,
) -> ApiResult<Vec<Subscription<Uuid, OwnerProfile>>> {
    Ok(db.with_conn(|conn| store::subscribed_channels(conn, subscriber))?)
}

/// POST /subscriptions/c/{channel_id}
pub async fn toggle(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Response> {
    let channel = parse_id(&channel_id, "channel")?;
    let caller = claims.sub;
    let outcome = run_blocking(&state, move |db| toggle_subscription(db, caller, channel)).await?;
    let message = match outcome {
        Toggle::Added => "Subscribed successfully",
        Toggle::Removed => "Unsubscribed successfully",
    };
    Ok(respond(StatusCode::OK, serde_json::Value::Null, message))
}

/// GET /subscriptions/c/{channel_id}
pub async fn get_channel_subscribers(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> ApiResult<Response> {
    let channel = parse_id(&channel_id, "channel")?;
    let subscribers = run_blocking(&state, move |db| channel_subscribers(db, channel)).await?;
    Ok(respond(StatusCode::OK, subscribers, "Subscribers fetched successfully"))
}

/// GET /subscriptions/u/{subscriber_id}
pub async fn get_subscribed_channels(
    State(state): State<AppState>,
    Path(subscriber_id): Path<String>,
) -> ApiResult<Response> {
    let subscriber = parse_id(&subscriber_id, "subscriber")?;
    let channels = run_blocking(&state, move |db| subscribed_channels(db, subscriber)).await?;
    Ok(respond(StatusCode::OK, channels, "Subscribed channels fetched successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::user;

    #[test]
    fn self_subscription_is_refused_and_stores_nothing() {
        let db = Database::open_in_memory().unwrap();
        let me = user(&db, "me");
        let err = toggle_subscription(&db, me, me).unwrap_err();
        assert!(matches!(err, ApiError::InvalidOperation(_)));
        assert!(channel_subscribers(&db, me).unwrap().is_empty());
    }

    #[test]
    fn toggling_twice_restores_state() {
        let db = Database::open_in_memory().unwrap();
        let fan = user(&db, "fan");
        let creator = user(&db, "creator");

        assert_eq!(toggle_subscription(&db, fan, creator).unwrap(), Toggle::Added);
        let subs = channel_subscribers(&db, creator).unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].subscriber.username, "fan");

        let channels = subscribed_channels(&db, fan).unwrap();
        assert_eq!(channels[0].channel.username, "creator");

        assert_eq!(toggle_subscription(&db, fan, creator).unwrap(), Toggle::Removed);
        assert!(channel_subscribers(&db, creator).unwrap().is_empty());
    }

    #[test]
    fn unknown_channel_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let fan = user(&db, "fan");
        let result = toggle_subscription(&db, fan, Uuid::new_v4());
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
