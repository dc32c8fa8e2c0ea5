pub mod assets;
pub mod auth;
pub mod comments;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod guard;
pub mod likes;
pub mod middleware;
pub mod playlists;
pub mod routes;
pub mod subscriptions;
pub mod tweets;
pub mod videos;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use tracing::error;

use vidshare_db::Database;

use crate::assets::AssetStore;
use crate::error::{ApiError, ApiResult};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub assets: AssetStore,
}

/// Run a core operation off the async runtime. Every store access is
/// synchronous SQLite work.
pub(crate) async fn run_blocking<F, T>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&Database) -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Store(anyhow::anyhow!("blocking task failed: {}", e))
        })?
}
