//! Request handlers

pub mod achievements;
pub mod admin;
pub mod auth;
pub mod feed;
pub mod health;
pub mod ideas;
pub mod news;
pub mod queries;
pub mod social;
pub mod suggestions;

use ecevision_common::cache::keys;

use crate::AppState;

/// Drop the cached updates feed after any mutation touching its rows
pub(crate) async fn invalidate_updates_feed(state: &AppState) {
    if let Some(ref cache) = state.cache {
        if let Err(e) = cache.delete(&keys::updates_feed()).await {
            tracing::warn!(error = %e, "Failed to invalidate feed cache");
        }
    }
}
