use crate::Context;
use sge_cache::Resolved;
use sge_extract::models::{TitleId, TitleMetadata};
use sge_steam::StoreMetadata;
use sge_steam::error::ErrorKind as SteamErrorKind;
use std::sync::Arc;
use time::UtcDateTime;
use tracing::warn;

/// Ask the store about one title, folding failures into the placeholder that
/// gets cached in its place.
async fn fetch_or_placeholder(store: Arc<dyn StoreMetadata>, title_id: TitleId) -> TitleMetadata {
    match store.title_metadata(title_id).await {
        Ok(metadata) => metadata,
        Err(error) if matches!(&*error, SteamErrorKind::NotAccessible { .. }) => {
            warn!(%title_id, reason = %*error, "title is not accessible");
            TitleMetadata::not_accessible(title_id, UtcDateTime::now())
        },
        Err(error) => {
            warn!(%title_id, reason = %*error, "could not resolve title");
            TitleMetadata::unresolved(title_id, UtcDateTime::now())
        },
    }
}

/// Resolve one title through the coalescing cache.
pub(crate) async fn resolve_title(ctx: &Context, title_id: TitleId) -> Resolved {
    let store = Arc::clone(&ctx.store);
    ctx.cache.resolve(title_id, move || fetch_or_placeholder(store, title_id)).await
}
