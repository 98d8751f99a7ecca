use super::resolve::resolve_title;
use crate::error::{ErrorKind, Result};
use crate::{Context, ExportRequest};
use async_stream::stream;
use exn::ResultExt;
use futures::stream::FuturesUnordered;
use futures::{Stream, StreamExt};
use sge_cache::Origin;
use sge_export::ExportRow;
use sge_extract::models::{Availability, OwnedTitle, TitleId};
use sge_steam::error::ErrorKind as SteamErrorKind;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tracing::{debug, info, warn};

/// How an export is going to be served, known once the owned-games list has
/// been matched against the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    pub titles: usize,
    /// Titles with a fresh cache entry.
    pub cached: usize,
    /// Titles that need a store request.
    pub to_fetch: usize,
    /// Lower bound on the time the store requests will take at the rate
    /// limiter's pace.
    pub estimate: Duration,
}

/// One title's row, as soon as it is known.
#[derive(Debug, Clone)]
pub struct TitleOutcome {
    /// Position of the title in the owned-games list.
    pub index: usize,
    pub title_id: TitleId,
    pub row: ExportRow,
    /// `None` when metadata was not requested.
    pub availability: Option<Availability>,
    pub origin: Option<Origin>,
}

/// Progress events emitted by [`aggregate_stream`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started): exactly once.
/// 2. [`Planned`](Self::Planned): exactly once, after the owned-games list
///    and the cache have been read.
/// 3. [`Resolved`](Self::Resolved): once per owned title, in completion
///    order (see [`TitleOutcome::index`]).
/// 4. [`Complete`](Self::Complete): exactly once.
///
/// A job-level error terminates the stream early, in which case
/// [`Complete`](Self::Complete) is never emitted.
#[derive(Debug, Clone)]
pub enum AggregateEvent {
    Started,
    Planned(Plan),
    Resolved(Box<TitleOutcome>),
    Complete,
}

/// Streams [`AggregateEvent`]s while building one row per owned title.
///
/// Titles without a fresh cache entry are resolved concurrently, up to the
/// context's worker count at a time; more are promoted as resolutions
/// complete, in list order. Dropping the stream stops further store requests.
/// Entries already written to the cache are kept.
pub fn aggregate_stream<'a>(ctx: &'a Context, request: &'a ExportRequest) -> impl Stream<Item = Result<AggregateEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        yield Ok(AggregateEvent::Started);

        let titles = match ctx.owned.owned_titles(request.account).await {
            Ok(titles) => titles,
            Err(error) => {
                let kind = match &*error {
                    SteamErrorKind::AccountPrivate => ErrorKind::AccountPrivate,
                    _ => ErrorKind::UpstreamUnavailable,
                };
                yield Err(error).or_raise(|| kind);
                return;
            },
        };

        if !request.include_metadata {
            yield Ok(AggregateEvent::Planned(Plan {
                titles: titles.len(),
                cached: 0,
                to_fetch: 0,
                estimate: Duration::ZERO,
            }));
            for (index, owned) in titles.iter().enumerate() {
                yield Ok(AggregateEvent::Resolved(Box::new(TitleOutcome {
                    index,
                    title_id: owned.title_id,
                    row: ExportRow::merge(owned, None),
                    availability: None,
                    origin: None,
                })));
            }
            yield Ok(AggregateEvent::Complete);
            return;
        }

        let title_ids: Vec<_> = titles.iter().map(|owned| owned.title_id).collect();
        let fresh = match ctx.cache.fresh_entries(&title_ids).await {
            Ok(fresh) => fresh,
            Err(error) => {
                warn!(?error, "could not read the cache in bulk; resolving titles one by one");
                HashMap::new()
            },
        };
        let (cached, pending): (Vec<_>, Vec<_>) =
            titles.iter().enumerate().partition(|(_, owned)| fresh.contains_key(&owned.title_id));
        let plan = Plan {
            titles: titles.len(),
            cached: cached.len(),
            to_fetch: pending.len(),
            estimate: ctx.interval.saturating_mul(u32::try_from(pending.len()).unwrap_or(u32::MAX)),
        };
        info!(titles = plan.titles, cached = plan.cached, to_fetch = plan.to_fetch, estimate = ?plan.estimate, "planned export");
        yield Ok(AggregateEvent::Planned(plan));

        for (index, owned) in cached {
            let metadata = fresh.get(&owned.title_id);
            yield Ok(AggregateEvent::Resolved(Box::new(TitleOutcome {
                index,
                title_id: owned.title_id,
                row: ExportRow::merge(owned, metadata),
                availability: metadata.map(|m| m.availability),
                origin: Some(Origin::Cache),
            })));
        }

        let mut queue: VecDeque<_> = pending.into_iter().map(|(index, owned)| resolve_owned(ctx, index, owned)).collect();
        let mut processing = FuturesUnordered::new();
        processing.extend(queue.drain(..ctx.workers.min(queue.len())));
        while let Some(outcome) = processing.next().await {
            yield Ok(AggregateEvent::Resolved(Box::new(outcome)));
            // Pop-n-push, but FIFO instead of LIFO.
            if let Some(next) = queue.pop_front() {
                processing.push(next);
            }
        }

        info!(titles = plan.titles, "export aggregated");
        yield Ok(AggregateEvent::Complete);
    })
}

async fn resolve_owned(ctx: &Context, index: usize, owned: &OwnedTitle) -> TitleOutcome {
    let resolved = resolve_title(ctx, owned.title_id).await;
    debug!(title_id = %owned.title_id, origin = ?resolved.origin, availability = %resolved.metadata.availability, "resolved title");
    TitleOutcome {
        index,
        title_id: owned.title_id,
        row: ExportRow::merge(owned, Some(&resolved.metadata)),
        availability: Some(resolved.metadata.availability),
        origin: Some(resolved.origin),
    }
}

/// Run [`aggregate_stream`] to completion and return the rows in owned-games
/// order.
pub async fn aggregate(ctx: &Context, request: &ExportRequest) -> Result<Vec<ExportRow>> {
    let mut rows: Vec<Option<ExportRow>> = Vec::new();
    let events = aggregate_stream(ctx, request);
    futures::pin_mut!(events);
    while let Some(event) = events.next().await {
        match event? {
            AggregateEvent::Planned(plan) => rows.resize(plan.titles, None),
            AggregateEvent::Resolved(outcome) => {
                if let Some(slot) = rows.get_mut(outcome.index) {
                    *slot = Some(outcome.row);
                }
            },
            AggregateEvent::Started | AggregateEvent::Complete => {},
        }
    }
    Ok(rows.into_iter().flatten().collect())
}
