//! The export pipeline: owned titles in, one merged row per title out.
//!
//! [`aggregate_stream`] does the work and reports progress; [`aggregate`]
//! collects its rows and [`export`] renders them. Everything an export needs
//! from the outside world arrives through a [`Context`] built once per
//! process, and the account arrives through a per-export [`ExportRequest`].

mod aggregate;
mod context;
pub mod error;
mod export;

pub use crate::aggregate::{AggregateEvent, Plan, TitleOutcome, aggregate, aggregate_stream};
pub use crate::context::{Context, ExportRequest, MAX_WORKERS, worker_count};
pub use crate::export::{Exported, export};
