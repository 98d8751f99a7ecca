//! Data model shared by every `sge` crate, and the heuristic extraction of
//! [`TitleMetadata`](models::TitleMetadata) from Steam store payloads.
//!
//! Store payloads are loosely typed: any field may be missing, and some are
//! present with the wrong shape. Extraction never fails as a whole; fields
//! that cannot be interpreted are dropped and reported as
//! [`MalformedField`]s so the rest of the metadata survives.

mod consts;
mod details;
pub mod error;
pub mod models;

pub use crate::details::{Extraction, MalformedField, extract_details, parse_languages};
