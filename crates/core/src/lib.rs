//! Shared single-table data-access layer.
//!
//! Entities of several kinds live in one key-value table, disambiguated by
//! composite `PK`/`SK` keys and a `Type` discriminator. This crate holds the
//! backend-agnostic parts: the item model and its validators, key
//! construction, per-entity codecs, conditional-write helpers, the generic
//! repository, the pagination cursor codec, an in-memory store twin, and the
//! guarded job-submission flow built on top of them.

pub mod entities;
pub mod item;
pub mod jobs;
pub mod keys;
pub mod storage;
