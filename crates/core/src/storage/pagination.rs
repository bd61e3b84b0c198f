//! Cursor-based pagination.
//!
//! A cursor is an opaque base64 (URL-safe) encoding of a JSON position. The
//! position type is backend-specific: [`IndexPosition`] for the in-memory
//! store, the raw last-evaluated key for DynamoDB. Decoding never fails; a
//! malformed, tampered or foreign cursor restarts from the beginning.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_PAGE_LIMIT: i64 = 1;
pub const MAX_PAGE_LIMIT: i64 = 100;
pub const DEFAULT_PAGE_LIMIT: usize = 50;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaginationError {
    #[error("limit must be between {MIN_PAGE_LIMIT} and {MAX_PAGE_LIMIT}, got {0}")]
    LimitOutOfRange(i64),
}

/// A validated page size plus an optional continuation cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    limit: usize,
    cursor: Option<String>,
}

impl PageRequest {
    pub fn new(limit: Option<i64>, cursor: Option<String>) -> Result<Self, PaginationError> {
        let limit = match limit {
            None => DEFAULT_PAGE_LIMIT,
            Some(n) if (MIN_PAGE_LIMIT..=MAX_PAGE_LIMIT).contains(&n) => n as usize,
            Some(n) => return Err(PaginationError::LimitOutOfRange(n)),
        };

        Ok(Self {
            limit,
            cursor: cursor.filter(|c| !c.is_empty()),
        })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Decodes the cursor into a backend position, defaulting when absent or invalid.
    pub fn position<P: DeserializeOwned + Default>(&self) -> P {
        self.cursor().map(decode_cursor).unwrap_or_default()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            cursor: None,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        Ok(Page {
            items: self.items.into_iter().map(f).collect::<Result<_, _>>()?,
            count: self.count,
            next_cursor: self.next_cursor,
        })
    }
}

/// Offset into a fully materialized result list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexPosition {
    pub index: usize,
}

pub fn encode_cursor<P: Serialize>(position: &P) -> String {
    URL_SAFE_NO_PAD.encode(serde_json::to_vec(position).unwrap_or_default())
}

pub fn decode_cursor<P: DeserializeOwned + Default>(cursor: &str) -> P {
    URL_SAFE_NO_PAD
        .decode(cursor)
        .or_else(|_| STANDARD.decode(cursor))
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

/// Slices a fully materialized, already ordered result list.
///
/// `count` is the total number of matches, not the page size.
pub fn paginate<T>(items: Vec<T>, request: &PageRequest) -> Page<T> {
    let total = items.len();
    let limit = request.limit();
    let start = request.position::<IndexPosition>().index.min(total);
    let end = start.saturating_add(limit).min(total);

    let next_cursor = (end < total).then(|| encode_cursor(&IndexPosition { index: end }));

    Page {
        items: items.into_iter().skip(start).take(limit).collect(),
        count: total,
        next_cursor,
    }
}
