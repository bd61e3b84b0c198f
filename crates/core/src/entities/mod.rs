//! Typed entities and their item codecs.

use std::fmt;

use serde::Deserialize;

mod alert;
mod holding;
mod job;
mod user;
mod watchlist;

pub use alert::{
    Alert, AlertCondition, AlertFrequency, AlertMapper, AlertMode, AlertPatch, AlertRepository,
    ComparisonOperator, LogicalOperator, PushSubscription,
};
pub use holding::{Holding, HoldingMapper, HoldingPatch, HoldingRepository, NewHolding};
pub use job::{
    Job, JobMapper, JobPatch, JobRepository, JobStatus, NewJob, OutputCodec, ATTR_STATUS,
    JOB_TTL_SECONDS, MAX_FILE_SIZE,
};
pub use user::{User, UserMapper, UserPatch, UserRepository};
pub use watchlist::{Watchlist, WatchlistMapper, WatchlistPatch, WatchlistRepository};

/// Identifier of an item living in its owner's partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct OwnedKey {
    pub user_id: String,
    /// Ticker or alert id.
    pub id: String,
}

impl OwnedKey {
    pub fn new(user_id: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for OwnedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user_id, self.id)
    }
}
