//! Key construction for the single table.
//!
//! Pure functions for generating partition, sort and secondary-index keys.
//! Each entity type owns a distinct prefix (or a distinct fixed sort key), so
//! keys of different types never collide.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Key prefixes
// ============================================================================

pub const JOB_PREFIX: &str = "JOB#";
pub const USER_PREFIX: &str = "USER#";
pub const EMAIL_PREFIX: &str = "EMAIL#";
pub const GOOGLE_PREFIX: &str = "GOOGLE#";
pub const HOLDING_PREFIX: &str = "HOLDING#";
pub const WATCHLIST_PREFIX: &str = "WATCHLIST#";
pub const ALERT_PREFIX: &str = "ALERT#";

/// Fixed sort key of a user's profile item.
pub const USER_PROFILE_SK: &str = "PROFILE";

// ============================================================================
// Primary key
// ============================================================================

/// The `(PK, SK)` pair identifying one item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableKey {
    pub pk: String,
    pub sk: String,
}

impl TableKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.pk, self.sk)
    }
}

// ============================================================================
// Job keys
// ============================================================================

/// Pattern: `JOB#<job_id>` for both PK and SK.
pub fn job_key(job_id: Uuid) -> TableKey {
    let id = format!("{JOB_PREFIX}{job_id}");
    TableKey::new(id.clone(), id)
}

// ============================================================================
// User keys
// ============================================================================

/// Generate primary key for a User.
///
/// Pattern: `USER#<user_id>`
pub fn user_pk(user_id: Uuid) -> String {
    format!("{USER_PREFIX}{user_id}")
}

/// Pattern: `USER#<user_id>` / `PROFILE`
pub fn user_key(user_id: Uuid) -> TableKey {
    TableKey::new(user_pk(user_id), USER_PROFILE_SK)
}

/// Generate GSI2 partition key for User email lookup.
///
/// Pattern: `EMAIL#<email>`
pub fn user_gsi2_pk(email: &str) -> String {
    format!("{EMAIL_PREFIX}{email}")
}

/// Generate GSI3 partition key for User Google account lookup.
///
/// Pattern: `GOOGLE#<google_id>`
pub fn user_gsi3_pk(google_id: &str) -> String {
    format!("{GOOGLE_PREFIX}{google_id}")
}

// ============================================================================
// Stock-tracker keys (all partitioned by owner)
// ============================================================================

/// Partition shared by every item a user owns.
///
/// Pattern: `USER#<user_id>`
pub fn owner_pk(user_id: &str) -> String {
    format!("{USER_PREFIX}{user_id}")
}

/// Pattern: `USER#<user_id>` / `HOLDING#<ticker_id>`
pub fn holding_key(user_id: &str, ticker_id: &str) -> TableKey {
    TableKey::new(owner_pk(user_id), format!("{HOLDING_PREFIX}{ticker_id}"))
}

/// Pattern: `Holding#<ticker_id>`
pub fn holding_gsi1_sk(ticker_id: &str) -> String {
    format!("Holding#{ticker_id}")
}

/// Pattern: `USER#<user_id>` / `WATCHLIST#<ticker_id>`
pub fn watchlist_key(user_id: &str, ticker_id: &str) -> TableKey {
    TableKey::new(owner_pk(user_id), format!("{WATCHLIST_PREFIX}{ticker_id}"))
}

/// Pattern: `Watchlist#<ticker_id>`
pub fn watchlist_gsi1_sk(ticker_id: &str) -> String {
    format!("Watchlist#{ticker_id}")
}

/// Pattern: `USER#<user_id>` / `ALERT#<alert_id>`
pub fn alert_key(user_id: &str, alert_id: &str) -> TableKey {
    TableKey::new(owner_pk(user_id), format!("{ALERT_PREFIX}{alert_id}"))
}

/// Pattern: `Alert#<alert_id>`
pub fn alert_gsi1_sk(alert_id: &str) -> String {
    format!("Alert#{alert_id}")
}

/// Partition grouping alerts that are evaluated at the same frequency.
///
/// Pattern: `ALERT#<frequency>`
pub fn alert_gsi2_pk(frequency: &str) -> String {
    format!("{ALERT_PREFIX}{frequency}")
}

/// Pattern: `<user_id>#<alert_id>`
pub fn alert_gsi2_sk(user_id: &str, alert_id: &str) -> String {
    format!("{user_id}#{alert_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_key_repeats_id() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let key = job_key(id);
        assert_eq!(key.pk, "JOB#550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(key.sk, key.pk);
    }

    #[test]
    fn test_user_key() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let key = user_key(id);
        assert_eq!(key.pk, "USER#550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(key.sk, "PROFILE");
    }

    #[test]
    fn test_user_secondary_keys() {
        assert_eq!(user_gsi2_pk("a@b.com"), "EMAIL#a@b.com");
        assert_eq!(user_gsi3_pk("1234"), "GOOGLE#1234");
    }

    #[test]
    fn test_holding_key() {
        let key = holding_key("u1", "AAPL");
        assert_eq!(key, TableKey::new("USER#u1", "HOLDING#AAPL"));
        assert_eq!(holding_gsi1_sk("AAPL"), "Holding#AAPL");
    }

    #[test]
    fn test_owned_items_share_partition_but_not_sort_key() {
        let holding = holding_key("u1", "AAPL");
        let watchlist = watchlist_key("u1", "AAPL");
        let alert = alert_key("u1", "AAPL");

        assert_eq!(holding.pk, watchlist.pk);
        assert_eq!(holding.pk, alert.pk);
        assert_ne!(holding.sk, watchlist.sk);
        assert_ne!(holding.sk, alert.sk);
        assert_ne!(watchlist.sk, alert.sk);
    }

    #[test]
    fn test_alert_gsi2_keys() {
        assert_eq!(alert_gsi2_pk("HOURLY_LEVEL"), "ALERT#HOURLY_LEVEL");
        assert_eq!(alert_gsi2_sk("u1", "a1"), "u1#a1");
    }

    #[test]
    fn test_table_key_display() {
        assert_eq!(TableKey::new("USER#u1", "PROFILE").to_string(), "USER#u1/PROFILE");
    }
}
