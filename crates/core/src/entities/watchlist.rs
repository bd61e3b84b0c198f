//! Tickers a user follows without holding them.

use serde::{Deserialize, Serialize};

use crate::item::{validate_string_field, Item, StringRules, ATTR_GSI1_PK, ATTR_GSI1_SK};
use crate::keys::{watchlist_gsi1_sk, watchlist_key, TableKey};
use crate::storage::{
    AttributeQuery, AttributeUpdates, EntityMapper, Page, PageRequest, Repository, Result,
    SortKeyCondition, Timestamped,
};

use super::OwnedKey;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Watchlist {
    pub user_id: String,
    pub ticker_id: String,
    pub exchange_id: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchlistPatch {
    pub exchange_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WatchlistMapper;

impl EntityMapper for WatchlistMapper {
    type Entity = Watchlist;
    type Key = OwnedKey;
    type Patch = WatchlistPatch;

    const ENTITY_TYPE: &'static str = "Watchlist";

    fn build_keys(&self, key: &OwnedKey) -> TableKey {
        watchlist_key(&key.user_id, &key.id)
    }

    fn key_of(&self, watchlist: &Watchlist) -> OwnedKey {
        OwnedKey::new(&watchlist.user_id, &watchlist.ticker_id)
    }

    fn to_item(&self, watchlist: &Watchlist) -> Item {
        Item::keyed(
            &watchlist_key(&watchlist.user_id, &watchlist.ticker_id),
            Self::ENTITY_TYPE,
        )
        .with(ATTR_GSI1_PK, watchlist.user_id.as_str())
        .with(ATTR_GSI1_SK, watchlist_gsi1_sk(&watchlist.ticker_id))
        .with("UserID", watchlist.user_id.as_str())
        .with("TickerID", watchlist.ticker_id.as_str())
        .with("ExchangeID", watchlist.exchange_id.as_str())
    }

    fn to_entity(&self, item: &Item) -> Result<Watchlist> {
        let rules = StringRules::default();
        Ok(Watchlist {
            user_id: validate_string_field(item.get("UserID"), "UserID", &rules)?,
            ticker_id: validate_string_field(item.get("TickerID"), "TickerID", &rules)?,
            exchange_id: validate_string_field(item.get("ExchangeID"), "ExchangeID", &rules)?,
        })
    }

    fn patch_attributes(&self, patch: &WatchlistPatch) -> AttributeUpdates {
        let mut set = AttributeUpdates::new();
        if let Some(exchange_id) = &patch.exchange_id {
            set.insert("ExchangeID".to_string(), exchange_id.as_str().into());
        }
        set
    }
}

pub type WatchlistRepository = Repository<WatchlistMapper>;

impl Repository<WatchlistMapper> {
    pub async fn list_by_user(
        &self,
        user_id: &str,
        page: &PageRequest,
    ) -> Result<Page<Timestamped<Watchlist>>> {
        let query = AttributeQuery::gsi1(user_id)
            .with_sort(SortKeyCondition::BeginsWith(watchlist_gsi1_sk("")));
        self.query_by_attribute(&query, page).await
    }
}
