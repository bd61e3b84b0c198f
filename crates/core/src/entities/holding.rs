//! Stock holdings owned by a user.

use serde::{Deserialize, Serialize};

use crate::item::{
    validate_number_field, validate_string_field, Item, NumberRules, StringRules, ATTR_GSI1_PK,
    ATTR_GSI1_SK,
};
use crate::keys::{holding_gsi1_sk, holding_key, TableKey};
use crate::storage::{
    AttributeQuery, AttributeUpdates, EntityMapper, Page, PageRequest, Repository,
    RepositoryError, Result, SortKeyCondition, Timestamped,
};

use super::OwnedKey;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub user_id: String,
    pub ticker_id: String,
    pub exchange_id: String,
    pub quantity: f64,
    pub average_price: f64,
    pub currency: String,
}

/// Request body for creating a holding; the owner comes from the route.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHolding {
    pub ticker_id: String,
    pub exchange_id: String,
    pub quantity: f64,
    pub average_price: f64,
    pub currency: String,
}

impl NewHolding {
    pub fn into_holding(self, user_id: impl Into<String>) -> Holding {
        Holding {
            user_id: user_id.into(),
            ticker_id: self.ticker_id,
            exchange_id: self.exchange_id,
            quantity: self.quantity,
            average_price: self.average_price,
            currency: self.currency,
        }
    }
}

impl Holding {
    /// Checks the fields a request can get wrong before the holding is stored.
    pub fn validate(&self) -> Result<()> {
        let text = [
            ("userId", &self.user_id),
            ("tickerId", &self.ticker_id),
            ("exchangeId", &self.exchange_id),
            ("currency", &self.currency),
        ];
        if let Some((field, _)) = text.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(RepositoryError::InvalidEntityData(format!(
                "field \"{field}\" must not be empty"
            )));
        }

        for (field, value) in [("quantity", self.quantity), ("averagePrice", self.average_price)] {
            if !value.is_finite() || value < 0.0 {
                return Err(RepositoryError::InvalidEntityData(format!(
                    "field \"{field}\" must be a non-negative number"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoldingPatch {
    pub quantity: Option<f64>,
    pub average_price: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HoldingMapper;

impl EntityMapper for HoldingMapper {
    type Entity = Holding;
    type Key = OwnedKey;
    type Patch = HoldingPatch;

    const ENTITY_TYPE: &'static str = "Holding";

    fn build_keys(&self, key: &OwnedKey) -> TableKey {
        holding_key(&key.user_id, &key.id)
    }

    fn key_of(&self, holding: &Holding) -> OwnedKey {
        OwnedKey::new(&holding.user_id, &holding.ticker_id)
    }

    fn to_item(&self, holding: &Holding) -> Item {
        Item::keyed(
            &holding_key(&holding.user_id, &holding.ticker_id),
            Self::ENTITY_TYPE,
        )
        .with(ATTR_GSI1_PK, holding.user_id.as_str())
        .with(ATTR_GSI1_SK, holding_gsi1_sk(&holding.ticker_id))
        .with("UserID", holding.user_id.as_str())
        .with("TickerID", holding.ticker_id.as_str())
        .with("ExchangeID", holding.exchange_id.as_str())
        .with("Quantity", holding.quantity)
        .with("AveragePrice", holding.average_price)
        .with("Currency", holding.currency.as_str())
    }

    fn to_entity(&self, item: &Item) -> Result<Holding> {
        let text = StringRules::default();
        let number = NumberRules::default();

        Ok(Holding {
            user_id: validate_string_field(item.get("UserID"), "UserID", &text)?,
            ticker_id: validate_string_field(item.get("TickerID"), "TickerID", &text)?,
            exchange_id: validate_string_field(item.get("ExchangeID"), "ExchangeID", &text)?,
            quantity: validate_number_field(item.get("Quantity"), "Quantity", &number)?,
            average_price: validate_number_field(item.get("AveragePrice"), "AveragePrice", &number)?,
            currency: validate_string_field(item.get("Currency"), "Currency", &text)?,
        })
    }

    fn patch_attributes(&self, patch: &HoldingPatch) -> AttributeUpdates {
        let mut set = AttributeUpdates::new();
        if let Some(quantity) = patch.quantity {
            set.insert("Quantity".to_string(), quantity.into());
        }
        if let Some(average_price) = patch.average_price {
            set.insert("AveragePrice".to_string(), average_price.into());
        }
        if let Some(currency) = &patch.currency {
            set.insert("Currency".to_string(), currency.as_str().into());
        }
        set
    }
}

pub type HoldingRepository = Repository<HoldingMapper>;

impl Repository<HoldingMapper> {
    /// A user's holdings in ticker order, via GSI1.
    pub async fn list_by_user(
        &self,
        user_id: &str,
        page: &PageRequest,
    ) -> Result<Page<Timestamped<Holding>>> {
        let query = AttributeQuery::gsi1(user_id)
            .with_sort(SortKeyCondition::BeginsWith(holding_gsi1_sk("")));
        self.query_by_attribute(&query, page).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::entities::{Watchlist, WatchlistMapper};
    use crate::keys::HOLDING_PREFIX;
    use crate::storage::{decode_record, encode_record, InMemoryStore, KeyQuery, RepositoryError};

    fn holding(user_id: &str, ticker: &str) -> Holding {
        Holding {
            user_id: user_id.to_string(),
            ticker_id: ticker.to_string(),
            exchange_id: "NASDAQ".to_string(),
            quantity: 10.0,
            average_price: 150.25,
            currency: "USD".to_string(),
        }
    }

    #[test]
    fn test_holding_item_layout() {
        let item = HoldingMapper.to_item(&holding("u1", "AAPL"));

        assert_eq!(item.pk(), Some("USER#u1"));
        assert_eq!(item.sk(), Some("HOLDING#AAPL"));
        assert_eq!(item.entity_type(), Some("Holding"));
        assert_eq!(item.get_s("GSI1PK"), Some("u1"));
        assert_eq!(item.get_s("GSI1SK"), Some("Holding#AAPL"));
    }

    #[test]
    fn test_holding_validation() {
        assert!(holding("u1", "AAPL").validate().is_ok());

        let blank_ticker = holding("u1", " ");
        match blank_ticker.validate() {
            Err(RepositoryError::InvalidEntityData(message)) => {
                assert_eq!(message, "field \"tickerId\" must not be empty");
            }
            other => panic!("expected InvalidEntityData, got {other:?}"),
        }

        let mut negative = holding("u1", "AAPL");
        negative.quantity = -1.0;
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_holding_record_round_trip() {
        let record = Timestamped::new(holding("u1", "AAPL"), 1_700_000_000_000);
        let item = encode_record(&HoldingMapper, &record);
        assert_eq!(decode_record(&HoldingMapper, &item).unwrap(), record);
    }

    #[test]
    fn test_holding_decode_rejects_nan_quantity() {
        let mut item = encode_record(&HoldingMapper, &Timestamped::new(holding("u1", "AAPL"), 1));
        item.insert("Quantity", f64::NAN);

        match decode_record(&HoldingMapper, &item) {
            Err(RepositoryError::InvalidEntityData(message)) => {
                assert_eq!(message, "field \"Quantity\" must be a finite number (NaN)");
            }
            other => panic!("expected InvalidEntityData, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_by_user_skips_other_users_and_types() {
        let store = Arc::new(InMemoryStore::new("t"));
        let holdings = HoldingRepository::new(store.clone(), HoldingMapper);
        let watchlists = Repository::new(store.clone(), WatchlistMapper);

        holdings.create(holding("u1", "MSFT")).await.unwrap();
        holdings.create(holding("u1", "AAPL")).await.unwrap();
        holdings.create(holding("u2", "GOOG")).await.unwrap();
        watchlists
            .create(Watchlist {
                user_id: "u1".to_string(),
                ticker_id: "TSLA".to_string(),
                exchange_id: "NASDAQ".to_string(),
            })
            .await
            .unwrap();

        let page = holdings
            .list_by_user("u1", &PageRequest::default())
            .await
            .unwrap();
        let tickers: Vec<_> = page.items.iter().map(|h| h.ticker_id.as_str()).collect();
        assert_eq!(tickers, ["AAPL", "MSFT"]);
        assert_eq!(page.count, 2);
    }

    #[tokio::test]
    async fn test_partition_query_by_sort_prefix_matches_index_listing() {
        let store = Arc::new(InMemoryStore::new("t"));
        let holdings = HoldingRepository::new(store, HoldingMapper);
        for ticker in ["B", "A", "C"] {
            holdings.create(holding("u1", ticker)).await.unwrap();
        }

        let query = KeyQuery::partition("USER#u1")
            .with_sort(SortKeyCondition::BeginsWith(HOLDING_PREFIX.to_string()));
        let by_partition = holdings.query(&query, &PageRequest::default()).await.unwrap();
        let by_index = holdings
            .list_by_user("u1", &PageRequest::default())
            .await
            .unwrap();

        assert_eq!(by_partition.items, by_index.items);
    }

    #[tokio::test]
    async fn test_holding_update_and_missing_key() {
        let store = Arc::new(InMemoryStore::new("t"));
        let holdings = HoldingRepository::new(store, HoldingMapper);
        holdings.create(holding("u1", "AAPL")).await.unwrap();

        let patch = HoldingPatch {
            quantity: Some(12.0),
            ..HoldingPatch::default()
        };
        let updated = holdings
            .update(&OwnedKey::new("u1", "AAPL"), &patch)
            .await
            .unwrap();
        assert_eq!(updated.quantity, 12.0);
        assert_eq!(updated.average_price, 150.25);

        let missing = holdings.update(&OwnedKey::new("u1", "NOPE"), &patch).await;
        assert!(matches!(missing, Err(RepositoryError::NotFound { .. })));
    }
}
