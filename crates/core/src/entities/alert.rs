//! Price alerts, indexed per user and per evaluation frequency.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::item::{
    optional, validate_boolean_field, validate_enum_field, validate_number_field,
    validate_string_field, AttributeEnum, AttributeValue, Item, NumberRules, StringRules,
    ATTR_GSI1_PK, ATTR_GSI1_SK, ATTR_GSI2_PK, ATTR_GSI2_SK,
};
use crate::keys::{alert_gsi1_sk, alert_gsi2_pk, alert_gsi2_sk, alert_key, TableKey};
use crate::storage::{
    AttributeQuery, AttributeUpdates, EntityMapper, Page, PageRequest, Repository,
    RepositoryError, Result, SortKeyCondition, Timestamped,
};

use super::OwnedKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertMode {
    Buy,
    Sell,
}

impl AttributeEnum for AlertMode {
    const VARIANTS: &'static [Self] = &[Self::Buy, Self::Sell];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertFrequency {
    MinuteLevel,
    HourlyLevel,
}

impl AttributeEnum for AlertFrequency {
    const VARIANTS: &'static [Self] = &[Self::MinuteLevel, Self::HourlyLevel];

    fn as_str(&self) -> &'static str {
        match self {
            Self::MinuteLevel => "MINUTE_LEVEL",
            Self::HourlyLevel => "HOURLY_LEVEL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonOperator {
    Gte,
    Lte,
}

impl AttributeEnum for ComparisonOperator {
    const VARIANTS: &'static [Self] = &[Self::Gte, Self::Lte];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Gte => "gte",
            Self::Lte => "lte",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    And,
    Or,
}

impl AttributeEnum for LogicalOperator {
    const VARIANTS: &'static [Self] = &[Self::And, Self::Or];

    fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// One price threshold, e.g. `price gte 200.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertCondition {
    pub field: String,
    pub operator: ComparisonOperator,
    pub value: f64,
}

/// Web-push subscription the alert notifies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    pub endpoint: String,
    pub keys_p256dh: String,
    pub keys_auth: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub alert_id: String,
    pub user_id: String,
    pub ticker_id: String,
    pub exchange_id: String,
    pub mode: AlertMode,
    pub frequency: AlertFrequency,
    pub enabled: bool,
    pub conditions: Vec<AlertCondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_operator: Option<LogicalOperator>,
    pub subscription: PushSubscription,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertPatch {
    pub enabled: Option<bool>,
    pub frequency: Option<AlertFrequency>,
    pub conditions: Option<Vec<AlertCondition>>,
    pub logical_operator: Option<LogicalOperator>,
}

fn encode_condition(condition: &AlertCondition) -> AttributeValue {
    let mut map = HashMap::new();
    map.insert("field".to_string(), AttributeValue::from(condition.field.as_str()));
    map.insert("operator".to_string(), AttributeValue::from(condition.operator.as_str()));
    map.insert("value".to_string(), AttributeValue::from(condition.value));
    AttributeValue::M(map)
}

fn encode_conditions(conditions: &[AlertCondition]) -> AttributeValue {
    AttributeValue::L(conditions.iter().map(encode_condition).collect())
}

fn decode_conditions(value: Option<&AttributeValue>) -> Result<Vec<AlertCondition>> {
    let invalid = || {
        RepositoryError::InvalidEntityData(
            "field \"ConditionList\" must be a non-empty list".to_string(),
        )
    };
    let list = value.and_then(AttributeValue::as_list).ok_or_else(invalid)?;
    if list.is_empty() {
        return Err(invalid());
    }

    list.iter()
        .enumerate()
        .map(|(index, entry)| {
            let AttributeValue::M(map) = entry else {
                return Err(RepositoryError::InvalidEntityData(format!(
                    "field \"ConditionList[{index}]\" must be a map, got {}",
                    entry.type_name()
                )));
            };
            Ok(AlertCondition {
                field: validate_string_field(
                    map.get("field"),
                    &format!("ConditionList[{index}].field"),
                    &StringRules::default(),
                )?,
                operator: validate_enum_field(
                    map.get("operator"),
                    &format!("ConditionList[{index}].operator"),
                )?,
                value: validate_number_field(
                    map.get("value"),
                    &format!("ConditionList[{index}].value"),
                    &NumberRules::default(),
                )?,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlertMapper;

impl EntityMapper for AlertMapper {
    type Entity = Alert;
    type Key = OwnedKey;
    type Patch = AlertPatch;

    const ENTITY_TYPE: &'static str = "Alert";

    fn build_keys(&self, key: &OwnedKey) -> TableKey {
        alert_key(&key.user_id, &key.id)
    }

    fn key_of(&self, alert: &Alert) -> OwnedKey {
        OwnedKey::new(&alert.user_id, &alert.alert_id)
    }

    fn to_item(&self, alert: &Alert) -> Item {
        Item::keyed(&alert_key(&alert.user_id, &alert.alert_id), Self::ENTITY_TYPE)
            .with(ATTR_GSI1_PK, alert.user_id.as_str())
            .with(ATTR_GSI1_SK, alert_gsi1_sk(&alert.alert_id))
            .with(ATTR_GSI2_PK, alert_gsi2_pk(alert.frequency.as_str()))
            .with(ATTR_GSI2_SK, alert_gsi2_sk(&alert.user_id, &alert.alert_id))
            .with("AlertID", alert.alert_id.as_str())
            .with("UserID", alert.user_id.as_str())
            .with("TickerID", alert.ticker_id.as_str())
            .with("ExchangeID", alert.exchange_id.as_str())
            .with("Mode", alert.mode.as_str())
            .with("Frequency", alert.frequency.as_str())
            .with("Enabled", alert.enabled)
            .with("ConditionList", encode_conditions(&alert.conditions))
            .with_opt(
                "LogicalOperator",
                alert.logical_operator.as_ref().map(AttributeEnum::as_str),
            )
            .with("SubscriptionEndpoint", alert.subscription.endpoint.as_str())
            .with("SubscriptionKeysP256dh", alert.subscription.keys_p256dh.as_str())
            .with("SubscriptionKeysAuth", alert.subscription.keys_auth.as_str())
    }

    fn to_entity(&self, item: &Item) -> Result<Alert> {
        let text = StringRules::default();

        Ok(Alert {
            alert_id: validate_string_field(item.get("AlertID"), "AlertID", &text)?,
            user_id: validate_string_field(item.get("UserID"), "UserID", &text)?,
            ticker_id: validate_string_field(item.get("TickerID"), "TickerID", &text)?,
            exchange_id: validate_string_field(item.get("ExchangeID"), "ExchangeID", &text)?,
            mode: validate_enum_field(item.get("Mode"), "Mode")?,
            frequency: validate_enum_field(item.get("Frequency"), "Frequency")?,
            enabled: validate_boolean_field(item.get("Enabled"), "Enabled")?,
            conditions: decode_conditions(item.get("ConditionList"))?,
            logical_operator: optional(item.get("LogicalOperator"), |v| {
                validate_enum_field(v, "LogicalOperator")
            })?,
            subscription: PushSubscription {
                endpoint: validate_string_field(
                    item.get("SubscriptionEndpoint"),
                    "SubscriptionEndpoint",
                    &text,
                )?,
                keys_p256dh: validate_string_field(
                    item.get("SubscriptionKeysP256dh"),
                    "SubscriptionKeysP256dh",
                    &text,
                )?,
                keys_auth: validate_string_field(
                    item.get("SubscriptionKeysAuth"),
                    "SubscriptionKeysAuth",
                    &text,
                )?,
            },
        })
    }

    fn patch_attributes(&self, patch: &AlertPatch) -> AttributeUpdates {
        let mut set = AttributeUpdates::new();
        if let Some(enabled) = patch.enabled {
            set.insert("Enabled".to_string(), enabled.into());
        }
        if let Some(frequency) = patch.frequency {
            set.insert("Frequency".to_string(), frequency.as_str().into());
            set.insert(
                ATTR_GSI2_PK.to_string(),
                alert_gsi2_pk(frequency.as_str()).into(),
            );
        }
        if let Some(conditions) = &patch.conditions {
            set.insert("ConditionList".to_string(), encode_conditions(conditions));
        }
        if let Some(logical_operator) = patch.logical_operator {
            set.insert("LogicalOperator".to_string(), logical_operator.as_str().into());
        }
        set
    }
}

pub type AlertRepository = Repository<AlertMapper>;

impl Repository<AlertMapper> {
    pub async fn list_by_user(
        &self,
        user_id: &str,
        page: &PageRequest,
    ) -> Result<Page<Timestamped<Alert>>> {
        let query = AttributeQuery::gsi1(user_id)
            .with_sort(SortKeyCondition::BeginsWith(alert_gsi1_sk("")));
        self.query_by_attribute(&query, page).await
    }

    /// Alerts of every user evaluated at `frequency`, via GSI2.
    pub async fn list_by_frequency(
        &self,
        frequency: AlertFrequency,
        page: &PageRequest,
    ) -> Result<Page<Timestamped<Alert>>> {
        let query = AttributeQuery::gsi2(alert_gsi2_pk(frequency.as_str()));
        self.query_by_attribute(&query, page).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::{decode_record, encode_record, InMemoryStore};

    fn alert(user_id: &str, alert_id: &str, frequency: AlertFrequency) -> Alert {
        Alert {
            alert_id: alert_id.to_string(),
            user_id: user_id.to_string(),
            ticker_id: "AAPL".to_string(),
            exchange_id: "NASDAQ".to_string(),
            mode: AlertMode::Sell,
            frequency,
            enabled: true,
            conditions: vec![AlertCondition {
                field: "price".to_string(),
                operator: ComparisonOperator::Gte,
                value: 200.0,
            }],
            logical_operator: None,
            subscription: PushSubscription {
                endpoint: "https://push.example.com/abc".to_string(),
                keys_p256dh: "p256".to_string(),
                keys_auth: "auth".to_string(),
            },
        }
    }

    #[test]
    fn test_alert_item_layout() {
        let item = AlertMapper.to_item(&alert("u1", "a1", AlertFrequency::HourlyLevel));

        assert_eq!(item.pk(), Some("USER#u1"));
        assert_eq!(item.sk(), Some("ALERT#a1"));
        assert_eq!(item.get_s("GSI1SK"), Some("Alert#a1"));
        assert_eq!(item.get_s("GSI2PK"), Some("ALERT#HOURLY_LEVEL"));
        assert_eq!(item.get_s("GSI2SK"), Some("u1#a1"));
        assert!(!item.contains("LogicalOperator"));
    }

    #[test]
    fn test_alert_record_round_trip() {
        let mut alert = alert("u1", "a1", AlertFrequency::MinuteLevel);
        alert.conditions.push(AlertCondition {
            field: "price".to_string(),
            operator: ComparisonOperator::Lte,
            value: 250.5,
        });
        alert.logical_operator = Some(LogicalOperator::And);
        let record = Timestamped::new(alert, 7);

        let item = encode_record(&AlertMapper, &record);
        assert_eq!(decode_record(&AlertMapper, &item).unwrap(), record);
    }

    #[test]
    fn test_alert_decode_rejects_empty_condition_list() {
        let mut item = encode_record(
            &AlertMapper,
            &Timestamped::new(alert("u1", "a1", AlertFrequency::MinuteLevel), 7),
        );
        item.insert("ConditionList", AttributeValue::L(Vec::new()));

        let result = decode_record(&AlertMapper, &item);
        assert!(matches!(result, Err(RepositoryError::InvalidEntityData(_))));
    }

    #[test]
    fn test_alert_decode_names_bad_nested_operator() {
        let mut condition = HashMap::new();
        condition.insert("field".to_string(), AttributeValue::from("price"));
        condition.insert("operator".to_string(), AttributeValue::from("eq"));
        condition.insert("value".to_string(), AttributeValue::from(1.0));

        let mut item = encode_record(
            &AlertMapper,
            &Timestamped::new(alert("u1", "a1", AlertFrequency::MinuteLevel), 7),
        );
        item.insert("ConditionList", AttributeValue::L(vec![AttributeValue::M(condition)]));

        match decode_record(&AlertMapper, &item) {
            Err(RepositoryError::InvalidEntityData(message)) => {
                assert_eq!(
                    message,
                    "field \"ConditionList[0].operator\" must be one of: gte, lte"
                );
            }
            other => panic!("expected InvalidEntityData, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_by_frequency_spans_users() {
        let repo = AlertRepository::new(Arc::new(InMemoryStore::new("t")), AlertMapper);
        repo.create(alert("u2", "a1", AlertFrequency::HourlyLevel)).await.unwrap();
        repo.create(alert("u1", "a2", AlertFrequency::HourlyLevel)).await.unwrap();
        repo.create(alert("u1", "a3", AlertFrequency::MinuteLevel)).await.unwrap();

        let hourly = repo
            .list_by_frequency(AlertFrequency::HourlyLevel, &PageRequest::default())
            .await
            .unwrap();
        let ids: Vec<_> = hourly.items.iter().map(|a| a.alert_id.as_str()).collect();
        assert_eq!(ids, ["a2", "a1"]);

        let mine = repo.list_by_user("u1", &PageRequest::default()).await.unwrap();
        assert_eq!(mine.count, 2);
    }

    #[tokio::test]
    async fn test_frequency_change_moves_alert_between_index_partitions() {
        let repo = AlertRepository::new(Arc::new(InMemoryStore::new("t")), AlertMapper);
        repo.create(alert("u1", "a1", AlertFrequency::MinuteLevel)).await.unwrap();

        let patch = AlertPatch {
            frequency: Some(AlertFrequency::HourlyLevel),
            ..AlertPatch::default()
        };
        repo.update(&OwnedKey::new("u1", "a1"), &patch).await.unwrap();

        let minute = repo
            .list_by_frequency(AlertFrequency::MinuteLevel, &PageRequest::default())
            .await
            .unwrap();
        let hourly = repo
            .list_by_frequency(AlertFrequency::HourlyLevel, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(minute.count, 0);
        assert_eq!(hourly.count, 1);
        assert_eq!(hourly.items[0].frequency, AlertFrequency::HourlyLevel);
    }
}
