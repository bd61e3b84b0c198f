//! Conversions between store items and DynamoDB attribute maps.
//!
//! Pure functions, testable without DynamoDB access.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue as DynamoValue;
use singletable_core::item::{AttributeValue, Item, ATTR_PK, ATTR_SK};
use singletable_core::keys::TableKey;
use singletable_core::storage::StoreError;

pub type DynamoItem = HashMap<String, DynamoValue>;

/// Largest magnitude written without a fractional part.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_991.0;

pub fn to_dynamo_value(value: &AttributeValue) -> DynamoValue {
    match value {
        AttributeValue::S(s) => DynamoValue::S(s.clone()),
        AttributeValue::N(n) => DynamoValue::N(format_number(*n)),
        AttributeValue::Bool(b) => DynamoValue::Bool(*b),
        AttributeValue::Null => DynamoValue::Null(true),
        AttributeValue::L(values) => DynamoValue::L(values.iter().map(to_dynamo_value).collect()),
        AttributeValue::M(map) => DynamoValue::M(
            map.iter()
                .map(|(name, value)| (name.clone(), to_dynamo_value(value)))
                .collect(),
        ),
    }
}

pub fn from_dynamo_value(value: &DynamoValue) -> Result<AttributeValue, StoreError> {
    Ok(match value {
        DynamoValue::S(s) => AttributeValue::S(s.clone()),
        DynamoValue::N(n) => AttributeValue::N(parse_number(n)?),
        DynamoValue::Bool(b) => AttributeValue::Bool(*b),
        DynamoValue::Null(_) => AttributeValue::Null,
        DynamoValue::L(values) => AttributeValue::L(
            values
                .iter()
                .map(from_dynamo_value)
                .collect::<Result<_, _>>()?,
        ),
        DynamoValue::M(map) => AttributeValue::M(
            map.iter()
                .map(|(name, value)| Ok((name.clone(), from_dynamo_value(value)?)))
                .collect::<Result<_, StoreError>>()?,
        ),
        DynamoValue::Ss(values) => {
            AttributeValue::L(values.iter().cloned().map(AttributeValue::S).collect())
        }
        DynamoValue::Ns(values) => AttributeValue::L(
            values
                .iter()
                .map(|n| parse_number(n).map(AttributeValue::N))
                .collect::<Result<_, _>>()?,
        ),
        _ => {
            return Err(StoreError::backend(
                "Decode",
                "binary and unknown attribute types are not supported",
            ))
        }
    })
}

pub fn to_dynamo_item(item: &Item) -> DynamoItem {
    item.iter()
        .map(|(name, value)| (name.clone(), to_dynamo_value(value)))
        .collect()
}

pub fn from_dynamo_item(item: &DynamoItem) -> Result<Item, StoreError> {
    item.iter()
        .map(|(name, value)| Ok((name.clone(), from_dynamo_value(value)?)))
        .collect()
}

/// The `PK`/`SK` key map for GetItem, UpdateItem and DeleteItem.
pub fn key_to_dynamo(key: &TableKey) -> DynamoItem {
    HashMap::from([
        (ATTR_PK.to_string(), DynamoValue::S(key.pk.clone())),
        (ATTR_SK.to_string(), DynamoValue::S(key.sk.clone())),
    ])
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn parse_number(raw: &str) -> Result<f64, StoreError> {
    raw.parse::<f64>()
        .map_err(|_| StoreError::backend("Decode", format!("invalid number attribute: {raw}")))
}
