//! Generic item representation at the store boundary.
//!
//! An [`Item`] is the unit of storage: an order-irrelevant map of attribute
//! names to [`AttributeValue`]s. Codecs convert between items and typed
//! entities; nothing above the codec layer handles raw items.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::keys::TableKey;

use super::{ATTR_PK, ATTR_SK, ATTR_TYPE};

/// A single attribute value.
///
/// Serializes in DynamoDB-JSON style (`{"S": "abc"}`, `{"N": 42.0}`), which
/// lets backend continuation keys travel inside pagination cursors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    S(String),
    N(f64),
    Bool(bool),
    Null,
    L(Vec<AttributeValue>),
    M(HashMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Returns the string value, if this is an `S`.
    pub fn as_s(&self) -> Option<&str> {
        match self {
            Self::S(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric value, if this is an `N`.
    pub fn as_n(&self) -> Option<f64> {
        match self {
            Self::N(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the list value, if this is an `L`.
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            Self::L(values) => Some(values),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, used in validation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::S(_) => "string",
            Self::N(_) => "number",
            Self::Bool(_) => "boolean",
            Self::Null => "null",
            Self::L(_) => "list",
            Self::M(_) => "map",
        }
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::S(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::S(value.to_string())
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::N(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::N(value as f64)
    }
}

impl From<u64> for AttributeValue {
    fn from(value: u64) -> Self {
        Self::N(value as f64)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(values: Vec<String>) -> Self {
        Self::L(values.into_iter().map(Self::S).collect())
    }
}

/// A stored item: attribute name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item(HashMap<String, AttributeValue>);

impl Item {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts an item with its primary key and `Type` discriminator set.
    pub fn keyed(key: &TableKey, entity_type: &str) -> Self {
        Self::new()
            .with(ATTR_PK, key.pk.as_str())
            .with(ATTR_SK, key.sk.as_str())
            .with(ATTR_TYPE, entity_type)
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Builder-style insert that skips `None`.
    pub fn with_opt<V: Into<AttributeValue>>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(name, value),
            None => self,
        }
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Option<AttributeValue> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// String attribute lookup.
    pub fn get_s(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttributeValue::as_s)
    }

    pub fn pk(&self) -> Option<&str> {
        self.get_s(ATTR_PK)
    }

    pub fn sk(&self) -> Option<&str> {
        self.get_s(ATTR_SK)
    }

    pub fn entity_type(&self) -> Option<&str> {
        self.get_s(ATTR_TYPE)
    }

    /// The `(PK, SK)` pair, if both are present strings.
    pub fn key(&self) -> Option<TableKey> {
        Some(TableKey::new(self.pk()?, self.sk()?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> HashMap<String, AttributeValue> {
        self.0
    }
}

impl From<HashMap<String, AttributeValue>> for Item {
    fn from(attributes: HashMap<String, AttributeValue>) -> Self {
        Self(attributes)
    }
}

impl FromIterator<(String, AttributeValue)> for Item {
    fn from_iter<I: IntoIterator<Item = (String, AttributeValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Item {
    type Item = (String, AttributeValue);
    type IntoIter = std::collections::hash_map::IntoIter<String, AttributeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyed_item_has_reserved_attributes() {
        let key = TableKey::new("USER#1", "PROFILE");
        let item = Item::keyed(&key, "User");

        assert_eq!(item.pk(), Some("USER#1"));
        assert_eq!(item.sk(), Some("PROFILE"));
        assert_eq!(item.entity_type(), Some("User"));
        assert_eq!(item.key(), Some(key));
    }

    #[test]
    fn test_with_opt_skips_none() {
        let item = Item::new()
            .with_opt("Present", Some("yes"))
            .with_opt::<String>("Absent", None);

        assert!(item.contains("Present"));
        assert!(!item.contains("Absent"));
    }

    #[test]
    fn test_key_requires_string_pk_and_sk() {
        let item = Item::new().with(ATTR_PK, 1_i64).with(ATTR_SK, "SK");
        assert_eq!(item.key(), None);
    }

    #[test]
    fn test_attribute_value_serializes_dynamodb_style() {
        let json = serde_json::to_string(&AttributeValue::S("abc".to_string())).unwrap();
        assert_eq!(json, r#"{"S":"abc"}"#);

        let back: AttributeValue = serde_json::from_str(r#"{"N":42.0}"#).unwrap();
        assert_eq!(back, AttributeValue::N(42.0));
    }

    #[test]
    fn test_string_list_conversion() {
        let value = AttributeValue::from(vec!["admin".to_string(), "user".to_string()]);
        assert_eq!(value.as_list().map(<[_]>::len), Some(2));
        assert_eq!(value.type_name(), "list");
    }
}
