//! Write requests and the conditions that guard them.
//!
//! The helpers here are pure transformers: they take a request and return it
//! with an extra existence guard. Backends evaluate the resulting condition
//! atomically with the write and report a violation as
//! [`StoreError::ConditionalCheckFailed`](super::StoreError::ConditionalCheckFailed).

use std::collections::BTreeMap;

use crate::item::{AttributeValue, Item, ATTR_PK, ATTR_UPDATED_AT, RESERVED_ATTRIBUTES};
use crate::keys::TableKey;

use super::{RepositoryError, Result};

/// Attribute assignments of an update, applied as a single `SET`.
pub type AttributeUpdates = BTreeMap<String, AttributeValue>;

/// A predicate over the current state of the target item.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    AttributeExists(String),
    AttributeNotExists(String),
    Equals(String, AttributeValue),
    And(Vec<Condition>),
}

impl Condition {
    pub fn attribute_exists(name: impl Into<String>) -> Self {
        Self::AttributeExists(name.into())
    }

    pub fn attribute_not_exists(name: impl Into<String>) -> Self {
        Self::AttributeNotExists(name.into())
    }

    pub fn equals(name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::Equals(name.into(), value.into())
    }

    /// Conjunction, flattening nested `And`s.
    pub fn and(self, other: Condition) -> Self {
        let mut parts = match self {
            Self::And(parts) => parts,
            single => vec![single],
        };
        match other {
            Self::And(more) => parts.extend(more),
            single => parts.push(single),
        }
        Self::And(parts)
    }

    /// Evaluates against the stored item, `None` meaning no item at the key.
    pub fn evaluate(&self, item: Option<&Item>) -> bool {
        match self {
            Self::AttributeExists(name) => item.is_some_and(|item| item.contains(name)),
            Self::AttributeNotExists(name) => !item.is_some_and(|item| item.contains(name)),
            Self::Equals(name, expected) => item.and_then(|item| item.get(name)) == Some(expected),
            Self::And(parts) => parts.iter().all(|part| part.evaluate(item)),
        }
    }
}

/// A write request that can carry a condition.
pub trait ConditionalWrite: Sized {
    fn condition_mut(&mut self) -> &mut Option<Condition>;

    /// Adds `condition`, ANDed with any condition already present.
    fn and_condition(mut self, condition: Condition) -> Self {
        let slot = self.condition_mut();
        *slot = Some(match slot.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PutRequest {
    pub table_name: String,
    pub item: Item,
    pub condition: Option<Condition>,
}

impl PutRequest {
    pub fn new(table_name: impl Into<String>, item: Item) -> Self {
        Self {
            table_name: table_name.into(),
            item,
            condition: None,
        }
    }
}

/// A `SET` of attributes on one item. Without a condition it upserts.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    pub table_name: String,
    pub key: TableKey,
    pub set: AttributeUpdates,
    pub condition: Option<Condition>,
}

impl UpdateRequest {
    pub fn new(table_name: impl Into<String>, key: TableKey, set: AttributeUpdates) -> Self {
        Self {
            table_name: table_name.into(),
            key,
            set,
            condition: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteRequest {
    pub table_name: String,
    pub key: TableKey,
    pub condition: Option<Condition>,
}

impl DeleteRequest {
    pub fn new(table_name: impl Into<String>, key: TableKey) -> Self {
        Self {
            table_name: table_name.into(),
            key,
            condition: None,
        }
    }
}

impl ConditionalWrite for PutRequest {
    fn condition_mut(&mut self) -> &mut Option<Condition> {
        &mut self.condition
    }
}

impl ConditionalWrite for UpdateRequest {
    fn condition_mut(&mut self) -> &mut Option<Condition> {
        &mut self.condition
    }
}

impl ConditionalWrite for DeleteRequest {
    fn condition_mut(&mut self) -> &mut Option<Condition> {
        &mut self.condition
    }
}

/// Guards a write so it only succeeds when no item exists at the key.
pub fn conditional_create<W: ConditionalWrite>(request: W) -> W {
    request.and_condition(Condition::attribute_not_exists(ATTR_PK))
}

/// Guards a write so it only succeeds when an item exists at the key.
pub fn conditional_update<W: ConditionalWrite>(request: W) -> W {
    request.and_condition(Condition::attribute_exists(ATTR_PK))
}

/// Guards a delete so it only succeeds when an item exists at the key.
pub fn conditional_delete<W: ConditionalWrite>(request: W) -> W {
    request.and_condition(Condition::attribute_exists(ATTR_PK))
}

/// Builds the `SET` of a partial update.
///
/// Reserved attributes are dropped and `UpdatedAt` is always written. Fails
/// when nothing but reserved attributes was supplied.
pub fn build_update_set(updates: AttributeUpdates, updated_at: i64) -> Result<AttributeUpdates> {
    let mut set: AttributeUpdates = updates
        .into_iter()
        .filter(|(name, _)| !RESERVED_ATTRIBUTES.contains(&name.as_str()))
        .collect();

    if set.is_empty() {
        return Err(RepositoryError::InvalidEntityData(
            "no attributes to update".to_string(),
        ));
    }

    set.insert(ATTR_UPDATED_AT.to_string(), AttributeValue::from(updated_at));
    Ok(set)
}
