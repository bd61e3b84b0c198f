//! Entity codecs.
//!
//! An [`EntityMapper`] is the only place an entity meets a raw [`Item`]: it
//! builds keys, encodes entities together with their index projections, and
//! decodes items back while validating every attribute. Creation and update
//! timestamps are handled once, here, for all entity types.

use std::fmt;
use std::ops::Deref;

use serde::Serialize;

use crate::item::{
    validate_timestamp_field, Item, TimestampRules, ATTR_CREATED_AT, ATTR_TYPE, ATTR_UPDATED_AT,
};
use crate::keys::TableKey;

use super::{AttributeUpdates, RepositoryError, Result};

pub trait EntityMapper: Send + Sync + 'static {
    type Entity: Clone + Send + Sync;
    /// Domain identifier, used to build keys and in error messages.
    type Key: fmt::Display + Send + Sync;
    /// Typed partial update.
    type Patch: Send + Sync;

    /// Value of the `Type` discriminator.
    const ENTITY_TYPE: &'static str;

    fn build_keys(&self, key: &Self::Key) -> TableKey;

    fn key_of(&self, entity: &Self::Entity) -> Self::Key;

    /// Encodes the entity with `PK`, `SK`, `Type` and any index attributes.
    fn to_item(&self, entity: &Self::Entity) -> Item;

    /// Decodes and validates an item. Never returns a partial entity.
    fn to_entity(&self, item: &Item) -> Result<Self::Entity>;

    fn patch_attributes(&self, patch: &Self::Patch) -> AttributeUpdates;
}

/// An entity together with its creation and last-update times (epoch millis).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timestamped<E> {
    #[serde(flatten)]
    pub entity: E,
    pub created_at: i64,
    pub updated_at: i64,
}

impl<E> Timestamped<E> {
    /// A freshly created record: both timestamps set to `now`.
    pub fn new(entity: E, now: i64) -> Self {
        Self {
            entity,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn into_inner(self) -> E {
        self.entity
    }
}

impl<E> Deref for Timestamped<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.entity
    }
}

pub fn encode_record<M: EntityMapper>(mapper: &M, record: &Timestamped<M::Entity>) -> Item {
    mapper
        .to_item(&record.entity)
        .with(ATTR_CREATED_AT, record.created_at)
        .with(ATTR_UPDATED_AT, record.updated_at)
}

pub fn decode_record<M: EntityMapper>(mapper: &M, item: &Item) -> Result<Timestamped<M::Entity>> {
    match item.entity_type() {
        Some(entity_type) if entity_type == M::ENTITY_TYPE => {}
        Some(other) => {
            return Err(RepositoryError::InvalidEntityData(format!(
                "field \"{ATTR_TYPE}\" must be \"{}\", got \"{other}\"",
                M::ENTITY_TYPE
            )))
        }
        None => {
            return Err(RepositoryError::InvalidEntityData(format!(
                "field \"{ATTR_TYPE}\" is missing"
            )))
        }
    }

    let entity = mapper.to_entity(item)?;
    let rules = TimestampRules::default();

    Ok(Timestamped {
        entity,
        created_at: validate_timestamp_field(item.get(ATTR_CREATED_AT), ATTR_CREATED_AT, &rules)?,
        updated_at: validate_timestamp_field(item.get(ATTR_UPDATED_AT), ATTR_UPDATED_AT, &rules)?,
    })
}
