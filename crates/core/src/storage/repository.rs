//! Generic repository over any [`TableStore`].

use std::sync::Arc;

use crate::item::now_millis;

use super::{
    build_update_set, conditional_create, conditional_delete, conditional_update, decode_record,
    encode_record, AttributeQuery, Condition, ConditionalWrite, DeleteRequest, EntityMapper,
    KeyQuery, Page, PageRequest, PutRequest, RepositoryError, Result, StoreError, TableStore,
    Timestamped, UpdateRequest,
};

/// CRUD and paginated queries for one entity type.
///
/// Entity-specific lookups are inherent impls on `Repository<XMapper>`.
pub struct Repository<M: EntityMapper> {
    store: Arc<dyn TableStore>,
    mapper: M,
}

impl<M: EntityMapper + Clone> Clone for Repository<M> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            mapper: self.mapper.clone(),
        }
    }
}

impl<M: EntityMapper> Repository<M> {
    pub fn new(store: Arc<dyn TableStore>, mapper: M) -> Self {
        Self { store, mapper }
    }

    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    pub fn store(&self) -> &Arc<dyn TableStore> {
        &self.store
    }

    fn not_found(&self, key: &M::Key) -> RepositoryError {
        RepositoryError::NotFound {
            entity_type: M::ENTITY_TYPE,
            id: key.to_string(),
        }
    }

    /// Fetches one entity. A missing item is `Ok(None)`, not an error.
    pub async fn get_by_id(&self, key: &M::Key) -> Result<Option<Timestamped<M::Entity>>> {
        let table_key = self.mapper.build_keys(key);
        let item = self
            .store
            .get(&table_key)
            .await
            .map_err(RepositoryError::database)?;

        item.map(|item| decode_record(&self.mapper, &item))
            .transpose()
    }

    /// Stores a new entity, failing with `AlreadyExists` if its key is taken.
    pub async fn create(&self, entity: M::Entity) -> Result<Timestamped<M::Entity>> {
        let record = Timestamped::new(entity, now_millis());
        let item = encode_record(&self.mapper, &record);
        let request = conditional_create(PutRequest::new(self.store.table_name(), item));

        match self.store.put(request).await {
            Ok(()) => {
                tracing::debug!(entity_type = M::ENTITY_TYPE, id = %self.mapper.key_of(&record), "Entity created");
                Ok(record)
            }
            Err(StoreError::ConditionalCheckFailed) => Err(RepositoryError::AlreadyExists {
                entity_type: M::ENTITY_TYPE,
                id: self.mapper.key_of(&record).to_string(),
            }),
            Err(err) => Err(RepositoryError::database(err)),
        }
    }

    /// Applies a partial update to an existing entity and returns the stored result.
    pub async fn update(&self, key: &M::Key, patch: &M::Patch) -> Result<Timestamped<M::Entity>> {
        self.apply_update(key, patch, None).await
    }

    /// Like [`update`](Self::update), but only if `guard` holds on the stored item.
    ///
    /// A failed guard (or a missing item) yields `ConditionFailed`.
    pub async fn update_where(
        &self,
        key: &M::Key,
        patch: &M::Patch,
        guard: Condition,
    ) -> Result<Timestamped<M::Entity>> {
        self.apply_update(key, patch, Some(guard)).await
    }

    async fn apply_update(
        &self,
        key: &M::Key,
        patch: &M::Patch,
        guard: Option<Condition>,
    ) -> Result<Timestamped<M::Entity>> {
        let set = build_update_set(self.mapper.patch_attributes(patch), now_millis())?;
        let table_key = self.mapper.build_keys(key);

        let mut request = conditional_update(UpdateRequest::new(
            self.store.table_name(),
            table_key,
            set,
        ));
        let guarded = guard.is_some();
        if let Some(guard) = guard {
            request = request.and_condition(guard);
        }

        match self.store.update(request).await {
            Ok(()) => {}
            Err(StoreError::ConditionalCheckFailed) if guarded => {
                return Err(RepositoryError::ConditionFailed {
                    entity_type: M::ENTITY_TYPE,
                    id: key.to_string(),
                })
            }
            Err(StoreError::ConditionalCheckFailed) => return Err(self.not_found(key)),
            Err(err) => return Err(RepositoryError::database(err)),
        }

        tracing::debug!(entity_type = M::ENTITY_TYPE, id = %key, "Entity updated");

        self.get_by_id(key)
            .await?
            .ok_or_else(|| self.not_found(key))
    }

    /// Removes an existing entity, failing with `NotFound` if there is none.
    pub async fn delete(&self, key: &M::Key) -> Result<()> {
        let table_key = self.mapper.build_keys(key);
        let request = conditional_delete(DeleteRequest::new(self.store.table_name(), table_key));

        match self.store.delete(request).await {
            Ok(()) => {
                tracing::debug!(entity_type = M::ENTITY_TYPE, id = %key, "Entity deleted");
                Ok(())
            }
            Err(StoreError::ConditionalCheckFailed) => Err(self.not_found(key)),
            Err(err) => Err(RepositoryError::database(err)),
        }
    }

    pub async fn query(
        &self,
        query: &KeyQuery,
        page: &PageRequest,
    ) -> Result<Page<Timestamped<M::Entity>>> {
        self.store
            .query(query, page)
            .await
            .map_err(RepositoryError::database)?
            .try_map(|item| decode_record(&self.mapper, &item))
    }

    pub async fn query_by_attribute(
        &self,
        query: &AttributeQuery,
        page: &PageRequest,
    ) -> Result<Page<Timestamped<M::Entity>>> {
        self.store
            .query_by_attribute(query, page)
            .await
            .map_err(RepositoryError::database)?
            .try_map(|item| decode_record(&self.mapper, &item))
    }

    /// First match of an index lookup expected to be unique.
    pub(crate) async fn find_one(
        &self,
        query: &AttributeQuery,
    ) -> Result<Option<Timestamped<M::Entity>>> {
        let page = PageRequest::default();
        Ok(self
            .query_by_attribute(query, &page)
            .await?
            .items
            .into_iter()
            .next())
    }
}
