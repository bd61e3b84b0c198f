//! In-memory table store for tests and local development.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::item::{Item, ATTR_PK, ATTR_SK};
use crate::keys::TableKey;

use super::{
    paginate, AttributeQuery, Condition, DeleteRequest, KeyQuery, Page, PageRequest, PutRequest,
    StoreError, StoreResult, TableStore, UpdateRequest,
};

/// A [`TableStore`] backed by an ordered map.
///
/// Items are kept sorted by `(PK, SK)`. Conditions are checked while holding
/// the write lock, so conditional writes are atomic with respect to each
/// other. Data is lost when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    table_name: String,
    items: Arc<RwLock<BTreeMap<TableKey, Item>>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new("singletable")
    }
}

fn check(condition: Option<&Condition>, current: Option<&Item>) -> StoreResult<()> {
    match condition {
        Some(condition) if !condition.evaluate(current) => Err(StoreError::ConditionalCheckFailed),
        _ => Ok(()),
    }
}

impl InMemoryStore {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            items: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.items.write().await.clear();
    }

    /// Inserts a raw item unconditionally. Items without string keys are ignored.
    pub async fn seed(&self, item: Item) {
        if let Some(key) = item.key() {
            self.items.write().await.insert(key, item);
        }
    }
}

#[async_trait]
impl TableStore for InMemoryStore {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn get(&self, key: &TableKey) -> StoreResult<Option<Item>> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn put(&self, request: PutRequest) -> StoreResult<()> {
        let key = request
            .item
            .key()
            .ok_or_else(|| StoreError::backend("PutItem", "item is missing a string PK or SK"))?;

        let mut items = self.items.write().await;
        check(request.condition.as_ref(), items.get(&key))?;
        items.insert(key, request.item);
        Ok(())
    }

    async fn update(&self, request: UpdateRequest) -> StoreResult<()> {
        let mut items = self.items.write().await;
        let current = items.get(&request.key);
        check(request.condition.as_ref(), current)?;

        let mut item = current.cloned().unwrap_or_else(|| {
            Item::new()
                .with(ATTR_PK, request.key.pk.as_str())
                .with(ATTR_SK, request.key.sk.as_str())
        });
        for (name, value) in request.set {
            item.insert(name, value);
        }
        items.insert(request.key, item);
        Ok(())
    }

    async fn delete(&self, request: DeleteRequest) -> StoreResult<()> {
        let mut items = self.items.write().await;
        check(request.condition.as_ref(), items.get(&request.key))?;
        items.remove(&request.key);
        Ok(())
    }

    async fn query(&self, query: &KeyQuery, page: &PageRequest) -> StoreResult<Page<Item>> {
        let items = self.items.read().await;
        let start = TableKey::new(query.pk.as_str(), "");

        let matched: Vec<Item> = items
            .range(start..)
            .take_while(|(key, _)| key.pk == query.pk)
            .filter(|(key, _)| query.sk.as_ref().is_none_or(|sk| sk.matches(&key.sk)))
            .map(|(_, item)| item.clone())
            .collect();

        Ok(paginate(matched, page))
    }

    async fn query_by_attribute(
        &self,
        query: &AttributeQuery,
        page: &PageRequest,
    ) -> StoreResult<Page<Item>> {
        let items = self.items.read().await;

        let mut matched: Vec<(Option<String>, Item)> = items
            .values()
            .filter(|item| item.get_s(&query.attribute) == Some(query.value.as_str()))
            .filter_map(|item| match &query.sort_attribute {
                None => Some((None, item.clone())),
                Some(sort_attribute) => {
                    // Items without the sort attribute are not projected into the index.
                    let sort_value = item.get_s(sort_attribute)?;
                    let in_range = query.sort.as_ref().is_none_or(|sk| sk.matches(sort_value));
                    in_range.then(|| (Some(sort_value.to_string()), item.clone()))
                }
            })
            .collect();

        // Stable, so ties keep (PK, SK) order.
        matched.sort_by(|(a, _), (b, _)| a.cmp(b));

        Ok(paginate(
            matched.into_iter().map(|(_, item)| item).collect(),
            page,
        ))
    }

    async fn scan(&self, page: &PageRequest) -> StoreResult<Page<Item>> {
        let items: Vec<Item> = self.items.read().await.values().cloned().collect();
        Ok(paginate(items, page))
    }
}
