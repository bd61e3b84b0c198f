use async_trait::async_trait;

use crate::item::Item;
use crate::keys::TableKey;

use super::{
    AttributeQuery, DeleteRequest, KeyQuery, Page, PageRequest, PutRequest, StoreError,
    UpdateRequest,
};

/// Result type for backend operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A key-value table holding items under composite `(PK, SK)` keys.
///
/// Writes evaluate their condition atomically against the current item and
/// fail with [`StoreError::ConditionalCheckFailed`] when it does not hold.
/// Query results come back in sort-key order, one page at a time.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Name of the backing table.
    fn table_name(&self) -> &str;

    async fn get(&self, key: &TableKey) -> StoreResult<Option<Item>>;

    async fn put(&self, request: PutRequest) -> StoreResult<()>;

    /// Applies a `SET` to one item. Creates the item when unconditioned and absent.
    async fn update(&self, request: UpdateRequest) -> StoreResult<()>;

    async fn delete(&self, request: DeleteRequest) -> StoreResult<()>;

    /// Items in one partition, optionally narrowed by a sort-key condition.
    async fn query(&self, query: &KeyQuery, page: &PageRequest) -> StoreResult<Page<Item>>;

    /// Items whose attribute equals a value, ordered by the sort attribute.
    async fn query_by_attribute(
        &self,
        query: &AttributeQuery,
        page: &PageRequest,
    ) -> StoreResult<Page<Item>>;

    async fn scan(&self, page: &PageRequest) -> StoreResult<Page<Item>>;
}
