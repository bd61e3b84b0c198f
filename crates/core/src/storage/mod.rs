mod conditions;
mod error;
mod http_mapping;
mod mapper;
mod memory;
mod pagination;
mod query;
mod repository;
mod traits;

pub use conditions::{
    build_update_set, conditional_create, conditional_delete, conditional_update,
    AttributeUpdates, Condition, ConditionalWrite, DeleteRequest, PutRequest, UpdateRequest,
};
pub use error::{RepositoryError, Result, StoreError};
pub use http_mapping::{repository_error_code, repository_error_to_status_code};
pub use mapper::{decode_record, encode_record, EntityMapper, Timestamped};
pub use memory::InMemoryStore;
pub use pagination::{
    decode_cursor, encode_cursor, paginate, IndexPosition, Page, PageRequest, PaginationError,
    DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, MIN_PAGE_LIMIT,
};
pub use query::{AttributeQuery, KeyQuery, SortKeyCondition};
pub use repository::Repository;
pub use traits::{StoreResult, TableStore};
