//! `TableStore` backed by a DynamoDB table with `GSI1`..`GSI3`.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use serde::{Deserialize, Serialize};

use singletable_core::item::{AttributeValue, Item, ATTR_PK, ATTR_SK};
use singletable_core::keys::TableKey;
use singletable_core::storage::{
    encode_cursor, AttributeQuery, DeleteRequest, KeyQuery, Page, PageRequest, PutRequest,
    StoreError, StoreResult, TableStore, UpdateRequest,
};

use super::conversions::{from_dynamo_item, key_to_dynamo, to_dynamo_item, DynamoItem};
use super::error::{
    map_delete_item_error, map_get_item_error, map_put_item_error, map_query_error,
    map_scan_error, map_update_item_error,
};
use super::expressions::{index_for, ExpressionBuilder};

/// Cursor position: the last evaluated key of the previous page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct LastKey {
    key: Option<HashMap<String, AttributeValue>>,
}

impl LastKey {
    fn from_request(page: &PageRequest) -> Option<DynamoItem> {
        page.position::<LastKey>()
            .key
            .map(|key| to_dynamo_item(&Item::from(key)))
    }

    fn next_cursor(last_evaluated: Option<DynamoItem>) -> StoreResult<Option<String>> {
        match last_evaluated {
            Some(key) if !key.is_empty() => {
                let key = from_dynamo_item(&key)?.into_inner();
                Ok(Some(encode_cursor(&LastKey { key: Some(key) })))
            }
            _ => Ok(None),
        }
    }
}

/// DynamoDB-based table store.
///
/// The client is built once at startup and shared by every repository.
#[derive(Debug, Clone)]
pub struct DynamoDbStore {
    client: Client,
    table_name: String,
}

impl DynamoDbStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Creates a store using the AWS SDK default credential chain.
    ///
    /// `endpoint_url` points the client at a local DynamoDB.
    pub async fn from_config(table_name: impl Into<String>, endpoint_url: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(endpoint_url) = endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let config = loader.load().await;

        Self::new(Client::new(&config), table_name)
    }

    fn page_of(
        items: Option<Vec<DynamoItem>>,
        count: i32,
        last_evaluated: Option<DynamoItem>,
    ) -> StoreResult<Page<Item>> {
        let items = items
            .unwrap_or_default()
            .iter()
            .map(from_dynamo_item)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(Page {
            count: usize::try_from(count).unwrap_or(items.len()),
            items,
            next_cursor: LastKey::next_cursor(last_evaluated)?,
        })
    }
}

fn page_limit(page: &PageRequest) -> i32 {
    i32::try_from(page.limit()).unwrap_or(i32::MAX)
}

#[async_trait]
impl TableStore for DynamoDbStore {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn get(&self, key: &TableKey) -> StoreResult<Option<Item>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(key_to_dynamo(key)))
            .consistent_read(true)
            .send()
            .await
            .map_err(map_get_item_error)?;

        result.item.as_ref().map(from_dynamo_item).transpose()
    }

    async fn put(&self, request: PutRequest) -> StoreResult<()> {
        if request.item.key().is_none() {
            return Err(StoreError::backend(
                "PutItem",
                format!("item is missing {ATTR_PK} or {ATTR_SK}"),
            ));
        }

        let mut builder = ExpressionBuilder::new();
        let condition = request.condition.as_ref().map(|c| builder.condition(c));
        let (names, values) = builder.into_parts();

        self.client
            .put_item()
            .table_name(&request.table_name)
            .set_item(Some(to_dynamo_item(&request.item)))
            .set_condition_expression(condition)
            .set_expression_attribute_names(names)
            .set_expression_attribute_values(values)
            .send()
            .await
            .map_err(map_put_item_error)?;

        Ok(())
    }

    async fn update(&self, request: UpdateRequest) -> StoreResult<()> {
        if request.set.is_empty() {
            return Err(StoreError::backend("UpdateItem", "nothing to update"));
        }

        let mut builder = ExpressionBuilder::new();
        let update = builder.update_set(&request.set);
        let condition = request.condition.as_ref().map(|c| builder.condition(c));
        let (names, values) = builder.into_parts();

        self.client
            .update_item()
            .table_name(&request.table_name)
            .set_key(Some(key_to_dynamo(&request.key)))
            .update_expression(update)
            .set_condition_expression(condition)
            .set_expression_attribute_names(names)
            .set_expression_attribute_values(values)
            .send()
            .await
            .map_err(map_update_item_error)?;

        Ok(())
    }

    async fn delete(&self, request: DeleteRequest) -> StoreResult<()> {
        let mut builder = ExpressionBuilder::new();
        let condition = request.condition.as_ref().map(|c| builder.condition(c));
        let (names, values) = builder.into_parts();

        self.client
            .delete_item()
            .table_name(&request.table_name)
            .set_key(Some(key_to_dynamo(&request.key)))
            .set_condition_expression(condition)
            .set_expression_attribute_names(names)
            .set_expression_attribute_values(values)
            .send()
            .await
            .map_err(map_delete_item_error)?;

        Ok(())
    }

    async fn query(&self, query: &KeyQuery, page: &PageRequest) -> StoreResult<Page<Item>> {
        let mut builder = ExpressionBuilder::new();
        let key_condition =
            builder.key_condition(ATTR_PK, &query.pk, query.sk.as_ref().map(|c| (ATTR_SK, c)));
        let (names, values) = builder.into_parts();

        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression(key_condition)
            .set_expression_attribute_names(names)
            .set_expression_attribute_values(values)
            .limit(page_limit(page))
            .set_exclusive_start_key(LastKey::from_request(page))
            .send()
            .await
            .map_err(map_query_error)?;

        Self::page_of(result.items, result.count, result.last_evaluated_key)
    }

    async fn query_by_attribute(
        &self,
        query: &AttributeQuery,
        page: &PageRequest,
    ) -> StoreResult<Page<Item>> {
        let index = index_for(&query.attribute).ok_or_else(|| {
            StoreError::backend(
                "Query",
                format!("no secondary index on attribute {}", query.attribute),
            )
        })?;

        let sort = match (&query.sort_attribute, &query.sort) {
            (Some(attribute), Some(condition)) => Some((attribute.as_str(), condition)),
            _ => None,
        };

        let mut builder = ExpressionBuilder::new();
        let key_condition = builder.key_condition(&query.attribute, &query.value, sort);
        let (names, values) = builder.into_parts();

        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(index)
            .key_condition_expression(key_condition)
            .set_expression_attribute_names(names)
            .set_expression_attribute_values(values)
            .limit(page_limit(page))
            .set_exclusive_start_key(LastKey::from_request(page))
            .send()
            .await
            .map_err(map_query_error)?;

        Self::page_of(result.items, result.count, result.last_evaluated_key)
    }

    async fn scan(&self, page: &PageRequest) -> StoreResult<Page<Item>> {
        let result = self
            .client
            .scan()
            .table_name(&self.table_name)
            .limit(page_limit(page))
            .set_exclusive_start_key(LastKey::from_request(page))
            .send()
            .await
            .map_err(map_scan_error)?;

        Self::page_of(result.items, result.count, result.last_evaluated_key)
    }
}
