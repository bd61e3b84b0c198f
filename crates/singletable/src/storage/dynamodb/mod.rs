//! DynamoDB storage backend.
//!
//! Implements `TableStore` from `singletable_core::storage` using
//! `aws-sdk-dynamodb`. Conditions, updates and key conditions are rendered
//! into expressions with placeholder maps; continuation keys travel inside
//! pagination cursors.

mod conversions;
mod error;
mod expressions;
mod store;

pub use store::DynamoDbStore;
