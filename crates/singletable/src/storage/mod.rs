//! Storage backend implementations.
//!
//! The backend is selected at compile time via feature flags.
//!
//! # Feature Flags
//!
//! - `inmemory` (default): `InMemoryStore` from `singletable_core`
//! - `dynamodb`: AWS DynamoDB backend using `aws-sdk-dynamodb`
//!
//! These features are mutually exclusive.
//!
//! Build with DynamoDB:
//! ```bash
//! cargo build -p singletable --no-default-features --features dynamodb
//! ```

#[cfg(all(feature = "inmemory", feature = "dynamodb"))]
compile_error!(
    "Features 'inmemory' and 'dynamodb' are mutually exclusive. \
    Enable only one storage backend at a time."
);

#[cfg(not(any(feature = "inmemory", feature = "dynamodb")))]
compile_error!(
    "No storage backend selected. Enable 'inmemory' or 'dynamodb' feature. \
    Example: cargo build -p singletable --features dynamodb"
);

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbStore;
