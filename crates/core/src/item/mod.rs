mod validation;
mod value;

pub use validation::{
    optional, validate_boolean_field, validate_enum_field, validate_number_field,
    validate_string_field, validate_string_list_field, validate_timestamp_field,
    validate_timestamp_field_at, AttributeEnum, NumberRules, StringRules, TimestampRules,
    MAX_SAFE_INTEGER,
};
pub use value::{AttributeValue, Item};

// ============================================================================
// Reserved attribute names
// ============================================================================

pub const ATTR_PK: &str = "PK";
pub const ATTR_SK: &str = "SK";
pub const ATTR_TYPE: &str = "Type";
pub const ATTR_CREATED_AT: &str = "CreatedAt";
pub const ATTR_UPDATED_AT: &str = "UpdatedAt";

pub const ATTR_GSI1_PK: &str = "GSI1PK";
pub const ATTR_GSI1_SK: &str = "GSI1SK";
pub const ATTR_GSI2_PK: &str = "GSI2PK";
pub const ATTR_GSI2_SK: &str = "GSI2SK";
pub const ATTR_GSI3_PK: &str = "GSI3PK";
pub const ATTR_GSI3_SK: &str = "GSI3SK";

/// Attributes managed by the repository; partial updates never touch them.
pub const RESERVED_ATTRIBUTES: [&str; 5] = [
    ATTR_PK,
    ATTR_SK,
    ATTR_TYPE,
    ATTR_CREATED_AT,
    ATTR_UPDATED_AT,
];

/// Current time as epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
