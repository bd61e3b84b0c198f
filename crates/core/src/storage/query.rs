//! Key conditions for partition queries and secondary-index lookups.

use crate::item::{ATTR_GSI1_PK, ATTR_GSI1_SK, ATTR_GSI2_PK, ATTR_GSI2_SK, ATTR_GSI3_PK, ATTR_GSI3_SK};

/// Comparison applied to a sort-key value. Strings compare lexicographically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKeyCondition {
    Eq(String),
    BeginsWith(String),
    /// Inclusive on both ends.
    Between(String, String),
    Gt(String),
    Gte(String),
    Lt(String),
    Lte(String),
}

impl SortKeyCondition {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Eq(v) => value == v,
            Self::BeginsWith(prefix) => value.starts_with(prefix.as_str()),
            Self::Between(low, high) => low.as_str() <= value && value <= high.as_str(),
            Self::Gt(v) => value > v.as_str(),
            Self::Gte(v) => value >= v.as_str(),
            Self::Lt(v) => value < v.as_str(),
            Self::Lte(v) => value <= v.as_str(),
        }
    }
}

/// Query over the table's own `(PK, SK)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyQuery {
    pub pk: String,
    pub sk: Option<SortKeyCondition>,
}

impl KeyQuery {
    pub fn partition(pk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: None,
        }
    }

    pub fn with_sort(mut self, condition: SortKeyCondition) -> Self {
        self.sk = Some(condition);
        self
    }
}

/// Query over an arbitrary attribute pair, as on a secondary index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeQuery {
    pub attribute: String,
    pub value: String,
    pub sort_attribute: Option<String>,
    pub sort: Option<SortKeyCondition>,
}

impl AttributeQuery {
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
            sort_attribute: None,
            sort: None,
        }
    }

    /// Lookup on GSI1 (`GSI1PK` / `GSI1SK`).
    pub fn gsi1(value: impl Into<String>) -> Self {
        Self::new(ATTR_GSI1_PK, value).sorted_by(ATTR_GSI1_SK)
    }

    /// Lookup on GSI2 (`GSI2PK` / `GSI2SK`).
    pub fn gsi2(value: impl Into<String>) -> Self {
        Self::new(ATTR_GSI2_PK, value).sorted_by(ATTR_GSI2_SK)
    }

    /// Lookup on GSI3 (`GSI3PK` / `GSI3SK`).
    pub fn gsi3(value: impl Into<String>) -> Self {
        Self::new(ATTR_GSI3_PK, value).sorted_by(ATTR_GSI3_SK)
    }

    pub fn sorted_by(mut self, sort_attribute: impl Into<String>) -> Self {
        self.sort_attribute = Some(sort_attribute.into());
        self
    }

    /// Restricts the sort attribute. Ignored when no sort attribute is set.
    pub fn with_sort(mut self, condition: SortKeyCondition) -> Self {
        self.sort = Some(condition);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_operators() {
        assert!(SortKeyCondition::Eq("A".into()).matches("A"));
        assert!(SortKeyCondition::BeginsWith("HOLDING#".into()).matches("HOLDING#AAPL"));
        assert!(!SortKeyCondition::BeginsWith("HOLDING#".into()).matches("ALERT#1"));
        assert!(SortKeyCondition::Between("B".into(), "D".into()).matches("B"));
        assert!(SortKeyCondition::Between("B".into(), "D".into()).matches("D"));
        assert!(!SortKeyCondition::Between("B".into(), "D".into()).matches("E"));
        assert!(SortKeyCondition::Gt("B".into()).matches("C"));
        assert!(!SortKeyCondition::Gt("B".into()).matches("B"));
        assert!(SortKeyCondition::Gte("B".into()).matches("B"));
        assert!(SortKeyCondition::Lt("B".into()).matches("A"));
        assert!(SortKeyCondition::Lte("B".into()).matches("B"));
    }

    #[test]
    fn test_gsi_helpers_pick_attribute_pairs() {
        let query = AttributeQuery::gsi2("EMAIL#a@b.com");
        assert_eq!(query.attribute, "GSI2PK");
        assert_eq!(query.sort_attribute.as_deref(), Some("GSI2SK"));
    }
}
