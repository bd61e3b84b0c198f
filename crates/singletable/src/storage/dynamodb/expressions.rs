//! Rendering of conditions, updates and key conditions into DynamoDB
//! expression strings with placeholder maps.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue as DynamoValue;
use singletable_core::item::AttributeValue;
use singletable_core::storage::{AttributeUpdates, Condition, SortKeyCondition};

use super::conversions::to_dynamo_value;

/// Collects `#nN` name and `:vN` value placeholders shared by every
/// expression of one request.
#[derive(Debug, Default)]
pub struct ExpressionBuilder {
    names: HashMap<String, String>,
    values: HashMap<String, DynamoValue>,
}

impl ExpressionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Placeholder for an attribute name. Repeated names share one placeholder.
    pub fn name(&mut self, attribute: &str) -> String {
        if let Some((placeholder, _)) = self.names.iter().find(|(_, name)| *name == attribute) {
            return placeholder.clone();
        }
        let placeholder = format!("#n{}", self.names.len());
        self.names.insert(placeholder.clone(), attribute.to_string());
        placeholder
    }

    pub fn value(&mut self, value: &AttributeValue) -> String {
        let placeholder = format!(":v{}", self.values.len());
        self.values.insert(placeholder.clone(), to_dynamo_value(value));
        placeholder
    }

    fn string_value(&mut self, value: &str) -> String {
        self.value(&AttributeValue::S(value.to_string()))
    }

    pub fn condition(&mut self, condition: &Condition) -> String {
        match condition {
            Condition::AttributeExists(attribute) => {
                format!("attribute_exists({})", self.name(attribute))
            }
            Condition::AttributeNotExists(attribute) => {
                format!("attribute_not_exists({})", self.name(attribute))
            }
            Condition::Equals(attribute, value) => {
                let name = self.name(attribute);
                format!("{name} = {}", self.value(value))
            }
            Condition::And(parts) => parts
                .iter()
                .map(|part| format!("({})", self.condition(part)))
                .collect::<Vec<_>>()
                .join(" AND "),
        }
    }

    /// `SET #n0 = :v0, #n1 = :v1` for every attribute in `set`.
    pub fn update_set(&mut self, set: &AttributeUpdates) -> String {
        let assignments: Vec<String> = set
            .iter()
            .map(|(attribute, value)| {
                let name = self.name(attribute);
                format!("{name} = {}", self.value(value))
            })
            .collect();
        format!("SET {}", assignments.join(", "))
    }

    /// Equality on the partition attribute, optionally narrowed on the sort attribute.
    pub fn key_condition(
        &mut self,
        partition_attribute: &str,
        partition_value: &str,
        sort: Option<(&str, &SortKeyCondition)>,
    ) -> String {
        let name = self.name(partition_attribute);
        let mut expression = format!("{name} = {}", self.string_value(partition_value));

        if let Some((sort_attribute, condition)) = sort {
            let sort_name = self.name(sort_attribute);
            let clause = match condition {
                SortKeyCondition::Eq(v) => format!("{sort_name} = {}", self.string_value(v)),
                SortKeyCondition::BeginsWith(prefix) => {
                    format!("begins_with({sort_name}, {})", self.string_value(prefix))
                }
                SortKeyCondition::Between(low, high) => {
                    let low = self.string_value(low);
                    format!("{sort_name} BETWEEN {low} AND {}", self.string_value(high))
                }
                SortKeyCondition::Gt(v) => format!("{sort_name} > {}", self.string_value(v)),
                SortKeyCondition::Gte(v) => format!("{sort_name} >= {}", self.string_value(v)),
                SortKeyCondition::Lt(v) => format!("{sort_name} < {}", self.string_value(v)),
                SortKeyCondition::Lte(v) => format!("{sort_name} <= {}", self.string_value(v)),
            };
            expression.push_str(" AND ");
            expression.push_str(&clause);
        }

        expression
    }

    /// Name and value maps, `None` when empty as the SDK rejects empty maps.
    pub fn into_parts(
        self,
    ) -> (
        Option<HashMap<String, String>>,
        Option<HashMap<String, DynamoValue>>,
    ) {
        let names = (!self.names.is_empty()).then_some(self.names);
        let values = (!self.values.is_empty()).then_some(self.values);
        (names, values)
    }
}

/// Secondary index serving a partition attribute: `GSI1PK` is served by `GSI1`.
pub fn index_for(partition_attribute: &str) -> Option<&str> {
    partition_attribute
        .strip_suffix("PK")
        .filter(|index| index.starts_with("GSI") && index.len() > 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_condition() {
        let mut builder = ExpressionBuilder::new();
        let expression = builder.condition(&Condition::attribute_not_exists("PK"));

        assert_eq!(expression, "attribute_not_exists(#n0)");
        let (names, values) = builder.into_parts();
        assert_eq!(names.unwrap().get("#n0").map(String::as_str), Some("PK"));
        assert!(values.is_none());
    }

    #[test]
    fn test_guarded_update_shares_placeholders() {
        let mut builder = ExpressionBuilder::new();
        let set = AttributeUpdates::from([
            ("Status".to_string(), AttributeValue::from("PROCESSING")),
            ("UpdatedAt".to_string(), AttributeValue::N(5.0)),
        ]);
        let update = builder.update_set(&set);
        let condition = builder.condition(
            &Condition::attribute_exists("PK").and(Condition::equals("Status", "PENDING")),
        );

        assert_eq!(update, "SET #n0 = :v0, #n1 = :v1");
        assert_eq!(condition, "(attribute_exists(#n2)) AND (#n0 = :v2)");

        let (names, values) = builder.into_parts();
        assert_eq!(names.unwrap().len(), 3);
        let values = values.unwrap();
        assert_eq!(values.get(":v2"), Some(&DynamoValue::S("PENDING".to_string())));
        assert_eq!(values.get(":v1"), Some(&DynamoValue::N("5".to_string())));
    }

    #[test]
    fn test_key_condition_with_sort_operators() {
        let mut builder = ExpressionBuilder::new();
        let expression = builder.key_condition(
            "GSI1PK",
            "user-1",
            Some(("GSI1SK", &SortKeyCondition::BeginsWith("Holding#".to_string()))),
        );
        assert_eq!(expression, "#n0 = :v0 AND begins_with(#n1, :v1)");

        let mut builder = ExpressionBuilder::new();
        let expression = builder.key_condition(
            "PK",
            "USER#1",
            Some((
                "SK",
                &SortKeyCondition::Between("ALERT#".to_string(), "ALERT#~".to_string()),
            )),
        );
        assert_eq!(expression, "#n0 = :v0 AND #n1 BETWEEN :v1 AND :v2");

        let mut builder = ExpressionBuilder::new();
        assert_eq!(builder.key_condition("PK", "JOB#1", None), "#n0 = :v0");
    }

    #[test]
    fn test_index_for_partition_attribute() {
        assert_eq!(index_for("GSI1PK"), Some("GSI1"));
        assert_eq!(index_for("GSI3PK"), Some("GSI3"));
        assert_eq!(index_for("PK"), None);
        assert_eq!(index_for("Status"), None);
    }
}
