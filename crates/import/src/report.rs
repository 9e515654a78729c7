//! The result handed back to the caller of an import.

use leasehold_core::validation::rules::RowError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rows that failed, and the entities persisted from the rows that did not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub invalid_fields: Vec<RowError>,
    pub valid_fields: Vec<Value>,
}

impl ImportOutcome {
    pub fn new<T: Serialize>(
        invalid_fields: Vec<RowError>,
        persisted: &[T],
    ) -> Result<Self, serde_json::Error> {
        let valid_fields = persisted
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            invalid_fields,
            valid_fields,
        })
    }

    /// Whether every row was imported.
    pub fn is_clean(&self) -> bool {
        self.invalid_fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leasehold_core::validation::rules::InvalidField;
    use serde_json::json;

    #[test]
    fn serializes_with_camel_case_keys() {
        let outcome = ImportOutcome::new(
            vec![RowError::at(3, vec![InvalidField::field("name", "FIELD_REQUIRED")])],
            &[json!({"name": "Campaign1"})],
        )
        .unwrap();

        assert!(!outcome.is_clean());
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "invalidFields": [{
                    "index": 3,
                    "invalidFields": [{"name": "name", "message": "FIELD_REQUIRED", "kind": "field"}]
                }],
                "validFields": [{"name": "Campaign1"}]
            })
        );
    }
}
