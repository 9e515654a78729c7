//! Bulk resolution of foreign-key names referenced by spreadsheet rows.
//!
//! Each prerequisite is looked up once per batch: one query for every
//! standalone prerequisite and one for every related prerequisite, however
//! many rows reference it. Rows then resolve their ids from the batch map.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::Value;

use super::error::ImportError;
use super::row::Row;
use crate::error::CoreError;
use crate::types::{DbId, RowData};
use crate::validation::evaluator::get_field_value;
use crate::validation::lexical::{cell_text, is_blank};
use crate::validation::rules::InvalidField;

// ── Configuration ────────────────────────────────────────────────────

/// A foreign-key lookup: resolve the row's `field` against
/// `table.table_field_name` and store the id under `id_receiver`.
///
/// A related prerequisite is additionally scoped by the id another
/// prerequisite resolved: the row's `related_table_field_name` value must
/// equal the candidate's `related_table_field_name` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prerequisite {
    pub field: &'static str,
    pub table_field_name: &'static str,
    pub table: &'static str,
    pub id_receiver: &'static str,
    pub related_field: Option<&'static str>,
    pub related_table_field_name: Option<&'static str>,
}

impl Prerequisite {
    pub const fn new(
        field: &'static str,
        table_field_name: &'static str,
        table: &'static str,
        id_receiver: &'static str,
    ) -> Self {
        Self {
            field,
            table_field_name,
            table,
            id_receiver,
            related_field: None,
            related_table_field_name: None,
        }
    }

    pub const fn related_to(
        mut self,
        related_field: &'static str,
        related_table_field_name: &'static str,
    ) -> Self {
        self.related_field = Some(related_field);
        self.related_table_field_name = Some(related_table_field_name);
        self
    }

    pub fn is_related(&self) -> bool {
        self.related_field.is_some()
    }
}

// ── Lookup results ───────────────────────────────────────────────────

/// One candidate returned by a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRow {
    pub id: DbId,
    /// The `table_field_name` column.
    pub value: String,
    /// The `related_table_field_name` column, for related lookups.
    pub related_id: Option<DbId>,
}

impl LookupRow {
    pub fn new(id: DbId, value: impl Into<String>) -> Self {
        Self {
            id,
            value: value.into(),
            related_id: None,
        }
    }

    pub fn related(id: DbId, value: impl Into<String>, related_id: DbId) -> Self {
        Self {
            id,
            value: value.into(),
            related_id: Some(related_id),
        }
    }

    fn matches(&self, wanted: &str) -> bool {
        self.value.trim().to_lowercase() == wanted
    }
}

/// Lookup candidates for one batch, keyed by prerequisite field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelatedIds(HashMap<String, Vec<LookupRow>>);

impl RelatedIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, rows: Vec<LookupRow>) {
        self.0.insert(field.into(), rows);
    }

    pub fn get(&self, field: &str) -> &[LookupRow] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Set-based lookups the resolver issues against storage.
#[async_trait]
pub trait LookupSource: Send + Sync {
    /// Rows of `table` whose `field` matches any of `values`, ignoring case.
    async fn select_id_and_field_from_value_list(
        &self,
        table: &str,
        field: &str,
        values: &[String],
    ) -> Result<Vec<LookupRow>, CoreError>;

    /// Rows of `table` matching any `(related id, name)` pair on
    /// `(related_field, field)`. Names compare case-insensitively.
    async fn select_id_from_value_groups(
        &self,
        table: &str,
        related_field: &str,
        field: &str,
        groups: &[(DbId, String)],
    ) -> Result<Vec<LookupRow>, CoreError>;
}

// ── Resolution ───────────────────────────────────────────────────────

/// Check that every related prerequisite points at a standalone one.
///
/// Only two levels are supported, so a related prerequisite may not depend on
/// another related prerequisite.
pub fn validate_prerequisites(prerequisites: &[Prerequisite]) -> Result<(), ImportError> {
    for prerequisite in prerequisites.iter().filter(|p| p.is_related()) {
        let parent = related_parent(prerequisite, prerequisites);
        if !parent.is_some_and(|p| !p.is_related()) || prerequisite.related_table_field_name.is_none() {
            return Err(ImportError::InvalidRelatedPrerequisite {
                field: prerequisite.field.to_string(),
            });
        }
    }
    Ok(())
}

fn related_parent<'a>(
    prerequisite: &Prerequisite,
    prerequisites: &'a [Prerequisite],
) -> Option<&'a Prerequisite> {
    let related_field = prerequisite.related_field?;
    prerequisites.iter().find(|p| p.field == related_field)
}

/// Standalone prerequisites first, then related ones, each in declared order.
pub fn sort_prerequisites(prerequisites: &[Prerequisite]) -> Vec<&Prerequisite> {
    let (standalone, related): (Vec<_>, Vec<_>) = prerequisites.iter().partition(|p| !p.is_related());
    standalone.into_iter().chain(related).collect()
}

fn normalized(value: Option<&Value>) -> Option<String> {
    if is_blank(value) {
        return None;
    }
    Some(cell_text(value).trim().to_string())
}

/// Resolve every prerequisite for the batch.
///
/// Fails without touching storage when the configuration is invalid.
pub async fn resolve_related_ids<S>(
    rows: &[Row],
    prerequisites: &[Prerequisite],
    source: &S,
) -> Result<RelatedIds, ImportError>
where
    S: LookupSource + ?Sized,
{
    let mut related_ids = RelatedIds::new();
    if prerequisites.is_empty() {
        return Ok(related_ids);
    }
    validate_prerequisites(prerequisites)?;

    for prerequisite in prerequisites.iter().filter(|p| !p.is_related()) {
        let mut seen = HashSet::new();
        let values: Vec<String> = rows
            .iter()
            .filter_map(|row| normalized(get_field_value(&row.data, prerequisite.field)))
            .filter(|value| seen.insert(value.clone()))
            .collect();

        let found = if values.is_empty() {
            Vec::new()
        } else {
            source
                .select_id_and_field_from_value_list(
                    prerequisite.table,
                    prerequisite.table_field_name,
                    &values,
                )
                .await
                .map_err(|e| ImportError::Lookup {
                    column: prerequisite.field.to_string(),
                    message: e.to_string(),
                })?
        };

        tracing::debug!(
            field = prerequisite.field,
            table = prerequisite.table,
            requested = values.len(),
            found = found.len(),
            "Resolved prerequisite",
        );
        related_ids.insert(prerequisite.field, found);
    }

    for prerequisite in prerequisites.iter().filter(|p| p.is_related()) {
        let Some(parent) = related_parent(prerequisite, prerequisites) else {
            continue;
        };
        let Some(related_table_field_name) = prerequisite.related_table_field_name else {
            continue;
        };

        let mut seen = HashSet::new();
        let mut groups = Vec::new();
        for row in rows {
            let Some(parent_value) = normalized(get_field_value(&row.data, parent.field)) else {
                continue;
            };
            let parent_value = parent_value.to_lowercase();
            let Some(parent_row) = related_ids
                .get(parent.field)
                .iter()
                .find(|candidate| candidate.matches(&parent_value))
            else {
                continue;
            };
            let Some(value) = normalized(get_field_value(&row.data, prerequisite.field)) else {
                continue;
            };
            if seen.insert((parent_row.id, value.to_lowercase())) {
                groups.push((parent_row.id, value));
            }
        }

        let found = if groups.is_empty() {
            Vec::new()
        } else {
            source
                .select_id_from_value_groups(
                    prerequisite.table,
                    related_table_field_name,
                    prerequisite.table_field_name,
                    &groups,
                )
                .await
                .map_err(|e| ImportError::Lookup {
                    column: prerequisite.field.to_string(),
                    message: e.to_string(),
                })?
        };

        tracing::debug!(
            field = prerequisite.field,
            related_field = parent.field,
            table = prerequisite.table,
            requested = groups.len(),
            found = found.len(),
            "Resolved related prerequisite",
        );
        related_ids.insert(prerequisite.field, found);
    }

    Ok(related_ids)
}

// ── Per-row ──────────────────────────────────────────────────────────

fn id_value(value: Option<&Value>) -> Option<DbId> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Id the row's value resolves to, or `None` when the cell is blank, nothing
/// matches, or (for related prerequisites) the related id is not yet set on
/// the row.
pub fn get_id_from_prerequisite(
    data: &RowData,
    prerequisite: &Prerequisite,
    related_ids: &RelatedIds,
) -> Option<DbId> {
    let wanted = normalized(get_field_value(data, prerequisite.field))?.to_lowercase();
    let candidates = related_ids.get(prerequisite.field);

    let found = match prerequisite.related_table_field_name.filter(|_| prerequisite.is_related()) {
        None => candidates.iter().find(|c| c.matches(&wanted)),
        Some(related_table_field_name) => {
            let related_id = id_value(data.get(related_table_field_name))?;
            candidates
                .iter()
                .find(|c| c.related_id == Some(related_id) && c.matches(&wanted))
        }
    };
    found.map(|c| c.id)
}

/// Report every non-blank reference that does not resolve.
///
/// Works on a copy of the row so related prerequisites can see the ids their
/// parents resolved without mutating the caller's data.
pub fn check_prerequisites(
    data: &RowData,
    prerequisites: &[Prerequisite],
    related_ids: &RelatedIds,
) -> Vec<InvalidField> {
    let mut invalid = Vec::new();
    let mut scratch = data.clone();

    for prerequisite in sort_prerequisites(prerequisites) {
        let present = !is_blank(get_field_value(&scratch, prerequisite.field));
        match get_id_from_prerequisite(&scratch, prerequisite, related_ids) {
            Some(id) => {
                scratch.insert(prerequisite.id_receiver.to_string(), Value::from(id));
            }
            None if present => invalid.push(InvalidField::prerequisite(prerequisite.field)),
            None => {}
        }
    }

    invalid
}

/// Write each resolved id (or `null`) into the row under its `id_receiver`.
pub fn fill_related_ids(data: &mut RowData, prerequisites: &[Prerequisite], related_ids: &RelatedIds) {
    for prerequisite in sort_prerequisites(prerequisites) {
        let id = get_id_from_prerequisite(data, prerequisite, related_ids);
        data.insert(
            prerequisite.id_receiver.to_string(),
            id.map(Value::from).unwrap_or(Value::Null),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    const PROPERTY: Prerequisite = Prerequisite::new("property", "name", "properties", "property_id");
    const BUILDING: Prerequisite =
        Prerequisite::new("building", "name", "buildings", "building_id").related_to("property", "property_id");

    fn data(pairs: &[(&str, Value)]) -> RowData {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn related_ids() -> RelatedIds {
        let mut ids = RelatedIds::new();
        ids.insert("property", vec![LookupRow::new(1, "Parkmerced"), LookupRow::new(2, "Cove")]);
        ids.insert(
            "building",
            vec![LookupRow::related(10, "North", 1), LookupRow::related(20, "North", 2)],
        );
        ids
    }

    #[test]
    fn standalone_lookup_ignores_case_and_whitespace() {
        let row = data(&[("property", json!(" parkMERCED "))]);
        assert_eq!(get_id_from_prerequisite(&row, &PROPERTY, &related_ids()), Some(1));
    }

    #[test]
    fn blank_values_do_not_resolve_or_fail() {
        let row = data(&[("property", json!(""))]);
        assert_eq!(get_id_from_prerequisite(&row, &PROPERTY, &related_ids()), None);
        assert!(check_prerequisites(&row, &[PROPERTY], &related_ids()).is_empty());
    }

    #[test]
    fn related_lookup_requires_the_parent_id() {
        let without_parent = data(&[("building", json!("North"))]);
        assert_eq!(get_id_from_prerequisite(&without_parent, &BUILDING, &related_ids()), None);

        let with_parent = data(&[("building", json!("north")), ("property_id", json!(2))]);
        assert_eq!(get_id_from_prerequisite(&with_parent, &BUILDING, &related_ids()), Some(20));
    }

    #[test]
    fn check_resolves_parents_before_children() {
        let row = data(&[("building", json!("North")), ("property", json!("Cove"))]);
        assert!(check_prerequisites(&row, &[BUILDING, PROPERTY], &related_ids()).is_empty());
        assert!(!row.contains_key("property_id"));
    }

    #[test]
    fn check_reports_unknown_references() {
        let row = data(&[("building", json!("South")), ("property", json!("Cove"))]);
        let invalid = check_prerequisites(&row, &[PROPERTY, BUILDING], &related_ids());
        assert_eq!(invalid, vec![InvalidField::prerequisite("building")]);
    }

    #[test]
    fn fill_writes_ids_and_nulls() {
        let mut row = data(&[("property", json!("Parkmerced")), ("building", json!("South"))]);
        fill_related_ids(&mut row, &[BUILDING, PROPERTY], &related_ids());
        assert_eq!(row["property_id"], json!(1));
        assert_eq!(row["building_id"], Value::Null);
    }

    #[test]
    fn related_prerequisites_must_point_at_standalone_ones() {
        const ORPHAN: Prerequisite =
            Prerequisite::new("unit", "name", "inventory", "unit_id").related_to("floor", "floor_id");
        const NESTED: Prerequisite =
            Prerequisite::new("unit", "name", "inventory", "unit_id").related_to("building", "building_id");

        assert_matches!(
            validate_prerequisites(&[PROPERTY, ORPHAN]),
            Err(ImportError::InvalidRelatedPrerequisite { field }) if field == "unit"
        );
        assert_matches!(
            validate_prerequisites(&[PROPERTY, BUILDING, NESTED]),
            Err(ImportError::InvalidRelatedPrerequisite { .. })
        );
        assert!(validate_prerequisites(&[BUILDING, PROPERTY]).is_ok());
    }

    #[test]
    fn sort_puts_standalone_first() {
        let sorted = sort_prerequisites(&[BUILDING, PROPERTY]);
        assert_eq!(sorted.iter().map(|p| p.field).collect::<Vec<_>>(), vec!["property", "building"]);
    }
}
