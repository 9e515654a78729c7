//! The row validation engine and its `validate` entry point.
//!
//! Rows are handled strictly in input order. For each row the field rules,
//! prerequisite checks and expected-header check run first; a row with any
//! violation is reported and skipped. Otherwise the handler's domain check
//! runs, and only when that is clean are the resolved ids merged into the row
//! and the row handed to the handler for persistence.

use async_trait::async_trait;

use super::error::{EntityError, ImportError};
use super::prerequisite::{
    check_prerequisites, fill_related_ids, resolve_related_ids, LookupSource, Prerequisite,
    RelatedIds,
};
use super::row::Row;
use crate::spreadsheet::SheetSchema;
use crate::types::RowData;
use crate::validation::evaluator::validate_fields;
use crate::validation::rules::{FieldRule, InvalidField, RowError};

/// The declarative part of an importer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportRules<'a> {
    pub fields: &'a [FieldRule],
    pub prerequisites: &'a [Prerequisite],
}

impl<'a> ImportRules<'a> {
    pub const fn new(fields: &'a [FieldRule], prerequisites: &'a [Prerequisite]) -> Self {
        Self {
            fields,
            prerequisites,
        }
    }
}

/// Caller-supplied hooks run by the engine.
#[async_trait]
pub trait ImportHandler: Send {
    /// Sheet-wide check run once before any row. Returned violations are
    /// reported without a row index; rows are still processed.
    async fn spreadsheet_check(&mut self) -> Result<Vec<InvalidField>, EntityError> {
        Ok(Vec::new())
    }

    /// Domain rules for a row that passed generic validation. Any returned
    /// violation keeps the row from being persisted.
    async fn custom_check(
        &mut self,
        _data: &mut RowData,
        _index: usize,
    ) -> Result<Vec<InvalidField>, EntityError> {
        Ok(Vec::new())
    }

    /// Persist a fully valid row, already enriched with resolved ids.
    async fn on_valid_entity(&mut self, data: &RowData, index: usize) -> Result<(), EntityError>;
}

/// Field rules plus prerequisite existence for one row.
pub fn validate_data(
    data: &RowData,
    fields: &[FieldRule],
    prerequisites: &[Prerequisite],
    related_ids: &RelatedIds,
) -> Vec<InvalidField> {
    let mut invalid = validate_fields(data, fields);
    invalid.extend(check_prerequisites(data, prerequisites, related_ids));
    invalid
}

/// Expected headers the row does not carry.
pub fn check_column_headers(data: &RowData, expected_headers: Option<&[&str]>) -> Vec<InvalidField> {
    expected_headers
        .unwrap_or_default()
        .iter()
        .filter(|header| !data.contains_key(**header))
        .map(|header| InvalidField::missing_column(*header))
        .collect()
}

async fn process_row<H>(
    data: &mut RowData,
    index: usize,
    rules: &ImportRules<'_>,
    related_ids: &RelatedIds,
    expected_headers: Option<&[&str]>,
    handler: &mut H,
) -> Result<Vec<InvalidField>, EntityError>
where
    H: ImportHandler + ?Sized,
{
    let mut invalid = validate_data(data, rules.fields, rules.prerequisites, related_ids);
    invalid.extend(check_column_headers(data, expected_headers));
    if !invalid.is_empty() {
        return Ok(invalid);
    }

    let custom_errors = handler.custom_check(data, index).await?;
    if !custom_errors.is_empty() {
        return Ok(custom_errors);
    }

    fill_related_ids(data, rules.prerequisites, related_ids);
    handler.on_valid_entity(data, index).await?;
    Ok(Vec::new())
}

/// Run the engine over already-resolved prerequisites.
pub async fn validate_and_process<H>(
    rows: Vec<Row>,
    rules: &ImportRules<'_>,
    related_ids: &RelatedIds,
    expected_headers: Option<&[&str]>,
    handler: &mut H,
) -> Result<Vec<RowError>, ImportError>
where
    H: ImportHandler + ?Sized,
{
    let mut invalid_rows = Vec::new();

    let sheet_errors = handler
        .spreadsheet_check()
        .await
        .map_err(|e| ImportError::SpreadsheetCheck(e.to_string()))?;
    if !sheet_errors.is_empty() {
        tracing::debug!(count = sheet_errors.len(), "Spreadsheet check failed");
        invalid_rows.push(RowError::sheet(sheet_errors));
    }

    for Row { index, mut data } in rows {
        let invalid = match process_row(&mut data, index, rules, related_ids, expected_headers, handler).await {
            Ok(invalid) => invalid,
            Err(e) => vec![e.into_invalid_field(&data)],
        };
        if !invalid.is_empty() {
            tracing::debug!(index, violations = invalid.len(), "Row rejected");
            invalid_rows.push(RowError::at(index, invalid));
        }
    }

    Ok(invalid_rows)
}

/// Validate a batch of rows and hand every valid one to `handler`.
///
/// Prerequisites are resolved once for the whole batch before any row is
/// processed. Returns only the rows that failed; a configuration or lookup
/// error aborts the batch.
pub async fn validate<S, H>(
    rows: Vec<Row>,
    rules: &ImportRules<'_>,
    source: &S,
    handler: &mut H,
    schema: Option<&SheetSchema>,
) -> Result<Vec<RowError>, ImportError>
where
    S: LookupSource + ?Sized,
    H: ImportHandler + ?Sized,
{
    let total = rows.len();
    tracing::info!(
        rows = total,
        prerequisites = rules.prerequisites.len(),
        sheet = schema.map(|s| s.workbook_sheet_name),
        "Validating import batch",
    );

    let related_ids = resolve_related_ids(&rows, rules.prerequisites, source).await?;
    let expected_headers = schema.map(|s| s.column_headers());
    let invalid =
        validate_and_process(rows, rules, &related_ids, expected_headers.as_deref(), handler).await?;

    tracing::info!(rows = total, invalid = invalid.len(), "Import batch validated");
    Ok(invalid)
}
