//! Static sheet schemas and cell-type conversion.

use serde::Serialize;
use serde_json::{Number, Value};

use crate::import::coercion::translate_flag_cell_value;
use crate::import::row::Row;
use crate::validation::lexical::{cell_text, parse_float_prefix};

/// Declared type of a sheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    String,
    Number,
    Boolean,
    Array,
}

impl CellType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnHeader {
    pub header: &'static str,
    #[serde(rename = "type")]
    pub cell_type: CellType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<&'static str>,
}

impl ColumnHeader {
    pub const fn new(header: &'static str, cell_type: CellType) -> Self {
        Self {
            header,
            cell_type,
            metadata: None,
        }
    }

    pub const fn with_metadata(mut self, metadata: &'static str) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SheetSchema {
    pub workbook_sheet_name: &'static str,
    pub columns: &'static [ColumnHeader],
}

impl SheetSchema {
    /// Headers every row of this sheet is expected to carry.
    pub fn column_headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.header).collect()
    }

    pub fn column(&self, header: &str) -> Option<&ColumnHeader> {
        self.columns.iter().find(|c| c.header == header)
    }
}

// ── Conversion ───────────────────────────────────────────────────────

fn convert_cell(value: Value, column: &ColumnHeader) -> Value {
    if value.is_null() {
        return value;
    }
    match column.cell_type {
        CellType::String => match value {
            Value::String(_) => value,
            other => Value::String(cell_text(Some(&other))),
        },
        CellType::Number => {
            let parsed = match &value {
                Value::String(s) if s.is_empty() => None,
                Value::Number(_) => None,
                other => parse_float_prefix(&cell_text(Some(other))).and_then(Number::from_f64),
            };
            parsed.map(Value::Number).unwrap_or(value)
        }
        CellType::Boolean => translate_flag_cell_value(Some(&value))
            .map(Value::Bool)
            .unwrap_or(Value::Null),
        CellType::Array => value,
    }
}

/// Coerce every known column of every row to its declared type.
///
/// Unknown columns and `null` cells are left alone. A number column that
/// does not parse keeps its original text so validation can report it.
pub fn convert_entities_in_an_expected_type(rows: Vec<Row>, schema: Option<&SheetSchema>) -> Vec<Row> {
    let Some(schema) = schema else {
        return rows;
    };
    rows.into_iter()
        .map(|mut row| {
            let data = std::mem::take(&mut row.data);
            row.data = data
                .into_iter()
                .map(|(header, value)| match schema.column(&header) {
                    Some(column) => {
                        let converted = convert_cell(value, column);
                        (header, converted)
                    }
                    None => (header, value),
                })
                .collect();
            row
        })
        .collect()
}

// ── Schemas ──────────────────────────────────────────────────────────

use CellType::{Array as A, Boolean as B, Number as N, String as S};

const fn col(header: &'static str, cell_type: CellType) -> ColumnHeader {
    ColumnHeader::new(header, cell_type)
}

pub const AMENITIES: SheetSchema = SheetSchema {
    workbook_sheet_name: "Amenities",
    columns: &[
        col("name", S),
        col("property", S),
        col("category", S).with_metadata("AmenityCategory"),
        col("subCategory", S).with_metadata("AmenitySubCategory"),
        col("displayName", S),
        col("description", S),
        col("highValueFlag", B),
        col("relativePrice", N),
        col("absolutePrice", N),
        col("targetUnitFlag", B),
        col("hiddenFlag", B),
        col("externalId", S),
        col("endDate", S),
    ],
};

pub const FEES: SheetSchema = SheetSchema {
    workbook_sheet_name: "Fees",
    columns: &[
        col("name", S),
        col("property", S),
        col("displayName", S),
        col("description", S),
        col("feeType", S).with_metadata("FeeType"),
        col("renewalLetterDisplayFlag", B),
        col("quoteSectionName", S).with_metadata("QuoteSection"),
        col("maxQuantityInQuote", N),
        col("additionalFees", A),
        col("relatedFees", A),
        col("servicePeriod", S).with_metadata("ServicePeriod"),
        col("variableAdjustmentFlag", B),
        col("estimatedFlag", B),
        col("relativePrice", N),
        col("absolutePrice", N),
        col("relativeDefaultPrice", N),
        col("absoluteDefaultPrice", N),
        col("priceFloorCeiling", S),
        col("depositInterestFlag", B),
        col("quotePaymentScheduleFlag", B),
        col("leaseState", S).with_metadata("FeeLeaseState"),
        col("externalChargeCode", S),
        col("externalChargeAccount", S),
        col("externalChargeAccrualAccount", S),
        col("externalChargeNotes", S),
        col("externalChargeRef", S),
        col("externalReceiptAccount", S),
        col("externalReceiptAccrualAccount", S),
        col("externalReceiptOffset", S),
        col("externalReceiptNotes", S),
        col("externalReceiptRef", S),
        col("externalWaiverAccount", S),
        col("externalWaiverAccrualAccount", S),
        col("externalWaiverOffset", S),
        col("externalWaiverNotes", S),
        col("externalWaiverRef", S),
        col("marketingQuestionName", S),
    ],
};

pub const CONCESSIONS: SheetSchema = SheetSchema {
    workbook_sheet_name: "Concessions",
    columns: &[
        col("name", S),
        col("property", S),
        col("displayName", S),
        col("appliedToFees", S),
        col("relativeAdjustment", N),
        col("absoluteAdjustment", N),
        col("relativeDefaultAdjustment", N),
        col("absoluteDefaultAdjustment", N),
        col("adjustmentFloorCeiling", S),
        col("variableAdjustmentFlag", B),
        col("optionalFlag", B),
        col("excludeFromRentFlag", B),
        col("hideInSelfServiceFlag", B),
        col("recurringFlag", B),
        col("recurringCount", N),
        col("nonRecurringAppliedAt", S).with_metadata("NonRecurringApplied"),
        col("leaseState", S).with_metadata("LeaseState"),
        col("leaseNames", A),
        col("minLeaseLength", N),
        col("maxLeaseLength", N),
        col("layouts", A),
        col("buildings", S),
        col("amenities", A),
        col("startDate", S),
        col("endDate", S),
        col("account", N),
        col("subAccount", N),
        col("taxableFlag", B),
        col("externalChargeCode", S),
        col("bakedIntoAppliedFeeFlag", B),
    ],
};

pub const CAMPAIGNS: SheetSchema = SheetSchema {
    workbook_sheet_name: "Campaigns",
    columns: &[col("name", S), col("displayName", S), col("description", S)],
};

pub const PROGRAMS: SheetSchema = SheetSchema {
    workbook_sheet_name: "Programs",
    columns: &[
        col("name", S),
        col("displayName", S),
        col("reportingDisplayName", S),
        col("path", S),
        col("campaign", S),
        col("description", S),
        col("team", S),
        col("primaryProperty", S),
        col("onSiteLeasingTeam", S),
        col("source", S),
        col("directEmailIdentifier", S),
        col("outsideDedicatedEmails", S),
        col("displayEmail", S),
        col("directPhoneIdentifier", S),
        col("displayPhoneNumber", S),
        col("displayUrl", S),
        col("voiceMessage", S),
        col("requireMatchingPathFlag", B),
        col("defaultMatchingPath", S),
        col("requireMatchingSourceFlag", B),
        col("defaultMatchingSource", S),
        col("endDate", S),
        col("forwardingEnabledFlag", B),
        col("forwardEmailToExternalTarget", S),
        col("forwardCallToExternalTarget", S),
        col("forwardSMSToExternalTarget", S),
        col("enableBotResponseOnCommunications", B),
        col("activatePaymentPlan", B),
        col("gaIds", S),
        col("gaActions", S),
        col("programFallback", S),
        col("selectedProperties", A),
    ],
};
