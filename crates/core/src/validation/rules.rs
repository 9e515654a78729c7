//! Validation rule and result types.

use serde::{Deserialize, Serialize};

use crate::dal_types::EnumMapping;

// ── Error tokens ─────────────────────────────────────────────────────

pub const FIELD_REQUIRED: &str = "FIELD_REQUIRED";
pub const INVALID_VALUE: &str = "INVALID_VALUE";
pub const ONE_OF_THIS_FIELDS_REQUIRED: &str = "ONE_OF_THIS_FIELDS_REQUIRED";
pub const INVALID_LENGTH: &str = "INVALID_LENGTH";
pub const NOT_A_NUMBER: &str = "NOT_A_NUMBER";
pub const NOT_INTEGER: &str = "NOT_INTEGER";
pub const NOT_POSITIVE_INTEGER: &str = "NOT_POSITIVE_INTEGER";
pub const NOT_POSITIVE_DECIMAL: &str = "NOT_POSITIVE_DECIMAL";
pub const NOT_NEGATIVE_DECIMAL: &str = "NOT_NEGATIVE_DECIMAL";
pub const NOT_BOOLEAN: &str = "NOT_BOOLEAN";
pub const INVALID_DATE: &str = "INVALID_DATE";
pub const INVALID_EMAIL: &str = "INVALID_EMAIL";
pub const INVALID_CURRENCY: &str = "INVALID_CURRENCY";
pub const INVALID_NUMERIC_ARRAY: &str = "INVALID_NUMERIC_ARRAY";
pub const INVALID_MAIL_ARRAY: &str = "INVALID_MAIL_ARRAY";
pub const INVALID_MIN_VALUE: &str = "INVALID_MIN_VALUE";
pub const INVALID_MAX_VALUE: &str = "INVALID_MAX_VALUE";
pub const INVALID_DECIMAL: &str = "INVALID_DECIMAL";
pub const INVALID_SHORTHAND_NAME: &str = "INVALID_SHORTHAND_NAME";
pub const INVALID_PHONE_NUMBER: &str = "INVALID_PHONE_NUMBER";
pub const INVALID_POSTAL_CODE: &str = "INVALID_POSTAL_CODE";
pub const INVALID_PERCENTAGE_VALUE: &str = "INVALID_PERCENTAGE_VALUE";
pub const INVALID_INVENTORY_NAME: &str = "INVALID_INVENTORY_NAME";
pub const INVALID_TIME_ZONE: &str = "INVALID_TIME_ZONE";
pub const INVALID_URL: &str = "INVALID_URL";

pub const ELEMENT_DOESNT_EXIST: &str = "ELEMENT_DOESNT_EXIST";
pub const MISSING_COLUMN: &str = "MISSING_COLUMN";

// ── Validation kinds ─────────────────────────────────────────────────

/// A named check from the validator registry.
///
/// The serialized names are the tokens used by existing rule definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationKind {
    #[serde(rename = "notEmpty")]
    NotEmpty,
    #[serde(rename = "existsIn")]
    ExistsIn,
    #[serde(rename = "atLeastOneNotEmpty")]
    AtLeastOneNotEmpty,
    /// Historically called "alphanumeric" (`string`); it only bounds the
    /// trimmed length by the rule's `max_length`.
    #[serde(rename = "string")]
    MaxLength,
    #[serde(rename = "integer")]
    Integer,
    #[serde(rename = "positiveInteger")]
    PositiveInteger,
    #[serde(rename = "decimal")]
    Decimal,
    #[serde(rename = "positiveDecimal")]
    PositiveDecimal,
    #[serde(rename = "negativeDecimal")]
    NegativeDecimal,
    #[serde(rename = "numeric")]
    Numeric,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "mail")]
    Mail,
    #[serde(rename = "currency")]
    Currency,
    #[serde(rename = "numericArray")]
    NumericArray,
    #[serde(rename = "mailArray")]
    MailArray,
    #[serde(rename = "minValue")]
    MinValue,
    #[serde(rename = "maxValue")]
    MaxValue,
    #[serde(rename = "validShorthand")]
    Shorthand,
    #[serde(rename = "phoneNumber")]
    PhoneNumber,
    #[serde(rename = "postalCode")]
    PostalCode,
    #[serde(rename = "percentage")]
    Percentage,
    #[serde(rename = "inventoryName")]
    InventoryName,
    #[serde(rename = "timeZone")]
    TimeZone,
    #[serde(rename = "url")]
    Url,
}

impl ValidationKind {
    /// Token reported when this check fails.
    pub fn error_token(&self) -> &'static str {
        match self {
            Self::NotEmpty => FIELD_REQUIRED,
            Self::ExistsIn => INVALID_VALUE,
            Self::AtLeastOneNotEmpty => ONE_OF_THIS_FIELDS_REQUIRED,
            Self::MaxLength => INVALID_LENGTH,
            Self::Integer => NOT_INTEGER,
            Self::PositiveInteger => NOT_POSITIVE_INTEGER,
            Self::Decimal => INVALID_DECIMAL,
            Self::PositiveDecimal => NOT_POSITIVE_DECIMAL,
            Self::NegativeDecimal => NOT_NEGATIVE_DECIMAL,
            Self::Numeric => NOT_A_NUMBER,
            Self::Boolean => NOT_BOOLEAN,
            Self::Date => INVALID_DATE,
            Self::Mail => INVALID_EMAIL,
            Self::Currency => INVALID_CURRENCY,
            Self::NumericArray => INVALID_NUMERIC_ARRAY,
            Self::MailArray => INVALID_MAIL_ARRAY,
            Self::MinValue => INVALID_MIN_VALUE,
            Self::MaxValue => INVALID_MAX_VALUE,
            Self::Shorthand => INVALID_SHORTHAND_NAME,
            Self::PhoneNumber => INVALID_PHONE_NUMBER,
            Self::PostalCode => INVALID_POSTAL_CODE,
            Self::Percentage => INVALID_PERCENTAGE_VALUE,
            Self::InventoryName => INVALID_INVENTORY_NAME,
            Self::TimeZone => INVALID_TIME_ZONE,
            Self::Url => INVALID_URL,
        }
    }
}

// ── Field rules ──────────────────────────────────────────────────────

/// Which cell(s) a rule reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldTarget {
    Single(&'static str),
    /// Multi-field rules (`atLeastOneNotEmpty`) report every listed field.
    Many(&'static [&'static str]),
}

/// A declarative validation rule for one column (or a group of columns).
///
/// Rules are built in `const` context so each importer can declare its table
/// as a static slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRule {
    pub target: FieldTarget,
    pub validations: &'static [ValidationKind],
    pub max_length: Option<usize>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub valid_values: Option<EnumMapping>,
    /// Column name to report instead of the field name.
    pub excel_column: Option<&'static str>,
}

impl FieldRule {
    pub const fn new(field: &'static str, validations: &'static [ValidationKind]) -> Self {
        Self {
            target: FieldTarget::Single(field),
            validations,
            max_length: None,
            min_value: None,
            max_value: None,
            valid_values: None,
            excel_column: None,
        }
    }

    pub const fn group(fields: &'static [&'static str], validations: &'static [ValidationKind]) -> Self {
        Self {
            target: FieldTarget::Many(fields),
            ..Self::new("", validations)
        }
    }

    pub const fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub const fn min_value(mut self, min_value: f64) -> Self {
        self.min_value = Some(min_value);
        self
    }

    pub const fn max_value(mut self, max_value: f64) -> Self {
        self.max_value = Some(max_value);
        self
    }

    pub const fn valid_values(mut self, valid_values: EnumMapping) -> Self {
        self.valid_values = Some(valid_values);
        self
    }

    pub const fn excel_column(mut self, column: &'static str) -> Self {
        self.excel_column = Some(column);
        self
    }

    /// The single field this rule reads, if it is not a group rule.
    pub fn field_name(&self) -> Option<&'static str> {
        match self.target {
            FieldTarget::Single(name) => Some(name),
            FieldTarget::Many(_) => None,
        }
    }
}

// ── Results ──────────────────────────────────────────────────────────

/// Where a row-level violation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A registry validator rejected the cell.
    Field,
    /// A referenced entity name did not resolve to an id.
    Prerequisite,
    /// An expected sheet column is absent from the row.
    MissingColumn,
    /// Returned by an importer's domain checks.
    Custom,
    /// A unique constraint fired while persisting the row.
    DuplicateKey,
    /// Any other failure while checking or persisting the row.
    Unexpected,
}

/// A single violation attached to a named field (or sheet-level token).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidField {
    pub name: String,
    pub message: String,
    pub kind: ViolationKind,
}

impl InvalidField {
    pub fn new(name: impl Into<String>, message: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            kind,
        }
    }

    pub fn field(name: impl Into<String>, token: &str) -> Self {
        Self::new(name, token, ViolationKind::Field)
    }

    pub fn prerequisite(name: impl Into<String>) -> Self {
        Self::new(name, ELEMENT_DOESNT_EXIST, ViolationKind::Prerequisite)
    }

    pub fn missing_column(header: impl Into<String>) -> Self {
        Self::new(header, MISSING_COLUMN, ViolationKind::MissingColumn)
    }

    pub fn custom(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, message, ViolationKind::Custom)
    }
}

/// All violations for one input row.
///
/// `index` is absent for sheet-wide failures reported before any row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub invalid_fields: Vec<InvalidField>,
}

impl RowError {
    pub fn at(index: usize, invalid_fields: Vec<InvalidField>) -> Self {
        Self {
            index: Some(index),
            invalid_fields,
        }
    }

    pub fn sheet(invalid_fields: Vec<InvalidField>) -> Self {
        Self {
            index: None,
            invalid_fields,
        }
    }
}
