//! Campaigns sheet.

use super::column_length;
use crate::import::pipeline::ImportRules;
use crate::validation::rules::{FieldRule, ValidationKind::*};

pub const FIELDS: &[FieldRule] = &[
    FieldRule::new("name", &[NotEmpty, MaxLength]).max_length(column_length::NAME),
    FieldRule::new("displayName", &[NotEmpty, MaxLength]).max_length(column_length::NAME),
    FieldRule::new("description", &[MaxLength]).max_length(column_length::DESCRIPTION),
];

pub const RULES: ImportRules<'static> = ImportRules::new(FIELDS, &[]);
