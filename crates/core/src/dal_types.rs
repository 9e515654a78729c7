//! Enumerated values accepted by the inventory spreadsheets.
//!
//! Each catalog maps a stable key (`SERVICE`) to the canonical value stored in
//! the database (`service`). Spreadsheet cells may use either form in any
//! letter case.

use serde::{Serialize, Serializer};

/// A constant key/value catalog for a spreadsheet enum column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumMapping(pub &'static [(&'static str, &'static str)]);

impl EnumMapping {
    /// Whether `candidate` matches any key or value, ignoring letter case.
    pub fn contains(&self, candidate: &str) -> bool {
        self.0.iter().any(|(key, value)| {
            key.eq_ignore_ascii_case(candidate) || value.eq_ignore_ascii_case(candidate)
        })
    }

    /// Canonical value for `raw` (trimmed, case-insensitive).
    ///
    /// A value match wins; otherwise a key match yields that key's value.
    /// Returns `None` for empty input or when nothing matches.
    pub fn canonical(&self, raw: &str) -> Option<&'static str> {
        let wanted = raw.trim();
        if wanted.is_empty() {
            return None;
        }
        self.0
            .iter()
            .find(|(_, value)| value.eq_ignore_ascii_case(wanted))
            .or_else(|| self.0.iter().find(|(key, _)| key.eq_ignore_ascii_case(wanted)))
            .map(|(_, value)| *value)
    }

    /// All canonical values in declaration order.
    pub fn values(&self) -> impl Iterator<Item = &'static str> {
        self.0.iter().map(|(_, value)| *value)
    }
}

impl Serialize for EnumMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.values())
    }
}

// ── Fees ─────────────────────────────────────────────────────────────

pub const FEE_TYPE_APPLICATION: &str = "application";
pub const FEE_TYPE_WAIVER_APPLICATION: &str = "waiverApplication";
pub const FEE_TYPE_DEPOSIT: &str = "deposit";
pub const FEE_TYPE_INVENTORY_GROUP: &str = "inventoryGroup";
pub const FEE_TYPE_LEASE_BREAK: &str = "leaseBreak";
pub const FEE_TYPE_PENALTY: &str = "penalty";
pub const FEE_TYPE_SERVICE: &str = "service";
pub const FEE_TYPE_HOLD_DEPOSIT: &str = "holdDeposit";

pub const FEE_TYPE: EnumMapping = EnumMapping(&[
    ("APPLICATION", FEE_TYPE_APPLICATION),
    ("WAIVER_APPLICATION", FEE_TYPE_WAIVER_APPLICATION),
    ("DEPOSIT", FEE_TYPE_DEPOSIT),
    ("INVENTORY_GROUP", FEE_TYPE_INVENTORY_GROUP),
    ("LEASE_BREAK", FEE_TYPE_LEASE_BREAK),
    ("PENALTY", FEE_TYPE_PENALTY),
    ("SERVICE", FEE_TYPE_SERVICE),
    ("HOLD_DEPOSIT", FEE_TYPE_HOLD_DEPOSIT),
]);

pub const SERVICE_PERIOD_ONE_TIME: &str = "oneTime";

pub const SERVICE_PERIOD: EnumMapping = EnumMapping(&[
    ("ONE_TIME", SERVICE_PERIOD_ONE_TIME),
    ("MONTH", "month"),
    ("WEEK", "week"),
    ("DAY", "day"),
    ("HOUR", "hour"),
]);

pub const QUOTE_SECTION: EnumMapping = EnumMapping(&[
    ("APPLICATION", "application"),
    ("INVENTORY", "inventory"),
    ("PARKING", "parking"),
    ("SERVICE", "service"),
    ("DEPOSIT", "deposit"),
    ("APPLIANCE", "appliance"),
    ("PET", "pet"),
    ("PENALTY", "penalty"),
    ("STORAGE", "storage"),
    ("UTILITY", "utility"),
]);

pub const FEE_LEASE_STATE: EnumMapping = EnumMapping(&[("NEW", "new"), ("RENEWAL", "renewal")]);

// ── Leases / concessions ─────────────────────────────────────────────

pub const LEASE_STATE: EnumMapping = EnumMapping(&[
    ("NEW", "new"),
    ("RENEWAL", "renewal"),
    ("MONTH_TO_MONTH", "month-to-month"),
]);

pub const NON_RECURRING_APPLIED: EnumMapping = EnumMapping(&[
    ("FIRST", "first"),
    ("LAST", "last"),
    ("FIRST_FULL", "firstFull"),
]);

// ── Amenities ────────────────────────────────────────────────────────

pub const AMENITY_CATEGORY: EnumMapping = EnumMapping(&[
    ("BUILDING", "building"),
    ("INVENTORY", "inventory"),
    ("PROPERTY", "property"),
]);

pub const AMENITY_SUB_CATEGORY: EnumMapping = EnumMapping(&[
    ("ACCESSIBILITY", "accessibility"),
    ("APPLIANCES", "appliances"),
    ("BATH", "bath"),
    ("COMFORT", "comfort"),
    ("ELEVATION", "elevation"),
    ("ENVIRONMENT_FRIENDLY", "environmentFriendly"),
    ("ENVIRONMENT", "environment"),
    ("FINANCIAL", "financial"),
    ("FLOORING", "flooring"),
    ("KITCHEN", "kitchen"),
    ("LIFESTYLE", "lifestyle"),
    ("LIVING_SPACE", "livingSpace"),
    ("PARKING", "parking"),
    ("RESIDENT_EXPERIENCE", "residentExperience"),
    ("RESIDENT_SERVICE", "residentService"),
    ("SECURITY", "security"),
    ("STORAGE", "storage"),
    ("TECHNOLOGY", "technology"),
    ("UPGRADES", "upgrades"),
    ("UTILITIES_CABLE", "utilitiesAndCable"),
    ("VIEW", "view"),
    ("WINDOWS", "windows"),
]);
