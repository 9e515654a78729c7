//! Inventory model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO used for inserts and upserts

pub mod amenity;
pub mod campaign;
pub mod concession;
pub mod fee;
pub mod lookup;
pub mod program;
pub mod property;
pub mod source;
pub mod team;
