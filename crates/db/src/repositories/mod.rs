//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. [`PgLookupSource`] is the one
//! stateful exception: it holds a pool so the import pipeline can use it
//! through the `LookupSource` trait.

pub mod amenity_repo;
pub mod campaign_repo;
pub mod concession_repo;
pub mod fee_repo;
pub mod lookup_repo;
pub mod program_repo;
pub mod property_repo;
pub mod source_repo;
pub mod team_repo;

pub use amenity_repo::AmenityRepo;
pub use campaign_repo::CampaignRepo;
pub use concession_repo::ConcessionRepo;
pub use fee_repo::FeeRepo;
pub use lookup_repo::PgLookupSource;
pub use program_repo::ProgramRepo;
pub use property_repo::PropertyRepo;
pub use source_repo::SourceRepo;
pub use team_repo::TeamRepo;
