//! Import one inventory sheet from a JSON row file.
//!
//! ```text
//! leasehold-import <amenity|fee|concession|program|campaign> <rows.json>
//! ```
//!
//! The file holds an array of row objects keyed by column header. The
//! report (`invalidFields` and `validFields`) is printed to stdout.

use leasehold_core::types::RowData;
use leasehold_import::config::{ImportConfig, LogFormat};
use leasehold_import::error::{AppError, AppResult};
use leasehold_import::importers::ImportOptions;
use leasehold_import::{import_rows, Entity};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> AppResult<()> {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ImportConfig::from_env()?;

    // --- Tracing ---
    let json = config.log_format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leasehold_import=info,leasehold_core=info".into()),
        )
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .init();

    // --- Arguments ---
    let mut args = std::env::args().skip(1);
    let (Some(entity), Some(path)) = (args.next(), args.next()) else {
        return Err(AppError::Config(
            "usage: leasehold-import <amenity|fee|concession|program|campaign> <rows.json>".into(),
        ));
    };
    let entity: Entity = entity.parse()?;
    let rows: Vec<RowData> = serde_json::from_str(&tokio::fs::read_to_string(&path).await?)?;
    tracing::info!(sheet = %entity, rows = rows.len(), path = %path, "Rows loaded");

    // --- Database ---
    let pool = leasehold_db::create_pool(&config.database_url, config.max_connections).await?;
    leasehold_db::health_check(&pool).await?;
    tracing::info!("Database connection established");

    if config.run_migrations {
        leasehold_db::run_migrations(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    // --- Import ---
    let outcome = import_rows(&pool, entity, rows, ImportOptions::from(&config)).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    pool.close().await;
    Ok(())
}
