use crate::error::{AppError, AppResult};

/// Log output format for the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Importer configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Postgres connection string.
    pub database_url: String,
    /// Pool size (default: `10`).
    pub max_connections: u32,
    /// Rows per bulk upsert transaction (default: `1000`).
    pub upsert_chunk_size: usize,
    /// Apply pending migrations at startup (default: `true`).
    pub run_migrations: bool,
    pub log_format: LogFormat,
}

impl ImportConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default    |
    /// |----------------------------|------------|
    /// | `DATABASE_URL`             | required   |
    /// | `DB_MAX_CONNECTIONS`       | `10`       |
    /// | `IMPORT_UPSERT_CHUNK_SIZE` | `1000`     |
    /// | `IMPORT_RUN_MIGRATIONS`    | `true`     |
    /// | `LOG_FORMAT`               | `text`     |
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let database_url = var("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| AppError::Config("DATABASE_URL must be set".into()))?;

        let max_connections = parse_or(&var, "DB_MAX_CONNECTIONS", 10)?;
        let upsert_chunk_size: usize = parse_or(&var, "IMPORT_UPSERT_CHUNK_SIZE", 1000)?;
        if upsert_chunk_size == 0 {
            return Err(AppError::Config("IMPORT_UPSERT_CHUNK_SIZE must be positive".into()));
        }
        let run_migrations = parse_or(&var, "IMPORT_RUN_MIGRATIONS", true)?;

        let log_format = match var("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(AppError::Config(format!("LOG_FORMAT must be text or json, got {other}")))
            }
        };

        Ok(Self {
            database_url,
            max_connections,
            upsert_chunk_size,
            run_migrations,
            log_format,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> AppResult<T> {
    match var(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{key} has an invalid value: {raw}"))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> AppResult<ImportConfig> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ImportConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = config(&[("DATABASE_URL", "postgres://localhost/leasehold")]).unwrap();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.upsert_chunk_size, 1000);
        assert!(config.run_migrations);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config(&[
            ("DATABASE_URL", "postgres://localhost/leasehold"),
            ("DB_MAX_CONNECTIONS", "4"),
            ("IMPORT_UPSERT_CHUNK_SIZE", "250"),
            ("IMPORT_RUN_MIGRATIONS", "false"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.upsert_chunk_size, 250);
        assert!(!config.run_migrations);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn database_url_is_required() {
        assert_matches!(config(&[]), Err(AppError::Config(_)));
    }

    #[test]
    fn malformed_values_are_rejected() {
        let url = ("DATABASE_URL", "postgres://localhost/leasehold");
        assert_matches!(config(&[url, ("DB_MAX_CONNECTIONS", "many")]), Err(AppError::Config(_)));
        assert_matches!(config(&[url, ("IMPORT_UPSERT_CHUNK_SIZE", "0")]), Err(AppError::Config(_)));
        assert_matches!(config(&[url, ("LOG_FORMAT", "xml")]), Err(AppError::Config(_)));
    }
}
