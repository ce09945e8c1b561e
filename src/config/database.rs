use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::env;
use std::time::Duration;

/// Postgres connection settings. Fan-out writes one delivery row per
/// recipient, so the pool ceiling leaves headroom for several concurrent
/// publishers on top of the inbox reads.
#[derive(Clone, Debug)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub log_sql: bool,
}

impl DbConfig {
    /// Read connection settings from the environment (fail-fast on a
    /// missing DATABASE_URL; everything else has defaults).
    pub fn from_env() -> anyhow::Result<Self> {
        let url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable must be set"))?;

        Ok(Self {
            url,
            max_connections: parse_u32(env::var("VERKO_DB_MAX_CONNECTIONS").ok(), 15),
            min_connections: parse_u32(env::var("VERKO_DB_MIN_CONNECTIONS").ok(), 1),
            log_sql: parse_bool(env::var("VERKO_DB_LOG_SQL").ok(), false),
        })
    }

    pub async fn connect(&self) -> Result<DatabaseConnection, DbErr> {
        let mut opt = ConnectOptions::new(self.url.clone());
        opt.max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(self.log_sql);

        Database::connect(opt).await
    }
}

fn parse_u32(raw: Option<String>, default: u32) -> u32 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}

fn parse_bool(raw: Option<String>, default: bool) -> bool {
    match raw {
        Some(v) => matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_knob_defaults() {
        assert_eq!(parse_u32(None, 15), 15);
        assert_eq!(parse_u32(Some("garbage".to_string()), 15), 15);
        assert_eq!(parse_u32(Some(" 25 ".to_string()), 15), 25);
    }

    #[test]
    fn test_sql_logging_flag_parsing() {
        assert!(!parse_bool(None, false));
        assert!(parse_bool(Some("1".to_string()), false));
        assert!(parse_bool(Some("TRUE".to_string()), false));
        assert!(parse_bool(Some("on".to_string()), false));
        assert!(!parse_bool(Some("off".to_string()), true));
    }
}
