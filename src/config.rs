use serde::Deserialize;

const DEFAULT_TTL_HOURS: i64 = 24;
const MAX_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Absent means the server runs on in-memory stores only.
    pub database_url: Option<String>,
    pub db_connect_timeout_secs: u64,
    pub session: SessionConfig,
}

/// Out-of-range or unparsable values fall back to the default.
fn parse_ttl_hours(raw: Option<String>) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|h| (1..=MAX_TTL_HOURS).contains(h))
        .unwrap_or(DEFAULT_TTL_HOURS)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let db_connect_timeout_secs = std::env::var("DB_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5);
        let session = SessionConfig {
            ttl_hours: parse_ttl_hours(std::env::var("SESSION_TTL_HOURS").ok()),
        };
        Ok(Self {
            database_url,
            db_connect_timeout_secs,
            session,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_hours_defaults_and_caps() {
        assert_eq!(parse_ttl_hours(None), DEFAULT_TTL_HOURS);
        assert_eq!(parse_ttl_hours(Some("48".into())), 48);
        assert_eq!(parse_ttl_hours(Some("0".into())), DEFAULT_TTL_HOURS);
        assert_eq!(parse_ttl_hours(Some("soon".into())), DEFAULT_TTL_HOURS);
        assert_eq!(parse_ttl_hours(Some(MAX_TTL_HOURS.to_string())), MAX_TTL_HOURS);
        assert_eq!(parse_ttl_hours(Some("100000000".into())), DEFAULT_TTL_HOURS);
    }
}
