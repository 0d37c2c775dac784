use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Duration;

/// Placeholder session secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "your_secret_key",
];

/// Longest accepted session lifetime (one year).
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    /// `None` when the startup import is disabled.
    pub csv_path: Option<PathBuf>,
    pub session_secret: String,
    pub session_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let session_secret = lookup("HELPDESK_SESSION_SECRET").unwrap_or_default();
        if session_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&session_secret.as_str()) {
            bail!("HELPDESK_SESSION_SECRET is unset or still a placeholder; set it in .env");
        }

        let port = var("HELPDESK_PORT", "5000")
            .parse()
            .context("HELPDESK_PORT must be a port number")?;
        let session_ttl = parse_session_ttl(&var("HELPDESK_SESSION_TTL_HOURS", "12"))?;

        let csv_path = var("HELPDESK_CSV_PATH", "customer_messages.csv");

        Ok(Self {
            host: var("HELPDESK_HOST", "127.0.0.1"),
            port,
            db_path: var("HELPDESK_DB_PATH", "messages.db").into(),
            csv_path: (!csv_path.is_empty()).then(|| csv_path.into()),
            session_secret,
            session_ttl,
        })
    }
}

fn parse_session_ttl(raw: &str) -> Result<Duration> {
    let hours: i64 = raw
        .parse()
        .context("HELPDESK_SESSION_TTL_HOURS must be a whole number of hours")?;
    if !(1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
        bail!("HELPDESK_SESSION_TTL_HOURS must be between 1 and {MAX_SESSION_TTL_HOURS}, got {hours}");
    }
    Duration::try_hours(hours).context("HELPDESK_SESSION_TTL_HOURS is out of range")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("HELPDESK_SESSION_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5000);
        assert_eq!(config.db_path, PathBuf::from("messages.db"));
        assert_eq!(config.csv_path, Some(PathBuf::from("customer_messages.csv")));
        assert_eq!(config.session_ttl, Duration::hours(12));
    }

    #[test]
    fn empty_csv_path_disables_import() {
        let config = load(&[("HELPDESK_SESSION_SECRET", "s3cret"), ("HELPDESK_CSV_PATH", "")]).unwrap();
        assert!(config.csv_path.is_none());
    }

    #[test]
    fn placeholder_secret_is_refused() {
        assert!(load(&[]).is_err());
        assert!(load(&[("HELPDESK_SESSION_SECRET", "your_secret_key")]).is_err());
    }

    #[test]
    fn bad_port_is_an_error() {
        let err = load(&[("HELPDESK_SESSION_SECRET", "s3cret"), ("HELPDESK_PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("HELPDESK_PORT"));
    }

    #[test]
    fn non_positive_ttl_is_refused() {
        for ttl in ["0", "-5"] {
            let err = load(&[("HELPDESK_SESSION_SECRET", "s3cret"), ("HELPDESK_SESSION_TTL_HOURS", ttl)])
                .unwrap_err();
            assert!(err.to_string().contains("HELPDESK_SESSION_TTL_HOURS"), "{ttl}");
        }
    }

    #[test]
    fn oversized_ttl_is_an_error_not_a_panic() {
        let err = load(&[
            ("HELPDESK_SESSION_SECRET", "s3cret"),
            ("HELPDESK_SESSION_TTL_HOURS", "9999999999999"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("between 1 and"));
    }
}
