use std::env;

use crate::workflow::FactsPolicy;

/// Server configuration, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub session_key: Option<String>,
    pub cookie_secure: bool,
    pub db_max_connections: u32,
    pub facts_policy: FactsPolicy,
    pub seed_admin_password: Option<String>,
    pub seed_demo: bool,
    pub login_max_attempts: usize,
    pub login_window_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or("DATABASE_URL must be set")?;

        let facts_policy = match lookup("WORKFLOW_FACTS_POLICY") {
            Some(v) => v.parse()?,
            None => FactsPolicy::default(),
        };

        Ok(AppConfig {
            database_url,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            session_key: lookup("SESSION_KEY"),
            cookie_secure: parse_bool(lookup("COOKIE_SECURE").as_deref(), false),
            db_max_connections: parse_number(lookup("DB_MAX_CONNECTIONS").as_deref(), "DB_MAX_CONNECTIONS", 8)?,
            facts_policy,
            seed_admin_password: lookup("SEED_ADMIN_PASSWORD").filter(|p| !p.is_empty()),
            seed_demo: parse_bool(lookup("SEED_DEMO").as_deref(), false),
            login_max_attempts: parse_number(lookup("LOGIN_MAX_ATTEMPTS").as_deref(), "LOGIN_MAX_ATTEMPTS", 5)?,
            login_window_secs: parse_number(lookup("LOGIN_WINDOW_SECS").as_deref(), "LOGIN_WINDOW_SECS", 900)?,
        })
    }
}

fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value.map(|v| v.trim().to_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

fn parse_number<T: std::str::FromStr>(value: Option<&str>, key: &str, default: T) -> Result<T, String> {
    match value {
        Some(v) => v.trim().parse().map_err(|_| format!("{key} must be a number, got '{v}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let cfg = config(&[("DATABASE_URL", "postgres://localhost/garage")]).unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:8080");
        assert_eq!(cfg.db_max_connections, 8);
        assert_eq!(cfg.facts_policy, FactsPolicy::Persisted);
        assert_eq!(cfg.login_max_attempts, 5);
        assert!(!cfg.seed_demo);
        assert!(cfg.seed_admin_password.is_none());
    }

    #[test]
    fn database_url_is_required() {
        assert_eq!(config(&[]).unwrap_err(), "DATABASE_URL must be set");
    }

    #[test]
    fn client_facts_policy_and_overrides() {
        let cfg = config(&[
            ("DATABASE_URL", "postgres://db/garage"),
            ("WORKFLOW_FACTS_POLICY", "client"),
            ("DB_MAX_CONNECTIONS", "16"),
            ("SEED_DEMO", "yes"),
        ])
        .unwrap();
        assert_eq!(cfg.facts_policy, FactsPolicy::ClientReported);
        assert_eq!(cfg.db_max_connections, 16);
        assert!(cfg.seed_demo);
    }

    #[test]
    fn bad_number_is_reported() {
        let err = config(&[("DATABASE_URL", "x"), ("DB_MAX_CONNECTIONS", "many")]).unwrap_err();
        assert!(err.contains("DB_MAX_CONNECTIONS"));
    }
}
