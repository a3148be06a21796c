use crate::wager::groups::INVITE_CODE_LEN_RANGE;
use crate::wager::WagerPolicy;
use anyhow::{bail, Context, Result};
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub one_per_side: bool,
    pub invite_code_len: usize,
    /// Seconds between event-date sweeps; 0 disables the sweeper.
    pub progress_interval_secs: u64,
    pub seed_demo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            one_per_side: true,
            invite_code_len: 6,
            progress_interval_secs: 60,
            seed_demo: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = parse_or("PORT", &lookup, defaults.port)?;
        let one_per_side = match lookup("BET_ONE_PER_SIDE") {
            Some(v) => parse_bool(&v).context("BET_ONE_PER_SIDE must be a boolean")?,
            None => defaults.one_per_side,
        };
        let invite_code_len = parse_or("INVITE_CODE_LENGTH", &lookup, defaults.invite_code_len)?;
        if !INVITE_CODE_LEN_RANGE.contains(&invite_code_len) {
            bail!(
                "INVITE_CODE_LENGTH must be between {} and {}, got {invite_code_len}",
                INVITE_CODE_LEN_RANGE.start(),
                INVITE_CODE_LEN_RANGE.end()
            );
        }
        let progress_interval_secs = parse_or(
            "PROGRESS_INTERVAL_SECS",
            &lookup,
            defaults.progress_interval_secs,
        )?;
        let seed_demo = match lookup("SEED_DEMO") {
            Some(v) => parse_bool(&v).context("SEED_DEMO must be a boolean")?,
            None => defaults.seed_demo,
        };

        Ok(Self {
            host,
            port,
            one_per_side,
            invite_code_len,
            progress_interval_secs,
            seed_demo,
        })
    }

    pub fn policy(&self) -> WagerPolicy {
        WagerPolicy {
            one_per_side: self.one_per_side,
            invite_code_len: self.invite_code_len,
        }
    }
}

fn parse_or<T>(key: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key}: {raw}")),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" | "true" | "TRUE" | "on" | "ON" | "yes" => Some(true),
        "0" | "false" | "FALSE" | "off" | "OFF" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.one_per_side);
        assert_eq!(config.invite_code_len, 6);
        assert!(!config.seed_demo);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("BET_ONE_PER_SIDE", "false"),
            ("INVITE_CODE_LENGTH", "8"),
            ("PROGRESS_INTERVAL_SECS", "0"),
            ("SEED_DEMO", "on"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert!(!config.one_per_side);
        assert_eq!(config.policy().invite_code_len, 8);
        assert_eq!(config.progress_interval_secs, 0);
        assert!(config.seed_demo);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::from_lookup(lookup(&[("PORT", "eighty")])).is_err());
        assert!(Config::from_lookup(lookup(&[("INVITE_CODE_LENGTH", "2")])).is_err());
        assert!(Config::from_lookup(lookup(&[("SEED_DEMO", "maybe")])).is_err());
    }
}
