use crate::domain::{Address, DistributionPeriod, Uint};
use std::collections::HashMap;
use thiserror::Error;

/// Default accounting period length: 7 days in seconds.
const DEFAULT_PERIOD_SECONDS: &str = "604800";

#[derive(Debug, Clone)]
pub struct Config {
    pub subgraph_url: String,
    pub rpc_url: String,
    /// Address of the reward manager contract the indexed events belong to;
    /// carried as run context.
    pub reward_manager_address: Address,
    /// Accounting period length in seconds. Used when an explicit period
    /// start is given without an end.
    pub distribution_period_seconds: Uint,
    /// First block the protocol's events exist at; carried as run context.
    pub start_block: Uint,
    /// Optional explicit period bounds. When set, the run uses this period
    /// for every gauge instead of the per-gauge epoch-derived one.
    pub period_start: Option<Uint>,
    pub period_end: Option<Uint>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let subgraph_url = env_map
            .get("SUBGRAPH_URL")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("SUBGRAPH_URL".to_string()))?;

        let rpc_url = env_map
            .get("RPC_URL")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("RPC_URL".to_string()))?;

        let reward_manager_address = env_map
            .get("REWARD_MANAGER_ADDRESS")
            .map(|s| Address::new(s.as_str()))
            .ok_or_else(|| ConfigError::MissingEnv("REWARD_MANAGER_ADDRESS".to_string()))?;

        let distribution_period_seconds = parse_uint_var(
            &env_map,
            "DISTRIBUTION_PERIOD_SECONDS",
            Some(DEFAULT_PERIOD_SECONDS),
        )?
        .unwrap_or_else(Uint::zero);

        let start_block = parse_uint_var(&env_map, "START_BLOCK", Some("0"))?
            .unwrap_or_else(Uint::zero);

        let period_start = parse_uint_var(&env_map, "PERIOD_START", None)?;
        let period_end = parse_uint_var(&env_map, "PERIOD_END", None)?;

        if period_end.is_some() && period_start.is_none() {
            return Err(ConfigError::InvalidValue(
                "PERIOD_END".to_string(),
                "requires PERIOD_START".to_string(),
            ));
        }

        Ok(Config {
            subgraph_url,
            rpc_url,
            reward_manager_address,
            distribution_period_seconds,
            start_block,
            period_start,
            period_end,
        })
    }

    /// Explicit period override, if configured. The end defaults to
    /// `start + distribution_period_seconds`.
    pub fn override_period(&self) -> Option<DistributionPeriod> {
        let start = self.period_start.clone()?;
        let end = self
            .period_end
            .clone()
            .unwrap_or_else(|| start.clone() + self.distribution_period_seconds.clone());
        Some(DistributionPeriod::new(start, end))
    }
}

fn parse_uint_var(
    env_map: &HashMap<String, String>,
    name: &str,
    default: Option<&str>,
) -> Result<Option<Uint>, ConfigError> {
    let raw = match env_map.get(name).map(|s| s.as_str()).or(default) {
        Some(v) => v,
        None => return Ok(None),
    };
    Uint::from_str_canonical(raw)
        .map(Some)
        .map_err(|_| {
            ConfigError::InvalidValue(
                name.to_string(),
                "must be a non-negative integer".to_string(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert(
            "SUBGRAPH_URL".to_string(),
            "https://indexer.example/subgraph".to_string(),
        );
        map.insert("RPC_URL".to_string(), "https://rpc.example".to_string());
        map.insert(
            "REWARD_MANAGER_ADDRESS".to_string(),
            "0xManager".to_string(),
        );
        map
    }

    #[test]
    fn test_missing_subgraph_url() {
        let mut env_map = setup_required_env();
        env_map.remove("SUBGRAPH_URL");
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "SUBGRAPH_URL"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_missing_rpc_url() {
        let mut env_map = setup_required_env();
        env_map.remove("RPC_URL");
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "RPC_URL"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_missing_reward_manager_address() {
        let mut env_map = setup_required_env();
        env_map.remove("REWARD_MANAGER_ADDRESS");
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "REWARD_MANAGER_ADDRESS"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_reward_manager_address_normalized() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.reward_manager_address, Address::new("0xmanager"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(
            config.distribution_period_seconds,
            Uint::from(604800u64)
        );
        assert_eq!(config.start_block, Uint::zero());
        assert!(config.override_period().is_none());
    }

    #[test]
    fn test_invalid_period_seconds() {
        let mut env_map = setup_required_env();
        env_map.insert(
            "DISTRIBUTION_PERIOD_SECONDS".to_string(),
            "a week".to_string(),
        );
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => {
                assert_eq!(k, "DISTRIBUTION_PERIOD_SECONDS")
            }
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_period_override_with_default_length() {
        let mut env_map = setup_required_env();
        env_map.insert("PERIOD_START".to_string(), "1000".to_string());
        let config = Config::from_env_map(env_map).unwrap();

        let period = config.override_period().unwrap();
        assert_eq!(period.start, Uint::from(1000u64));
        assert_eq!(period.end, Uint::from(1000u64 + 604800));
    }

    #[test]
    fn test_period_override_explicit_end() {
        let mut env_map = setup_required_env();
        env_map.insert("PERIOD_START".to_string(), "1000".to_string());
        env_map.insert("PERIOD_END".to_string(), "2000".to_string());
        let config = Config::from_env_map(env_map).unwrap();

        let period = config.override_period().unwrap();
        assert_eq!(period.end, Uint::from(2000u64));
    }

    #[test]
    fn test_period_end_requires_start() {
        let mut env_map = setup_required_env();
        env_map.insert("PERIOD_END".to_string(), "2000".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PERIOD_END"),
            _ => panic!("Expected InvalidValue error"),
        }
    }
}
