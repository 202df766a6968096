use crate::adapters::outbound::UpstreamRegistry;
use crate::domain::error::ConfigError;
use crate::domain::services::SelectionPolicy;
use crate::domain::value_objects::SelectionMode;
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    // HTTP front end
    pub listen_addr: String,
    pub trusted_proxies: Vec<IpAddr>,
    pub access_log: bool,
    pub debug: bool,

    // Upstream selection
    pub upstream_mode: SelectionMode,
    pub upstream_pool: Vec<String>,
    pub upstream_rotate_interval_secs: i64,
    pub upstream_timeout_secs: u64,

    // Result cache
    pub cache_ttl_secs: u64,
    pub cache_sweep_secs: u64,

    // Domain queries
    pub domain_enabled: bool,
    pub domain_block_suffix: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "[::]:8080".to_string(),
            trusted_proxies: default_trusted_proxies(),
            access_log: false,
            debug: false,
            upstream_mode: SelectionMode::Single,
            upstream_pool: vec!["ip-api.com".to_string()],
            upstream_rotate_interval_secs: 86400,
            upstream_timeout_secs: 5,
            cache_ttl_secs: 21600,
            cache_sweep_secs: 1800,
            domain_enabled: true,
            domain_block_suffix: Vec::new(),
        }
    }
}

fn default_trusted_proxies() -> Vec<IpAddr> {
    vec![
        IpAddr::from([127, 0, 0, 1]),
        IpAddr::from([0u16, 0, 0, 0, 0, 0, 0, 1]),
    ]
}

impl Config {
    /// Validate the upstream settings into a selection policy.
    ///
    /// Every pool entry must be known to `registry`. Fatal at startup.
    pub fn selection_policy(&self, registry: &UpstreamRegistry) -> Result<SelectionPolicy, ConfigError> {
        let pool = registry.resolve_pool(&self.upstream_pool)?;
        SelectionPolicy::new(self.upstream_mode, pool, self.upstream_rotate_interval_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_secs)
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    Ok(load_config_from(|key| std::env::var(key).ok())?)
}

/// Build the configuration from an arbitrary variable lookup.
pub fn load_config_from<F>(var: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = Config::default();

    let listen_addr = var("IPAPI_LISTEN_ADDR").unwrap_or(defaults.listen_addr);

    let trusted_proxies = match var("IPAPI_TRUSTED_PROXIES") {
        Some(v) => parse_ip_list("IPAPI_TRUSTED_PROXIES", &v)?,
        None => defaults.trusted_proxies,
    };

    let access_log = var("IPAPI_ACCESS_LOG")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false);

    let debug = var("DEBUG").is_some();

    // Upstream fields are strict: a bad value must stop startup.
    let upstream_mode = match var("IPAPI_UPSTREAM_MODE") {
        Some(v) => v.parse::<SelectionMode>()?,
        None => defaults.upstream_mode,
    };

    let upstream_pool = match var("IPAPI_UPSTREAM_POOL") {
        Some(v) => split_list(&v),
        None => defaults.upstream_pool,
    };

    let upstream_rotate_interval_secs = match var("IPAPI_UPSTREAM_ROTATE_INTERVAL_SECS") {
        Some(v) => parse_strict("IPAPI_UPSTREAM_ROTATE_INTERVAL_SECS", &v)?,
        None => defaults.upstream_rotate_interval_secs,
    };

    let upstream_timeout_secs = match var("IPAPI_UPSTREAM_TIMEOUT_SECS") {
        Some(v) => match parse_strict::<u64>("IPAPI_UPSTREAM_TIMEOUT_SECS", &v)? {
            0 => {
                return Err(ConfigError::InvalidValue {
                    key: "IPAPI_UPSTREAM_TIMEOUT_SECS".to_string(),
                    value: v,
                })
            }
            secs => secs,
        },
        None => defaults.upstream_timeout_secs,
    };

    let cache_ttl_secs = var("IPAPI_CACHE_TTL_SECS")
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(defaults.cache_ttl_secs);

    let cache_sweep_secs = var("IPAPI_CACHE_SWEEP_SECS")
        .and_then(|v| v.trim().parse().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(defaults.cache_sweep_secs);

    let domain_enabled = var("IPAPI_DOMAIN_ENABLED")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(true);

    let domain_block_suffix = var("IPAPI_DOMAIN_BLOCK_SUFFIX")
        .map(|v| split_list(&v))
        .unwrap_or_default();

    Ok(Config {
        listen_addr,
        trusted_proxies,
        access_log,
        debug,
        upstream_mode,
        upstream_pool,
        upstream_rotate_interval_secs,
        upstream_timeout_secs,
        cache_ttl_secs,
        cache_sweep_secs,
        domain_enabled,
        domain_block_suffix,
    })
}

fn split_list(v: &str) -> Vec<String> {
    v.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_strict<T: std::str::FromStr>(key: &str, v: &str) -> Result<T, ConfigError> {
    v.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: v.to_string(),
    })
}

fn parse_ip_list(key: &str, v: &str) -> Result<Vec<IpAddr>, ConfigError> {
    split_list(v).iter().map(|s| parse_strict(key, s)).collect()
}
