//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use crate::domain::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Identifier of an upstream geolocation provider.
///
/// The set is closed: every configured pool entry must parse into one of
/// these variants or startup fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderId {
    /// ip-api.com free JSON endpoint
    #[serde(rename = "ip-api.com")]
    IpApiCom,
    /// ipinfo.io without a token
    #[serde(rename = "ipinfo-free")]
    IpinfoFree,
    /// ipapi.co free JSON endpoint
    #[serde(rename = "ipapi.co")]
    IpapiCo,
}

impl ProviderId {
    /// Every known provider, in declaration order.
    pub const ALL: [ProviderId; 3] = [Self::IpApiCom, Self::IpinfoFree, Self::IpapiCo];

    /// Configuration name of the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IpApiCom => "ip-api.com",
            Self::IpinfoFree => "ipinfo-free",
            Self::IpapiCo => "ipapi.co",
        }
    }
}

impl FromStr for ProviderId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ip-api.com" => Ok(Self::IpApiCom),
            "ipinfo-free" => Ok(Self::IpinfoFree),
            "ipapi.co" => Ok(Self::IpapiCo),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a provider is chosen from the configured pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Always the first pool entry
    Single,
    /// Uniform draw on every request
    Random,
    /// Uniform draw held for a fixed interval
    Rotate,
}

impl SelectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Random => "random",
            Self::Rotate => "rotate",
        }
    }
}

impl FromStr for SelectionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "random" => Ok(Self::Random),
            "rotate" => Ok(Self::Rotate),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

impl Default for SelectionMode {
    fn default() -> Self {
        Self::Single
    }
}

impl std::fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
