//! Query Target Validation
//!
//! Turns the raw query (an IP literal or a domain name) into one safe,
//! global unicast address string for the query service.

use psl::{List, Psl};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Special-use suffixes that are never resolved.
pub const RESERVED_SUFFIXES: [&str; 8] = [
    "alt",
    "arpa",
    "invalid",
    "local",
    "localhost",
    "onion",
    "test",
    "internal",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("empty query")]
    Empty,
    #[error("not permitted to resolve domain '{0}'")]
    DomainDisabled(String),
    #[error("blocked domain '{0}'")]
    BlockedDomain(String),
    #[error("lookup domain '{domain}' failure: {reason}")]
    Lookup { domain: String, reason: String },
    #[error("address {0} is in a special-use range")]
    SpecialRange(IpAddr),
}

impl TargetError {
    /// Text returned to the client.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::SpecialRange(_) => "IP address/domain is in invalid range",
            _ => "Bad query IP address/domain",
        }
    }
}

/// Rules for accepting query targets.
#[derive(Debug, Clone)]
pub struct TargetPolicy {
    domain_enabled: bool,
    blocked_suffixes: Vec<String>,
}

impl TargetPolicy {
    /// Build a policy; the reserved suffixes are always blocked.
    pub fn new(domain_enabled: bool, extra_blocked: &[String]) -> Self {
        let mut blocked_suffixes: Vec<String> = extra_blocked
            .iter()
            .map(|s| normalize_name(s))
            .filter(|s| !s.is_empty())
            .collect();
        for suffix in RESERVED_SUFFIXES {
            if !blocked_suffixes.iter().any(|s| s == suffix) {
                blocked_suffixes.push(suffix.to_string());
            }
        }

        Self {
            domain_enabled,
            blocked_suffixes,
        }
    }

    pub fn domain_enabled(&self) -> bool {
        self.domain_enabled
    }

    /// Whether the public suffix of `domain` is a blocked suffix.
    ///
    /// Names under a reserved top-level label are blocked even when the
    /// public suffix list knows a longer suffix for them (`in-addr.arpa`).
    pub fn is_blocked(&self, domain: &str) -> bool {
        let domain = normalize_name(domain);
        let tld = domain.rsplit('.').next().unwrap_or_default();
        if RESERVED_SUFFIXES.contains(&tld) {
            return true;
        }

        let suffix = public_suffix(&domain);
        self.blocked_suffixes.iter().any(|blocked| blocked == suffix)
    }

    /// Validate a query and return the address to look up.
    pub async fn resolve(&self, query: &str) -> Result<String, TargetError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(TargetError::Empty);
        }

        let ip = match query.parse::<IpAddr>() {
            Ok(ip) => ip.to_canonical(),
            Err(_) => self.lookup_domain(query).await?,
        };

        if is_special(ip) {
            return Err(TargetError::SpecialRange(ip));
        }

        Ok(ip.to_string())
    }

    async fn lookup_domain(&self, domain: &str) -> Result<IpAddr, TargetError> {
        if !self.domain_enabled {
            return Err(TargetError::DomainDisabled(domain.to_string()));
        }
        if self.is_blocked(domain) {
            return Err(TargetError::BlockedDomain(domain.to_string()));
        }

        let lookup_err = |reason: String| TargetError::Lookup {
            domain: domain.to_string(),
            reason,
        };

        let mut addrs = tokio::net::lookup_host((domain, 0))
            .await
            .map_err(|e| lookup_err(e.to_string()))?;
        let first = addrs
            .next()
            .ok_or_else(|| lookup_err("no address records".to_string()))?;

        tracing::debug!("resolved domain {} to {}", domain, first.ip());
        Ok(first.ip().to_canonical())
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().trim_matches('.').to_ascii_lowercase()
}

/// Public suffix of a normalized name; unlisted names fall back to their
/// last label.
fn public_suffix(domain: &str) -> &str {
    List.suffix(domain.as_bytes())
        .and_then(|suffix| std::str::from_utf8(suffix.as_bytes()).ok())
        .unwrap_or(domain)
}

/// Whether an address is loopback, private, unspecified, or otherwise not
/// global unicast.
pub fn is_special(ip: IpAddr) -> bool {
    match ip.to_canonical() {
        IpAddr::V4(v4) => is_special_v4(v4),
        IpAddr::V6(v6) => is_special_v6(v6),
    }
}

fn is_special_v4(ip: Ipv4Addr) -> bool {
    ip.is_loopback()
        || ip.is_private()
        || ip.is_unspecified()
        || ip.is_link_local()
        || ip.is_multicast()
        || ip.is_broadcast()
}

fn is_special_v6(ip: Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    let unique_local = (first & 0xfe00) == 0xfc00;
    let link_local = (first & 0xffc0) == 0xfe80;

    ip.is_loopback() || ip.is_unspecified() || ip.is_multicast() || unique_local || link_local
}
