//! Client Address Extraction
//!
//! Forwarding headers are only honoured when the TCP peer is a trusted
//! proxy.

use axum::http::HeaderMap;
use std::net::IpAddr;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Address of the requesting client.
///
/// For a trusted peer the `X-Forwarded-For` chain is walked from the right
/// and the first untrusted hop wins. A malformed chain falls back to
/// `X-Real-IP`, then to the peer itself.
pub fn client_ip(peer: IpAddr, headers: &HeaderMap, trusted: &[IpAddr]) -> IpAddr {
    let peer = peer.to_canonical();
    if !is_trusted(peer, trusted) {
        return peer;
    }

    if let Some(ip) = header_str(headers, X_FORWARDED_FOR).and_then(|v| walk_forwarded(v, trusted)) {
        return ip;
    }

    header_str(headers, X_REAL_IP)
        .and_then(|v| v.trim().parse::<IpAddr>().ok())
        .map(|ip| ip.to_canonical())
        .unwrap_or(peer)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn walk_forwarded(value: &str, trusted: &[IpAddr]) -> Option<IpAddr> {
    let hops: Vec<&str> = value.split(',').map(str::trim).collect();

    for (i, hop) in hops.iter().enumerate().rev() {
        let ip = hop.parse::<IpAddr>().ok()?.to_canonical();
        if i == 0 || !is_trusted(ip, trusted) {
            return Some(ip);
        }
    }
    None
}

fn is_trusted(ip: IpAddr, trusted: &[IpAddr]) -> bool {
    trusted.iter().any(|t| t.to_canonical() == ip)
}
