//! IP address parsing and classification: version, private/reserved/multicast
//! flags, numeric value, and static datacenter/Tor prefix-table membership.
//! Grounded on `original_source/utils/ip_utils.py`.

use ipnet::IpNet;
use std::net::IpAddr;
use std::sync::OnceLock;

/// Known datacenter/cloud-provider CIDR ranges (a representative subset,
/// same providers as the Python original's `is_datacenter_ip`).
const DATACENTER_RANGES: &[&str] = &[
    "104.16.0.0/12",  // Cloudflare
    "172.64.0.0/13",  // Cloudflare
    "162.158.0.0/15", // Cloudflare
    "198.41.128.0/17",// Cloudflare
    "35.180.0.0/14",  // AWS
    "52.0.0.0/11",    // AWS
    "34.64.0.0/10",   // Google Cloud
    "35.184.0.0/13",  // Google Cloud
    "40.112.0.0/13",  // Azure
    "65.52.0.0/14",   // Azure
];

/// Known Tor exit-node prefix ranges (a representative subset; same
/// octet boundaries as the Python original's regex prefixes).
const TOR_RANGES: &[&str] = &[
    "198.96.0.0/16",
    "199.87.0.0/16",
    "176.10.0.0/16",
    "46.165.0.0/16",
];

fn parsed_ranges(cell: &OnceLock<Vec<IpNet>>, raw: &[&str]) -> &'static [IpNet] {
    cell.get_or_init(|| raw.iter().filter_map(|s| s.parse().ok()).collect())
}

fn datacenter_ranges() -> &'static [IpNet] {
    static CELL: OnceLock<Vec<IpNet>> = OnceLock::new();
    parsed_ranges(&CELL, DATACENTER_RANGES)
}

fn tor_ranges() -> &'static [IpNet] {
    static CELL: OnceLock<Vec<IpNet>> = OnceLock::new();
    parsed_ranges(&CELL, TOR_RANGES)
}

/// Parsed, classified form of an address. `parse` never fails outwardly —
/// an unparsable string maps to the all-neutral `Self::invalid()`, matching
/// "failure to compute any field maps the whole factor vector to a neutral
/// default" (spec.md §4.1).
#[derive(Debug, Clone, Copy)]
pub struct ParsedIp {
    pub valid: bool,
    pub is_ipv6: bool,
    pub is_private: bool,
    pub is_reserved: bool,
    pub is_multicast: bool,
    pub is_datacenter: bool,
    pub is_tor: bool,
    pub numeric_normalized: f64,
}

impl ParsedIp {
    pub fn invalid() -> Self {
        Self {
            valid: false,
            is_ipv6: false,
            is_private: false,
            is_reserved: false,
            is_multicast: false,
            is_datacenter: false,
            is_tor: false,
            numeric_normalized: 0.0,
        }
    }

    pub fn is_suspicious_type(&self) -> bool {
        self.is_datacenter || self.is_tor || self.is_private
    }
}

pub fn parse(addr: &str) -> ParsedIp {
    let Ok(ip) = addr.parse::<IpAddr>() else {
        return ParsedIp::invalid();
    };

    match ip {
        IpAddr::V4(v4) => {
            let numeric = u32::from(v4) as f64 / u32::MAX as f64;
            ParsedIp {
                valid: true,
                is_ipv6: false,
                is_private: v4.is_private(),
                is_reserved: v4.is_reserved(),
                is_multicast: v4.is_multicast(),
                is_datacenter: datacenter_ranges().iter().any(|r| r.contains(&ip)),
                is_tor: tor_ranges().iter().any(|r| r.contains(&ip)),
                numeric_normalized: numeric,
            }
        }
        IpAddr::V6(v6) => {
            let numeric = u128::from(v6) as f64 / u128::MAX as f64;
            // fc00::/7 unique local addresses are the IPv6 analogue of
            // RFC1918 private space; std has no stable `is_private` for v6.
            let segments = v6.segments();
            let is_unique_local = (segments[0] & 0xfe00) == 0xfc00;
            ParsedIp {
                valid: true,
                is_ipv6: true,
                is_private: is_unique_local || v6.is_loopback(),
                is_reserved: false,
                is_multicast: v6.is_multicast(),
                is_datacenter: false,
                is_tor: false,
                numeric_normalized: numeric,
            }
        }
    }
}
