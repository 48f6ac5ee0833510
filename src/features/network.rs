//! Network factor, 10 features (spec.md §4.1).

use crate::ipaddr_ext::{self, ParsedIp};
use crate::session::{HistoryItem, Session};

pub const LEN: usize = 10;

pub fn extract(session: &Session, history: &[HistoryItem]) -> [f64; LEN] {
    let parsed = ipaddr_ext::parse(&session.ip);
    if !parsed.valid {
        // Unparsable address: neutral vector, never an exception to the caller.
        return [0.0; LEN];
    }

    let is_new_address = !history.iter().any(|h| h.ip == session.ip);
    let distinct_count = history.iter().map(|h| h.ip.as_str()).collect::<std::collections::HashSet<_>>().len();

    [
        bool_f(is_new_address),
        bool_f(parsed.is_datacenter),
        bool_f(parsed.is_tor),
        bool_f(parsed.is_private),
        bool_f(parsed.is_suspicious_type()),
        (distinct_count as f64 / 10.0).min(1.0),
        parsed.numeric_normalized,
        bool_f(parsed.is_ipv6),
        bool_f(parsed.is_reserved),
        bool_f(parsed.is_multicast),
    ]
}

pub fn parsed_current_ip(session: &Session) -> ParsedIp {
    ipaddr_ext::parse(&session.ip)
}

fn bool_f(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Fingerprint;

    fn session(ip: &str) -> Session {
        Session { ip: ip.to_string(), user_agent: "x".to_string(), timestamp: 0, location: None, fingerprint: Fingerprint::default() }
    }

    #[test]
    fn fixed_length() {
        let v = extract(&session("8.8.8.8"), &[]);
        assert_eq!(v.len(), LEN);
    }

    #[test]
    fn invalid_ip_is_neutral_vector() {
        let v = extract(&session("garbage"), &[]);
        assert_eq!(v, [0.0; LEN]);
    }

    #[test]
    fn datacenter_address_sets_flag() {
        let v = extract(&session("104.16.1.1"), &[]);
        assert_eq!(v[1], 1.0); // is_datacenter_range
        assert_eq!(v[4], 1.0); // composite_suspicious_type
    }
}
