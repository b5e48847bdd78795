/* src/extractor.rs */

use std::net::{IpAddr, Ipv4Addr};

use tracing::{debug, trace};

use crate::error::{ForwardedIpError, Result};
use crate::headers::HeaderLookup;
use crate::range::{AddressRange, PRIVATE_RANGES, in_ranges};

/// Headers consulted by default, in order of preference.
pub const DEFAULT_HEADERS: [&str; 2] = ["X-Forwarded-For", "X-Real-Ip"];

/// Address returned when no header yields a usable client address.
pub const FALLBACK_IP: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Configuration for client IP resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(default)
)]
pub struct ClientIpResolver {
    /// Headers to check, in order of preference.
    pub headers: Vec<String>,
    /// Address returned when every header is absent or unusable.
    pub fallback: IpAddr,
    /// IPv4 ranges whose addresses are never accepted as the client.
    pub private_ranges: Vec<AddressRange>,
}

impl Default for ClientIpResolver {
    fn default() -> Self {
        Self {
            headers: DEFAULT_HEADERS.iter().map(|h| h.to_string()).collect(),
            fallback: FALLBACK_IP,
            private_ranges: PRIVATE_RANGES.to_vec(),
        }
    }
}

impl ClientIpResolver {
    /// Create a resolver with the default headers, ranges and fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headers to check for the client address.
    pub fn with_headers(mut self, headers: Vec<String>) -> Self {
        self.headers = headers;
        self
    }

    /// Set the address returned when nothing usable is found.
    pub fn with_fallback(mut self, fallback: IpAddr) -> Self {
        self.fallback = fallback;
        self
    }

    /// Parse and set the fallback address.
    pub fn parse_fallback(self, fallback: &str) -> Result<Self> {
        let ip = fallback
            .trim()
            .parse::<IpAddr>()
            .map_err(|_| ForwardedIpError::InvalidIpFormat(fallback.to_string()))?;
        Ok(self.with_fallback(ip))
    }

    /// Replace the reserved ranges that disqualify a candidate.
    pub fn with_private_ranges(mut self, ranges: Vec<AddressRange>) -> Self {
        self.private_ranges = ranges;
        self
    }

    /// Resolve the client address.
    ///
    /// Each header's comma-separated list is scanned right to left, since
    /// the rightmost entry was written by the proxy closest to us. The first
    /// global unicast address outside the private ranges wins; otherwise the
    /// fallback is returned.
    pub fn resolve<L: HeaderLookup + ?Sized>(&self, lookup: &L) -> IpAddr {
        match self.find(lookup) {
            Some((ip, _)) => ip,
            None => self.fall_back(),
        }
    }

    /// Like [`resolve`](Self::resolve), but returns the accepted candidate
    /// exactly as it appeared in the header, trimmed of whitespace. The
    /// fallback is formatted with `Display`.
    pub fn resolve_string<L: HeaderLookup + ?Sized>(&self, lookup: &L) -> String {
        match self.find(lookup) {
            Some((_, literal)) => literal,
            None => self.fall_back().to_string(),
        }
    }

    fn find<L: HeaderLookup + ?Sized>(&self, lookup: &L) -> Option<(IpAddr, String)> {
        for name in &self.headers {
            let Some(value) = lookup.header(name) else {
                continue;
            };
            if let Some((ip, literal)) = self.scan(name, &value) {
                debug!(header = %name, %ip, "resolved client address");
                return Some((ip, literal.to_string()));
            }
        }
        None
    }

    fn fall_back(&self) -> IpAddr {
        debug!(fallback = %self.fallback, "no usable forwarding address");
        self.fallback
    }

    fn scan<'v>(&self, name: &str, value: &'v str) -> Option<(IpAddr, &'v str)> {
        for candidate in value.split(',').rev().map(str::trim) {
            let Ok(ip) = candidate.parse::<IpAddr>() else {
                trace!(header = %name, candidate, "skipping unparseable address");
                continue;
            };
            if !is_global_unicast(ip) {
                trace!(header = %name, %ip, "skipping non global unicast address");
                continue;
            }
            if in_ranges(&self.private_ranges, ip) {
                trace!(header = %name, %ip, "skipping private address");
                continue;
            }
            return Some((ip, candidate));
        }
        None
    }
}

/// Check whether `ip` is routable host-to-host on the public internet.
///
/// Rejects unspecified, loopback, multicast and link-local addresses, and
/// the IPv4 limited broadcast address. IPv4-mapped IPv6 addresses are
/// judged as IPv4. Private ranges are not considered here.
pub fn is_global_unicast(ip: IpAddr) -> bool {
    match ip.to_canonical() {
        IpAddr::V4(v4) => {
            !(v4.is_unspecified()
                || v4.is_loopback()
                || v4.is_multicast()
                || v4.is_link_local()
                || v4.is_broadcast())
        }
        IpAddr::V6(v6) => {
            !(v6.is_unspecified()
                || v6.is_loopback()
                || v6.is_multicast()
                || v6.is_unicast_link_local())
        }
    }
}

/// Determine a request's client address from its forwarding headers.
///
/// Uses the default resolver, so this checks `X-Forwarded-For` then
/// `X-Real-Ip` and falls back to `"127.0.0.1"`. Never fails.
///
/// # Examples
///
/// ```rust
/// use forwarded_ip::{HeaderMap, request_ip};
///
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for".to_string(), "10.0.0.5, 8.8.8.8".to_string());
///
/// assert_eq!(request_ip(&headers), "8.8.8.8");
/// assert_eq!(request_ip(&HeaderMap::new()), "127.0.0.1");
/// ```
pub fn request_ip<L: HeaderLookup + ?Sized>(lookup: &L) -> String {
    ClientIpResolver::default().resolve_string(lookup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::HeaderMap;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_no_headers_falls_back() {
        assert_eq!(request_ip(&HeaderMap::new()), "127.0.0.1");
    }

    #[test]
    fn test_single_public_address() {
        let h = headers(&[("X-Forwarded-For", "8.8.8.8")]);
        assert_eq!(request_ip(&h), "8.8.8.8");
    }

    #[test]
    fn test_rightmost_public_wins() {
        let h = headers(&[("X-Forwarded-For", "10.0.0.5, 8.8.8.8")]);
        assert_eq!(request_ip(&h), "8.8.8.8");

        let h = headers(&[("X-Forwarded-For", "1.1.1.1, 8.8.8.8")]);
        assert_eq!(request_ip(&h), "8.8.8.8");
    }

    #[test]
    fn test_scan_continues_left_past_private() {
        let h = headers(&[("X-Forwarded-For", "8.8.8.8, 10.0.0.5")]);
        assert_eq!(request_ip(&h), "8.8.8.8");
    }

    #[test]
    fn test_invalid_candidates_are_skipped() {
        let h = headers(&[("X-Forwarded-For", "not-an-ip")]);
        assert_eq!(request_ip(&h), "127.0.0.1");

        let h = headers(&[("X-Forwarded-For", "8.8.4.4, not-an-ip")]);
        assert_eq!(request_ip(&h), "8.8.4.4");
    }

    #[test]
    fn test_empty_segments_are_skipped() {
        let h = headers(&[("X-Forwarded-For", "8.8.8.8,")]);
        assert_eq!(request_ip(&h), "8.8.8.8");

        let h = headers(&[("X-Forwarded-For", ", ,8.8.8.8, ")]);
        assert_eq!(request_ip(&h), "8.8.8.8");

        let h = headers(&[("X-Forwarded-For", "")]);
        assert_eq!(request_ip(&h), "127.0.0.1");
    }

    #[test]
    fn test_real_ip_consulted_after_forwarded_for() {
        let h = headers(&[
            ("X-Forwarded-For", "192.168.1.1, 127.0.0.1"),
            ("X-Real-Ip", "9.9.9.9"),
        ]);
        assert_eq!(request_ip(&h), "9.9.9.9");

        let h = headers(&[("X-Forwarded-For", "1.1.1.1"), ("X-Real-Ip", "9.9.9.9")]);
        assert_eq!(request_ip(&h), "1.1.1.1");
    }

    #[test]
    fn test_non_global_unicast_rejected() {
        for ip in [
            "127.0.0.1",
            "0.0.0.0",
            "169.254.10.10",
            "224.0.0.1",
            "255.255.255.255",
            "::1",
            "::",
            "fe80::1",
            "ff02::1",
            "::ffff:127.0.0.1",
        ] {
            let h = headers(&[("X-Forwarded-For", ip)]);
            assert_eq!(request_ip(&h), "127.0.0.1", "{ip} should be rejected");
        }
    }

    #[test]
    fn test_range_upper_bound_is_accepted() {
        let h = headers(&[("X-Forwarded-For", "10.255.255.255")]);
        assert_eq!(request_ip(&h), "10.255.255.255");
    }

    #[test]
    fn test_ipv6_global_unicast_accepted() {
        let h = headers(&[("X-Forwarded-For", "10.0.0.1, 2001:4860:4860::8888")]);
        assert_eq!(request_ip(&h), "2001:4860:4860::8888");

        // IPv6 unique-local is not in the IPv4 table.
        let h = headers(&[("X-Forwarded-For", "fd00::1")]);
        assert_eq!(request_ip(&h), "fd00::1");
    }

    #[test]
    fn test_returns_header_literal_unchanged() {
        let h = headers(&[("X-Forwarded-For", "10.0.0.1,  2001:DB8:0:0:0:0:0:1 ")]);
        assert_eq!(request_ip(&h), "2001:DB8:0:0:0:0:0:1");

        let h = headers(&[("X-Forwarded-For", "::8.8.8.8")]);
        assert_eq!(request_ip(&h), "::8.8.8.8");

        let resolver = ClientIpResolver::new();
        assert_eq!(
            resolver.resolve(&h),
            "::808:808".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_ipv4_mapped_private_rejected() {
        let h = headers(&[("X-Forwarded-For", "::ffff:10.0.0.5")]);
        assert_eq!(request_ip(&h), "127.0.0.1");
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let h = headers(&[("x-real-ip", "  8.8.8.8  ")]);
        assert_eq!(request_ip(&h), "8.8.8.8");
    }

    #[test]
    fn test_custom_headers_and_fallback() {
        let resolver = ClientIpResolver::new()
            .with_headers(vec!["CF-Connecting-IP".to_string()])
            .parse_fallback("192.0.2.1")
            .unwrap();
        let h = headers(&[("X-Forwarded-For", "8.8.8.8")]);
        assert_eq!(resolver.resolve(&h), "192.0.2.1".parse::<IpAddr>().unwrap());

        let h = headers(&[("cf-connecting-ip", "1.0.0.1")]);
        assert_eq!(resolver.resolve_string(&h), "1.0.0.1");
    }

    #[test]
    fn test_parse_fallback_rejects_garbage() {
        let err = ClientIpResolver::new().parse_fallback("localhost").unwrap_err();
        assert_eq!(
            err,
            ForwardedIpError::InvalidIpFormat("localhost".to_string())
        );
    }

    #[test]
    fn test_custom_private_ranges() {
        let documentation = AddressRange::new(
            Ipv4Addr::new(203, 0, 113, 0),
            Ipv4Addr::new(203, 0, 114, 0),
        )
        .unwrap();
        let resolver = ClientIpResolver::new().with_private_ranges(vec![documentation]);

        let h = headers(&[("X-Forwarded-For", "10.0.0.1, 203.0.113.9")]);
        assert_eq!(resolver.resolve_string(&h), "10.0.0.1");
    }

    #[test]
    fn test_is_global_unicast() {
        assert!(is_global_unicast("8.8.8.8".parse().unwrap()));
        assert!(is_global_unicast("10.0.0.1".parse().unwrap()));
        assert!(is_global_unicast("2606:4700::1".parse().unwrap()));
        assert!(!is_global_unicast("169.254.0.1".parse().unwrap()));
        assert!(!is_global_unicast("fe80::abcd".parse().unwrap()));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_with_defaults() {
        let resolver: ClientIpResolver =
            serde_json::from_str(r#"{"fallback":"192.0.2.10"}"#).unwrap();
        assert_eq!(resolver.headers, vec!["X-Forwarded-For", "X-Real-Ip"]);
        assert_eq!(resolver.private_ranges, PRIVATE_RANGES.to_vec());
        assert_eq!(resolver.fallback, "192.0.2.10".parse::<IpAddr>().unwrap());
    }
}
