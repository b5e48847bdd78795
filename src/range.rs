/* src/range.rs */

use std::net::{IpAddr, Ipv4Addr};

use crate::error::{ForwardedIpError, Result};

/// A half-open span of IPv4 addresses, `start <= ip < end`.
///
/// Membership compares raw octet arrays lexicographically, so the upper
/// bound itself is never a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(try_from = "RawRange", into = "RawRange")
)]
pub struct AddressRange {
    start: Ipv4Addr,
    end: Ipv4Addr,
}

impl AddressRange {
    /// Create a range, rejecting one whose start sorts after its end.
    pub fn new(start: Ipv4Addr, end: Ipv4Addr) -> Result<Self> {
        if start.octets() > end.octets() {
            return Err(ForwardedIpError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    const fn span(start: Ipv4Addr, end: Ipv4Addr) -> Self {
        Self { start, end }
    }

    /// First address in the range.
    pub fn start(&self) -> Ipv4Addr {
        self.start
    }

    /// Exclusive upper bound of the range.
    pub fn end(&self) -> Ipv4Addr {
        self.end
    }

    /// Check whether `addr` falls inside the range.
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let octets = addr.octets();
        octets >= self.start.octets() && octets < self.end.octets()
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize, serde::Serialize)]
struct RawRange {
    start: Ipv4Addr,
    end: Ipv4Addr,
}

#[cfg(feature = "serde")]
impl TryFrom<RawRange> for AddressRange {
    type Error = ForwardedIpError;

    fn try_from(raw: RawRange) -> Result<Self> {
        Self::new(raw.start, raw.end)
    }
}

#[cfg(feature = "serde")]
impl From<AddressRange> for RawRange {
    fn from(range: AddressRange) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}

/// Reserved and private IPv4 blocks that never identify a real client:
/// RFC 1918, shared address space, IETF protocol assignments and
/// benchmarking.
pub const PRIVATE_RANGES: [AddressRange; 6] = [
    AddressRange::span(Ipv4Addr::new(10, 0, 0, 0), Ipv4Addr::new(10, 255, 255, 255)),
    AddressRange::span(Ipv4Addr::new(100, 64, 0, 0), Ipv4Addr::new(100, 127, 255, 255)),
    AddressRange::span(Ipv4Addr::new(172, 16, 0, 0), Ipv4Addr::new(172, 31, 255, 255)),
    AddressRange::span(Ipv4Addr::new(192, 0, 0, 0), Ipv4Addr::new(192, 0, 0, 255)),
    AddressRange::span(Ipv4Addr::new(192, 168, 0, 0), Ipv4Addr::new(192, 168, 255, 255)),
    AddressRange::span(Ipv4Addr::new(198, 18, 0, 0), Ipv4Addr::new(198, 19, 255, 255)),
];

/// Check `ip` against [`PRIVATE_RANGES`].
///
/// Only addresses with a 4-byte form are classified; IPv6 always returns
/// `false`. IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) count as IPv4.
pub fn is_private_subnet(ip: IpAddr) -> bool {
    in_ranges(&PRIVATE_RANGES, ip)
}

pub(crate) fn in_ranges(ranges: &[AddressRange], ip: IpAddr) -> bool {
    match ip.to_canonical() {
        IpAddr::V4(v4) => ranges.iter().any(|range| range.contains(v4)),
        IpAddr::V6(_) => false,
    }
}
