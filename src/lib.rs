/* src/lib.rs */
//! # Forwarded IP
//!
//! Resolve the real client IP address of an HTTP request from the
//! `X-Forwarded-For` and `X-Real-Ip` headers set by reverse proxies.
//!
//! Each header's comma-separated list is scanned from right to left. The
//! first global unicast address outside the private and reserved IPv4
//! ranges is the client. When nothing qualifies the result is `127.0.0.1`.
//!
//! ## Features
//!
//! - Works over any header source through the [`HeaderLookup`] trait
//! - Configurable header order, fallback and reserved ranges
//! - Optional `serde` support for loading the resolver from configuration
//! - Optional Axum middleware and extractor integration via the `axum` feature
//!
//! ## Examples
//!
//! ### Basic Usage
//!
//! ```rust
//! use forwarded_ip::{HeaderMap, request_ip};
//!
//! let mut headers = HeaderMap::new();
//! headers.insert("X-Forwarded-For".to_string(), "203.0.113.7, 192.168.1.1".to_string());
//!
//! // 192.168.1.1 is private, so the scan moves left.
//! assert_eq!(request_ip(&headers), "203.0.113.7");
//! ```

pub mod error;
pub mod extractor;
pub mod headers;
pub mod range;

#[cfg(feature = "axum")]
pub mod middleware;

pub use error::{ForwardedIpError, Result};
pub use extractor::{
    ClientIpResolver, DEFAULT_HEADERS, FALLBACK_IP, is_global_unicast, request_ip,
};
pub use headers::{HeaderLookup, HeaderMap};
pub use range::{AddressRange, PRIVATE_RANGES, is_private_subnet};

#[cfg(feature = "axum")]
pub use middleware::{ClientIp, ClientIpLayer, ClientIpService};

/// Re-export commonly used types
pub use std::net::IpAddr;
