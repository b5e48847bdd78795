/* src/error.rs */

use std::net::Ipv4Addr;

use thiserror::Error;

/// Result type alias for operations that may fail with `ForwardedIpError`.
pub type Result<T> = std::result::Result<T, ForwardedIpError>;

/// Errors raised while configuring a resolver.
///
/// Resolution itself never fails; these only come out of the builder and
/// range constructors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForwardedIpError {
    /// Invalid IP address format.
    #[error("Invalid IP address format: {0}")]
    InvalidIpFormat(String),

    /// Range whose start sorts after its end.
    #[error("Invalid address range: {start} is after {end}")]
    InvalidRange { start: Ipv4Addr, end: Ipv4Addr },
}
