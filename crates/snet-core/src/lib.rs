//! Core types for SNET (subnet toolkit)
//!
//! This crate provides the foundational types used throughout the SNET
//! workspace:
//! - [`Ipv4`] - Packed IPv4 address with a strict dotted-decimal codec
//! - [`SubnetError`] - Error types
//!
//!
//! ```
//! use snet_core::Ipv4;
//!
//! let addr = Ipv4::parse("192.168.0.1").unwrap();
//! assert_eq!(u32::from(addr), 0xC0A80001);
//! assert_eq!(addr.to_string(), "192.168.0.1");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Packed IPv4 address
///
/// The four octets are packed big-endian into a `u32`
/// (`octet0 << 24 | octet1 << 16 | octet2 << 8 | octet3`), the form all
/// mask arithmetic in this workspace operates on.
///
/// # Examples
///
/// ```
/// use snet_core::Ipv4;
///
/// let dns = Ipv4(0x08080808);
/// assert_eq!(dns.to_string(), "8.8.8.8");
/// assert_eq!(dns.octets(), [8, 8, 8, 8]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ipv4(pub u32);

impl Ipv4 {
    /// Parse dotted-decimal text into a packed address
    ///
    /// Accepts exactly four groups of 1-3 decimal digits separated by dots,
    /// each group in `[0, 255]`. Leading zeros are allowed ("010" is 10).
    ///
    /// # Examples
    ///
    /// ```
    /// use snet_core::Ipv4;
    ///
    /// assert_eq!(Ipv4::parse("10.0.0.1").unwrap(), Ipv4(0x0A000001));
    /// assert!(Ipv4::parse("256.1.1.1").is_err());
    /// assert!(Ipv4::parse("1.2.3").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let mut octets = [0u8; 4];
        let mut groups = text.split('.');
        for slot in &mut octets {
            *slot = groups
                .next()
                .and_then(parse_octet)
                .ok_or_else(|| SubnetError::InvalidAddress(text.to_string()))?;
        }
        if groups.next().is_some() {
            return Err(SubnetError::InvalidAddress(text.to_string()));
        }
        Ok(Self::from_octets(octets))
    }

    /// Check whether text is a valid dotted-decimal address
    ///
    /// Applies the same digit-group and octet-range validation as
    /// [`Ipv4::parse`].
    pub fn is_valid(text: &str) -> bool {
        Self::parse(text).is_ok()
    }

    /// The four octets, most significant first
    pub fn octets(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// Pack four octets, most significant first
    pub fn from_octets(octets: [u8; 4]) -> Self {
        Ipv4(u32::from_be_bytes(octets))
    }
}

fn parse_octet(group: &str) -> Option<u8> {
    if group.is_empty() || group.len() > 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u16 = group.parse().ok()?;
    u8::try_from(value).ok()
}

impl fmt::Display for Ipv4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.octets();
        write!(f, "{}.{}.{}.{}", a, b, c, d)
    }
}

impl From<u32> for Ipv4 {
    fn from(value: u32) -> Self {
        Ipv4(value)
    }
}

impl From<Ipv4> for u32 {
    fn from(value: Ipv4) -> Self {
        value.0
    }
}

impl FromStr for Ipv4 {
    type Err = SubnetError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Error types for subnet operations
#[derive(Error, Debug)]
pub enum SubnetError {
    /// Text is not a four-group dotted-decimal address, or an octet is
    /// outside 0-255
    #[error("Invalid IPv4 address: {0}")]
    InvalidAddress(String),

    /// Text does not have the `<address>/<prefix>` shape
    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),

    /// Prefix length outside 0-32
    #[error("Invalid prefix length: {0} (must be 0-32)")]
    InvalidPrefixLength(u16),

    /// Netmask bits are not a contiguous run from the most significant bit
    #[error("Non-contiguous netmask: {0}")]
    NonContiguousMask(String),

    /// True address count exceeds the narrow accessor's range
    #[error("Address count {0} does not fit in a u32")]
    CountOverflow(u64),
}

/// Result type alias for subnet operations
pub type Result<T> = std::result::Result<T, SubnetError>;
