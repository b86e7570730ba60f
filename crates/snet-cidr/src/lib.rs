//! IPv4 CIDR subnet calculator
//!
//! Parses subnet definitions and computes the values an access-control layer
//! needs for source-address matching:
//! - Parse CIDR notation (e.g., "192.168.0.1/16") or an address/netmask pair
//! - Derive network, broadcast, and the usable address range
//! - Check if an address is in range
//! - Enumerate usable addresses lazily
//!
//! # Examples
//!
//! ```
//! use snet_cidr::Subnet;
//!
//! let subnet = Subnet::from_cidr("192.168.0.1/16").unwrap();
//! assert_eq!(subnet.network(), 0xC0A80000); // 192.168.0.0
//! assert_eq!(subnet.broadcast(), 0xC0A8FFFF); // 192.168.255.255
//!
//! let info = subnet.info();
//! assert_eq!(info.mask_size(), 16);
//! assert!(info.is_in_range_str("192.168.42.7").unwrap());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

mod info;

pub use info::{HostCount, HostIter, SubnetInfo};
pub use snet_core::{Ipv4, Result, SubnetError};

/// Validated IPv4 subnet definition
///
/// Holds the reference address and the netmask; the network and broadcast
/// addresses are derived, never stored. The netmask of every live `Subnet`
/// is a contiguous run of 0-32 one-bits from the most significant bit, the
/// constructors enforce it.
///
/// # Examples
///
/// ```
/// use snet_cidr::Subnet;
///
/// let subnet = Subnet::from_cidr("10.0.0.0/8").unwrap();
/// assert_eq!(subnet.prefix_len(), 8);
/// assert_eq!(subnet.netmask(), 0xFF000000); // 255.0.0.0
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    /// Reference address as supplied, not masked
    address: u32,
    /// Prefix-shaped network mask
    netmask: u32,
}

impl Subnet {
    /// Parse CIDR notation, e.g. "192.168.0.1/16"
    ///
    /// The address part must be a strict dotted-decimal address and the
    /// prefix part 1-3 decimal digits. A shape mismatch fails with
    /// [`SubnetError::InvalidCidr`]; a numeric prefix outside 0-32 fails
    /// with [`SubnetError::InvalidPrefixLength`].
    ///
    /// # Examples
    ///
    /// ```
    /// use snet_cidr::Subnet;
    ///
    /// let subnet = Subnet::from_cidr("192.168.1.10/24").unwrap();
    /// assert_eq!(subnet.network(), 0xC0A80100);
    /// assert!(Subnet::from_cidr("192.168.1.10").is_err());
    /// assert!(Subnet::from_cidr("192.168.1.10/33").is_err());
    /// ```
    pub fn from_cidr(text: &str) -> Result<Self> {
        let (addr_text, prefix_text) = text
            .split_once('/')
            .ok_or_else(|| SubnetError::InvalidCidr(text.to_string()))?;
        let address =
            Ipv4::parse(addr_text).map_err(|_| SubnetError::InvalidCidr(text.to_string()))?;
        let prefix =
            parse_prefix(prefix_text).ok_or_else(|| SubnetError::InvalidCidr(text.to_string()))?;
        if prefix > 32 {
            return Err(SubnetError::InvalidPrefixLength(prefix));
        }
        Ok(Self {
            address: address.into(),
            netmask: mask_from_prefix(prefix as u8),
        })
    }

    /// Build from a dotted-decimal address and a dotted-decimal netmask
    ///
    /// Both arguments get the strict address parse. The mask must be
    /// prefix-shaped; a mask like "255.0.255.0" fails with
    /// [`SubnetError::NonContiguousMask`] rather than being reinterpreted
    /// by its bit count.
    ///
    /// # Examples
    ///
    /// ```
    /// use snet_cidr::Subnet;
    ///
    /// let subnet = Subnet::from_address_and_mask("192.168.1.10", "255.255.255.0").unwrap();
    /// assert_eq!(subnet.prefix_len(), 24);
    /// ```
    pub fn from_address_and_mask(address: &str, mask: &str) -> Result<Self> {
        let address = Ipv4::parse(address)?;
        let netmask = u32::from(Ipv4::parse(mask)?);
        if netmask.leading_ones() + netmask.trailing_zeros() != 32 {
            return Err(SubnetError::NonContiguousMask(mask.to_string()));
        }
        Ok(Self {
            address: address.into(),
            netmask,
        })
    }

    /// Build from an already-packed address and a prefix length
    ///
    /// For callers that hold binary values, e.g. decoded rule storage. The
    /// only failure is a prefix length above 32.
    pub fn from_packed(address: u32, prefix_len: u8) -> Result<Self> {
        if prefix_len > 32 {
            return Err(SubnetError::InvalidPrefixLength(u16::from(prefix_len)));
        }
        Ok(Self {
            address,
            netmask: mask_from_prefix(prefix_len),
        })
    }

    /// The reference address as supplied
    pub fn address(&self) -> u32 {
        self.address
    }

    /// The network mask
    pub fn netmask(&self) -> u32 {
        self.netmask
    }

    /// Network address (`address & netmask`)
    pub fn network(&self) -> u32 {
        self.address & self.netmask
    }

    /// Broadcast address (`network | !netmask`)
    pub fn broadcast(&self) -> u32 {
        self.network() | !self.netmask
    }

    /// Prefix length, the number of one-bits in the netmask
    pub fn prefix_len(&self) -> u8 {
        self.netmask.count_ones() as u8
    }

    /// Derived-value view with the default inclusive host-count policy
    ///
    /// Use [`SubnetInfo::with_host_count`] to exclude the network and
    /// broadcast addresses from the usable range.
    pub fn info(&self) -> SubnetInfo {
        SubnetInfo::new(*self)
    }
}

impl fmt::Display for Subnet {
    /// Normalized `<network>/<prefix>` form
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", Ipv4(self.network()), self.prefix_len())
    }
}

impl FromStr for Subnet {
    type Err = SubnetError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_cidr(s)
    }
}

fn parse_prefix(group: &str) -> Option<u16> {
    if group.is_empty() || group.len() > 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    group.parse().ok()
}

fn mask_from_prefix(prefix: u8) -> u32 {
    match prefix {
        0 => 0,
        p => u32::MAX << (32 - u32::from(p)),
    }
}
