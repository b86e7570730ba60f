//! Derived subnet facts: usable range, counts, membership, enumeration

use std::fmt;

use snet_core::{Ipv4, Result, SubnetError};

use crate::Subnet;

/// Whether the network and broadcast addresses count as usable hosts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HostCount {
    /// Network and broadcast addresses are part of the usable range
    #[default]
    Inclusive,
    /// Usable range is the hosts strictly between network and broadcast
    Exclusive,
}

/// Read-only derived-value view over one [`Subnet`]
///
/// Carries the subnet and the host-count policy for the query; every value
/// is re-derived per call, there is no other state. Obtained from
/// [`Subnet::info`].
///
/// # Examples
///
/// ```
/// use snet_cidr::{HostCount, Subnet};
///
/// let info = Subnet::from_cidr("192.168.1.0/24").unwrap().info();
/// assert_eq!(info.network_address(), "192.168.1.0");
/// assert_eq!(info.address_count(), 256);
///
/// let hosts_only = info.with_host_count(HostCount::Exclusive);
/// assert_eq!(hosts_only.low_address(), "192.168.1.1");
/// assert_eq!(hosts_only.address_count(), 254);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SubnetInfo {
    subnet: Subnet,
    hosts: HostCount,
}

impl SubnetInfo {
    pub(crate) fn new(subnet: Subnet) -> Self {
        Self {
            subnet,
            hosts: HostCount::default(),
        }
    }

    /// Select the host-count policy for this view
    pub fn with_host_count(self, hosts: HostCount) -> Self {
        Self { hosts, ..self }
    }

    /// The host-count policy in effect
    pub fn host_count(&self) -> HostCount {
        self.hosts
    }

    /// Number of one-bits in the netmask, i.e. the CIDR prefix length
    pub fn mask_size(&self) -> u8 {
        self.subnet.prefix_len()
    }

    /// The reference address in dotted form
    pub fn address(&self) -> String {
        Ipv4(self.subnet.address()).to_string()
    }

    /// The netmask in dotted form
    pub fn netmask(&self) -> String {
        Ipv4(self.subnet.netmask()).to_string()
    }

    /// The network address in dotted form
    pub fn network_address(&self) -> String {
        Ipv4(self.subnet.network()).to_string()
    }

    /// The broadcast address in dotted form
    pub fn broadcast_address(&self) -> String {
        Ipv4(self.subnet.broadcast()).to_string()
    }

    /// First usable address in dotted form
    ///
    /// "0.0.0.0" for /31 and /32 under the exclusive policy, meaning no
    /// usable address rather than the literal zero address.
    pub fn low_address(&self) -> String {
        Ipv4(self.low()).to_string()
    }

    /// Last usable address in dotted form
    ///
    /// "0.0.0.0" for /31 and /32 under the exclusive policy, meaning no
    /// usable address rather than the literal zero address.
    pub fn high_address(&self) -> String {
        Ipv4(self.high()).to_string()
    }

    // broadcast - network, in u64 so /0 and high addresses stay unsigned
    fn range_width(&self) -> u64 {
        u64::from(self.subnet.broadcast()) - u64::from(self.subnet.network())
    }

    /// Packed first usable address
    pub fn low(&self) -> u32 {
        match self.hosts {
            HostCount::Inclusive => self.subnet.network(),
            HostCount::Exclusive if self.range_width() > 1 => self.subnet.network() + 1,
            HostCount::Exclusive => 0,
        }
    }

    /// Packed last usable address
    pub fn high(&self) -> u32 {
        match self.hosts {
            HostCount::Inclusive => self.subnet.broadcast(),
            HostCount::Exclusive if self.range_width() > 1 => self.subnet.broadcast() - 1,
            HostCount::Exclusive => 0,
        }
    }

    /// Check whether an address lies in `[low(), high()]`
    ///
    /// Comparisons are done in u64 so addresses at and above 128.0.0.0 are
    /// never treated as negative.
    pub fn is_in_range(&self, addr: Ipv4) -> bool {
        let value = u64::from(u32::from(addr));
        value >= u64::from(self.low()) && value <= u64::from(self.high())
    }

    /// Parse dotted-decimal text and check whether it lies in range
    pub fn is_in_range_str(&self, text: &str) -> Result<bool> {
        Ok(self.is_in_range(Ipv4::parse(text)?))
    }

    /// Count of usable addresses
    ///
    /// Zero for /31 and /32 under the exclusive policy; 2^32 for an
    /// inclusive /0, which is why this is a u64.
    pub fn address_count(&self) -> u64 {
        match self.hosts {
            HostCount::Inclusive => self.range_width() + 1,
            HostCount::Exclusive => self.range_width().saturating_sub(1),
        }
    }

    /// Narrow count accessor for callers stuck with 32-bit counts
    ///
    /// Fails with [`SubnetError::CountOverflow`] when the true count does
    /// not fit; prefer [`SubnetInfo::address_count`].
    pub fn address_count_u32(&self) -> Result<u32> {
        let count = self.address_count();
        u32::try_from(count).map_err(|_| SubnetError::CountOverflow(count))
    }

    /// Lazy ascending iterator over every usable address
    ///
    /// Empty when [`SubnetInfo::address_count`] is zero. Each call returns
    /// a fresh iterator. A /0 range is 2^32 addresses, so callers should
    /// bound consumption rather than collect blindly.
    ///
    /// # Examples
    ///
    /// ```
    /// use snet_cidr::Subnet;
    ///
    /// let info = Subnet::from_cidr("10.0.0.0/31").unwrap().info();
    /// let hosts: Vec<String> = info.addresses().map(|a| a.to_string()).collect();
    /// assert_eq!(hosts, ["10.0.0.0", "10.0.0.1"]);
    /// ```
    pub fn addresses(&self) -> HostIter {
        HostIter::new(self)
    }

    /// Canonical `<address>/<mask_size>` string for the reference address
    pub fn cidr_signature(&self) -> String {
        format!("{}/{}", self.address(), self.mask_size())
    }
}

impl fmt::Display for SubnetInfo {
    /// Multi-line summary of every derived value
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "CIDR Signature:\t[{}] Netmask: [{}]",
            self.cidr_signature(),
            self.netmask()
        )?;
        writeln!(f, "Network:\t[{}]", self.network_address())?;
        writeln!(f, "Broadcast:\t[{}]", self.broadcast_address())?;
        writeln!(f, "First Address:\t[{}]", self.low_address())?;
        writeln!(f, "Last Address:\t[{}]", self.high_address())?;
        write!(f, "# Addresses:\t[{}]", self.address_count())
    }
}

/// Lazy iterator over a subnet's usable addresses, ascending
pub struct HostIter {
    // u64 cursor so a range ending at 255.255.255.255 can terminate
    current: u64,
    end: u64,
}

impl HostIter {
    fn new(info: &SubnetInfo) -> Self {
        if info.address_count() == 0 {
            return Self { current: 1, end: 0 };
        }
        Self {
            current: u64::from(info.low()),
            end: u64::from(info.high()),
        }
    }
}

impl Iterator for HostIter {
    type Item = Ipv4;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current <= self.end {
            let addr = Ipv4(self.current as u32);
            self.current += 1;
            Some(addr)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(cidr: &str) -> SubnetInfo {
        Subnet::from_cidr(cidr).unwrap().info()
    }

    #[test]
    fn test_inclusive_bounds() {
        let info = info("192.168.1.0/24");
        assert_eq!(info.low(), 0xC0A80100); // 192.168.1.0
        assert_eq!(info.high(), 0xC0A801FF); // 192.168.1.255
        assert_eq!(info.address_count(), 256);
    }

    #[test]
    fn test_exclusive_bounds() {
        let info = info("192.168.1.0/24").with_host_count(HostCount::Exclusive);
        assert_eq!(info.low(), 0xC0A80101); // 192.168.1.1
        assert_eq!(info.high(), 0xC0A801FE); // 192.168.1.254
        assert_eq!(info.address_count(), 254);
    }

    #[test]
    fn test_slash16_scenario() {
        let info = info("192.168.0.1/16");
        assert_eq!(info.network_address(), "192.168.0.0");
        assert_eq!(info.broadcast_address(), "192.168.255.255");
        assert_eq!(info.mask_size(), 16);
        assert_eq!(info.address_count(), 65536);
    }

    #[test]
    fn test_slash32_exclusive_collapses() {
        let info = info("192.168.0.1/32").with_host_count(HostCount::Exclusive);
        assert_eq!(info.low(), 0);
        assert_eq!(info.high(), 0);
        assert_eq!(info.address_count(), 0);
        assert_eq!(info.low_address(), "0.0.0.0");
        assert_eq!(info.addresses().count(), 0);
    }

    #[test]
    fn test_slash31_exclusive_collapses() {
        let info = info("10.0.0.0/31").with_host_count(HostCount::Exclusive);
        assert_eq!(info.low(), 0);
        assert_eq!(info.high(), 0);
        assert_eq!(info.address_count(), 0);
    }

    #[test]
    fn test_slash31_inclusive() {
        let info = info("10.0.0.0/31");
        assert_eq!(info.address_count(), 2);
        let hosts: Vec<String> = info.addresses().map(|a| a.to_string()).collect();
        assert_eq!(hosts, ["10.0.0.0", "10.0.0.1"]);
    }

    #[test]
    fn test_slash32_inclusive() {
        let info = info("10.1.2.3/32");
        assert_eq!(info.address_count(), 1);
        assert_eq!(info.low_address(), "10.1.2.3");
        assert_eq!(info.high_address(), "10.1.2.3");
    }

    #[test]
    fn test_whole_space_count() {
        let info = info("0.0.0.0/0");
        assert_eq!(info.address_count(), 1u64 << 32);
        assert!(matches!(
            info.address_count_u32(),
            Err(SubnetError::CountOverflow(c)) if c == 1u64 << 32
        ));
    }

    #[test]
    fn test_narrow_count_fits() {
        assert_eq!(info("128.0.0.0/1").address_count_u32().unwrap(), 1 << 31);
        assert_eq!(info("192.168.1.0/24").address_count_u32().unwrap(), 256);
    }

    #[test]
    fn test_is_in_range() {
        let info = info("192.168.1.0/24").with_host_count(HostCount::Exclusive);
        assert!(info.is_in_range(Ipv4(0xC0A80101))); // 192.168.1.1
        assert!(info.is_in_range(Ipv4(0xC0A801FE))); // 192.168.1.254
        assert!(!info.is_in_range(Ipv4(0xC0A80100))); // network itself
        assert!(!info.is_in_range(Ipv4(0xC0A801FF))); // broadcast itself
        assert!(!info.is_in_range(Ipv4(0xC0A80201))); // 192.168.2.1
    }

    #[test]
    fn test_is_in_range_high_half() {
        // Addresses with the sign bit set must compare as unsigned
        let info = info("224.0.0.0/4");
        assert!(info.is_in_range(Ipv4(0xE0000001))); // 224.0.0.1
        assert!(info.is_in_range(Ipv4(0xEFFFFFFF))); // 239.255.255.255
        assert!(!info.is_in_range(Ipv4(0xDFFFFFFF))); // 223.255.255.255
        assert!(!info.is_in_range(Ipv4(0xF0000000))); // 240.0.0.0
    }

    #[test]
    fn test_is_in_range_str() {
        let info = info("10.0.0.0/8");
        assert!(info.is_in_range_str("10.255.0.1").unwrap());
        assert!(!info.is_in_range_str("11.0.0.1").unwrap());
        assert!(info.is_in_range_str("10.0.0.256").is_err());
    }

    #[test]
    fn test_bounds_are_members() {
        for cidr in ["10.0.0.0/30", "192.168.0.0/16", "1.2.3.4/32"] {
            for hosts in [HostCount::Inclusive, HostCount::Exclusive] {
                let info = Subnet::from_cidr(cidr).unwrap().info().with_host_count(hosts);
                if info.address_count() > 0 {
                    assert!(info.is_in_range(Ipv4(info.low())), "{} low", cidr);
                    assert!(info.is_in_range(Ipv4(info.high())), "{} high", cidr);
                }
            }
        }
    }

    #[test]
    fn test_addresses_matches_count() {
        for cidr in ["10.0.0.0/24", "10.0.0.0/31", "10.0.0.0/32", "172.16.0.0/28"] {
            for hosts in [HostCount::Inclusive, HostCount::Exclusive] {
                let info = Subnet::from_cidr(cidr).unwrap().info().with_host_count(hosts);
                assert_eq!(
                    info.addresses().count() as u64,
                    info.address_count(),
                    "{} {:?}",
                    cidr,
                    hosts
                );
            }
        }
    }

    #[test]
    fn test_addresses_ascending() {
        let info = info("10.0.0.0/29");
        let hosts: Vec<u32> = info.addresses().map(u32::from).collect();
        let mut sorted = hosts.clone();
        sorted.sort_unstable();
        assert_eq!(hosts, sorted);
        assert_eq!(hosts.len(), 8);
    }

    #[test]
    fn test_addresses_restartable() {
        let info = info("192.168.0.0/30");
        let first: Vec<u32> = info.addresses().map(u32::from).collect();
        let second: Vec<u32> = info.addresses().map(u32::from).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_addresses_ends_at_top_of_space() {
        let info = info("255.255.255.252/30");
        let hosts: Vec<String> = info.addresses().map(|a| a.to_string()).collect();
        assert_eq!(
            hosts,
            ["255.255.255.252", "255.255.255.253", "255.255.255.254", "255.255.255.255"]
        );
    }

    #[test]
    fn test_cidr_signature_keeps_reference_address() {
        let subnet = Subnet::from_address_and_mask("192.168.1.10", "255.255.255.0").unwrap();
        assert_eq!(subnet.info().cidr_signature(), "192.168.1.10/24");
    }

    #[test]
    fn test_textual_accessors() {
        let info = info("172.16.5.9/12");
        assert_eq!(info.address(), "172.16.5.9");
        assert_eq!(info.netmask(), "255.240.0.0");
        assert_eq!(info.network_address(), "172.16.0.0");
        assert_eq!(info.broadcast_address(), "172.31.255.255");
    }

    #[test]
    fn test_summary_display() {
        let summary = info("192.168.1.0/30").to_string();
        assert!(summary.contains("CIDR Signature:\t[192.168.1.0/30]"));
        assert!(summary.contains("Network:\t[192.168.1.0]"));
        assert!(summary.contains("Broadcast:\t[192.168.1.3]"));
        assert!(summary.contains("# Addresses:\t[4]"));
    }

    #[test]
    fn test_policy_change_is_per_view() {
        let subnet = Subnet::from_cidr("10.0.0.0/24").unwrap();
        let inclusive = subnet.info();
        let exclusive = inclusive.with_host_count(HostCount::Exclusive);
        assert_eq!(inclusive.address_count(), 256);
        assert_eq!(exclusive.address_count(), 254);
    }
}
