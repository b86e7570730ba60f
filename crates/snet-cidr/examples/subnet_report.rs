//! Subnet calculator example
//!
//! Run with: cargo run --example subnet_report

use snet_cidr::{HostCount, Subnet};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("SNET - Subnet Report Example\n");

    let subnet = Subnet::from_cidr("192.168.1.0/28")?;
    let info = subnet.info().with_host_count(HostCount::Exclusive);

    println!("CIDR: {}", "192.168.1.0/28");
    println!("─────────────────────────────");
    println!("Network:       {}", info.network_address());
    println!("Broadcast:     {}", info.broadcast_address());
    println!("First usable:  {}", info.low_address());
    println!("Last usable:   {}", info.high_address());
    println!("Usable hosts:  {}", info.address_count());
    println!("Prefix length: /{}", info.mask_size());

    println!("\nChecking source addresses:");
    for source in ["192.168.1.5", "192.168.1.15", "192.168.2.1"] {
        println!("{} in range? {}", source, info.is_in_range_str(source)?);
    }

    println!("\nUsable addresses:");
    for (i, addr) in info.addresses().enumerate() {
        println!("  {}: {}", i + 1, addr);
    }

    Ok(())
}
