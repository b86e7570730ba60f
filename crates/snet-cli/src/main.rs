use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use snet_cidr::{HostCount, Subnet, SubnetInfo};
use tracing::{debug, Level};

/// IPv4 subnet calculator for network-based access rules
#[derive(Parser)]
#[command(name = "snet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "human", global = true)]
    output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every derived value for a subnet
    Info(InfoArgs),
    /// Test whether an address falls in a subnet's usable range
    Check(CheckArgs),
    /// List a subnet's usable addresses in ascending order
    Hosts(HostsArgs),
}

#[derive(Parser)]
struct SubnetArgs {
    /// Subnet in CIDR notation (e.g. 192.168.0.1/16), or a bare address
    /// combined with --mask
    #[arg(value_name = "SUBNET")]
    subnet: String,

    /// Dotted-decimal netmask, when SUBNET is a bare address
    #[arg(short, long, value_name = "MASK")]
    mask: Option<String>,

    /// Exclude the network and broadcast addresses from the usable range
    #[arg(short, long)]
    exclusive: bool,
}

#[derive(Parser)]
struct InfoArgs {
    #[command(flatten)]
    subnet: SubnetArgs,
}

#[derive(Parser)]
struct CheckArgs {
    #[command(flatten)]
    subnet: SubnetArgs,

    /// Candidate address, e.g. a request's source IP
    #[arg(value_name = "ADDRESS")]
    address: String,
}

#[derive(Parser)]
struct HostsArgs {
    #[command(flatten)]
    subnet: SubnetArgs,

    /// Print at most this many addresses
    #[arg(short, long, value_name = "N")]
    limit: Option<u64>,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable table output
    Human,
    /// JSON output (pretty-printed)
    Json,
    /// JSON output (compact)
    JsonCompact,
}

#[derive(Serialize)]
struct SubnetReport {
    cidr_signature: String,
    address: String,
    netmask: String,
    mask_size: u8,
    network: String,
    broadcast: String,
    first_address: String,
    last_address: String,
    address_count: u64,
}

impl SubnetReport {
    fn new(info: &SubnetInfo) -> Self {
        Self {
            cidr_signature: info.cidr_signature(),
            address: info.address(),
            netmask: info.netmask(),
            mask_size: info.mask_size(),
            network: info.network_address(),
            broadcast: info.broadcast_address(),
            first_address: info.low_address(),
            last_address: info.high_address(),
            address_count: info.address_count(),
        }
    }
}

#[derive(Serialize)]
struct CheckReport {
    subnet: String,
    address: String,
    in_range: bool,
}

#[derive(Serialize)]
struct HostsReport {
    subnet: String,
    address_count: u64,
    truncated: bool,
    addresses: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Info(args) => handle_info(args, cli.output)?,
        Commands::Check(args) => {
            let in_range = handle_check(args, cli.output)?;
            if !in_range {
                std::process::exit(1);
            }
        }
        Commands::Hosts(args) => handle_hosts(args, cli.output)?,
    }

    Ok(())
}

fn resolve_subnet(args: &SubnetArgs) -> Result<SubnetInfo> {
    let subnet = match &args.mask {
        Some(mask) => Subnet::from_address_and_mask(&args.subnet, mask)
            .with_context(|| format!("cannot parse subnet {} mask {}", args.subnet, mask))?,
        None => Subnet::from_cidr(&args.subnet)
            .with_context(|| format!("cannot parse subnet {}", args.subnet))?,
    };
    let hosts = if args.exclusive {
        HostCount::Exclusive
    } else {
        HostCount::Inclusive
    };
    debug!(subnet = %subnet, exclusive = args.exclusive, "resolved subnet");
    Ok(subnet.info().with_host_count(hosts))
}

fn handle_info(args: InfoArgs, format: OutputFormat) -> Result<()> {
    let info = resolve_subnet(&args.subnet)?;
    let report = SubnetReport::new(&info);

    match format {
        OutputFormat::Human => print_info_human(&report),
        OutputFormat::Json => print_json(&report, true)?,
        OutputFormat::JsonCompact => print_json(&report, false)?,
    }
    Ok(())
}

fn handle_check(args: CheckArgs, format: OutputFormat) -> Result<bool> {
    let info = resolve_subnet(&args.subnet)?;
    let in_range = info
        .is_in_range_str(&args.address)
        .with_context(|| format!("cannot parse address {}", args.address))?;
    debug!(address = %args.address, in_range, "membership test");

    let report = CheckReport {
        subnet: info.cidr_signature(),
        address: args.address,
        in_range,
    };

    match format {
        OutputFormat::Human => {
            let verdict = if report.in_range {
                "in range".green()
            } else {
                "out of range".red()
            };
            println!("{} {} {}", report.address.bold(), verdict, report.subnet.dimmed());
        }
        OutputFormat::Json => print_json(&report, true)?,
        OutputFormat::JsonCompact => print_json(&report, false)?,
    }
    Ok(in_range)
}

fn handle_hosts(args: HostsArgs, format: OutputFormat) -> Result<()> {
    let info = resolve_subnet(&args.subnet)?;
    let count = info.address_count();
    let take = args.limit.unwrap_or(count).min(count);
    debug!(count, take, "enumerating hosts");

    // take is bounded before collecting; a /0 range is 2^32 addresses
    let addresses: Vec<String> = info
        .addresses()
        .take(usize::try_from(take).unwrap_or(usize::MAX))
        .map(|a| a.to_string())
        .collect();

    let report = HostsReport {
        subnet: info.cidr_signature(),
        address_count: count,
        truncated: (addresses.len() as u64) < count,
        addresses,
    };

    match format {
        OutputFormat::Human => {
            for addr in &report.addresses {
                println!("{}", addr);
            }
            if report.truncated {
                eprintln!(
                    "{} showing {} of {} addresses",
                    "›".blue(),
                    report.addresses.len(),
                    report.address_count
                );
            }
        }
        OutputFormat::Json => print_json(&report, true)?,
        OutputFormat::JsonCompact => print_json(&report, false)?,
    }
    Ok(())
}

fn print_info_human(report: &SubnetReport) {
    println!();
    println!("{}", "Subnet Report".bold().cyan());
    println!("{}", "─".repeat(50).dimmed());
    println!("{:>15}: {}", "CIDR".bold(), report.cidr_signature.green());
    println!("{:>15}: {}", "Address".bold(), report.address);
    println!("{:>15}: {}", "Netmask".bold(), report.netmask);
    println!("{:>15}: /{}", "Mask size".bold(), report.mask_size);
    println!("{:>15}: {}", "Network".bold(), report.network);
    println!("{:>15}: {}", "Broadcast".bold(), report.broadcast);
    println!("{:>15}: {}", "First address".bold(), report.first_address);
    println!("{:>15}: {}", "Last address".bold(), report.last_address);
    println!("{:>15}: {}", "Addresses".bold(), report.address_count);
    println!();
}

fn print_json<T: Serialize>(report: &T, pretty: bool) -> Result<()> {
    if pretty {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", serde_json::to_string(report)?);
    }
    Ok(())
}
