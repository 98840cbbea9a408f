//! Clap derive structures for the `vtnrsc` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueEnum};
use strum::VariantNames;

use vtnrsc_core::{
    AllocationPool, AllowedAddressPair, FixedIp, HostRoute, IpPrefix, IpVersion, MacAddress,
    NetworkState, NetworkType, PortState,
};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// vtnrsc -- tenant network resource inventory
#[derive(Debug, Parser)]
#[command(
    name = "vtnrsc",
    version,
    about = "Manage tenant networks, subnets and virtual ports",
    long_about = "Inventory of SDN tenant resources.\n\n\
        Subnets and virtual ports are checked against the network inventory\n\
        before they are written. State is kept in a snapshot file between runs\n\
        unless --ephemeral is given.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Output format [default: table]
    #[arg(long, short = 'o', env = "VTNRSC_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Directory holding the inventory snapshot (overrides config)
    #[arg(long, env = "VTNRSC_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Keep everything in memory; neither load nor save a snapshot
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Seconds to wait for a counter increment (overrides config)
    #[arg(long, env = "VTNRSC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

impl GlobalOpts {
    pub fn output(&self) -> OutputFormat {
        self.output.clone().unwrap_or(OutputFormat::Table)
    }

    pub fn color(&self) -> ColorMode {
        self.color.clone().unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage tenant networks
    #[command(alias = "net", alias = "n")]
    Networks(NetworksArgs),

    /// Manage subnets
    #[command(alias = "sub", alias = "s")]
    Subnets(SubnetsArgs),

    /// Manage virtual ports
    #[command(alias = "p")]
    Ports(PortsArgs),

    /// Increment and read named counters
    Counter(CounterArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Value parsers ────────────────────────────────────────────────────

/// Parse a closed enum by its exact literal name, listing the accepted
/// names on mismatch.
fn exact_name<T>(raw: &str) -> Result<T, String>
where
    T: FromStr + VariantNames,
{
    raw.parse()
        .map_err(|_| format!("expected one of {}", T::VARIANTS.join(", ")))
}

// ── Shared arguments ─────────────────────────────────────────────────

/// Load records from a JSON file instead of flags.
#[derive(Debug, Args)]
pub struct FromFileArgs {
    /// JSON file holding one record or an array of records
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Identifiers to remove (absent ones are ignored)
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<String>,
}

// ── Networks ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NetworksArgs {
    #[command(subcommand)]
    pub command: NetworksCommand,
}

#[derive(Debug, Subcommand)]
pub enum NetworksCommand {
    /// List all networks
    #[command(alias = "ls")]
    List {
        /// Only networks owned by this tenant
        #[arg(long)]
        tenant: Option<String>,
    },

    /// Get network details
    Get {
        /// Network ID
        id: String,
    },

    /// Create one network (or a batch with --from-file)
    Create(NetworkFields),

    /// Replace networks by ID
    Update(NetworkFields),

    /// Remove networks by ID
    #[command(alias = "rm")]
    Remove(RemoveArgs),
}

#[derive(Debug, Args)]
pub struct NetworkFields {
    #[command(flatten)]
    pub file: FromFileArgs,

    /// Network ID (generated on create when omitted)
    #[arg(long)]
    pub id: Option<String>,

    /// Network name
    #[arg(long, required_unless_present = "from_file")]
    pub name: Option<String>,

    /// Owning tenant
    #[arg(long, required_unless_present = "from_file")]
    pub tenant: Option<String>,

    /// Network state
    #[arg(long, default_value = "ACTIVE", value_parser = exact_name::<NetworkState>)]
    pub state: NetworkState,

    /// Administrative state
    #[arg(long, default_value = "true", action = clap::ArgAction::Set)]
    pub admin_state_up: bool,

    /// Share with every tenant
    #[arg(long)]
    pub shared: bool,

    /// Reachable through an external router
    #[arg(long)]
    pub router_external: bool,

    /// Network type
    #[arg(long = "type", default_value = "LOCAL", value_parser = exact_name::<NetworkType>)]
    pub network_type: NetworkType,

    /// Physical network descriptor
    #[arg(long, default_value = "")]
    pub physical_network: String,

    /// Segmentation ID (VLAN / VNI)
    #[arg(long, default_value = "")]
    pub segmentation_id: String,
}

// ── Subnets ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SubnetsArgs {
    #[command(subcommand)]
    pub command: SubnetsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SubnetsCommand {
    /// List all subnets
    #[command(alias = "ls")]
    List {
        /// Only subnets of this network
        #[arg(long)]
        network: Option<String>,
    },

    /// Get subnet details
    Get {
        /// Subnet ID
        id: String,
    },

    /// Create one subnet (or a batch with --from-file)
    Create(SubnetFields),

    /// Replace subnets by ID
    Update(SubnetFields),

    /// Remove subnets by ID
    #[command(alias = "rm")]
    Remove(RemoveArgs),
}

#[derive(Debug, Args)]
pub struct SubnetFields {
    #[command(flatten)]
    pub file: FromFileArgs,

    /// Subnet ID (generated on create when omitted)
    #[arg(long)]
    pub id: Option<String>,

    /// Parent network ID
    #[arg(long, required_unless_present = "from_file")]
    pub network: Option<String>,

    /// Owning tenant
    #[arg(long, required_unless_present = "from_file")]
    pub tenant: Option<String>,

    /// Address prefix (e.g., 10.0.0.0/24)
    #[arg(long, required_unless_present = "from_file")]
    pub cidr: Option<IpPrefix>,

    /// Subnet name
    #[arg(long, default_value = "")]
    pub name: String,

    /// IP version (derived from --cidr when omitted)
    #[arg(long, value_parser = exact_name::<IpVersion>)]
    pub ip_version: Option<IpVersion>,

    /// Gateway address
    #[arg(long)]
    pub gateway: Option<IpAddr>,

    /// Enable DHCP
    #[arg(long, default_value = "true", action = clap::ArgAction::Set)]
    pub dhcp: bool,

    /// Share with every tenant
    #[arg(long)]
    pub shared: bool,

    /// DHCP allocation pool as START-END (repeatable)
    #[arg(long = "allocation-pool")]
    pub allocation_pools: Vec<AllocationPool>,

    /// Host route as DESTINATION,NEXT_HOP (repeatable)
    #[arg(long = "host-route")]
    pub host_routes: Vec<HostRoute>,
}

// ── Ports ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PortsArgs {
    #[command(subcommand)]
    pub command: PortsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PortsCommand {
    /// List virtual ports, optionally filtered
    #[command(alias = "ls")]
    List(PortListArgs),

    /// Get virtual port details
    Get {
        /// Port ID
        id: String,
    },

    /// Create one port (or a batch with --from-file)
    Create(PortFields),

    /// Replace ports by ID
    Update(PortFields),

    /// Remove ports by ID
    #[command(alias = "rm")]
    Remove(RemoveArgs),
}

#[derive(Debug, Args)]
#[group(multiple = false)]
pub struct PortListArgs {
    /// Only ports on this network
    #[arg(long)]
    pub network: Option<String>,

    /// Only ports owned by this tenant
    #[arg(long)]
    pub tenant: Option<String>,

    /// Only ports attached to this device
    #[arg(long)]
    pub device: Option<String>,
}

#[derive(Debug, Args)]
pub struct PortFields {
    #[command(flatten)]
    pub file: FromFileArgs,

    /// Port ID (generated on create when omitted)
    #[arg(long)]
    pub id: Option<String>,

    /// Network ID
    #[arg(long, required_unless_present = "from_file")]
    pub network: Option<String>,

    /// Owning tenant
    #[arg(long, required_unless_present = "from_file")]
    pub tenant: Option<String>,

    /// Attachment device
    #[arg(long, required_unless_present = "from_file")]
    pub device: Option<String>,

    /// MAC address (e.g., fa:16:3e:00:00:01)
    #[arg(long, required_unless_present = "from_file")]
    pub mac: Option<MacAddress>,

    /// Port name
    #[arg(long, default_value = "")]
    pub name: String,

    /// Port state
    #[arg(long, default_value = "ACTIVE", value_parser = exact_name::<PortState>)]
    pub state: PortState,

    /// Administrative state
    #[arg(long, default_value = "true", action = clap::ArgAction::Set)]
    pub admin_state_up: bool,

    /// Owner label (e.g., compute:nova)
    #[arg(long, default_value = "")]
    pub device_owner: String,

    /// Fixed address as SUBNET_ID=IP (repeatable)
    #[arg(long = "fixed-ip")]
    pub fixed_ips: Vec<FixedIp>,

    /// Host the port is bound to
    #[arg(long)]
    pub binding_host: Option<String>,

    /// Extra source address as IP,MAC (repeatable)
    #[arg(long = "allowed-address-pair")]
    pub allowed_address_pairs: Vec<AllowedAddressPair>,

    /// Security group ID (repeatable)
    #[arg(long = "security-group")]
    pub security_groups: Vec<String>,
}

// ── Counter ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CounterArgs {
    #[command(subcommand)]
    pub command: CounterCommand,
}

#[derive(Debug, Subcommand)]
pub enum CounterCommand {
    /// Atomically increment a counter and print its new value
    #[command(alias = "inc")]
    Increment(CounterTarget),

    /// Print the current value without changing it
    Get(CounterTarget),
}

#[derive(Debug, Args)]
pub struct CounterTarget {
    /// Counter name
    pub name: String,

    /// Use the single-node, in-memory counter instead of the replicated one
    #[arg(long, short = 'i')]
    pub in_memory: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Set a configuration value
    Set {
        /// Config key (e.g., "store.data_dir", "defaults.output")
        key: String,

        /// Value to set
        value: String,
    },

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
