//! Subnet command handlers.

use tabled::Tabled;

use vtnrsc_core::{Inventory, ResourceManager, Subnet, SubnetId, TenantNetworkId};

use crate::cli::{GlobalOpts, SubnetFields, SubnetsArgs, SubnetsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SubnetRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Network")]
    network: String,
    #[tabled(rename = "CIDR")]
    cidr: String,
    #[tabled(rename = "Gateway")]
    gateway: String,
    #[tabled(rename = "DHCP")]
    dhcp: String,
}

impl From<&Subnet> for SubnetRow {
    fn from(s: &Subnet) -> Self {
        Self {
            id: s.id.to_string(),
            name: s.name.clone(),
            network: s.network_id.to_string(),
            cidr: s.cidr.to_string(),
            gateway: s.gateway_ip.map(|ip| ip.to_string()).unwrap_or_default(),
            dhcp: if s.dhcp_enabled { "yes" } else { "no" }.into(),
        }
    }
}

fn detail(s: &Subnet) -> String {
    let mut lines = vec![
        format!("ID:         {}", s.id),
        format!("Name:       {}", util::or_dash(&s.name)),
        format!("Network:    {}", s.network_id),
        format!("Tenant:     {}", s.tenant_id),
        format!("IP Version: {}", s.ip_version),
        format!("CIDR:       {}", s.cidr),
        format!(
            "Gateway:    {}",
            s.gateway_ip.map_or_else(|| "-".into(), |ip| ip.to_string())
        ),
        format!("DHCP:       {}", s.dhcp_enabled),
        format!("Shared:     {}", s.shared),
    ];
    for pool in &s.allocation_pools {
        lines.push(format!("Pool:       {pool}"));
    }
    for route in &s.host_routes {
        lines.push(format!("Route:      {} via {}", route.destination, route.next_hop));
    }
    lines.join("\n")
}

fn records(fields: SubnetFields) -> Result<Vec<Subnet>, CliError> {
    if let Some(path) = &fields.file.from_file {
        return util::read_records(path);
    }
    let id = fields.id.map_or_else(SubnetId::generate, SubnetId::from);
    let cidr = util::required(fields.cidr, "cidr")?;
    let mut subnet = Subnet::new(
        id,
        util::required(fields.network, "network")?,
        util::required(fields.tenant, "tenant")?,
        cidr,
    );
    subnet.name = fields.name;
    if let Some(version) = fields.ip_version {
        if version != cidr.version() {
            return Err(CliError::Validation {
                field: "--ip-version".into(),
                reason: format!("{version} does not match CIDR {cidr}"),
            });
        }
        subnet.ip_version = version;
    }
    subnet.gateway_ip = fields.gateway;
    subnet.dhcp_enabled = fields.dhcp;
    subnet.shared = fields.shared;
    subnet.allocation_pools = fields.allocation_pools;
    subnet.host_routes = fields.host_routes;
    Ok(vec![subnet])
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(
    inventory: &Inventory,
    args: SubnetsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let subnets = inventory.subnets();
    match args.command {
        SubnetsCommand::List { network } => {
            let all = match network {
                Some(network) => subnets.get_by_network(&TenantNetworkId::from(network))?,
                None => subnets.get_all()?,
            };
            let out = output::render_list(
                &global.output(),
                &util::sorted(all),
                |s| SubnetRow::from(s),
                |s| s.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SubnetsCommand::Get { id } => {
            let subnet = util::get_or_not_found(subnets, &SubnetId::from(id), "subnets list")?;
            let out =
                output::render_single(&global.output(), &subnet, detail, |s| s.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SubnetsCommand::Create(fields) => util::create(subnets, records(fields)?, global),

        SubnetsCommand::Update(fields) => {
            if fields.file.from_file.is_none() && fields.id.is_none() {
                return Err(CliError::Validation {
                    field: "--id".into(),
                    reason: "update needs the ID of the subnet to replace".into(),
                });
            }
            util::update(subnets, records(fields)?, global)
        }

        SubnetsCommand::Remove(args) => util::remove(subnets, args.ids, global),
    }
}
