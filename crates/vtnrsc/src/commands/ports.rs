//! Virtual port command handlers.

use tabled::Tabled;

use vtnrsc_core::{
    Inventory, PortFilter, SecurityGroupId, VirtualPort, VirtualPortId,
};

use crate::cli::{GlobalOpts, PortFields, PortListArgs, PortsArgs, PortsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PortRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Network")]
    network: String,
    #[tabled(rename = "Tenant")]
    tenant: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Fixed IPs")]
    fixed_ips: String,
}

impl From<&VirtualPort> for PortRow {
    fn from(p: &VirtualPort) -> Self {
        Self {
            id: p.id.to_string(),
            network: p.network_id.to_string(),
            tenant: p.tenant_id.to_string(),
            device: p.device_id.to_string(),
            mac: p.mac_address.to_string(),
            state: p.state.to_string(),
            fixed_ips: util::join(&p.fixed_ips),
        }
    }
}

fn detail(p: &VirtualPort, color: bool) -> String {
    let mut lines = vec![
        format!("ID:              {}", p.id),
        format!("Name:            {}", util::or_dash(&p.name)),
        format!("Network:         {}", p.network_id),
        format!("Tenant:          {}", p.tenant_id),
        format!("Device:          {}", p.device_id),
        format!("Device Owner:    {}", util::or_dash(&p.device_owner)),
        format!("MAC:             {}", p.mac_address),
        format!("State:           {}", output::paint_state(&p.state.to_string(), color)),
        format!("Admin State Up:  {}", p.admin_state_up),
        format!(
            "Binding Host:    {}",
            util::or_dash(p.binding_host_id.as_deref().unwrap_or_default())
        ),
    ];
    for ip in &p.fixed_ips {
        lines.push(format!("Fixed IP:        {ip}"));
    }
    for pair in &p.allowed_address_pairs {
        lines.push(format!("Allowed Pair:    {} {}", pair.ip(), pair.mac()));
    }
    if !p.security_groups.is_empty() {
        lines.push(format!("Security Groups: {}", util::join(&p.security_groups)));
    }
    lines.join("\n")
}

fn filter(args: PortListArgs) -> PortFilter {
    if let Some(network) = args.network {
        PortFilter::Network(network.into())
    } else if let Some(tenant) = args.tenant {
        PortFilter::Tenant(tenant.into())
    } else if let Some(device) = args.device {
        PortFilter::Device(device.into())
    } else {
        PortFilter::All
    }
}

fn records(fields: PortFields) -> Result<Vec<VirtualPort>, CliError> {
    if let Some(path) = &fields.file.from_file {
        return util::read_records(path);
    }
    let id = fields.id.map_or_else(VirtualPortId::generate, VirtualPortId::from);
    let mut port = VirtualPort::new(
        id,
        util::required(fields.network, "network")?,
        util::required(fields.tenant, "tenant")?,
        util::required(fields.device, "device")?,
        util::required(fields.mac, "mac")?,
    );
    port.name = fields.name;
    port.state = fields.state;
    port.admin_state_up = fields.admin_state_up;
    port.device_owner = fields.device_owner;
    port.fixed_ips = fields.fixed_ips;
    port.binding_host_id = fields.binding_host;
    port.allowed_address_pairs = fields.allowed_address_pairs;
    port.security_groups = fields
        .security_groups
        .into_iter()
        .map(SecurityGroupId::from)
        .collect();
    Ok(vec![port])
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(
    inventory: &Inventory,
    args: PortsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let ports = inventory.ports();
    match args.command {
        PortsCommand::List(list) => {
            let matched = util::sorted(ports.get_ports(&filter(list))?);
            let out = output::render_list(
                &global.output(),
                &matched,
                |p| PortRow::from(p),
                |p| p.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PortsCommand::Get { id } => {
            let port = util::get_or_not_found(ports, &VirtualPortId::from(id), "ports list")?;
            let color = output::should_color(&global.color());
            let out = output::render_single(
                &global.output(),
                &port,
                |p| detail(p, color),
                |p| p.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PortsCommand::Create(fields) => util::create(ports, records(fields)?, global),

        PortsCommand::Update(fields) => {
            if fields.file.from_file.is_none() && fields.id.is_none() {
                return Err(CliError::Validation {
                    field: "--id".into(),
                    reason: "update needs the ID of the port to replace".into(),
                });
            }
            util::update(ports, records(fields)?, global)
        }

        PortsCommand::Remove(args) => util::remove(ports, args.ids, global),
    }
}
