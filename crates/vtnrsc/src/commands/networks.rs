//! Network command handlers.

use tabled::Tabled;

use vtnrsc_core::{
    Inventory, PhysicalNetwork, ResourceManager, SegmentationId, TenantNetwork, TenantNetworkId,
};

use crate::cli::{GlobalOpts, NetworkFields, NetworksArgs, NetworksCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct NetworkRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Tenant")]
    tenant: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Admin")]
    admin: String,
    #[tabled(rename = "Shared")]
    shared: String,
    #[tabled(rename = "Segment")]
    segment: String,
}

impl From<&TenantNetwork> for NetworkRow {
    fn from(n: &TenantNetwork) -> Self {
        Self {
            id: n.id.to_string(),
            name: n.name.clone(),
            tenant: n.tenant_id.to_string(),
            state: n.state.to_string(),
            admin: if n.admin_state_up { "up" } else { "down" }.into(),
            shared: if n.shared { "yes" } else { "no" }.into(),
            segment: n.segmentation_id.to_string(),
        }
    }
}

fn detail(n: &TenantNetwork, color: bool) -> String {
    [
        format!("ID:               {}", n.id),
        format!("Name:             {}", n.name),
        format!("Tenant:           {}", n.tenant_id),
        format!("State:            {}", output::paint_state(&n.state.to_string(), color)),
        format!("Admin State Up:   {}", n.admin_state_up),
        format!("Shared:           {}", n.shared),
        format!("Router External:  {}", n.router_external),
        format!("Type:             {}", n.network_type),
        format!("Physical Network: {}", util::or_dash(n.physical_network.as_str())),
        format!("Segmentation ID:  {}", util::or_dash(n.segmentation_id.as_str())),
    ]
    .join("\n")
}

/// Build the records a create/update acts on, from a file or from flags.
fn records(fields: NetworkFields) -> Result<Vec<TenantNetwork>, CliError> {
    if let Some(path) = &fields.file.from_file {
        return util::read_records(path);
    }
    let id = fields
        .id
        .map_or_else(TenantNetworkId::generate, TenantNetworkId::from);
    let mut network = TenantNetwork::new(
        id,
        util::required(fields.name, "name")?,
        util::required(fields.tenant, "tenant")?,
    );
    network.state = fields.state;
    network.admin_state_up = fields.admin_state_up;
    network.shared = fields.shared;
    network.router_external = fields.router_external;
    network.network_type = fields.network_type;
    network.physical_network = PhysicalNetwork::new(fields.physical_network);
    network.segmentation_id = SegmentationId::new(fields.segmentation_id);
    Ok(vec![network])
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(
    inventory: &Inventory,
    args: NetworksArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let networks = inventory.networks();
    match args.command {
        NetworksCommand::List { tenant } => {
            let mut all = util::sorted(networks.get_all()?);
            if let Some(tenant) = tenant {
                all.retain(|n| n.tenant_id.as_str() == tenant);
            }
            let out = output::render_list(
                &global.output(),
                &all,
                |n| NetworkRow::from(n),
                |n| n.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NetworksCommand::Get { id } => {
            let network =
                util::get_or_not_found(networks, &TenantNetworkId::from(id), "networks list")?;
            let color = output::should_color(&global.color());
            let out = output::render_single(
                &global.output(),
                &network,
                |n| detail(n, color),
                |n| n.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NetworksCommand::Create(fields) => util::create(networks, records(fields)?, global),

        NetworksCommand::Update(fields) => {
            if fields.file.from_file.is_none() && fields.id.is_none() {
                return Err(CliError::Validation {
                    field: "--id".into(),
                    reason: "update needs the ID of the network to replace".into(),
                });
            }
            util::update(networks, records(fields)?, global)
        }

        NetworksCommand::Remove(args) => util::remove(networks, args.ids, global),
    }
}
