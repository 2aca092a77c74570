//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use ocsw_northbound::configuration::{Change, ChangeType};
use ocsw_northbound::paths::LeafKind;
use ocsw_yang::device::VlanModeType;

use crate::command::CommandKind;
use crate::error::Error;
use crate::ifname::InterfaceKind;
use crate::northbound::{self, Context, DELETE_OPS, SET_OPS};
use crate::tables::Vid;
use crate::transaction::Phase;

// Switched VLAN configuration of ethernet interfaces and LAGs.
//
// VLAN modes are settled before memberships, so membership checks see the
// mode the transaction leaves in place.
pub fn process(ctx: &mut Context<'_>, phase: Phase) -> Result<(), Error> {
    let iface_kind = northbound::phase_kind(phase);
    let (leaf, ops, kind) = phase_leaf(phase, iface_kind);

    while let Some((id, leaf)) = ctx.find_by_kind(&[leaf], ops, iface_kind) {
        let change = ctx.take(id);
        let ifname = northbound::ifname_of(&change, leaf);

        match kind {
            CommandKind::SetVlanMode => {
                let mode = change
                    .value()
                    .and_then(|value| value.to_enum::<VlanModeType>())
                    .ok_or_else(|| Error::InvalidValue(change.path.clone()))?;
                ctx.tables.set_vlan_mode(&ifname, mode)?;
            }
            CommandKind::DeleteVlanMode => {
                ctx.tables.delete_vlan_mode(&ifname)?;
            }
            CommandKind::SetAccessVlan => {
                ctx.tables.set_access_vlan(&ifname, vid(&change)?)?;
            }
            CommandKind::DeleteAccessVlan => {
                ctx.tables.delete_access_vlan(&ifname, vid(&change)?)?;
            }
            CommandKind::SetNativeVlan => {
                ctx.tables.set_native_vlan(&ifname, vid(&change)?)?;
            }
            CommandKind::DeleteNativeVlan => {
                ctx.tables.delete_native_vlan(&ifname, vid(&change)?)?;
            }
            CommandKind::SetTrunkVlan => {
                ctx.tables.add_trunk_vlan(&ifname, vid(&change)?)?;
            }
            _ => {
                ctx.tables.delete_trunk_vlan(&ifname, vid(&change)?)?;
            }
        }

        // Trunk VLANs of an interface are batched into a single command.
        ctx.add_command(phase, kind, ifname, vec![change])?;
    }

    Ok(())
}

// ===== helper functions =====

fn phase_leaf(
    phase: Phase,
    iface_kind: InterfaceKind,
) -> (LeafKind, &'static [ChangeType], CommandKind) {
    let eth = iface_kind == InterfaceKind::Ethernet;
    let pick = |eth_leaf, agg_leaf| if eth { eth_leaf } else { agg_leaf };
    let mode = pick(LeafKind::EthVlanMode, LeafKind::AggVlanMode);
    let access = pick(LeafKind::EthAccessVlan, LeafKind::AggAccessVlan);
    let native = pick(LeafKind::EthNativeVlan, LeafKind::AggNativeVlan);
    let trunk = pick(LeafKind::EthTrunkVlan, LeafKind::AggTrunkVlan);

    match phase {
        Phase::DeleteAccessVlanEth | Phase::DeleteAccessVlanLag => {
            (access, &DELETE_OPS, CommandKind::DeleteAccessVlan)
        }
        Phase::DeleteNativeVlanEth | Phase::DeleteNativeVlanLag => {
            (native, &DELETE_OPS, CommandKind::DeleteNativeVlan)
        }
        Phase::DeleteTrunkVlanEth | Phase::DeleteTrunkVlanLag => {
            (trunk, &DELETE_OPS, CommandKind::DeleteTrunkVlan)
        }
        Phase::DeleteVlanModeEth | Phase::DeleteVlanModeLag => {
            (mode, &DELETE_OPS, CommandKind::DeleteVlanMode)
        }
        Phase::SetVlanModeEth | Phase::SetVlanModeLag => {
            (mode, &SET_OPS, CommandKind::SetVlanMode)
        }
        Phase::SetAccessVlanEth | Phase::SetAccessVlanLag => {
            (access, &SET_OPS, CommandKind::SetAccessVlan)
        }
        Phase::SetNativeVlanEth | Phase::SetNativeVlanLag => {
            (native, &SET_OPS, CommandKind::SetNativeVlan)
        }
        _ => (trunk, &SET_OPS, CommandKind::SetTrunkVlan),
    }
}

fn vid(change: &Change) -> Result<Vid, Error> {
    let value = change
        .value()
        .and_then(|value| value.as_uint())
        .copied()
        .ok_or_else(|| Error::InvalidValue(change.path.clone()))?;
    Vid::try_from(value).map_err(|_| Error::InvalidVlanId(value))
}
