//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::IpAddr;

use ipnetwork::IpNetwork;
use ocsw_northbound::configuration::Change;
use ocsw_northbound::paths::{self, LeafKind};

use crate::command::CommandKind;
use crate::error::Error;
use crate::northbound::{self, Context, DELETE_OPS, SET_OPS};
use crate::transaction::Phase;

const IPV4_LEAVES: [LeafKind; 2] =
    [LeafKind::Ipv4Ip, LeafKind::Ipv4PrefixLength];
const IPV6_LEAVES: [LeafKind; 2] =
    [LeafKind::Ipv6Ip, LeafKind::Ipv6PrefixLength];

// Assignment and removal of interface addresses.
//
// An address is made of two records, its IP and its prefix length, which
// are always handled together.
pub fn process(ctx: &mut Context<'_>, phase: Phase) -> Result<(), Error> {
    let (leaves, ops, kind) = match phase {
        Phase::DeleteIpv4Eth | Phase::DeleteIpv4Lag => {
            (IPV4_LEAVES, &DELETE_OPS[..], CommandKind::DeleteIpv4)
        }
        Phase::DeleteIpv6Eth | Phase::DeleteIpv6Lag => {
            (IPV6_LEAVES, &DELETE_OPS[..], CommandKind::DeleteIpv6)
        }
        Phase::SetIpv4Eth | Phase::SetIpv4Lag => {
            (IPV4_LEAVES, &SET_OPS[..], CommandKind::SetIpv4)
        }
        _ => (IPV6_LEAVES, &SET_OPS[..], CommandKind::SetIpv6),
    };
    let iface_kind = northbound::phase_kind(phase);

    while let Some((id, leaf)) = ctx.find_by_kind(&leaves, ops, iface_kind) {
        let change = ctx.changelog.get(id);
        let ifname = northbound::ifname_of(change, leaf);
        let ip = change.path.token(paths::ADDRESS_POS).to_owned();

        // Locate both halves of the address.
        let partner = if leaf == leaves[0] { leaves[1] } else { leaves[0] };
        let Some((partner_id, _)) =
            ctx.find(&[partner], ops, |kind, other| {
                other.path.token(kind.ifname_pos()) == ifname
                    && other.path.token(paths::ADDRESS_POS) == ip
            })
        else {
            return Err(Error::OrphanIpComponent(ifname, ip));
        };
        let (ip_change, plen_change) = if leaf == leaves[0] {
            (ctx.take(id), ctx.take(partner_id))
        } else {
            (ctx.take(partner_id), ctx.take(id))
        };
        let addr = network(&ip_change, &plen_change)?;

        match kind {
            CommandKind::DeleteIpv4 | CommandKind::DeleteIpv6 => {
                ctx.tables.delete_address(&ifname, addr)?
            }
            _ => ctx.tables.add_address(&ifname, addr)?,
        }
        ctx.add_command(
            phase,
            kind,
            format!("{ifname}:{addr}"),
            vec![ip_change, plen_change],
        )?;
    }

    Ok(())
}

// ===== helper functions =====

fn network(ip: &Change, plen: &Change) -> Result<IpNetwork, Error> {
    let invalid = |change: &Change| Error::InvalidValue(change.path.clone());
    let addr = ip
        .value()
        .and_then(|value| value.as_string())
        .and_then(|value| value.parse::<IpAddr>().ok())
        .ok_or_else(|| invalid(ip))?;
    let len = plen
        .value()
        .and_then(|value| value.to_uint::<u8>())
        .ok_or_else(|| invalid(plen))?;
    IpNetwork::new(addr, len).map_err(|_| invalid(plen))
}
