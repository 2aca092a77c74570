//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use ocsw_northbound::paths::LeafKind;

use crate::command::CommandKind;
use crate::error::Error;
use crate::northbound::{self, Context, DELETE_OPS, SET_OPS};
use crate::tables::PortAttr;
use crate::transaction::Phase;

const LEAVES: [LeafKind; 6] = [
    LeafKind::IntfDescription,
    LeafKind::IntfMtu,
    LeafKind::IntfEnabled,
    LeafKind::EthAutoNegotiate,
    LeafKind::EthPortSpeed,
    LeafKind::AggMinLinks,
];

// Scalar attributes of ethernet interfaces and LAGs, grouped into one
// command per interface.
pub fn process(ctx: &mut Context<'_>, phase: Phase) -> Result<(), Error> {
    let (ops, kind) = match phase {
        Phase::DeletePortAttr => (&DELETE_OPS[..], CommandKind::DeletePortAttr),
        _ => (&SET_OPS[..], CommandKind::SetPortAttr),
    };

    while let Some((id, leaf)) = ctx.find(&LEAVES, ops, |_, _| true) {
        let ifname = northbound::ifname_of(ctx.changelog.get(id), leaf);
        let mut changes = vec![];
        for (id, leaf) in ctx.find_all(&LEAVES, ops, &ifname) {
            let change = ctx.take(id);
            let attr = PortAttr::from_leaf(leaf)
                .ok_or_else(|| Error::UnknownPath(change.path.clone()))?;
            if let Some(value) = &change.to {
                ctx.tables
                    .set_port_attribute(&ifname, attr, value.clone())?;
            } else {
                ctx.tables.delete_port_attribute(&ifname, attr)?;
            }
            changes.push(change);
        }
        ctx.add_command(phase, kind, ifname, changes)?;
    }

    Ok(())
}
