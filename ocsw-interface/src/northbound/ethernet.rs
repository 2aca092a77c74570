//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use ocsw_northbound::paths::LeafKind;

use crate::command::CommandKind;
use crate::error::Error;
use crate::ifname::InterfaceKind;
use crate::northbound::{self, Context, DELETE_OPS, SET_OPS};
use crate::transaction::Phase;

// Creation and removal of ethernet interfaces.
pub fn process(ctx: &mut Context<'_>, phase: Phase) -> Result<(), Error> {
    let (ops, kind) = match phase {
        Phase::DeleteEthernet => (&DELETE_OPS[..], CommandKind::DeleteEthernet),
        _ => (&SET_OPS[..], CommandKind::SetEthernet),
    };

    while let Some((id, leaf)) =
        ctx.find_by_kind(&[LeafKind::IntfName], ops, InterfaceKind::Ethernet)
    {
        let change = ctx.take(id);
        let ifname = northbound::ifname_of(&change, leaf);
        match kind {
            CommandKind::DeleteEthernet => {
                ctx.tables.delete_interface(&ifname)?;
            }
            _ => {
                ctx.tables.add_interface(&ifname)?;
            }
        }
        ctx.add_command(phase, kind, ifname, vec![change])?;
    }

    Ok(())
}
