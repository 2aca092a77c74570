//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use ocsw_northbound::paths::LeafKind;

use crate::command::CommandKind;
use crate::error::Error;
use crate::northbound::{self, Context, DELETE_OPS, SET_OPS};
use crate::tables::LacpAttr;
use crate::transaction::Phase;

const LEAVES: [LeafKind; 3] = [
    LeafKind::LacpName,
    LeafKind::LacpInterval,
    LeafKind::LacpActivity,
];

// LACP configuration of LAGs, grouped into one command per LAG.
pub fn process(ctx: &mut Context<'_>, phase: Phase) -> Result<(), Error> {
    match phase {
        Phase::DeleteLacp => process_delete(ctx, phase),
        _ => process_set(ctx, phase),
    }
}

// ===== helper functions =====

fn process_delete(ctx: &mut Context<'_>, phase: Phase) -> Result<(), Error> {
    while let Some((id, leaf)) = ctx.find(&LEAVES, &DELETE_OPS, |_, _| true) {
        let lag = northbound::ifname_of(ctx.changelog.get(id), leaf);
        let records = ctx.find_all(&LEAVES, &DELETE_OPS, &lag);

        // Attributes go before the LACP instance itself.
        let mut changes = vec![];
        let mut instance = None;
        for (id, leaf) in records {
            let change = ctx.take(id);
            match LacpAttr::from_leaf(leaf) {
                Some(attr) => {
                    ctx.tables.delete_lacp_attribute(&lag, attr)?;
                    changes.push(change);
                }
                None => instance = Some(change),
            }
        }
        if let Some(change) = instance {
            ctx.tables.delete_lacp(&lag)?;
            changes.push(change);
        }

        ctx.add_command(phase, CommandKind::DeleteLacp, lag, changes)?;
    }

    Ok(())
}

fn process_set(ctx: &mut Context<'_>, phase: Phase) -> Result<(), Error> {
    while let Some((id, leaf)) = ctx.find(&LEAVES, &SET_OPS, |_, _| true) {
        let lag = northbound::ifname_of(ctx.changelog.get(id), leaf);
        let records = ctx.find_all(&LEAVES, &SET_OPS, &lag);

        // The LACP instance goes before its attributes.
        let mut changes = vec![];
        let mut attrs = vec![];
        for (id, leaf) in records {
            let change = ctx.take(id);
            match LacpAttr::from_leaf(leaf) {
                Some(attr) => attrs.push((attr, change)),
                None => {
                    ctx.tables.set_lacp(&lag)?;
                    changes.push(change);
                }
            }
        }
        for (attr, change) in attrs {
            let value = change
                .to
                .clone()
                .ok_or_else(|| Error::InvalidValue(change.path.clone()))?;
            ctx.tables.set_lacp_attribute(&lag, attr, value)?;
            changes.push(change);
        }

        ctx.add_command(phase, CommandKind::SetLacp, lag, changes)?;
    }

    Ok(())
}
