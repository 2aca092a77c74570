//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use ocsw_northbound::configuration::{ChangeId, ChangeType};
use ocsw_northbound::paths::LeafKind;
use ocsw_yang::device::AggregationType;

use crate::command::CommandKind;
use crate::error::Error;
use crate::ifname::InterfaceKind;
use crate::northbound::{self, Context, DELETE_OPS, SET_OPS};
use crate::transaction::Phase;

// Creation and removal of LAG interfaces.
//
// A LAG is created from its name and its type together. The type of an
// existing LAG can't be changed.
pub fn process(ctx: &mut Context<'_>, phase: Phase) -> Result<(), Error> {
    match phase {
        Phase::DeleteLag => process_delete(ctx, phase),
        _ => process_create(ctx, phase),
    }
}

// Addition and removal of LAG members.
//
// Members are batched per LAG into a single command.
pub fn process_members(
    ctx: &mut Context<'_>,
    phase: Phase,
) -> Result<(), Error> {
    let (ops, kind) = match phase {
        Phase::DeleteLagMember => {
            (&DELETE_OPS[..], CommandKind::DeleteLagMember)
        }
        _ => (&SET_OPS[..], CommandKind::SetLagMember),
    };

    while let Some((id, leaf)) =
        ctx.find(&[LeafKind::EthAggregateId], ops, |_, _| true)
    {
        let change = ctx.take(id);
        let eth = northbound::ifname_of(&change, leaf);
        let lag = change
            .value()
            .and_then(|value| value.as_string())
            .cloned()
            .ok_or_else(|| Error::InvalidValue(change.path.clone()))?;
        ctx.tables.parse_ifname(&lag)?;

        match kind {
            CommandKind::DeleteLagMember => {
                ctx.tables.delete_lag_member(&lag, &eth)?
            }
            _ => ctx.tables.set_lag_member(&lag, &eth)?,
        }
        ctx.add_command(phase, kind, member_key(&lag), vec![change])?;
    }

    Ok(())
}

// ===== helper functions =====

fn process_delete(ctx: &mut Context<'_>, phase: Phase) -> Result<(), Error> {
    while let Some((id, leaf)) = ctx.find_by_kind(
        &[LeafKind::IntfName],
        &DELETE_OPS,
        InterfaceKind::Aggregate,
    ) {
        let name = ctx.take(id);
        let lag = northbound::ifname_of(&name, leaf);
        let mut changes = vec![name];
        if let Some((id, _)) = lag_type_change(ctx, &lag, ChangeType::Delete) {
            changes.push(ctx.take(id));
        }

        ctx.tables.delete_interface(&lag)?;
        ctx.add_command(phase, CommandKind::DeleteLag, lag, changes)?;
    }

    Ok(())
}

fn process_create(ctx: &mut Context<'_>, phase: Phase) -> Result<(), Error> {
    // LAG types can only be set when the LAG is created.
    if let Some((id, leaf)) =
        ctx.find(&[LeafKind::AggLagType], &[ChangeType::Update], |_, _| true)
    {
        let lag = northbound::ifname_of(ctx.changelog.get(id), leaf);
        return Err(Error::RecreateLagRequired(lag));
    }

    while let Some((id, leaf)) = ctx.find_by_kind(
        &[LeafKind::IntfName],
        &[ChangeType::Create],
        InterfaceKind::Aggregate,
    ) {
        let lag = northbound::ifname_of(ctx.changelog.get(id), leaf);
        let Some((type_id, _)) =
            lag_type_change(ctx, &lag, ChangeType::Create)
        else {
            return Err(Error::LagTypeRequired(lag));
        };
        let name = ctx.take(id);
        let lag_type = ctx.take(type_id);
        let value = lag_type
            .value()
            .and_then(|value| value.to_enum::<AggregationType>())
            .ok_or_else(|| Error::InvalidValue(lag_type.path.clone()))?;

        ctx.tables.add_interface(&lag)?;
        ctx.tables.set_lag_type(&lag, value)?;
        ctx.add_command(phase, CommandKind::SetLag, lag, vec![name, lag_type])?;
    }

    // Types left over don't belong to a LAG being created or removed.
    if let Some((id, leaf)) =
        ctx.find(&[LeafKind::AggLagType], &DELETE_OPS, |_, _| true)
    {
        let lag = northbound::ifname_of(ctx.changelog.get(id), leaf);
        return Err(Error::LagTypeRequired(lag));
    }
    if let Some((id, leaf)) =
        ctx.find(&[LeafKind::AggLagType], &SET_OPS, |_, _| true)
    {
        let lag = northbound::ifname_of(ctx.changelog.get(id), leaf);
        return Err(Error::RecreateLagRequired(lag));
    }

    Ok(())
}

fn lag_type_change(
    ctx: &Context<'_>,
    lag: &str,
    op: ChangeType,
) -> Option<(ChangeId, LeafKind)> {
    ctx.find(&[LeafKind::AggLagType], &[op], |leaf, change| {
        change.path.token(leaf.ifname_pos()) == lag
    })
}

fn member_key(lag: &str) -> String {
    format!("sm-{lag}")
}
