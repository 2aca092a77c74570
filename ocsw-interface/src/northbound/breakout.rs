//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use ocsw_northbound::configuration::{Change, ChangeType, LeafValue};
use ocsw_northbound::paths::{self, LeafKind};
use ocsw_yang::ToYang;
use ocsw_yang::device::PortSpeed;

use crate::command::CommandKind;
use crate::error::Error;
use crate::northbound::{self, Context};
use crate::tables::BreakoutMode;
use crate::transaction::Phase;

const LEAVES: [LeafKind; 2] =
    [LeafKind::BreakoutNumChannels, LeafKind::BreakoutChannelSpeed];
const OPS: [ChangeType; 3] =
    [ChangeType::Create, ChangeType::Update, ChangeType::Delete];

// Port breakout transitions.
//
// The number of channels and the channel speed of a port are applied
// together. A leaf missing from the transaction keeps its current value,
// a removed leaf reverts to its default.
pub fn process(ctx: &mut Context<'_>, phase: Phase) -> Result<(), Error> {
    while let Some((id, leaf)) = ctx.find(&LEAVES, &OPS, |_, _| true) {
        let port = northbound::ifname_of(ctx.changelog.get(id), leaf);
        let mut changes = ctx
            .find_all(&LEAVES, &OPS, &port)
            .into_iter()
            .map(|(id, _)| ctx.take(id))
            .collect::<Vec<_>>();

        let current = ctx.tables.breakout(&port);
        let default = BreakoutMode::default();
        let mut mode = current;
        let mut num_channels = None;
        let mut channel_speed = None;
        for change in &changes {
            match LeafKind::classify(&change.path) {
                Some(LeafKind::BreakoutNumChannels) => {
                    num_channels = Some(match &change.to {
                        Some(value) => value
                            .to_uint::<u8>()
                            .ok_or_else(|| invalid(change))?,
                        None => default.num_channels,
                    });
                }
                _ => {
                    channel_speed = Some(match &change.to {
                        Some(value) => value
                            .to_enum::<PortSpeed>()
                            .ok_or_else(|| invalid(change))?,
                        None => default.channel_speed,
                    });
                }
            }
        }

        // The command always carries both leaves, so that it can be
        // reverted as a whole.
        let payload = [port.as_str()];
        match num_channels {
            Some(num_channels) => mode.num_channels = num_channels,
            None => {
                let value = LeafValue::Uint(current.num_channels.into());
                changes.push(Change::update(
                    paths::BREAKOUT_NUM_CHANNELS.instantiate(&payload),
                    value.clone(),
                    value,
                ));
            }
        }
        match channel_speed {
            Some(channel_speed) => mode.channel_speed = channel_speed,
            None => {
                let value = LeafValue::String(
                    current.channel_speed.to_yang().into_owned(),
                );
                changes.push(Change::update(
                    paths::BREAKOUT_CHANNEL_SPEED.instantiate(&payload),
                    value.clone(),
                    value,
                ));
            }
        }

        ctx.tables.set_port_breakout(&port, mode)?;
        ctx.add_command(phase, CommandKind::SetPortBreakout, port, changes)?;
    }

    Ok(())
}

// ===== helper functions =====

fn invalid(change: &Change) -> Error {
    let port = change.path.token(paths::IFNAME_POS);
    Error::InvalidBreakoutMode(port.to_owned())
}
