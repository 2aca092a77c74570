//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use ocsw_northbound::configuration::{self, Changelog};
use ocsw_yang::device::Device;

use crate::command::Command;
use crate::debug::Debug;
use crate::error::Error;
use crate::northbound::{self, Context};
use crate::southbound::SwitchClient;
use crate::tables::LookupTables;

// Default deadline of a single downstream request.
pub const DFLT_DEADLINE: Duration = Duration::from_secs(1);

// Ordinal execution phases.
//
// Commands of a phase run only after every command of the previous phases.
// Tear-down phases come first so that resources are released before being
// claimed again.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Phase {
    // Tear-down of L3 state.
    DeleteIpv4Eth,
    DeleteIpv4Lag,
    DeleteIpv6Eth,
    DeleteIpv6Lag,
    // Tear-down of VLAN membership.
    DeleteAccessVlanEth,
    DeleteNativeVlanEth,
    DeleteTrunkVlanEth,
    DeleteVlanModeEth,
    DeleteAccessVlanLag,
    DeleteNativeVlanLag,
    DeleteTrunkVlanLag,
    DeleteVlanModeLag,
    // Tear-down of aggregation.
    DeleteLacp,
    DeletePortAttr,
    DeleteLagMember,
    DeleteLag,
    DeleteEthernet,
    PortBreakout,
    SetEthernet,
    SetLag,
    SetLagMember,
    SetPortAttr,
    // Assignment of L3 state.
    SetIpv4Eth,
    SetIpv4Lag,
    SetIpv6Eth,
    SetIpv6Lag,
    // VLAN modes, then VLAN membership.
    SetVlanModeEth,
    SetVlanModeLag,
    SetAccessVlanEth,
    SetNativeVlanEth,
    SetTrunkVlanEth,
    SetAccessVlanLag,
    SetNativeVlanLag,
    SetTrunkVlanLag,
    SetLacp,
}

// Ordered set of commands making up a configuration transaction.
#[derive(Debug, Default)]
pub struct Transaction {
    phases: BTreeMap<Phase, Vec<Command>>,
}

// Configuration transaction engine.
#[derive(Debug)]
pub struct Engine {
    client: Arc<dyn SwitchClient>,
    deadline: Duration,
}

// Result of a committed transaction.
#[derive(Debug)]
pub struct CommitOutcome {
    // Lookup tables describing the new running configuration.
    pub tables: LookupTables,
    // Executed commands, in execution order.
    pub commands: Vec<String>,
}

// ===== impl Phase =====

impl Phase {
    // Returns the coarse stage (1 to 11) the phase belongs to.
    pub fn stage(&self) -> u8 {
        match self {
            Phase::DeleteIpv4Eth
            | Phase::DeleteIpv4Lag
            | Phase::DeleteIpv6Eth
            | Phase::DeleteIpv6Lag => 1,
            Phase::DeleteAccessVlanEth
            | Phase::DeleteNativeVlanEth
            | Phase::DeleteTrunkVlanEth
            | Phase::DeleteVlanModeEth
            | Phase::DeleteAccessVlanLag
            | Phase::DeleteNativeVlanLag
            | Phase::DeleteTrunkVlanLag
            | Phase::DeleteVlanModeLag => 2,
            Phase::DeleteLacp
            | Phase::DeletePortAttr
            | Phase::DeleteLagMember
            | Phase::DeleteLag
            | Phase::DeleteEthernet => 3,
            Phase::PortBreakout => 4,
            Phase::SetEthernet => 5,
            Phase::SetLag => 6,
            Phase::SetLagMember => 7,
            Phase::SetPortAttr => 8,
            Phase::SetIpv4Eth
            | Phase::SetIpv4Lag
            | Phase::SetIpv6Eth
            | Phase::SetIpv6Lag => 9,
            Phase::SetVlanModeEth
            | Phase::SetVlanModeLag
            | Phase::SetAccessVlanEth
            | Phase::SetNativeVlanEth
            | Phase::SetTrunkVlanEth
            | Phase::SetAccessVlanLag
            | Phase::SetNativeVlanLag
            | Phase::SetTrunkVlanLag => 10,
            Phase::SetLacp => 11,
        }
    }
}

// ===== impl Transaction =====

impl Transaction {
    // Adds a command to the given phase.
    //
    // A command sharing its key with a command already in the phase is
    // merged into it when both are appendable.
    pub fn add(
        &mut self,
        phase: Phase,
        mut command: Command,
    ) -> Result<(), Error> {
        let commands = self.phases.entry(phase).or_default();
        if let Some(existing) = commands
            .iter_mut()
            .find(|existing| existing.key() == command.key())
        {
            if existing.equals(&command)
                || existing.kind() != command.kind()
                || !command.kind().is_appendable()
            {
                return Err(Error::DuplicateCommand(command.to_string()));
            }
            existing.append(&mut command)?;
            Debug::CommandMerge(phase, existing).log();
            return Ok(());
        }

        Debug::CommandAdd(phase, &command).log();
        commands.push(command);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.phases.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Iterates over the commands in execution order.
    pub fn commands(&self) -> impl Iterator<Item = (Phase, &Command)> {
        self.phases.iter().flat_map(|(phase, commands)| {
            commands.iter().map(move |command| (*phase, command))
        })
    }

    // Executes every command in phase order.
    //
    // On failure, the commands executed so far are undone in reverse order.
    pub async fn execute(self) -> Result<Vec<String>, Error> {
        let mut commands =
            self.phases.into_values().flatten().collect::<Vec<_>>();

        for pos in 0..commands.len() {
            if let Err(error) = commands[pos].execute().await {
                let command = commands[pos].to_string();
                let error =
                    rollback(&mut commands[..pos], command, error).await;
                return Err(error);
            }
        }

        Debug::TransactionCommit(commands.len()).log();
        Ok(commands.iter().map(Command::to_string).collect())
    }
}

// ===== impl Engine =====

impl Engine {
    pub fn new(client: Arc<dyn SwitchClient>, deadline: Duration) -> Engine {
        Engine { client, deadline }
    }

    pub fn client(&self) -> &Arc<dyn SwitchClient> {
        &self.client
    }

    // Validates and applies the changes between the running and candidate
    // configurations.
    //
    // The running tables are left untouched. On success, the returned tables
    // describe the candidate configuration and should replace them.
    pub async fn commit(
        &self,
        running: &LookupTables,
        old: &Device,
        new: &Device,
    ) -> Result<CommitOutcome, Error> {
        let (transaction, tables) = self.plan(running, old, new)?;
        let commands = transaction.execute().await?;
        Ok(CommitOutcome { tables, commands })
    }

    // Validates the changes between the running and candidate
    // configurations, returning the resulting transaction along with the
    // tables it produces. Nothing is sent downstream.
    pub fn plan(
        &self,
        running: &LookupTables,
        old: &Device,
        new: &Device,
    ) -> Result<(Transaction, LookupTables), Error> {
        let mut changelog =
            Changelog::new(configuration::changes_from_diff(old, new));
        Debug::TransactionStart(changelog.len()).log();

        northbound::validate_changes(&changelog, running)?;
        northbound::split_moves(&mut changelog);

        let mut tables = running.clone();
        let mut transaction = Transaction::default();
        let mut ctx = Context::new(
            &mut changelog,
            &mut tables,
            &mut transaction,
            self.client.clone(),
            self.deadline,
        );
        for (phase, processor) in northbound::PROCESSORS.iter() {
            Debug::PhaseStart(*phase).log();
            (processor)(&mut ctx, *phase)?;
        }

        if !changelog.all_processed() {
            let residue = changelog
                .unprocessed()
                .map(|(_, change)| change.to_string())
                .collect();
            return Err(Error::UnprocessedChanges(residue));
        }
        tables.check_invariants().map_err(Error::InconsistentTables)?;

        Ok((transaction, tables))
    }
}

// ===== helper functions =====

async fn rollback(
    executed: &mut [Command],
    command: String,
    error: Error,
) -> Error {
    Debug::RollbackStart(executed.len()).log();

    let mut failures = vec![];
    for executed in executed.iter_mut().rev() {
        if let Err(error) = executed.undo().await {
            error.log();
            failures.push(error.to_string());
        }
    }

    if failures.is_empty() {
        Error::ApplyAborted(command, Box::new(error))
    } else {
        Error::RollbackFailed(command, Box::new(error), failures)
    }
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use ocsw_northbound::configuration::{Change, LeafValue};
    use ocsw_northbound::paths;

    use super::*;
    use crate::command::CommandKind;
    use crate::southbound::{FailurePolicy, SimulatedSwitch, SwitchRequest};

    fn eth_cmd(switch: &Arc<SimulatedSwitch>, ifname: &str) -> Command {
        Command::new(
            CommandKind::SetEthernet,
            ifname.to_owned(),
            vec![Change::create(
                paths::INTF_NAME.instantiate(&[ifname]),
                LeafValue::String(ifname.to_owned()),
            )],
            switch.clone(),
            DFLT_DEADLINE,
        )
    }

    fn member_cmd(switch: &Arc<SimulatedSwitch>, eth: &str) -> Command {
        Command::new(
            CommandKind::SetLagMember,
            "sm-ae0".to_owned(),
            vec![Change::create(
                paths::ETH_AGGREGATE_ID.instantiate(&[eth]),
                LeafValue::String("ae0".to_owned()),
            )],
            switch.clone(),
            DFLT_DEADLINE,
        )
    }

    #[test]
    fn phase_order() {
        assert!(Phase::DeleteIpv6Lag < Phase::DeleteAccessVlanEth);
        assert!(Phase::DeleteEthernet < Phase::PortBreakout);
        assert!(Phase::SetLagMember < Phase::SetIpv4Eth);
        assert!(Phase::SetTrunkVlanLag < Phase::SetLacp);
        assert_eq!(Phase::DeleteLag.stage(), 3);
        assert_eq!(Phase::SetLacp.stage(), 11);
    }

    #[test]
    fn add_commands() {
        let switch = Arc::new(SimulatedSwitch::new());
        let mut transaction = Transaction::default();

        transaction
            .add(Phase::SetEthernet, eth_cmd(&switch, "eth-1"))
            .unwrap();
        assert!(matches!(
            transaction.add(Phase::SetEthernet, eth_cmd(&switch, "eth-1")),
            Err(Error::DuplicateCommand(_))
        ));

        transaction
            .add(Phase::SetLagMember, member_cmd(&switch, "eth-1"))
            .unwrap();
        transaction
            .add(Phase::SetLagMember, member_cmd(&switch, "eth-2"))
            .unwrap();
        assert_eq!(transaction.len(), 2);

        let (phase, command) = transaction.commands().last().unwrap();
        assert_eq!(phase, Phase::SetLagMember);
        assert_eq!(command.changes().len(), 2);
    }

    #[tokio::test]
    async fn execute_in_phase_order() {
        let switch = Arc::new(SimulatedSwitch::new());
        let mut transaction = Transaction::default();
        transaction
            .add(Phase::SetLagMember, member_cmd(&switch, "eth-1"))
            .unwrap();
        transaction
            .add(Phase::SetEthernet, eth_cmd(&switch, "eth-1"))
            .unwrap();

        let request = SwitchRequest::CreateAggregateIntf {
            ifname: "ae0".to_owned(),
            lag_type: ocsw_yang::device::AggregationType::Lacp,
        };
        switch.send(request).await.unwrap();
        switch.clear_log();

        let commands = transaction.execute().await.unwrap();
        assert_eq!(commands, ["create-eth(eth-1)", "add-members(sm-ae0)"]);
        assert_eq!(switch.log().len(), 2);
    }

    #[tokio::test]
    async fn rollback_on_failure() {
        let switch = Arc::new(SimulatedSwitch::new());
        let mut transaction = Transaction::default();
        transaction
            .add(Phase::SetEthernet, eth_cmd(&switch, "eth-1"))
            .unwrap();
        transaction
            .add(Phase::SetEthernet, eth_cmd(&switch, "eth-2"))
            .unwrap();
        transaction
            .add(Phase::SetEthernet, eth_cmd(&switch, "eth-3"))
            .unwrap();
        switch.set_failure(FailurePolicy::After(2));

        let error = transaction.execute().await.unwrap_err();
        assert!(matches!(error, Error::RollbackFailed(..)));

        // Undo requests fail as well after the allowed successes, so start over
        // with a switch that only rejects the third creation.
        let switch = Arc::new(SimulatedSwitch::new());
        let mut transaction = Transaction::default();
        for ifname in ["eth-1", "eth-2", "eth-3"] {
            transaction
                .add(Phase::SetEthernet, eth_cmd(&switch, ifname))
                .unwrap();
        }
        switch.set_failure(FailurePolicy::Matching(|request| {
            *request
                == SwitchRequest::CreateEthernetIntf {
                    ifname: "eth-3".to_owned(),
                }
        }));

        let error = transaction.execute().await.unwrap_err();
        assert!(matches!(error, Error::ApplyAborted(..)));
        assert_eq!(error.kind(), crate::error::ErrorKind::Aborted);
        assert!(switch.state().ethernet.is_empty());
    }
}
