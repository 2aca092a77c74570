//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

mod properties;
mod scenarios;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use ocsw_interface::southbound::{SwitchState, VlanTagging};
use ocsw_interface::transaction::DFLT_DEADLINE;
use ocsw_interface::{Engine, Error, LookupTables, SimulatedSwitch};
use ocsw_utils::ip::AddressFamily;
use ocsw_yang::device::Device;
use serde_json::{Value, json};

// Test bench made of an engine driving a simulated switch, along with the
// running configuration and lookup tables.
struct Bench {
    switch: Arc<SimulatedSwitch>,
    engine: Engine,
    running: Device,
    tables: LookupTables,
}

//
// Helper functions.
//

impl Bench {
    fn new() -> Bench {
        let switch = Arc::new(SimulatedSwitch::new());
        let engine = Engine::new(switch.clone(), DFLT_DEADLINE);
        Bench {
            switch,
            engine,
            running: Device::default(),
            tables: LookupTables::new(Default::default()),
        }
    }

    // Creates a bench whose running configuration is the given baseline.
    async fn with_baseline(baseline: Value) -> Bench {
        let mut bench = Bench::new();
        bench.commit(baseline).await.unwrap();
        bench.switch.clear_log();
        bench
    }

    // Commits a candidate configuration, replacing the running one on
    // success.
    async fn commit(&mut self, candidate: Value) -> Result<Vec<String>, Error> {
        let candidate = Device::from_value(candidate).unwrap();
        self.commit_device(candidate).await
    }

    async fn commit_device(
        &mut self,
        candidate: Device,
    ) -> Result<Vec<String>, Error> {
        let outcome = self
            .engine
            .commit(&self.tables, &self.running, &candidate)
            .await?;
        self.tables = outcome.tables;
        self.running = candidate;
        Ok(outcome.commands)
    }
}

fn interface(name: &str) -> Value {
    json!({
        "name": name,
        "config": {
            "name": name
        }
    })
}

fn ipv4_subinterface(addrs: &[(&str, u8)]) -> Value {
    let addrs = addrs
        .iter()
        .map(|(ip, plen)| {
            json!({
                "ip": ip,
                "config": {
                    "ip": ip,
                    "prefix-length": plen
                }
            })
        })
        .collect::<Vec<_>>();
    json!({
        "subinterface": [{
            "index": 0,
            "ipv4": {
                "addresses": {
                    "address": addrs
                }
            }
        }]
    })
}

fn device(interfaces: Vec<Value>) -> Value {
    json!({
        "interfaces": {
            "interface": interfaces
        }
    })
}

// Asserts that the switch state reflects the given lookup tables.
fn assert_mirrors(tables: &LookupTables, state: &SwitchState) {
    let interfaces = tables.interfaces().collect::<BTreeSet<_>>();
    let ethernet = interfaces
        .iter()
        .filter(|ifname| ifname.starts_with("eth-"))
        .cloned()
        .collect::<BTreeSet<_>>();
    assert_eq!(state.ethernet, ethernet);

    let aggregates = interfaces
        .iter()
        .filter(|ifname| ifname.starts_with("ae"))
        .map(|lag| (lag.clone(), tables.lag_type(lag).unwrap()))
        .collect::<BTreeMap<_, _>>();
    assert_eq!(state.aggregates, aggregates);

    for ifname in &interfaces {
        let addrs = tables
            .addresses(ifname, AddressFamily::Ipv4)
            .into_iter()
            .collect::<BTreeSet<_>>();
        let installed =
            state.addresses.get(ifname).cloned().unwrap_or_default();
        assert_eq!(installed, addrs, "addresses of {ifname}");
    }
    for lag in aggregates.keys() {
        let members =
            tables.eths_by_lag(lag).into_iter().collect::<BTreeSet<_>>();
        let installed = state.members.get(lag).cloned().unwrap_or_default();
        assert_eq!(installed, members, "members of {lag}");
    }

    for ifname in &interfaces {
        assert_eq!(
            state.vlan_modes.get(ifname).copied(),
            tables.vlan_mode(ifname),
            "VLAN mode of {ifname}"
        );
        let access: BTreeSet<_> =
            tables.access_vlan(ifname).into_iter().collect();
        let native: BTreeSet<_> =
            tables.native_vlan(ifname).into_iter().collect();
        let trunk: BTreeSet<_> =
            tables.trunk_vlans(ifname).into_iter().collect();
        for (tagging, vids) in [
            (VlanTagging::Access, access),
            (VlanTagging::Native, native),
            (VlanTagging::Trunk, trunk),
        ] {
            let installed = state
                .vlans
                .get(&(ifname.clone(), tagging))
                .cloned()
                .unwrap_or_default();
            assert_eq!(installed, vids, "{tagging:?} VLANs of {ifname}");
        }
    }
    for port in (1..=8).map(|port| format!("eth-{port}")) {
        assert_eq!(
            state.breakout.get(&port).copied(),
            tables.breakout_config(&port),
            "breakout of {port}"
        );
    }
}
