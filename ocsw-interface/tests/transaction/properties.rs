//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use bolero::TypeGenerator;
use ocsw_interface::ErrorKind;
use ocsw_interface::southbound::{FailurePolicy, SwitchRequest};

use super::*;

// Randomly generated configuration, restricted to a handful of interfaces
// so that transitions between two instances overlap.
#[derive(Clone, Debug, TypeGenerator)]
struct Config {
    eths: [EthConfig; 4],
    lag: Option<LagConfig>,
    // Port eth-5, either whole or split into channels.
    breakout: Option<bool>,
}

#[derive(Clone, Debug, TypeGenerator)]
struct EthConfig {
    present: bool,
    member: bool,
    addr: Option<AddrConfig>,
    vlan: Option<VlanConfig>,
}

#[derive(Clone, Debug, TypeGenerator)]
struct VlanConfig {
    trunk: bool,
    vid: u8,
}

#[derive(Clone, Debug, TypeGenerator)]
struct LagConfig {
    lacp: bool,
    addr: Option<AddrConfig>,
}

#[derive(Clone, Debug, TypeGenerator)]
struct AddrConfig {
    subnet: u8,
    plen: u8,
}

// ===== impl Config =====

impl Config {
    fn device(&self) -> Device {
        let mut interfaces = vec![];
        for (pos, eth) in self.eths.iter().enumerate() {
            if !eth.present {
                continue;
            }
            let mut iface = interface(&format!("eth-{}", pos + 1));
            let mut ethernet = json!({});
            if eth.member {
                ethernet["config"] = json!({
                    "aggregate-id": "ae0"
                });
            }
            if let Some(vlan) = &eth.vlan {
                ethernet["switched-vlan"] = vlan.switched_vlan();
            }
            if eth.member || eth.vlan.is_some() {
                iface["ethernet"] = ethernet;
            }
            if let Some(addr) = &eth.addr {
                iface["subinterfaces"] = addr.subinterfaces();
            }
            interfaces.push(iface);
        }
        if let Some(lag) = &self.lag {
            let mut iface = interface("ae0");
            let lag_type = if lag.lacp { "LACP" } else { "STATIC" };
            iface["aggregation"] = json!({
                "config": {
                    "lag-type": lag_type
                }
            });
            if let Some(addr) = &lag.addr {
                iface["subinterfaces"] = addr.subinterfaces();
            }
            interfaces.push(iface);
        }
        let mut components = None;
        match self.breakout {
            Some(true) => {
                interfaces.push(interface("eth-5/1"));
                interfaces.push(interface("eth-5/2"));
                components = Some(json!({
                    "component": [{
                        "name": "eth-5",
                        "port": {
                            "breakout-mode": {
                                "config": {
                                    "num-channels": 4,
                                    "channel-speed": "SPEED_10GB"
                                }
                            }
                        }
                    }]
                }));
            }
            Some(false) => interfaces.push(interface("eth-5")),
            None => (),
        }
        let mut device = device(interfaces);
        if let Some(components) = components {
            device["components"] = components;
        }
        Device::from_value(device).unwrap()
    }
}

// ===== impl VlanConfig =====

impl VlanConfig {
    fn switched_vlan(&self) -> Value {
        let vid = 1 + u16::from(self.vid % 4);
        let config = if self.trunk {
            json!({
                "interface-mode": "TRUNK",
                "native-vlan": vid,
                "trunk-vlans": [vid + 10]
            })
        } else {
            json!({
                "interface-mode": "ACCESS",
                "access-vlan": vid
            })
        };
        json!({ "config": config })
    }
}

// ===== impl AddrConfig =====

impl AddrConfig {
    fn subinterfaces(&self) -> Value {
        let ip = format!("10.0.{}.1", self.subnet % 4);
        ipv4_subinterface(&[(ip.as_str(), 22 + self.plen % 3)])
    }
}

//
// Helper functions.
//

fn failure_policy(selector: u8) -> FailurePolicy {
    match selector % 6 {
        0 => FailurePolicy::Never,
        1 => FailurePolicy::Matching(|request| {
            matches!(request, SwitchRequest::SetIpAddress { .. })
        }),
        2 => FailurePolicy::Matching(|request| {
            matches!(
                request,
                SwitchRequest::AddEthernetIntfToAggregateIntf { .. }
            )
        }),
        3 => FailurePolicy::Matching(|request| {
            matches!(request, SwitchRequest::CreateAggregateIntf { .. })
        }),
        4 => FailurePolicy::Matching(|request| {
            matches!(request, SwitchRequest::CreateEthernetIntf { .. })
        }),
        _ => FailurePolicy::After(usize::from(selector / 6 % 4)),
    }
}

async fn transition(old: &Config, new: &Config, selector: u8) {
    let mut bench = Bench::new();

    // Invalid baselines are rejected before reaching the switch.
    if let Err(error) = bench.commit_device(old.device()).await {
        assert_ne!(error.kind(), ErrorKind::Aborted, "{error}");
        assert!(bench.switch.log().is_empty());
        return;
    }
    bench.tables.check_invariants().unwrap();
    assert_mirrors(&bench.tables, &bench.switch.state());

    let tables = bench.tables.clone();
    let state = bench.switch.state();
    bench.switch.set_failure(failure_policy(selector));
    match bench.commit_device(new.device()).await {
        Ok(_) => {
            bench.tables.check_invariants().unwrap();
            assert_mirrors(&bench.tables, &bench.switch.state());
        }
        // Undo requests may have hit the injected failure as well.
        Err(Error::RollbackFailed(..)) => (),
        Err(error) => {
            assert!(
                !matches!(
                    error,
                    Error::UnprocessedChanges(_)
                        | Error::InconsistentTables(_)
                ),
                "{error}"
            );
            assert_eq!(bench.tables, tables);
            assert_eq!(bench.switch.state(), state);
        }
    }
}

// ===== tests =====

#[test]
fn transitions_preserve_consistency() {
    bolero::check!()
        .with_type::<(Config, Config, u8)>()
        .for_each(|(old, new, selector)| {
            tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap()
                .block_on(transition(old, new, *selector));
        });
}

#[test]
fn reapplying_running_config_is_a_noop() {
    bolero::check!().with_type::<Config>().for_each(|config| {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap()
            .block_on(async {
                let mut bench = Bench::new();
                if bench.commit_device(config.device()).await.is_err() {
                    return;
                }
                bench.switch.clear_log();
                let tables = bench.tables.clone();

                let commands =
                    bench.commit_device(config.device()).await.unwrap();
                assert!(commands.is_empty());
                assert_eq!(bench.tables, tables);
                assert!(bench.switch.log().is_empty());
            });
    });
}
