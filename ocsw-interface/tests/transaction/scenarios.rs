//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use ipnetwork::IpNetwork;
use maplit::btreeset;
use ocsw_interface::ErrorKind;
use ocsw_interface::southbound::{FailurePolicy, SwitchRequest, VlanTagging};
use ocsw_interface::tables::{BreakoutMode, LacpAttr};
use ocsw_yang::device::{AggregationType, PortSpeed, VlanModeType};

use super::*;

fn net(addr: &str) -> IpNetwork {
    addr.parse().unwrap()
}

fn eth_with_ipv4(name: &str, addrs: &[(&str, u8)]) -> Value {
    let mut iface = interface(name);
    iface["subinterfaces"] = ipv4_subinterface(addrs);
    iface
}

fn lag_member(name: &str, lag: &str) -> Value {
    let mut iface = interface(name);
    iface["ethernet"] = json!({
        "config": {
            "aggregate-id": lag
        }
    });
    iface
}

fn lag(name: &str, lag_type: &str) -> Value {
    let mut iface = interface(name);
    iface["aggregation"] = json!({
        "config": {
            "lag-type": lag_type
        }
    });
    iface
}

fn switched(name: &str, config: Value) -> Value {
    let mut iface = interface(name);
    iface["ethernet"] = json!({
        "switched-vlan": {
            "config": config
        }
    });
    iface
}

fn breakout(port: &str, num_channels: u8, channel_speed: &str) -> Value {
    json!({
        "component": [{
            "name": port,
            "port": {
                "breakout-mode": {
                    "config": {
                        "num-channels": num_channels,
                        "channel-speed": channel_speed
                    }
                }
            }
        }]
    })
}

fn lacp(lag: &str) -> Value {
    json!({
        "interfaces": {
            "interface": [{
                "name": lag,
                "config": {
                    "name": lag,
                    "interval": "FAST",
                    "lacp-mode": "ACTIVE"
                }
            }]
        }
    })
}

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_owned()).collect()
}

// Baseline with a single address on eth-1.
async fn addressed_bench() -> Bench {
    let mut bench =
        Bench::with_baseline(device(vec![interface("eth-1")])).await;
    bench
        .commit(device(vec![eth_with_ipv4("eth-1", &[("10.0.0.1", 24)])]))
        .await
        .unwrap();
    bench.switch.clear_log();
    bench
}

#[tokio::test]
async fn add_ipv4_address() {
    let mut bench =
        Bench::with_baseline(device(vec![interface("eth-1")])).await;

    let commands = bench
        .commit(device(vec![eth_with_ipv4("eth-1", &[("10.0.0.1", 24)])]))
        .await
        .unwrap();
    assert_eq!(commands, vec!["add-ipv4(eth-1:10.0.0.1/24)".to_owned()]);

    let addr = net("10.0.0.1/24");
    assert_eq!(
        bench.tables.addresses("eth-1", AddressFamily::Ipv4),
        vec![addr]
    );
    assert_eq!(bench.tables.address_owner(&addr).as_deref(), Some("eth-1"));
    assert_eq!(
        bench.switch.log(),
        vec![SwitchRequest::SetIpAddress {
            ifname: "eth-1".to_owned(),
            addr,
        }]
    );
    assert_mirrors(&bench.tables, &bench.switch.state());
}

#[tokio::test]
async fn duplicate_ipv4_address() {
    let mut bench = addressed_bench().await;
    let tables = bench.tables.clone();
    let state = bench.switch.state();

    let error = bench
        .commit(device(vec![
            eth_with_ipv4("eth-1", &[("10.0.0.1", 24)]),
            eth_with_ipv4("eth-2", &[("10.0.0.1", 24)]),
        ]))
        .await
        .unwrap_err();
    assert!(
        matches!(&error, Error::CidrInUse(addr, owner)
            if *addr == net("10.0.0.1/24") && owner == "eth-1"),
        "unexpected error: {error}"
    );
    assert_eq!(error.kind(), ErrorKind::FailedPrecondition);

    // Nothing was applied.
    assert_eq!(bench.tables, tables);
    assert_eq!(bench.switch.state(), state);
    assert!(bench.switch.log().is_empty());
}

#[tokio::test]
async fn create_lacp_lag() {
    let mut bench = Bench::with_baseline(device(vec![
        interface("eth-1"),
        interface("eth-2"),
    ]))
    .await;

    let commands = bench
        .commit(device(vec![
            lag_member("eth-1", "ae0"),
            lag_member("eth-2", "ae0"),
            lag("ae0", "LACP"),
        ]))
        .await
        .unwrap();
    assert_eq!(
        commands,
        vec!["create-agg(ae0)".to_owned(), "add-members(sm-ae0)".to_owned()]
    );

    // Both members were added with a single request.
    assert_eq!(
        bench.switch.log(),
        vec![
            SwitchRequest::CreateAggregateIntf {
                ifname: "ae0".to_owned(),
                lag_type: AggregationType::Lacp,
            },
            SwitchRequest::AddEthernetIntfToAggregateIntf {
                lag: "ae0".to_owned(),
                members: vec!["eth-1".to_owned(), "eth-2".to_owned()],
            },
        ]
    );
    assert_eq!(bench.tables.lag_by_eth("eth-1").as_deref(), Some("ae0"));
    assert_eq!(bench.tables.lag_by_eth("eth-2").as_deref(), Some("ae0"));
    assert_eq!(bench.tables.lag_type("ae0"), Some(AggregationType::Lacp));
    assert_eq!(
        bench.switch.state().members.get("ae0"),
        Some(&btreeset! {"eth-1".to_owned(), "eth-2".to_owned()})
    );
    assert_mirrors(&bench.tables, &bench.switch.state());
}

#[tokio::test]
async fn change_lag_type() {
    let mut bench = Bench::with_baseline(device(vec![lag("ae0", "STATIC")]))
        .await;
    let tables = bench.tables.clone();

    let error = bench
        .commit(device(vec![lag("ae0", "LACP")]))
        .await
        .unwrap_err();
    assert!(
        matches!(&error, Error::RecreateLagRequired(lag) if lag == "ae0"),
        "unexpected error: {error}"
    );
    assert_eq!(error.kind(), ErrorKind::FailedPrecondition);
    assert_eq!(bench.tables, tables);
    assert!(bench.switch.log().is_empty());
}

#[tokio::test]
async fn breakout_with_dependents() {
    let baseline = eth_with_ipv4("eth-5", &[("10.0.0.5", 24)]);
    let mut bench = Bench::with_baseline(device(vec![baseline.clone()])).await;
    let tables = bench.tables.clone();

    let mut candidate = device(vec![baseline]);
    candidate["components"] = breakout("eth-5", 4, "SPEED_10GB");
    let error = bench.commit(candidate).await.unwrap_err();
    assert!(
        matches!(&error, Error::InterfaceHasL3State(ifname, addrs)
            if ifname == "eth-5" && *addrs == vec![net("10.0.0.5/24")]),
        "unexpected error: {error}"
    );
    assert_eq!(error.kind(), ErrorKind::FailedPrecondition);
    assert_eq!(bench.tables, tables);
    assert!(bench.switch.log().is_empty());
}

#[tokio::test]
async fn rollback_on_downstream_failure() {
    let mut bench = addressed_bench().await;
    let tables = bench.tables.clone();
    let state = bench.switch.state();
    bench.switch.set_failure(FailurePolicy::Matching(|request| {
        matches!(
            request,
            SwitchRequest::SetIpAddress { addr, .. }
                if addr.ip().to_string() == "10.0.0.2"
        )
    }));

    // The new interface is created before the failing address and has to
    // be removed again.
    let error = bench
        .commit(device(vec![
            eth_with_ipv4("eth-1", &[("10.0.0.1", 24), ("10.0.0.2", 24)]),
            interface("eth-3"),
        ]))
        .await
        .unwrap_err();
    assert!(
        matches!(&error, Error::ApplyAborted(..)),
        "unexpected error: {error}"
    );
    assert_eq!(error.kind(), ErrorKind::Aborted);

    assert_eq!(bench.tables, tables);
    assert_eq!(
        bench.tables.addresses("eth-1", AddressFamily::Ipv4),
        vec![net("10.0.0.1/24")]
    );
    assert_eq!(bench.switch.state(), state);
    assert_eq!(
        bench.switch.log(),
        vec![
            SwitchRequest::CreateEthernetIntf {
                ifname: "eth-3".to_owned(),
            },
            SwitchRequest::DeleteEthernetIntf {
                ifname: "eth-3".to_owned(),
            },
        ]
    );
}

#[tokio::test]
async fn delete_lag_with_members() {
    let members = vec![
        lag_member("eth-1", "ae0"),
        lag_member("eth-2", "ae0"),
        lag("ae0", "STATIC"),
    ];
    let mut bench = Bench::with_baseline(device(members)).await;

    // Members must leave before the LAG goes away.
    let error = bench
        .commit(device(vec![
            lag_member("eth-1", "ae0"),
            lag_member("eth-2", "ae0"),
        ]))
        .await
        .unwrap_err();
    assert!(
        matches!(&error, Error::LagHasMembers(lag, _) if lag == "ae0"),
        "unexpected error: {error}"
    );

    let commands = bench
        .commit(device(vec![interface("eth-1"), interface("eth-2")]))
        .await
        .unwrap();
    assert_eq!(
        commands,
        vec![
            "remove-members(sm-ae0)".to_owned(),
            "delete-agg(ae0)".to_owned()
        ]
    );
    assert_eq!(bench.tables.lag_by_eth("eth-1"), None);
    assert!(!bench.tables.is_configured("ae0"));
    assert_mirrors(&bench.tables, &bench.switch.state());
}

#[tokio::test]
async fn prefix_length_update() {
    let mut bench = addressed_bench().await;

    let commands = bench
        .commit(device(vec![eth_with_ipv4("eth-1", &[("10.0.0.1", 16)])]))
        .await
        .unwrap();
    assert_eq!(
        commands,
        vec![
            "delete-ipv4(eth-1:10.0.0.1/24)".to_owned(),
            "add-ipv4(eth-1:10.0.0.1/16)".to_owned()
        ]
    );
    assert_eq!(
        bench.tables.addresses("eth-1", AddressFamily::Ipv4),
        vec![net("10.0.0.1/16")]
    );
    assert_mirrors(&bench.tables, &bench.switch.state());
}

#[tokio::test]
async fn dry_run_leaves_switch_untouched() {
    let bench = Bench::with_baseline(device(vec![interface("eth-1")])).await;
    let candidate = Device::from_value(device(vec![
        interface("eth-1"),
        interface("eth-2"),
    ]))
    .unwrap();

    let (transaction, tables) = bench
        .engine
        .plan(&bench.tables, &bench.running, &candidate)
        .unwrap();
    assert_eq!(transaction.len(), 1);
    assert!(tables.is_configured("eth-2"));
    assert!(!bench.tables.is_configured("eth-2"));
    assert!(bench.switch.log().is_empty());
}

#[tokio::test]
async fn access_to_trunk_mode_change() {
    let mut bench = Bench::with_baseline(device(vec![switched(
        "eth-1",
        json!({"interface-mode": "ACCESS", "access-vlan": 10}),
    )]))
    .await;

    // The access VLAN and the old mode go away before the new mode and
    // its memberships are installed.
    let commands = bench
        .commit(device(vec![switched(
            "eth-1",
            json!({
                "interface-mode": "TRUNK",
                "native-vlan": 5,
                "trunk-vlans": [20, 30]
            }),
        )]))
        .await
        .unwrap();
    assert_eq!(
        commands,
        strings(&[
            "delete-access-vlan(eth-1)",
            "delete-vlan-mode(eth-1)",
            "set-vlan-mode(eth-1)",
            "set-native-vlan(eth-1)",
            "add-trunk-vlans(eth-1)",
        ])
    );
    let ifname = "eth-1".to_owned();
    assert_eq!(
        bench.switch.log(),
        vec![
            SwitchRequest::RemoveVlanMembers {
                ifname: ifname.clone(),
                tagging: VlanTagging::Access,
                vids: vec![10],
            },
            SwitchRequest::SetVlanMode {
                ifname: ifname.clone(),
                mode: None,
            },
            SwitchRequest::SetVlanMode {
                ifname: ifname.clone(),
                mode: Some(VlanModeType::Trunk),
            },
            SwitchRequest::AddVlanMembers {
                ifname: ifname.clone(),
                tagging: VlanTagging::Native,
                vids: vec![5],
            },
            SwitchRequest::AddVlanMembers {
                ifname,
                tagging: VlanTagging::Trunk,
                vids: vec![20, 30],
            },
        ]
    );
    assert_eq!(bench.tables.vlan_mode("eth-1"), Some(VlanModeType::Trunk));
    assert_eq!(bench.tables.access_vlan("eth-1"), None);
    assert_eq!(bench.tables.native_vlan("eth-1"), Some(5));
    assert_eq!(bench.tables.trunk_vlans("eth-1"), vec![20, 30]);
    assert_mirrors(&bench.tables, &bench.switch.state());
}

#[tokio::test]
async fn access_vlan_change() {
    let mut bench = Bench::with_baseline(device(vec![switched(
        "eth-1",
        json!({"interface-mode": "ACCESS", "access-vlan": 10}),
    )]))
    .await;

    let commands = bench
        .commit(device(vec![switched(
            "eth-1",
            json!({"interface-mode": "ACCESS", "access-vlan": 20}),
        )]))
        .await
        .unwrap();
    assert_eq!(
        commands,
        strings(&[
            "delete-access-vlan(eth-1)",
            "set-access-vlan(eth-1)",
        ])
    );
    assert_eq!(bench.tables.vlan_mode("eth-1"), Some(VlanModeType::Access));
    assert_eq!(bench.tables.access_vlan("eth-1"), Some(20));
    assert_eq!(
        bench
            .switch
            .state()
            .vlans
            .get(&("eth-1".to_owned(), VlanTagging::Access)),
        Some(&btreeset! {20})
    );
    assert_mirrors(&bench.tables, &bench.switch.state());
}

#[tokio::test]
async fn trunk_vlans_batched() {
    let mut bench = Bench::with_baseline(device(vec![switched(
        "eth-1",
        json!({"interface-mode": "TRUNK"}),
    )]))
    .await;

    let commands = bench
        .commit(device(vec![switched(
            "eth-1",
            json!({"interface-mode": "TRUNK", "trunk-vlans": [20, 30, 40]}),
        )]))
        .await
        .unwrap();
    assert_eq!(commands, strings(&["add-trunk-vlans(eth-1)"]));
    assert_eq!(
        bench.switch.log(),
        vec![SwitchRequest::AddVlanMembers {
            ifname: "eth-1".to_owned(),
            tagging: VlanTagging::Trunk,
            vids: vec![20, 30, 40],
        }]
    );
    assert_eq!(bench.tables.trunk_vlans("eth-1"), vec![20, 30, 40]);
    assert_mirrors(&bench.tables, &bench.switch.state());
}

#[tokio::test]
async fn trunk_vlans_in_access_mode() {
    let mut bench =
        Bench::with_baseline(device(vec![interface("eth-1")])).await;
    let tables = bench.tables.clone();

    let error = bench
        .commit(device(vec![switched(
            "eth-1",
            json!({"interface-mode": "ACCESS", "trunk-vlans": [20]}),
        )]))
        .await
        .unwrap_err();
    assert!(
        matches!(&error, Error::VlanModeConflict(ifname, _)
            if ifname == "eth-1"),
        "unexpected error: {error}"
    );
    assert_eq!(error.kind(), ErrorKind::FailedPrecondition);
    assert_eq!(bench.tables, tables);
    assert!(bench.switch.log().is_empty());
}

#[tokio::test]
async fn breakout_split_and_collapse() {
    let mut bench =
        Bench::with_baseline(device(vec![interface("eth-5")])).await;

    // The whole port is retired before the split and the channels come
    // up after it.
    let mut candidate =
        device(vec![interface("eth-5/1"), interface("eth-5/2")]);
    candidate["components"] = breakout("eth-5", 4, "SPEED_10GB");
    let commands = bench.commit(candidate).await.unwrap();
    assert_eq!(
        commands,
        strings(&[
            "delete-eth(eth-5)",
            "set-breakout(eth-5)",
            "create-eth(eth-5/1)",
            "create-eth(eth-5/2)",
        ])
    );
    let mode = BreakoutMode {
        num_channels: 4,
        channel_speed: PortSpeed::Speed10Gb,
    };
    assert_eq!(bench.tables.breakout("eth-5"), mode);
    assert_eq!(bench.switch.state().breakout.get("eth-5"), Some(&mode));
    assert!(!bench.tables.is_configured("eth-5"));
    assert_mirrors(&bench.tables, &bench.switch.state());

    // Collapsing reverses the order.
    bench.switch.clear_log();
    let commands = bench
        .commit(device(vec![interface("eth-5")]))
        .await
        .unwrap();
    assert_eq!(
        commands,
        strings(&[
            "delete-eth(eth-5/1)",
            "delete-eth(eth-5/2)",
            "set-breakout(eth-5)",
            "create-eth(eth-5)",
        ])
    );
    assert_eq!(bench.tables.breakout("eth-5"), BreakoutMode::default());
    assert_eq!(bench.tables.breakout_config("eth-5"), None);
    assert!(bench.switch.state().breakout.is_empty());
    assert!(bench.tables.is_configured("eth-5"));
    assert_mirrors(&bench.tables, &bench.switch.state());
}

#[tokio::test]
async fn channel_without_breakout() {
    let mut bench = Bench::new();

    let error = bench
        .commit(device(vec![interface("eth-5/1")]))
        .await
        .unwrap_err();
    assert!(
        matches!(&error, Error::PortSplitConflict(_, ifname)
            if ifname == "eth-5/1"),
        "unexpected error: {error}"
    );
    assert_eq!(error.kind(), ErrorKind::FailedPrecondition);
    assert!(bench.switch.log().is_empty());
}

#[tokio::test]
async fn lag_member_move() {
    let mut bench = Bench::with_baseline(device(vec![
        lag_member("eth-1", "ae0"),
        lag("ae0", "STATIC"),
        lag("ae1", "STATIC"),
    ]))
    .await;

    let commands = bench
        .commit(device(vec![
            lag_member("eth-1", "ae1"),
            lag("ae0", "STATIC"),
            lag("ae1", "STATIC"),
        ]))
        .await
        .unwrap();
    assert_eq!(
        commands,
        strings(&[
            "remove-members(sm-ae0)",
            "add-members(sm-ae1)",
        ])
    );
    assert_eq!(
        bench.switch.log(),
        vec![
            SwitchRequest::RemoveEthernetIntfFromAggregateIntf {
                lag: "ae0".to_owned(),
                members: vec!["eth-1".to_owned()],
            },
            SwitchRequest::AddEthernetIntfToAggregateIntf {
                lag: "ae1".to_owned(),
                members: vec!["eth-1".to_owned()],
            },
        ]
    );
    assert_eq!(bench.tables.lag_by_eth("eth-1").as_deref(), Some("ae1"));
    assert!(bench.tables.eths_by_lag("ae0").is_empty());
    assert_mirrors(&bench.tables, &bench.switch.state());
}

#[tokio::test]
async fn lacp_configuration() {
    let mut bench = Bench::new();

    // LACP is set up once the LAG exists.
    let mut candidate = device(vec![lag("ae0", "LACP")]);
    candidate["lacp"] = lacp("ae0");
    let commands = bench.commit(candidate).await.unwrap();
    assert_eq!(
        commands,
        strings(&["create-agg(ae0)", "set-lacp(ae0)"])
    );
    assert!(bench.tables.has_lacp("ae0"));
    assert!(bench.tables.lacp_attribute("ae0", LacpAttr::Interval).is_some());
    assert!(bench.tables.lacp_attribute("ae0", LacpAttr::Mode).is_some());
    let state = bench.switch.state();
    assert_eq!(state.lacp.get("ae0").map(|attrs| attrs.len()), Some(2));

    let commands = bench
        .commit(device(vec![lag("ae0", "LACP")]))
        .await
        .unwrap();
    assert_eq!(commands, strings(&["delete-lacp(ae0)"]));
    assert!(!bench.tables.has_lacp("ae0"));
    assert!(!bench.switch.state().lacp.contains_key("ae0"));
    assert_mirrors(&bench.tables, &bench.switch.state());
}

#[tokio::test]
async fn lacp_on_static_lag() {
    let mut bench =
        Bench::with_baseline(device(vec![lag("ae0", "STATIC")])).await;
    let tables = bench.tables.clone();

    let mut candidate = device(vec![lag("ae0", "STATIC")]);
    candidate["lacp"] = lacp("ae0");
    let error = bench.commit(candidate).await.unwrap_err();
    assert!(
        matches!(&error, Error::LacpNotSupported(lag) if lag == "ae0"),
        "unexpected error: {error}"
    );
    assert_eq!(error.kind(), ErrorKind::FailedPrecondition);
    assert_eq!(bench.tables, tables);
    assert!(bench.switch.log().is_empty());
}
