use std::collections::HashMap;
use std::io;
use std::net::Ipv4Addr;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use camscout_common::config::{DEFAULT_DISCOVERY_CAP, DEFAULT_SILENCE_WINDOW};
use camscout_common::network::address::NetworkAddress;
use camscout_core::discovery::{Discovery, DiscoveryReport, SessionOutcome, SessionTiming};

use crate::support::{Reply, ScriptedTransport, network_address};

const CAM_10: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 10);
const CAM_11: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 11);

async fn run_discovery(
    script: HashMap<&'static str, Vec<Reply>>,
    addresses: Vec<NetworkAddress>,
    cancel: CancellationToken,
) -> DiscoveryReport {
    let mut script = script;
    Discovery::new(SessionTiming::default(), cancel)
        .run_with(addresses, |address| {
            script
                .remove(address.interface())
                .map(ScriptedTransport::new)
                .ok_or_else(|| io::Error::from(io::ErrorKind::AddrNotAvailable))
        })
        .await
}

#[tokio::test(start_paused = true)]
async fn duplicate_responses_across_interfaces_merge_by_address() {
    let script = HashMap::from([
        ("eth0", vec![Reply::Match(CAM_10), Reply::Match(CAM_10), Reply::Match(CAM_11)]),
        ("wlan0", vec![Reply::Match(CAM_10)]),
    ]);
    let addresses = vec![network_address([192, 168, 1, 2], "eth0"), network_address([192, 168, 1, 3], "wlan0")];

    let report = run_discovery(script, addresses, CancellationToken::new()).await;

    assert_eq!(report.devices.len(), 2);
    assert!(report.devices.contains(&CAM_10));
    assert!(report.devices.contains(&CAM_11));
    assert_eq!(report.sessions.len(), 2);
    assert!(report.sessions.iter().all(|s| matches!(s.outcome, SessionOutcome::Quiet)));

    let found: usize = report.sessions.iter().map(|s| s.found).sum();
    assert_eq!(found, 3);
}

#[tokio::test(start_paused = true)]
async fn sessions_run_concurrently() {
    let started = Instant::now();
    let script = HashMap::from([
        ("eth0", vec![Reply::Wait(Duration::from_secs(2)), Reply::Match(CAM_10)]),
        ("eth1", vec![Reply::Wait(Duration::from_secs(2)), Reply::Match(CAM_11)]),
    ]);
    let addresses = vec![network_address([10, 0, 0, 2], "eth0"), network_address([10, 1, 0, 2], "eth1")];

    let report = run_discovery(script, addresses, CancellationToken::new()).await;

    assert_eq!(report.devices.len(), 2);
    assert_eq!(started.elapsed(), Duration::from_secs(2) + DEFAULT_SILENCE_WINDOW);
}

#[tokio::test(start_paused = true)]
async fn silent_network_is_not_an_error() {
    let script = HashMap::from([("eth0", vec![])]);
    let report = run_discovery(script, vec![network_address([10, 0, 0, 2], "eth0")], CancellationToken::new()).await;

    assert!(report.devices.is_empty());
    assert_eq!(report.failures().count(), 0);
    assert!(!report.was_cancelled());
}

#[tokio::test(start_paused = true)]
async fn stale_and_foreign_datagrams_are_ignored() {
    let script = HashMap::from([(
        "eth0",
        vec![
            Reply::Noise(Ipv4Addr::new(192, 168, 1, 1)),
            Reply::Stale(Ipv4Addr::new(192, 168, 1, 20)),
            Reply::Match(CAM_10),
        ],
    )]);
    let report = run_discovery(script, vec![network_address([192, 168, 1, 2], "eth0")], CancellationToken::new()).await;

    assert_eq!(report.devices.addresses().collect::<Vec<_>>(), vec![CAM_10]);
    let device = report.devices.get(&CAM_10).unwrap();
    assert_eq!(device.scope_name().as_deref(), Some("Cam 192.168.1.10"));
    assert_eq!(device.device_service_url(), Some("http://192.168.1.10/onvif/device_service"));
}

#[tokio::test(start_paused = true)]
async fn failing_interface_does_not_abort_the_pass() {
    let script = HashMap::from([("eth0", vec![Reply::Match(CAM_10)])]);
    let addresses = vec![network_address([192, 168, 1, 2], "eth0"), network_address([172, 16, 0, 2], "docker0")];

    let report = run_discovery(script, addresses, CancellationToken::new()).await;

    assert_eq!(report.devices.len(), 1);
    let failed: Vec<&str> = report.failures().map(|s| s.address.interface()).collect();
    assert_eq!(failed, vec!["docker0"]);
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_every_session_early() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let script = HashMap::from([
        ("eth0", vec![Reply::Match(CAM_10)]),
        ("eth1", vec![Reply::Wait(Duration::from_secs(1)), Reply::Match(CAM_11)]),
    ]);
    let addresses = vec![network_address([10, 0, 0, 2], "eth0"), network_address([10, 1, 0, 2], "eth1")];
    let report = run_discovery(script, addresses, cancel).await;

    assert!(report.was_cancelled());
    assert!(report.sessions.iter().all(|s| s.outcome.is_cancelled()));
    assert!(started.elapsed() < DEFAULT_SILENCE_WINDOW);
    assert!(started.elapsed() < DEFAULT_DISCOVERY_CAP);
}
