use std::collections::HashMap;
use std::io;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use camscout_common::camera::Credentials;
use camscout_common::config::Config;
use camscout_common::error::TransportError;
use camscout_common::network::address::NetworkAddress;
use camscout_common::network::device::DiscoveredDevice;
use camscout_core::discovery::FoundCallback;
use camscout_core::error::NegotiationError;
use camscout_core::orchestrator::{Orchestrator, PassReport};

use crate::support::{Behavior, FakeCamera, FakeFleet, Reply, ScriptedTransport, network_address};

const CAM_10: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 10);
const CAM_11: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 11);

fn credentials() -> Option<Credentials> {
    Some(Credentials::new("admin", "secret"))
}

fn create_orchestrator(
    fleet: FakeFleet,
    credentials: Option<Credentials>,
    cancel: CancellationToken,
) -> Orchestrator<FakeFleet> {
    let config = Config {
        workers: 2,
        credentials,
        ..Config::default()
    };
    Orchestrator::new(fleet, config, cancel)
}

async fn run_pass(
    orchestrator: &Orchestrator<FakeFleet>,
    script: HashMap<&'static str, Vec<Reply>>,
    addresses: Vec<NetworkAddress>,
    on_found: Option<FoundCallback>,
) -> PassReport<FakeCamera> {
    let mut script = script;
    orchestrator
        .run_with(
            addresses,
            |address| {
                script
                    .remove(address.interface())
                    .map(ScriptedTransport::new)
                    .ok_or_else(|| io::Error::from(io::ErrorKind::AddrNotAvailable))
            },
            on_found,
        )
        .await
}

#[tokio::test(start_paused = true)]
async fn devices_seen_on_two_interfaces_are_negotiated_once() {
    let fleet = FakeFleet::default()
        .with([192, 168, 1, 10], Behavior::Healthy)
        .with([192, 168, 1, 11], Behavior::NoProfiles);
    let stats = fleet.stats.clone();
    let orchestrator = create_orchestrator(fleet, credentials(), CancellationToken::new());

    let announced = Arc::new(AtomicUsize::new(0));
    let counter = announced.clone();
    let on_found: FoundCallback = Arc::new(move |_: &DiscoveredDevice| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let script = HashMap::from([
        ("eth0", vec![Reply::Match(CAM_10), Reply::Match(CAM_10), Reply::Match(CAM_11)]),
        ("wlan0", vec![Reply::Match(CAM_10)]),
    ]);
    let addresses = vec![network_address([192, 168, 1, 2], "eth0"), network_address([192, 168, 1, 3], "wlan0")];

    let pass = run_pass(&orchestrator, script, addresses, Some(on_found)).await;

    assert_eq!(pass.discovery.devices.len(), 2);
    assert_eq!(announced.load(Ordering::SeqCst), 2);
    assert_eq!(pass.cameras.len(), 2);

    let order: Vec<Ipv4Addr> = pass.cameras.iter().map(|c| c.device.as_ref().unwrap().addr).collect();
    assert_eq!(order, pass.discovery.devices.addresses().collect::<Vec<_>>());

    let healthy = pass.cameras.iter().find(|c| c.device.as_ref().unwrap().addr == CAM_10).unwrap();
    assert_eq!(healthy.stream_uri(), Some("rtsp://192.168.1.10:554/token1"));
    assert_eq!(healthy.camera.manufacturer(), Some("Acme"));

    let empty = pass.cameras.iter().find(|c| c.device.as_ref().unwrap().addr == CAM_11).unwrap();
    assert!(matches!(empty.result, Err(NegotiationError::NoMediaProfiles)));

    assert_eq!(stats.stream_requests(), vec!["192.168.1.10 token1"]);
}

#[tokio::test(start_paused = true)]
async fn cancelled_pass_keeps_devices_but_skips_negotiation() {
    let fleet = FakeFleet::default().with([192, 168, 1, 10], Behavior::Healthy);
    let stats = fleet.stats.clone();
    let cancel = CancellationToken::new();
    let orchestrator = create_orchestrator(fleet, credentials(), cancel.clone());

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        trigger.cancel();
    });

    let script = HashMap::from([("eth0", vec![Reply::Match(CAM_10)])]);
    let pass = run_pass(&orchestrator, script, vec![network_address([192, 168, 1, 2], "eth0")], None).await;

    assert!(pass.discovery.was_cancelled());
    assert!(pass.discovery.devices.contains(&CAM_10));
    assert!(pass.cameras.is_empty());
    assert!(stats.stream_requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn pass_without_credentials_only_discovers() {
    let fleet = FakeFleet::default().with([192, 168, 1, 10], Behavior::Healthy);
    let stats = fleet.stats.clone();
    let orchestrator = create_orchestrator(fleet, None, CancellationToken::new());

    let script = HashMap::from([("eth0", vec![Reply::Match(CAM_10)])]);
    let pass = run_pass(&orchestrator, script, vec![network_address([192, 168, 1, 2], "eth0")], None).await;

    assert_eq!(pass.discovery.devices.len(), 1);
    assert!(!pass.discovery.was_cancelled());
    assert!(pass.cameras.is_empty());
    assert!(stats.stream_requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn endpoint_on_another_host_is_never_contacted() {
    let fleet = FakeFleet::default()
        .with([192, 168, 1, 10], Behavior::Unreachable)
        .with([10, 9, 9, 9], Behavior::Healthy);
    let stats = fleet.stats.clone();
    let orchestrator = create_orchestrator(fleet, credentials(), CancellationToken::new());

    let script = HashMap::from([(
        "eth0",
        vec![Reply::Advertising(CAM_10, "http://10.9.9.9/onvif/device_service")],
    )]);
    let pass = run_pass(&orchestrator, script, vec![network_address([192, 168, 1, 2], "eth0")], None).await;

    assert_eq!(pass.cameras.len(), 1);
    let report = &pass.cameras[0];
    assert_eq!(report.camera.address(), "192.168.1.10");
    assert!(matches!(
        &report.result,
        Err(NegotiationError::Connection { address, source: TransportError::Unreachable(_) })
            if address == "http://192.168.1.10/onvif/device_service"
    ));
    assert!(stats.stream_requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn advertised_endpoint_on_the_same_host_is_used() {
    let fleet = FakeFleet::default().with([192, 168, 1, 10], Behavior::Healthy);
    let orchestrator = create_orchestrator(fleet, credentials(), CancellationToken::new());

    let script = HashMap::from([(
        "eth0",
        vec![Reply::Advertising(CAM_10, "http://192.168.1.10:8080/onvif/device_service")],
    )]);
    let pass = run_pass(&orchestrator, script, vec![network_address([192, 168, 1, 2], "eth0")], None).await;

    let report = &pass.cameras[0];
    assert_eq!(report.camera.address(), "http://192.168.1.10:8080/onvif/device_service");
    assert_eq!(report.stream_uri(), Some("rtsp://192.168.1.10:554/token1"));
}
