use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use colored::*;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, info};

use camscout_common::config::Config;
use camscout_common::network::device::DiscoveredDevice;
use camscout_core::discovery::{DiscoveryReport, FoundCallback};
use camscout_core::network::soap::{OnvifConnector, OnvifSession};
use camscout_core::orchestrator::{CameraReport, Orchestrator, PassReport};

use crate::mprint;
use crate::terminal::{colors, format, print, spinner};

pub async fn discover(cfg: Config) -> anyhow::Result<()> {
    let quiet: u8 = cfg.quiet;
    let connector = OnvifConnector::new(cfg.request_timeout)?;
    let cancel = CancellationToken::new();
    let orchestrator = Orchestrator::new(connector, cfg, cancel.clone());

    let input = super::watch_for_interrupt(&cancel);

    let span: Span = spinner::start("Probing for ONVIF devices");
    let found: Arc<AtomicUsize> = Arc::new(AtomicUsize::new(0));
    let progress_span: Span = span.clone();
    let on_found: FoundCallback = Arc::new(move |_: &DiscoveredDevice| {
        let count: usize = found.fetch_add(1, Ordering::Relaxed) + 1;
        spinner::report_discovery_progress(&progress_span, count);
    });

    let pass: PassReport<OnvifSession> = orchestrator
        .run(Some(on_found))
        .instrument(span.clone())
        .await;
    drop(span);
    drop(input);

    discovery_ends(&pass.discovery, &pass.cameras, quiet);
    Ok(())
}

fn discovery_ends(discovery: &DiscoveryReport, cameras: &[CameraReport<OnvifSession>], quiet: u8) {
    if discovery.devices.is_empty() {
        print::header("zero cameras detected", quiet);
        print::no_results(quiet);
        return;
    }

    if quiet > 1 {
        print_stream_uris(cameras);
        return;
    }

    print::header("camera discovery", quiet);
    for (idx, device) in discovery.devices.iter().enumerate() {
        print::tree_head(idx, &format::device_title(device));
        let mut details: Vec<format::Detail> = format::device_details(device);
        if let Some(report) = cameras
            .iter()
            .find(|report| report.device.as_ref().is_some_and(|d| d.addr == device.addr))
        {
            details.extend(format::camera_details(report));
        }
        print::as_tree_one_level(details);
        if idx + 1 != discovery.devices.len() {
            mprint!();
        }
    }

    print_summary(discovery, cameras, quiet);
}

fn print_stream_uris(cameras: &[CameraReport<OnvifSession>]) {
    for uri in cameras.iter().filter_map(CameraReport::stream_uri) {
        print::print(uri);
    }
}

fn print_summary(discovery: &DiscoveryReport, cameras: &[CameraReport<OnvifSession>], quiet: u8) {
    let found: ColoredString = format!("{} cameras", discovery.devices.len()).bold().green();
    let total_time: ColoredString = format::elapsed(discovery.elapsed);
    let mut output: String = format!("Discovery Complete: {found} identified in {total_time}");

    if !cameras.is_empty() {
        let negotiated: usize = cameras.iter().filter(|report| report.result.is_ok()).count();
        let streams: ColoredString = format!("{negotiated}/{}", cameras.len()).bold().green();
        output.push_str(&format!(", {streams} streams"));
    }
    let output: ColoredString = output.color(colors::TEXT_DEFAULT);

    match quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output.to_string());
        }
        _ => {
            mprint!();
            info!("{}", output);
        }
    }
}
