use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, error};

use camscout_common::camera::Credentials;
use camscout_common::config::Config;
use camscout_core::network::soap::OnvifConnector;
use camscout_core::orchestrator::Orchestrator;

use crate::terminal::{format, print, spinner};

pub async fn connect(address: String, cfg: Config) -> anyhow::Result<()> {
    let credentials: Credentials = cfg
        .credentials
        .clone()
        .context("connecting requires --username and --password")?;
    let quiet: u8 = cfg.quiet;

    let connector = OnvifConnector::new(cfg.request_timeout)?;
    let cancel = CancellationToken::new();
    let orchestrator = Orchestrator::new(connector, cfg, cancel.clone());
    let input = super::watch_for_interrupt(&cancel);

    let span: Span = spinner::start(&format!("Negotiating with {address}"));
    let report = orchestrator
        .negotiate_address(&address, &credentials)
        .instrument(span.clone())
        .await;
    drop(span);
    drop(input);

    if quiet > 1 {
        match report.stream_uri() {
            Some(uri) => print::print(uri),
            None => error!("{address}: no stream URI"),
        }
    } else {
        print::header("stream negotiation", quiet);
        print::tree_head(0, report.camera.address());
        print::as_tree_one_level(format::camera_details(&report));
        print::end_of_program(quiet);
    }

    if let Err(e) = report.result {
        anyhow::bail!("negotiation with {address} failed while {}", e.step());
    }
    Ok(())
}
