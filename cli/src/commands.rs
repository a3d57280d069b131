pub mod connect;
pub mod discover;
pub mod interfaces;

use std::time::Duration;

use anyhow::bail;
use clap::{ArgAction, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use camscout_common::camera::Credentials;
use camscout_common::config::{self, Config};
use camscout_common::utils::input::InputHandle;

#[derive(Parser)]
#[command(name = "camscout")]
#[command(about = "Finds ONVIF cameras on the local network and negotiates their RTSP streams.")]
#[command(version)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Username for WS-Security authentication
    #[arg(short, long, global = true, env = "CAMSCOUT_USERNAME")]
    pub username: Option<String>,

    /// Password for WS-Security authentication
    #[arg(short, long, global = true, env = "CAMSCOUT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Only probe from this interface
    #[arg(short, long, global = true)]
    pub interface: Option<String>,

    /// Seconds without a response before a discovery session stops listening
    #[arg(long, global = true, default_value_t = config::DEFAULT_SILENCE_WINDOW.as_secs())]
    pub silence: u64,

    /// Upper bound in seconds on each discovery session
    #[arg(long, global = true, default_value_t = config::DEFAULT_DISCOVERY_CAP.as_secs())]
    pub cap: u64,

    /// Seconds to wait for each device request
    #[arg(short, long, global = true, default_value_t = config::DEFAULT_REQUEST_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Cameras negotiated at the same time
    #[arg(short, long, global = true, default_value_t = config::DEFAULT_WORKERS)]
    pub workers: usize,

    /// Reduce output (-q hides decorations, -qq prints results only)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// Increase log verbosity
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discover cameras and negotiate a stream URI from each
    #[command(alias = "d")]
    Discover,
    /// Negotiate a stream URI from a single camera
    #[command(alias = "c")]
    Connect { address: String },
    /// List the interfaces discovery would probe from
    #[command(alias = "i")]
    Interfaces,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> anyhow::Result<Config> {
        let credentials: Option<Credentials> = match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(Credentials::new(username, password)),
            (None, None) => None,
            _ => bail!("--username and --password must be given together"),
        };

        if self.silence == 0 || self.cap == 0 || self.timeout == 0 {
            bail!("timeouts must be at least one second");
        }

        Ok(Config {
            silence_window: Duration::from_secs(self.silence),
            discovery_cap: Duration::from_secs(self.cap),
            request_timeout: Duration::from_secs(self.timeout),
            workers: self.workers.max(1),
            interface: self.interface.clone(),
            credentials,
            quiet: self.quiet,
        })
    }
}

/// Cancels `cancel` on `q`, Ctrl-C in raw mode, or SIGINT.
///
/// The returned handle restores the terminal when dropped.
pub fn watch_for_interrupt(cancel: &CancellationToken) -> Option<InputHandle> {
    let on_signal: CancellationToken = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let on_key: CancellationToken = cancel.clone();
    match InputHandle::start(move || on_key.cancel()) {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Keyboard input unavailable: {e}");
            None
        }
    }
}
