// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

//! perch - feeder camera stream supervisor
//!
//! Keeps a feeder's live feed republished to an outbound endpoint while
//! protecting the device battery and honoring its sunset duty cycle.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal::unix::{signal, SignalKind};
use tracing_subscriber::EnvFilter;

use perch_adapters::{FfmpegRelayAdapter, HttpCloudAdapter, SolarSunsetAdapter};
use perch_core::{AgentConfig, CancelToken, Location, SystemClock, Tz};
use perch_engine::{Agent, SessionDeps};
use perch_storage::{FileStore, StateStore};

const DEFAULT_API_URL: &str = "https://api.mybirdfeeder.example/v1";

#[derive(Parser)]
#[command(
    name = "perch",
    version,
    about = "Feeder camera stream supervisor",
    after_help = "Exit codes (single-shot mode): 0 success, 1 auth failure, \
                  2 feeder not found, 3 feeder not streamable, 4 battery too low, \
                  5 relay launch failure, 6 empty stream URL."
)]
struct Cli {
    /// Account username (falls back to cached session tokens)
    #[arg(long)]
    username: Option<String>,

    /// Account password
    #[arg(long)]
    password: Option<String>,

    /// Feeder name as shown in the account
    #[arg(long)]
    feeder_name: String,

    /// Outbound publish URL for the relay
    #[arg(long)]
    out_url: String,

    /// Cloud API base URL
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Log filter (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Battery level required to start (or resume after recovery)
    #[arg(long, default_value_t = 60)]
    min_starting_battery_level: u8,

    /// Battery level below which a running stream is stopped
    #[arg(long, default_value_t = 30)]
    min_battery_level: u8,

    /// Keep retrying forever instead of exiting after one cycle
    #[arg(long)]
    continuous: bool,

    /// Directory for cooldown/recovery/token state
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Cooldown written after an unfavorable cycle, in seconds
    #[arg(long, default_value_t = 600)]
    cooldown_secs: u64,

    /// Seconds between keep-alive calls while streaming
    #[arg(long, default_value_t = 30)]
    keep_alive_secs: u64,

    /// Seconds between full feeder status re-polls while streaming
    #[arg(long, default_value_t = 300)]
    feeder_refresh_secs: u64,

    /// Looping placeholder published while no live feed is available
    /// (continuous mode only)
    #[arg(long)]
    splash_asset: Option<PathBuf>,

    /// Video codec for the relay, or `copy` for passthrough
    #[arg(long, default_value = "libx264")]
    encoder: String,

    /// Device latitude (enables sunset gating with --longitude and --timezone)
    #[arg(long, requires = "longitude", requires = "timezone")]
    latitude: Option<f64>,

    /// Device longitude, degrees east
    #[arg(long, requires = "latitude")]
    longitude: Option<f64>,

    /// IANA timezone of the device, e.g. Europe/Stockholm
    #[arg(long, requires = "latitude")]
    timezone: Option<String>,

    /// Seconds before sunset at which the quiet window opens
    #[arg(long, default_value_t = 45 * 60)]
    quiet_window_lead_secs: u64,
}

impl Cli {
    fn location(&self) -> Result<Option<Location>> {
        let (Some(latitude), Some(longitude), Some(tz)) =
            (self.latitude, self.longitude, self.timezone.as_deref())
        else {
            return Ok(None);
        };
        let timezone = tz
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("invalid timezone {}: {}", tz, e))?;
        Ok(Some(Location {
            latitude,
            longitude,
            timezone,
        }))
    }

    fn agent_config(&self) -> Result<AgentConfig> {
        let config = AgentConfig {
            feeder_name: self.feeder_name.clone(),
            out_url: self.out_url.clone(),
            video_codec: self.encoder.clone(),
            // Mirror debug-level supervision into the relay's own logs
            relay_log_level: if self.log_level.eq_ignore_ascii_case("debug") {
                "info".to_string()
            } else {
                "warning".to_string()
            },
            min_battery_level: self.min_battery_level,
            min_starting_battery_level: self.min_starting_battery_level,
            cooldown: Duration::from_secs(self.cooldown_secs),
            keep_alive_interval: Duration::from_secs(self.keep_alive_secs),
            feeder_refresh_interval: Duration::from_secs(self.feeder_refresh_secs),
            splash_asset: self.splash_asset.clone(),
            location: self.location()?,
            quiet_window_lead: Duration::from_secs(self.quiet_window_lead_secs),
            ..AgentConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(|| {
            dirs::state_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("perch")
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = cli.agent_config()?;
    let cancel = CancelToken::new();
    install_signal_handlers(&cancel)?;

    let store = FileStore::open(&cli.state_dir(), SystemClock)
        .with_context(|| format!("opening state dir {}", cli.state_dir().display()))?;

    let cached_tokens = store.load_tokens();
    let credentials = match (&cli.username, &cli.password) {
        (Some(username), Some(password)) => Some((username.clone(), password.clone())),
        (None, None) => None,
        _ => bail!("--username and --password must be given together"),
    };
    if credentials.is_none() && cached_tokens.is_none() {
        bail!("no credentials given and no cached session tokens found");
    }

    let deps = SessionDeps {
        cloud: HttpCloudAdapter::new(&cli.api_url, credentials, cached_tokens),
        relay: FfmpegRelayAdapter::new(config.stop_grace),
        sunset: SolarSunsetAdapter::new(config.location, config.quiet_window_lead),
        store,
    };
    let agent = Agent::new(deps, config, cancel.clone(), SystemClock);

    if cli.continuous {
        tracing::info!(feeder = %cli.feeder_name, "starting continuous supervision");
        agent.run_continuous().await;
        tracing::info!("exiting");
        Ok(())
    } else {
        let outcome = agent.run_once().await;
        tracing::info!(%outcome, code = outcome.exit_code(), "cycle finished");
        std::process::exit(outcome.exit_code());
    }
}

/// SIGTERM, SIGINT and SIGHUP all request a cooperative shutdown
fn install_signal_handlers(cancel: &CancelToken) -> Result<()> {
    let mut term = signal(SignalKind::terminate())?;
    let mut int = signal(SignalKind::interrupt())?;
    let mut hup = signal(SignalKind::hangup())?;
    let cancel = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = term.recv() => {}
            _ = int.recv() => {}
            _ = hup.recv() => {}
        }
        tracing::info!("termination signal received");
        cancel.cancel();
    });
    Ok(())
}
