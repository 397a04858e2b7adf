use anyhow::{Context, Result};
use blasterx_types::{DspFeature, GlobalProfileFlag, ValueKind, FAMILY_DSP};
use blasterx_usb::client::{FeatureValue, ProtocolClient};
use blasterx_usb::commands::OUTPUT_MODE_OFFSET;
use blasterx_usb::drain::drain;
use blasterx_usb::features;
use blasterx_usb::session::{Session, SessionConfig};
use blasterx_usb::transport::Transport;
use clap::Parser;
use log::{debug, info, warn};
use serde::Serialize;
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};
use std::fmt::Display;
use std::time::Duration;
use strum::IntoEnumIterator;

use crate::cli::{Cli, LevelFilter, State, SubCommands};

mod cli;

const TIMEOUT: &str = "TIMEOUT";

#[derive(Serialize)]
struct FeatureReport {
    id: u8,
    name: &'static str,
    kind: ValueKind,
    value: Option<f32>,
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    CombinedLogger::init(vec![TermLogger::new(
        match args.log_level {
            LevelFilter::Off => log::LevelFilter::Off,
            LevelFilter::Error => log::LevelFilter::Error,
            LevelFilter::Warn => log::LevelFilter::Warn,
            LevelFilter::Info => log::LevelFilter::Info,
            LevelFilter::Debug => log::LevelFilter::Debug,
            LevelFilter::Trace => log::LevelFilter::Trace,
        },
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )])
    .context("Could not configure the logger")?;

    let config = SessionConfig {
        reply_timeout: Duration::from_millis(args.reply_timeout),
        drain_timeout: Duration::from_millis(args.drain_timeout),
        ..SessionConfig::default()
    };

    let transport = blasterx_usb::device::open(&config).context("Could not open the G6")?;
    let mut session = Session::new(transport, config);

    // Anything left over from a previous run would be taken as our reply.
    let timeout = session.config().drain_timeout;
    let stale = drain(&mut session, timeout).context("Could not flush the device")?;
    if !stale.is_empty() {
        debug!("Discarded {} stale frames", stale.len());
    }

    let mut client = ProtocolClient::new(&mut session);
    run(&mut client, args.command)
}

fn run<T: Transport>(
    client: &mut ProtocolClient<'_, T>,
    command: SubCommands,
) -> Result<()> {
    match command {
        SubCommands::Info => {
            let info = client.device_info().context("Device info query failed")?;
            println!("Identify:    {}", or_timeout(info.identify.map(|v| format!("{v:#04x}"))));
            println!("Serial:      {}", or_timeout(info.serial.map(|v| hex(&v))));
            println!("Hardware Id: {}", or_timeout(info.hardware_id.map(|v| format!("{v:#04x}"))));
            println!("DSP Version: {}", or_timeout(info.dsp_version.map(|v| hex(&v))));
            println!("Firmware:    {}", or_timeout(info.firmware));
        }
        SubCommands::List { json } => {
            let values = client.read_all(FAMILY_DSP).context("Could not read features")?;
            if json {
                let report: Vec<FeatureReport> = values
                    .iter()
                    .map(|(feature, value)| FeatureReport {
                        id: feature.id,
                        name: feature.name,
                        kind: feature.kind,
                        value: value.map(|value| value.0),
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for (feature, value) in values {
                    let shown = value.map(|value| match feature.kind {
                        ValueKind::Toggle => on_off(value.as_bool()).to_string(),
                        ValueKind::Level => value.0.to_string(),
                    });
                    println!("{:#04x} {:<20} {}", feature.id, feature.name, or_timeout(shown));
                }
            }
        }
        SubCommands::Get { feature } => {
            let reading = client.get(feature).context("Read failed")?;
            if let Some(reading) = &reading {
                debug!("Status bytes {:02x?}", reading.response.status());
            }
            println!("{}", or_timeout(reading.map(|reading| reading.value.0)));
        }
        SubCommands::Set {
            feature,
            value,
            unmanaged,
        } => {
            in_usual_range(feature, value);
            let value = FeatureValue(value);
            let frames = if unmanaged {
                client.set(feature, value)
            } else {
                client.set_feature(feature, value)
            }
            .context("Write failed")?;
            info!("{} set, device sent {} frames", feature, frames.len());
        }
        SubCommands::Toggle { feature } => {
            let written = client.toggle_feature(feature).context("Toggle failed")?;
            println!("{}", or_timeout(written.map(|value| on_off(value.as_bool()))));
        }
        SubCommands::RawRead { family, id } => {
            let reading = client.read_raw(family, id).context("Read failed")?;
            println!("{}", or_timeout(reading.map(|reading| reading.value.0)));
        }
        SubCommands::RawWrite { family, id, value } => {
            if features::lookup(family, id).is_none() {
                info!("{:#04x}:{:#04x} isn't a known feature, sending anyway", family, id);
            }
            client
                .write_feature(family, id, FeatureValue(value))
                .context("Write failed")?;
        }
        SubCommands::Profile { flag, state } => match (flag, state) {
            (Some(flag), Some(state)) => {
                client
                    .set_global_profile(flag, state == State::On)
                    .with_context(|| format!("Could not change {flag}"))?;
            }
            (flag, _) => {
                let reading = client.read_global_profile().context("Read failed")?;
                let Some(reading) = reading else {
                    println!("{TIMEOUT}");
                    return Ok(());
                };
                for current in GlobalProfileFlag::iter() {
                    if flag.is_none() || flag == Some(current) {
                        println!("{:<12} {}", current, on_off(reading.value.contains(current)));
                    }
                }
            }
        },
        SubCommands::Output { mode } => match mode {
            Some(mode) => {
                client.set_output(mode).context("Could not switch output")?;
            }
            None => {
                let reading = client.read_output().context("Read failed")?;
                let shown = reading.map(|reading| match reading.value {
                    Some(output) => output.to_string(),
                    None => {
                        let mode = reading.response.as_bytes()[OUTPUT_MODE_OFFSET];
                        format!("Unknown ({:#04x})", mode)
                    }
                });
                println!("{}", or_timeout(shown));
            }
        },
        SubCommands::Reset => {
            client.reset().context("Reset failed")?;
        }
    }
    Ok(())
}

/// Ranges are what the Creative software offers, the device takes anything.
fn in_usual_range(feature: DspFeature, value: f32) -> bool {
    match feature.range() {
        Some((min, max)) if !(min..=max).contains(&value) => {
            warn!(
                "{} is outside the usual {} to {} for {}, sending anyway",
                value, min, max, feature
            );
            false
        }
        _ => true,
    }
}

fn or_timeout<T: Display>(value: Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => TIMEOUT.to_string(),
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "On"
    } else {
        "Off"
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}
