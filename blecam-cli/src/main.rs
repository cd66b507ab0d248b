mod replay;

use anyhow::{Context, Result, bail};
use blecam_lib::{Command, ManualClock, Phy, Resolution, ServiceLayout, SubChannel, TransferEngine, TransferEvent, TransportError};
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use replay::Record;
use serde_json::json;
use std::fs::{self, File};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Tools for the BLE camera image transfer protocol.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Action,
    /// Optional path to a file to write logs to, in addition to the console.
    #[arg(short, long, global = true)]
    log_file: Option<PathBuf>,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Print the wire form of a command as hex.
    Encode {
        command: CommandArg,
        /// Resolution for change-resolution.
        #[arg(short, long)]
        resolution: Option<ResolutionArg>,
        /// PHY for change-phy.
        #[arg(short, long)]
        phy: Option<PhyArg>,
    },
    /// Feed a recorded notification log through the transfer engine.
    Replay {
        path: PathBuf,
        /// Emit one JSON object per event.
        #[arg(long)]
        json: bool,
        /// Also print per-fragment progress events.
        #[arg(long)]
        progress: bool,
    },
    /// Show the GATT characteristics of the image service.
    Layout,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CommandArg {
    NoCommand,
    StartCapture,
    StartStream,
    StopStream,
    ChangeResolution,
    ChangePhy,
    BleParameters,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ResolutionArg {
    #[value(name = "160x120")]
    R160x120,
    #[value(name = "320x240")]
    R320x240,
    #[value(name = "640x480")]
    R640x480,
    #[value(name = "800x600")]
    R800x600,
    #[value(name = "1024x768")]
    R1024x768,
    #[value(name = "1600x1200")]
    R1600x1200,
}

impl From<ResolutionArg> for Resolution {
    fn from(arg: ResolutionArg) -> Self {
        match arg {
            ResolutionArg::R160x120 => Resolution::R160x120,
            ResolutionArg::R320x240 => Resolution::R320x240,
            ResolutionArg::R640x480 => Resolution::R640x480,
            ResolutionArg::R800x600 => Resolution::R800x600,
            ResolutionArg::R1024x768 => Resolution::R1024x768,
            ResolutionArg::R1600x1200 => Resolution::R1600x1200,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PhyArg {
    #[value(name = "1m")]
    Le1M,
    #[value(name = "2m")]
    Le2M,
}

impl From<PhyArg> for Phy {
    fn from(arg: PhyArg) -> Self {
        match arg {
            PhyArg::Le1M => Phy::Le1M,
            PhyArg::Le2M => Phy::Le2M,
        }
    }
}

fn setup_logging(log_file_path: Option<PathBuf>, verbosity: &Verbosity<InfoLevel>) -> Result<Option<WorkerGuard>> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let (file_layer, guard) = if let Some(ref path) = log_file_path {
        let log_file = File::create(path).with_context(|| format!("Failed to create log file at: {:?}", path))?;
        let (non_blocking_writer, guard) = tracing_appender::non_blocking(log_file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking_writer)
            .with_ansi(false)
            .with_target(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let filter = EnvFilter::builder()
        .with_default_directive(verbosity.tracing_level_filter().into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    if let Some(path) = log_file_path {
        info!("Logging to file: {:?}", path);
    }

    Ok(guard)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = setup_logging(cli.log_file, &cli.verbose)?;

    match cli.command {
        Action::Encode {
            command,
            resolution,
            phy,
        } => {
            let command = build_command(command, resolution, phy)?;
            println!("{}", hex::encode(command.encode()));
        }
        Action::Replay { path, json, progress } => run_replay(path, json, progress)?,
        Action::Layout => {
            let layout = ServiceLayout::default();
            println!("service        {}", layout.service);
            for channel in [SubChannel::CommandWrite, SubChannel::ImageNotify, SubChannel::InfoNotify] {
                println!("{:<14} {}", channel.to_string(), layout.uuid_for(channel));
            }
        }
    }

    Ok(())
}

fn build_command(command: CommandArg, resolution: Option<ResolutionArg>, phy: Option<PhyArg>) -> Result<Command> {
    Ok(match command {
        CommandArg::NoCommand => Command::NoCommand,
        CommandArg::StartCapture => Command::StartSingleCapture,
        CommandArg::StartStream => Command::StartStreaming,
        CommandArg::StopStream => Command::StopStreaming,
        CommandArg::BleParameters => Command::SendBleParameters,
        CommandArg::ChangeResolution => match resolution {
            Some(r) => Command::ChangeResolution(r.into()),
            None => bail!("change-resolution needs --resolution"),
        },
        CommandArg::ChangePhy => match phy {
            Some(p) => Command::ChangePhy(p.into()),
            None => bail!("change-phy needs --phy"),
        },
    })
}

fn run_replay(path: PathBuf, json: bool, progress: bool) -> Result<()> {
    let text = fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?;
    let entries = replay::parse_log(&text)?;
    info!("Replaying {} records from {:?}", entries.len(), path);

    let clock = ManualClock::new();
    let mut engine = TransferEngine::with_clock(Vec::<TransferEvent>::new(), clock.clone());
    let mut images = 0usize;

    for entry in entries {
        clock.set_elapsed(entry.at);
        match entry.record {
            Record::Start => engine.begin_stream(),
            Record::Stop => engine.stop(),
            Record::Info(message) => engine.handle_info(&message),
            Record::Image(fragment) => engine.handle_image(&fragment),
            Record::Error { channel, reason } => {
                engine.handle_error(channel, &TransportError::Read { channel, reason })
            }
        }

        let events: Vec<TransferEvent> = engine.sink_mut().drain(..).collect();
        for event in events {
            if matches!(event, TransferEvent::TransferComplete { .. }) {
                images += 1;
            }
            if matches!(event, TransferEvent::TransferProgress { .. }) && !progress {
                debug!("{:?}", event);
                continue;
            }
            if json {
                println!("{}", event_json(entry.at, &event)?);
            } else {
                println!("{}", event_text(entry.at, &event));
            }
        }
    }

    info!("Replay finished: {} images, {:?} state", images, engine.state());
    Ok(())
}

fn event_text(at: Duration, event: &TransferEvent) -> String {
    let stamp = format!("[{:>9.3}s]", at.as_secs_f64());
    match event {
        TransferEvent::LinkParametersUpdated(p) => format!(
            "{} link     MTU {}, interval {:.2} ms, tx {}, rx {}",
            stamp, p.mtu, p.connection_interval_ms, p.tx_phy, p.rx_phy
        ),
        TransferEvent::TransferProgress { fraction, rate_kbps } => {
            format!("{} progress {:5.1}% at {:.2} kbps", stamp, fraction * 100.0, rate_kbps)
        }
        TransferEvent::TransferComplete { image, fps } => format!(
            "{} image    {} bytes ({}...), {:.2} fps",
            stamp,
            image.len(),
            hex::encode(&image[..image.len().min(4)]),
            fps
        ),
        TransferEvent::TransferFailed { channel, error } => format!("{} failed   {}: {}", stamp, channel, error),
    }
}

fn event_json(at: Duration, event: &TransferEvent) -> Result<String> {
    let at_ms = at.as_millis() as u64;
    let value = match event {
        TransferEvent::LinkParametersUpdated(params) => json!({ "at_ms": at_ms, "event": "link", "params": params }),
        TransferEvent::TransferProgress { fraction, rate_kbps } => {
            json!({ "at_ms": at_ms, "event": "progress", "fraction": fraction, "rate_kbps": rate_kbps })
        }
        TransferEvent::TransferComplete { image, fps } => {
            json!({ "at_ms": at_ms, "event": "image", "bytes": image.len(), "fps": fps })
        }
        TransferEvent::TransferFailed { channel, error } => {
            json!({ "at_ms": at_ms, "event": "failed", "channel": channel, "reason": error.to_string(), "error": error })
        }
    };
    Ok(serde_json::to_string(&value)?)
}
