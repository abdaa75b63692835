//! # Runtime
//!
//! Async host loops driving a bridge from real serial ports.
//!
//! Each loop multiplexes the tick interval, received port bytes, action
//! commands (one per line) and a shutdown signal. Bridge state only changes
//! on this task; line operations and writes are awaited between ticks.

use std::future::Future;
use std::io;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::bridge::{BusBridge, DirectBridge};
use crate::config::{Config, Mode};
use crate::error::{BridgeError, Result};
use crate::hoermann::door::Action;
use crate::serial::port_trait::SerialPortIO;
use crate::serial::{execute_line_ops, write_frame, BreakDetector, BridgeSerial, LineOpQueue};
use crate::telemetry::{ChangeReporter, Observation, StateReport};

/// Bytes fetched per port read
const READ_BUFFER_SIZE: usize = 64;

/// Timing of the bus loop
#[derive(Debug, Clone, Copy)]
pub struct BusTiming {
    pub tick: Duration,
    pub break_gap: Duration,
    pub break_duration: Duration,
}

impl BusTiming {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tick: Duration::from_millis(config.timing.tick_ms),
            break_gap: Duration::from_millis(config.bus.break_gap_ms),
            break_duration: Duration::from_micros(config.bus.break_duration_us),
        }
    }
}

/// Open the configured ports and run until Ctrl+C
///
/// Commands are read from stdin, state reports written to stdout.
///
/// # Errors
///
/// Returns error if a port cannot be opened or fails while running
pub async fn run(config: &Config) -> Result<()> {
    let commands = BufReader::new(tokio::io::stdin());
    let mut reports = tokio::io::stdout();

    match config.mode {
        Mode::Bus => {
            let mut bus = BridgeSerial::open(&config.bus.port, config.bus.baud_rate)?;
            let mut gateway = if config.gateway.enabled {
                Some(BridgeSerial::open(&config.gateway.port, config.gateway.baud_rate)?)
            } else {
                info!("Gateway link disabled");
                None
            };

            let interval = config.gateway.enabled.then_some(config.gateway.status_interval_ticks);
            let mut bridge = BusBridge::new(config.bus.response_delay_ticks, interval);

            info!("Emulating UAP1 on {}", bus.device_path());
            serve_bus(
                &mut bridge,
                bus.port_mut(),
                gateway.as_mut().map(BridgeSerial::port_mut),
                commands,
                &mut reports,
                BusTiming::from_config(config),
                ctrl_c(),
            )
            .await
        }
        Mode::Direct => {
            let mut port = BridgeSerial::open(&config.direct.port, config.direct.baud_rate)?;
            let mut bridge = DirectBridge::new();

            info!("Direct link on {}", port.device_path());
            serve_direct(
                &mut bridge,
                port.port_mut(),
                commands,
                &mut reports,
                Duration::from_millis(config.timing.tick_ms),
                ctrl_c(),
            )
            .await
        }
    }
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down..."),
        Err(e) => {
            warn!("Cannot listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await
        }
    }
}

/// Run the bus loop until `shutdown` resolves
pub async fn serve_bus<B, G, C, W, S>(
    bridge: &mut BusBridge,
    bus: &mut B,
    mut gateway: Option<&mut G>,
    commands: C,
    reports: &mut W,
    timing: BusTiming,
    shutdown: S,
) -> Result<()>
where
    B: SerialPortIO + ?Sized,
    G: SerialPortIO + ?Sized,
    C: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Future<Output = ()>,
{
    let mut ticker = interval(timing.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut line = LineOpQueue::new();
    let mut detector = BreakDetector::new(timing.break_gap);
    let mut reporter = ChangeReporter::new();
    let mut commands = commands.lines();
    let mut commands_open = true;
    let mut bus_buf = [0u8; READ_BUFFER_SIZE];
    let mut gateway_buf = [0u8; READ_BUFFER_SIZE];

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(frame) = bridge.tick(&mut line) {
                    if let Some(port) = gateway.as_deref_mut() {
                        if let Err(e) = write_frame(port, frame.as_bytes()).await {
                            warn!("Gateway status not sent: {}", e);
                        }
                    }
                }

                if !line.is_empty() {
                    if let Err(e) = execute_line_ops(bus, &mut line, timing.break_duration).await {
                        warn!("Bus turnaround failed: {}", e);
                    }
                }

                let status = bridge.broadcast_status();
                if let Some(report) = reporter.observe(Observation::Broadcast { status }) {
                    emit(reports, &report).await?;
                }
            }

            read = bus.read(&mut bus_buf) => {
                let n = received("bus", read)?;
                for event in detector.events(Instant::now(), &bus_buf[..n]) {
                    bridge.on_bus_rx(event);
                }
            }

            read = read_optional(gateway.as_deref_mut(), &mut gateway_buf) => {
                let n = received("gateway", read)?;
                for &byte in &gateway_buf[..n] {
                    bridge.on_gateway_rx(byte);
                }
            }

            next = commands.next_line(), if commands_open => {
                match next_command(next) {
                    Some(Some(action)) => bridge.trigger(action),
                    Some(None) => {}
                    None => commands_open = false,
                }
            }

            _ = &mut shutdown => break,
        }
    }

    bridge.log_stats();
    Ok(())
}

/// Run the direct-link loop until `shutdown` resolves
pub async fn serve_direct<P, C, W, S>(
    bridge: &mut DirectBridge,
    port: &mut P,
    commands: C,
    reports: &mut W,
    tick: Duration,
    shutdown: S,
) -> Result<()>
where
    P: SerialPortIO + ?Sized,
    C: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Future<Output = ()>,
{
    let mut ticker = interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut reporter = ChangeReporter::new();
    let mut commands = commands.lines();
    let mut commands_open = true;
    let mut buf = [0u8; READ_BUFFER_SIZE];

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(frame) = bridge.tick() {
                    if let Err(e) = write_frame(port, frame.as_bytes()).await {
                        warn!("Command not sent: {}", e);
                    }
                }

                let state = bridge.door_state();
                if state.valid {
                    if let Some(report) = reporter.observe(Observation::Door(state)) {
                        emit(reports, &report).await?;
                    }
                }
            }

            read = port.read(&mut buf) => {
                let n = received("direct", read)?;
                for &byte in &buf[..n] {
                    bridge.on_rx(byte);
                }
            }

            next = commands.next_line(), if commands_open => {
                match next_command(next) {
                    Some(Some(action)) => bridge.trigger(action),
                    Some(None) => {}
                    None => commands_open = false,
                }
            }

            _ = &mut shutdown => break,
        }
    }

    bridge.log_stats();
    Ok(())
}

/// Parse one command line; `None` for blank or unknown commands
pub fn parse_command(line: &str) -> Option<Action> {
    if line.trim().is_empty() {
        return None;
    }
    match line.parse::<Action>() {
        Ok(action) => {
            info!("Action requested: {}", action);
            Some(action)
        }
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}

/// Outer `None` once the command stream has ended
fn next_command(next: io::Result<Option<String>>) -> Option<Option<Action>> {
    match next {
        Ok(Some(line)) => Some(parse_command(&line)),
        Ok(None) => {
            debug!("Command input closed");
            None
        }
        Err(e) => {
            warn!("Command input failed: {}", e);
            None
        }
    }
}

fn received(link: &str, read: io::Result<usize>) -> Result<usize> {
    match read {
        Ok(0) => Err(BridgeError::Serial(format!("{} port closed", link))),
        Ok(n) => Ok(n),
        Err(e) => Err(BridgeError::Serial(format!("Failed to read {} port: {}", link, e))),
    }
}

async fn read_optional<P: SerialPortIO + ?Sized>(port: Option<&mut P>, buf: &mut [u8]) -> io::Result<usize> {
    match port {
        Some(port) => port.read(buf).await,
        None => std::future::pending().await,
    }
}

async fn emit<W: AsyncWrite + Unpin>(out: &mut W, report: &StateReport) -> Result<()> {
    let mut line = report.to_json_line()?;
    line.push('\n');
    out.write_all(line.as_bytes()).await?;
    out.flush().await?;
    Ok(())
}
