//! # Serial Communication Module
//!
//! Host-side serial plumbing for the bus and the point-to-point links.
//!
//! This module handles:
//! - Opening 8N1 ports at the configured baud rate
//! - Inferring line breaks from receive gaps
//! - Recording the arbiter's line operations during a tick
//! - Replaying them against the port (RTS as driver enable, break, write)

pub mod port_trait;

use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, trace, warn};

use crate::error::{BridgeError, Result};
use crate::hoermann::arbiter::BusTransceiver;
use crate::hoermann::frame::RxEvent;
use port_trait::{SerialPortIO, TokioSerialPort};

/// Serial port handle for one link
pub struct BridgeSerial {
    port: TokioSerialPort,
    /// Device path (e.g., /dev/ttyUSB0)
    device_path: String,
}

impl std::fmt::Debug for BridgeSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeSerial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl BridgeSerial {
    /// Open a serial port at `baud_rate`
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::SerialPortNotFound`] if the port cannot be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use hoermann_bridge::serial::BridgeSerial;
    ///
    /// let serial = BridgeSerial::open("/dev/ttyUSB0", 19200)?;
    /// println!("Bus on {}", serial.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        Self::open_with_paths(&[path], baud_rate)
    }

    /// Open the first of `paths` that works
    pub fn open_with_paths(paths: &[&str], baud_rate: u32) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_port(path, baud_rate) {
                Ok(port) => {
                    info!("Opened {} at {} baud", path, baud_rate);
                    return Ok(Self {
                        port: TokioSerialPort::new(port),
                        device_path: path.to_string(),
                    });
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(BridgeError::SerialPortNotFound(paths.join(", ")))
    }

    fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| BridgeError::Serial(format!("Failed to open {}: {}", path, e)))?;

        Ok(port)
    }

    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    pub fn port_mut(&mut self) -> &mut TokioSerialPort {
        &mut self.port
    }
}

/// Write one frame and flush it
pub async fn write_frame<P: SerialPortIO + ?Sized>(port: &mut P, frame: &[u8]) -> Result<()> {
    port.write_all(frame)
        .await
        .map_err(|e| BridgeError::Serial(format!("Failed to write frame: {}", e)))?;

    port.flush()
        .await
        .map_err(|e| BridgeError::Serial(format!("Failed to flush serial port: {}", e)))?;

    trace!("Sent frame ({} bytes)", frame.len());
    Ok(())
}

/// Infers line breaks from silence between received chunks
///
/// A host UART does not report the break that opens every bus frame, but the
/// master always idles the line before one. A chunk that follows at least
/// `gap` of silence, or the very first chunk, is preceded by a break.
#[derive(Debug, Clone)]
pub struct BreakDetector {
    gap: Duration,
    last_rx: Option<Instant>,
}

impl BreakDetector {
    pub fn new(gap: Duration) -> Self {
        Self { gap, last_rx: None }
    }

    /// Record a chunk arriving at `now`; true if a break precedes it
    pub fn mark(&mut self, now: Instant) -> bool {
        let brk = match self.last_rx {
            Some(last) => now.saturating_duration_since(last) >= self.gap,
            None => true,
        };
        self.last_rx = Some(now);
        brk
    }

    /// Receive events for a chunk arriving at `now`
    pub fn events<'a>(&mut self, now: Instant, chunk: &'a [u8]) -> impl Iterator<Item = RxEvent> + 'a {
        let brk = self.mark(now).then_some(RxEvent::Break);
        brk.into_iter().chain(chunk.iter().map(|&b| RxEvent::Byte(b)))
    }
}

/// Line operation requested by the arbiter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOp {
    ReceiverEnable(bool),
    DriverEnable(bool),
    Break,
    Write(Bytes),
}

/// [`BusTransceiver`] that records operations for asynchronous replay
///
/// The arbiter runs inside the synchronous tick; its requests are collected
/// here and executed against the port by [`execute_line_ops`]. The
/// transmitter counts as busy from the write request until replay finishes.
#[derive(Debug)]
pub struct LineOpQueue {
    ops: Vec<LineOp>,
    tx_idle: bool,
    receiver_enabled: bool,
}

impl LineOpQueue {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            tx_idle: true,
            receiver_enabled: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn take_ops(&mut self) -> Vec<LineOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn mark_tx_idle(&mut self) {
        self.tx_idle = true;
    }

    pub fn receiver_enabled(&self) -> bool {
        self.receiver_enabled
    }
}

impl Default for LineOpQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl BusTransceiver for LineOpQueue {
    fn set_receiver_enabled(&mut self, enabled: bool) {
        self.receiver_enabled = enabled;
        self.ops.push(LineOp::ReceiverEnable(enabled));
    }

    fn set_driver_enabled(&mut self, enabled: bool) {
        self.ops.push(LineOp::DriverEnable(enabled));
    }

    fn send_break(&mut self) {
        self.ops.push(LineOp::Break);
    }

    fn write_frame(&mut self, frame: &[u8]) {
        self.tx_idle = false;
        self.ops.push(LineOp::Write(Bytes::copy_from_slice(frame)));
    }

    fn is_tx_idle(&self) -> bool {
        self.tx_idle
    }
}

/// Replay the queued line operations against `port`
///
/// The receiver flag needs no port access: received bytes are gated in
/// software. Once a write has been flushed the transmitter is marked idle.
///
/// # Errors
///
/// Returns [`BridgeError::Serial`] if a control line or write fails; the
/// transmitter is still marked idle so the arbiter can release the bus.
pub async fn execute_line_ops<P: SerialPortIO + ?Sized>(
    port: &mut P,
    queue: &mut LineOpQueue,
    break_duration: Duration,
) -> Result<()> {
    let result = replay(port, queue.take_ops(), break_duration).await;
    queue.mark_tx_idle();
    result
}

async fn replay<P: SerialPortIO + ?Sized>(port: &mut P, ops: Vec<LineOp>, break_duration: Duration) -> Result<()> {
    for op in ops {
        match op {
            LineOp::ReceiverEnable(_) => {}
            LineOp::DriverEnable(on) => port
                .set_driver_enable(on)
                .map_err(|e| BridgeError::Serial(format!("Failed to set driver enable: {}", e)))?,
            LineOp::Break => {
                port.set_break(true)
                    .map_err(|e| BridgeError::Serial(format!("Failed to set break: {}", e)))?;
                tokio::time::sleep(break_duration).await;
                port.set_break(false)
                    .map_err(|e| BridgeError::Serial(format!("Failed to clear break: {}", e)))?;
            }
            LineOp::Write(bytes) => write_frame(port, &bytes).await?,
        }
    }
    Ok(())
}
