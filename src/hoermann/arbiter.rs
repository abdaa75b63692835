//! # Bus Arbiter
//!
//! Half-duplex turnaround for the RS-485 bus. A queued response waits a
//! fixed number of ticks (the master only accepts answers after a minimum
//! latency), then the receiver is silenced, the driver enabled, a line break
//! issued and the frame shifted out. Once the transmitter is idle the driver
//! is released and the receiver re-enabled.
//!
//! ```text
//! Listening --queue--> PendingDelay(n) --n ticks--> Transmitting --idle--> Listening
//! ```

use super::frame::TxFrame;

/// Line control the arbiter needs from the RS-485 transceiver
#[cfg_attr(test, mockall::automock)]
pub trait BusTransceiver {
    /// Enable or disable the receiver (RE)
    fn set_receiver_enabled(&mut self, enabled: bool);

    /// Enable or disable the line driver (DE)
    fn set_driver_enabled(&mut self, enabled: bool);

    /// Issue the line break that opens every bus frame
    fn send_break(&mut self);

    /// Start shifting out `frame`
    fn write_frame(&mut self, frame: &[u8]);

    /// True once the last written frame has fully left the shift register
    fn is_tx_idle(&self) -> bool;
}

/// Arbiter state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterState {
    Listening,
    /// Ticks left before the pending response may go out
    PendingDelay(u16),
    Transmitting,
}

/// Half-duplex turnaround scheduler
#[derive(Debug)]
pub struct BusArbiter {
    state: ArbiterState,
    pending: Option<TxFrame>,
    response_delay: u16,
}

impl BusArbiter {
    pub fn new(response_delay: u16) -> Self {
        Self {
            state: ArbiterState::Listening,
            pending: None,
            response_delay,
        }
    }

    pub fn state(&self) -> ArbiterState {
        self.state
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// False while our own frame is on the wire
    pub fn receiver_enabled(&self) -> bool {
        self.state != ArbiterState::Transmitting
    }

    /// Queue a response, replacing any response that has not started yet
    ///
    /// While transmitting, the response waits for the next turnaround.
    pub fn queue(&mut self, frame: TxFrame) {
        self.pending = Some(frame);
        if self.state != ArbiterState::Transmitting {
            self.state = ArbiterState::PendingDelay(self.response_delay);
        }
    }

    /// Advance one tick; returns the frame that started transmitting, if any
    pub fn tick<T: BusTransceiver>(&mut self, line: &mut T) -> Option<TxFrame> {
        match self.state {
            ArbiterState::Listening => None,
            ArbiterState::PendingDelay(remaining) => {
                let remaining = remaining.saturating_sub(1);
                if remaining > 0 {
                    self.state = ArbiterState::PendingDelay(remaining);
                    return None;
                }
                self.start_sending(line)
            }
            ArbiterState::Transmitting => {
                if line.is_tx_idle() {
                    self.stop_sending(line);
                }
                None
            }
        }
    }

    fn start_sending<T: BusTransceiver>(&mut self, line: &mut T) -> Option<TxFrame> {
        let Some(frame) = self.pending.take() else {
            self.state = ArbiterState::Listening;
            return None;
        };

        line.set_receiver_enabled(false);
        line.set_driver_enabled(true);
        line.send_break();
        line.write_frame(frame.as_bytes());
        self.state = ArbiterState::Transmitting;
        Some(frame)
    }

    fn stop_sending<T: BusTransceiver>(&mut self, line: &mut T) {
        line.set_driver_enabled(false);
        line.set_receiver_enabled(true);
        self.state = match self.pending {
            Some(_) => ArbiterState::PendingDelay(self.response_delay),
            None => ArbiterState::Listening,
        };
    }
}
