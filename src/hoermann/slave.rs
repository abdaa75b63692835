//! # UAP1 Slave Emulator
//!
//! Impersonates a single UAP1 expansion module on the operator's RS-485 bus.
//! The bus master scans for slaves, broadcasts its status word and polls
//! each slave for a status response; an action is delivered by putting its
//! response word into the next status response.
//!
//! ```text
//! scan      <- [0x28][n|1][0x01]            (or [0x28][n|2][0x01][0x80])
//!           -> [0x80][(n+1)|2][0x14][0x28][crc]
//! request   <- [0x28][n|1][0x20][crc]
//!           -> [0x80][(n+1)|3][0x29][word-lo][word-hi][crc]
//! broadcast <- [0x00][n|2][status-lo][status-hi][crc]
//! ```

use std::sync::Arc;

use super::door::{Action, ResponseWord};
use super::frame::{Frame, FrameAssembler, FrameFormat, RxEvent, TxFrame};
use super::mailbox::{ResponseSlot, StatusWord};
use super::protocol::*;

/// Bus request addressed to the emulated slave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusRequest {
    /// Status word broadcast to every device
    Broadcast(u16),
    /// Master discovering slaves
    Scan,
    /// Master polling our status
    StatusRequest,
    /// Anything else, ignored
    Unrecognized,
}

impl BusRequest {
    /// Classify a validated bus frame
    pub fn classify(frame: &Frame) -> Self {
        match (frame.address(), frame.payload()) {
            (BROADCAST_ADDR, &[low, high]) => BusRequest::Broadcast(u16::from_le_bytes([low, high])),
            (UAP1_ADDR, &[CMD_SLAVE_SCAN]) | (UAP1_ADDR, &[CMD_SLAVE_SCAN, _]) => BusRequest::Scan,
            (UAP1_ADDR, &[CMD_SLAVE_STATUS_REQUEST]) => BusRequest::StatusRequest,
            _ => BusRequest::Unrecognized,
        }
    }
}

/// Counter nibble of our answer to a request carrying `counter`
pub fn next_counter(counter: u8) -> u8 {
    counter.wrapping_add(1) & 0x0F
}

/// Answer to a bus scan
pub fn encode_scan_response(request_counter: u8) -> TxFrame {
    FrameFormat::BUS.assemble(MASTER_ADDR, next_counter(request_counter), &[UAP1_TYPE, UAP1_ADDR])
}

/// Answer to a status request carrying `word`
pub fn encode_status_response(request_counter: u8, word: ResponseWord) -> TxFrame {
    let [low, high] = word.to_le_bytes();
    FrameFormat::BUS.assemble(
        MASTER_ADDR,
        next_counter(request_counter),
        &[CMD_SLAVE_STATUS_RESPONSE, low, high],
    )
}

fn is_status_response(frame: &TxFrame) -> bool {
    matches!(frame.as_bytes(), [MASTER_ADDR, _, CMD_SLAVE_STATUS_RESPONSE, ..])
}

/// Emulated UAP1 slave
#[derive(Debug)]
pub struct SlaveEmulator {
    assembler: FrameAssembler,
    response: Arc<ResponseSlot>,
    broadcast: Arc<StatusWord>,
    /// Word already taken for a status response that has not reached the wire
    undelivered: Option<ResponseWord>,
}

impl SlaveEmulator {
    pub fn new(response: Arc<ResponseSlot>, broadcast: Arc<StatusWord>) -> Self {
        Self {
            assembler: FrameAssembler::new(FrameFormat::BUS),
            response,
            broadcast,
            undelivered: None,
        }
    }

    /// Byte path: feed one receive event
    pub fn on_rx(&mut self, event: RxEvent) {
        self.assembler.push(event);
    }

    /// Tick path: handle a ready frame and return the response to queue
    pub fn poll(&mut self) -> Option<TxFrame> {
        let frame = self.assembler.take_frame()?;
        self.handle_frame(&frame)
    }

    /// Handle one validated bus frame
    pub fn handle_frame(&mut self, frame: &Frame) -> Option<TxFrame> {
        match BusRequest::classify(frame) {
            BusRequest::Broadcast(word) => {
                self.broadcast.publish(word);
                None
            }
            BusRequest::Scan => Some(encode_scan_response(frame.counter())),
            BusRequest::StatusRequest => {
                let word = match self.undelivered {
                    Some(word) => word,
                    None => self.response.take(),
                };
                self.undelivered = Some(word);
                Some(encode_status_response(frame.counter(), word))
            }
            BusRequest::Unrecognized => None,
        }
    }

    /// `frame` has started shifting onto the wire
    ///
    /// Only a status response delivers the held word; a scan response that
    /// replaced it leaves the word for the next status request.
    pub fn response_sent(&mut self, frame: &TxFrame) {
        if is_status_response(frame) {
            self.undelivered = None;
        }
    }

    /// Record an action for the next status response; never transmits
    pub fn trigger(&self, action: Action) {
        self.response.trigger(action);
    }

    /// Last status word seen in a bus broadcast
    pub fn broadcast_status(&self) -> u16 {
        self.broadcast.load()
    }

    pub fn assembler(&self) -> &FrameAssembler {
        &self.assembler
    }
}
