//! # Gateway Link
//!
//! Sync-byte link between the bus bridge and the network-facing controller.
//! Inbound action triggers go straight into the slave's response word;
//! outbound, the last bus broadcast is reported on a fixed tick interval in
//! the same shape the direct link decodes as a status report.
//!
//! ```text
//! action <- [0x55][0x01][0x01][action][sum]
//! status -> [0x55][0x00][0x02][status-lo][status-hi][sum]
//! ```

use std::sync::Arc;

use super::door::Action;
use super::frame::{Frame, FrameAssembler, FrameFormat, TxFrame};
use super::mailbox::{ResponseSlot, StatusWord};
use super::protocol::*;

/// Encode a status report carrying the bus broadcast word
pub fn encode_status_frame(status: u16) -> TxFrame {
    FrameFormat::SYNC.assemble(CMD_STATUS, 0, &status.to_le_bytes())
}

/// Decode an action trigger, `None` for any other frame or unknown code
pub fn decode_action_frame(frame: &Frame) -> Option<Action> {
    match (frame.command(), frame.payload()) {
        (CMD_ACTION, &[code]) => Action::from_wire(code),
        _ => None,
    }
}

/// Gateway link endpoint on the bus bridge
#[derive(Debug)]
pub struct GatewayLink {
    assembler: FrameAssembler,
    response: Arc<ResponseSlot>,
    broadcast: Arc<StatusWord>,
    interval: u32,
    elapsed: u32,
}

impl GatewayLink {
    pub fn new(response: Arc<ResponseSlot>, broadcast: Arc<StatusWord>, interval: u32) -> Self {
        Self {
            assembler: FrameAssembler::new(FrameFormat::SYNC),
            response,
            broadcast,
            interval: interval.max(1),
            elapsed: 0,
        }
    }

    /// Byte path: feed one received byte
    pub fn on_rx(&mut self, byte: u8) {
        self.assembler.push_byte(byte);
    }

    /// Tick path: apply a ready trigger, and emit the status report when the
    /// interval elapses
    pub fn tick(&mut self) -> Option<TxFrame> {
        if let Some(frame) = self.assembler.take_frame() {
            self.handle_frame(&frame);
        }

        self.elapsed += 1;
        if self.elapsed < self.interval {
            return None;
        }
        self.elapsed = 0;
        Some(encode_status_frame(self.broadcast.load()))
    }

    /// Apply one validated frame; returns the triggered action
    pub fn handle_frame(&mut self, frame: &Frame) -> Option<Action> {
        let action = decode_action_frame(frame)?;
        self.response.trigger(action);
        Some(action)
    }

    pub fn assembler(&self) -> &FrameAssembler {
        &self.assembler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hoermann::direct::{decode_status_report, encode_action_frame};
    use crate::hoermann::door::ResponseWord;

    fn gateway(interval: u32) -> (GatewayLink, Arc<ResponseSlot>, Arc<StatusWord>) {
        let response = Arc::new(ResponseSlot::new());
        let broadcast = Arc::new(StatusWord::new());
        let link = GatewayLink::new(Arc::clone(&response), Arc::clone(&broadcast), interval);
        (link, response, broadcast)
    }

    fn feed(link: &mut GatewayLink, bytes: &[u8]) {
        for &b in bytes {
            link.on_rx(b);
        }
    }

    #[test]
    fn test_encode_status_frame() {
        assert_eq!(encode_status_frame(0x1234).as_bytes(), &[0x55, 0x00, 0x02, 0x34, 0x12, 0x9D]);
        assert_eq!(encode_status_frame(0x0000).as_bytes(), &[0x55, 0x00, 0x02, 0x00, 0x00, 0x57]);
    }

    #[test]
    fn test_status_frame_is_a_direct_link_status_report() {
        let tx = encode_status_frame(0x0310);
        let frame = FrameFormat::SYNC.decode(tx.as_bytes()).unwrap();
        assert_eq!(decode_status_report(&frame), Some((0x10, 0x03)));
    }

    #[test]
    fn test_action_frame_triggers_response_word() {
        let (mut link, response, _) = gateway(5000);
        feed(&mut link, &[0x55, 0x01, 0x01, 0x01, 0x58]);
        assert!(link.tick().is_none());
        assert_eq!(response.peek(), ResponseWord::OPEN);
    }

    #[test]
    fn test_direct_link_commands_drive_gateway() {
        let (mut link, response, _) = gateway(5000);
        let tx = encode_action_frame(Action::ToggleLight).unwrap();
        feed(&mut link, tx.as_bytes());
        link.tick();
        assert_eq!(response.peek(), ResponseWord::TOGGLE_LIGHT);
    }

    #[test]
    fn test_unknown_action_code_ignored() {
        let (mut link, response, _) = gateway(5000);
        let tx = FrameFormat::SYNC.encode(CMD_ACTION, 0, &[0x07]).unwrap();
        feed(&mut link, tx.as_bytes());
        link.tick();
        assert_eq!(response.peek(), ResponseWord::IDLE);
    }

    #[test]
    fn test_other_commands_ignored() {
        let (mut link, response, _) = gateway(5000);
        feed(&mut link, &[0x55, 0x00, 0x02, 0x34, 0x12, 0x9D]);
        link.tick();
        assert_eq!(response.peek(), ResponseWord::IDLE);
    }

    #[test]
    fn test_status_emitted_on_interval() {
        let (mut link, _, broadcast) = gateway(5000);
        broadcast.publish(0x1234);

        for _ in 0..4999 {
            assert!(link.tick().is_none());
        }
        let frame = link.tick().unwrap();
        assert_eq!(frame.as_bytes(), &[0x55, 0x00, 0x02, 0x34, 0x12, 0x9D]);

        for _ in 0..4999 {
            assert!(link.tick().is_none());
        }
        assert!(link.tick().is_some());
    }

    #[test]
    fn test_status_reports_latest_broadcast() {
        let (mut link, _, broadcast) = gateway(2);
        broadcast.publish(0x0001);
        link.tick();
        broadcast.publish(0x0002);
        let frame = link.tick().unwrap();
        assert_eq!(&frame.as_bytes()[3..5], &[0x02, 0x00]);
    }
}
