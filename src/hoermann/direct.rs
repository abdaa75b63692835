//! # Direct Link
//!
//! Point-to-point sync-byte link to the operator (or to a bus bridge that
//! forwards its status). Inbound status reports update the shared
//! [`DoorStateCell`]; a triggered action goes out as a fixed 5-byte command
//! frame on the next tick.
//!
//! ```text
//! status  <- [0x55][0x00][0x02][status][status2][sum]
//! command -> [0x55][0x01][0x01][action][sum]
//! ```

use std::sync::Arc;

use super::door::{Action, DoorState};
use super::frame::{Frame, FrameAssembler, FrameFormat, TxFrame};
use super::mailbox::{ActionMailbox, DoorStateCell};
use super::protocol::*;

/// Encode the command frame for `action`, `None` for the sentinel
///
/// # Examples
///
/// ```
/// use hoermann_bridge::hoermann::direct::encode_action_frame;
/// use hoermann_bridge::hoermann::door::Action;
///
/// let frame = encode_action_frame(Action::Open).unwrap();
/// assert_eq!(frame.as_bytes(), &[0x55, 0x01, 0x01, 0x01, 0x58]);
/// ```
pub fn encode_action_frame(action: Action) -> Option<TxFrame> {
    let code = action.wire_code()?;
    Some(FrameFormat::SYNC.assemble(CMD_ACTION, 0, &[code]))
}

/// Decode a status report, `None` if the frame is anything else
pub fn decode_status_report(frame: &Frame) -> Option<(u8, u8)> {
    match (frame.command(), frame.payload()) {
        (CMD_STATUS, &[status, extra]) => Some((status, extra)),
        _ => None,
    }
}

/// Direct link endpoint
#[derive(Debug)]
pub struct DirectLink {
    assembler: FrameAssembler,
    state: Arc<DoorStateCell>,
    mailbox: Arc<ActionMailbox>,
}

impl DirectLink {
    pub fn new(state: Arc<DoorStateCell>, mailbox: Arc<ActionMailbox>) -> Self {
        Self {
            assembler: FrameAssembler::new(FrameFormat::SYNC),
            state,
            mailbox,
        }
    }

    /// Byte path: feed one received byte
    pub fn on_rx(&mut self, byte: u8) {
        self.assembler.push_byte(byte);
    }

    /// Tick path: apply a ready status report, then emit any pending action
    pub fn tick(&mut self) -> Option<TxFrame> {
        if let Some(frame) = self.assembler.take_frame() {
            self.handle_frame(&frame);
        }

        encode_action_frame(self.mailbox.consume())
    }

    /// Apply one validated frame; anything but a status report is ignored
    pub fn handle_frame(&mut self, frame: &Frame) -> bool {
        match decode_status_report(frame) {
            Some((status, extra)) => {
                self.state.publish(status, extra);
                true
            }
            None => false,
        }
    }

    /// Request an action; it is sent on the next tick
    pub fn trigger(&self, action: Action) {
        self.mailbox.trigger(action);
    }

    pub fn door_state(&self) -> DoorState {
        self.state.load()
    }

    pub fn assembler(&self) -> &FrameAssembler {
        &self.assembler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hoermann::door::Cover;

    fn link() -> DirectLink {
        DirectLink::new(Arc::new(DoorStateCell::new()), Arc::new(ActionMailbox::new()))
    }

    fn feed(link: &mut DirectLink, bytes: &[u8]) {
        for &b in bytes {
            link.on_rx(b);
        }
    }

    #[test]
    fn test_encode_action_frames() {
        let expected: [(Action, [u8; 5]); 5] = [
            (Action::Stop, [0x55, 0x01, 0x01, 0x00, 0x57]),
            (Action::Open, [0x55, 0x01, 0x01, 0x01, 0x58]),
            (Action::Close, [0x55, 0x01, 0x01, 0x02, 0x59]),
            (Action::Venting, [0x55, 0x01, 0x01, 0x03, 0x5A]),
            (Action::ToggleLight, [0x55, 0x01, 0x01, 0x04, 0x5B]),
        ];

        for (action, bytes) in expected {
            assert_eq!(encode_action_frame(action).unwrap().as_bytes(), &bytes, "{}", action);
        }
        assert!(encode_action_frame(Action::None).is_none());
    }

    #[test]
    fn test_action_frames_pass_sum_check() {
        let frame = encode_action_frame(Action::Close).unwrap();
        let bytes = frame.as_bytes();
        let sum = crate::hoermann::checksum::seeded_sum(&bytes[1..bytes.len() - 1]);
        assert_eq!(sum, bytes[bytes.len() - 1]);
    }

    #[test]
    fn test_status_report_updates_state() {
        let mut link = link();
        assert!(!link.door_state().valid);

        // status 0x01 (open), status2 0x00
        feed(&mut link, &[0x55, 0x00, 0x02, 0x01, 0x00, 0x58]);
        assert!(link.tick().is_none());

        let state = link.door_state();
        assert!(state.valid);
        assert_eq!(state.cover, Cover::Open);
    }

    #[test]
    fn test_status_report_with_flags() {
        let mut link = link();
        // status 0x10 (error), status2 0x03 (prewarn)
        feed(&mut link, &[0x55, 0x00, 0x02, 0x10, 0x03, 0x6A]);
        link.tick();

        let state = link.door_state();
        assert!(state.error);
        assert!(state.prewarn);
        assert_eq!(state.cover, Cover::Stopped);
    }

    #[test]
    fn test_other_commands_ignored() {
        let mut link = link();
        feed(&mut link, &[0x55, 0x01, 0x01, 0x01, 0x58]);
        link.tick();
        assert!(!link.door_state().valid);
    }

    #[test]
    fn test_corrupted_status_ignored() {
        let mut link = link();
        feed(&mut link, &[0x55, 0x00, 0x02, 0x01, 0x00, 0x59]);
        link.tick();
        assert!(!link.door_state().valid);
        assert_eq!(link.assembler().rejected_count(), 1);
    }

    #[test]
    fn test_trigger_sends_once() {
        let mut link = link();
        link.trigger(Action::Open);

        let frame = link.tick().unwrap();
        assert_eq!(frame.as_bytes(), &[0x55, 0x01, 0x01, 0x01, 0x58]);
        assert!(link.tick().is_none());
    }

    #[test]
    fn test_latest_trigger_wins() {
        let mut link = link();
        link.trigger(Action::Open);
        link.trigger(Action::Stop);

        assert_eq!(link.tick().unwrap().as_bytes()[3], 0x00);
        assert!(link.tick().is_none());
    }
}
