//! # Door State Model
//!
//! Semantic door state decoded from the operator's status bytes, the action
//! enumeration, and the coarse 16-bit response words the bus uses to carry
//! actions. The bitfield state and the response word are deliberately kept
//! apart: the bus never reports the rich state, and the direct link never
//! sees a response word.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::Serialize;

use crate::error::BridgeError;

bitflags! {
    /// Bits of the primary status byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusBits: u8 {
        const OPEN = 0x01;
        const CLOSED = 0x02;
        const OPTION_RELAY = 0x04;
        const LIGHT = 0x08;
        const ERROR = 0x10;
        /// Travel direction while moving (set = closing)
        const DIRECTION = 0x20;
        const MOVING = 0x40;
        const VENTING = 0x80;
    }
}

bitflags! {
    /// Bits of the secondary status byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExtraBits: u8 {
        const PREWARN = 0x01;
    }
}

/// Cover position/motion
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cover {
    #[default]
    Stopped,
    Open,
    Closed,
    Opening,
    Closing,
}

impl Cover {
    /// Decode the cover from a status byte; first match wins
    pub fn from_status(bits: StatusBits) -> Self {
        let motion = bits & (StatusBits::MOVING | StatusBits::DIRECTION);

        if bits.contains(StatusBits::OPEN) {
            Cover::Open
        } else if bits.contains(StatusBits::CLOSED) {
            Cover::Closed
        } else if motion == StatusBits::MOVING {
            Cover::Opening
        } else if motion == StatusBits::MOVING | StatusBits::DIRECTION {
            Cover::Closing
        } else {
            Cover::Stopped
        }
    }
}

/// Complete door state as reported over the direct link
///
/// # Examples
///
/// ```
/// use hoermann_bridge::hoermann::door::{Cover, DoorState};
///
/// let state = DoorState::decode(0x09, 0x00);
/// assert_eq!(state.cover, Cover::Open);
/// assert!(state.light);
/// assert!(state.valid);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DoorState {
    pub cover: Cover,
    pub venting: bool,
    pub error: bool,
    pub prewarn: bool,
    pub light: bool,
    pub option_relay: bool,
    /// Set only once a status report has been decoded
    pub valid: bool,
}

impl DoorState {
    /// Decode the primary and secondary status bytes of one status report
    pub fn decode(status: u8, extra: u8) -> Self {
        let bits = StatusBits::from_bits_retain(status);
        let extra = ExtraBits::from_bits_retain(extra);

        Self {
            cover: Cover::from_status(bits),
            venting: bits.contains(StatusBits::VENTING),
            error: bits.contains(StatusBits::ERROR),
            prewarn: extra.contains(ExtraBits::PREWARN),
            light: bits.contains(StatusBits::LIGHT),
            option_relay: bits.contains(StatusBits::OPTION_RELAY),
            valid: true,
        }
    }
}

/// Action requested of the operator
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Stop = 0,
    Open = 1,
    Close = 2,
    Venting = 3,
    ToggleLight = 4,
    /// Nothing pending
    #[default]
    None = 5,
}

impl Action {
    /// Wire code on the direct and gateway links, `None` for the sentinel
    pub fn wire_code(self) -> Option<u8> {
        match self {
            Action::None => None,
            action => Some(action as u8),
        }
    }

    /// Map an inbound wire code; unknown codes yield `None`
    pub fn from_wire(code: u8) -> Option<Self> {
        match code {
            0 => Some(Action::Stop),
            1 => Some(Action::Open),
            2 => Some(Action::Close),
            3 => Some(Action::Venting),
            4 => Some(Action::ToggleLight),
            _ => None,
        }
    }

    pub(crate) fn from_slot(raw: u8) -> Self {
        Self::from_wire(raw).unwrap_or(Action::None)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Stop => "stop",
            Action::Open => "open",
            Action::Close => "close",
            Action::Venting => "venting",
            Action::ToggleLight => "toggle_light",
            Action::None => "none",
        };
        f.write_str(name)
    }
}

impl FromStr for Action {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stop" => Ok(Action::Stop),
            "open" => Ok(Action::Open),
            "close" => Ok(Action::Close),
            "venting" | "vent" => Ok(Action::Venting),
            "toggle_light" | "light" => Ok(Action::ToggleLight),
            other => Err(BridgeError::UnknownAction(other.to_string())),
        }
    }
}

/// 16-bit word a slave returns to a bus status request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResponseWord(pub u16);

impl ResponseWord {
    /// Nothing requested
    pub const IDLE: ResponseWord = ResponseWord(0x1000);
    pub const STOP: ResponseWord = ResponseWord(0x0000);
    pub const OPEN: ResponseWord = ResponseWord(0x1001);
    pub const CLOSE: ResponseWord = ResponseWord(0x1002);
    pub const VENTING: ResponseWord = ResponseWord(0x1010);
    pub const TOGGLE_LIGHT: ResponseWord = ResponseWord(0x1008);

    /// Response word carrying `action`; the sentinel maps to nothing
    pub fn for_action(action: Action) -> Option<Self> {
        match action {
            Action::Stop => Some(Self::STOP),
            Action::Open => Some(Self::OPEN),
            Action::Close => Some(Self::CLOSE),
            Action::Venting => Some(Self::VENTING),
            Action::ToggleLight => Some(Self::TOGGLE_LIGHT),
            Action::None => None,
        }
    }

    pub fn to_le_bytes(self) -> [u8; 2] {
        self.0.to_le_bytes()
    }
}

impl Default for ResponseWord {
    fn default() -> Self {
        Self::IDLE
    }
}
