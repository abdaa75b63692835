//! # Shared Cells
//!
//! Values handed between the byte path, the tick path and outside
//! collaborators. Each cell has one writer and one reader/clearer, and every
//! multi-byte value is published with a single atomic store, so a reader
//! never observes a half-written value and no lock is needed.

use std::sync::atomic::{AtomicU16, AtomicU32, AtomicU8, Ordering};

use super::door::{Action, DoorState, ResponseWord};

/// Single-slot action mailbox
///
/// A new trigger overwrites any unconsumed action; consuming empties the slot.
///
/// # Examples
///
/// ```
/// use hoermann_bridge::hoermann::door::Action;
/// use hoermann_bridge::hoermann::mailbox::ActionMailbox;
///
/// let mailbox = ActionMailbox::new();
/// mailbox.trigger(Action::Open);
/// assert_eq!(mailbox.consume(), Action::Open);
/// assert_eq!(mailbox.consume(), Action::None);
/// ```
#[derive(Debug)]
pub struct ActionMailbox {
    slot: AtomicU8,
}

impl ActionMailbox {
    pub fn new() -> Self {
        Self { slot: AtomicU8::new(Action::None as u8) }
    }

    pub fn trigger(&self, action: Action) {
        self.slot.store(action as u8, Ordering::Release);
    }

    /// Take the pending action, leaving [`Action::None`] behind
    pub fn consume(&self) -> Action {
        Action::from_slot(self.slot.swap(Action::None as u8, Ordering::AcqRel))
    }

    pub fn peek(&self) -> Action {
        Action::from_slot(self.slot.load(Ordering::Acquire))
    }
}

impl Default for ActionMailbox {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot response word of the emulated slave
///
/// Reading it for a status response resets it to [`ResponseWord::IDLE`].
#[derive(Debug)]
pub struct ResponseSlot {
    word: AtomicU16,
}

impl ResponseSlot {
    pub fn new() -> Self {
        Self { word: AtomicU16::new(ResponseWord::IDLE.0) }
    }

    /// Record `action` for delivery on the next status request
    ///
    /// [`Action::None`] leaves the slot untouched.
    pub fn trigger(&self, action: Action) {
        if let Some(word) = ResponseWord::for_action(action) {
            self.word.store(word.0, Ordering::Release);
        }
    }

    /// Take the word for a response, leaving the idle word behind
    pub fn take(&self) -> ResponseWord {
        ResponseWord(self.word.swap(ResponseWord::IDLE.0, Ordering::AcqRel))
    }

    pub fn peek(&self) -> ResponseWord {
        ResponseWord(self.word.load(Ordering::Acquire))
    }
}

impl Default for ResponseSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Last status word broadcast on the bus, stored verbatim
#[derive(Debug, Default)]
pub struct StatusWord {
    word: AtomicU16,
}

impl StatusWord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, word: u16) {
        self.word.store(word, Ordering::Release);
    }

    pub fn load(&self) -> u16 {
        self.word.load(Ordering::Acquire)
    }
}

/// Most recent decoded door state
///
/// The raw status bytes and the valid flag are packed into one word and
/// stored together; [`DoorStateCell::load`] decodes on the reader's side.
#[derive(Debug, Default)]
pub struct DoorStateCell {
    raw: AtomicU32,
}

const VALID_FLAG: u32 = 1 << 16;

impl DoorStateCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the status bytes of one decoded report
    pub fn publish(&self, status: u8, extra: u8) {
        let raw = VALID_FLAG | (u32::from(extra) << 8) | u32::from(status);
        self.raw.store(raw, Ordering::Release);
    }

    /// Current door state; invalid until the first report
    pub fn load(&self) -> DoorState {
        let raw = self.raw.load(Ordering::Acquire);
        if raw & VALID_FLAG == 0 {
            return DoorState::default();
        }
        DoorState::decode(raw as u8, (raw >> 8) as u8)
    }
}
