//! # Frames and Frame Assembly
//!
//! One [`FrameAssembler`] runs per serial channel. It is fed one receive
//! event at a time from the byte path and raises a "frame ready" condition
//! that the tick path drains with [`FrameAssembler::take_frame`].
//!
//! The assembler is parameterised by a [`FrameFormat`]:
//!
//! | Link    | Resync         | Length field       | Integrity          |
//! |---------|----------------|--------------------|--------------------|
//! | Direct  | sync byte 0x55 | whole byte (< 16)  | sum seeded by 0x55 |
//! | Gateway | sync byte 0x55 | whole byte (< 16)  | sum seeded by 0x55 |
//! | Bus     | line break     | low nibble         | self-checking CRC8 |
//!
//! Buffered layout is always `[head][control][payload…][check]`. The sync
//! byte is never stored; the seeded sum accounts for it.

use super::checksum::Integrity;
use super::protocol::*;
use crate::error::{BridgeError, Result};

/// A receive event delivered by the byte path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxEvent {
    /// A data byte
    Byte(u8),
    /// A framing error / line break on the wire
    Break,
}

/// How the receiver finds the start of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resync {
    /// This byte value, seen while idle, opens a frame
    SyncByte(u8),
    /// A line break opens a frame, whatever was in progress
    LineBreak,
}

/// How the second buffered byte declares the payload length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthField {
    /// Whole byte; values of 16 and above abort the frame
    Byte,
    /// Low nibble; the high nibble carries the sequence counter
    LowNibble,
}

/// Frame layout of one link variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameFormat {
    pub resync: Resync,
    pub length_field: LengthField,
    pub integrity: Integrity,
}

impl FrameFormat {
    /// Sync-byte framing shared by the direct link and the gateway link
    pub const SYNC: FrameFormat = FrameFormat {
        resync: Resync::SyncByte(SYNC_BYTE),
        length_field: LengthField::Byte,
        integrity: Integrity::SeededSum(SUM_SEED),
    };

    /// Break-delimited framing of the UAP1 bus
    pub const BUS: FrameFormat = FrameFormat {
        resync: Resync::LineBreak,
        length_field: LengthField::LowNibble,
        integrity: Integrity::Crc8,
    };

    /// Payload length declared by a control byte, `None` if out of range
    fn declared_len(&self, control: u8) -> Option<usize> {
        match self.length_field {
            LengthField::Byte if (control as usize) <= MAX_PAYLOAD_LEN => Some(control as usize),
            LengthField::Byte => None,
            LengthField::LowNibble => Some((control & 0x0F) as usize),
        }
    }

    /// Build a frame ready for the wire
    ///
    /// `counter` is only meaningful for nibble-length formats and is ignored
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns error if payload exceeds [`MAX_PAYLOAD_LEN`] (15 bytes)
    pub fn encode(&self, head: u8, counter: u8, payload: &[u8]) -> Result<TxFrame> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(BridgeError::Protocol(format!(
                "Payload size {} exceeds maximum {}",
                payload.len(),
                MAX_PAYLOAD_LEN
            )));
        }
        Ok(self.assemble(head, counter, payload))
    }

    /// Build a frame whose payload is known to fit
    pub(crate) fn assemble(&self, head: u8, counter: u8, payload: &[u8]) -> TxFrame {
        let payload = &payload[..payload.len().min(MAX_PAYLOAD_LEN)];
        let control = match self.length_field {
            LengthField::Byte => payload.len() as u8,
            LengthField::LowNibble => ((counter & 0x0F) << 4) | payload.len() as u8,
        };

        let mut frame = TxFrame::empty();
        if let Resync::SyncByte(sync) = self.resync {
            frame.push(sync);
        }
        let body_start = frame.len;
        frame.push(head);
        frame.push(control);
        for &byte in payload {
            frame.push(byte);
        }
        let check = self.integrity.seal(&frame.bytes[body_start..frame.len]);
        frame.push(check);
        frame
    }

    /// Decode one complete frame as it appears on the wire
    ///
    /// Sync-byte frames must start with the sync byte; bus frames start
    /// directly with the address.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The sync byte is missing
    /// - The declared length is out of range or does not match the input
    /// - The integrity check fails
    pub fn decode(&self, bytes: &[u8]) -> Result<Frame> {
        let body = match self.resync {
            Resync::SyncByte(sync) => match bytes.split_first() {
                Some((&first, rest)) if first == sync => rest,
                Some((&first, _)) => {
                    return Err(BridgeError::Protocol(format!("Invalid sync byte: 0x{:02X}", first)))
                }
                None => return Err(BridgeError::Protocol("Frame too short".to_string())),
            },
            Resync::LineBreak => bytes,
        };

        if body.len() < HEADER_LEN + CHECK_LEN {
            return Err(BridgeError::Protocol("Frame too short".to_string()));
        }

        let payload_len = self.declared_len(body[1]).ok_or_else(|| {
            BridgeError::Protocol(format!("Declared length 0x{:02X} out of range", body[1]))
        })?;

        let expected = HEADER_LEN + payload_len + CHECK_LEN;
        if body.len() != expected {
            return Err(BridgeError::Protocol(format!(
                "Frame length mismatch: expected {} bytes, got {}",
                expected,
                body.len()
            )));
        }

        if !self.integrity.verify(body) {
            return Err(BridgeError::Protocol("Checksum mismatch".to_string()));
        }

        Ok(Frame::from_slice(body, self.length_field))
    }
}

/// A validated frame as buffered by the receiver (sync byte excluded)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; FRAME_CAPACITY],
    len: usize,
    length_field: LengthField,
}

impl Frame {
    fn from_slice(body: &[u8], length_field: LengthField) -> Self {
        let mut bytes = [0u8; FRAME_CAPACITY];
        let len = body.len().min(FRAME_CAPACITY);
        bytes[..len].copy_from_slice(&body[..len]);
        Self { bytes, len, length_field }
    }

    /// First byte: bus address or sync-link command
    pub fn head(&self) -> u8 {
        self.bytes[0]
    }

    /// Bus destination address
    pub fn address(&self) -> u8 {
        self.head()
    }

    /// Sync-link command byte
    pub fn command(&self) -> u8 {
        self.head()
    }

    /// Bus sequence counter (high nibble of the control byte)
    pub fn counter(&self) -> u8 {
        match self.length_field {
            LengthField::LowNibble => self.bytes[1] >> 4,
            LengthField::Byte => 0,
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.bytes[HEADER_LEN..self.len - CHECK_LEN]
    }

    pub fn checksum(&self) -> u8 {
        self.bytes[self.len - 1]
    }

    /// Buffered bytes, head through check byte
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// A frame ready to be shifted out, sync byte included where the link uses one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxFrame {
    bytes: [u8; TX_CAPACITY],
    len: usize,
}

impl TxFrame {
    fn empty() -> Self {
        Self { bytes: [0u8; TX_CAPACITY], len: 0 }
    }

    fn push(&mut self, byte: u8) {
        if self.len < TX_CAPACITY {
            self.bytes[self.len] = byte;
            self.len += 1;
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Receiver state of a [`FrameAssembler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    /// Waiting for a resync signal
    Idle,
    /// Collecting head and control bytes
    HeaderCollecting,
    /// Collecting payload and check byte
    PayloadCollecting,
    /// A validated frame waits for the tick path; input is dropped
    Accepted,
}

/// Byte-at-a-time resynchronizing frame parser
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    format: FrameFormat,
    state: AssemblerState,
    buf: [u8; FRAME_CAPACITY],
    count: usize,
    expected: usize,
    accepted: u32,
    rejected: u32,
}

impl FrameAssembler {
    pub fn new(format: FrameFormat) -> Self {
        Self {
            format,
            state: AssemblerState::Idle,
            buf: [0u8; FRAME_CAPACITY],
            count: 0,
            expected: 0,
            accepted: 0,
            rejected: 0,
        }
    }

    pub fn state(&self) -> AssemblerState {
        self.state
    }

    /// True while a validated frame waits to be taken
    pub fn is_ready(&self) -> bool {
        self.state == AssemblerState::Accepted
    }

    /// Frames accepted since creation
    pub fn accepted_count(&self) -> u32 {
        self.accepted
    }

    /// Frames dropped for a bad length or check byte since creation
    pub fn rejected_count(&self) -> u32 {
        self.rejected
    }

    /// Feed a single data byte; returns true if it completed a valid frame
    pub fn push_byte(&mut self, byte: u8) -> bool {
        self.push(RxEvent::Byte(byte))
    }

    /// Feed one receive event; returns true if it completed a valid frame
    pub fn push(&mut self, event: RxEvent) -> bool {
        match (self.state, event) {
            // Single-slot hand-off: nothing is buffered until the frame is taken
            (AssemblerState::Accepted, _) => false,

            (_, RxEvent::Break) => {
                if self.format.resync == Resync::LineBreak {
                    self.begin();
                }
                false
            }

            (AssemblerState::Idle, RxEvent::Byte(byte)) => {
                if self.format.resync == Resync::SyncByte(byte) {
                    self.begin();
                }
                false
            }

            (_, RxEvent::Byte(byte)) => self.collect(byte),
        }
    }

    /// Hand the ready frame to the tick path and re-arm the receiver
    pub fn take_frame(&mut self) -> Option<Frame> {
        if self.state != AssemblerState::Accepted {
            return None;
        }
        let frame = Frame::from_slice(&self.buf[..self.count], self.format.length_field);
        self.reset();
        Some(frame)
    }

    fn begin(&mut self) {
        self.state = AssemblerState::HeaderCollecting;
        self.count = 0;
        self.expected = 0;
    }

    fn reset(&mut self) {
        self.state = AssemblerState::Idle;
        self.count = 0;
        self.expected = 0;
    }

    fn collect(&mut self, byte: u8) -> bool {
        if self.count >= FRAME_CAPACITY {
            self.reset();
            return false;
        }

        self.buf[self.count] = byte;
        self.count += 1;

        if self.count == HEADER_LEN {
            match self.format.declared_len(byte) {
                Some(payload_len) => {
                    self.expected = HEADER_LEN + payload_len + CHECK_LEN;
                    self.state = AssemblerState::PayloadCollecting;
                }
                None => {
                    self.rejected = self.rejected.wrapping_add(1);
                    self.rescan();
                }
            }
            return false;
        }

        if self.state == AssemblerState::PayloadCollecting && self.count == self.expected {
            if self.format.integrity.verify(&self.buf[..self.count]) {
                self.state = AssemblerState::Accepted;
                self.accepted = self.accepted.wrapping_add(1);
                return true;
            }
            self.rejected = self.rejected.wrapping_add(1);
            return self.rescan();
        }

        if self.state == AssemblerState::PayloadCollecting {
            return self.accept_nested();
        }

        false
    }

    /// Accept a complete, valid frame that starts at a later sync byte
    /// inside the frame still being collected; the outer frame is dropped.
    fn accept_nested(&mut self) -> bool {
        let Resync::SyncByte(sync) = self.format.resync else {
            return false;
        };

        let format = self.format;
        let count = self.count;
        let found = (0..count).filter(|&s| self.buf[s] == sync).find_map(|s| {
            let candidate = &self.buf[s + 1..count];
            let payload_len = format.declared_len(*candidate.get(1)?)?;
            let complete = candidate.len() == HEADER_LEN + payload_len + CHECK_LEN;
            (complete && format.integrity.verify(candidate)).then_some(s + 1)
        });
        let Some(start) = found else {
            return false;
        };

        self.buf.copy_within(start..count, 0);
        self.count = count - start;
        self.expected = self.count;
        self.state = AssemblerState::Accepted;
        self.rejected = self.rejected.wrapping_add(1);
        self.accepted = self.accepted.wrapping_add(1);
        true
    }

    /// Drop the current frame, restarting at a later sync byte if one was
    /// already collected. Break-delimited links just go idle.
    fn rescan(&mut self) -> bool {
        let collected = self.buf;
        let count = self.count;
        self.reset();

        let Resync::SyncByte(sync) = self.format.resync else {
            return false;
        };

        let Some(start) = collected[..count].iter().position(|&b| b == sync) else {
            return false;
        };

        self.begin();
        let mut ready = false;
        for &byte in &collected[start + 1..count] {
            ready |= self.push(RxEvent::Byte(byte));
        }
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(assembler: &mut FrameAssembler, bytes: &[u8]) -> usize {
        bytes.iter().filter(|&&b| assembler.push_byte(b)).count()
    }

    fn feed_bus(assembler: &mut FrameAssembler, bytes: &[u8]) -> bool {
        assembler.push(RxEvent::Break);
        let mut ready = false;
        for &b in bytes {
            ready |= assembler.push_byte(b);
        }
        ready
    }

    #[test]
    fn test_sync_frame_accepted() {
        let mut assembler = FrameAssembler::new(FrameFormat::SYNC);
        assert_eq!(feed(&mut assembler, &[0x55, 0x01, 0x01, 0x01, 0x58]), 1);
        assert!(assembler.is_ready());

        let frame = assembler.take_frame().unwrap();
        assert_eq!(frame.command(), 0x01);
        assert_eq!(frame.payload(), &[0x01]);
        assert_eq!(frame.checksum(), 0x58);
        assert_eq!(frame.as_bytes(), &[0x01, 0x01, 0x01, 0x58]);
        assert_eq!(assembler.state(), AssemblerState::Idle);
    }

    #[test]
    fn test_sync_frame_checksum_error_dropped() {
        let mut assembler = FrameAssembler::new(FrameFormat::SYNC);
        assert_eq!(feed(&mut assembler, &[0x55, 0x01, 0x01, 0x01, 0x59]), 0);
        assert!(assembler.take_frame().is_none());
        assert_eq!(assembler.state(), AssemblerState::Idle);
        assert_eq!(assembler.rejected_count(), 1);
    }

    #[test]
    fn test_sync_length_of_16_aborts() {
        let mut assembler = FrameAssembler::new(FrameFormat::SYNC);
        feed(&mut assembler, &[0x55, 0x00, 0x10]);
        assert_eq!(assembler.state(), AssemblerState::Idle);
        assert_eq!(assembler.rejected_count(), 1);

        // A good frame right after is still found
        assert_eq!(feed(&mut assembler, &[0x55, 0x00, 0x02, 0x01, 0x00, 0x58]), 1);
    }

    #[test]
    fn test_sync_max_payload_frame() {
        let tx = FrameFormat::SYNC.encode(0x07, 0, &[0xAA; 15]).unwrap();
        assert_eq!(tx.len(), 19);

        let mut assembler = FrameAssembler::new(FrameFormat::SYNC);
        assert_eq!(feed(&mut assembler, tx.as_bytes()), 1);
        assert_eq!(assembler.take_frame().unwrap().payload(), &[0xAA; 15]);
    }

    #[test]
    fn test_sync_bytes_ignored_while_idle() {
        let mut assembler = FrameAssembler::new(FrameFormat::SYNC);
        feed(&mut assembler, &[0x00, 0x13, 0xFE]);
        assert_eq!(assembler.state(), AssemblerState::Idle);
        assert_eq!(assembler.rejected_count(), 0);
    }

    #[test]
    fn test_sync_link_ignores_breaks() {
        let mut assembler = FrameAssembler::new(FrameFormat::SYNC);
        feed(&mut assembler, &[0x55, 0x01]);
        assembler.push(RxEvent::Break);
        assert_eq!(assembler.state(), AssemblerState::HeaderCollecting);
        assert_eq!(feed(&mut assembler, &[0x01, 0x01, 0x58]), 1);
    }

    #[test]
    fn test_sync_resync_after_noise() {
        let frame = [0x55, 0x00, 0x02, 0x34, 0x12, 0x9D];
        let noise_samples: [&[u8]; 6] = [
            &[],
            &[0x00, 0xFF, 0x13, 0x42],
            &[0x55, 0x02],
            &[0xAA, 0x55, 0x03],
            &[0x55, 0x00, 0x01],
            &[0x55, 0x00, 0x0F],
        ];

        for noise in noise_samples {
            let mut assembler = FrameAssembler::new(FrameFormat::SYNC);
            let mut stream = noise.to_vec();
            stream.extend_from_slice(&frame);

            assert_eq!(feed(&mut assembler, &stream), 1, "noise {:02X?}", noise);
            let decoded = assembler.take_frame().unwrap();
            assert_eq!(decoded.as_bytes(), &frame[1..], "noise {:02X?}", noise);
        }
    }

    #[test]
    fn test_sync_frame_inside_long_noise_frame() {
        let mut assembler = FrameAssembler::new(FrameFormat::SYNC);
        let stream = [0x55, 0x00, 0x0F, 0x55, 0x00, 0x02, 0x34, 0x12, 0x9D];

        assert_eq!(feed(&mut assembler, &stream), 1);
        assert_eq!(assembler.accepted_count(), 1);
        assert_eq!(assembler.rejected_count(), 1);
        assert_eq!(assembler.take_frame().unwrap().payload(), &[0x34, 0x12]);
        assert_eq!(assembler.state(), AssemblerState::Idle);
    }

    #[test]
    fn test_partial_inner_frame_keeps_collecting() {
        let mut assembler = FrameAssembler::new(FrameFormat::SYNC);
        feed(&mut assembler, &[0x55, 0x00, 0x0F, 0x55, 0x00, 0x02, 0x34]);
        assert_eq!(assembler.state(), AssemblerState::PayloadCollecting);
        assert_eq!(assembler.rejected_count(), 0);
    }

    #[test]
    fn test_bus_frame_has_no_nested_resync() {
        let mut assembler = FrameAssembler::new(FrameFormat::BUS);
        assembler.push(RxEvent::Break);
        // 0x55 inside a bus payload is plain data
        assert_eq!(feed(&mut assembler, &[0x28, 0x06, 0x55, 0x00, 0x02]), 0);
        assert_eq!(assembler.state(), AssemblerState::PayloadCollecting);
    }

    #[test]
    fn test_counter_masked_to_nibble() {
        let wide = FrameFormat::BUS.encode(0x80, 0x15, &[0x14, 0x28]).unwrap();
        let narrow = FrameFormat::BUS.encode(0x80, 0x05, &[0x14, 0x28]).unwrap();
        assert_eq!(wide, narrow);
        assert_eq!(wide.as_bytes()[1], 0x52);
    }

    #[test]
    fn test_bytes_dropped_while_frame_pending() {
        let mut assembler = FrameAssembler::new(FrameFormat::SYNC);
        feed(&mut assembler, &[0x55, 0x01, 0x01, 0x01, 0x58]);
        assert_eq!(feed(&mut assembler, &[0x55, 0x01, 0x01, 0x02, 0x59]), 0);

        let frame = assembler.take_frame().unwrap();
        assert_eq!(frame.payload(), &[0x01]);
        assert!(assembler.take_frame().is_none());
    }

    #[test]
    fn test_bus_frame_accepted() {
        let mut assembler = FrameAssembler::new(FrameFormat::BUS);
        assert!(feed_bus(&mut assembler, &[0x28, 0x31, 0x01, 0x28]));

        let frame = assembler.take_frame().unwrap();
        assert_eq!(frame.address(), 0x28);
        assert_eq!(frame.counter(), 3);
        assert_eq!(frame.payload(), &[0x01]);
    }

    #[test]
    fn test_bus_bytes_without_break_ignored() {
        let mut assembler = FrameAssembler::new(FrameFormat::BUS);
        assert_eq!(feed(&mut assembler, &[0x28, 0x31, 0x01, 0x28]), 0);
        assert_eq!(assembler.state(), AssemblerState::Idle);
    }

    #[test]
    fn test_bus_break_restarts_mid_frame() {
        let mut assembler = FrameAssembler::new(FrameFormat::BUS);
        assembler.push(RxEvent::Break);
        feed(&mut assembler, &[0x00, 0x92, 0x03]);
        assert_eq!(assembler.state(), AssemblerState::PayloadCollecting);

        assert!(feed_bus(&mut assembler, &[0x28, 0xF1, 0x20, 0x22]));
        let frame = assembler.take_frame().unwrap();
        assert_eq!(frame.counter(), 0x0F);
        assert_eq!(frame.payload(), &[0x20]);
    }

    #[test]
    fn test_bus_resync_after_noise() {
        let mut assembler = FrameAssembler::new(FrameFormat::BUS);
        assembler.push(RxEvent::Break);
        feed(&mut assembler, &[0x13, 0x37, 0x00, 0x55, 0xFF, 0x28, 0x31]);
        assert!(assembler.take_frame().is_none());

        assert!(feed_bus(&mut assembler, &[0x00, 0x92, 0x03, 0x10, 0x09]));
        assert_eq!(assembler.take_frame().unwrap().payload(), &[0x03, 0x10]);
    }

    #[test]
    fn test_bus_crc_error_dropped() {
        let mut assembler = FrameAssembler::new(FrameFormat::BUS);
        assert!(!feed_bus(&mut assembler, &[0x28, 0x31, 0x01, 0x29]));
        assert_eq!(assembler.state(), AssemblerState::Idle);
        assert_eq!(assembler.rejected_count(), 1);
    }

    #[test]
    fn test_bus_break_dropped_while_frame_pending() {
        let mut assembler = FrameAssembler::new(FrameFormat::BUS);
        feed_bus(&mut assembler, &[0x28, 0x31, 0x01, 0x28]);
        assembler.push(RxEvent::Break);
        assert!(assembler.is_ready());
    }

    #[test]
    fn test_encode_sync_frame() {
        let tx = FrameFormat::SYNC.encode(CMD_ACTION, 0, &[0x04]).unwrap();
        assert_eq!(tx.as_bytes(), &[0x55, 0x01, 0x01, 0x04, 0x5B]);
    }

    #[test]
    fn test_encode_bus_frame() {
        let tx = FrameFormat::BUS.encode(MASTER_ADDR, 4, &[UAP1_TYPE, UAP1_ADDR]).unwrap();
        assert_eq!(tx.as_bytes(), &[0x80, 0x42, 0x14, 0x28, 0x83]);
    }

    #[test]
    fn test_encode_payload_too_large() {
        assert!(FrameFormat::SYNC.encode(0x00, 0, &[0u8; 16]).is_err());
        assert!(FrameFormat::BUS.encode(0x00, 0, &[0u8; 16]).is_err());
    }

    #[test]
    fn test_decode_sync_frame() {
        let frame = FrameFormat::SYNC.decode(&[0x55, 0x00, 0x02, 0x10, 0x03, 0x6A]).unwrap();
        assert_eq!(frame.command(), CMD_STATUS);
        assert_eq!(frame.payload(), &[0x10, 0x03]);
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(FrameFormat::SYNC.decode(&[]).is_err());
        assert!(FrameFormat::SYNC.decode(&[0xC8, 0x01, 0x01, 0x01, 0x58]).is_err());
        assert!(FrameFormat::SYNC.decode(&[0x55, 0x01, 0x01, 0x01, 0x59]).is_err());
        assert!(FrameFormat::SYNC.decode(&[0x55, 0x01, 0x02, 0x01, 0x58]).is_err());
        assert!(FrameFormat::SYNC.decode(&[0x55, 0x01, 0x10, 0x01, 0x58]).is_err());
        assert!(FrameFormat::BUS.decode(&[0x28, 0x31]).is_err());
        assert!(FrameFormat::BUS.decode(&[0x28, 0x31, 0x01, 0x00]).is_err());
    }

    #[test]
    fn test_decode_bus_frame() {
        let frame = FrameFormat::BUS.decode(&[0x80, 0x03, 0x29, 0x01, 0x10, 0x1E]).unwrap();
        assert_eq!(frame.address(), MASTER_ADDR);
        assert_eq!(frame.counter(), 0);
        assert_eq!(frame.payload(), &[0x29, 0x01, 0x10]);
    }
}
