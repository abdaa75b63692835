//! # Hoermann Protocol Constants
//!
//! Addresses, command bytes and frame geometry shared by the three link
//! variants (direct operator link, UAP1 bus, gateway link).

/// Sync byte that opens every direct-link and gateway frame
pub const SYNC_BYTE: u8 = 0x55;

/// Seed of the additive checksum on sync-byte links
pub const SUM_SEED: u8 = SYNC_BYTE;

/// Initial value of the bus CRC8
pub const CRC8_INITIAL_VALUE: u8 = 0xF3;

/// Header bytes buffered before the payload (command/address + length)
pub const HEADER_LEN: usize = 2;

/// Trailing check byte
pub const CHECK_LEN: usize = 1;

/// Largest payload any link can declare (4-bit length field)
pub const MAX_PAYLOAD_LEN: usize = 15;

/// Fixed receive buffer capacity: header + payload + check byte
pub const FRAME_CAPACITY: usize = HEADER_LEN + MAX_PAYLOAD_LEN + CHECK_LEN;

/// Fixed transmit buffer capacity: optional sync byte + receive capacity
pub const TX_CAPACITY: usize = 1 + FRAME_CAPACITY;

// Bus addresses

/// Bus broadcast address
pub const BROADCAST_ADDR: u8 = 0x00;

/// Bus master address
pub const MASTER_ADDR: u8 = 0x80;

/// Address of the emulated UAP1 slave
pub const UAP1_ADDR: u8 = 0x28;

/// Device type the UAP1 reports on a bus scan
pub const UAP1_TYPE: u8 = 0x14;

// Bus commands

/// Bus scan request (master discovers slaves)
pub const CMD_SLAVE_SCAN: u8 = 0x01;

/// Slave status request
pub const CMD_SLAVE_STATUS_REQUEST: u8 = 0x20;

/// Slave status response
pub const CMD_SLAVE_STATUS_RESPONSE: u8 = 0x29;

/// Payload length of a bus status broadcast
pub const BROADCAST_PAYLOAD_LEN: usize = 2;

// Sync-byte link commands

/// Status report (direct link inbound, gateway outbound)
pub const CMD_STATUS: u8 = 0x00;

/// Action trigger (direct link outbound, gateway inbound)
pub const CMD_ACTION: u8 = 0x01;

/// Payload length of a status report
pub const STATUS_PAYLOAD_LEN: usize = 2;

/// Payload length of an action trigger
pub const ACTION_PAYLOAD_LEN: usize = 1;

// Timing defaults (in ticks of the 1 ms reference cadence)

/// Minimum latency between a bus request and our answer
pub const DEFAULT_RESPONSE_DELAY_TICKS: u16 = 3;

/// Interval between gateway status broadcasts
pub const DEFAULT_STATUS_INTERVAL_TICKS: u32 = 5000;
