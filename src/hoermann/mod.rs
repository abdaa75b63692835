//! # Hoermann Protocol Module
//!
//! Wire protocols of the Hoermann operator bus and its bridges.
//!
//! This module handles:
//! - Seeded-sum and CRC8 integrity checks
//! - Resynchronizing frame assembly (sync byte or line break)
//! - Door state decoding and action mapping
//! - The direct operator link, the UAP1 slave emulation and the gateway link
//! - Half-duplex bus turnaround

pub mod protocol;
pub mod checksum;
pub mod frame;
pub mod door;
pub mod mailbox;
pub mod direct;
pub mod slave;
pub mod arbiter;
pub mod gateway;
