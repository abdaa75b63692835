//! # Hoermann Bridge Library
//!
//! Bridge a Hoermann garage door operator to a network-facing controller.
//!
//! This library emulates a UAP1 expansion module on the operator's RS-485
//! bus, talks the point-to-point direct link, and relays actions and status
//! over a gateway link. The wire components in [`hoermann`] are synchronous
//! and tick-driven; [`runtime`] drives them from serial ports on a host.

pub mod config;
pub mod error;
pub mod hoermann;
pub mod serial;
pub mod telemetry;
pub mod bridge;
pub mod runtime;
