//! # Bridges
//!
//! Tick-driven compositions of the wire components, one per operating mode.
//!
//! Bytes are fed in on the receive path as they arrive; all decoding,
//! response scheduling and report generation happens in [`BusBridge::tick`]
//! or [`DirectBridge::tick`], called once per tick.

use std::sync::Arc;

use tracing::{debug, info};

use crate::hoermann::arbiter::{BusArbiter, BusTransceiver};
use crate::hoermann::direct::DirectLink;
use crate::hoermann::door::{Action, DoorState};
use crate::hoermann::frame::{FrameAssembler, RxEvent, TxFrame};
use crate::hoermann::gateway::GatewayLink;
use crate::hoermann::mailbox::{ActionMailbox, DoorStateCell, ResponseSlot, StatusWord};
use crate::hoermann::slave::SlaveEmulator;

/// Logs newly rejected frames of one assembler
#[derive(Debug, Default)]
struct RejectWatch {
    seen: u32,
}

impl RejectWatch {
    fn check(&mut self, link: &str, assembler: &FrameAssembler) {
        let rejected = assembler.rejected_count();
        if rejected != self.seen {
            debug!("{} link: {} frame(s) rejected ({} total)", link, rejected.wrapping_sub(self.seen), rejected);
            self.seen = rejected;
        }
    }
}

/// UAP1 emulation on the bus, optionally serving a gateway link
#[derive(Debug)]
pub struct BusBridge {
    slave: SlaveEmulator,
    arbiter: BusArbiter,
    gateway: Option<GatewayLink>,
    response: Arc<ResponseSlot>,
    broadcast: Arc<StatusWord>,
    bus_rejects: RejectWatch,
    gateway_rejects: RejectWatch,
}

impl BusBridge {
    /// Create a bus bridge
    ///
    /// `gateway_interval` enables the gateway link, reporting the broadcast
    /// status every that many ticks.
    pub fn new(response_delay: u16, gateway_interval: Option<u32>) -> Self {
        let response = Arc::new(ResponseSlot::new());
        let broadcast = Arc::new(StatusWord::new());

        let gateway = gateway_interval
            .map(|interval| GatewayLink::new(Arc::clone(&response), Arc::clone(&broadcast), interval));

        Self {
            slave: SlaveEmulator::new(Arc::clone(&response), Arc::clone(&broadcast)),
            arbiter: BusArbiter::new(response_delay),
            gateway,
            response,
            broadcast,
            bus_rejects: RejectWatch::default(),
            gateway_rejects: RejectWatch::default(),
        }
    }

    /// Feed one bus receive event; dropped while our own frame is on the wire
    pub fn on_bus_rx(&mut self, event: RxEvent) {
        if self.arbiter.receiver_enabled() {
            self.slave.on_rx(event);
        }
    }

    /// Feed one byte received on the gateway link
    pub fn on_gateway_rx(&mut self, byte: u8) {
        if let Some(gateway) = self.gateway.as_mut() {
            gateway.on_rx(byte);
        }
    }

    /// Advance one tick; returns the frame to send on the gateway link
    ///
    /// The arbiter runs first, so a response queued on this tick starts
    /// exactly `response_delay` ticks later.
    pub fn tick<T: BusTransceiver>(&mut self, line: &mut T) -> Option<TxFrame> {
        if let Some(sent) = self.arbiter.tick(line) {
            self.slave.response_sent(&sent);
        }

        if let Some(response) = self.slave.poll() {
            self.arbiter.queue(response);
        }
        self.bus_rejects.check("Bus", self.slave.assembler());

        let gateway = self.gateway.as_mut()?;
        let out = gateway.tick();
        self.gateway_rejects.check("Gateway", gateway.assembler());
        out
    }

    /// Request an action for the next status response
    pub fn trigger(&self, action: Action) {
        self.slave.trigger(action);
    }

    /// Last status word broadcast by the bus master
    pub fn broadcast_status(&self) -> u16 {
        self.broadcast.load()
    }

    /// Shared response slot, for collaborators on other threads
    pub fn response_slot(&self) -> Arc<ResponseSlot> {
        Arc::clone(&self.response)
    }

    /// Shared broadcast word, for collaborators on other threads
    pub fn broadcast_word(&self) -> Arc<StatusWord> {
        Arc::clone(&self.broadcast)
    }

    pub fn arbiter(&self) -> &BusArbiter {
        &self.arbiter
    }

    pub fn has_gateway(&self) -> bool {
        self.gateway.is_some()
    }

    /// Log frame counters
    pub fn log_stats(&self) {
        let bus = self.slave.assembler();
        info!("Bus frames: {} accepted, {} rejected", bus.accepted_count(), bus.rejected_count());
        if let Some(gateway) = &self.gateway {
            let gw = gateway.assembler();
            info!("Gateway frames: {} accepted, {} rejected", gw.accepted_count(), gw.rejected_count());
        }
    }
}

/// Direct link to the operator
#[derive(Debug)]
pub struct DirectBridge {
    link: DirectLink,
    state: Arc<DoorStateCell>,
    mailbox: Arc<ActionMailbox>,
    rejects: RejectWatch,
}

impl DirectBridge {
    pub fn new() -> Self {
        let state = Arc::new(DoorStateCell::new());
        let mailbox = Arc::new(ActionMailbox::new());
        Self {
            link: DirectLink::new(Arc::clone(&state), Arc::clone(&mailbox)),
            state,
            mailbox,
            rejects: RejectWatch::default(),
        }
    }

    pub fn on_rx(&mut self, byte: u8) {
        self.link.on_rx(byte);
    }

    /// Advance one tick; returns the command frame to send, if any
    pub fn tick(&mut self) -> Option<TxFrame> {
        let out = self.link.tick();
        self.rejects.check("Direct", self.link.assembler());
        out
    }

    /// Request an action; it is sent on the next tick
    pub fn trigger(&self, action: Action) {
        self.link.trigger(action);
    }

    pub fn door_state(&self) -> DoorState {
        self.link.door_state()
    }

    /// Shared door state, for collaborators on other threads
    pub fn state_cell(&self) -> Arc<DoorStateCell> {
        Arc::clone(&self.state)
    }

    /// Shared action mailbox, for collaborators on other threads
    pub fn mailbox(&self) -> Arc<ActionMailbox> {
        Arc::clone(&self.mailbox)
    }

    pub fn log_stats(&self) {
        let link = self.link.assembler();
        info!("Direct frames: {} accepted, {} rejected", link.accepted_count(), link.rejected_count());
    }
}

impl Default for DirectBridge {
    fn default() -> Self {
        Self::new()
    }
}
