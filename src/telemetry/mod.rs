//! # Telemetry Module
//!
//! Reports observed operator state to the outside collaborator.
//!
//! This module handles:
//! - Building timestamped reports of door state or bus broadcast words
//! - Formatting them as JSON Lines
//! - Suppressing reports whose observed value has not changed
//!
//! Nothing is persisted; every report describes the present only.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{BridgeError, Result};
use crate::hoermann::door::DoorState;

/// Observed value carried by a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Observation {
    /// Decoded door state from the direct link
    Door(DoorState),
    /// Raw status word last broadcast by the bus master
    Broadcast { status: u16 },
}

/// One timestamped report
#[derive(Debug, Clone, Serialize)]
pub struct StateReport {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub observation: Observation,
}

impl StateReport {
    pub fn new(observation: Observation) -> Self {
        Self {
            timestamp: Utc::now(),
            observation,
        }
    }

    /// Serialize as a single JSON line (no trailing newline)
    ///
    /// # Examples
    ///
    /// ```
    /// use hoermann_bridge::telemetry::{Observation, StateReport};
    ///
    /// let line = StateReport::new(Observation::Broadcast { status: 0x1003 }).to_json_line()?;
    /// assert!(line.contains("\"kind\":\"broadcast\""));
    /// assert!(line.contains("\"status\":4099"));
    /// # Ok::<(), hoermann_bridge::error::BridgeError>(())
    /// ```
    pub fn to_json_line(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| BridgeError::Protocol(format!("Failed to serialize report: {}", e)))
    }
}

/// Emits a report only when the observed value changes
#[derive(Debug, Default)]
pub struct ChangeReporter {
    last: Option<Observation>,
}

impl ChangeReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `observation` if it differs from the last one reported
    pub fn observe(&mut self, observation: Observation) -> Option<StateReport> {
        if self.last == Some(observation) {
            return None;
        }
        self.last = Some(observation);
        Some(StateReport::new(observation))
    }

    pub fn last(&self) -> Option<Observation> {
        self.last
    }
}
