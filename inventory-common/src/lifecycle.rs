//! Active/archived lifecycle of an instrument
//!
//! Archiving is automatic only in one direction: a write that sets quantity
//! to zero archives the instrument. Nothing but an explicit restore brings it
//! back to active, and neither transition touches any other field.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Active,
    Archived,
}

/// Event applied to an instrument's lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Operator archives the instrument
    Archive,
    /// Operator restores the instrument to active
    Restore,
    /// A create/update writes this quantity
    QuantityWritten(i64),
}

impl LifecycleState {
    pub fn from_archived(archived: bool) -> Self {
        if archived {
            LifecycleState::Archived
        } else {
            LifecycleState::Active
        }
    }

    pub fn is_archived(self) -> bool {
        self == LifecycleState::Archived
    }

    /// Next state after `transition`; self-transitions are no-ops
    pub fn apply(self, transition: Transition) -> Self {
        match transition {
            Transition::Archive => LifecycleState::Archived,
            Transition::Restore => LifecycleState::Active,
            Transition::QuantityWritten(quantity) if forces_archive(quantity) => {
                LifecycleState::Archived
            }
            Transition::QuantityWritten(_) => self,
        }
    }
}

/// Whether writing `quantity` forces the archived state
///
/// Only the value being written matters, never the previous one.
pub fn forces_archive(quantity: i64) -> bool {
    quantity == 0
}

/// Target state for an explicit archive/restore request
pub fn requested_state(archived: bool) -> LifecycleState {
    let transition = if archived {
        Transition::Archive
    } else {
        Transition::Restore
    };
    // Explicit transitions do not depend on the current state
    LifecycleState::Active.apply(transition)
}

/// State of a freshly created instrument holding `quantity`
pub fn initial_state(quantity: i64) -> LifecycleState {
    LifecycleState::Active.apply(Transition::QuantityWritten(quantity))
}
