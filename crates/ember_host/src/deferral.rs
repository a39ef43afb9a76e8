//! Deferred execution
//!
//! Work triggered from the editor side (reading a script from disk) must not
//! run inside the caller's context. It is queued here and drained once per
//! host scheduling turn, in FIFO order.

use ember_core::OwnerId;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredTask {
    /// Read a script into the owner's editor buffer. `None` re-reads the
    /// owner's remembered file.
    Read { name: Option<String> },
    /// Read a script into the buffer, then execute the file.
    Load { name: String },
}

#[derive(Debug, Default)]
pub struct DeferralQueue {
    pending: VecDeque<(OwnerId, DeferredTask)>,
}

impl DeferralQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, owner: &OwnerId, task: DeferredTask) {
        tracing::trace!(owner = %owner, ?task, "task deferred");
        self.pending.push_back((owner.clone(), task));
    }

    /// Take everything queued so far. Tasks scheduled while the returned
    /// batch runs wait for the next turn.
    pub fn take_turn(&mut self) -> VecDeque<(OwnerId, DeferredTask)> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
