//! Host
//!
//! Owner table, message routing by identity and the scheduling turn that
//! drains deferred work.

use crate::bridge::{BridgeObject, HostContext};
use crate::deferral::DeferralQueue;
use crate::outlet::Outlets;
use ember_core::message::ParseError;
use ember_core::{Message, OwnerId};
use ember_script::{Lifecycle, LifecycleError};
use ember_services::{OwnerSettings, SearchPath};
use std::collections::HashMap;
use std::rc::Rc;

pub struct Host<O: Outlets> {
    lifecycle: Rc<Lifecycle>,
    owners: HashMap<OwnerId, BridgeObject>,
    deferred: DeferralQueue,
    files: SearchPath,
    outlets: O,
}

impl<O: Outlets> Host<O> {
    pub fn new(lifecycle: Rc<Lifecycle>, files: SearchPath, outlets: O) -> Self {
        Self {
            lifecycle,
            owners: HashMap::new(),
            deferred: DeferralQueue::new(),
            files,
            outlets,
        }
    }

    /// Create an owner and return its identity.
    pub fn spawn(&mut self, settings: OwnerSettings) -> Result<OwnerId, LifecycleError> {
        let object = BridgeObject::new(&self.lifecycle, settings)?;
        let identity = object.identity().clone();
        self.owners.insert(identity.clone(), object);
        Ok(identity)
    }

    /// Destroy an owner. Returns `false` if it did not exist.
    pub fn free(&mut self, owner: &OwnerId) -> bool {
        self.owners.remove(owner).is_some()
    }

    /// Deliver a message. Returns `false` if the owner does not exist.
    pub fn send(&mut self, owner: &OwnerId, message: &Message) -> bool {
        let Some(object) = self.owners.get_mut(owner) else {
            tracing::warn!(owner = %owner, "message for unknown owner");
            return false;
        };
        let mut host = HostContext {
            outlets: &mut self.outlets,
            deferred: &mut self.deferred,
            files: &self.files,
        };
        object.handle(message, &mut host);
        true
    }

    pub fn send_line(&mut self, owner: &OwnerId, line: &str) -> Result<bool, ParseError> {
        let message = Message::parse(line)?;
        Ok(self.send(owner, &message))
    }

    pub fn editor_closed(&mut self, owner: &OwnerId, text: &[u8]) -> bool {
        match self.owners.get_mut(owner) {
            Some(object) => {
                object.editor_closed(text);
                true
            }
            None => false,
        }
    }

    pub fn editor_saved(&mut self, owner: &OwnerId, text: &[u8]) -> bool {
        let Some(object) = self.owners.get_mut(owner) else {
            return false;
        };
        let mut host = HostContext {
            outlets: &mut self.outlets,
            deferred: &mut self.deferred,
            files: &self.files,
        };
        object.editor_saved(text, &mut host);
        true
    }

    /// Run one scheduling turn: every task deferred before the turn began, in
    /// order. Tasks for owners freed in the meantime are dropped.
    pub fn turn(&mut self) -> usize {
        let mut ran = 0;
        for (owner, task) in self.deferred.take_turn() {
            let Some(object) = self.owners.get_mut(&owner) else {
                tracing::debug!(owner = %owner, ?task, "owner gone, deferred task dropped");
                continue;
            };
            let mut host = HostContext {
                outlets: &mut self.outlets,
                deferred: &mut self.deferred,
                files: &self.files,
            };
            object.run_deferred(task, &mut host);
            ran += 1;
        }
        ran
    }

    pub fn pending(&self) -> usize {
        self.deferred.len()
    }

    pub fn owner(&self, owner: &OwnerId) -> Option<&BridgeObject> {
        self.owners.get(owner)
    }

    pub fn owners(&self) -> impl Iterator<Item = &OwnerId> {
        self.owners.keys()
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn outlets(&self) -> &O {
        &self.outlets
    }

    pub fn outlets_mut(&mut self) -> &mut O {
        &mut self.outlets
    }
}
