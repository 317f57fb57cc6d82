//! Registry of agents waiting for a client
//!
//! Maps each node id to at most one pending agent connection. Every
//! operation takes the lock for a single O(1) map access; no I/O happens
//! while it is held.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rv_protocol::NodeId;

enum Slot<P> {
    /// Claimed by an agent whose `OK` has not been written yet
    Reserved,
    /// Acknowledged agent waiting for a client
    Pending(P),
}

/// Pending agent connections keyed by node id
pub struct Registry<P> {
    slots: Mutex<HashMap<NodeId, Slot<P>>>,
}

impl<P> Registry<P> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<NodeId, Slot<P>>> {
        // The map holds no invariants a panicking holder could break
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reserve `node_id` for an agent.
    ///
    /// Returns `None` if the id is already reserved or registered. The
    /// reservation is released on drop unless it is filled.
    pub fn reserve(&self, node_id: &NodeId) -> Option<Reservation<'_, P>> {
        let mut slots = self.slots();
        if slots.contains_key(node_id) {
            return None;
        }
        slots.insert(node_id.clone(), Slot::Reserved);
        Some(Reservation {
            registry: self,
            node_id: node_id.clone(),
            filled: false,
        })
    }

    /// Reserve and fill in one step; hands `conn` back if the id is taken
    pub fn register(&self, node_id: &NodeId, conn: P) -> Result<usize, P> {
        match self.reserve(node_id) {
            Some(reservation) => Ok(reservation.fill(conn)),
            None => Err(conn),
        }
    }

    /// Atomically remove and return the pending agent for `node_id`
    pub fn claim(&self, node_id: &NodeId) -> Option<P> {
        let mut slots = self.slots();
        if !matches!(slots.get(node_id), Some(Slot::Pending(_))) {
            return None;
        }
        match slots.remove(node_id) {
            Some(Slot::Pending(conn)) => Some(conn),
            _ => None,
        }
    }

    /// Whether an agent is waiting under `node_id`
    pub fn contains(&self, node_id: &NodeId) -> bool {
        matches!(self.slots().get(node_id), Some(Slot::Pending(_)))
    }

    /// Number of registered or reserved node ids
    pub fn len(&self) -> usize {
        self.slots().len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<P> Default for Registry<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive hold on a node id while its agent is being acknowledged
pub struct Reservation<'a, P> {
    registry: &'a Registry<P>,
    node_id: NodeId,
    filled: bool,
}

impl<'a, P> Reservation<'a, P> {
    /// Node id this reservation holds
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    /// Store the agent connection, making it claimable.
    ///
    /// Returns the number of ids now in the registry.
    pub fn fill(mut self, conn: P) -> usize {
        let registry = self.registry;
        let mut slots = registry.slots();
        slots.insert(self.node_id.clone(), Slot::Pending(conn));
        self.filled = true;
        slots.len()
    }
}

impl<'a, P> Drop for Reservation<'a, P> {
    fn drop(&mut self) {
        if !self.filled {
            self.registry.slots().remove(&self.node_id);
        }
    }
}
