//! In-flight request tracking, one lane per (kind class, target).
//!
//! A [`Claim`] holds its lane until dropped. Mutations on different lanes
//! never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as LaneLock, OwnedMutexGuard};

use crate::events::{Mutation, MutationKind, Target};

type Lane = (MutationKind, Target);
type Lanes = Arc<Mutex<HashMap<Lane, Arc<LaneLock<()>>>>>;

#[derive(Debug, Clone, Default)]
pub struct InFlight {
    lanes: Lanes,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lane only if nothing is in flight on it.
    pub fn try_claim(&self, mutation: Mutation) -> Option<Claim> {
        let key = mutation.lane();
        let mut lanes = self.lanes.lock().unwrap_or_else(PoisonError::into_inner);
        let lane = lanes.entry(key).or_default().clone();
        let guard = lane.try_lock_owned().ok()?;
        Some(Claim {
            key,
            lanes: self.lanes.clone(),
            _guard: guard,
        })
    }

    /// Wait for the lane, then take it.
    pub async fn claim(&self, mutation: Mutation) -> Claim {
        let key = mutation.lane();
        let lane = {
            let mut lanes = self.lanes.lock().unwrap_or_else(PoisonError::into_inner);
            lanes.entry(key).or_default().clone()
        };
        let guard = lane.lock_owned().await;
        Claim {
            key,
            lanes: self.lanes.clone(),
            _guard: guard,
        }
    }

    pub fn len(&self) -> usize {
        self.lanes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive hold on one lane.
#[derive(Debug)]
pub struct Claim {
    key: Lane,
    lanes: Lanes,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for Claim {
    fn drop(&mut self) {
        let mut lanes = self.lanes.lock().unwrap_or_else(PoisonError::into_inner);
        // The map and this guard hold one reference each; anything more is
        // a waiter that still needs the entry.
        let unused = lanes
            .get(&self.key)
            .map(|lane| Arc::strong_count(lane) <= 2)
            .unwrap_or(false);
        if unused {
            lanes.remove(&self.key);
        }
    }
}
