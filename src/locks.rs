//! In-process per-key read/write locks.
//!
//! Writers take an exclusive lock on the key they mutate and shared locks on
//! every upstream resource they reference. A resource delete therefore
//! excludes concurrent creation of its dependents for the whole
//! scan-then-delete window, and two updates of one key are serialized.
//!
//! Locks are always acquired in `ResourceRef` order (entity kind rank, then
//! key). Since a kind only references lower-ranked kinds, nested acquisition
//! during cascades follows the same global order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

use crate::error::{RegistryError, Result};
use crate::model::ResourceRef;

/// Idle slots are pruned once the table grows past this many entries.
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Default)]
pub struct KeyLocks {
    slots: Mutex<HashMap<ResourceRef, Arc<RwLock<()>>>>,
}

enum Held {
    Shared(#[allow(dead_code)] OwnedRwLockReadGuard<()>),
    Exclusive(#[allow(dead_code)] OwnedRwLockWriteGuard<()>),
}

/// Guards for one operation. Released on drop.
pub struct LockSet {
    held: Vec<Held>,
}

impl LockSet {
    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Mode {
    // Exclusive sorts first so dedup keeps it over a shared request.
    Exclusive,
    Shared,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock `exclusive` for writing and every entry of `shared` for reading.
    pub async fn acquire(
        &self,
        exclusive: ResourceRef,
        shared: impl IntoIterator<Item = ResourceRef>,
    ) -> Result<LockSet> {
        let mut wanted: Vec<(ResourceRef, Mode)> = shared
            .into_iter()
            .map(|r| (r, Mode::Shared))
            .chain(std::iter::once((exclusive, Mode::Exclusive)))
            .collect();
        wanted.sort();
        wanted.dedup_by(|later, earlier| later.0 == earlier.0);

        let mut held = Vec::with_capacity(wanted.len());
        for (resource, mode) in wanted {
            let slot = self.slot(resource)?;
            held.push(match mode {
                Mode::Exclusive => Held::Exclusive(slot.write_owned().await),
                Mode::Shared => Held::Shared(slot.read_owned().await),
            });
        }
        Ok(LockSet { held })
    }

    fn slot(&self, resource: ResourceRef) -> Result<Arc<RwLock<()>>> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|e| RegistryError::Storage(anyhow!("Lock: {}", e)))?;
        if slots.len() > PRUNE_THRESHOLD {
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
        }
        Ok(Arc::clone(slots.entry(resource).or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind;
    use std::time::Duration;

    fn zone(name: &str) -> ResourceRef {
        ResourceRef {
            kind: EntityKind::Zone,
            key: name.into(),
        }
    }

    fn infra(name: &str) -> ResourceRef {
        ResourceRef {
            kind: EntityKind::Infrastructure,
            key: name.into(),
        }
    }

    #[tokio::test]
    async fn shared_locks_coexist() {
        let locks = KeyLocks::new();
        let a = locks.acquire(infra("z1/a"), [zone("z1")]).await.unwrap();
        let b = locks.acquire(infra("z1/b"), [zone("z1")]).await.unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 2);
    }

    #[tokio::test]
    async fn exclusive_waits_for_shared() {
        let locks = Arc::new(KeyLocks::new());
        let reader = locks.acquire(infra("z1/a"), [zone("z1")]).await.unwrap();

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move { locks.acquire(zone("z1"), []).await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(reader);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .expect("exclusive lock should be granted once readers leave")
            .unwrap()
            .unwrap();
    }

    fn tracked(locks: &KeyLocks) -> usize {
        locks.slots.lock().unwrap().len()
    }

    #[tokio::test]
    async fn idle_slots_are_pruned_but_held_ones_survive() {
        let locks = KeyLocks::new();
        let held = locks.acquire(zone("pinned"), []).await.unwrap();

        for i in 0..PRUNE_THRESHOLD + 76 {
            locks.acquire(infra(&format!("z/{i}")), []).await.unwrap();
        }
        assert!(tracked(&locks) < PRUNE_THRESHOLD);

        let contender = tokio::time::timeout(
            Duration::from_millis(20),
            locks.acquire(zone("pinned"), []),
        )
        .await;
        assert!(contender.is_err(), "pruning dropped a held slot");

        drop(held);
        locks.acquire(zone("pinned"), []).await.unwrap();
    }

    #[tokio::test]
    async fn exclusive_wins_over_shared_for_same_key() {
        let locks = KeyLocks::new();
        let set = locks.acquire(zone("z1"), [zone("z1")]).await.unwrap();
        assert_eq!(set.len(), 1);
    }
}
