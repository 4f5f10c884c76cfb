use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::anyhow;
use async_trait::async_trait;

use crate::error::{RegistryError, Result};
use crate::model::{RegistryEntity, Status};
use crate::ports::Repository;

// ── MemoryRepository ──

/// In-memory `Repository` for tests and single-process deployments.
///
/// Entities are kept in insertion order, so `find_all` is stable for this
/// backend. Every port call is counted; see [`MemoryRepository::counts`].
///
/// A status reported for a key with no stored specification is held aside
/// and is invisible to reads. The first `save_specification` for that key
/// picks it up.
pub struct MemoryRepository<E: RegistryEntity> {
    inner: RwLock<Rows<E>>,
    counters: Counters,
}

struct Rows<E: RegistryEntity> {
    entities: Vec<E>,
    pending_status: HashMap<E::Key, Status>,
}

impl<E: RegistryEntity> Rows<E> {
    fn new(entities: Vec<E>) -> Self {
        Self {
            entities,
            pending_status: HashMap::new(),
        }
    }
}

/// Snapshot of how many times each port operation ran.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OperationCounts {
    pub save_specification: usize,
    pub save_status: usize,
    pub find_by_id: usize,
    pub find_all: usize,
    pub delete: usize,
}

#[derive(Default)]
struct Counters {
    save_specification: AtomicUsize,
    save_status: AtomicUsize,
    find_by_id: AtomicUsize,
    find_all: AtomicUsize,
    delete: AtomicUsize,
}

impl<E: RegistryEntity> MemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Rows::new(Vec::new())),
            counters: Counters::default(),
        }
    }

    /// Start from existing rows, bypassing the lifecycle engine.
    pub fn seeded(entities: Vec<E>) -> Self {
        Self {
            inner: RwLock::new(Rows::new(entities)),
            counters: Counters::default(),
        }
    }

    pub fn counts(&self) -> OperationCounts {
        OperationCounts {
            save_specification: self.counters.save_specification.load(Ordering::Relaxed),
            save_status: self.counters.save_status.load(Ordering::Relaxed),
            find_by_id: self.counters.find_by_id.load(Ordering::Relaxed),
            find_all: self.counters.find_all.load(Ordering::Relaxed),
            delete: self.counters.delete.load(Ordering::Relaxed),
        }
    }

    /// Stored entities. Status-only reports are not counted.
    pub fn len(&self) -> usize {
        self.read().map(|rows| rows.entities.len()).unwrap_or_default()
    }

    /// Keys with a reported status but no specification yet.
    pub fn pending_status_count(&self) -> usize {
        self.read()
            .map(|rows| rows.pending_status.len())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Rows<E>>> {
        self.inner
            .read()
            .map_err(|e| RegistryError::Storage(anyhow!("Lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Rows<E>>> {
        self.inner
            .write()
            .map_err(|e| RegistryError::Storage(anyhow!("Lock: {}", e)))
    }
}

impl<E: RegistryEntity> Default for MemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: RegistryEntity> Repository<E> for MemoryRepository<E> {
    async fn save_specification(&self, mut entity: E) -> Result<Option<E>> {
        self.counters
            .save_specification
            .fetch_add(1, Ordering::Relaxed);
        let mut rows = self.write()?;

        match rows.entities.iter_mut().find(|row| row.key() == entity.key()) {
            Some(stored) => {
                // Status is only ever written by save_status
                let status = stored.status_mut().take();
                *entity.status_mut() = status;
                *stored = entity;
                Ok(Some(stored.clone()))
            }
            None => {
                let held = rows.pending_status.remove(entity.key());
                *entity.status_mut() = held;
                rows.entities.push(entity.clone());
                Ok(Some(entity))
            }
        }
    }

    async fn save_status(&self, entity: E) -> Result<Option<E>> {
        self.counters.save_status.fetch_add(1, Ordering::Relaxed);
        let mut rows = self.write()?;

        match rows.entities.iter_mut().find(|row| row.key() == entity.key()) {
            Some(stored) => {
                *stored.status_mut() = entity.status().cloned();
                Ok(Some(stored.clone()))
            }
            None => {
                // No specification to return; the caller's is never stored.
                match entity.status() {
                    Some(status) => {
                        rows.pending_status
                            .insert(entity.key().clone(), status.clone());
                    }
                    None => {
                        rows.pending_status.remove(entity.key());
                    }
                }
                Ok(None)
            }
        }
    }

    async fn find_by_id(&self, key: &E::Key) -> Result<Option<E>> {
        self.counters.find_by_id.fetch_add(1, Ordering::Relaxed);
        let rows = self.read()?;
        Ok(rows.entities.iter().find(|row| row.key() == key).cloned())
    }

    async fn find_all(&self) -> Result<Vec<E>> {
        self.counters.find_all.fetch_add(1, Ordering::Relaxed);
        let rows = self.read()?;
        Ok(rows.entities.clone())
    }

    async fn delete(&self, entity: &E) -> Result<()> {
        self.counters.delete.fetch_add(1, Ordering::Relaxed);
        let mut rows = self.write()?;
        rows.entities.retain(|row| row.key() != entity.key());
        rows.pending_status.remove(entity.key());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Specification, Status, Zone, ZoneKey};
    use serde_json::json;

    fn zone(name: &str, kind: &str) -> Zone {
        Zone::new(ZoneKey::new(name), Specification::of_type(kind))
    }

    #[tokio::test]
    async fn save_specification_keeps_stored_status() {
        let repo = MemoryRepository::new();
        repo.save_specification(zone("z1", "default")).await.unwrap();

        let mut observed = zone("z1", "default");
        observed.set_status(Status::new(json!({"healthy": true})));
        repo.save_status(observed).await.unwrap();

        let saved = repo
            .save_specification(zone("z1", "aws"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved.specification.kind, "aws");
        assert_eq!(saved.status, Some(Status::new(json!({"healthy": true}))));
    }

    #[tokio::test]
    async fn save_status_keeps_stored_specification() {
        let repo = MemoryRepository::new();
        repo.save_specification(zone("z1", "aws")).await.unwrap();

        let mut observed = zone("z1", "something-else");
        observed.set_status(Status::new(json!({"lag": 3})));
        let saved = repo.save_status(observed).await.unwrap().unwrap();

        assert_eq!(saved.specification.kind, "aws");
        assert_eq!(saved.status, Some(Status::new(json!({"lag": 3}))));
    }

    #[tokio::test]
    async fn save_specification_never_writes_status_on_insert() {
        let repo = MemoryRepository::new();
        let mut desired = zone("z1", "default");
        desired.set_status(Status::new(json!({"smuggled": true})));

        let saved = repo.save_specification(desired).await.unwrap().unwrap();
        assert!(saved.status.is_none());
    }

    #[tokio::test]
    async fn status_without_specification_is_held_aside() {
        let repo = MemoryRepository::new();
        let mut report = zone("z1", "unvalidated");
        report.set_status(Status::new(json!({"seen": true})));

        assert!(repo.save_status(report).await.unwrap().is_none());
        assert!(repo.find_by_id(&ZoneKey::new("z1")).await.unwrap().is_none());
        assert!(repo.find_all().await.unwrap().is_empty());
        assert_eq!(repo.pending_status_count(), 1);

        let saved = repo
            .save_specification(zone("z1", "default"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved.specification.kind, "default");
        assert_eq!(saved.status, Some(Status::new(json!({"seen": true}))));
        assert_eq!(repo.pending_status_count(), 0);
    }

    #[tokio::test]
    async fn delete_drops_held_status() {
        let repo = MemoryRepository::new();
        let mut report = zone("z1", "default");
        report.set_status(Status::new(json!({"seen": true})));
        repo.save_status(report.clone()).await.unwrap();

        repo.delete(&report).await.unwrap();
        let saved = repo
            .save_specification(zone("z1", "default"))
            .await
            .unwrap()
            .unwrap();
        assert!(saved.status.is_none());
    }

    #[tokio::test]
    async fn find_all_preserves_insertion_order() {
        let repo = MemoryRepository::new();
        for name in ["c", "a", "b"] {
            repo.save_specification(zone(name, "default")).await.unwrap();
        }
        let names: Vec<_> = repo
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|z| z.key.name)
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_counted() {
        let repo = MemoryRepository::new();
        let z = zone("z1", "default");
        repo.save_specification(z.clone()).await.unwrap();

        repo.delete(&z).await.unwrap();
        repo.delete(&z).await.unwrap();

        assert!(repo.find_by_id(&z.key).await.unwrap().is_none());
        assert_eq!(repo.counts().delete, 2);
        assert!(repo.is_empty());
    }
}
