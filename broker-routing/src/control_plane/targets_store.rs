/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Copy-on-write owner of the routing snapshot.

use arc_swap::ArcSwap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::control_plane::cell_tenant_mutation::{CellTenantCommit, CellTenantMutation};
use crate::observability::{events, fields};
use crate::routing::keys::{CellTenantKey, TargetKey};
use crate::routing::model::{CellTenant, ConfigValidationError, Target, TargetsConfig};

const COMPONENT: &str = "targets_store";

struct TargetsSnapshot {
    version: u64,
    config: Arc<TargetsConfig>,
}

/// [`TargetsStore`] holds the current routing snapshot behind a single atomic
/// pointer.
///
/// Readers load the pointer and never wait on writers. Writers are serialized
/// and publish a whole new snapshot per transaction, so a reader holding an
/// `Arc<TargetsConfig>` keeps a consistent view for as long as it holds it.
///
/// # Examples
///
/// ```
/// use broker_routing::{CellTenantKey, Queue, Target, TargetsStore};
///
/// let store = TargetsStore::empty();
/// let key = CellTenantKey::broker("ns", "broker");
///
/// store.mutate_cell_tenant(&key, |m| {
///     m.set_id("b-uid").set_decouple_queue(Queue::new("topic", "sub"));
///     m.upsert_targets([Target {
///         name: "t1".to_string(),
///         ..Default::default()
///     }]);
/// });
///
/// let broker = store.get_cell_tenant_by_key(&key).unwrap();
/// assert_eq!(broker.id, "b-uid");
/// assert!(store.get_target_by_key(&key.target_key("t1")).is_some());
///
/// store.mutate_cell_tenant(&key, |m| m.delete());
/// assert!(store.get_cell_tenant_by_key(&key).is_none());
/// ```
pub struct TargetsStore {
    snapshot: ArcSwap<TargetsSnapshot>,
    writer: Mutex<()>,
    changes: watch::Sender<u64>,
}

impl TargetsStore {
    fn with_snapshot(config: TargetsConfig) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            snapshot: ArcSwap::from_pointee(TargetsSnapshot {
                version: 0,
                config: Arc::new(config),
            }),
            writer: Mutex::new(()),
            changes,
        }
    }

    /// Creates a store with no cell tenants.
    pub fn empty() -> Self {
        Self::with_snapshot(TargetsConfig::default())
    }

    /// Creates a store seeded with a validated snapshot.
    pub fn from_config(config: TargetsConfig) -> Result<Self, ConfigValidationError> {
        config.validate()?;
        Ok(Self::with_snapshot(config))
    }

    /// Returns the current snapshot.
    pub fn load(&self) -> Arc<TargetsConfig> {
        self.snapshot.load().config.clone()
    }

    /// Version of the current snapshot; bumped by every commit.
    pub fn version(&self) -> u64 {
        self.snapshot.load().version
    }

    /// Receives the version of every committed snapshot.
    pub fn subscribe_changes(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    pub fn get_cell_tenant_by_key(&self, key: &CellTenantKey) -> Option<Arc<CellTenant>> {
        self.snapshot.load().config.cell_tenant(key).cloned()
    }

    pub fn get_target_by_key(&self, key: &TargetKey) -> Option<Target> {
        self.snapshot.load().config.target(key).cloned()
    }

    /// Visits cell tenants of the current snapshot until `f` returns `false`.
    pub fn range_cell_tenants(&self, mut f: impl FnMut(&CellTenant) -> bool) {
        let snapshot = self.snapshot.load_full();
        for cell_tenant in snapshot.config.cell_tenants.values() {
            if !f(cell_tenant) {
                return;
            }
        }
    }

    /// Visits every target of the current snapshot until `f` returns `false`.
    pub fn range_all_targets(&self, mut f: impl FnMut(&Target) -> bool) {
        let snapshot = self.snapshot.load_full();
        for cell_tenant in snapshot.config.cell_tenants.values() {
            for target in cell_tenant.targets.values() {
                if !f(target) {
                    return;
                }
            }
        }
    }

    /// Runs one transaction against the cell tenant identified by `key`.
    ///
    /// The cell tenant starts as an empty shell when absent. The edited result
    /// (or its removal) is published atomically once `f` returns.
    pub fn mutate_cell_tenant(&self, key: &CellTenantKey, f: impl FnOnce(&mut CellTenantMutation)) {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.snapshot.load_full();
        let persisted = key.persistence_string();

        let mut mutation = CellTenantMutation::new(
            key.clone(),
            current.config.cell_tenants.get(&persisted).map(Arc::as_ref),
        );
        f(&mut mutation);

        let mut cell_tenants = current.config.cell_tenants.clone();
        let (outcome, target_count) = match mutation.into_commit() {
            CellTenantCommit::Remove => match cell_tenants.remove(&persisted) {
                Some(_) => (fields::OUTCOME_REMOVED, 0),
                None => (fields::OUTCOME_NOOP, 0),
            },
            CellTenantCommit::Upsert(cell_tenant) => {
                let target_count = cell_tenant.targets.len();
                cell_tenants.insert(persisted, Arc::new(cell_tenant));
                (fields::OUTCOME_UPSERTED, target_count)
            }
        };

        let version = current.version + 1;
        self.snapshot.store(Arc::new(TargetsSnapshot {
            version,
            config: Arc::new(TargetsConfig { cell_tenants }),
        }));
        self.changes.send_replace(version);

        debug!(
            event = events::TARGETS_STORE_COMMIT,
            component = COMPONENT,
            cell_tenant = %key,
            outcome,
            target_count,
            snapshot_version = version,
            "committed cell tenant transaction"
        );
    }

    /// Replaces the whole snapshot, e.g. after an external watcher reloaded it.
    pub fn replace_snapshot(&self, config: TargetsConfig) -> Result<(), ConfigValidationError> {
        config.validate()?;

        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let version = self.snapshot.load().version + 1;
        let cell_tenant_count = config.cell_tenants.len();
        self.snapshot.store(Arc::new(TargetsSnapshot {
            version,
            config: Arc::new(config),
        }));
        self.changes.send_replace(version);

        info!(
            event = events::TARGETS_STORE_SNAPSHOT_REPLACED,
            component = COMPONENT,
            cell_tenant_count,
            snapshot_version = version,
            "replaced routing snapshot"
        );
        Ok(())
    }
}

impl Default for TargetsStore {
    fn default() -> Self {
        Self::empty()
    }
}
