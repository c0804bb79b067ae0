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

//! Transaction-scoped edit state for one cell tenant.

use crate::observability::events;
use crate::routing::keys::CellTenantKey;
use crate::routing::model::{CellTenant, Queue, State, Target};
use tracing::warn;

const COMPONENT: &str = "cell_tenant_mutation";

/// Net result of a mutation transaction, decided once the callback returns.
#[derive(Debug)]
pub(crate) enum CellTenantCommit {
    Remove,
    Upsert(CellTenant),
}

/// Handle handed to [`TargetsStore::mutate_cell_tenant`] callbacks.
///
/// Edits apply in call order. [`CellTenantMutation::delete`] resets the edit
/// to an empty cell tenant and marks it removed; any later edit in the same
/// transaction clears the mark and keeps building on the reset state.
///
/// [`TargetsStore::mutate_cell_tenant`]: crate::TargetsStore::mutate_cell_tenant
#[derive(Debug)]
pub struct CellTenantMutation {
    key: CellTenantKey,
    cell_tenant: CellTenant,
    removed: bool,
}

impl CellTenantMutation {
    pub(crate) fn new(key: CellTenantKey, existing: Option<&CellTenant>) -> Self {
        let cell_tenant = existing
            .cloned()
            .unwrap_or_else(|| CellTenant::empty(&key));
        Self {
            key,
            cell_tenant,
            removed: false,
        }
    }

    pub fn key(&self) -> &CellTenantKey {
        &self.key
    }

    /// Assigns the cell tenant id. An id that is already assigned is kept.
    pub fn set_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.removed = false;
        let id = id.into();
        if !self.cell_tenant.id.is_empty() && self.cell_tenant.id != id {
            warn!(
                event = events::CELL_TENANT_ID_CHANGE_IGNORED,
                component = COMPONENT,
                cell_tenant = %self.key,
                current_id = self.cell_tenant.id.as_str(),
                requested_id = id.as_str(),
                "cell tenant id is immutable once assigned"
            );
            return self;
        }
        self.cell_tenant.id = id;
        self
    }

    pub fn set_address(&mut self, address: impl Into<String>) -> &mut Self {
        self.removed = false;
        self.cell_tenant.address = address.into();
        self
    }

    pub fn set_state(&mut self, state: State) -> &mut Self {
        self.removed = false;
        self.cell_tenant.state = state;
        self
    }

    pub fn set_decouple_queue(&mut self, queue: impl Into<Option<Queue>>) -> &mut Self {
        self.removed = false;
        self.cell_tenant.decouple_queue = queue.into();
        self
    }

    /// Inserts or replaces targets by name.
    ///
    /// Back-reference fields are overwritten with this cell tenant's identity.
    pub fn upsert_targets(&mut self, targets: impl IntoIterator<Item = Target>) -> &mut Self {
        self.removed = false;
        for mut target in targets {
            target.namespace = self.key.namespace().to_string();
            target.cell_tenant_type = self.key.cell_tenant_type();
            target.cell_tenant_name = self.key.name().to_string();
            self.cell_tenant.targets.insert(target.name.clone(), target);
        }
        self
    }

    /// Removes targets by name. Unknown names are ignored.
    pub fn delete_targets<'t>(&mut self, targets: impl IntoIterator<Item = &'t Target>) -> &mut Self {
        self.delete_targets_by_name(targets.into_iter().map(|target| target.name.as_str()))
    }

    pub fn delete_targets_by_name<'n>(
        &mut self,
        names: impl IntoIterator<Item = &'n str>,
    ) -> &mut Self {
        self.removed = false;
        for name in names {
            self.cell_tenant.targets.remove(name);
        }
        self
    }

    /// Marks the cell tenant for removal at the end of the transaction.
    pub fn delete(&mut self) {
        self.cell_tenant = CellTenant::empty(&self.key);
        self.removed = true;
    }

    pub(crate) fn into_commit(self) -> CellTenantCommit {
        if self.removed {
            CellTenantCommit::Remove
        } else {
            CellTenantCommit::Upsert(self.cell_tenant)
        }
    }
}
