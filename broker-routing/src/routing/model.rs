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

//! Routing snapshot data model: cell tenants, their targets and backing queues.

use crate::routing::keys::{CellTenantKey, CellTenantType, TargetKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Readiness of a cell tenant or target.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    #[default]
    Unknown,
    Ready,
}

/// Pub/Sub topic and subscription pair.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Queue {
    pub topic: String,
    pub subscription: String,
}

impl Queue {
    pub fn new(topic: impl Into<String>, subscription: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            subscription: subscription.into(),
        }
    }
}

/// A subscriber inside a cell tenant.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Target {
    pub id: String,
    pub name: String,
    pub namespace: String,
    pub cell_tenant_type: CellTenantType,
    pub cell_tenant_name: String,
    pub address: String,
    pub filter_attributes: HashMap<String, String>,
    pub retry_queue: Option<Queue>,
    pub state: State,
}

impl Target {
    pub fn key(&self) -> TargetKey {
        TargetKey::new(
            self.cell_tenant_type,
            self.namespace.as_str(),
            self.cell_tenant_name.as_str(),
            self.name.as_str(),
        )
    }
}

/// A routing scope (broker or channel) and its targets keyed by name.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CellTenant {
    #[serde(rename = "type")]
    pub cell_tenant_type: CellTenantType,
    pub id: String,
    pub namespace: String,
    pub name: String,
    pub address: String,
    pub decouple_queue: Option<Queue>,
    pub state: State,
    pub targets: HashMap<String, Target>,
}

impl CellTenant {
    /// Creates an empty cell tenant carrying only its identity fields.
    pub fn empty(key: &CellTenantKey) -> Self {
        Self {
            cell_tenant_type: key.cell_tenant_type(),
            namespace: key.namespace().to_string(),
            name: key.name().to_string(),
            ..Default::default()
        }
    }

    pub fn key(&self) -> CellTenantKey {
        CellTenantKey::new(
            self.cell_tenant_type,
            self.namespace.as_str(),
            self.name.as_str(),
        )
    }
}

/// Broken snapshot invariants reported by [`TargetsConfig::validate`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigValidationError {
    CellTenantKeyMismatch {
        map_key: String,
        cell_tenant_key: String,
    },
    TargetNameMismatch {
        cell_tenant_key: String,
        map_key: String,
        target_name: String,
    },
    TargetParentMismatch {
        cell_tenant_key: String,
        target_key: String,
    },
}

impl Display for ConfigValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigValidationError::CellTenantKeyMismatch {
                map_key,
                cell_tenant_key,
            } => write!(
                f,
                "cell tenant stored under '{map_key}' identifies itself as '{cell_tenant_key}'"
            ),
            ConfigValidationError::TargetNameMismatch {
                cell_tenant_key,
                map_key,
                target_name,
            } => write!(
                f,
                "target '{target_name}' of '{cell_tenant_key}' is stored under '{map_key}'"
            ),
            ConfigValidationError::TargetParentMismatch {
                cell_tenant_key,
                target_key,
            } => write!(
                f,
                "target '{target_key}' does not belong to cell tenant '{cell_tenant_key}'"
            ),
        }
    }
}

impl Error for ConfigValidationError {}

/// Full routing snapshot keyed by cell tenant persistence string.
///
/// Cell tenants are shared behind [`Arc`] so that successive snapshots only
/// copy the entry that changed.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetsConfig {
    pub cell_tenants: HashMap<String, Arc<CellTenant>>,
}

impl TargetsConfig {
    pub fn cell_tenant(&self, key: &CellTenantKey) -> Option<&Arc<CellTenant>> {
        self.cell_tenants.get(&key.persistence_string())
    }

    pub fn target(&self, key: &TargetKey) -> Option<&Target> {
        self.cell_tenant(key.parent_key())
            .and_then(|cell_tenant| cell_tenant.targets.get(key.name()))
    }

    pub fn target_count(&self) -> usize {
        self.cell_tenants
            .values()
            .map(|cell_tenant| cell_tenant.targets.len())
            .sum()
    }

    /// Checks that map keys and target back-references agree with identities.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for (map_key, cell_tenant) in &self.cell_tenants {
            let cell_tenant_key = cell_tenant.key();
            let persisted = cell_tenant_key.persistence_string();
            if &persisted != map_key {
                return Err(ConfigValidationError::CellTenantKeyMismatch {
                    map_key: map_key.clone(),
                    cell_tenant_key: persisted,
                });
            }

            for (target_map_key, target) in &cell_tenant.targets {
                if target_map_key != &target.name {
                    return Err(ConfigValidationError::TargetNameMismatch {
                        cell_tenant_key: persisted,
                        map_key: target_map_key.clone(),
                        target_name: target.name.clone(),
                    });
                }

                let target_key = target.key();
                if target_key.parent_key() != &cell_tenant_key {
                    return Err(ConfigValidationError::TargetParentMismatch {
                        cell_tenant_key: persisted,
                        target_key: target_key.persistence_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{CellTenant, ConfigValidationError, Target, TargetsConfig};
    use crate::routing::keys::{CellTenantKey, CellTenantType};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn target(name: &str, cell_tenant_name: &str) -> Target {
        Target {
            name: name.to_string(),
            namespace: "ns".to_string(),
            cell_tenant_type: CellTenantType::Broker,
            cell_tenant_name: cell_tenant_name.to_string(),
            ..Default::default()
        }
    }

    fn config_with(map_key: &str, cell_tenant: CellTenant) -> TargetsConfig {
        TargetsConfig {
            cell_tenants: HashMap::from([(map_key.to_string(), Arc::new(cell_tenant))]),
        }
    }

    #[test]
    fn empty_cell_tenant_carries_only_identity() {
        let key = CellTenantKey::channel("ns", "chan");
        let cell_tenant = CellTenant::empty(&key);

        assert_eq!(cell_tenant.key(), key);
        assert!(cell_tenant.id.is_empty());
        assert!(cell_tenant.decouple_queue.is_none());
        assert!(cell_tenant.targets.is_empty());
    }

    #[test]
    fn validate_accepts_consistent_snapshot() {
        let mut cell_tenant = CellTenant::empty(&CellTenantKey::broker("ns", "broker"));
        cell_tenant
            .targets
            .insert("t1".to_string(), target("t1", "broker"));
        let config = config_with("broker/ns/broker", cell_tenant);

        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.target_count(), 1);
    }

    #[test]
    fn validate_rejects_misfiled_cell_tenant() {
        let cell_tenant = CellTenant::empty(&CellTenantKey::broker("ns", "broker"));
        let config = config_with("broker/ns/other", cell_tenant);

        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::CellTenantKeyMismatch { .. })
        ));
    }

    #[test]
    fn validate_rejects_target_with_foreign_parent() {
        let mut cell_tenant = CellTenant::empty(&CellTenantKey::broker("ns", "broker"));
        cell_tenant
            .targets
            .insert("t1".to_string(), target("t1", "other-broker"));
        let config = config_with("broker/ns/broker", cell_tenant);

        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::TargetParentMismatch { .. })
        ));
    }

    #[test]
    fn validate_rejects_target_under_wrong_name() {
        let mut cell_tenant = CellTenant::empty(&CellTenantKey::broker("ns", "broker"));
        cell_tenant
            .targets
            .insert("t2".to_string(), target("t1", "broker"));
        let config = config_with("broker/ns/broker", cell_tenant);

        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::TargetNameMismatch { .. })
        ));
    }

    #[test]
    fn snapshot_deserializes_from_json() {
        let config: TargetsConfig = serde_json::from_str(
            r#"{
                "cell_tenants": {
                    "broker/ns/broker": {
                        "type": "broker",
                        "id": "b-uid",
                        "namespace": "ns",
                        "name": "broker",
                        "decouple_queue": { "topic": "topic", "subscription": "sub" },
                        "state": "ready",
                        "targets": {
                            "t1": {
                                "name": "t1",
                                "namespace": "ns",
                                "cell_tenant_name": "broker",
                                "filter_attributes": { "app": "foo" }
                            }
                        }
                    }
                }
            }"#,
        )
        .expect("snapshot should deserialize");

        assert_eq!(config.validate(), Ok(()));
        let target = config
            .target(&CellTenantKey::broker("ns", "broker").target_key("t1"))
            .expect("target should exist");
        assert_eq!(target.filter_attributes.get("app").map(String::as_str), Some("foo"));
    }
}
