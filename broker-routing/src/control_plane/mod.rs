//! Control-plane layer.
//!
//! Owns the routing snapshot and the transaction protocol reconcilers use to
//! project cluster state into it. Writers are serialized; readers load the
//! current snapshot without taking the writer lock.
//!
//! ```
//! use broker_routing::{CellTenantKey, State, Target, TargetsStore};
//!
//! let store = TargetsStore::empty();
//! let key = CellTenantKey::broker("ns", "broker");
//!
//! // Delete resets the cell tenant; later edits in the same transaction rebuild it.
//! store.mutate_cell_tenant(&key, |m| {
//!     m.delete();
//!     m.set_state(State::Ready).upsert_targets([Target {
//!         name: "t1".to_string(),
//!         ..Default::default()
//!     }]);
//! });
//! assert_eq!(store.load().target_count(), 1);
//!
//! // Delete as the final call removes the cell tenant with all its targets.
//! store.mutate_cell_tenant(&key, |m| {
//!     m.set_address("broker.example.com");
//!     m.delete();
//! });
//! assert!(store.get_cell_tenant_by_key(&key).is_none());
//! ```

pub(crate) mod cell_tenant_mutation;
pub(crate) mod targets_store;
