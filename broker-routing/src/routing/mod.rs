//! Routing identity and snapshot model.
//!
//! Keys are plain values: a [`TargetKey`] reconstructs its parent
//! [`CellTenantKey`] without consulting any mapping.
//!
//! ```
//! use broker_routing::{CellTenantKey, CellTenantType, TargetKey};
//!
//! let key = TargetKey::new(CellTenantType::Channel, "ns", "chan", "sub");
//! assert_eq!(key.parent_key(), &CellTenantKey::channel("ns", "chan"));
//! assert_eq!(key.parent_key().persistence_string(), "channel/ns/chan");
//! ```
//!
//! [`TargetKey`]: crate::TargetKey
//! [`CellTenantKey`]: crate::CellTenantKey

pub(crate) mod keys;
pub(crate) mod model;
