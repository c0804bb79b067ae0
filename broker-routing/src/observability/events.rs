//! Canonical structured event names used across `broker-routing`.

// Targets store events.
pub const TARGETS_STORE_COMMIT: &str = "targets_store_commit";
pub const TARGETS_STORE_SNAPSHOT_REPLACED: &str = "targets_store_snapshot_replaced";
pub const CELL_TENANT_ID_CHANGE_IGNORED: &str = "cell_tenant_id_change_ignored";

// Handler pipeline events.
pub const FILTER_PASS: &str = "filter_pass";
pub const FILTER_DROP: &str = "filter_drop";
pub const FILTER_LOOKUP_FAILED: &str = "filter_lookup_failed";
pub const TRACE_PARENT_INVALID: &str = "trace_parent_invalid";
