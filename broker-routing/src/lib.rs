/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
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

//! # broker-routing
//!
//! `broker-routing` is the routing core of a Pub/Sub-backed event broker: it owns the
//! in-memory mapping from brokers and channels (cell tenants) to their subscribers
//! (targets), and the per-event processor chain that decides whether an event is
//! forwarded to a target.
//!
//! Typical usage is centered on [`TargetsStore`] for routing state and on
//! [`Processor`] chains for event handling.
//!
//! ## Reconciler-side writes
//!
//! ```
//! use broker_routing::{CellTenantKey, Queue, State, Target, TargetsStore};
//! use std::collections::HashMap;
//!
//! let store = TargetsStore::empty();
//! let key = CellTenantKey::broker("ns", "broker");
//!
//! store.mutate_cell_tenant(&key, |m| {
//!     m.set_id("b-uid")
//!         .set_address("broker.example.com")
//!         .set_state(State::Ready)
//!         .set_decouple_queue(Queue::new("topic", "sub"));
//!     m.upsert_targets([
//!         Target {
//!             name: "t1".to_string(),
//!             filter_attributes: HashMap::from([("app".to_string(), "foo".to_string())]),
//!             ..Default::default()
//!         },
//!         Target {
//!             name: "t2".to_string(),
//!             filter_attributes: HashMap::from([("app".to_string(), "bar".to_string())]),
//!             ..Default::default()
//!         },
//!     ]);
//! });
//!
//! let mut names = Vec::new();
//! store.range_all_targets(|target| {
//!     names.push(target.name.clone());
//!     true
//! });
//! names.sort();
//! assert_eq!(names, vec!["t1", "t2"]);
//! ```
//!
//! ## Dispatcher-side filtering
//!
//! ```
//! use std::sync::Arc;
//! use broker_routing::{
//!     CellTenantKey, ContextError, Event, FilterProcessor, HandlerContext, ProcessError,
//!     Processor, Target, TargetsStore,
//! };
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = Arc::new(TargetsStore::empty());
//! let key = CellTenantKey::broker("ns", "broker");
//! store.mutate_cell_tenant(&key, |m| {
//!     m.upsert_targets([Target {
//!         name: "t1".to_string(),
//!         ..Default::default()
//!     }]);
//! });
//!
//! let filter = FilterProcessor::new(store);
//! let ctx = HandlerContext::new().with_target_key(key.target_key("t1"));
//! assert!(filter.process(&ctx, &Event::new()).await.is_ok());
//!
//! // A dispatcher that forgot to resolve the target is a wiring bug, not a drop.
//! assert!(matches!(
//!     filter.process(&HandlerContext::new(), &Event::new()).await,
//!     Err(ProcessError::MissingContext(ContextError::TargetKeyNotPresent))
//! ));
//! # });
//! ```
//!
//! ## Internal architecture map
//!
//! - Routing: identity keys and the serializable snapshot model
//! - Control plane: the copy-on-write targets store and its mutation transactions
//! - Data plane: handler context, processor chaining, trace extraction and filtering
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events.
//! Library code emits events/spans and does not unconditionally initialize a global
//! subscriber. Binaries and tests are responsible for one-time
//! `tracing_subscriber` initialization at process boundaries.

mod control_plane;
pub use control_plane::cell_tenant_mutation::CellTenantMutation;
pub use control_plane::targets_store::TargetsStore;

mod data_plane;
pub use data_plane::filter_processor::{evaluate_filter, FilterProcessor, FilterVerdict};
pub use data_plane::handler_context::{ContextError, HandlerContext};
pub use data_plane::processor::{chain_processors, PassThrough, ProcessError, Processor};
pub use data_plane::trace_context::{extract_trace_context, parse_trace_parent, TraceParentError};

mod event;
pub use event::{format_time, Event, ExtensionValue, SpecVersion, TRACE_PARENT_EXTENSION};

#[doc(hidden)]
pub mod observability;

mod routing;
pub use routing::keys::{CellTenantKey, CellTenantType, KeyParseError, TargetKey};
pub use routing::model::{
    CellTenant, ConfigValidationError, Queue, State, Target, TargetsConfig,
};
