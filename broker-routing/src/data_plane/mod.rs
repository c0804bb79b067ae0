//! Data-plane layer.
//!
//! Per-event handler stages: the request-scoped [`HandlerContext`], the
//! [`Processor`] chain abstraction and the attribute [`FilterProcessor`].
//!
//! ```
//! use std::sync::Arc;
//! use broker_routing::{
//!     chain_processors, CellTenantKey, Event, FilterProcessor, HandlerContext, PassThrough,
//!     Processor, Target, TargetsStore,
//! };
//! use std::collections::HashMap;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = Arc::new(TargetsStore::empty());
//! let key = CellTenantKey::broker("ns", "broker");
//! store.mutate_cell_tenant(&key, |m| {
//!     m.upsert_targets([Target {
//!         name: "t1".to_string(),
//!         filter_attributes: HashMap::from([("app".to_string(), "foo".to_string())]),
//!         ..Default::default()
//!     }]);
//! });
//!
//! let stages: Vec<Box<dyn Processor>> = vec![
//!     Box::new(FilterProcessor::new(store.clone())),
//!     Box::new(PassThrough::new()),
//! ];
//! let chain = chain_processors(stages).unwrap();
//!
//! let ctx = HandlerContext::new().with_target_key(key.target_key("t1"));
//! let event = Event::new().with_id("id").with_extension("app", "foo");
//! chain.process(&ctx, &event).await.unwrap();
//! # });
//! ```
//!
//! [`HandlerContext`]: crate::HandlerContext
//! [`Processor`]: crate::Processor
//! [`FilterProcessor`]: crate::FilterProcessor

pub(crate) mod filter_processor;
pub(crate) mod handler_context;
pub(crate) mod processor;
pub(crate) mod trace_context;
