use async_trait::async_trait;
use broker_routing::{
    CellTenantKey, Event, HandlerContext, PassThrough, ProcessError, Processor, State, Target,
    TargetsStore,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[allow(dead_code)]
pub(crate) const TRACE_ID: &str = "4bf92f3577b34da6a3ce929d0e0e4736";
#[allow(dead_code)]
pub(crate) const SPAN_ID: &str = "00f067aa0ba902b7";

pub(crate) fn broker_key() -> CellTenantKey {
    CellTenantKey::broker("ns", "broker")
}

pub(crate) fn target(name: &str, filter: &[(&str, &str)]) -> Target {
    Target {
        id: format!("uid-{name}"),
        name: name.to_string(),
        address: format!("{name}.ns.svc.cluster.local"),
        filter_attributes: filter
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>(),
        state: State::Ready,
        ..Default::default()
    }
}

#[allow(dead_code)]
pub(crate) fn store_with_targets(targets: Vec<Target>) -> Arc<TargetsStore> {
    let store = Arc::new(TargetsStore::empty());
    store.mutate_cell_tenant(&broker_key(), |m| {
        m.set_id("b-uid")
            .set_address("broker.ns.svc.cluster.local")
            .set_state(State::Ready)
            .upsert_targets(targets);
    });
    store
}

/// Terminal stage that records what reached the end of the chain.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub(crate) struct Delivered {
    base: PassThrough,
    events: Arc<Mutex<Vec<(HandlerContext, Event)>>>,
}

#[allow(dead_code)]
impl Delivered {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub(crate) fn events(&self) -> Vec<(HandlerContext, Event)> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Processor for Delivered {
    async fn process(&self, ctx: &HandlerContext, event: &Event) -> Result<(), ProcessError> {
        self.events
            .lock()
            .unwrap()
            .push((ctx.clone(), event.clone()));
        self.base.forward(ctx, event).await
    }

    fn with_next(&mut self, next: Arc<dyn Processor>) {
        self.base.with_next(next);
    }
}
