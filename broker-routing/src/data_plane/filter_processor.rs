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

//! Attribute-filter stage gating delivery to one target.

use crate::control_plane::targets_store::TargetsStore;
use crate::data_plane::handler_context::HandlerContext;
use crate::data_plane::processor::{PassThrough, ProcessError, Processor};
use crate::data_plane::trace_context::{extract_trace_context, start_child_span};
use crate::event::Event;
use crate::observability::{events, fields};
use crate::routing::keys::TargetKey;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, field, info_span, Instrument, Level};

const COMPONENT: &str = "filter_processor";

/// Outcome of matching an event against a target's filter attributes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FilterVerdict {
    Pass,
    MissingAttribute(String),
    ValueMismatch(String),
}

impl FilterVerdict {
    pub fn passed(&self) -> bool {
        matches!(self, FilterVerdict::Pass)
    }
}

/// Every filter entry must name an attribute present on the event with an
/// identical string value. An empty filter passes everything.
pub fn evaluate_filter(filter: &HashMap<String, String>, event: &Event) -> FilterVerdict {
    for (attribute, expected) in filter {
        match event.attribute(attribute) {
            None => return FilterVerdict::MissingAttribute(attribute.clone()),
            Some(actual) if actual != expected.as_str() => {
                return FilterVerdict::ValueMismatch(attribute.clone())
            }
            Some(_) => {}
        }
    }
    FilterVerdict::Pass
}

/// Forwards an event only when it satisfies the filter of the target named
/// by the handler context.
///
/// A target (or its cell tenant) missing from the store is reported as an
/// error rather than treated as an empty filter.
pub struct FilterProcessor {
    base: PassThrough,
    targets: Arc<TargetsStore>,
}

impl FilterProcessor {
    pub fn new(targets: Arc<TargetsStore>) -> Self {
        Self {
            base: PassThrough::new(),
            targets,
        }
    }

    fn verdict_for(&self, target_key: &TargetKey, event: &Event) -> Result<FilterVerdict, ProcessError> {
        let snapshot = self.targets.load();
        let cell_tenant = snapshot
            .cell_tenant(target_key.parent_key())
            .ok_or_else(|| ProcessError::CellTenantNotFound(target_key.parent_key().clone()))?;
        let target = cell_tenant
            .targets
            .get(target_key.name())
            .ok_or_else(|| ProcessError::TargetNotFound(target_key.clone()))?;

        Ok(evaluate_filter(&target.filter_attributes, event))
    }

    async fn filter_and_forward(
        &self,
        target_key: &TargetKey,
        ctx: &HandlerContext,
        event: &Event,
    ) -> Result<(), ProcessError> {
        let verdict = match self.verdict_for(target_key, event) {
            Ok(verdict) => verdict,
            Err(err) => {
                debug!(
                    event = events::FILTER_LOOKUP_FAILED,
                    component = COMPONENT,
                    target_key = %target_key,
                    err = %err,
                    "target lookup failed"
                );
                return Err(err);
            }
        };

        let (attribute, reason) = match verdict {
            FilterVerdict::Pass => {
                if tracing::enabled!(Level::DEBUG) {
                    debug!(
                        event = events::FILTER_PASS,
                        component = COMPONENT,
                        target_key = %target_key,
                        event_id = fields::format_event_id(event),
                        event_type = fields::format_event_type(event),
                        "event passed target filter"
                    );
                }
                return self.base.forward(ctx, event).await;
            }
            FilterVerdict::MissingAttribute(attribute) => {
                (attribute, fields::REASON_MISSING_ATTRIBUTE)
            }
            FilterVerdict::ValueMismatch(attribute) => (attribute, fields::REASON_VALUE_MISMATCH),
        };

        debug!(
            event = events::FILTER_DROP,
            component = COMPONENT,
            target_key = %target_key,
            event_id = fields::format_event_id(event),
            event_type = fields::format_event_type(event),
            attribute = attribute.as_str(),
            reason,
            "event dropped by target filter"
        );
        Ok(())
    }
}

#[async_trait]
impl Processor for FilterProcessor {
    async fn process(&self, ctx: &HandlerContext, event: &Event) -> Result<(), ProcessError> {
        let target_key = ctx.target_key()?;

        let span = info_span!(
            "filter_processor",
            target_key = %target_key,
            trace_id = field::Empty,
            span_id = field::Empty,
        );

        let traced_ctx;
        let ctx = match extract_trace_context(event) {
            Some(Ok(parent)) => {
                let span_context = start_child_span(&span, parent);
                span.record(fields::TRACE_ID, field::display(span_context.trace_id()));
                span.record(fields::SPAN_ID, field::display(span_context.span_id()));
                traced_ctx = ctx.clone().with_trace_context(span_context);
                &traced_ctx
            }
            Some(Err(err)) => {
                debug!(
                    event = events::TRACE_PARENT_INVALID,
                    component = COMPONENT,
                    target_key = %target_key,
                    err = %err,
                    "ignoring invalid traceparent"
                );
                ctx
            }
            None => ctx,
        };

        self.filter_and_forward(target_key, ctx, event)
            .instrument(span)
            .await
    }

    fn with_next(&mut self, next: Arc<dyn Processor>) {
        self.base.with_next(next);
    }
}

#[cfg(test)]
mod tests {
    use super::{evaluate_filter, FilterProcessor, FilterVerdict};
    use crate::control_plane::targets_store::TargetsStore;
    use crate::data_plane::handler_context::{ContextError, HandlerContext};
    use crate::data_plane::processor::fake::RecordingProcessor;
    use crate::data_plane::processor::{ProcessError, Processor};
    use crate::event::{format_time, Event, SpecVersion};
    use crate::routing::keys::{CellTenantKey, CellTenantType, TargetKey};
    use crate::routing::model::Target;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use opentelemetry::trace::{TraceContextExt, TracerProvider as _};
    use opentelemetry_sdk::trace::TracerProvider as SdkTracerProvider;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tracing_opentelemetry::OpenTelemetrySpanExt;
    use tracing_subscriber::layer::SubscriberExt;

    const TRACE_ID: &str = "4bf92f3577b34da6a3ce929d0e0e4736";
    const SPAN_ID: &str = "00f067aa0ba902b7";

    fn filter(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn new_test_targets(filter: HashMap<String, String>) -> (HandlerContext, Arc<TargetsStore>) {
        let key = CellTenantKey::broker("ns", "broker");
        let store = Arc::new(TargetsStore::empty());
        store.mutate_cell_tenant(&key, |m| {
            m.upsert_targets([Target {
                name: "target".to_string(),
                filter_attributes: filter,
                ..Default::default()
            }]);
        });
        let ctx = HandlerContext::new().with_target_key(key.target_key("target"));
        (ctx, store)
    }

    async fn passes(event: Event, filter: HashMap<String, String>) -> bool {
        let (ctx, store) = new_test_targets(filter);
        let next = RecordingProcessor::new();
        let mut processor = FilterProcessor::new(store);
        processor.with_next(Arc::new(next.clone()));

        processor
            .process(&ctx, &event)
            .await
            .expect("filtering should not fail");

        let received = next.received();
        if let Some((_, forwarded)) = received.first() {
            assert_eq!(forwarded, &event);
        }
        !received.is_empty()
    }

    #[tokio::test]
    async fn missing_target_key_is_an_error_and_never_forwards() {
        let next = RecordingProcessor::new();
        let mut processor = FilterProcessor::new(Arc::new(TargetsStore::empty()));
        processor.with_next(Arc::new(next.clone()));

        let err = processor
            .process(&HandlerContext::new(), &Event::new())
            .await
            .expect_err("missing key should fail");

        assert!(matches!(
            err,
            ProcessError::MissingContext(ContextError::TargetKeyNotPresent)
        ));
        assert!(next.received().is_empty());
    }

    #[tokio::test]
    async fn no_filter_passes() {
        let event = Event::new().with_id("id").with_subject("foo").with_type("bar");

        assert!(passes(event, HashMap::new()).await);
    }

    #[tokio::test]
    async fn spec_version_filter() {
        let event = Event::with_spec_version(SpecVersion::V10);

        assert!(passes(event.clone(), filter(&[("specversion", "1.0")])).await);
        assert!(!passes(event, filter(&[("specversion", "0.3")])).await);
    }

    #[tokio::test]
    async fn single_attribute_filters() {
        let cases: Vec<(&str, Event)> = vec![
            ("type", Event::new().with_type("foo")),
            ("source", Event::new().with_source("foo")),
            ("subject", Event::new().with_subject("foo")),
            ("datacontenttype", Event::new().with_data_content_type("foo")),
            ("dataschema", Event::new().with_data_schema("foo")),
            ("schemaurl", Event::new().with_data_schema("foo")),
            ("app", Event::new().with_extension("app", "foo")),
        ];

        for (attribute, event) in cases {
            assert!(
                passes(event.clone(), filter(&[(attribute, "foo")])).await,
                "{attribute} should match"
            );
            assert!(
                !passes(event, filter(&[(attribute, "bar")])).await,
                "{attribute} should not match"
            );
        }
    }

    #[tokio::test]
    async fn time_compares_by_string_form() {
        let now = Utc::now();
        let event = Event::new().with_time(now);
        let same = format_time(&now);
        let later = format_time(&(now + Duration::hours(1)));

        assert!(passes(event.clone(), filter(&[("time", same.as_str())])).await);
        assert!(!passes(event, filter(&[("time", later.as_str())])).await);
    }

    #[tokio::test]
    async fn mixed_filter_requires_every_entry() {
        let event = Event::new()
            .with_id("id")
            .with_source("foo")
            .with_type("bar")
            .with_subject("subject");

        assert!(passes(event.clone(), filter(&[("id", "id"), ("subject", "subject")])).await);
        assert!(
            !passes(
                event,
                filter(&[("id", "id"), ("subject", "subject"), ("source", "unknown")])
            )
            .await
        );
    }

    #[test]
    fn verdict_distinguishes_missing_from_mismatch() {
        let event = Event::new().with_extension("app", "foo");

        assert_eq!(
            evaluate_filter(&filter(&[("team", "a")]), &event),
            FilterVerdict::MissingAttribute("team".to_string())
        );
        assert_eq!(
            evaluate_filter(&filter(&[("app", "bar")]), &event),
            FilterVerdict::ValueMismatch("app".to_string())
        );
        assert!(evaluate_filter(&filter(&[("app", "foo")]), &event).passed());
    }

    struct VerifyTraceId {
        want_trace_id: &'static str,
    }

    #[async_trait]
    impl Processor for VerifyTraceId {
        async fn process(&self, ctx: &HandlerContext, _event: &Event) -> Result<(), ProcessError> {
            let got = ctx
                .trace_context()
                .map(|span_context| span_context.trace_id().to_string())
                .unwrap_or_default();
            if got != self.want_trace_id {
                return Err(ProcessError::Stage(
                    format!("unexpected trace id: got {got}, want {}", self.want_trace_id).into(),
                ));
            }
            Ok(())
        }

        fn with_next(&mut self, _next: Arc<dyn Processor>) {}
    }

    #[tokio::test]
    async fn trace_context_is_extracted_from_trace_parent() {
        let event = Event::new()
            .with_id("id")
            .with_subject("foo")
            .with_type("bar")
            .with_extension("traceparent", format!("00-{TRACE_ID}-{SPAN_ID}-01"));
        let (ctx, store) = new_test_targets(HashMap::new());
        let mut processor = FilterProcessor::new(store);
        processor.with_next(Arc::new(VerifyTraceId {
            want_trace_id: TRACE_ID,
        }));

        processor
            .process(&ctx, &event)
            .await
            .expect("downstream should see the extracted trace id");
    }

    /// Checks that the stage runs inside the span whose context it was handed.
    struct VerifyCurrentSpan;

    #[async_trait]
    impl Processor for VerifyCurrentSpan {
        async fn process(&self, ctx: &HandlerContext, _event: &Event) -> Result<(), ProcessError> {
            let current = tracing::Span::current()
                .context()
                .span()
                .span_context()
                .clone();
            if ctx.trace_context() != Some(&current) {
                return Err(ProcessError::Stage(
                    format!("stage ran outside the filter span: {current:?}").into(),
                ));
            }
            Ok(())
        }

        fn with_next(&mut self, _next: Arc<dyn Processor>) {}
    }

    #[tokio::test]
    async fn filter_span_is_a_child_of_the_remote_parent() {
        let provider = SdkTracerProvider::builder().build();
        let subscriber = tracing_subscriber::registry()
            .with(tracing_opentelemetry::layer().with_tracer(provider.tracer("filter-test")));
        let _guard = tracing::subscriber::set_default(subscriber);

        let event = Event::new().with_extension("traceparent", format!("00-{TRACE_ID}-{SPAN_ID}-01"));
        let (ctx, store) = new_test_targets(HashMap::new());
        let next = RecordingProcessor::new();
        let mut processor = FilterProcessor::new(store);
        processor.with_next(Arc::new(next.clone()));
        processor
            .process(&ctx, &event)
            .await
            .expect("event should pass");

        let received = next.received();
        let child = received[0]
            .0
            .trace_context()
            .expect("child span context should be forwarded");
        assert!(child.is_valid());
        assert!(!child.is_remote());
        assert_eq!(child.trace_id().to_string(), TRACE_ID);
        assert_ne!(child.span_id().to_string(), SPAN_ID);

        let mut processor = FilterProcessor::new(new_test_targets(HashMap::new()).1);
        processor.with_next(Arc::new(VerifyCurrentSpan));
        processor
            .process(&ctx, &event)
            .await
            .expect("downstream stage should run inside the filter span");
    }

    #[tokio::test]
    async fn invalid_trace_parent_is_ignored() {
        let event = Event::new().with_extension("traceparent", "not-a-trace-parent");

        assert!(passes(event, HashMap::new()).await);
    }

    #[tokio::test]
    async fn vanished_target_is_reported() {
        let (_, store) = new_test_targets(HashMap::new());
        let processor = FilterProcessor::new(store.clone());

        let missing_target =
            HandlerContext::new().with_target_key(CellTenantKey::broker("ns", "broker").target_key("gone"));
        assert!(matches!(
            processor.process(&missing_target, &Event::new()).await,
            Err(ProcessError::TargetNotFound(key)) if key.name() == "gone"
        ));

        store.mutate_cell_tenant(&CellTenantKey::broker("ns", "broker"), |m| m.delete());
        let ctx = HandlerContext::new().with_target_key(TargetKey::new(
            CellTenantType::Broker,
            "ns",
            "broker",
            "target",
        ));
        assert!(matches!(
            processor.process(&ctx, &Event::new()).await,
            Err(ProcessError::CellTenantNotFound(_))
        ));
    }
}
