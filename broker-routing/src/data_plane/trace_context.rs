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

//! W3C trace-context extraction from event extensions.

use crate::event::{Event, TRACE_PARENT_EXTENSION};
use opentelemetry::propagation::{Extractor, TextMapPropagator};
use opentelemetry::trace::{SpanContext, TraceContextExt};
use opentelemetry::Context;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{IdGenerator, RandomIdGenerator};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

const TRACE_STATE_EXTENSION: &str = "tracestate";

/// A `traceparent` value the W3C propagator could not turn into a valid parent.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TraceParentError(String);

impl TraceParentError {
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl Display for TraceParentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid traceparent '{}'", self.0)
    }
}

impl Error for TraceParentError {}

struct EventExtractor<'a>(&'a Event);

impl Extractor for EventExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.extension(key)
    }

    fn keys(&self) -> Vec<&str> {
        [TRACE_PARENT_EXTENSION, TRACE_STATE_EXTENSION]
            .into_iter()
            .filter(|key| self.0.extension(key).is_some())
            .collect()
    }
}

fn remote_parent(parent: Context, value: &str) -> Result<Context, TraceParentError> {
    if parent.span().span_context().is_valid() {
        Ok(parent)
    } else {
        Err(TraceParentError(value.to_string()))
    }
}

/// Parses a single `traceparent` header into a remote span context.
pub fn parse_trace_parent(value: &str) -> Result<SpanContext, TraceParentError> {
    let carrier = HashMap::from([(TRACE_PARENT_EXTENSION.to_string(), value.to_string())]);
    let parent = remote_parent(TraceContextPropagator::new().extract(&carrier), value)?;
    let span_context = parent.span().span_context().clone();
    Ok(span_context)
}

/// Extracts the remote parent carried by the event's `traceparent` and
/// `tracestate` extensions, if a `traceparent` is present.
pub fn extract_trace_context(event: &Event) -> Option<Result<Context, TraceParentError>> {
    let value = event.extension(TRACE_PARENT_EXTENSION)?;
    let parent = TraceContextPropagator::new().extract(&EventExtractor(event));
    Some(remote_parent(parent, value))
}

/// Parents `span` under `parent` and returns the span context of `span`.
///
/// When no OpenTelemetry layer records `span`, a child of `parent` with a fresh
/// span id stands in for it.
pub(crate) fn start_child_span(span: &Span, parent: Context) -> SpanContext {
    let remote = parent.span().span_context().clone();
    span.set_parent(parent);

    let recorded = span.context().span().span_context().clone();
    if recorded.is_valid() {
        return recorded;
    }
    SpanContext::new(
        remote.trace_id(),
        RandomIdGenerator::default().new_span_id(),
        remote.trace_flags(),
        false,
        remote.trace_state().clone(),
    )
}
