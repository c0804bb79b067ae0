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

//! Request-scoped state threaded through the processor chain.

use crate::routing::keys::{CellTenantKey, TargetKey};
use opentelemetry::trace::SpanContext;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// A value the dispatcher was expected to attach is missing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContextError {
    BrokerKeyNotPresent,
    TargetKeyNotPresent,
}

impl Display for ContextError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextError::BrokerKeyNotPresent => write!(f, "broker key not present in context"),
            ContextError::TargetKeyNotPresent => write!(f, "target key not present in context"),
        }
    }
}

impl Error for ContextError {}

/// Routing keys and trace context for the event being processed.
///
/// Stages derive a new context with the `with_*` builders instead of mutating
/// the one they were handed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandlerContext {
    broker_key: Option<CellTenantKey>,
    target_key: Option<TargetKey>,
    trace_context: Option<SpanContext>,
}

impl HandlerContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_broker_key(mut self, key: CellTenantKey) -> Self {
        self.broker_key = Some(key);
        self
    }

    pub fn broker_key(&self) -> Result<&CellTenantKey, ContextError> {
        self.broker_key
            .as_ref()
            .ok_or(ContextError::BrokerKeyNotPresent)
    }

    pub fn with_target_key(mut self, key: TargetKey) -> Self {
        self.target_key = Some(key);
        self
    }

    pub fn target_key(&self) -> Result<&TargetKey, ContextError> {
        self.target_key
            .as_ref()
            .ok_or(ContextError::TargetKeyNotPresent)
    }

    pub fn with_trace_context(mut self, span_context: SpanContext) -> Self {
        self.trace_context = Some(span_context);
        self
    }

    /// Remote span context extracted from the event, if any.
    pub fn trace_context(&self) -> Option<&SpanContext> {
        self.trace_context.as_ref()
    }
}
