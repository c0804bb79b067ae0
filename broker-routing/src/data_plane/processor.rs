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

//! Chain-of-responsibility abstraction for per-event handler stages.

use crate::data_plane::handler_context::{ContextError, HandlerContext};
use crate::event::Event;
use crate::routing::keys::{CellTenantKey, TargetKey};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Failures surfaced by a processor chain.
#[derive(Debug)]
pub enum ProcessError {
    MissingContext(ContextError),
    CellTenantNotFound(CellTenantKey),
    TargetNotFound(TargetKey),
    Stage(Box<dyn Error + Send + Sync>),
}

impl Display for ProcessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessError::MissingContext(err) => write!(f, "{err}"),
            ProcessError::CellTenantNotFound(key) => write!(f, "cell tenant '{key}' not found"),
            ProcessError::TargetNotFound(key) => write!(f, "target '{key}' not found"),
            ProcessError::Stage(err) => write!(f, "processor stage failed: {err}"),
        }
    }
}

impl Error for ProcessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ProcessError::MissingContext(err) => Some(err),
            ProcessError::Stage(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<ContextError> for ProcessError {
    fn from(err: ContextError) -> Self {
        ProcessError::MissingContext(err)
    }
}

/// One stage of an event handler chain.
///
/// A stage forwards by calling the next stage's [`Processor::process`], and
/// drops the event by returning `Ok(())` without doing so.
#[async_trait]
pub trait Processor: Send + Sync {
    async fn process(&self, ctx: &HandlerContext, event: &Event) -> Result<(), ProcessError>;

    /// Sets the stage that receives forwarded events.
    fn with_next(&mut self, next: Arc<dyn Processor>);
}

/// Stage that forwards every event to its successor, if it has one.
///
/// Custom stages wrap one and call [`PassThrough::forward`] once they decide
/// the event continues.
#[derive(Clone, Default)]
pub struct PassThrough {
    next: Option<Arc<dyn Processor>>,
}

impl PassThrough {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub async fn forward(&self, ctx: &HandlerContext, event: &Event) -> Result<(), ProcessError> {
        match &self.next {
            Some(next) => next.process(ctx, event).await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Processor for PassThrough {
    async fn process(&self, ctx: &HandlerContext, event: &Event) -> Result<(), ProcessError> {
        self.forward(ctx, event).await
    }

    fn with_next(&mut self, next: Arc<dyn Processor>) {
        self.next = Some(next);
    }
}

/// Links `stages` in order and returns the head of the chain.
pub fn chain_processors(stages: Vec<Box<dyn Processor>>) -> Option<Arc<dyn Processor>> {
    let mut head: Option<Arc<dyn Processor>> = None;
    for mut stage in stages.into_iter().rev() {
        if let Some(next) = head.take() {
            stage.with_next(next);
        }
        head = Some(Arc::from(stage));
    }
    head
}
