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

mod config;

use crate::config::{Config, OutputFormat};
use async_trait::async_trait;
use broker_routing::{
    chain_processors, Event, FilterProcessor, HandlerContext, PassThrough, ProcessError,
    Processor, Target, TargetKey, TargetsStore,
};
use clap::Parser;
use serde::Serialize;
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command()]
struct InspectArgs {
    #[arg(short, long, value_name = "FILE")]
    config: String,
}

/// Last stage of the inspection chain; counts events the filter let through.
#[derive(Clone, Default)]
struct Delivered {
    base: PassThrough,
    count: Arc<AtomicUsize>,
}

impl Delivered {
    fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Processor for Delivered {
    async fn process(&self, ctx: &HandlerContext, event: &Event) -> Result<(), ProcessError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.base.forward(ctx, event).await
    }

    fn with_next(&mut self, next: Arc<dyn Processor>) {
        self.base.with_next(next);
    }
}

#[derive(Serialize)]
struct TargetReport {
    target: String,
    address: String,
    filter_attributes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    verdict: Option<&'static str>,
}

async fn verdict_for(
    chain: &Arc<dyn Processor>,
    delivered: &Delivered,
    key: TargetKey,
    event: &Event,
) -> Result<&'static str, ProcessError> {
    let before = delivered.count();
    let ctx = HandlerContext::new()
        .with_broker_key(key.parent_key().clone())
        .with_target_key(key);
    chain.process(&ctx, event).await?;
    Ok(if delivered.count() > before {
        "pass"
    } else {
        "drop"
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = tracing_subscriber::fmt::try_init();

    let args = InspectArgs::parse();
    let config = Config::from_file(&args.config)?;
    let store = Arc::new(TargetsStore::from_config(config.load_targets()?)?);
    let event = config.load_event()?;

    info!(
        targets_file = config.targets_file.as_str(),
        target_count = store.load().target_count(),
        "loaded routing snapshot"
    );

    let mut targets: Vec<Target> = Vec::new();
    store.range_all_targets(|target| {
        targets.push(target.clone());
        true
    });
    targets.sort_by_key(Target::key);

    let delivered = Delivered::default();
    let stages: Vec<Box<dyn Processor>> = vec![
        Box::new(FilterProcessor::new(store.clone())),
        Box::new(delivered.clone()),
    ];
    let chain = chain_processors(stages).ok_or("empty inspection chain")?;

    let mut reports = Vec::with_capacity(targets.len());
    for target in &targets {
        let verdict = match &event {
            Some(event) => Some(verdict_for(&chain, &delivered, target.key(), event).await?),
            None => None,
        };
        reports.push(TargetReport {
            target: target.key().to_string(),
            address: target.address.clone(),
            filter_attributes: target.filter_attributes.len(),
            verdict,
        });
    }

    match config.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Text => {
            for report in &reports {
                match report.verdict {
                    Some(verdict) => println!("{}\t{}\t{verdict}", report.target, report.address),
                    None => println!("{}\t{}", report.target, report.address),
                }
            }
        }
    }

    Ok(())
}
