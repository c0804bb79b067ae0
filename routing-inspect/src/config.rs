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

use broker_routing::{Event, TargetsConfig};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub(crate) targets_file: String,
    #[serde(default)]
    pub(crate) event_file: Option<String>,
    #[serde(default)]
    pub(crate) output: OutputFormat,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let contents = std::fs::read_to_string(path)?;
        Ok(json5::from_str(&contents)?)
    }

    /// Reads the routing snapshot named by `targets_file`.
    pub fn load_targets(&self) -> Result<TargetsConfig, Box<dyn Error>> {
        let contents = std::fs::read_to_string(&self.targets_file)?;
        Ok(json5::from_str(&contents)?)
    }

    /// Reads the structured-mode CloudEvent named by `event_file`, if any.
    pub fn load_event(&self) -> Result<Option<Event>, Box<dyn Error>> {
        let Some(event_file) = &self.event_file else {
            return Ok(None);
        };
        let contents = std::fs::read_to_string(event_file)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }
}
