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

//! Value-type identity keys for cell tenants and their targets.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const KEY_SEPARATOR: char = '/';
const ESCAPE: char = '%';
const ESCAPED_SEPARATOR: &str = "%2F";
const ESCAPED_ESCAPE: &str = "%25";

/// Escapes `%` and `/` so that joined components split back unambiguously.
fn escape_component(component: &str) -> Cow<'_, str> {
    if !component.contains([KEY_SEPARATOR, ESCAPE]) {
        return Cow::Borrowed(component);
    }
    let mut escaped = String::with_capacity(component.len() + 4);
    for c in component.chars() {
        match c {
            KEY_SEPARATOR => escaped.push_str(ESCAPED_SEPARATOR),
            ESCAPE => escaped.push_str(ESCAPED_ESCAPE),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

fn unescape_component(input: &str, component: &str) -> Result<String, KeyParseError> {
    let mut unescaped = String::with_capacity(component.len());
    let mut rest = component;
    while let Some(at) = rest.find(ESCAPE) {
        unescaped.push_str(&rest[..at]);
        let tail = &rest[at..];
        if tail.starts_with(ESCAPED_SEPARATOR) {
            unescaped.push(KEY_SEPARATOR);
        } else if tail.starts_with(ESCAPED_ESCAPE) {
            unescaped.push(ESCAPE);
        } else {
            return Err(KeyParseError::InvalidEscape(input.to_string()));
        }
        rest = &tail[ESCAPED_SEPARATOR.len()..];
    }
    unescaped.push_str(rest);
    Ok(unescaped)
}

/// Kind of routing scope a cell tenant represents.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellTenantType {
    #[default]
    Broker,
    Channel,
}

impl CellTenantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellTenantType::Broker => "broker",
            CellTenantType::Channel => "channel",
        }
    }
}

impl Display for CellTenantType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CellTenantType {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "broker" => Ok(CellTenantType::Broker),
            "channel" => Ok(CellTenantType::Channel),
            other => Err(KeyParseError::UnknownCellTenantType(other.to_string())),
        }
    }
}

/// Failures when decoding a key from its persistence string.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KeyParseError {
    WrongComponentCount { input: String, expected: usize },
    UnknownCellTenantType(String),
    EmptyComponent(String),
    InvalidEscape(String),
}

impl Display for KeyParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyParseError::WrongComponentCount { input, expected } => {
                write!(f, "key '{input}' must have exactly {expected} components")
            }
            KeyParseError::UnknownCellTenantType(kind) => {
                write!(f, "unknown cell tenant type '{kind}'")
            }
            KeyParseError::EmptyComponent(input) => {
                write!(f, "key '{input}' has an empty component")
            }
            KeyParseError::InvalidEscape(input) => {
                write!(f, "key '{input}' has an invalid escape sequence")
            }
        }
    }
}

impl Error for KeyParseError {}

/// Identity of one broker or channel.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CellTenantKey {
    cell_tenant_type: CellTenantType,
    namespace: String,
    name: String,
}

impl CellTenantKey {
    pub fn new(
        cell_tenant_type: CellTenantType,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            cell_tenant_type,
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn broker(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(CellTenantType::Broker, namespace, name)
    }

    pub fn channel(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(CellTenantType::Channel, namespace, name)
    }

    pub fn cell_tenant_type(&self) -> CellTenantType {
        self.cell_tenant_type
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds the key of a target living under this cell tenant.
    pub fn target_key(&self, target_name: impl Into<String>) -> TargetKey {
        TargetKey {
            parent: self.clone(),
            name: target_name.into(),
        }
    }

    /// Stable `type/namespace/name` encoding used as the snapshot map key.
    ///
    /// `/` and `%` inside a component are written as `%2F` and `%25`.
    pub fn persistence_string(&self) -> String {
        format!(
            "{}{KEY_SEPARATOR}{}{KEY_SEPARATOR}{}",
            self.cell_tenant_type,
            escape_component(&self.namespace),
            escape_component(&self.name)
        )
    }

    pub fn from_persistence_string(input: &str) -> Result<Self, KeyParseError> {
        let parts: Vec<&str> = input.split(KEY_SEPARATOR).collect();
        if parts.len() != 3 {
            return Err(KeyParseError::WrongComponentCount {
                input: input.to_string(),
                expected: 3,
            });
        }
        if parts.iter().any(|part| part.is_empty()) {
            return Err(KeyParseError::EmptyComponent(input.to_string()));
        }

        Ok(Self::new(
            parts[0].parse()?,
            unescape_component(input, parts[1])?,
            unescape_component(input, parts[2])?,
        ))
    }
}

impl Display for CellTenantKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.persistence_string())
    }
}

/// Identity of one subscriber inside a cell tenant.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TargetKey {
    parent: CellTenantKey,
    name: String,
}

impl TargetKey {
    pub fn new(
        cell_tenant_type: CellTenantType,
        namespace: impl Into<String>,
        cell_tenant_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        CellTenantKey::new(cell_tenant_type, namespace, cell_tenant_name).target_key(name)
    }

    pub fn parent_key(&self) -> &CellTenantKey {
        &self.parent
    }

    pub fn namespace(&self) -> &str {
        self.parent.namespace()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn persistence_string(&self) -> String {
        format!(
            "{}{KEY_SEPARATOR}{}",
            self.parent.persistence_string(),
            escape_component(&self.name)
        )
    }
}

impl Display for TargetKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.persistence_string())
    }
}
