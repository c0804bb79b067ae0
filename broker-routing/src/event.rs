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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Extension attribute carrying the W3C trace context of an event.
pub const TRACE_PARENT_EXTENSION: &str = "traceparent";

/// CloudEvents specification version an [`Event`] was produced with.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum SpecVersion {
    #[serde(rename = "0.3")]
    V03,
    #[default]
    #[serde(rename = "1.0")]
    V10,
}

impl SpecVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecVersion::V03 => "0.3",
            SpecVersion::V10 => "1.0",
        }
    }
}

/// Value of a CloudEvents extension attribute.
///
/// Extensions are scalars; binary, URI and timestamp extensions travel as
/// their string form.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtensionValue {
    Boolean(bool),
    Integer(i64),
    String(String),
}

impl ExtensionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ExtensionValue::String(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl Display for ExtensionValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtensionValue::Boolean(value) => write!(f, "{value}"),
            ExtensionValue::Integer(value) => write!(f, "{value}"),
            ExtensionValue::String(value) => f.write_str(value),
        }
    }
}

impl From<&str> for ExtensionValue {
    fn from(value: &str) -> Self {
        ExtensionValue::String(value.to_string())
    }
}

impl From<String> for ExtensionValue {
    fn from(value: String) -> Self {
        ExtensionValue::String(value)
    }
}

impl From<i64> for ExtensionValue {
    fn from(value: i64) -> Self {
        ExtensionValue::Integer(value)
    }
}

impl From<bool> for ExtensionValue {
    fn from(value: bool) -> Self {
        ExtensionValue::Boolean(value)
    }
}

/// [`Event`] is an in-memory CloudEvent as handed over by the ingress adapters.
///
/// Context attributes and string-valued extensions are addressable by their
/// CloudEvents attribute name through [`Event::attribute`]. The serde shape is
/// the JSON structured mode: extensions sit next to the context attributes and
/// `data` is any JSON value, with `data_base64` carried as-is.
///
/// # Examples
///
/// ```
/// use broker_routing::Event;
///
/// let event = Event::new()
///     .with_id("id")
///     .with_type("dev.example.created")
///     .with_extension("app", "foo");
///
/// assert_eq!(event.attribute("type").as_deref(), Some("dev.example.created"));
/// assert_eq!(event.attribute("app").as_deref(), Some("foo"));
/// assert_eq!(event.attribute("subject"), None);
/// ```
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Event {
    id: String,
    source: String,
    #[serde(rename = "specversion")]
    spec_version: SpecVersion,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time: Option<DateTime<Utc>>,
    #[serde(rename = "datacontenttype", skip_serializing_if = "Option::is_none")]
    data_content_type: Option<String>,
    #[serde(rename = "dataschema", skip_serializing_if = "Option::is_none")]
    data_schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_base64: Option<String>,
    #[serde(flatten)]
    extensions: BTreeMap<String, ExtensionValue>,
}

impl Event {
    /// Creates an empty CloudEvents 1.0 event.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spec_version(spec_version: SpecVersion) -> Self {
        Self {
            spec_version,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_data_content_type(mut self, data_content_type: impl Into<String>) -> Self {
        self.data_content_type = Some(data_content_type.into());
        self
    }

    pub fn with_data_schema(mut self, data_schema: impl Into<String>) -> Self {
        self.data_schema = Some(data_schema.into());
        self
    }

    pub fn with_extension(
        mut self,
        name: impl Into<String>,
        value: impl Into<ExtensionValue>,
    ) -> Self {
        self.extensions.insert(name.into(), value.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Sets base64-encoded binary data; the encoding is not checked.
    pub fn with_data_base64(mut self, data: impl Into<String>) -> Self {
        self.data_base64 = Some(data.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn spec_version(&self) -> SpecVersion {
        self.spec_version
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// String-valued extension `name`.
    pub fn extension(&self, name: &str) -> Option<&str> {
        self.extensions.get(name).and_then(ExtensionValue::as_str)
    }

    pub fn extension_value(&self, name: &str) -> Option<&ExtensionValue> {
        self.extensions.get(name)
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn data_base64(&self) -> Option<&str> {
        self.data_base64.as_deref()
    }

    /// Looks up a context attribute or extension by its CloudEvents name.
    ///
    /// `time` is rendered as RFC 3339 and `schemaurl` is accepted as the v0.3
    /// spelling of `dataschema`.
    pub fn attribute(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "specversion" => Some(Cow::Borrowed(self.spec_version.as_str())),
            "id" => Some(Cow::Borrowed(self.id.as_str())),
            "source" => Some(Cow::Borrowed(self.source.as_str())),
            "type" => Some(Cow::Borrowed(self.event_type.as_str())),
            "subject" => self.subject.as_deref().map(Cow::Borrowed),
            "time" => self.time.as_ref().map(|time| Cow::Owned(format_time(time))),
            "datacontenttype" => self.data_content_type.as_deref().map(Cow::Borrowed),
            "dataschema" | "schemaurl" => self.data_schema.as_deref().map(Cow::Borrowed),
            extension => self.extensions.get(extension).map(|value| match value {
                ExtensionValue::String(value) => Cow::Borrowed(value.as_str()),
                other => Cow::Owned(other.to_string()),
            }),
        }
    }
}

/// String form of an event `time` attribute.
///
/// RFC 3339 in UTC with a `Z` suffix. Fractional seconds keep only their
/// significant digits and are omitted when zero.
pub fn format_time(time: &DateTime<Utc>) -> String {
    let seconds = time.format("%Y-%m-%dT%H:%M:%S");
    let nanos = time.timestamp_subsec_nanos() % 1_000_000_000;
    if nanos == 0 {
        return format!("{seconds}Z");
    }
    let fraction = format!("{nanos:09}");
    format!("{seconds}.{}Z", fraction.trim_end_matches('0'))
}
