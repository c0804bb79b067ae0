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

//! Canonical structured field keys and value-format helpers.

use crate::event::Event;

pub const TRACE_ID: &str = "trace_id";
pub const SPAN_ID: &str = "span_id";

pub const NONE: &str = "none";
pub const OUTCOME_UPSERTED: &str = "upserted";
pub const OUTCOME_REMOVED: &str = "removed";
pub const OUTCOME_NOOP: &str = "noop";
pub const REASON_MISSING_ATTRIBUTE: &str = "missing_attribute";
pub const REASON_VALUE_MISMATCH: &str = "value_mismatch";

pub fn format_event_id(event: &Event) -> &str {
    non_empty_or_none(event.id())
}

pub fn format_event_type(event: &Event) -> &str {
    non_empty_or_none(event.event_type())
}

fn non_empty_or_none(value: &str) -> &str {
    if value.is_empty() {
        NONE
    } else {
        value
    }
}
