// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use serde_json::Value as JsonValue;

/// Telemetry sink. One event is emitted per built-in invocation; delivery is
/// best effort and never affects evaluation, so implementations swallow their
/// own failures.
pub trait Collector {
    fn collect(&self, event: &str, properties: JsonValue);
}

/// Default collector: records events on the `log` facade at debug level.
#[derive(Debug, Default)]
pub struct LogCollector;

impl Collector for LogCollector {
    fn collect(&self, event: &str, properties: JsonValue) {
        log::debug!("collect {event}: {properties}");
    }
}
