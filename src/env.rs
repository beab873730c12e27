// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::builtins::BuiltIns;
use crate::collector::Collector;
use crate::errors::EvalError;
use crate::target::{CodeHostError, Target};
use crate::value::Value;
use crate::Ref;

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

/// Cooperative cancellation token shared with the caller. Mutating built-ins
/// consult it before touching the platform; a tripped token or an expired
/// deadline surfaces as [`CodeHostError::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Cancellation {
    pub fn new() -> Cancellation {
        Cancellation::default()
    }

    pub fn with_deadline(deadline: Instant) -> Cancellation {
        Cancellation {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    pub fn check(&self) -> Result<(), CodeHostError> {
        if self.is_cancelled() {
            Err(CodeHostError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// Entry of the run report produced by the `info`/`warn`/`error` built-ins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportMessage {
    pub severity: Severity,
    pub text: String,
}

/// Per-request evaluation environment.
///
/// One `Env` is created per rule-evaluation request and dropped when the
/// request finishes; it is never shared across requests. Evaluation is
/// single-threaded, so interior mutability is plain `RefCell`.
pub struct Env {
    target: Ref<dyn Target>,
    builtins: Ref<BuiltIns>,
    collector: Ref<dyn Collector>,
    dry_run: bool,
    cancellation: Cancellation,
    registers: RefCell<HashMap<String, Value>>,
    dictionaries: RefCell<HashMap<String, Vec<(String, String)>>>,
    report: RefCell<Vec<ReportMessage>>,
    failure: RefCell<Option<String>>,
}

// Group results live in the register map under a reserved prefix, out of
// reach of loop-variable names.
const GROUP_KEY_PREFIX: &str = "@group:";

impl Env {
    pub fn new(
        target: Ref<dyn Target>,
        builtins: Ref<BuiltIns>,
        collector: Ref<dyn Collector>,
    ) -> Env {
        Env {
            target,
            builtins,
            collector,
            dry_run: false,
            cancellation: Cancellation::new(),
            registers: RefCell::new(HashMap::new()),
            dictionaries: RefCell::new(HashMap::new()),
            report: RefCell::new(vec![]),
            failure: RefCell::new(None),
        }
    }

    /// In dry-run mode mutating built-ins skip their platform calls but still
    /// run through dispatch, so the produced program is identical.
    pub fn with_dry_run(mut self, dry_run: bool) -> Env {
        self.dry_run = dry_run;
        self
    }

    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Env {
        self.cancellation = cancellation;
        self
    }

    pub fn target(&self) -> &dyn Target {
        self.target.as_ref()
    }

    pub fn builtins(&self) -> &BuiltIns {
        self.builtins.as_ref()
    }

    pub fn collector(&self) -> &dyn Collector {
        self.collector.as_ref()
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn check_cancellation(&self) -> Result<(), EvalError> {
        Ok(self.cancellation.check()?)
    }

    pub fn register(&self, name: &str) -> Option<Value> {
        self.registers.borrow().get(name).cloned()
    }

    /// Binds `name`, returning the previous binding so callers can restore it.
    pub fn bind_register(&self, name: &str, value: Value) -> Option<Value> {
        self.registers.borrow_mut().insert(name.to_string(), value)
    }

    /// Restores a binding saved by [`Env::bind_register`].
    pub fn restore_register(&self, name: &str, previous: Option<Value>) {
        let mut registers = self.registers.borrow_mut();
        match previous {
            Some(value) => {
                registers.insert(name.to_string(), value);
            }
            None => {
                registers.remove(name);
            }
        }
    }

    pub fn bind_group(&self, name: &str, value: Value) {
        self.registers
            .borrow_mut()
            .insert(format!("{GROUP_KEY_PREFIX}{name}"), value);
    }

    pub fn group(&self, name: &str) -> Option<Value> {
        self.registers
            .borrow()
            .get(&format!("{GROUP_KEY_PREFIX}{name}"))
            .cloned()
    }

    pub fn load_dictionary(&self, name: &str, entries: Vec<(String, String)>) {
        self.dictionaries
            .borrow_mut()
            .insert(name.to_string(), entries);
    }

    pub fn dictionary_lookup(&self, dictionary: &str, key: &str) -> Option<Option<String>> {
        self.dictionaries.borrow().get(dictionary).map(|entries| {
            entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
    }

    pub fn report_message(&self, severity: Severity, text: &str) {
        self.report.borrow_mut().push(ReportMessage {
            severity,
            text: text.to_string(),
        });
    }

    pub fn report(&self) -> Vec<ReportMessage> {
        self.report.borrow().clone()
    }

    /// Records the explicit failure raised by the `fail` built-in. The engine
    /// checks for it after every statement and halts the run.
    pub fn record_failure(&self, reason: &str) {
        *self.failure.borrow_mut() = Some(reason.to_string());
    }

    pub fn failure(&self) -> Option<String> {
        self.failure.borrow().clone()
    }
}
