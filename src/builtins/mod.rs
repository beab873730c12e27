// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

mod actions;
mod functions;
mod utils;

use crate::env::Env;
use crate::errors::EvalError;
use crate::target::TargetKind;
use crate::typing::FunctionType;
use crate::value::Value;
use crate::Ref;

use std::any::Any;
use std::collections::HashMap;

pub type BuiltinFunctionCode = fn(&Env, &[Value]) -> Result<Value, EvalError>;
pub type BuiltinActionCode = fn(&Env, &[Value]) -> Result<(), EvalError>;

/// Key of the semantic-analysis service handle, when the caller provides one.
pub const SEMANTIC_SERVICE_KEY: &str = "semantic";

/// Key of the LLM prompt service handle, when the caller provides one.
pub const PROMPT_SERVICE_KEY: &str = "prompt";

/// Pure or query built-in, callable from any expression position.
pub struct BuiltInFunction {
    pub sig: FunctionType,
    pub code: BuiltinFunctionCode,
    /// Target kinds this built-in applies to; empty means all kinds.
    pub supported_kinds: Vec<TargetKind>,
}

/// Side-effecting built-in, callable only as a top-level statement.
pub struct BuiltInAction {
    pub sig: FunctionType,
    pub code: BuiltinActionCode,
    pub supported_kinds: Vec<TargetKind>,
}

pub(crate) fn supports(kinds: &[TargetKind], kind: TargetKind) -> bool {
    kinds.is_empty() || kinds.contains(&kind)
}

/// Registry of every name callable from Aladino expressions, plus opaque
/// service handles some built-ins depend on. Populated once at construction
/// and shared read-only for the lifetime of the process; callers extend it
/// before first use.
pub struct BuiltIns {
    functions: HashMap<&'static str, BuiltInFunction>,
    actions: HashMap<&'static str, BuiltInAction>,
    services: HashMap<&'static str, Ref<dyn Any>>,
}

impl BuiltIns {
    /// Registry with no entries, for callers that supply their own catalogue.
    pub fn empty() -> BuiltIns {
        BuiltIns {
            functions: HashMap::new(),
            actions: HashMap::new(),
            services: HashMap::new(),
        }
    }

    /// Registry with the default built-in catalogue.
    pub fn defaults() -> BuiltIns {
        let mut registry = BuiltIns::empty();
        functions::register(&mut registry.functions);
        actions::register(&mut registry.actions);
        registry
    }

    pub fn add_function(&mut self, name: &'static str, builtin: BuiltInFunction) {
        self.functions.insert(name, builtin);
    }

    pub fn add_action(&mut self, name: &'static str, builtin: BuiltInAction) {
        self.actions.insert(name, builtin);
    }

    pub fn add_service(&mut self, key: &'static str, service: Ref<dyn Any>) {
        self.services.insert(key, service);
    }

    pub fn function(&self, name: &str) -> Option<&BuiltInFunction> {
        self.functions.get(name)
    }

    pub fn action(&self, name: &str) -> Option<&BuiltInAction> {
        self.actions.get(name)
    }

    pub fn service(&self, key: &str) -> Option<Ref<dyn Any>> {
        self.services.get(key).cloned()
    }
}

impl Default for BuiltIns {
    fn default() -> BuiltIns {
        BuiltIns::defaults()
    }
}
