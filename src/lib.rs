// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Aladino is a small statically typed rule language for automating
//! code-review workflows. A configuration file pairs named boolean rules with
//! workflows and pipelines; when a rule activates against the current target
//! entity (pull request, issue or discussion), its actions are resolved into
//! an ordered program and executed against the code-hosting platform.
//!
//! The crate covers the typed value model, the expression type checker and
//! evaluator, the built-in registry, the program build/execution engine and
//! the unified-diff query support used by code-pattern built-ins. Parsing the
//! configuration file and talking to the platform are left to the caller: the
//! loader hands in an already parsed [`ConfigurationFile`] and the platform is
//! reached through the [`Target`] trait.

mod ast;
mod builtins;
mod collector;
mod diff;
mod engine;
mod env;
mod errors;
mod exec;
mod interpreter;
mod target;
mod type_checker;
mod typing;
mod value;

pub(crate) type Ref<T> = std::rc::Rc<T>;

pub use ast::{
    BinOp, ConfigurationFile, Dictionary, Expr, Group, LabelDefinition, Pipeline, Rule, Run, Stage,
    UnOp, Workflow,
};
pub use builtins::{
    BuiltInAction, BuiltInFunction, BuiltIns, BuiltinActionCode, BuiltinFunctionCode,
    PROMPT_SERVICE_KEY, SEMANTIC_SERVICE_KEY,
};
pub use collector::{Collector, LogCollector};
pub use diff::{DiffBlock, DiffSpan, File};
pub use engine::{
    eval_configuration_file, exec_configuration_file, exec_program, ExitStatus, Program, Statement,
};
pub use env::{Cancellation, Env, ReportMessage, Severity};
pub use errors::EvalError;
pub use exec::{exec_action, type_check_exec, ExecExpr};
pub use interpreter::eval;
pub use target::{CodeHostError, HostResult, Label, Target, TargetEntity, TargetKind};
pub use type_checker::type_inference;
pub use typing::{FunctionType, Type};
pub use value::Value;

#[cfg(test)]
mod tests;
