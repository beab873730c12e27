// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::Expr;
use crate::env::Env;
use crate::errors::EvalError;
use crate::interpreter::eval;
use crate::type_checker::type_inference;
use crate::Ref;

use core::fmt;

use serde::Serialize;
use serde_json::json;

/// A call expression that passed [`type_check_exec`]. Only these are admitted
/// into a program.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExecExpr {
    expr: Ref<Expr>,
}

impl ExecExpr {
    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl fmt::Display for ExecExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}

/// Admits `expr` as an executable statement: it must be a function call and
/// must type-check in the current environment. Every other expression kind is
/// rejected with `NotExecutable`.
pub fn type_check_exec(env: &Env, expr: Ref<Expr>) -> Result<ExecExpr, EvalError> {
    match expr.as_ref() {
        Expr::FunctionCall { .. } => {
            type_inference(env, &expr)?;
            Ok(ExecExpr { expr })
        }
        other => Err(EvalError::NotExecutable { kind: other.kind() }),
    }
}

/// Runs one admitted statement: arguments are evaluated left to right, the
/// callee is resolved in the actions table and invoked. External failures
/// carry the platform message through unchanged.
pub fn exec_action(env: &Env, exec: &ExecExpr) -> Result<(), EvalError> {
    match exec.expr.as_ref() {
        Expr::FunctionCall { name, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval(env, arg)?);
            }
            let builtin = env
                .builtins()
                .action(name)
                .ok_or_else(|| EvalError::UnknownIdentifier {
                    name: name.to_string(),
                })?;
            log::debug!("executing action {name}");
            env.collector()
                .collect("builtin", json!({ "builtin": name.as_ref() }));
            (builtin.code)(env, &values)
        }
        other => Err(EvalError::NotExecutable { kind: other.kind() }),
    }
}
