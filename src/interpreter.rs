// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::{BinOp, Expr, UnOp};
use crate::env::Env;
use crate::errors::EvalError;
use crate::value::Value;

use serde_json::json;

/// Evaluates `expr` to a value. Arguments and array elements are evaluated
/// eagerly, left to right; `&&` and `||` short-circuit. The first error
/// aborts the whole expression.
pub fn eval(env: &Env, expr: &Expr) -> Result<Value, EvalError> {
    match expr {
        Expr::BoolConst(b) => Ok(Value::Bool(*b)),
        Expr::IntConst(i) => Ok(Value::Int(*i)),
        Expr::StringConst(s) => Ok(Value::String(s.clone())),
        Expr::TimeConst(t) => Ok(Value::Time(*t)),
        Expr::ArrayConst(elems) => {
            let mut values = Vec::with_capacity(elems.len());
            for elem in elems {
                values.push(eval(env, elem)?);
            }
            Ok(Value::from_array(values))
        }
        Expr::Variable(name) => env.register(name).ok_or_else(|| EvalError::UndefinedVariable {
            name: name.to_string(),
        }),
        Expr::UnaryOp { op: UnOp::Not, expr } => {
            Ok(Value::Bool(!eval(env, expr)?.as_bool()?))
        }
        Expr::BinaryOp { op, lhs, rhs } => eval_binary(env, *op, lhs, rhs),
        Expr::FunctionCall { name, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval(env, arg)?);
            }
            // Actions are looked up elsewhere; from expression position only
            // value-producing built-ins resolve.
            let builtin = env
                .builtins()
                .function(name)
                .ok_or_else(|| EvalError::UnknownIdentifier {
                    name: name.to_string(),
                })?;
            log::debug!("calling builtin {name}");
            env.collector().collect("builtin", json!({ "builtin": name.as_ref() }));
            (builtin.code)(env, &values)
        }
    }
}

fn eval_binary(env: &Env, op: BinOp, lhs: &Expr, rhs: &Expr) -> Result<Value, EvalError> {
    match op {
        BinOp::And => {
            if !eval(env, lhs)?.as_bool()? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(eval(env, rhs)?.as_bool()?))
        }
        BinOp::Or => {
            if eval(env, lhs)?.as_bool()? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(eval(env, rhs)?.as_bool()?))
        }
        BinOp::Eq | BinOp::Neq => {
            let left = eval(env, lhs)?;
            let right = eval(env, rhs)?;
            if left.kind() != right.kind() {
                return Err(EvalError::UnexpectedKind {
                    expected: left.kind().to_string(),
                    actual: right.kind().to_string(),
                });
            }
            let equal = left == right;
            Ok(Value::Bool(if op == BinOp::Eq { equal } else { !equal }))
        }
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let left = eval(env, lhs)?.as_int()?;
            let right = eval(env, rhs)?.as_int()?;
            Ok(Value::Bool(match op {
                BinOp::Lt => left < right,
                BinOp::Le => left <= right,
                BinOp::Gt => left > right,
                BinOp::Ge => left >= right,
                _ => unreachable!(),
            }))
        }
    }
}
