// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::{BinOp, Expr, UnOp};
use crate::builtins::supports;
use crate::env::Env;
use crate::errors::EvalError;
use crate::typing::{FunctionType, Type};
use crate::Ref;

/// Infers the static type of `expr` without evaluating it. `Ok(None)` is the
/// "type" of an action call, which produces no value and is only valid as a
/// top-level executable statement.
///
/// Checking a call proceeds in order: registry lookup, arity, per-argument
/// types, supported target kinds. The first violation is the result.
pub fn type_inference(env: &Env, expr: &Expr) -> Result<Option<Type>, EvalError> {
    match expr {
        Expr::BoolConst(_) => Ok(Some(Type::Bool)),
        Expr::IntConst(_) => Ok(Some(Type::Int)),
        Expr::StringConst(_) => Ok(Some(Type::String)),
        Expr::TimeConst(_) => Ok(Some(Type::Time)),
        Expr::ArrayConst(elems) => {
            let mut types = Vec::with_capacity(elems.len());
            for (i, elem) in elems.iter().enumerate() {
                match type_inference(env, elem)? {
                    Some(t) => types.push(t),
                    None => {
                        return Err(EvalError::TypeMismatch {
                            name: "array literal".to_string(),
                            position: i + 1,
                            expected: "a value".to_string(),
                            actual: "()".to_string(),
                        })
                    }
                }
            }
            Ok(Some(Type::Array(Ref::new(types))))
        }
        Expr::Variable(name) => match env.register(name) {
            Some(value) => Ok(Some(value.type_of())),
            None => Err(EvalError::UndefinedVariable {
                name: name.to_string(),
            }),
        },
        Expr::UnaryOp { op: UnOp::Not, expr } => {
            check_operand(env, expr, &Type::Bool, "!", 1)?;
            Ok(Some(Type::Bool))
        }
        Expr::BinaryOp { op, lhs, rhs } => {
            let name = op.to_string();
            match op {
                BinOp::And | BinOp::Or => {
                    check_operand(env, lhs, &Type::Bool, &name, 1)?;
                    check_operand(env, rhs, &Type::Bool, &name, 2)?;
                }
                BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                    check_operand(env, lhs, &Type::Int, &name, 1)?;
                    check_operand(env, rhs, &Type::Int, &name, 2)?;
                }
                BinOp::Eq | BinOp::Neq => {
                    let left = type_inference(env, lhs)?;
                    let right = type_inference(env, rhs)?;
                    let compatible = match (&left, &right) {
                        (Some(l), Some(r)) => l.matches(r),
                        _ => false,
                    };
                    if !compatible {
                        return Err(EvalError::TypeMismatch {
                            name,
                            position: 2,
                            expected: type_name(&left),
                            actual: type_name(&right),
                        });
                    }
                }
            }
            Ok(Some(Type::Bool))
        }
        Expr::FunctionCall { name, args } => {
            let (sig, kinds) = match env.builtins().function(name) {
                Some(builtin) => (&builtin.sig, &builtin.supported_kinds),
                None => match env.builtins().action(name) {
                    Some(builtin) => (&builtin.sig, &builtin.supported_kinds),
                    None => {
                        return Err(EvalError::UnknownIdentifier {
                            name: name.to_string(),
                        })
                    }
                },
            };
            check_call(env, name, sig, args)?;
            let kind = env.target().entity().kind;
            if !supports(kinds, kind) {
                return Err(EvalError::UnsupportedTargetKind {
                    name: name.to_string(),
                    kind,
                });
            }
            Ok(sig.ret.clone())
        }
    }
}

fn check_call(
    env: &Env,
    name: &str,
    sig: &FunctionType,
    args: &[Ref<Expr>],
) -> Result<(), EvalError> {
    if sig.params.len() != args.len() {
        return Err(EvalError::ArityMismatch {
            name: name.to_string(),
            expected: sig.params.len(),
            actual: args.len(),
        });
    }
    for (i, (param, arg)) in sig.params.iter().zip(args.iter()).enumerate() {
        let actual = type_inference(env, arg)?;
        let ok = matches!(&actual, Some(t) if param.matches(t));
        if !ok {
            return Err(EvalError::TypeMismatch {
                name: name.to_string(),
                position: i + 1,
                expected: param.to_string(),
                actual: type_name(&actual),
            });
        }
    }
    Ok(())
}

fn check_operand(
    env: &Env,
    expr: &Expr,
    expected: &Type,
    name: &str,
    position: usize,
) -> Result<(), EvalError> {
    let actual = type_inference(env, expr)?;
    let ok = matches!(&actual, Some(t) if expected.matches(t));
    if !ok {
        return Err(EvalError::TypeMismatch {
            name: name.to_string(),
            position,
            expected: expected.to_string(),
            actual: type_name(&actual),
        });
    }
    Ok(())
}

fn type_name(t: &Option<Type>) -> String {
    match t {
        Some(t) => t.to_string(),
        None => "()".to_string(),
    }
}
