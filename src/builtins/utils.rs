// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::errors::EvalError;
use crate::value::Value;
use crate::Ref;

// Argument accessors for built-in bodies. The type checker has already
// verified arity and types, so a failure here means a registration bug; the
// resulting UnexpectedKind error still names both kinds for diagnosis.

pub fn ensure_int(args: &[Value], idx: usize) -> Result<i64, EvalError> {
    args[idx].as_int()
}

pub fn ensure_string(args: &[Value], idx: usize) -> Result<Ref<str>, EvalError> {
    args[idx].as_str()
}

pub fn ensure_array(args: &[Value], idx: usize) -> Result<Vec<Value>, EvalError> {
    args[idx].elements()
}

pub fn ensure_string_array(args: &[Value], idx: usize) -> Result<Vec<String>, EvalError> {
    ensure_array(args, idx)?
        .iter()
        .map(|item| item.as_str().map(|s| s.to_string()))
        .collect()
}
