// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::errors::EvalError;
use crate::typing::Type;
use crate::Ref;

use core::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Runtime value produced by evaluating an Aladino expression.
///
/// Arrays preserve insertion order and may contain duplicates. Operations are
/// only defined between values of the same kind; the conversion built-ins
/// (`toBool`, `toNumber`, `toStringArray`) are the only sanctioned coercions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    String(Ref<str>),
    Time(DateTime<Utc>),
    Array(Ref<Vec<Value>>),
    ArrayOfArrays(Ref<Vec<Vec<Value>>>),
}

impl Value {
    pub fn from_array(values: Vec<Value>) -> Value {
        Value::Array(Ref::new(values))
    }

    pub fn from_rows(rows: Vec<Vec<Value>>) -> Value {
        Value::ArrayOfArrays(Ref::new(rows))
    }

    /// Human-readable kind name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::String(_) => "string",
            Value::Time(_) => "time",
            Value::Array(_) => "array",
            Value::ArrayOfArrays(_) => "array of arrays",
        }
    }

    /// Static type of this value.
    pub fn type_of(&self) -> Type {
        match self {
            Value::Bool(_) => Type::Bool,
            Value::Int(_) => Type::Int,
            Value::String(_) => Type::String,
            Value::Time(_) => Type::Time,
            Value::Array(items) => {
                Type::Array(Ref::new(items.iter().map(Value::type_of).collect()))
            }
            Value::ArrayOfArrays(_) => Type::ArrayOf(Ref::new(Type::DynamicArray)),
        }
    }

    pub fn as_bool(&self) -> Result<bool, EvalError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(other.unexpected("bool")),
        }
    }

    pub fn as_int(&self) -> Result<i64, EvalError> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(other.unexpected("int")),
        }
    }

    pub fn as_str(&self) -> Result<Ref<str>, EvalError> {
        match self {
            Value::String(s) => Ok(s.clone()),
            other => Err(other.unexpected("string")),
        }
    }

    pub fn as_time(&self) -> Result<DateTime<Utc>, EvalError> {
        match self {
            Value::Time(t) => Ok(*t),
            other => Err(other.unexpected("time")),
        }
    }

    pub fn as_array(&self) -> Result<Ref<Vec<Value>>, EvalError> {
        match self {
            Value::Array(items) => Ok(items.clone()),
            other => Err(other.unexpected("array")),
        }
    }

    /// Elements of an array-kinded value, with inner rows wrapped as arrays.
    pub fn elements(&self) -> Result<Vec<Value>, EvalError> {
        match self {
            Value::Array(items) => Ok(items.as_ref().clone()),
            Value::ArrayOfArrays(rows) => Ok(rows
                .iter()
                .map(|row| Value::Array(Ref::new(row.clone())))
                .collect()),
            other => Err(other.unexpected("array")),
        }
    }

    fn unexpected(&self, expected: &str) -> EvalError {
        EvalError::UnexpectedKind {
            expected: expected.to_string(),
            actual: self.kind().to_string(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Value {
        Value::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::String(s.into())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Value {
        Value::Time(t)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{self:?}"),
        }
    }
}
