// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::Ref;

use core::fmt;

use serde::Serialize;

/// Static type of an Aladino expression.
///
/// Literal arrays carry one type per element so that heterogeneous literals
/// can still be checked against homogeneous parameter types. `DynamicArray`
/// is the type of arrays whose element type is not statically known (group
/// lookups, JSON conversions).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Type {
    Bool,
    Int,
    String,
    Time,
    /// Literal array, one entry per element.
    Array(Ref<Vec<Type>>),
    /// Homogeneous array.
    ArrayOf(Ref<Type>),
    /// Array of statically unknown element type.
    DynamicArray,
    Function(Ref<FunctionType>),
}

/// Signature of a built-in. `ret == None` marks an action: the call produces
/// no value and is only valid as a top-level executable statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionType {
    pub params: Vec<Type>,
    pub ret: Option<Type>,
}

impl FunctionType {
    pub fn function(params: Vec<Type>, ret: Type) -> FunctionType {
        FunctionType {
            params,
            ret: Some(ret),
        }
    }

    pub fn action(params: Vec<Type>) -> FunctionType {
        FunctionType { params, ret: None }
    }
}

impl Type {
    pub fn array_of(elem: Type) -> Type {
        Type::ArrayOf(Ref::new(elem))
    }

    fn is_array(&self) -> bool {
        matches!(self, Type::Array(_) | Type::ArrayOf(_) | Type::DynamicArray)
    }

    /// Structural assignability.
    ///
    /// Exact equality, except that `DynamicArray` matches any array kind and
    /// a homogeneous array matches a literal array whose elements all match
    /// its element type.
    pub fn matches(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::DynamicArray, other) => other.is_array(),
            (this, Type::DynamicArray) => this.is_array(),
            (Type::ArrayOf(elem), Type::Array(items))
            | (Type::Array(items), Type::ArrayOf(elem)) => {
                items.iter().all(|item| elem.matches(item))
            }
            (Type::ArrayOf(a), Type::ArrayOf(b)) => a.matches(b),
            (Type::Array(a), Type::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.matches(y))
            }
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => f.write_str("bool"),
            Type::Int => f.write_str("int"),
            Type::String => f.write_str("string"),
            Type::Time => f.write_str("time"),
            Type::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Type::ArrayOf(elem) => write!(f, "[]{elem}"),
            Type::DynamicArray => f.write_str("[]dynamic"),
            Type::Function(sig) => {
                f.write_str("(")?;
                for (i, param) in sig.params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{param}")?;
                }
                match &sig.ret {
                    Some(ret) => write!(f, ") -> {ret}"),
                    None => f.write_str(") -> ()"),
                }
            }
        }
    }
}
