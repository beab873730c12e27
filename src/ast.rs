// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::target::TargetKind;
use crate::value::Value;
use crate::Ref;

use core::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnOp {
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinOp {
    Eq,
    Neq,
    And,
    Or,
    Lt,
    Le,
    Gt,
    Ge,
}

/// An Aladino expression, immutable once built by the loader.
///
/// Function-call arguments stay unevaluated until the call is dispatched;
/// evaluation order is strictly left to right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    BoolConst(bool),
    IntConst(i64),
    StringConst(Ref<str>),
    TimeConst(DateTime<Utc>),
    ArrayConst(Vec<Ref<Expr>>),
    Variable(Ref<str>),
    UnaryOp {
        op: UnOp,
        expr: Ref<Expr>,
    },
    BinaryOp {
        op: BinOp,
        lhs: Ref<Expr>,
        rhs: Ref<Expr>,
    },
    FunctionCall {
        name: Ref<str>,
        args: Vec<Ref<Expr>>,
    },
}

impl Expr {
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::BoolConst(_) => "BoolConst",
            Expr::IntConst(_) => "IntConst",
            Expr::StringConst(_) => "StringConst",
            Expr::TimeConst(_) => "TimeConst",
            Expr::ArrayConst(_) => "ArrayConst",
            Expr::Variable(_) => "Variable",
            Expr::UnaryOp { .. } => "UnaryOp",
            Expr::BinaryOp { .. } => "BinaryOp",
            Expr::FunctionCall { .. } => "FunctionCall",
        }
    }

    pub fn boolean(b: bool) -> Ref<Expr> {
        Ref::new(Expr::BoolConst(b))
    }

    pub fn int(i: i64) -> Ref<Expr> {
        Ref::new(Expr::IntConst(i))
    }

    pub fn string(s: &str) -> Ref<Expr> {
        Ref::new(Expr::StringConst(s.into()))
    }

    pub fn time(t: DateTime<Utc>) -> Ref<Expr> {
        Ref::new(Expr::TimeConst(t))
    }

    pub fn array(elems: Vec<Ref<Expr>>) -> Ref<Expr> {
        Ref::new(Expr::ArrayConst(elems))
    }

    pub fn var(name: &str) -> Ref<Expr> {
        Ref::new(Expr::Variable(name.into()))
    }

    pub fn not(expr: Ref<Expr>) -> Ref<Expr> {
        Ref::new(Expr::UnaryOp {
            op: UnOp::Not,
            expr,
        })
    }

    pub fn binary(op: BinOp, lhs: Ref<Expr>, rhs: Ref<Expr>) -> Ref<Expr> {
        Ref::new(Expr::BinaryOp { op, lhs, rhs })
    }

    pub fn call(name: &str, args: Vec<Ref<Expr>>) -> Ref<Expr> {
        Ref::new(Expr::FunctionCall {
            name: name.into(),
            args,
        })
    }

    /// Literal expression denoting `value`.
    pub fn from_value(value: &Value) -> Ref<Expr> {
        match value {
            Value::Bool(b) => Expr::boolean(*b),
            Value::Int(i) => Expr::int(*i),
            Value::String(s) => Ref::new(Expr::StringConst(s.clone())),
            Value::Time(t) => Expr::time(*t),
            Value::Array(items) => Expr::array(items.iter().map(Expr::from_value).collect()),
            Value::ArrayOfArrays(rows) => Expr::array(
                rows.iter()
                    .map(|row| Expr::array(row.iter().map(Expr::from_value).collect()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinOp::Eq => "==",
            BinOp::Neq => "!=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
        })
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::BoolConst(b) => write!(f, "{b}"),
            Expr::IntConst(i) => write!(f, "{i}"),
            Expr::StringConst(s) => write!(f, "{s:?}"),
            Expr::TimeConst(t) => write!(f, "{}", t.to_rfc3339()),
            Expr::ArrayConst(elems) => {
                f.write_str("[")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{elem}")?;
                }
                f.write_str("]")
            }
            Expr::Variable(name) => write!(f, "${name}"),
            Expr::UnaryOp { expr, .. } => write!(f, "!{expr}"),
            Expr::BinaryOp { op, lhs, rhs } => write!(f, "({lhs} {op} {rhs})"),
            Expr::FunctionCall { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Label declared in the configuration file. Declared labels are created on
/// the repository before evaluation when missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelDefinition {
    pub name: String,
    pub color: Option<String>,
    pub description: Option<String>,
}

/// Named string-to-string table. Entry order is insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dictionary {
    pub name: String,
    pub entries: Vec<(String, String)>,
}

/// Named collection, evaluated once per run and resolved through the
/// `group(..)` built-in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub name: String,
    pub spec: Ref<Expr>,
}

/// Named boolean activation condition referenced by workflows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub name: String,
    pub description: Option<String>,
    pub spec: Ref<Expr>,
}

/// One element of a workflow body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Run {
    /// Ordered action invocations.
    Actions(Vec<Ref<Expr>>),
    If {
        cond: Ref<Expr>,
        then: Vec<Run>,
        otherwise: Vec<Run>,
    },
    /// Binds `variable` to each element of the evaluated collection in order
    /// and expands the body once per element. Nested loops expand in
    /// outer-major order.
    ForEach {
        variable: String,
        collection: Ref<Expr>,
        body: Vec<Run>,
    },
}

/// A workflow activates when any referenced rule holds (or unconditionally
/// when it references no rules or is marked `always_run`). An empty `on`
/// list means the workflow applies to every target kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workflow {
    pub name: String,
    pub description: Option<String>,
    pub on: Vec<TargetKind>,
    pub rules: Vec<String>,
    pub runs: Vec<Run>,
    pub always_run: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stage {
    pub actions: Vec<Ref<Expr>>,
    /// Exit condition: when true the stage is considered complete and the
    /// next stage is considered instead.
    pub until: Option<Ref<Expr>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pipeline {
    pub name: String,
    pub trigger: Option<Ref<Expr>>,
    pub stages: Vec<Stage>,
}

/// Parsed configuration file, as produced by the external loader.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigurationFile {
    pub labels: Vec<LabelDefinition>,
    pub dictionaries: Vec<Dictionary>,
    pub groups: Vec<Group>,
    pub rules: Vec<Rule>,
    pub workflows: Vec<Workflow>,
    pub pipelines: Vec<Pipeline>,
}
