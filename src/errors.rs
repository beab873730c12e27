// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::target::{CodeHostError, TargetKind};

use thiserror::Error;

/// Errors raised while type checking, evaluating or executing an Aladino
/// program. The first error halts the run; the core never recovers partially.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Callee name absent from the built-in registry.
    #[error("`{name}` not found. are you sure this is a built-in?")]
    UnknownIdentifier { name: String },

    #[error("`{name}` accepts {expected} arguments, received {actual}")]
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Argument type incompatible with the callee's signature.
    #[error("type mismatch in `{name}`: argument {position} expects {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        position: usize,
        expected: String,
        actual: String,
    },

    /// Built-in does not apply to the current target entity kind.
    #[error("`{name}` is not supported for {kind} targets")]
    UnsupportedTargetKind { name: String, kind: TargetKind },

    #[error("undefined variable `{name}`")]
    UndefinedVariable { name: String },

    /// Only function calls are valid top-level executable statements.
    #[error("expression of kind {kind} is not executable")]
    NotExecutable { kind: &'static str },

    /// Operand or argument of the wrong runtime kind.
    #[error("expected {expected} value, got {actual}")]
    UnexpectedKind { expected: String, actual: String },

    #[error("rule `{name}` not found")]
    UnknownRule { name: String },

    #[error("group `{name}` not found")]
    UnknownGroup { name: String },

    #[error("dictionary `{name}` not found")]
    UnknownDictionary { name: String },

    #[error("key `{key}` not found in dictionary `{dictionary}`")]
    DictionaryLookup { dictionary: String, key: String },

    /// Failed explicit conversion (`toBool`, `toNumber`, `toStringArray`).
    #[error("{builtin}: cannot convert `{value}`: {reason}")]
    Conversion {
        builtin: &'static str,
        value: String,
        reason: String,
    },

    /// Malformed unified-diff patch.
    #[error("error in file patch {filename}: error in chunk lines parsing ({chunk}): missing lines info: {line}\npatch: {patch}")]
    PatchParse {
        filename: String,
        chunk: usize,
        line: String,
        patch: String,
    },

    #[error("query: failed to compile pattern `{pattern}`: {source}")]
    RegexCompile {
        pattern: String,
        source: regex::Error,
    },

    /// Opaque failure from a built-in's side-effecting call. The platform
    /// message chain is preserved verbatim for diagnosis.
    #[error("{0}")]
    ExternalAction(anyhow::Error),
}

impl From<CodeHostError> for EvalError {
    fn from(err: CodeHostError) -> EvalError {
        EvalError::ExternalAction(anyhow::Error::new(err))
    }
}
