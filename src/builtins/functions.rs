// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::builtins::utils::{ensure_array, ensure_string, ensure_string_array};
use crate::builtins::{BuiltInFunction, BuiltinFunctionCode};
use crate::env::Env;
use crate::errors::EvalError;
use crate::target::TargetKind;
use crate::typing::{FunctionType, Type};
use crate::value::Value;

use std::collections::HashMap;

use regex::Regex;

pub fn register(m: &mut HashMap<&'static str, BuiltInFunction>) {
    // Target queries.
    m.insert("author", function(vec![], Type::String, author));
    m.insert("title", function(vec![], Type::String, title));
    m.insert("description", function(vec![], Type::String, description));
    m.insert(
        "labels",
        function(vec![], Type::array_of(Type::String), labels),
    );
    m.insert(
        "assignees",
        function(vec![], Type::array_of(Type::String), assignees),
    );
    m.insert("createdAt", function(vec![], Type::Time, created_at));
    m.insert("lastEventAt", function(vec![], Type::Time, last_event_at));
    m.insert("commentCount", function(vec![], Type::Int, comment_count));

    // Pull-request-only queries.
    m.insert(
        "reviewers",
        pr_function(vec![], Type::array_of(Type::String), reviewers),
    );
    m.insert(
        "filesPath",
        pr_function(vec![], Type::array_of(Type::String), files_path),
    );
    m.insert("fileCount", pr_function(vec![], Type::Int, file_count));
    m.insert("isDraft", pr_function(vec![], Type::Bool, is_draft));
    m.insert("head", pr_function(vec![], Type::String, head));
    m.insert("base", pr_function(vec![], Type::String, base));
    m.insert(
        "hasCodePattern",
        pr_function(vec![Type::String], Type::Bool, has_code_pattern),
    );
    m.insert(
        "hasFileName",
        pr_function(vec![Type::String], Type::Bool, has_file_name),
    );
    m.insert(
        "hasFileExtensions",
        pr_function(
            vec![Type::array_of(Type::String)],
            Type::Bool,
            has_file_extensions,
        ),
    );

    // Pure helpers.
    m.insert(
        "contains",
        function(vec![Type::String, Type::String], Type::Bool, contains),
    );
    m.insert(
        "startsWith",
        function(vec![Type::String, Type::String], Type::Bool, starts_with),
    );
    m.insert(
        "matchString",
        function(vec![Type::String, Type::String], Type::Bool, match_string),
    );
    m.insert("length", function(vec![Type::DynamicArray], Type::Int, length));
    m.insert(
        "isElementOf",
        function(
            vec![Type::String, Type::array_of(Type::String)],
            Type::Bool,
            is_element_of,
        ),
    );
    m.insert(
        "append",
        function(
            vec![Type::DynamicArray, Type::DynamicArray],
            Type::DynamicArray,
            append,
        ),
    );
    m.insert(
        "join",
        function(
            vec![Type::array_of(Type::String), Type::String],
            Type::String,
            join,
        ),
    );
    m.insert(
        "sprintf",
        function(
            vec![Type::String, Type::DynamicArray],
            Type::String,
            sprintf,
        ),
    );

    // Conversions.
    m.insert("toBool", function(vec![Type::String], Type::Bool, to_bool));
    m.insert("toNumber", function(vec![Type::String], Type::Int, to_number));
    m.insert(
        "toStringArray",
        function(
            vec![Type::String],
            Type::array_of(Type::String),
            to_string_array,
        ),
    );

    // Configuration lookups.
    m.insert(
        "group",
        function(vec![Type::String], Type::DynamicArray, group),
    );
    m.insert(
        "dictionary",
        function(vec![Type::String, Type::String], Type::String, dictionary),
    );
}

fn function(params: Vec<Type>, ret: Type, code: BuiltinFunctionCode) -> BuiltInFunction {
    BuiltInFunction {
        sig: FunctionType::function(params, ret),
        code,
        supported_kinds: vec![],
    }
}

fn pr_function(params: Vec<Type>, ret: Type, code: BuiltinFunctionCode) -> BuiltInFunction {
    BuiltInFunction {
        sig: FunctionType::function(params, ret),
        code,
        supported_kinds: vec![TargetKind::PullRequest],
    }
}

fn author(env: &Env, _args: &[Value]) -> Result<Value, EvalError> {
    Ok(env.target().author()?.into())
}

fn title(env: &Env, _args: &[Value]) -> Result<Value, EvalError> {
    Ok(env.target().title()?.into())
}

fn description(env: &Env, _args: &[Value]) -> Result<Value, EvalError> {
    Ok(env.target().description()?.into())
}

fn labels(env: &Env, _args: &[Value]) -> Result<Value, EvalError> {
    let labels = env.target().labels()?;
    Ok(Value::from_array(
        labels.into_iter().map(|label| label.name.into()).collect(),
    ))
}

fn assignees(env: &Env, _args: &[Value]) -> Result<Value, EvalError> {
    let logins = env.target().assignees()?;
    Ok(Value::from_array(logins.into_iter().map(Value::from).collect()))
}

fn reviewers(env: &Env, _args: &[Value]) -> Result<Value, EvalError> {
    let logins = env.target().requested_reviewers()?;
    Ok(Value::from_array(logins.into_iter().map(Value::from).collect()))
}

fn created_at(env: &Env, _args: &[Value]) -> Result<Value, EvalError> {
    Ok(env.target().created_at()?.into())
}

fn last_event_at(env: &Env, _args: &[Value]) -> Result<Value, EvalError> {
    Ok(env.target().last_event_at()?.into())
}

fn comment_count(env: &Env, _args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Int(env.target().comments()?.len() as i64))
}

fn files_path(env: &Env, _args: &[Value]) -> Result<Value, EvalError> {
    let files = env.target().files()?;
    Ok(Value::from_array(
        files.into_iter().map(|file| file.filename.into()).collect(),
    ))
}

fn file_count(env: &Env, _args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Int(env.target().files()?.len() as i64))
}

fn is_draft(env: &Env, _args: &[Value]) -> Result<Value, EvalError> {
    Ok(env.target().is_draft()?.into())
}

fn head(env: &Env, _args: &[Value]) -> Result<Value, EvalError> {
    Ok(env.target().head()?.into())
}

fn base(env: &Env, _args: &[Value]) -> Result<Value, EvalError> {
    Ok(env.target().base()?.into())
}

fn has_code_pattern(env: &Env, args: &[Value]) -> Result<Value, EvalError> {
    let pattern = ensure_string(args, 0)?;
    for file in env.target().files()? {
        if file.query(&pattern)? {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

fn has_file_name(env: &Env, args: &[Value]) -> Result<Value, EvalError> {
    let name = ensure_string(args, 0)?;
    let found = env
        .target()
        .files()?
        .iter()
        .any(|file| file.filename == *name);
    Ok(Value::Bool(found))
}

fn has_file_extensions(env: &Env, args: &[Value]) -> Result<Value, EvalError> {
    let extensions = ensure_string_array(args, 0)?;
    let all = env.target().files()?.iter().all(|file| {
        let ext = match file.filename.rsplit_once('.') {
            Some((_, ext)) => format!(".{ext}"),
            None => String::new(),
        };
        extensions
            .iter()
            .any(|wanted| wanted.eq_ignore_ascii_case(&ext))
    });
    Ok(Value::Bool(all))
}

fn contains(_env: &Env, args: &[Value]) -> Result<Value, EvalError> {
    let haystack = ensure_string(args, 0)?;
    let needle = ensure_string(args, 1)?;
    Ok(Value::Bool(haystack.contains(needle.as_ref())))
}

fn starts_with(_env: &Env, args: &[Value]) -> Result<Value, EvalError> {
    let haystack = ensure_string(args, 0)?;
    let prefix = ensure_string(args, 1)?;
    Ok(Value::Bool(haystack.starts_with(prefix.as_ref())))
}

fn match_string(_env: &Env, args: &[Value]) -> Result<Value, EvalError> {
    let pattern = ensure_string(args, 0)?;
    let subject = ensure_string(args, 1)?;
    let re = Regex::new(&pattern).map_err(|source| EvalError::RegexCompile {
        pattern: pattern.to_string(),
        source,
    })?;
    Ok(Value::Bool(re.is_match(&subject)))
}

fn length(_env: &Env, args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Int(ensure_array(args, 0)?.len() as i64))
}

fn is_element_of(_env: &Env, args: &[Value]) -> Result<Value, EvalError> {
    let list = ensure_array(args, 1)?;
    Ok(Value::Bool(list.iter().any(|item| item == &args[0])))
}

fn append(_env: &Env, args: &[Value]) -> Result<Value, EvalError> {
    let mut items = ensure_array(args, 0)?;
    items.extend(ensure_array(args, 1)?);
    Ok(Value::from_array(items))
}

fn join(_env: &Env, args: &[Value]) -> Result<Value, EvalError> {
    let parts = ensure_string_array(args, 0)?;
    let separator = ensure_string(args, 1)?;
    Ok(parts.join(&separator).into())
}

/// `%v` is the only verb: each occurrence is replaced by the next element of
/// the argument array, strings unquoted and every other kind via its JSON
/// rendering. Leftover verbs render as the empty string.
fn sprintf(_env: &Env, args: &[Value]) -> Result<Value, EvalError> {
    let format = ensure_string(args, 0)?;
    let items = ensure_array(args, 1)?;

    let mut out = String::new();
    let mut rest = format.as_ref();
    let mut next = items.iter();
    while let Some(pos) = rest.find("%v") {
        out.push_str(&rest[..pos]);
        if let Some(item) = next.next() {
            match item {
                Value::String(s) => out.push_str(s),
                other => out.push_str(&other.to_string()),
            }
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    Ok(out.into())
}

fn to_bool(_env: &Env, args: &[Value]) -> Result<Value, EvalError> {
    let s = ensure_string(args, 0)?;
    match s.as_ref() {
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        other => Err(EvalError::Conversion {
            builtin: "toBool",
            value: other.to_string(),
            reason: "expected `true` or `false`".to_string(),
        }),
    }
}

fn to_number(_env: &Env, args: &[Value]) -> Result<Value, EvalError> {
    let s = ensure_string(args, 0)?;
    s.parse::<i64>()
        .map(Value::Int)
        .map_err(|err| EvalError::Conversion {
            builtin: "toNumber",
            value: s.to_string(),
            reason: err.to_string(),
        })
}

fn to_string_array(_env: &Env, args: &[Value]) -> Result<Value, EvalError> {
    let s = ensure_string(args, 0)?;
    let parts: Vec<String> =
        serde_json::from_str(&s).map_err(|err| EvalError::Conversion {
            builtin: "toStringArray",
            value: s.to_string(),
            reason: err.to_string(),
        })?;
    Ok(Value::from_array(parts.into_iter().map(Value::from).collect()))
}

fn group(env: &Env, args: &[Value]) -> Result<Value, EvalError> {
    let name = ensure_string(args, 0)?;
    env.group(&name).ok_or_else(|| EvalError::UnknownGroup {
        name: name.to_string(),
    })
}

fn dictionary(env: &Env, args: &[Value]) -> Result<Value, EvalError> {
    let name = ensure_string(args, 0)?;
    let key = ensure_string(args, 1)?;
    match env.dictionary_lookup(&name, &key) {
        None => Err(EvalError::UnknownDictionary {
            name: name.to_string(),
        }),
        Some(None) => Err(EvalError::DictionaryLookup {
            dictionary: name.to_string(),
            key: key.to_string(),
        }),
        Some(Some(value)) => Ok(value.into()),
    }
}
