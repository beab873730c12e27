// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::builtins::utils::{ensure_int, ensure_string, ensure_string_array};
use crate::builtins::{BuiltInAction, BuiltinActionCode};
use crate::env::{Env, Severity};
use crate::errors::EvalError;
use crate::target::TargetKind;
use crate::typing::{FunctionType, Type};
use crate::value::Value;

use std::collections::HashMap;

pub fn register(m: &mut HashMap<&'static str, BuiltInAction>) {
    m.insert("addLabel", action(vec![Type::String], add_label));
    m.insert("removeLabel", action(vec![Type::String], remove_label));
    m.insert(
        "removeLabels",
        action(vec![Type::array_of(Type::String)], remove_labels),
    );
    m.insert("comment", action(vec![Type::String], comment));
    m.insert("commentOnce", action(vec![Type::String], comment_once));
    m.insert(
        "assignAssignees",
        action(vec![Type::array_of(Type::String)], assign_assignees),
    );
    m.insert(
        "assignReviewer",
        pr_action(
            vec![Type::array_of(Type::String), Type::Int],
            assign_reviewer,
        ),
    );
    m.insert("close", action(vec![], close));
    m.insert("merge", pr_action(vec![Type::String], merge));

    m.insert("fail", action(vec![Type::String], fail));
    m.insert("error", action(vec![Type::String], report_error));
    m.insert("warn", action(vec![Type::String], report_warn));
    m.insert("info", action(vec![Type::String], report_info));
}

fn action(params: Vec<Type>, code: BuiltinActionCode) -> BuiltInAction {
    BuiltInAction {
        sig: FunctionType::action(params),
        code,
        supported_kinds: vec![],
    }
}

fn pr_action(params: Vec<Type>, code: BuiltinActionCode) -> BuiltInAction {
    BuiltInAction {
        sig: FunctionType::action(params),
        code,
        supported_kinds: vec![TargetKind::PullRequest],
    }
}

fn add_label(env: &Env, args: &[Value]) -> Result<(), EvalError> {
    let name = ensure_string(args, 0)?;
    env.check_cancellation()?;
    if env.dry_run() {
        log::info!("dry-run: addLabel {name}");
        return Ok(());
    }
    Ok(env.target().add_label(&name)?)
}

fn remove_label(env: &Env, args: &[Value]) -> Result<(), EvalError> {
    let name = ensure_string(args, 0)?;
    remove_one_label(env, &name)
}

fn remove_labels(env: &Env, args: &[Value]) -> Result<(), EvalError> {
    for name in ensure_string_array(args, 0)? {
        remove_one_label(env, &name)?;
    }
    Ok(())
}

fn remove_one_label(env: &Env, name: &str) -> Result<(), EvalError> {
    env.check_cancellation()?;
    if env.dry_run() {
        log::info!("dry-run: removeLabel {name}");
        return Ok(());
    }
    match env.target().remove_label(name) {
        // Removing a label that is not attached is already the desired state.
        Err(err) if err.is_not_found() => Ok(()),
        result => Ok(result?),
    }
}

fn comment(env: &Env, args: &[Value]) -> Result<(), EvalError> {
    let body = ensure_string(args, 0)?;
    env.check_cancellation()?;
    if env.dry_run() {
        log::info!("dry-run: comment");
        return Ok(());
    }
    Ok(env.target().add_comment(&body)?)
}

fn comment_once(env: &Env, args: &[Value]) -> Result<(), EvalError> {
    let body = ensure_string(args, 0)?;
    env.check_cancellation()?;
    if env.target().comments()?.iter().any(|c| c == body.as_ref()) {
        return Ok(());
    }
    if env.dry_run() {
        log::info!("dry-run: commentOnce");
        return Ok(());
    }
    Ok(env.target().add_comment(&body)?)
}

fn assign_assignees(env: &Env, args: &[Value]) -> Result<(), EvalError> {
    let logins = ensure_string_array(args, 0)?;
    env.check_cancellation()?;
    if env.dry_run() {
        log::info!("dry-run: assignAssignees {logins:?}");
        return Ok(());
    }
    Ok(env.target().assign_assignees(&logins)?)
}

/// Requests up to `total` reviewers from the candidate list, skipping the
/// author and anyone already requested. Requesting nobody is a no-op.
fn assign_reviewer(env: &Env, args: &[Value]) -> Result<(), EvalError> {
    let candidates = ensure_string_array(args, 0)?;
    let total = ensure_int(args, 1)?.max(0) as usize;
    env.check_cancellation()?;

    let author = env.target().author()?;
    let requested = env.target().requested_reviewers()?;
    let picked: Vec<String> = candidates
        .into_iter()
        .filter(|login| *login != author && !requested.contains(login))
        .take(total.saturating_sub(requested.len()))
        .collect();
    if picked.is_empty() {
        return Ok(());
    }
    if env.dry_run() {
        log::info!("dry-run: assignReviewer {picked:?}");
        return Ok(());
    }
    Ok(env.target().request_reviewers(&picked)?)
}

fn close(env: &Env, _args: &[Value]) -> Result<(), EvalError> {
    env.check_cancellation()?;
    if env.dry_run() {
        log::info!("dry-run: close");
        return Ok(());
    }
    Ok(env.target().close()?)
}

fn merge(env: &Env, args: &[Value]) -> Result<(), EvalError> {
    let method = ensure_string(args, 0)?;
    env.check_cancellation()?;
    if env.dry_run() {
        log::info!("dry-run: merge ({method})");
        return Ok(());
    }
    Ok(env.target().merge(&method)?)
}

fn fail(env: &Env, args: &[Value]) -> Result<(), EvalError> {
    let reason = ensure_string(args, 0)?;
    env.record_failure(&reason);
    Ok(())
}

fn report_error(env: &Env, args: &[Value]) -> Result<(), EvalError> {
    env.report_message(Severity::Error, &ensure_string(args, 0)?);
    Ok(())
}

fn report_warn(env: &Env, args: &[Value]) -> Result<(), EvalError> {
    env.report_message(Severity::Warn, &ensure_string(args, 0)?);
    Ok(())
}

fn report_info(env: &Env, args: &[Value]) -> Result<(), EvalError> {
    env.report_message(Severity::Info, &ensure_string(args, 0)?);
    Ok(())
}
