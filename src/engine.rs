// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::{ConfigurationFile, Expr, Run, Workflow};
use crate::env::Env;
use crate::errors::EvalError;
use crate::exec::{exec_action, type_check_exec, ExecExpr};
use crate::interpreter::eval;
use crate::type_checker::type_inference;
use crate::typing::Type;
use crate::Ref;

use core::fmt;

use serde::Serialize;

/// One resolved, type-checked action invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Statement {
    code: ExecExpr,
}

impl Statement {
    pub fn code(&self) -> &ExecExpr {
        &self.code
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

/// Ordered list of statements produced by evaluating a configuration file
/// against a target. Executing it replays the statements in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Program {
    statements: Vec<Statement>,
}

impl Program {
    pub fn new() -> Program {
        Program::default()
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    fn append(&mut self, code: ExecExpr) {
        self.statements.push(Statement { code });
    }
}

/// Outcome of a completed run. Errors are not a status: they surface as the
/// `Err` arm of [`exec_program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitStatus {
    Success,
    /// The configuration raised an explicit failure via the `fail` built-in.
    Failure,
}

/// Evaluates `file` against the environment's target and builds the program
/// to execute. Any evaluation or type error discards the partial program.
pub fn eval_configuration_file(
    env: &Env,
    file: &ConfigurationFile,
) -> Result<Program, EvalError> {
    ensure_labels_exist(env, file)?;

    for dictionary in &file.dictionaries {
        env.load_dictionary(&dictionary.name, dictionary.entries.clone());
    }

    for group in &file.groups {
        let value = eval(env, &group.spec)?;
        value.elements()?;
        env.bind_group(&group.name, value);
    }

    let mut program = Program::new();

    let kind = env.target().entity().kind;
    for workflow in &file.workflows {
        if !workflow.on.is_empty() && !workflow.on.contains(&kind) {
            log::debug!("workflow {} skipped: not for {kind} targets", workflow.name);
            continue;
        }
        if !workflow_activated(env, file, workflow)? {
            log::debug!("workflow {} not activated", workflow.name);
            continue;
        }
        log::info!("workflow {} activated", workflow.name);
        expand_runs(env, &mut program, &workflow.runs)?;
    }

    for pipeline in &file.pipelines {
        let triggered = match &pipeline.trigger {
            Some(trigger) => eval_condition(env, trigger)?,
            None => true,
        };
        if !triggered {
            continue;
        }
        log::info!("pipeline {} triggered", pipeline.name);
        // The first incomplete stage contributes its actions; later stages
        // wait for it to complete on a future run.
        for stage in &pipeline.stages {
            let complete = match &stage.until {
                Some(until) => eval_condition(env, until)?,
                None => false,
            };
            if !complete {
                for action in &stage.actions {
                    append_action(env, &mut program, action)?;
                }
                break;
            }
        }
    }

    Ok(program)
}

/// Runs the statements in order. The first action error halts the run; a
/// failure recorded by the `fail` built-in halts it with `Failure` and no
/// error.
pub fn exec_program(env: &Env, program: &Program) -> Result<ExitStatus, EvalError> {
    for statement in program.statements() {
        log::info!("executing {statement}");
        exec_action(env, statement.code())?;
        if let Some(reason) = env.failure() {
            log::info!("run failed: {reason}");
            return Ok(ExitStatus::Failure);
        }
    }
    Ok(ExitStatus::Success)
}

/// Builds and immediately executes the program for `file`.
pub fn exec_configuration_file(
    env: &Env,
    file: &ConfigurationFile,
) -> Result<(ExitStatus, Program), EvalError> {
    let program = eval_configuration_file(env, file)?;
    let status = exec_program(env, &program)?;
    Ok((status, program))
}

/// Creates every declared label missing from the repository. Fetch and create
/// failures abort the run; dry-run skips the whole step.
fn ensure_labels_exist(env: &Env, file: &ConfigurationFile) -> Result<(), EvalError> {
    if env.dry_run() {
        return Ok(());
    }
    for definition in &file.labels {
        match env.target().repo_label(&definition.name) {
            Ok(_) => {}
            Err(err) if err.is_not_found() => {
                log::info!("creating missing label {}", definition.name);
                env.target().create_repo_label(definition)?;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn workflow_activated(
    env: &Env,
    file: &ConfigurationFile,
    workflow: &Workflow,
) -> Result<bool, EvalError> {
    if workflow.always_run || workflow.rules.is_empty() {
        return Ok(true);
    }
    for name in &workflow.rules {
        let rule = file
            .rules
            .iter()
            .find(|rule| &rule.name == name)
            .ok_or_else(|| EvalError::UnknownRule { name: name.clone() })?;
        if eval_condition(env, &rule.spec)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn expand_runs(env: &Env, program: &mut Program, runs: &[Run]) -> Result<(), EvalError> {
    for run in runs {
        match run {
            Run::Actions(actions) => {
                for action in actions {
                    append_action(env, program, action)?;
                }
            }
            Run::If {
                cond,
                then,
                otherwise,
            } => {
                let taken = if eval_condition(env, cond)? { then } else { otherwise };
                expand_runs(env, program, taken)?;
            }
            Run::ForEach {
                variable,
                collection,
                body,
            } => {
                let items = eval(env, collection)?.elements()?;
                let previous = env.register(variable);
                for item in items {
                    env.bind_register(variable, item);
                    if let Err(err) = expand_runs(env, program, body) {
                        env.restore_register(variable, previous);
                        return Err(err);
                    }
                }
                env.restore_register(variable, previous);
            }
        }
    }
    Ok(())
}

/// Type-checks one action call and appends it to the program. Loop-variable
/// references are substituted with their current values first: the bindings
/// are gone by the time the program runs.
fn append_action(env: &Env, program: &mut Program, action: &Ref<Expr>) -> Result<(), EvalError> {
    let resolved = resolve_expr(env, action)?;
    program.append(type_check_exec(env, resolved)?);
    Ok(())
}

fn resolve_expr(env: &Env, expr: &Ref<Expr>) -> Result<Ref<Expr>, EvalError> {
    Ok(match expr.as_ref() {
        Expr::Variable(name) => match env.register(name) {
            Some(value) => Expr::from_value(&value),
            None => {
                return Err(EvalError::UndefinedVariable {
                    name: name.to_string(),
                })
            }
        },
        Expr::ArrayConst(elems) => Expr::array(
            elems
                .iter()
                .map(|elem| resolve_expr(env, elem))
                .collect::<Result<_, _>>()?,
        ),
        Expr::UnaryOp { op: _, expr: inner } => Expr::not(resolve_expr(env, inner)?),
        Expr::BinaryOp { op, lhs, rhs } => {
            Expr::binary(*op, resolve_expr(env, lhs)?, resolve_expr(env, rhs)?)
        }
        Expr::FunctionCall { name, args } => Ref::new(Expr::FunctionCall {
            name: name.clone(),
            args: args
                .iter()
                .map(|arg| resolve_expr(env, arg))
                .collect::<Result<_, _>>()?,
        }),
        _ => expr.clone(),
    })
}

fn eval_condition(env: &Env, expr: &Ref<Expr>) -> Result<bool, EvalError> {
    match type_inference(env, expr)? {
        Some(Type::Bool) => {}
        other => {
            return Err(EvalError::UnexpectedKind {
                expected: "bool".to_string(),
                actual: match other {
                    Some(t) => t.to_string(),
                    None => "()".to_string(),
                },
            })
        }
    }
    eval(env, expr)?.as_bool()
}
