// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::common::{mock_env, MockTarget};
use crate::*;

use std::rc::Rc;

use anyhow::Result;

fn env() -> Env {
    mock_env(Rc::new(MockTarget::pull_request()))
}

fn run_action(env: &Env, expr: std::rc::Rc<Expr>) -> std::result::Result<(), EvalError> {
    let exec = type_check_exec(env, expr)?;
    exec_action(env, &exec)
}

#[test]
fn string_predicates() -> Result<()> {
    let env = env();
    let cases = [
        ("contains", "hello world", "world", true),
        ("contains", "hello world", "mars", false),
        ("startsWith", "hello world", "hello", true),
        ("startsWith", "hello world", "world", false),
    ];
    for (name, haystack, needle, expected) in cases {
        let expr = Expr::call(name, vec![Expr::string(haystack), Expr::string(needle)]);
        assert_eq!(eval(&env, &expr)?, Value::Bool(expected), "{name}({needle})");
    }
    Ok(())
}

#[test]
fn match_string_applies_the_pattern() -> Result<()> {
    let env = env();
    let expr = Expr::call(
        "matchString",
        vec![Expr::string(r"^feat(ure)?/"), Expr::string("feature/frob")],
    );
    assert_eq!(eval(&env, &expr)?, Value::Bool(true));
    Ok(())
}

#[test]
fn match_string_rejects_invalid_patterns() {
    let env = env();
    let expr = Expr::call(
        "matchString",
        vec![Expr::string("previous("), Expr::string("anything")],
    );
    assert!(matches!(
        eval(&env, &expr).unwrap_err(),
        EvalError::RegexCompile { .. }
    ));
}

#[test]
fn array_helpers() -> Result<()> {
    let env = env();

    let len = Expr::call(
        "length",
        vec![Expr::array(vec![Expr::string("a"), Expr::string("b")])],
    );
    assert_eq!(eval(&env, &len)?, Value::Int(2));

    let appended = Expr::call(
        "append",
        vec![
            Expr::array(vec![Expr::string("a")]),
            Expr::array(vec![Expr::string("b"), Expr::string("c")]),
        ],
    );
    assert_eq!(
        eval(&env, &appended)?,
        Value::from_array(vec!["a".into(), "b".into(), "c".into()])
    );

    let joined = Expr::call(
        "join",
        vec![
            Expr::array(vec![Expr::string("a"), Expr::string("b")]),
            Expr::string("-"),
        ],
    );
    assert_eq!(eval(&env, &joined)?, Value::from("a-b"));
    Ok(())
}

#[test]
fn is_element_of() -> Result<()> {
    let env = env();
    let hit = Expr::call(
        "isElementOf",
        vec![
            Expr::string("b"),
            Expr::array(vec![Expr::string("a"), Expr::string("b")]),
        ],
    );
    assert_eq!(eval(&env, &hit)?, Value::Bool(true));

    let miss = Expr::call(
        "isElementOf",
        vec![Expr::string("z"), Expr::array(vec![Expr::string("a")])],
    );
    assert_eq!(eval(&env, &miss)?, Value::Bool(false));
    Ok(())
}

#[test]
fn sprintf_substitutes_in_order() -> Result<()> {
    let env = env();
    let expr = Expr::call(
        "sprintf",
        vec![
            Expr::string("%v has %v files"),
            Expr::array(vec![Expr::string("pr"), Expr::int(3)]),
        ],
    );
    assert_eq!(eval(&env, &expr)?, Value::from("pr has 3 files"));
    Ok(())
}

#[test]
fn conversions() -> Result<()> {
    let env = env();
    assert_eq!(
        eval(&env, &Expr::call("toBool", vec![Expr::string("true")]))?,
        Value::Bool(true)
    );
    assert_eq!(
        eval(&env, &Expr::call("toNumber", vec![Expr::string("42")]))?,
        Value::Int(42)
    );
    assert_eq!(
        eval(
            &env,
            &Expr::call("toStringArray", vec![Expr::string(r#"["a","b"]"#)])
        )?,
        Value::from_array(vec!["a".into(), "b".into()])
    );
    Ok(())
}

#[test]
fn failed_conversions_are_errors() {
    let env = env();
    for (name, input) in [("toBool", "yes"), ("toNumber", "one"), ("toStringArray", "[1]")] {
        let expr = Expr::call(name, vec![Expr::string(input)]);
        assert!(
            matches!(eval(&env, &expr).unwrap_err(), EvalError::Conversion { .. }),
            "{name}({input})"
        );
    }
}

#[test]
fn group_resolves_bound_collections() -> Result<()> {
    let env = env();
    env.bind_group("owners", Value::from_array(vec!["alice".into(), "bob".into()]));
    let expr = Expr::call("group", vec![Expr::string("owners")]);
    assert_eq!(
        eval(&env, &expr)?,
        Value::from_array(vec!["alice".into(), "bob".into()])
    );

    let missing = Expr::call("group", vec![Expr::string("nobody")]);
    assert!(matches!(
        eval(&env, &missing).unwrap_err(),
        EvalError::UnknownGroup { .. }
    ));
    Ok(())
}

#[test]
fn dictionary_lookups() -> Result<()> {
    let env = env();
    env.load_dictionary(
        "severities",
        vec![("high".to_string(), "P1".to_string())],
    );

    let hit = Expr::call(
        "dictionary",
        vec![Expr::string("severities"), Expr::string("high")],
    );
    assert_eq!(eval(&env, &hit)?, Value::from("P1"));

    let bad_key = Expr::call(
        "dictionary",
        vec![Expr::string("severities"), Expr::string("low")],
    );
    assert!(matches!(
        eval(&env, &bad_key).unwrap_err(),
        EvalError::DictionaryLookup { .. }
    ));

    let bad_dict = Expr::call(
        "dictionary",
        vec![Expr::string("unknown"), Expr::string("high")],
    );
    assert!(matches!(
        eval(&env, &bad_dict).unwrap_err(),
        EvalError::UnknownDictionary { .. }
    ));
    Ok(())
}

fn target_with_files() -> Rc<MockTarget> {
    let mut target = MockTarget::pull_request();
    target.files = vec![
        File::new(
            "src/main.go",
            "@@ -1,3 +1,3 @@\n func main() {\n-\tfmt.Println(\"old\")\n+\tlog.Println(\"new\")\n }",
        )
        .unwrap(),
        File::new("docs/readme.md", "@@ -0,0 +1,1 @@\n+# Widgets").unwrap(),
    ];
    Rc::new(target)
}

#[test]
fn file_queries() -> Result<()> {
    let env = mock_env(target_with_files());

    assert_eq!(
        eval(&env, &Expr::call("fileCount", vec![]))?,
        Value::Int(2)
    );
    assert_eq!(
        eval(&env, &Expr::call("filesPath", vec![]))?,
        Value::from_array(vec!["src/main.go".into(), "docs/readme.md".into()])
    );

    let named = Expr::call("hasFileName", vec![Expr::string("src/main.go")]);
    assert_eq!(eval(&env, &named)?, Value::Bool(true));

    let extensions = Expr::call(
        "hasFileExtensions",
        vec![Expr::array(vec![Expr::string(".go"), Expr::string(".md")])],
    );
    assert_eq!(eval(&env, &extensions)?, Value::Bool(true));

    let only_go = Expr::call(
        "hasFileExtensions",
        vec![Expr::array(vec![Expr::string(".go")])],
    );
    assert_eq!(eval(&env, &only_go)?, Value::Bool(false));
    Ok(())
}

#[test]
fn has_code_pattern_searches_both_sides() -> Result<()> {
    let env = mock_env(target_with_files());

    let in_new = Expr::call("hasCodePattern", vec![Expr::string(r"log\.Println")]);
    assert_eq!(eval(&env, &in_new)?, Value::Bool(true));

    let in_old = Expr::call("hasCodePattern", vec![Expr::string(r"fmt\.Println")]);
    assert_eq!(eval(&env, &in_old)?, Value::Bool(true));

    let absent = Expr::call("hasCodePattern", vec![Expr::string("panic")]);
    assert_eq!(eval(&env, &absent)?, Value::Bool(false));

    let invalid = Expr::call("hasCodePattern", vec![Expr::string("previous(")]);
    assert!(matches!(
        eval(&env, &invalid).unwrap_err(),
        EvalError::RegexCompile { .. }
    ));
    Ok(())
}

#[test]
fn target_metadata_queries() -> Result<()> {
    let target = Rc::new(MockTarget::pull_request());
    let env = mock_env(target.clone());

    assert_eq!(
        eval(&env, &Expr::call("createdAt", vec![]))?.as_time()?,
        target.created_at
    );
    assert_eq!(
        eval(&env, &Expr::call("lastEventAt", vec![]))?.as_time()?,
        target.last_event_at
    );
    assert_eq!(eval(&env, &Expr::call("head", vec![]))?, Value::from("feature/frob"));
    assert_eq!(eval(&env, &Expr::call("base", vec![]))?, Value::from("main"));
    assert_eq!(eval(&env, &Expr::call("commentCount", vec![]))?, Value::Int(0));
    Ok(())
}

#[test]
fn add_and_remove_label() -> Result<()> {
    let target = Rc::new(MockTarget::pull_request());
    let env = mock_env(target.clone());

    run_action(&env, Expr::call("addLabel", vec![Expr::string("bug")]))?;
    assert_eq!(target.labels.borrow().len(), 1);

    run_action(&env, Expr::call("removeLabel", vec![Expr::string("bug")]))?;
    assert!(target.labels.borrow().is_empty());
    Ok(())
}

#[test]
fn remove_label_tolerates_missing_labels() -> Result<()> {
    let target = Rc::new(MockTarget::pull_request());
    let env = mock_env(target.clone());

    run_action(&env, Expr::call("removeLabel", vec![Expr::string("gone")]))?;
    assert!(target.mutation_log.borrow().is_empty());
    Ok(())
}

#[test]
fn remove_labels_removes_each() -> Result<()> {
    let target = Rc::new(MockTarget::pull_request());
    let env = mock_env(target.clone());
    run_action(&env, Expr::call("addLabel", vec![Expr::string("a")]))?;
    run_action(&env, Expr::call("addLabel", vec![Expr::string("b")]))?;

    let expr = Expr::call(
        "removeLabels",
        vec![Expr::array(vec![Expr::string("a"), Expr::string("b")])],
    );
    run_action(&env, expr)?;
    assert!(target.labels.borrow().is_empty());
    Ok(())
}

#[test]
fn comment_once_skips_duplicates() -> Result<()> {
    let target = Rc::new(MockTarget::pull_request());
    let env = mock_env(target.clone());
    let expr = Expr::call("commentOnce", vec![Expr::string("ping")]);

    run_action(&env, expr.clone())?;
    run_action(&env, expr)?;
    assert_eq!(target.comments.borrow().len(), 1);
    Ok(())
}

#[test]
fn assign_reviewer_filters_author_and_requested() -> Result<()> {
    let target = Rc::new(MockTarget::pull_request());
    target.requested_reviewers.borrow_mut().push("carol".to_string());
    let env = mock_env(target.clone());

    // alice is the author, carol is already requested.
    let expr = Expr::call(
        "assignReviewer",
        vec![
            Expr::array(vec![
                Expr::string("alice"),
                Expr::string("carol"),
                Expr::string("bob"),
                Expr::string("dave"),
            ]),
            Expr::int(2),
        ],
    );
    run_action(&env, expr)?;
    assert_eq!(
        target.mutation_log.borrow().as_slice(),
        ["request_reviewers bob"]
    );
    Ok(())
}

#[test]
fn dry_run_suppresses_mutations() -> Result<()> {
    let target = Rc::new(MockTarget::pull_request());
    let env = mock_env(target.clone()).with_dry_run(true);

    run_action(&env, Expr::call("addLabel", vec![Expr::string("bug")]))?;
    run_action(&env, Expr::call("close", vec![]))?;
    assert!(target.mutation_log.borrow().is_empty());
    Ok(())
}

#[test]
fn cancellation_stops_mutating_actions() {
    let target = Rc::new(MockTarget::pull_request());
    let cancellation = Cancellation::new();
    let env = mock_env(target.clone()).with_cancellation(cancellation.clone());
    cancellation.cancel();

    let err = run_action(&env, Expr::call("close", vec![])).unwrap_err();
    assert!(matches!(err, EvalError::ExternalAction(_)));
    assert!(target.mutation_log.borrow().is_empty());
}

#[test]
fn report_actions_accumulate_on_the_env() -> Result<()> {
    let env = env();
    run_action(&env, Expr::call("info", vec![Expr::string("fyi")]))?;
    run_action(&env, Expr::call("warn", vec![Expr::string("careful")]))?;
    run_action(&env, Expr::call("error", vec![Expr::string("broken")]))?;

    let report = env.report();
    assert_eq!(report.len(), 3);
    assert_eq!(report[0].severity, Severity::Info);
    assert_eq!(report[1].severity, Severity::Warn);
    assert_eq!(report[2].severity, Severity::Error);
    assert_eq!(report[2].text, "broken");
    Ok(())
}

#[test]
fn custom_builtins_can_reach_registered_services() -> Result<()> {
    struct FakeSemantic {
        answer: bool,
    }

    let mut builtins = BuiltIns::defaults();
    builtins.add_service(SEMANTIC_SERVICE_KEY, Rc::new(FakeSemantic { answer: true }));
    builtins.add_function(
        "semanticMatch",
        BuiltInFunction {
            sig: FunctionType::function(vec![Type::String], Type::Bool),
            code: |env, _args| {
                let service = env.builtins().service(SEMANTIC_SERVICE_KEY).ok_or_else(|| {
                    EvalError::UnknownIdentifier {
                        name: SEMANTIC_SERVICE_KEY.to_string(),
                    }
                })?;
                let semantic = service
                    .downcast::<FakeSemantic>()
                    .map_err(|_| EvalError::UnexpectedKind {
                        expected: "semantic service".to_string(),
                        actual: "other service".to_string(),
                    })?;
                Ok(Value::Bool(semantic.answer))
            },
            supported_kinds: vec![],
        },
    );

    let env = Env::new(
        Rc::new(MockTarget::pull_request()),
        Rc::new(builtins),
        Rc::new(LogCollector),
    );
    let expr = Expr::call("semanticMatch", vec![Expr::string("whatever")]);
    assert_eq!(eval(&env, &expr)?, Value::Bool(true));
    Ok(())
}

#[test]
fn fail_records_a_failure() -> Result<()> {
    let env = env();
    assert!(env.failure().is_none());
    run_action(&env, Expr::call("fail", vec![Expr::string("policy violated")]))?;
    assert_eq!(env.failure().as_deref(), Some("policy violated"));
    Ok(())
}
