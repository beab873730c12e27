// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Shared test fixtures: an in-memory code host and a recording collector.

use crate::*;

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value as JsonValue;

pub struct MockTarget {
    pub entity: TargetEntity,
    pub author: String,
    pub title: String,
    pub description: String,
    pub is_draft: bool,
    pub created_at: DateTime<Utc>,
    pub last_event_at: DateTime<Utc>,
    pub head: String,
    pub base: String,
    pub files: Vec<File>,
    pub labels: RefCell<Vec<Label>>,
    pub repo_labels: RefCell<Vec<Label>>,
    pub assignees: RefCell<Vec<String>>,
    pub requested_reviewers: RefCell<Vec<String>>,
    pub comments: RefCell<Vec<String>>,
    /// Every applied mutation, in order, one line each.
    pub mutation_log: RefCell<Vec<String>>,
    /// Mutation method names that fail with an API error.
    pub fail_on: RefCell<Vec<&'static str>>,
}

impl MockTarget {
    pub fn pull_request() -> MockTarget {
        MockTarget {
            entity: TargetEntity {
                kind: TargetKind::PullRequest,
                owner: "acme".to_string(),
                repo: "widgets".to_string(),
                number: 42,
            },
            author: "alice".to_string(),
            title: "Add frobnicator".to_string(),
            description: "Implements the frobnicator.".to_string(),
            is_draft: false,
            created_at: Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap(),
            last_event_at: Utc.with_ymd_and_hms(2023, 5, 2, 9, 30, 0).unwrap(),
            head: "feature/frob".to_string(),
            base: "main".to_string(),
            files: vec![],
            labels: RefCell::new(vec![]),
            repo_labels: RefCell::new(vec![]),
            assignees: RefCell::new(vec![]),
            requested_reviewers: RefCell::new(vec![]),
            comments: RefCell::new(vec![]),
            mutation_log: RefCell::new(vec![]),
            fail_on: RefCell::new(vec![]),
        }
    }

    pub fn issue() -> MockTarget {
        let mut target = MockTarget::pull_request();
        target.entity.kind = TargetKind::Issue;
        target
    }

    fn check(&self, method: &'static str) -> HostResult<()> {
        if self.fail_on.borrow().contains(&method) {
            return Err(CodeHostError::Api(format!("{method} rejected")));
        }
        Ok(())
    }

    fn record(&self, entry: String) {
        self.mutation_log.borrow_mut().push(entry);
    }
}

impl Target for MockTarget {
    fn entity(&self) -> &TargetEntity {
        &self.entity
    }

    fn author(&self) -> HostResult<String> {
        Ok(self.author.clone())
    }

    fn title(&self) -> HostResult<String> {
        Ok(self.title.clone())
    }

    fn description(&self) -> HostResult<String> {
        Ok(self.description.clone())
    }

    fn labels(&self) -> HostResult<Vec<Label>> {
        Ok(self.labels.borrow().clone())
    }

    fn assignees(&self) -> HostResult<Vec<String>> {
        Ok(self.assignees.borrow().clone())
    }

    fn requested_reviewers(&self) -> HostResult<Vec<String>> {
        Ok(self.requested_reviewers.borrow().clone())
    }

    fn comments(&self) -> HostResult<Vec<String>> {
        Ok(self.comments.borrow().clone())
    }

    fn is_draft(&self) -> HostResult<bool> {
        Ok(self.is_draft)
    }

    fn created_at(&self) -> HostResult<DateTime<Utc>> {
        Ok(self.created_at)
    }

    fn last_event_at(&self) -> HostResult<DateTime<Utc>> {
        Ok(self.last_event_at)
    }

    fn head(&self) -> HostResult<String> {
        Ok(self.head.clone())
    }

    fn base(&self) -> HostResult<String> {
        Ok(self.base.clone())
    }

    fn files(&self) -> HostResult<Vec<File>> {
        Ok(self.files.clone())
    }

    fn repo_label(&self, name: &str) -> HostResult<Label> {
        self.check("repo_label")?;
        self.repo_labels
            .borrow()
            .iter()
            .find(|label| label.name == name)
            .cloned()
            .ok_or_else(|| CodeHostError::NotFound(format!("label {name}")))
    }

    fn create_repo_label(&self, label: &LabelDefinition) -> HostResult<()> {
        self.check("create_repo_label")?;
        self.record(format!("create_repo_label {}", label.name));
        self.repo_labels.borrow_mut().push(Label {
            name: label.name.clone(),
            color: label.color.clone(),
            description: label.description.clone(),
        });
        Ok(())
    }

    fn add_label(&self, name: &str) -> HostResult<()> {
        self.check("add_label")?;
        self.record(format!("add_label {name}"));
        self.labels.borrow_mut().push(Label {
            name: name.to_string(),
            color: None,
            description: None,
        });
        Ok(())
    }

    fn remove_label(&self, name: &str) -> HostResult<()> {
        self.check("remove_label")?;
        let mut labels = self.labels.borrow_mut();
        let before = labels.len();
        labels.retain(|label| label.name != name);
        if labels.len() == before {
            return Err(CodeHostError::NotFound(format!("label {name}")));
        }
        self.record(format!("remove_label {name}"));
        Ok(())
    }

    fn add_comment(&self, body: &str) -> HostResult<()> {
        self.check("add_comment")?;
        self.record(format!("comment {body}"));
        self.comments.borrow_mut().push(body.to_string());
        Ok(())
    }

    fn assign_assignees(&self, logins: &[String]) -> HostResult<()> {
        self.check("assign_assignees")?;
        self.record(format!("assign_assignees {}", logins.join(",")));
        self.assignees.borrow_mut().extend_from_slice(logins);
        Ok(())
    }

    fn request_reviewers(&self, logins: &[String]) -> HostResult<()> {
        self.check("request_reviewers")?;
        self.record(format!("request_reviewers {}", logins.join(",")));
        self.requested_reviewers
            .borrow_mut()
            .extend_from_slice(logins);
        Ok(())
    }

    fn close(&self) -> HostResult<()> {
        self.check("close")?;
        self.record("close".to_string());
        Ok(())
    }

    fn merge(&self, method: &str) -> HostResult<()> {
        self.check("merge")?;
        self.record(format!("merge {method}"));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingCollector {
    pub events: RefCell<Vec<(String, JsonValue)>>,
}

impl Collector for RecordingCollector {
    fn collect(&self, event: &str, properties: JsonValue) {
        self.events.borrow_mut().push((event.to_string(), properties));
    }
}

pub fn mock_env(target: Rc<MockTarget>) -> Env {
    Env::new(target, Rc::new(BuiltIns::defaults()), Rc::new(LogCollector))
}
