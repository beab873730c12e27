// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::errors::EvalError;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref HUNK_HEADER: Regex =
        Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").unwrap();
}

/// Inclusive line range on one side of a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiffSpan {
    pub start: u32,
    pub end: u32,
}

/// One block of a parsed patch: either a single context line present on both
/// sides, or a change grouping one run of removed lines with the run of added
/// lines that replaces it. Either side of a change may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffBlock {
    pub is_context: bool,
    pub old: Option<DiffSpan>,
    pub new: Option<DiffSpan>,
    /// Old-side text, runs joined with `\n`. Empty when the side is absent.
    pub old_line: String,
    pub new_line: String,
}

/// A changed file and its parsed unified-diff patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct File {
    pub filename: String,
    pub diff: Vec<DiffBlock>,
}

impl File {
    /// Parses `patch` as unified-diff text. A hunk header missing its line
    /// info fails with `PatchParse` naming the 1-based chunk index.
    pub fn new(filename: &str, patch: &str) -> Result<File, EvalError> {
        let mut file = File {
            filename: filename.to_string(),
            diff: vec![],
        };

        let mut chunk = 0usize;
        let mut in_chunk = false;
        let mut old_no = 0u32;
        let mut new_no = 0u32;
        let mut old_run: Vec<&str> = vec![];
        let mut new_run: Vec<&str> = vec![];
        let mut old_start = 0u32;
        let mut new_start = 0u32;

        for line in patch.lines() {
            if line.starts_with("@@") {
                let caps =
                    HUNK_HEADER
                        .captures(line)
                        .ok_or_else(|| EvalError::PatchParse {
                            filename: filename.to_string(),
                            chunk: chunk + 1,
                            line: line.to_string(),
                            patch: patch.to_string(),
                        })?;
                chunk += 1;
                flush_change(&mut file, &mut old_run, old_start, &mut new_run, new_start);
                // The captured groups are all digits, within u32 for any
                // realistic patch.
                old_no = caps[1].parse().unwrap_or(0);
                new_no = caps[3].parse().unwrap_or(0);
                in_chunk = true;
                continue;
            }
            if !in_chunk {
                continue;
            }
            if let Some(text) = line.strip_prefix('-') {
                if old_run.is_empty() {
                    old_start = old_no;
                }
                old_run.push(text);
                old_no += 1;
            } else if let Some(text) = line.strip_prefix('+') {
                if new_run.is_empty() {
                    new_start = new_no;
                }
                new_run.push(text);
                new_no += 1;
            } else if let Some(text) = line.strip_prefix(' ') {
                flush_change(&mut file, &mut old_run, old_start, &mut new_run, new_start);
                file.append_to_diff(
                    true,
                    Some(DiffSpan {
                        start: old_no,
                        end: old_no,
                    }),
                    Some(DiffSpan {
                        start: new_no,
                        end: new_no,
                    }),
                    text.to_string(),
                    text.to_string(),
                );
                old_no += 1;
                new_no += 1;
            } else {
                // Unrecognized line ("\ No newline at end of file" and the
                // like): closes the current runs, contributes nothing.
                flush_change(&mut file, &mut old_run, old_start, &mut new_run, new_start);
            }
        }
        flush_change(&mut file, &mut old_run, old_start, &mut new_run, new_start);

        Ok(file)
    }

    /// Appends one block, preserving order. Parsing only ever adds blocks.
    pub fn append_to_diff(
        &mut self,
        is_context: bool,
        old: Option<DiffSpan>,
        new: Option<DiffSpan>,
        old_line: String,
        new_line: String,
    ) {
        self.diff.push(DiffBlock {
            is_context,
            old,
            new,
            old_line,
            new_line,
        });
    }

    /// Whether `pattern` matches the old or new text of any block. The
    /// pattern is compiled on every call; an invalid pattern always fails
    /// with `RegexCompile`, even when the diff is empty.
    pub fn query(&self, pattern: &str) -> Result<bool, EvalError> {
        let re = Regex::new(pattern).map_err(|source| EvalError::RegexCompile {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(self
            .diff
            .iter()
            .any(|block| re.is_match(&block.old_line) || re.is_match(&block.new_line)))
    }
}

fn flush_change(
    file: &mut File,
    old_run: &mut Vec<&str>,
    old_start: u32,
    new_run: &mut Vec<&str>,
    new_start: u32,
) {
    if old_run.is_empty() && new_run.is_empty() {
        return;
    }
    let old = (!old_run.is_empty()).then(|| DiffSpan {
        start: old_start,
        end: old_start + old_run.len() as u32 - 1,
    });
    let new = (!new_run.is_empty()).then(|| DiffSpan {
        start: new_start,
        end: new_start + new_run.len() as u32 - 1,
    });
    let old_line = old_run.join("\n");
    let new_line = new_run.join("\n");
    old_run.clear();
    new_run.clear();
    file.append_to_diff(false, old, new, old_line, new_line);
}
