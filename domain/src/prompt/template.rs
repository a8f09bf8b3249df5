//! Prompt templates for review backends and the arbitration moderator

use crate::review::{Issue, IssueKey};

/// Default character budget for file content embedded in a review prompt
pub const DEFAULT_MAX_CHARS_PER_FILE: usize = 3000;

/// Templates for the review and arbitration prompts
pub struct ReviewPromptTemplate;

impl ReviewPromptTemplate {
    /// System prompt for a reviewing backend
    pub fn review_system() -> &'static str {
        r#"You are a meticulous code reviewer.
You report concrete defects in the file you are given: linting problems, syntax errors, logic bugs and style violations.
Report only problems you can point to on a specific line.
When you can fix a problem by rewriting that single line, include the full corrected line."#
    }

    /// User prompt asking for the issues in one file.
    ///
    /// `content` is cut to `max_chars` characters.
    pub fn review_file(path: &str, content: &str, max_chars: usize) -> String {
        let code = truncate_chars(content, max_chars);
        format!(
            r#"Analyze this code file for issues. Return ONLY a JSON array of issues.

File: {path}

Code:
```
{code}
```

Return format:
[
  {{"file": "{path}", "line": 10, "type": "LINTING", "severity": "Medium", "message": "Issue description", "oldCode": "the current line", "newCode": "the corrected line"}}
]

Types: LINTING, SYNTAX, LOGIC, STYLE
Severity: Low, Medium, High, Critical
Line numbers are 1-based. Return [] when the file has no issues."#
        )
    }

    /// System prompt for the arbitration moderator
    pub fn arbitration_system() -> &'static str {
        r#"You are the moderator of a code review council.
Several reviewers proposed fixes for the same lines. For each location, pick the single proposal that is correct and minimal, or none if every proposal is wrong."#
    }

    /// User prompt listing competing proposals per location
    pub fn arbitration_prompt(candidates: &[(IssueKey, Vec<&Issue>)]) -> String {
        let mut prompt = String::from("Proposals by location:\n");

        for ((file, line), issues) in candidates {
            prompt.push_str(&format!("\n## {} line {}\n", file, line));
            for issue in issues {
                prompt.push_str(&format!(
                    "- backend: {} | {} {} | {}\n",
                    issue.backend,
                    issue.issue_type.as_str(),
                    issue.severity.as_str(),
                    issue.message
                ));
                if let Some(old) = &issue.suggested_old_text {
                    prompt.push_str(&format!("  old: {}\n", old));
                }
                if let Some(new) = &issue.suggested_new_text {
                    prompt.push_str(&format!("  new: {}\n", new));
                }
            }
        }

        prompt.push_str(
            r#"
Return ONLY a JSON array with one entry per location you accept:
[{"file": "path", "line": 10, "backend": "name"}]
Leave a location out to reject all of its proposals."#,
        );
        prompt
    }
}

/// Prefix of `s` holding at most `max_chars` characters
fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
