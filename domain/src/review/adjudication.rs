//! Adjudication: merging backend findings into one fix list.
//!
//! Several backends may flag the same `(file, line)`. Adjudication picks a
//! single winner per location so that the applicator never edits one line
//! twice in a round.
//!
//! The baseline rule is **first-seen-wins**: issues are visited in backend
//! registration order, then in each backend's own list order, and the
//! first fixable issue at a location wins. The rule is deterministic, so
//! running it twice over the same input yields the same list in the same
//! order.
//!
//! [`adjudicate_with_selection`] supports a moderator model that names
//! which backend should win at which location. Its output obeys the same
//! uniqueness guarantee.

use super::backend_issues::BackendIssues;
use super::entities::{Fix, Issue, IssueKey};
use crate::core::backend::BackendId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Result of one adjudication pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjudication {
    /// Fixes to apply, unique by `(file, line)`, in first-seen order
    pub fixes: Vec<Fix>,
    /// Issues dropped because no backend offered replacement text at their location
    pub unfixable: Vec<Issue>,
    /// Fixable locations a moderator chose not to apply
    pub rejected: Vec<Issue>,
}

impl Adjudication {
    /// Issues that will not be fixed by this round's fixes
    pub fn unresolved(&self) -> impl Iterator<Item = &Issue> {
        self.unfixable.iter().chain(self.rejected.iter())
    }
}

/// A moderator's choice: apply the issue `backend` reported at `key`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub file: String,
    pub line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendId>,
}

impl Selection {
    pub fn key(&self) -> IssueKey {
        (self.file.clone(), self.line)
    }
}

/// One location with every issue reported there, in visiting order.
struct Group<'a> {
    key: IssueKey,
    issues: Vec<&'a Issue>,
}

/// Group issues by location, preserving first-seen order of locations.
fn group_by_location(issues: &BackendIssues) -> Vec<Group<'_>> {
    let mut index: HashMap<IssueKey, usize> = HashMap::new();
    let mut groups: Vec<Group<'_>> = Vec::new();

    for issue in issues.flatten() {
        let key = issue.key();
        match index.get(&key) {
            Some(&i) => groups[i].issues.push(issue),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(Group {
                    key,
                    issues: vec![issue],
                });
            }
        }
    }

    groups
}

/// Fixable proposals grouped by location, in first-seen order.
///
/// Locations with no fixable proposal are left out; a moderator has
/// nothing to choose there.
pub fn fixable_candidates(issues: &BackendIssues) -> Vec<(IssueKey, Vec<&Issue>)> {
    group_by_location(issues)
        .into_iter()
        .filter_map(|group| {
            let fixable: Vec<&Issue> = group.issues.into_iter().filter(|i| i.is_fixable()).collect();
            (!fixable.is_empty()).then_some((group.key, fixable))
        })
        .collect()
}

/// First-seen-wins adjudication.
///
/// Issues without replacement text are dropped before selection; a
/// location where nobody offered replacement text is reported once in
/// [`Adjudication::unfixable`] (its first-seen issue).
pub fn adjudicate_first_seen(issues: &BackendIssues) -> Adjudication {
    let mut result = Adjudication::default();

    for group in group_by_location(issues) {
        match group.issues.iter().find(|i| i.is_fixable()) {
            Some(winner) => {
                if let Some(fix) = Fix::from_issue(winner) {
                    result.fixes.push(fix);
                }
            }
            None => result.unfixable.push(group.issues[0].clone()),
        }
    }

    result
}

/// Adjudicate using a moderator's selections.
///
/// Only selected locations become fixes. At a selected location the named
/// backend's first fixable issue wins; if that backend has none (or no
/// backend was named) the first-seen fixable issue wins instead. Selections
/// naming unknown locations are ignored. Output order is first-seen order,
/// never the moderator's order.
pub fn adjudicate_with_selection(issues: &BackendIssues, selections: &[Selection]) -> Adjudication {
    let chosen: HashMap<IssueKey, Option<&BackendId>> = selections
        .iter()
        .map(|s| (s.key(), s.backend.as_ref()))
        .collect();

    let mut result = Adjudication::default();

    for group in group_by_location(issues) {
        let Some(first_fixable) = group.issues.iter().find(|i| i.is_fixable()) else {
            result.unfixable.push(group.issues[0].clone());
            continue;
        };

        let Some(preferred) = chosen.get(&group.key) else {
            result.rejected.push((*first_fixable).clone());
            continue;
        };

        let winner = preferred
            .and_then(|backend| {
                group
                    .issues
                    .iter()
                    .find(|i| i.backend == *backend && i.is_fixable())
            })
            .unwrap_or(first_fixable);

        if let Some(fix) = Fix::from_issue(winner) {
            result.fixes.push(fix);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::entities::IssueType;
    use std::collections::HashSet;

    fn issue(backend: &str, file: &str, line: u32, fixable: bool) -> Issue {
        let issue = Issue::new(
            BackendId::from(backend),
            file,
            line,
            IssueType::Logic,
            format!("{backend} says {file}:{line}"),
        );
        if fixable {
            issue.with_new_text(format!("fixed by {backend}"))
        } else {
            issue
        }
    }

    fn sample() -> BackendIssues {
        vec![
            (
                BackendId::from("openrouter"),
                vec![issue("openrouter", "a.py", 3, true), issue("openrouter", "b.py", 1, true)],
            ),
            (
                BackendId::from("claude"),
                vec![issue("claude", "a.py", 3, true), issue("claude", "c.py", 9, true)],
            ),
            (
                BackendId::from("gemini"),
                vec![issue("gemini", "b.py", 1, true), issue("gemini", "a.py", 4, false)],
            ),
        ]
        .into_iter()
        .collect()
    }

    fn assert_unique_keys(fixes: &[Fix]) {
        let keys: HashSet<_> = fixes.iter().map(Fix::key).collect();
        assert_eq!(keys.len(), fixes.len(), "duplicate (file, line) in {fixes:?}");
    }

    // ==================== First-seen-wins ====================

    #[test]
    fn test_first_seen_wins_by_registration_order() {
        let result = adjudicate_first_seen(&sample());

        let summary: Vec<_> = result
            .fixes
            .iter()
            .map(|f| (f.file.as_str(), f.line, f.backend.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("a.py", 3, "openrouter"),
                ("b.py", 1, "openrouter"),
                ("c.py", 9, "claude"),
            ]
        );
        assert_unique_keys(&result.fixes);
    }

    #[test]
    fn test_unfixable_location_is_dropped() {
        let result = adjudicate_first_seen(&sample());
        assert_eq!(result.unfixable.len(), 1);
        assert_eq!(result.unfixable[0].line, 4);
        assert!(result.fixes.iter().all(|f| f.line != 4));
    }

    #[test]
    fn test_later_fixable_issue_wins_over_unfixable_first() {
        let issues: BackendIssues = vec![
            (BackendId::from("a"), vec![issue("a", "x.js", 2, false)]),
            (BackendId::from("b"), vec![issue("b", "x.js", 2, true)]),
        ]
        .into_iter()
        .collect();

        let result = adjudicate_first_seen(&issues);
        assert_eq!(result.fixes.len(), 1);
        assert_eq!(result.fixes[0].backend.as_str(), "b");
        assert!(result.unfixable.is_empty());
    }

    #[test]
    fn test_adjudication_is_idempotent() {
        let issues = sample();
        let first = adjudicate_first_seen(&issues);
        let second = adjudicate_first_seen(&issues);
        assert_eq!(first.fixes, second.fixes);
    }

    #[test]
    fn test_duplicates_within_one_backend() {
        let issues: BackendIssues = vec![(
            BackendId::from("a"),
            vec![issue("a", "x.js", 2, true), issue("a", "x.js", 2, true)],
        )]
        .into_iter()
        .collect();

        let result = adjudicate_first_seen(&issues);
        assert_eq!(result.fixes.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let result = adjudicate_first_seen(&BackendIssues::new());
        assert!(result.fixes.is_empty());
        assert!(result.unfixable.is_empty());
    }

    #[test]
    fn test_many_overlapping_backends_never_duplicate() {
        let mut issues = BackendIssues::new();
        for b in 0..5 {
            let name = format!("backend-{b}");
            let list = (0..20)
                .map(|i| issue(&name, &format!("f{}.py", i % 3), (i % 7) + 1, i % 4 != 0))
                .collect();
            issues.insert(BackendId::from(name.as_str()), list);
        }

        let result = adjudicate_first_seen(&issues);
        assert_unique_keys(&result.fixes);
    }

    // ==================== Moderator selection ====================

    #[test]
    fn test_selection_prefers_named_backend() {
        let selections = vec![Selection {
            file: "a.py".to_string(),
            line: 3,
            backend: Some(BackendId::from("claude")),
        }];

        let result = adjudicate_with_selection(&sample(), &selections);
        assert_eq!(result.fixes.len(), 1);
        assert_eq!(result.fixes[0].backend.as_str(), "claude");
        assert_eq!(result.rejected.len(), 2);
    }

    #[test]
    fn test_selection_falls_back_to_first_seen() {
        let selections = vec![
            Selection {
                file: "b.py".to_string(),
                line: 1,
                backend: Some(BackendId::from("nobody")),
            },
            Selection {
                file: "c.py".to_string(),
                line: 9,
                backend: None,
            },
            Selection {
                file: "zzz.py".to_string(),
                line: 1,
                backend: None,
            },
        ];

        let result = adjudicate_with_selection(&sample(), &selections);
        let summary: Vec<_> = result
            .fixes
            .iter()
            .map(|f| (f.file.as_str(), f.backend.as_str()))
            .collect();
        assert_eq!(summary, vec![("b.py", "openrouter"), ("c.py", "claude")]);
        assert_unique_keys(&result.fixes);
    }

    #[test]
    fn test_unresolved_combines_unfixable_and_rejected() {
        let result = adjudicate_with_selection(&sample(), &[]);
        assert!(result.fixes.is_empty());
        assert_eq!(result.unresolved().count(), 4);
    }

    #[test]
    fn test_fixable_candidates_skip_unfixable_locations() {
        let issues: BackendIssues = vec![
            (BackendId::from("a"), vec![issue("a", "f.py", 1, false), issue("a", "f.py", 2, true)]),
            (BackendId::from("b"), vec![issue("b", "f.py", 2, true), issue("b", "f.py", 1, false)]),
        ]
        .into_iter()
        .collect();

        let candidates = fixable_candidates(&issues);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].0, ("f.py".to_string(), 2));
        assert_eq!(candidates[0].1.len(), 2);
    }
}
