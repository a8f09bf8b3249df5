//! Per-backend issue lists in registration order.

use super::entities::Issue;
use crate::core::backend::BackendId;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Issues keyed by the backend that produced them.
///
/// Unlike a `HashMap`, slots keep the order in which backends were
/// registered. Adjudication relies on that order for tie-breaking, and the
/// JSON form (an object) preserves it too.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendIssues {
    slots: Vec<(BackendId, Vec<Issue>)>,
}

impl BackendIssues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the issue list for `backend`, replacing an existing slot in place
    /// or appending a new one.
    pub fn insert(&mut self, backend: BackendId, issues: Vec<Issue>) {
        match self.slots.iter_mut().find(|(id, _)| *id == backend) {
            Some((_, slot)) => *slot = issues,
            None => self.slots.push((backend, issues)),
        }
    }

    /// Append every slot of `other` onto this one, backend by backend.
    pub fn append(&mut self, other: &BackendIssues) {
        for (backend, issues) in &other.slots {
            match self.slots.iter_mut().find(|(id, _)| id == backend) {
                Some((_, slot)) => slot.extend(issues.iter().cloned()),
                None => self.slots.push((backend.clone(), issues.clone())),
            }
        }
    }

    pub fn get(&self, backend: &BackendId) -> Option<&[Issue]> {
        self.slots
            .iter()
            .find(|(id, _)| id == backend)
            .map(|(_, issues)| issues.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BackendId, &[Issue])> {
        self.slots.iter().map(|(id, issues)| (id, issues.as_slice()))
    }

    pub fn backends(&self) -> impl Iterator<Item = &BackendId> {
        self.slots.iter().map(|(id, _)| id)
    }

    /// All issues, in registration order then per-backend list order.
    pub fn flatten(&self) -> impl Iterator<Item = &Issue> {
        self.slots.iter().flat_map(|(_, issues)| issues.iter())
    }

    pub fn total_issues(&self) -> usize {
        self.slots.iter().map(|(_, issues)| issues.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// `true` when every registered backend reported nothing
    pub fn all_empty(&self) -> bool {
        self.slots.iter().all(|(_, issues)| issues.is_empty())
    }
}

impl FromIterator<(BackendId, Vec<Issue>)> for BackendIssues {
    fn from_iter<T: IntoIterator<Item = (BackendId, Vec<Issue>)>>(iter: T) -> Self {
        let mut issues = BackendIssues::new();
        for (backend, list) in iter {
            issues.insert(backend, list);
        }
        issues
    }
}

impl Serialize for BackendIssues {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.slots.len()))?;
        for (backend, issues) in &self.slots {
            map.serialize_entry(backend, issues)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for BackendIssues {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SlotsVisitor;

        impl<'de> Visitor<'de> for SlotsVisitor {
            type Value = BackendIssues;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of backend id to issue list")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut issues = BackendIssues::new();
                while let Some((backend, list)) = access.next_entry::<BackendId, Vec<Issue>>()? {
                    issues.insert(backend, list);
                }
                Ok(issues)
            }
        }

        deserializer.deserialize_map(SlotsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::entities::IssueType;

    fn issue(backend: &str, line: u32) -> Issue {
        Issue::new(BackendId::from(backend), "f.py", line, IssueType::Logic, "m")
    }

    #[test]
    fn test_insert_keeps_registration_order() {
        let mut issues = BackendIssues::new();
        issues.insert(BackendId::from("zeta"), vec![issue("zeta", 1)]);
        issues.insert(BackendId::from("alpha"), vec![]);
        issues.insert(BackendId::from("zeta"), vec![issue("zeta", 2)]);

        let order: Vec<_> = issues.backends().map(|b| b.as_str().to_string()).collect();
        assert_eq!(order, vec!["zeta", "alpha"]);
        assert_eq!(issues.get(&BackendId::from("zeta")).unwrap()[0].line, 2);
    }

    #[test]
    fn test_append_accumulates() {
        let mut all = BackendIssues::new();
        all.insert(BackendId::from("a"), vec![issue("a", 1)]);

        let mut round = BackendIssues::new();
        round.insert(BackendId::from("a"), vec![issue("a", 2)]);
        round.insert(BackendId::from("b"), vec![issue("b", 3)]);
        all.append(&round);

        assert_eq!(all.total_issues(), 3);
        assert_eq!(all.get(&BackendId::from("a")).unwrap().len(), 2);
    }

    #[test]
    fn test_json_preserves_order() {
        let issues: BackendIssues = vec![
            (BackendId::from("gemini"), vec![issue("gemini", 1)]),
            (BackendId::from("claude"), vec![]),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&issues).unwrap();
        assert!(json.find("gemini").unwrap() < json.find("claude").unwrap());

        let back: BackendIssues = serde_json::from_str(&json).unwrap();
        assert_eq!(back, issues);
    }

    #[test]
    fn test_all_empty() {
        let issues: BackendIssues = vec![
            (BackendId::from("a"), vec![]),
            (BackendId::from("b"), vec![]),
        ]
        .into_iter()
        .collect();
        assert!(issues.all_empty());
        assert_eq!(issues.len(), 2);
    }
}
