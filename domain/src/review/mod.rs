//! Review domain
//!
//! Everything a review round produces and the pure rules that shape it.
//!
//! ```text
//! backend text ──parse──▶ Issue ──(per backend)──▶ BackendIssues
//!                                                     │
//!                                                adjudicate
//!                                                     ▼
//!                           Commit ◀──apply── Fix (unique by file, line)
//! ```

pub mod adjudication;
pub mod backend_issues;
pub mod branch;
pub mod entities;
pub mod parsing;

pub use adjudication::{
    Adjudication, Selection, adjudicate_first_seen, adjudicate_with_selection, fixable_candidates,
};
pub use backend_issues::BackendIssues;
pub use branch::branch_name;
pub use entities::{CodeFile, Commit, Fix, Issue, IssueKey, IssueType, Severity};
pub use parsing::{extract_first_json_array, parse_issue_array};
