//! Run scoring
//!
//! A pure function of `(total_issues, fixes_applied, commits_count,
//! elapsed_minutes)`:
//!
//! ```text
//! speed_bonus        = 10 if elapsed_minutes < 5 else 0
//! efficiency_penalty = max(0, (commits - 20) * 2)
//! quality_bonus      = fixes_applied * 2
//! quality_penalty    = max(0, total_issues - fixes_applied) * 5
//! total              = clamp(0, 100, 100 + bonuses - penalties)
//! ```

pub mod score;

pub use score::{Score, ScoreInputs};
