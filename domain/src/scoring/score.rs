//! Deterministic run quality score.

use serde::{Deserialize, Serialize};

/// Starting score before bonuses and penalties
pub const BASE_SCORE: i64 = 100;
/// Bonus for runs finishing under [`SPEED_THRESHOLD_MINUTES`]
pub const SPEED_BONUS: i64 = 10;
pub const SPEED_THRESHOLD_MINUTES: f64 = 5.0;
/// Commits beyond this count are penalised
pub const COMMIT_ALLOWANCE: i64 = 20;
pub const PENALTY_PER_EXTRA_COMMIT: i64 = 2;
pub const BONUS_PER_FIX: i64 = 2;
pub const PENALTY_PER_UNFIXED: i64 = 5;
pub const MAX_SCORE: i64 = 100;

/// Everything the scorer looks at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreInputs {
    pub total_issues: usize,
    pub fixes_applied: usize,
    pub commits_count: usize,
    pub elapsed_minutes: f64,
}

/// Breakdown of a run's score
///
/// Penalties are stored as positive magnitudes; `total` is always within
/// `0..=100`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub base: i64,
    pub speed_bonus: i64,
    pub quality_bonus: i64,
    pub efficiency_penalty: i64,
    pub quality_penalty: i64,
    pub total: i64,
    pub unfixed_issues: usize,
    pub inputs: ScoreInputs,
}

impl Score {
    /// Compute the score. Pure arithmetic, no I/O.
    ///
    /// ```
    /// use autofix_domain::scoring::{Score, ScoreInputs};
    ///
    /// let score = Score::compute(ScoreInputs {
    ///     total_issues: 10,
    ///     fixes_applied: 0,
    ///     commits_count: 25,
    ///     elapsed_minutes: 8.0,
    /// });
    /// assert_eq!(score.total, 40);
    /// ```
    pub fn compute(inputs: ScoreInputs) -> Self {
        let fixes = to_i64(inputs.fixes_applied);
        let commits = to_i64(inputs.commits_count);

        let speed_bonus = if inputs.elapsed_minutes < SPEED_THRESHOLD_MINUTES {
            SPEED_BONUS
        } else {
            0
        };
        let efficiency_penalty = commits
            .saturating_sub(COMMIT_ALLOWANCE)
            .saturating_mul(PENALTY_PER_EXTRA_COMMIT)
            .max(0);
        let quality_bonus = fixes.saturating_mul(BONUS_PER_FIX);
        let unfixed_issues = inputs.total_issues.saturating_sub(inputs.fixes_applied);
        let quality_penalty = to_i64(unfixed_issues).saturating_mul(PENALTY_PER_UNFIXED);

        let total = BASE_SCORE
            .saturating_add(speed_bonus)
            .saturating_add(quality_bonus)
            .saturating_sub(efficiency_penalty)
            .saturating_sub(quality_penalty)
            .clamp(0, MAX_SCORE);

        Self {
            base: BASE_SCORE,
            speed_bonus,
            quality_bonus,
            efficiency_penalty,
            quality_penalty,
            total,
            unfixed_issues,
            inputs,
        }
    }
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
