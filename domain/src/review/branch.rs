//! Fix branch naming

/// Suffix appended to every fix branch
pub const BRANCH_SUFFIX: &str = "_AI_Fix";

/// Derive the fix branch name from team and leader names.
///
/// Each part is uppercased, has every whitespace character (leading and
/// trailing included) replaced with `_`, and loses every character outside
/// `[A-Z0-9_]`. The parts are joined as
/// `TEAM_LEADER_AI_Fix`.
///
/// ```
/// use autofix_domain::review::branch::branch_name;
///
/// assert_eq!(
///     branch_name("RIFT organisers!!", "Saiyam Kumar"),
///     "RIFT_ORGANISERS_SAIYAM_KUMAR_AI_Fix"
/// );
/// ```
pub fn branch_name(team_name: &str, team_leader: &str) -> String {
    format!(
        "{}_{}{}",
        sanitize_part(team_name),
        sanitize_part(team_leader),
        BRANCH_SUFFIX
    )
}

fn sanitize_part(part: &str) -> String {
    part.to_uppercase()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}
