//! Console output formatter for run reports

use colored::Colorize;
use autofix_domain::{OutputFormat, RunReport, Severity, UnresolvedReason};

/// Formats run reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Render `report` in the requested format
    pub fn render(report: &RunReport, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format(report),
            OutputFormat::Summary => Self::format_summary(report),
            OutputFormat::Json => Self::format_json(report),
        }
    }

    /// Format the complete report
    pub fn format(report: &RunReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("autofix-council Run Report"));
        output.push('\n');
        output.push_str(&format!("{} {}\n", "Run:".cyan().bold(), report.run_id));
        output.push_str(&format!(
            "{} {}\n",
            "Branch:".cyan().bold(),
            report.branch_name
        ));
        output.push_str(&format!("{} {}\n", "Push:".cyan().bold(), Self::push_status(report)));

        // Findings per backend
        output.push_str(&Self::section_header("Findings"));
        for (backend, issues) in report.all_issues.iter() {
            let label = format!("{:<16}", backend.as_str());
            if issues.is_empty() {
                output.push_str(&format!("  {} {}\n", label.dimmed(), "no issues".dimmed()));
            } else {
                output.push_str(&format!("  {} {} issue(s)\n", label.yellow(), issues.len()));
            }
        }

        // Rounds
        if !report.rounds.is_empty() {
            output.push_str(&Self::section_header("Rounds"));
            for round in &report.rounds {
                output.push_str(&format!(
                    "  #{}: {} reported, {} selected, {} committed, {} skipped",
                    round.round,
                    round.issues_reported,
                    round.fixes_selected,
                    round.commits,
                    round.skipped
                ));
                if !round.silent_backends.is_empty() {
                    output.push_str(&format!(
                        " {}",
                        format!("(silent: {})", round.silent_backends.join(", ")).dimmed()
                    ));
                }
                output.push('\n');
            }
        }

        // Commits
        output.push_str(&Self::section_header("Commits"));
        if report.commits.is_empty() {
            output.push_str(&format!("  {}\n", "none".dimmed()));
        }
        for commit in &report.commits {
            output.push_str(&format!(
                "  {} {}\n",
                commit.short_hash.yellow(),
                commit.message
            ));
        }

        // Unresolved
        if !report.unresolved.is_empty() {
            output.push_str(&Self::section_header("Unresolved"));
            for item in &report.unresolved {
                let reason = match item.reason {
                    UnresolvedReason::Unfixable => "no fix offered",
                    UnresolvedReason::Rejected => "rejected",
                    UnresolvedReason::Skipped => "could not apply",
                };
                output.push_str(&format!(
                    "  {} {}:{} {} {}\n",
                    Self::severity_badge(item.severity),
                    item.file,
                    item.line,
                    item.message,
                    format!("({})", reason).dimmed()
                ));
            }
        }

        // Score
        let score = &report.score;
        output.push_str(&Self::section_header("Score"));
        output.push_str(&format!("  base               {:>4}\n", score.base));
        output.push_str(&format!("  speed bonus        {:>+4}\n", score.speed_bonus));
        output.push_str(&format!("  fix bonus          {:>+4}\n", score.quality_bonus));
        output.push_str(&format!("  commit penalty     {:>4}\n", -score.efficiency_penalty));
        output.push_str(&format!(
            "  unfixed penalty    {:>4}  ({} unfixed)\n",
            -score.quality_penalty, score.unfixed_issues
        ));
        output.push_str(&format!(
            "  {}              {}\n",
            "total".bold(),
            Self::total(score.total)
        ));

        output.push_str(&Self::footer());
        output
    }

    /// Branch, counts and total score
    pub fn format_summary(report: &RunReport) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {}\n",
            "=== Run".cyan().bold(),
            format!("{} ===", report.run_id).cyan().bold()
        ));
        output.push_str(&format!("{} {}\n", "Branch:".bold(), report.branch_name));
        output.push_str(&format!(
            "{} {} applied, {} unresolved, {} reported\n",
            "Fixes:".bold(),
            report.fixes_applied,
            report.unresolved.len(),
            report.reported_issue_count()
        ));
        output.push_str(&format!("{} {}\n", "Push:".bold(), Self::push_status(report)));
        output.push_str(&format!(
            "{} {}\n",
            "Score:".bold(),
            Self::total(report.score.total)
        ));

        output
    }

    /// The report as pretty-printed JSON
    pub fn format_json(report: &RunReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|e| {
            serde_json::json!({ "error": format!("failed to serialize report: {}", e) })
                .to_string()
        })
    }

    fn push_status(report: &RunReport) -> String {
        match (&report.push_error, report.is_pushed()) {
            (Some(error), _) => format!("{} {}", "failed:".red(), error),
            (None, true) => "pushed".green().to_string(),
            (None, false) => "not pushed".dimmed().to_string(),
        }
    }

    fn severity_badge(severity: Severity) -> String {
        let label = format!("[{}]", severity.as_str());
        match severity {
            Severity::Critical => label.red().bold().to_string(),
            Severity::High => label.red().to_string(),
            Severity::Medium => label.yellow().to_string(),
            Severity::Low => label.dimmed().to_string(),
        }
    }

    fn total(total: i64) -> String {
        let text = format!("{}/100", total);
        match total {
            80.. => text.green().bold().to_string(),
            50..=79 => text.yellow().bold().to_string(),
            _ => text.red().bold().to_string(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
