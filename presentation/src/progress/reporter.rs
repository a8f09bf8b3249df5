//! Progress reporting for review runs

use autofix_application::ports::progress::ProgressNotifier;
use autofix_domain::{BackendId, Commit, Fix, WorkflowState};
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Reports progress with indicatif bars
pub struct ProgressReporter {
    multi: MultiProgress,
    dispatch_bar: Mutex<Option<ProgressBar>>,
    state_spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            dispatch_bar: Mutex::new(None),
            state_spinner: Mutex::new(None),
        }
    }

    fn dispatch_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn lock(slot: &Mutex<Option<ProgressBar>>) -> MutexGuard<'_, Option<ProgressBar>> {
        slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn finish_spinner(&self) {
        if let Some(spinner) = Self::lock(&self.state_spinner).take() {
            spinner.finish_and_clear();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_state_enter(&self, state: WorkflowState) {
        self.finish_spinner();
        // Dispatch gets its own bar
        if matches!(state, WorkflowState::Dispatch | WorkflowState::Terminal) {
            return;
        }

        let spinner = self.multi.add(ProgressBar::new_spinner());
        spinner.set_style(Self::spinner_style());
        spinner.set_prefix(state.display_name().to_string());
        spinner.enable_steady_tick(Duration::from_millis(120));
        *Self::lock(&self.state_spinner) = Some(spinner);
    }

    fn on_dispatch_start(&self, round: u32, backends: &[BackendId], files: usize) {
        let pb = self.multi.add(ProgressBar::new(backends.len() as u64));
        pb.set_style(Self::dispatch_style());
        pb.set_prefix(format!("Round {}", round));
        pb.set_message(format!("{} file(s)", files));
        *Self::lock(&self.dispatch_bar) = Some(pb);
    }

    fn on_backend_complete(&self, backend: &BackendId, issues: usize, success: bool) {
        if let Some(pb) = Self::lock(&self.dispatch_bar).as_ref() {
            let status = if success {
                format!("{} {} ({} issues)", "v".green(), backend, issues)
            } else {
                format!("{} {}", "x".red(), backend)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_dispatch_complete(&self) {
        if let Some(pb) = Self::lock(&self.dispatch_bar).take() {
            pb.finish_with_message(format!("{}", "dispatch complete".green()));
        }
    }

    fn on_fix_applied(&self, commit: &Commit) {
        let _ = self.multi.println(format!(
            "  {} {} {}",
            "+".green(),
            commit.short_hash.yellow(),
            commit.message
        ));
    }

    fn on_fix_skipped(&self, fix: &Fix, reason: &str) {
        let _ = self.multi.println(format!(
            "  {} {}:{} {}",
            "-".red(),
            fix.file,
            fix.line,
            reason.dimmed()
        ));
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_state_enter(&self, state: WorkflowState) {
        if state != WorkflowState::Terminal {
            println!("{} {}", "->".cyan(), state.display_name().bold());
        }
    }

    fn on_dispatch_start(&self, round: u32, backends: &[BackendId], files: usize) {
        println!(
            "  round {}: {} backend(s), {} file(s)",
            round,
            backends.len(),
            files
        );
    }

    fn on_backend_complete(&self, backend: &BackendId, issues: usize, success: bool) {
        if success {
            println!("  {} {} ({} issues)", "v".green(), backend, issues);
        } else {
            println!("  {} {} (failed)", "x".red(), backend);
        }
    }

    fn on_fix_applied(&self, commit: &Commit) {
        println!("  {} {} {}", "+".green(), commit.short_hash, commit.message);
    }

    fn on_fix_skipped(&self, fix: &Fix, reason: &str) {
        println!("  {} {}:{} {}", "-".red(), fix.file, fix.line, reason);
    }
}
