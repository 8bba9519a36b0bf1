use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use unwatched_core::tautulli::models::RatingKey;
use unwatched_core::ProgressReporter;

/// CLI progress reporter using indicatif progress bars.
///
/// - Library phase: spinner per section (summary counts unknown upfront)
/// - Detail phase: progress bar over the collected identifiers
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_libraries_resolved(&self, count: usize) {
        eprintln!("  \x1b[32m✓\x1b[0m {} libraries selected", count);
    }

    fn on_library_start(&self, _section_id: i64, section_name: &str) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message(format!("Reading library '{}'...", section_name));
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_library_complete(&self, section_id: i64, identifiers: usize) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Section {}: {} unwatched items",
            section_id, identifiers
        );
    }

    fn on_detail_start(&self, total: usize) {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} Metadata [{bar:30.cyan/dim}] {pos}/{len} items ({eta} remaining)",
            )
            .unwrap()
            .progress_chars("━╸─")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_detail_progress(&self, done: usize, _total: usize, _rating_key: RatingKey) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            pb.set_position(done as u64);
        }
    }

    fn on_detail_complete(&self, found: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Metadata complete: {} candidates in {:.2}s",
            found, duration_secs
        );
    }
}
