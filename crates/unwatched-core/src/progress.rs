use crate::tautulli::models::RatingKey;

/// Trait for reporting candidate collection progress.
///
/// CLI implements with indicatif; tests use [`SilentReporter`].
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_libraries_resolved(&self, _count: usize) {}
    fn on_library_start(&self, _section_id: i64, _section_name: &str) {}
    fn on_library_complete(&self, _section_id: i64, _identifiers: usize) {}
    fn on_detail_start(&self, _total: usize) {}
    fn on_detail_progress(&self, _done: usize, _total: usize, _rating_key: RatingKey) {}
    fn on_detail_complete(&self, _found: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
