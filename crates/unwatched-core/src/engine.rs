use std::time::Instant;
use tracing::{debug, info, warn};

use crate::progress::ProgressReporter;
use crate::retention::RetentionWindow;
use crate::tautulli::models::{MediaDetailRecord, RatingKey};
use crate::tautulli::MetadataSource;

/// The operator's answers for one run, captured once and passed down.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub window: RetentionWindow,
    /// Library names to scan; names the server does not know are ignored.
    pub libraries: Vec<String>,
    /// Restrict the final list to files present under the local root.
    pub local_only: bool,
}

/// Resolved candidates, ordered by descending rating key.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    pub items: Vec<MediaDetailRecord>,
}

impl CandidateSet {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn paths(&self) -> Vec<String> {
        self.items.iter().map(|item| item.file_path.clone()).collect()
    }
}

pub struct CandidateEngine<'a, S: MetadataSource + ?Sized> {
    source: &'a S,
    reporter: &'a dyn ProgressReporter,
}

impl<'a, S: MetadataSource + ?Sized> CandidateEngine<'a, S> {
    pub fn new(source: &'a S, reporter: &'a dyn ProgressReporter) -> Self {
        Self { source, reporter }
    }

    /// Run the candidate pipeline:
    /// 1. Match selected library names to section ids
    /// 2. Filter each section's summaries and expand shows into episodes
    /// 3. Resolve every identifier to its file details
    pub fn run(&self, plan: &RunPlan, now: i64) -> CandidateSet {
        let sections = self.resolve_sections(&plan.libraries);
        self.reporter.on_libraries_resolved(sections.len());
        info!("Processing {} libraries", sections.len());

        let mut identifiers = Vec::new();
        for (section_id, section_name) in &sections {
            self.reporter.on_library_start(*section_id, section_name);
            let found = self.collect_identifiers(*section_id, &plan.window, now);
            debug!(section_id, count = found.len(), "Collected identifiers");
            self.reporter.on_library_complete(*section_id, found.len());
            identifiers.extend(found);
        }

        self.resolve_details(identifiers)
    }

    /// Section ids for the selected names, in server order.
    pub fn resolve_sections(&self, selected: &[String]) -> Vec<(i64, String)> {
        self.source
            .list_libraries()
            .into_iter()
            .filter(|lib| selected.iter().any(|name| *name == lib.section_name))
            .map(|lib| (lib.section_id, lib.section_name))
            .collect()
    }

    /// Identifiers of every unwatched leaf in one section that falls inside
    /// the window. Filtering happens before expansion to bound remote calls.
    pub fn collect_identifiers(
        &self,
        section_id: i64,
        window: &RetentionWindow,
        now: i64,
    ) -> Vec<RatingKey> {
        let mut identifiers = Vec::new();
        for summary in self.source.list_library_media(section_id) {
            if !window.admits(&summary, now) {
                continue;
            }
            if summary.media_type.is_container() {
                let children = self
                    .source
                    .expand_container(summary.rating_key, summary.media_type);
                debug!(
                    rating_key = %summary.rating_key,
                    title = %summary.title,
                    children = children.len(),
                    "Expanded container"
                );
                identifiers.extend(children);
            } else {
                identifiers.push(summary.rating_key);
            }
        }
        identifiers
    }

    /// Fetch details for each identifier, highest key first. Identifiers that
    /// do not resolve are logged and dropped.
    pub fn resolve_details(&self, mut identifiers: Vec<RatingKey>) -> CandidateSet {
        identifiers.sort_by(|a, b| b.cmp(a));

        let total = identifiers.len();
        self.reporter.on_detail_start(total);
        let start = Instant::now();

        let mut items = Vec::with_capacity(total);
        for (done, rating_key) in identifiers.into_iter().enumerate() {
            match self.source.get_detail(rating_key) {
                Some(detail) => items.push(detail),
                None => warn!(%rating_key, "Metadata retrieval failed for rating_key"),
            }
            self.reporter.on_detail_progress(done + 1, total, rating_key);
        }

        self.reporter
            .on_detail_complete(items.len(), start.elapsed().as_secs_f64());
        CandidateSet { items }
    }
}
