use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::prompt::{is_affirmative, Prompter};

/// What to do when removing one file fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure and move on to the next file.
    #[default]
    Continue,
    /// Stop and leave the remaining files untouched.
    Abort,
}

/// The operator's answer to the batch question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionMode {
    All,
    PerItem,
    Nothing,
}

impl DeletionMode {
    pub fn parse(answer: &str) -> Self {
        let answer = answer.trim().to_lowercase();
        if answer == "all" {
            DeletionMode::All
        } else if answer.starts_with('y') {
            DeletionMode::PerItem
        } else {
            DeletionMode::Nothing
        }
    }
}

#[derive(Debug, Default)]
pub struct DeletionOutcome {
    pub removed: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
    /// Set when [`FailurePolicy::Abort`] cut the batch short.
    pub aborted: bool,
}

pub struct DeletionOrchestrator {
    policy: FailurePolicy,
}

impl DeletionOrchestrator {
    pub fn new(policy: FailurePolicy) -> Self {
        Self { policy }
    }

    /// Ask once for the batch mode, then act on every path accordingly.
    pub fn run<P: AsRef<Path>>(&self, paths: &[P], prompter: &mut dyn Prompter) -> DeletionOutcome {
        let answer = prompter
            .ask("Delete all unwatched files? (yes/no/all): ")
            .unwrap_or_else(|e| {
                warn!("Could not read answer: {}", e);
                String::new()
            });
        self.execute(DeletionMode::parse(&answer), paths, prompter)
    }

    pub fn execute<P: AsRef<Path>>(
        &self,
        mode: DeletionMode,
        paths: &[P],
        prompter: &mut dyn Prompter,
    ) -> DeletionOutcome {
        let mut outcome = DeletionOutcome::default();

        match mode {
            DeletionMode::Nothing => {
                info!("Ok. doing nothing.");
            }
            DeletionMode::All => {
                for path in paths {
                    if !self.remove(path.as_ref(), &mut outcome) {
                        break;
                    }
                }
            }
            DeletionMode::PerItem => {
                for path in paths {
                    let path = path.as_ref();
                    let question = format!("Delete {}? (yes/no): ", path.display());
                    let confirmed = prompter
                        .ask(&question)
                        .map(|answer| is_affirmative(&answer))
                        .unwrap_or(false);
                    if confirmed {
                        if !self.remove(path, &mut outcome) {
                            break;
                        }
                    } else {
                        info!("Skipping {}", path.display());
                        outcome.skipped.push(path.to_path_buf());
                    }
                }
            }
        }

        info!(
            "Deletion finished: {} removed, {} skipped, {} failed",
            outcome.removed.len(),
            outcome.skipped.len(),
            outcome.failed.len()
        );
        outcome
    }

    /// Returns false when the batch should stop.
    fn remove(&self, path: &Path, outcome: &mut DeletionOutcome) -> bool {
        info!("Removing {}", path.display());
        match fs::remove_file(path) {
            Ok(()) => {
                outcome.removed.push(path.to_path_buf());
                true
            }
            Err(e) => {
                error!("Failed to remove '{}': {}", path.display(), e);
                outcome.failed.push((path.to_path_buf(), e.to_string()));
                match self.policy {
                    FailurePolicy::Continue => true,
                    FailurePolicy::Abort => {
                        outcome.aborted = true;
                        false
                    }
                }
            }
        }
    }
}
