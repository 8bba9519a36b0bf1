use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

use unwatched_core::deletion::{DeletionMode, DeletionOrchestrator, FailurePolicy};
use unwatched_core::prompt::Prompter;

struct Scripted {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl Scripted {
    fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            asked: Vec::new(),
        }
    }
}

impl Prompter for Scripted {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        self.asked.push(question.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }
}

/// Shared buffer the fmt layer writes log lines into.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

/// Run `f` with a subscriber that records every event as plain text.
fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .without_time()
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, buffer.contents())
}

fn create_files(root: &Path, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = root.join(name);
            fs::write(&path, name).unwrap();
            path
        })
        .collect()
}

#[test]
fn test_all_removes_without_per_item_prompt() {
    let tmp = tempdir().unwrap();
    let paths = create_files(tmp.path(), &["a.mkv", "b.mkv"]);
    let mut prompter = Scripted::new(&["all"]);

    let outcome = DeletionOrchestrator::new(FailurePolicy::Continue).run(&paths, &mut prompter);

    assert_eq!(outcome.removed, paths);
    assert!(paths.iter().all(|p| !p.exists()));
    assert_eq!(prompter.asked.len(), 1);
}

#[test]
fn test_no_leaves_files_alone() {
    let tmp = tempdir().unwrap();
    let paths = create_files(tmp.path(), &["a.mkv", "b.mkv"]);
    let mut prompter = Scripted::new(&["no"]);

    let (outcome, logs) = capture_logs(|| {
        DeletionOrchestrator::new(FailurePolicy::Continue).run(&paths, &mut prompter)
    });

    assert!(logs.contains("doing nothing"), "missing log line in: {logs}");
    assert!(!logs.contains("Removing"));

    assert!(outcome.removed.is_empty());
    assert!(outcome.skipped.is_empty());
    assert!(paths.iter().all(|p| p.exists()));
    assert_eq!(prompter.asked.len(), 1);
}

#[test]
fn test_unreadable_answer_does_nothing() {
    let tmp = tempdir().unwrap();
    let paths = create_files(tmp.path(), &["a.mkv"]);
    let mut prompter = Scripted::new(&[]);

    let outcome = DeletionOrchestrator::new(FailurePolicy::Continue).run(&paths, &mut prompter);

    assert!(outcome.removed.is_empty());
    assert!(paths[0].exists());
}

#[test]
fn test_per_item_confirmation() {
    let tmp = tempdir().unwrap();
    let paths = create_files(tmp.path(), &["a.mkv", "b.mkv", "c.mkv"]);
    let mut prompter = Scripted::new(&["yes", "y", "n", "Yes"]);

    let (outcome, logs) = capture_logs(|| {
        DeletionOrchestrator::new(FailurePolicy::Continue).run(&paths, &mut prompter)
    });

    assert!(logs.contains(&format!("Removing {}", paths[0].display())));
    assert!(logs.contains(&format!("Skipping {}", paths[1].display())));

    assert_eq!(outcome.removed, vec![paths[0].clone(), paths[2].clone()]);
    assert_eq!(outcome.skipped, vec![paths[1].clone()]);
    assert!(paths[1].exists());
    assert_eq!(prompter.asked.len(), 4);
    assert_eq!(
        prompter.asked[1],
        format!("Delete {}? (yes/no): ", paths[0].display())
    );
}

#[test]
fn test_failure_continues_by_default() {
    let tmp = tempdir().unwrap();
    let mut paths = create_files(tmp.path(), &["a.mkv"]);
    paths.insert(0, tmp.path().join("gone.mkv"));
    let mut prompter = Scripted::new(&[]);

    let outcome = DeletionOrchestrator::new(FailurePolicy::Continue).execute(
        DeletionMode::All,
        &paths,
        &mut prompter,
    );

    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].0, paths[0]);
    assert_eq!(outcome.removed, vec![paths[1].clone()]);
    assert!(!outcome.aborted);
}

#[test]
fn test_failure_aborts_remaining_batch() {
    let tmp = tempdir().unwrap();
    let mut paths = create_files(tmp.path(), &["a.mkv"]);
    paths.insert(0, tmp.path().join("gone.mkv"));
    let mut prompter = Scripted::new(&[]);

    let outcome = DeletionOrchestrator::new(FailurePolicy::Abort).execute(
        DeletionMode::All,
        &paths,
        &mut prompter,
    );

    assert!(outcome.aborted);
    assert!(outcome.removed.is_empty());
    assert!(paths[1].exists());
}
