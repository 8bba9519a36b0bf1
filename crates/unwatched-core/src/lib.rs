pub mod archive;
pub mod config;
pub mod deletion;
pub mod engine;
pub mod error;
pub mod local;
pub mod progress;
pub mod prompt;
pub mod report;
pub mod retention;
pub mod tautulli;

pub use config::AppConfig;
pub use engine::{CandidateEngine, CandidateSet, RunPlan};
pub use error::Error;
pub use progress::{ProgressReporter, SilentReporter};
pub use retention::{Operator, RetentionWindow};
pub use tautulli::{MetadataSource, TautulliClient};
