pub mod app;
pub mod watcher;

pub use app::{build_and_run, Application};
pub use watcher::{SubmissionWatcher, WatcherSettings};
