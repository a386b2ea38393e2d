//! Progress reporting for the transformation pipeline.
//!
//! The core never writes to stdout/stderr itself. Callers inject an observer
//! at construction and receive a discrete status code plus a human-readable
//! message for every notable step; how that is displayed (console colors,
//! GUI log panel) is entirely the caller's concern.

use std::path::PathBuf;

/// Discrete status codes emitted by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStatus {
    /// Processing of an input file has started.
    Started,
    /// An AI request attempt is about to be issued.
    AttemptingRequest,
    /// A previous attempt failed transiently and is being retried.
    Retrying,
    /// A raw reply was received from the provider.
    ResponseReceived,
    /// Input skipped: already processed and the output still exists.
    AlreadyProcessed,
    /// A ledger entry exists but its output file is missing; reprocessing.
    StaleEntry,
    /// Input skipped: reformatted content fell below the quality gate.
    ContentTooShort,
    /// Output written and ledger updated.
    FileCompleted,
    /// Processing of an input file failed with an error.
    Failed,
    /// A batch run finished.
    BatchCompleted,
    /// A batch run was cancelled between files.
    Cancelled,
}

/// A single progress notification.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub status: ProcessingStatus,
    pub message: String,
    /// Input file this event relates to, when applicable.
    pub file_path: Option<PathBuf>,
}

impl ProgressEvent {
    pub fn new(status: ProcessingStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            file_path: None,
        }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }
}

/// Observer for pipeline progress events.
pub trait ProgressObserver: Send + Sync {
    fn notify(&self, event: &ProgressEvent);
}

/// Observer that discards all events.
pub struct NullObserver;

impl ProgressObserver for NullObserver {
    fn notify(&self, _event: &ProgressEvent) {}
}

impl<F> ProgressObserver for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn notify(&self, event: &ProgressEvent) {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_closure_observer_collects_events() {
        let seen: Mutex<Vec<ProcessingStatus>> = Mutex::new(Vec::new());
        let observer = |event: &ProgressEvent| {
            seen.lock().unwrap().push(event.status);
        };

        observer.notify(&ProgressEvent::new(ProcessingStatus::Started, "go"));
        observer.notify(
            &ProgressEvent::new(ProcessingStatus::FileCompleted, "done").with_file("a.json"),
        );

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![ProcessingStatus::Started, ProcessingStatus::FileCompleted]
        );
    }
}
