//! Progress reporting.
//!
//! Progress is observational: sinks cannot influence the pipeline.

use tracing::info;

/// Chunks completed out of the total for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Completed fraction in `0.0..=1.0`.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }

    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}

/// Receives progress updates after every processed chunk.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: Progress);
}

impl<F> ProgressSink for F
where
    F: Fn(Progress) + Send + Sync,
{
    fn report(&self, progress: Progress) {
        self(progress)
    }
}

/// Discards progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: Progress) {}
}

/// Logs progress through `tracing`.
#[derive(Debug, Clone, Copy)]
pub struct LogProgress {
    stage: &'static str,
}

impl LogProgress {
    pub fn new(stage: &'static str) -> Self {
        Self { stage }
    }
}

impl ProgressSink for LogProgress {
    fn report(&self, progress: Progress) {
        info!(
            stage = self.stage,
            completed = progress.completed,
            total = progress.total,
            "{:.0}%",
            progress.ratio() * 100.0
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_ratio() {
        let p = Progress { completed: 1, total: 4 };
        assert!((p.ratio() - 0.25).abs() < f64::EPSILON);
        assert!(!p.is_done());
        assert!(Progress { completed: 4, total: 4 }.is_done());
    }

    #[test]
    fn test_closure_sink() {
        let seen = Mutex::new(Vec::new());
        let sink = |p: Progress| seen.lock().unwrap().push(p.completed);
        let dyn_sink: &dyn ProgressSink = &sink;

        dyn_sink.report(Progress { completed: 1, total: 2 });
        dyn_sink.report(Progress { completed: 2, total: 2 });
        NoProgress.report(Progress { completed: 2, total: 2 });
        LogProgress::new("test").report(Progress { completed: 2, total: 2 });

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }
}
