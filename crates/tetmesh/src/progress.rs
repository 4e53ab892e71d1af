//! Construction progress reporting.

/// Receives human-readable progress messages during mesh construction.
///
/// Implemented for any `Fn(&str)` closure.
pub trait ProgressReporter {
    /// Handle one progress message.
    fn report(&self, message: &str);
}

impl<F: Fn(&str)> ProgressReporter for F {
    fn report(&self, message: &str) {
        self(message)
    }
}

/// Turns a completion fraction into at most one message per whole percent.
///
/// A counter without a reporter does nothing, so callers can update it
/// unconditionally.
pub struct PercentCounter<'a> {
    reporter: Option<&'a dyn ProgressReporter>,
    task: &'static str,
    last: Option<u32>,
}

impl<'a> PercentCounter<'a> {
    /// Counter for `task` reporting to `reporter`.
    pub fn new(reporter: Option<&'a dyn ProgressReporter>, task: &'static str) -> Self {
        Self {
            reporter,
            task,
            last: None,
        }
    }

    /// Counter that never reports.
    pub fn silent() -> Self {
        Self::new(None, "")
    }

    /// Record progress as a fraction in `[0, 1]`.
    pub fn update(&mut self, fraction: f64) {
        let Some(reporter) = self.reporter else {
            return;
        };
        let percent = (fraction.clamp(0.0, 1.0) * 100.0).floor() as u32;
        if self.last.map_or(true, |last| percent > last) {
            self.last = Some(percent);
            reporter.report(&format!("{}: {}%", self.task, percent));
        }
    }

    /// Record `done` out of `total` work items.
    pub fn update_count(&mut self, done: usize, total: usize) {
        if total > 0 {
            self.update(done as f64 / total as f64);
        }
    }

    /// Report completion.
    pub fn finish(&mut self) {
        self.update(1.0);
    }
}
