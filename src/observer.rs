use std::ops::ControlFlow;

use crate::{common::LoadError, loader::LoadReport};

/// Hooks the loader calls while it runs. Every method has a no-op default.
pub trait LoadObserver {
    /// Called before row `index` is derived and inserted. `Break` stops the load; the open
    /// batch is rolled back and the run ends with `LoadError::Interrupted`.
    fn before_row(&mut self, _index: u64) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// Called after a commit made every row up to `last_row` durable.
    fn on_commit(&mut self, _last_row: u64) {}

    /// Called every `log_interval` rows.
    fn on_progress(&mut self, _index: u64) {}

    fn on_complete(&mut self, _report: &LoadReport) {}

    /// Called once when the run fails, after the open batch was rolled back and the connection
    /// released. The error is still returned from `Loader::run`.
    fn on_error(&mut self, _error: &LoadError) {}
}

/// Prints `Finished inserting <i> rows` lines to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutProgress;

impl LoadObserver for StdoutProgress {
    fn on_progress(&mut self, index: u64) {
        println!("{}", progress_line(index));
    }
}

#[must_use]
pub fn progress_line(index: u64) -> String {
    format!("Finished inserting {index} rows")
}

/// Ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl LoadObserver for Silent {}
