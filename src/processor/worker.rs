//! Runs the pipeline on a background thread so the interactive side stays
//! responsive. Events come back over a channel; the trigger stays disabled
//! until the thread is done.

use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::info;

use crate::document::Document;
use crate::error::{Error, IoContext, Result};
use crate::store::ProfileStore;

use super::{Orchestrator, RunEvent, RunOptions, RunOutcome, Trigger};

pub struct RunHandle {
    events: Receiver<RunEvent>,
    join: JoinHandle<Result<RunOutcome>>,
}

impl RunHandle {
    /// Block until the run ends, draining events into `on_event`.
    pub fn wait_with(self, mut on_event: impl FnMut(RunEvent)) -> Result<RunOutcome> {
        for event in self.events.iter() {
            on_event(event);
        }
        self.join.join().map_err(|_| Error::WorkerPanicked)?
    }

    pub fn wait(self) -> Result<RunOutcome> {
        self.wait_with(|_| {})
    }
}

/// Start one run in the background.
///
/// The document is locked only while it is validated (and emptied on
/// success); everything after that touches the filesystem only.
pub fn spawn<D, S>(
    trigger: &Trigger,
    doc: Arc<Mutex<D>>,
    store: S,
    options: RunOptions,
) -> Result<RunHandle>
where
    D: Document + Send + 'static,
    S: ProfileStore + Send + 'static,
{
    let guard = trigger.try_begin()?;
    let (tx, events) = mpsc::channel();

    let join = thread::Builder::new()
        .name("cnc-run".into())
        .spawn(move || {
            let _guard = guard;
            info!(output = %options.output_root.display(), "run started");

            let mut sink = |event: RunEvent| {
                // receiver gone means nobody is watching; keep going
                let _ = tx.send(event);
            };
            let mut orch = Orchestrator::new(&store, &options, &mut sink);

            let scan = {
                let mut doc = doc.lock().unwrap_or_else(PoisonError::into_inner);
                orch.validate(&mut *doc)
            };
            orch.complete(scan)
        })
        .io_context("spawn worker thread", "cnc-run")?;

    Ok(RunHandle { events, join })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextBuffer;
    use crate::processor::RunState;
    use crate::store::MemoryProfileStore;
    use tempfile::TempDir;

    #[test]
    fn test_background_run_streams_events() {
        let td = TempDir::new().unwrap();
        let trigger = Trigger::new();
        let doc = Arc::new(Mutex::new(TextBuffer::from_text("07_1_100  1234\n07_1_100  5678")));
        let options = RunOptions {
            output_root: td.path().join("out"),
            source_dir: None,
            folder_labels: true,
        };

        // keep the worker parked on the document while we try a second run
        let held = doc.lock().unwrap();
        let handle = spawn(&trigger, Arc::clone(&doc), MemoryProfileStore::new(), options).unwrap();
        assert!(!trigger.is_enabled());
        assert!(matches!(
            spawn(&trigger, Arc::clone(&doc), MemoryProfileStore::new(), RunOptions {
                output_root: td.path().join("other"),
                source_dir: None,
                folder_labels: true,
            }),
            Err(Error::AlreadyRunning)
        ));
        drop(held);

        let mut events = Vec::new();
        let outcome = handle.wait_with(|e| events.push(e)).unwrap();

        assert!(matches!(outcome, RunOutcome::Completed { ref artifacts, .. } if artifacts.len() == 1));
        assert_eq!(events.first(), Some(&RunEvent::State(RunState::Validating)));
        assert_eq!(events.last(), Some(&RunEvent::State(RunState::Idle)));
        assert!(trigger.is_enabled());
        assert!(doc.lock().unwrap().is_empty());
        assert!(td.path().join("out").join("Machine 7").join("7.NC").is_file());
        assert!(!td.path().join("other").exists());
    }

    #[test]
    fn test_trigger_reenabled_after_abort() {
        let td = TempDir::new().unwrap();
        let trigger = Trigger::new();
        let doc = Arc::new(Mutex::new(TextBuffer::from_text("nope")));
        let options = RunOptions {
            output_root: td.path().join("out"),
            source_dir: None,
            folder_labels: true,
        };

        let outcome = spawn(&trigger, Arc::clone(&doc), MemoryProfileStore::new(), options)
            .unwrap()
            .wait()
            .unwrap();

        assert_eq!(outcome, RunOutcome::Aborted { line: 0 });
        assert!(trigger.is_enabled());
        assert!(doc.lock().unwrap().is_tagged(0));
    }
}
