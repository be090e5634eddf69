//! The processing pipeline: validate → group → resolve → generate.
//!
//! ```text
//! Idle ─▶ Validating ─┬─▶ Aborted ───────────────────────────▶ Idle
//!                     └─▶ Grouping ─▶ Generating ─────────────▶ Idle
//! ```
//!
//! Validation is fail-fast: the first malformed line is annotated and the
//! run stops there, without touching the output root. Lines after it are
//! neither checked nor annotated in that pass. A job list with more ids
//! for one machine than its program can hold is rejected at the same
//! point, before the document or the output root change.
pub mod annotator;
pub mod grouper;
pub mod profile;
pub mod worker;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, trace};

use crate::document::Document;
use crate::error::{Error, Result};
use crate::model::{GeneratedArtifact, MachineGroups, ValidationOutcome, machine_number};
use crate::parser;
use crate::store::ProfileStore;
use crate::writer::{self, program};

use grouper::MachineGrouper;
use profile::Resolution;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Validating,
    Aborted,
    Grouping,
    Generating,
}

/// Notifications for the interactive side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    State(RunState),
    /// Validation stopped at this (0-based) line.
    Aborted { line: usize },
    MissingProfile { machine: u32 },
    /// Two ticks per machine: before its folder, before its copies.
    Progress { done: usize, total: usize },
    /// Open the output root for the operator. Sent once, only when
    /// something was generated.
    RevealOutput(PathBuf),
    Finished { artifacts: usize },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Aborted {
        line: usize,
    },
    Completed {
        artifacts: Vec<GeneratedArtifact>,
        missing_profiles: Vec<u32>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub output_root: PathBuf,
    /// Where `{program id}` source files are copied from. `None` disables copying.
    pub source_dir: Option<PathBuf>,
    pub folder_labels: bool,
}

/// Result of the validation pass.
#[derive(Debug)]
pub enum Scan {
    Aborted { line: usize },
    /// Every line is well formed but the job list cannot be generated.
    /// Nothing has been touched yet.
    Rejected(Error),
    Valid(MachineGroups),
}

/// Enable state of the "Process" control. At most one run holds it.
#[derive(Debug, Clone, Default)]
pub struct Trigger {
    busy: Arc<AtomicBool>,
}

impl Trigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        !self.busy.load(Ordering::Acquire)
    }

    /// Disable the trigger for the lifetime of the returned guard.
    pub fn try_begin(&self) -> Result<RunGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::AlreadyRunning)?;
        Ok(RunGuard {
            busy: Arc::clone(&self.busy),
        })
    }
}

/// Re-enables the trigger when dropped, whatever way the run ended.
#[derive(Debug)]
pub struct RunGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

pub struct Orchestrator<'a> {
    store: &'a dyn ProfileStore,
    options: &'a RunOptions,
    sink: &'a mut dyn FnMut(RunEvent),
    state: RunState,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        store: &'a dyn ProfileStore,
        options: &'a RunOptions,
        sink: &'a mut dyn FnMut(RunEvent),
    ) -> Self {
        Self {
            store,
            options,
            sink,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Validate and generate in one go on the calling thread.
    pub fn run(&mut self, doc: &mut dyn Document) -> Result<RunOutcome> {
        let scan = self.validate(doc);
        self.complete(scan)
    }

    /// Scan the document line by line.
    ///
    /// Markers on lines that are no longer malformed are cleared as the
    /// scan passes them. On success the document is emptied; a job list
    /// that overflows a machine's slot range is rejected before that.
    pub fn validate(&mut self, doc: &mut dyn Document) -> Scan {
        self.enter(RunState::Validating);
        let mut grouper = MachineGrouper::new();

        for index in 0..doc.line_count() {
            let Some(text) = doc.line(index) else {
                break;
            };
            match parser::classify(&text) {
                ValidationOutcome::Malformed => {
                    annotator::annotate(doc, index);
                    self.enter(RunState::Aborted);
                    info!(line = index + 1, "malformed line, run aborted");
                    self.emit(RunEvent::Aborted { line: index });
                    return Scan::Aborted { line: index };
                }
                ValidationOutcome::Valid(entry) => {
                    annotator::clear(doc, index);
                    trace!(
                        line = index + 1,
                        machine = entry.machine_number(),
                        program = %entry.program_id,
                        "job line"
                    );
                    grouper.add(entry);
                }
                ValidationOutcome::Blank => annotator::clear(doc, index),
            }
        }

        let capacity = grouper
            .result()
            .iter()
            .try_for_each(|(code, ids)| program::check_capacity(machine_number(code), ids));
        if let Err(e) = capacity {
            return Scan::Rejected(e);
        }

        self.enter(RunState::Grouping);
        doc.clear_all();
        Scan::Valid(grouper.into_groups())
    }

    /// Finish a run after validation. Always returns to `Idle`.
    pub fn complete(&mut self, scan: Scan) -> Result<RunOutcome> {
        let outcome = match scan {
            Scan::Aborted { line } => Ok(RunOutcome::Aborted { line }),
            Scan::Rejected(e) => Err(e),
            Scan::Valid(groups) => self.generate(&groups),
        };

        match &outcome {
            Ok(RunOutcome::Completed { artifacts, .. }) => {
                info!(artifacts = artifacts.len(), "run finished");
                self.emit(RunEvent::Finished {
                    artifacts: artifacts.len(),
                });
            }
            Ok(RunOutcome::Aborted { .. }) => {}
            Err(e) => {
                tracing::error!(error = %e, "run failed");
                self.emit(RunEvent::Failed(e.to_string()));
            }
        }
        self.enter(RunState::Idle);
        outcome
    }

    fn generate(&mut self, groups: &MachineGroups) -> Result<RunOutcome> {
        let options = self.options;
        let root = &options.output_root;
        writer::clear_output_root(root)?;

        self.enter(RunState::Generating);
        let total = groups.len() * 2;
        let mut done = 0;
        let mut artifacts = Vec::with_capacity(groups.len());
        let mut missing_profiles = Vec::new();

        for (code, ids) in groups {
            let number = machine_number(code);
            let profile = match profile::resolve(self.store, code)? {
                Resolution::Found(p) => Some(p),
                Resolution::NotFound => {
                    missing_profiles.push(number);
                    self.emit(RunEvent::MissingProfile { machine: number });
                    None
                }
            };
            let text = program::render(number, ids, profile.as_ref())?;

            done += 1;
            self.emit(RunEvent::Progress { done, total });
            let folder =
                writer::prepare_folder(root, number, profile.as_ref(), options.folder_labels)?;
            let file = writer::write_program(&folder, number, &text)?;

            done += 1;
            self.emit(RunEvent::Progress { done, total });
            let copied = match &options.source_dir {
                Some(src) => writer::copy_sources(src, ids, &folder)?,
                None => Vec::new(),
            };
            debug!(machine = number, ids = ids.len(), copied = copied.len(), "machine done");

            artifacts.push(GeneratedArtifact {
                machine_number: number,
                folder,
                file,
                copied,
            });
        }

        if !artifacts.is_empty() {
            self.emit(RunEvent::RevealOutput(root.clone()));
        }
        Ok(RunOutcome::Completed {
            artifacts,
            missing_profiles,
        })
    }

    fn enter(&mut self, state: RunState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "run state");
            self.state = state;
            self.emit(RunEvent::State(state));
        }
    }

    fn emit(&mut self, event: RunEvent) {
        (self.sink)(event);
    }
}
