//! Mode controller: routes descriptors to the local evaluator or a remote
//! source, and decides which results are allowed to reach the view.

use std::sync::Arc;

use crate::columns::ColumnRegistry;
use crate::error::FetchError;
use crate::error::TableError;
use crate::eval::evaluate;
use crate::model::Dataset;
use crate::model::Row;
use crate::model::RowId;
use crate::query::QueryDescriptor;
use crate::query::ViewResult;
use crate::remote::FetchCompletion;
use crate::remote::PendingFetch;
use crate::remote::RemoteSource;

/// Where descriptors are evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// In-process over the full dataset.
    #[default]
    Local,
    /// By a [`RemoteSource`], one page at a time.
    Remote,
}

/// What happens when a local table meets an operation that needs a server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EscalationPolicy {
    /// Stay local and evaluate in-process.
    #[default]
    Disabled,
    /// Switch to remote mode for good and fetch immediately.
    Automatic,
}

/// The evaluation a descriptor change produced.
#[derive(Debug)]
#[must_use = "a remote dispatch does nothing until its fetch is run and completed"]
pub enum Dispatch {
    /// Evaluated synchronously; the view is already up to date.
    Local,
    /// A fetch to run on the caller's task queue.
    Remote(PendingFetch),
}

impl Dispatch {
    /// Returns the pending fetch, if this dispatch went remote.
    pub fn into_pending(self) -> Option<PendingFetch> {
        match self {
            Dispatch::Local => None,
            Dispatch::Remote(pending) => Some(pending),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Dispatch::Remote(_))
    }
}

/// Outcome of feeding a completed fetch back to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchStatus {
    /// The response was current and is now the view. Carries the page rows.
    Applied(Dataset),
    /// A newer fetch was started after this one; the response was ignored.
    Discarded,
}

/// State machine over [`Mode`] and the current [`QueryDescriptor`].
///
/// Every submitted descriptor produces exactly one evaluation and bumps the
/// generation counter. Only a completion carrying the latest generation may
/// change the view, so responses that arrive out of order are dropped.
pub struct ModeController {
    mode: Mode,
    escalation: EscalationPolicy,
    source: Option<Arc<dyn RemoteSource>>,
    id_field: String,
    descriptor: QueryDescriptor,
    view: ViewResult,
    generation: u64,
    last_error: Option<FetchError>,
    escalated: bool,
}

impl ModeController {
    /// Creates a controller. Nothing is evaluated until the first submit.
    pub fn new(mode: Mode, descriptor: QueryDescriptor, id_field: impl Into<String>) -> Self {
        descriptor.assert_valid();
        Self {
            mode,
            escalation: EscalationPolicy::default(),
            source: None,
            id_field: id_field.into(),
            descriptor,
            view: ViewResult::default(),
            generation: 0,
            last_error: None,
            escalated: false,
        }
    }

    /// Attaches the remote source.
    pub fn with_source(mut self, source: Arc<dyn RemoteSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_escalation(mut self, policy: EscalationPolicy) -> Self {
        self.escalation = policy;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn escalation(&self) -> EscalationPolicy {
        self.escalation
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// The most recently submitted descriptor.
    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    /// The current view. While a fetch is outstanding this is the last
    /// settled view flagged as loading.
    pub fn view(&self) -> &ViewResult {
        &self.view
    }

    pub fn is_loading(&self) -> bool {
        self.view.is_loading()
    }

    /// Error of the latest fetch, cleared by the next successful evaluation.
    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    /// Generation of the latest dispatch.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `true` once automatic escalation has moved this table to remote mode.
    pub fn has_escalated(&self) -> bool {
        self.escalated
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Makes `descriptor` current and evaluates it in the current mode.
    ///
    /// `rows` is the canonical local dataset; it is ignored in remote mode.
    ///
    /// # Panics
    ///
    /// Panics if the descriptor's page or page size is 0.
    pub fn submit(&mut self, descriptor: QueryDescriptor, rows: &[Row], columns: &ColumnRegistry) -> Dispatch {
        self.descriptor = descriptor;
        self.dispatch(rows, columns)
    }

    /// Like [`submit`](Self::submit), for operations that need a server.
    ///
    /// In local mode with [`EscalationPolicy::Automatic`] and a source, the
    /// controller switches to remote mode permanently and fetches
    /// `descriptor`. Otherwise the descriptor is evaluated locally.
    pub fn submit_requiring_server(
        &mut self,
        descriptor: QueryDescriptor,
        rows: &[Row],
        columns: &ColumnRegistry,
    ) -> Dispatch {
        if self.mode == Mode::Local {
            match (self.escalation, self.source.is_some()) {
                (EscalationPolicy::Automatic, true) => {
                    log::debug!("[controller] escalating to remote mode");
                    self.mode = Mode::Remote;
                    self.escalated = true;
                }
                (EscalationPolicy::Automatic, false) => {
                    log::warn!("[controller] escalation requested without a remote source, evaluating locally");
                }
                (EscalationPolicy::Disabled, _) => {
                    log::warn!("[controller] operation needs a server but escalation is disabled, evaluating locally");
                }
            }
        }
        self.submit(descriptor, rows, columns)
    }

    /// Switches mode explicitly and re-evaluates the current descriptor.
    pub fn set_mode(&mut self, mode: Mode, rows: &[Row], columns: &ColumnRegistry) -> Result<Dispatch, TableError> {
        if mode == Mode::Remote && self.source.is_none() {
            return Err(TableError::NoRemoteSource);
        }
        if mode != self.mode {
            log::debug!("[controller] mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
        Ok(self.dispatch(rows, columns))
    }

    /// Re-evaluates the current descriptor, e.g. after the dataset changed
    /// or to retry a failed fetch.
    pub fn refresh(&mut self, rows: &[Row], columns: &ColumnRegistry) -> Dispatch {
        self.dispatch(rows, columns)
    }

    /// Applies a finished fetch if it is still the latest one.
    ///
    /// A current failure keeps the last settled view and records the error.
    /// A stale completion, success or failure, is discarded.
    pub fn complete(&mut self, completion: FetchCompletion) -> Result<FetchStatus, FetchError> {
        let (generation, result) = completion.into_parts();
        if generation != self.generation {
            log::trace!(
                "[controller] discarding stale response (generation {}, latest {})",
                generation,
                self.generation
            );
            return Ok(FetchStatus::Discarded);
        }

        match result {
            Ok(page) => {
                log::debug!(
                    "[controller] applied generation {} ({} rows of {})",
                    generation,
                    page.rows.len(),
                    page.total_matched
                );
                self.view = ViewResult::new(page.rows.rows().to_vec(), page.total_matched);
                self.last_error = None;
                Ok(FetchStatus::Applied(page.rows))
            }
            Err(e) => {
                log::debug!("[controller] fetch generation {} failed: {}", generation, e);
                self.view = std::mem::take(&mut self.view).settled();
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Replaces the view row with the same id as `row`, if it is on the
    /// current page.
    pub(crate) fn patch_view_row(&mut self, id: &RowId, row: &Row) {
        let Some(i) = self
            .view
            .rows()
            .iter()
            .position(|r| r.id(&self.id_field).as_ref() == Some(id))
        else {
            return;
        };
        let total = self.view.total_matched();
        let loading = self.view.is_loading();
        let mut rows = std::mem::take(&mut self.view).into_rows();
        rows[i] = row.clone();
        let view = ViewResult::new(rows, total);
        self.view = if loading { view.loading() } else { view };
    }

    fn dispatch(&mut self, rows: &[Row], columns: &ColumnRegistry) -> Dispatch {
        self.descriptor.assert_valid();
        self.generation += 1;

        let source = match (self.mode, &self.source) {
            (Mode::Remote, Some(source)) => Arc::clone(source),
            (Mode::Remote, None) => {
                log::warn!("[controller] remote mode without a source, evaluating locally");
                return self.evaluate_locally(rows, columns);
            }
            (Mode::Local, _) => return self.evaluate_locally(rows, columns),
        };

        log::debug!(
            "[controller] fetch generation {} page {} size {}",
            self.generation,
            self.descriptor.page(),
            self.descriptor.page_size()
        );
        self.view = std::mem::take(&mut self.view).loading();
        Dispatch::Remote(PendingFetch::new(
            self.generation,
            self.descriptor.clone(),
            self.id_field.clone(),
            source,
        ))
    }

    fn evaluate_locally(&mut self, rows: &[Row], columns: &ColumnRegistry) -> Dispatch {
        self.view = evaluate(rows, columns, &self.descriptor);
        self.last_error = None;
        log::debug!(
            "[controller] local generation {}: {} of {} rows",
            self.generation,
            self.view.len(),
            self.view.total_matched()
        );
        Dispatch::Local
    }
}

impl std::fmt::Debug for ModeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeController")
            .field("mode", &self.mode)
            .field("escalation", &self.escalation)
            .field("has_source", &self.source.is_some())
            .field("descriptor", &self.descriptor)
            .field("generation", &self.generation)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}
