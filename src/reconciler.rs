//! Reconciler for maintaining the desired state of one index.
//!
//! This module implements the convergence state machine. For a `present`
//! intent it runs, in this fixed order: existence check, create (if absent)
//! or attribute fetch and update (if present), toggle reconciliation, clean.
//! For an `absent` intent it deletes the index if it exists.
//!
//! Every remote call is awaited before the next one is issued. The first
//! failure aborts the run; operations already issued are not rolled back.
//!
//! [`apply`] wraps one whole invocation: it opens the connection through a
//! caller-supplied factory and skips it entirely in check mode.

use tracing::{debug, info, warn};

use crate::config::{
    ConnectionParameters, DesiredState, DesiredStateBuilder, IndexParams, IndexState,
};
use crate::error::{ReconcileError, ReconcileStep, Result, SplunkIndexError};
use crate::planner::{ActionType, AttributeChange, DiffEngine};
use crate::report::{OutcomeReporter, ReconciliationResult};
use crate::splunk::{ActualState, DISABLED_KEY, IndexAccessor};

/// Reconciler for a single Splunk index.
pub struct Reconciler<'a, A: IndexAccessor + ?Sized> {
    /// Remote index accessor.
    accessor: &'a A,
    /// Diff engine.
    diff_engine: DiffEngine,
}

impl<'a, A: IndexAccessor + ?Sized> Reconciler<'a, A> {
    /// Creates a new reconciler.
    #[must_use]
    pub const fn new(accessor: &'a A) -> Self {
        Self {
            accessor,
            diff_engine: DiffEngine::new(),
        }
    }

    /// Converges the index `name` to `desired` under the given intent.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::StepFailed`] naming the step whose remote
    /// call failed. No later step runs after a failure.
    pub async fn reconcile(
        &self,
        name: &str,
        desired: &DesiredState,
        intent: IndexState,
    ) -> Result<ReconciliationResult> {
        info!("Starting reconciliation of index {name} (state: {intent})");

        let mut reporter = OutcomeReporter::new(name, intent);

        match intent {
            IndexState::Present => self.ensure_present(name, desired, &mut reporter).await?,
            IndexState::Absent => self.ensure_absent(name, &mut reporter).await?,
        }

        let result = reporter.finish();
        if result.changed {
            info!("Index {name} reconciled with {} operations", result.actions.len());
        } else {
            info!("No changes required - index {name} is converged");
        }
        Ok(result)
    }

    /// Drives an index towards the `present` intent.
    async fn ensure_present(
        &self,
        name: &str,
        desired: &DesiredState,
        reporter: &mut OutcomeReporter,
    ) -> Result<()> {
        let exists = self.exists(name).await?;

        let actual = if exists {
            let actual = self.fetch(name).await?;
            self.update_attributes(name, desired, &actual, reporter).await?;
            Some(actual)
        } else {
            self.create(name, desired, reporter).await?;
            None
        };

        if let Some(requested) = desired.disabled {
            // A freshly created index is read back so the toggle observes
            // the state the create left behind.
            let current = match actual {
                Some(actual) => actual.disabled(),
                None => self.fetch(name).await?.disabled(),
            };
            self.reconcile_toggle(name, requested, current, reporter)
                .await?;
        }

        if desired.clean {
            self.clean(name, reporter).await?;
        }

        Ok(())
    }

    /// Drives an index towards the `absent` intent.
    async fn ensure_absent(&self, name: &str, reporter: &mut OutcomeReporter) -> Result<()> {
        if !self.exists(name).await? {
            debug!("Index {name} already absent");
            return Ok(());
        }

        self.accessor
            .delete(name)
            .await
            .map_err(|e| step_failed(name, ReconcileStep::Delete, e))?;
        reporter.record(ActionType::Delete);
        Ok(())
    }

    /// Checks whether the index exists.
    async fn exists(&self, name: &str) -> Result<bool> {
        self.accessor
            .exists(name)
            .await
            .map_err(|e| step_failed(name, ReconcileStep::ExistenceCheck, e))
    }

    /// Reads the current attributes of the index.
    async fn fetch(&self, name: &str) -> Result<ActualState> {
        self.accessor
            .fetch_attributes(name)
            .await
            .map_err(|e| step_failed(name, ReconcileStep::FetchAttributes, e))
    }

    /// Creates the index with every desired attribute, immutables included.
    async fn create(
        &self,
        name: &str,
        desired: &DesiredState,
        reporter: &mut OutcomeReporter,
    ) -> Result<()> {
        self.accessor
            .create(name, desired.config.as_map())
            .await
            .map_err(|e| step_failed(name, ReconcileStep::Create, e))?;

        reporter.record(ActionType::Create);
        for (attribute, value) in desired.config.iter() {
            reporter.record_change(AttributeChange::created(attribute, value));
        }
        Ok(())
    }

    /// Issues a single update carrying exactly the differing mutable attributes.
    async fn update_attributes(
        &self,
        name: &str,
        desired: &DesiredState,
        actual: &ActualState,
        reporter: &mut OutcomeReporter,
    ) -> Result<()> {
        let dropped = desired.config.len() - desired.config.mutable_only().len();
        if dropped > 0 {
            warn!("Ignoring {dropped} creation-time-only attributes on existing index {name}");
        }

        let update = self.diff_engine.compute_update_set(&desired.config, actual);
        if update.is_empty() {
            debug!("Attributes of index {name} are up to date");
            return Ok(());
        }

        self.accessor
            .update(name, &update.to_attributes())
            .await
            .map_err(|e| step_failed(name, ReconcileStep::Update, e))?;

        reporter.record(ActionType::Update);
        for change in update.changes {
            reporter.record_change(change);
        }
        Ok(())
    }

    /// Enables or disables the index when the requested flag differs.
    async fn reconcile_toggle(
        &self,
        name: &str,
        requested: bool,
        current: bool,
        reporter: &mut OutcomeReporter,
    ) -> Result<()> {
        if requested == current {
            debug!("Index {name} already has disabled={current}");
            return Ok(());
        }

        let (action, step) = if requested {
            (ActionType::Disable, ReconcileStep::Disable)
        } else {
            (ActionType::Enable, ReconcileStep::Enable)
        };

        let call = if requested {
            self.accessor.disable(name).await
        } else {
            self.accessor.enable(name).await
        };
        call.map_err(|e| step_failed(name, step, e))?;

        reporter.record(action);
        reporter.record_change(AttributeChange {
            attribute: DISABLED_KEY.to_string(),
            before: Some(current.to_string()),
            after: Some(requested.to_string()),
        });
        Ok(())
    }

    /// Purges the index data. Always issued when requested.
    async fn clean(&self, name: &str, reporter: &mut OutcomeReporter) -> Result<()> {
        warn!("Clean requested for index {name}: data is discarded on every run");

        self.accessor
            .clean(name)
            .await
            .map_err(|e| step_failed(name, ReconcileStep::Clean, e))?;
        reporter.record(ActionType::Clean);
        Ok(())
    }
}

/// Runs one apply invocation for already validated parameters.
///
/// In check mode `connect` is never called and no operation is issued, so
/// the result always reports no change.
///
/// # Errors
///
/// Returns a configuration error if the index name or a connection setting
/// is missing, the error returned by `connect`, or the first failed step.
pub async fn apply<A, F, Fut>(
    params: &IndexParams,
    check: bool,
    connect: F,
) -> Result<ReconciliationResult>
where
    A: IndexAccessor,
    F: FnOnce(ConnectionParameters) -> Fut,
    Fut: Future<Output = Result<A>>,
{
    let name = params.index_name()?;
    let intent = params.intent();

    if check {
        info!("Check mode: no connection opened for index {name}");
        return Ok(ReconciliationResult::unchanged(name, intent));
    }

    let accessor = connect(params.connection()?).await?;
    let desired = DesiredStateBuilder::new().build(params);
    Reconciler::new(&accessor)
        .reconcile(name, &desired, intent)
        .await
}

fn step_failed(name: &str, step: ReconcileStep, source: SplunkIndexError) -> SplunkIndexError {
    ReconcileError::step_failed(name, step, source).into()
}
