/*!
 * Inflation Service
 * Collaborator-facing handle: start, query and reset inflation
 *
 * Request handlers call into this without blocking; inflation itself runs
 * as a detached tokio task.
 */

use super::types::{ResetResponse, StatusResponse};
use crate::core::errors::{InflationError, InflationResult};
use crate::core::types::current_pid;
use crate::memory::inflation::{InflationEngine, InflationRequest};
use crate::memory::introspection::own_process_report;
use crate::memory::types::{InflationStatus, MemoryReport};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

#[derive(Clone, Debug)]
pub struct InflationService {
    engine: InflationEngine,
}

impl InflationService {
    pub fn new(engine: InflationEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &InflationEngine {
        &self.engine
    }

    /// Validate and launch an inflation in the background.
    ///
    /// `target_mb` is an amount to add, not an absolute level: two requests
    /// for 100 MB leave 200 MB allocated. See [`InflationEngine::inflate_to`].
    ///
    /// Returns as soon as the task is spawned. The task logs its own
    /// failure; the handle may be awaited or dropped.
    pub fn start_inflation(
        &self,
        target_mb: i64,
        step_mb: i64,
    ) -> InflationResult<JoinHandle<InflationResult<InflationStatus>>> {
        let request = InflationRequest::new(target_mb, step_mb)?;
        let engine = self.engine.clone();

        Ok(tokio::spawn(async move {
            let result = engine.inflate(request).await;
            match &result {
                Ok(status) => {
                    debug!(allocated_mb = status.allocated_mb, "background inflation finished")
                }
                Err(e @ InflationError::Cancelled { .. }) => {
                    warn!(error = %e, "background inflation cancelled")
                }
                Err(e) => error!(error = %e, "background inflation failed"),
            }
            result
        }))
    }

    pub fn get_status(&self) -> StatusResponse {
        self.engine.status().into()
    }

    pub fn reset(&self) -> ResetResponse {
        self.engine.reset().into()
    }

    /// Footprint of this process, computed on the blocking pool
    pub async fn memory_report(&self) -> MemoryReport {
        let introspector = self.engine.introspector();
        let pid = current_pid();
        match tokio::task::spawn_blocking(move || introspector.memory_report(pid)).await {
            Ok(report) => report,
            Err(e) => {
                debug!(error = %e, "memory report task did not complete");
                own_process_report()
            }
        }
    }
}
