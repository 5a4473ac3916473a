/*!
 * Inflation Engine
 *
 * Grows the process's physical footprint in fixed-size, fully touched
 * steps, pausing between steps so external monitors can watch the climb.
 *
 * ## State
 *
 * The block list, the megabyte counter and the reset generation live in a
 * single mutex. Every mutation and every status read goes through it, so a
 * reader never sees a counter that disagrees with the blocks behind it.
 *
 * ## Reset
 *
 * `reset` bumps the generation. A running inflation notices the change
 * before committing its next block (or while pausing) and stops with
 * [`InflationError::Cancelled`], so nothing started before a reset can add
 * memory after it.
 *
 * ## Introspection
 *
 * After each step the injected [`MemoryIntrospector`] is queried on the
 * blocking pool for progress events. It has no error path and its result
 * never influences allocation.
 */

mod block;

pub use block::{BlockAllocError, MemoryBlock};

use crate::core::config::InflationConfig;
use crate::core::errors::{InflationError, InflationResult};
use crate::core::types::{current_pid, Megabytes, Pid};
use crate::memory::introspection::HostIntrospector;
use crate::memory::traits::MemoryIntrospector;
use crate::memory::types::{InflationStatus, MemoryReport};
use crate::monitoring::{inflation_span, EventSink, InflationEvent, TracingEventSink};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, warn, Instrument, Span};
use uuid::Uuid;

/// Validated inflation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InflationRequest {
    pub target_mb: Megabytes,
    pub step_mb: Megabytes,
}

impl InflationRequest {
    /// Validate caller-supplied values.
    ///
    /// A negative target is rejected; a non-positive step is clamped to 1 MB.
    pub fn new(target_mb: i64, step_mb: i64) -> InflationResult<Self> {
        let target_mb = Megabytes::try_from(target_mb).map_err(|_| {
            InflationError::invalid_parameters(format!("target_mb must be >= 0, got {}", target_mb))
        })?;

        let step_mb = if step_mb < 1 {
            warn!(step_mb, "non-positive step clamped to 1 MB");
            1
        } else {
            step_mb as Megabytes
        };

        Ok(Self { target_mb, step_mb })
    }
}

/// Engine-owned allocation state
#[derive(Debug, Default)]
struct AllocationState {
    blocks: Vec<MemoryBlock>,
    allocated_mb: Megabytes,
    generation: u64,
}

impl AllocationState {
    fn push(&mut self, block: MemoryBlock) {
        self.allocated_mb += block.size_mb();
        self.blocks.push(block);
        debug_assert!(self.is_consistent());
    }

    fn take(&mut self) -> Vec<MemoryBlock> {
        self.generation = self.generation.wrapping_add(1);
        self.allocated_mb = 0;
        std::mem::take(&mut self.blocks)
    }

    fn status(&self) -> InflationStatus {
        InflationStatus {
            allocated_mb: self.allocated_mb,
            block_count: self.blocks.len(),
        }
    }

    fn is_consistent(&self) -> bool {
        self.blocks.iter().map(MemoryBlock::size_mb).sum::<Megabytes>() == self.allocated_mb
    }
}

/// Memory inflation engine
///
/// Cheap to clone; clones share the same allocation state.
#[derive(Clone)]
pub struct InflationEngine {
    state: Arc<Mutex<AllocationState>>,
    reset_signal: Arc<Notify>,
    introspector: Arc<dyn MemoryIntrospector>,
    events: Arc<dyn EventSink>,
    config: InflationConfig,
    pid: Pid,
}

impl InflationEngine {
    pub fn new(introspector: impl MemoryIntrospector + 'static) -> Self {
        Self {
            state: Arc::new(Mutex::new(AllocationState::default())),
            reset_signal: Arc::new(Notify::new()),
            introspector: Arc::new(introspector),
            events: Arc::new(TracingEventSink),
            config: InflationConfig::default(),
            pid: current_pid(),
        }
    }

    /// Engine using the strategy detected for this host
    pub fn for_host() -> Self {
        Self::new(HostIntrospector::detect())
    }

    pub fn with_config(mut self, config: InflationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_event_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.events = Arc::new(sink);
        self
    }

    /// Process whose footprint is reported in progress events
    pub fn with_pid(mut self, pid: Pid) -> Self {
        self.pid = pid;
        self
    }

    pub fn config(&self) -> &InflationConfig {
        &self.config
    }

    pub fn introspector(&self) -> Arc<dyn MemoryIntrospector> {
        Arc::clone(&self.introspector)
    }

    /// Allocate `target_mb` megabytes in steps of at most `step_mb`.
    ///
    /// The target is counted per call: the loop runs until this call has
    /// committed `target_mb`, whatever other calls hold. From an empty engine
    /// that leaves exactly `target_mb` allocated, but sequential calls add up
    /// (`inflate_to(20, 10)` twice ends at 40 MB) and concurrent calls add up
    /// the same way. Call [`reset`] first to inflate to an absolute level.
    ///
    /// A zero step is treated as 1 MB. Returns the engine status after the
    /// last step. Allocation failure and cancellation by [`reset`] end the
    /// call early; blocks committed before that point stay allocated.
    ///
    /// [`reset`]: InflationEngine::reset
    pub async fn inflate_to(
        &self,
        target_mb: Megabytes,
        step_mb: Megabytes,
    ) -> InflationResult<InflationStatus> {
        let step_mb = step_mb.max(1);
        let run_id = Uuid::new_v4();
        let span = inflation_span(run_id, target_mb, step_mb);

        self.run(run_id, target_mb, step_mb).instrument(span).await
    }

    /// Validated variant of [`inflate_to`](InflationEngine::inflate_to)
    pub async fn inflate(&self, request: InflationRequest) -> InflationResult<InflationStatus> {
        self.inflate_to(request.target_mb, request.step_mb).await
    }

    async fn run(
        &self,
        run_id: Uuid,
        target_mb: Megabytes,
        step_mb: Megabytes,
    ) -> InflationResult<InflationStatus> {
        let generation = self.generation();
        self.events.emit(&InflationEvent::Started {
            run_id,
            target_mb,
            step_mb,
        });

        let mut done: Megabytes = 0;
        while done < target_mb {
            let chunk = step_mb.min(target_mb - done);
            let block = match MemoryBlock::allocate(chunk, self.config.page_size) {
                Ok(block) => block,
                Err(e) => return Err(self.allocation_failed(run_id, chunk, e)),
            };

            let status = {
                let mut state = self.state.lock();
                if state.generation != generation {
                    drop(state);
                    drop(block);
                    return Err(self.cancelled(run_id, done, target_mb));
                }
                state.push(block);
                state.status()
            };
            done += chunk;
            Span::current().record("allocated_mb", status.allocated_mb);

            let report = self.probe().await;
            self.events.emit(&InflationEvent::StepCompleted {
                run_id,
                step_mb: chunk,
                allocated_mb: status.allocated_mb,
                block_count: status.block_count,
                own_mb: report.map(|r| r.own_mb()),
                subtree_mb: report.map(|r| r.subtree_mb()),
                container_mb: report.and_then(|r| r.container_mb()),
            });

            if done < target_mb && !self.pause(generation).await {
                return Err(self.cancelled(run_id, done, target_mb));
            }
        }

        let report = self.probe().await;
        let status = self.status();
        self.events.emit(&InflationEvent::Completed {
            run_id,
            allocated_mb: status.allocated_mb,
            own_mb: report.map(|r| r.own_mb()),
            subtree_mb: report.map(|r| r.subtree_mb()),
            container_mb: report.and_then(|r| r.container_mb()),
        });

        Ok(status)
    }

    /// Wait out the step interval. Returns false if a reset happened.
    async fn pause(&self, generation: u64) -> bool {
        let reset = self.reset_signal.notified();
        tokio::pin!(reset);
        reset.as_mut().enable();

        if self.generation() != generation {
            return false;
        }

        tokio::select! {
            _ = tokio::time::sleep(self.config.step_interval) => {}
            _ = &mut reset => {}
        }

        self.generation() == generation
    }

    /// Best-effort footprint query for progress reporting
    async fn probe(&self) -> Option<MemoryReport> {
        if !self.config.report_progress {
            return None;
        }

        let introspector = Arc::clone(&self.introspector);
        let pid = self.pid;
        match tokio::task::spawn_blocking(move || introspector.memory_report(pid)).await {
            Ok(report) => Some(report),
            Err(e) => {
                debug!(error = %e, "introspection task did not complete");
                None
            }
        }
    }

    fn allocation_failed(
        &self,
        run_id: Uuid,
        requested_mb: Megabytes,
        cause: BlockAllocError,
    ) -> InflationError {
        let allocated_mb = self.status().allocated_mb;
        let reason = cause.to_string();
        self.events.emit(&InflationEvent::Failed {
            run_id,
            allocated_mb,
            reason: reason.clone(),
        });
        InflationError::AllocationFailed {
            requested_mb,
            allocated_mb,
            reason,
        }
    }

    fn cancelled(&self, run_id: Uuid, completed_mb: Megabytes, target_mb: Megabytes) -> InflationError {
        self.events.emit(&InflationEvent::Cancelled {
            run_id,
            completed_mb,
            target_mb,
        });
        InflationError::Cancelled {
            completed_mb,
            target_mb,
        }
    }

    fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Allocated megabytes and block count, read atomically
    pub fn status(&self) -> InflationStatus {
        self.state.lock().status()
    }

    pub fn allocated_mb(&self) -> Megabytes {
        self.status().allocated_mb
    }

    pub fn block_count(&self) -> usize {
        self.status().block_count
    }

    /// Release every block and cancel running inflations.
    ///
    /// Blocks are freed after the lock is released.
    pub fn reset(&self) -> InflationStatus {
        let released = self.state.lock().take();
        self.reset_signal.notify_waiters();

        let released_blocks = released.len();
        let released_mb = released.iter().map(MemoryBlock::size_mb).sum();
        drop(released);

        self.events.emit(&InflationEvent::ResetComplete {
            released_mb,
            released_blocks,
        });
        InflationStatus::default()
    }
}

impl std::fmt::Debug for InflationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InflationEngine")
            .field("status", &self.status())
            .field("platform", &self.introspector.platform())
            .field("config", &self.config)
            .field("pid", &self.pid)
            .finish()
    }
}
