/*!
 * Inflation Events
 * Progress and diagnostic events emitted by the engine
 *
 * Events are advisory. Sinks observe them but never steer the engine.
 */

use crate::core::types::Megabytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn, Level};
use uuid::Uuid;

/// Event severity for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Severity {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl Severity {
    /// Level `TracingEventSink` logs at
    pub fn level(self) -> Level {
        match self {
            Severity::Debug => Level::DEBUG,
            Severity::Info => Level::INFO,
            Severity::Warn => Level::WARN,
            Severity::Error => Level::ERROR,
        }
    }
}

/// Events emitted over the lifetime of an engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InflationEvent {
    Started {
        run_id: Uuid,
        target_mb: Megabytes,
        step_mb: Megabytes,
    },
    StepCompleted {
        run_id: Uuid,
        step_mb: Megabytes,
        allocated_mb: Megabytes,
        block_count: usize,
        /// Absent when the step was not followed by an introspection query
        own_mb: Option<Megabytes>,
        subtree_mb: Option<Megabytes>,
        container_mb: Option<Megabytes>,
    },
    Completed {
        run_id: Uuid,
        allocated_mb: Megabytes,
        own_mb: Option<Megabytes>,
        subtree_mb: Option<Megabytes>,
        container_mb: Option<Megabytes>,
    },
    Failed {
        run_id: Uuid,
        allocated_mb: Megabytes,
        reason: String,
    },
    Cancelled {
        run_id: Uuid,
        completed_mb: Megabytes,
        target_mb: Megabytes,
    },
    ResetComplete {
        released_mb: Megabytes,
        released_blocks: usize,
    },
}

impl InflationEvent {
    pub fn severity(&self) -> Severity {
        match self {
            InflationEvent::Failed { .. } => Severity::Error,
            InflationEvent::Cancelled { .. } => Severity::Warn,
            _ => Severity::Info,
        }
    }

    /// Run the event belongs to, absent for engine-wide events
    pub fn run_id(&self) -> Option<Uuid> {
        match self {
            InflationEvent::Started { run_id, .. }
            | InflationEvent::StepCompleted { run_id, .. }
            | InflationEvent::Completed { run_id, .. }
            | InflationEvent::Failed { run_id, .. }
            | InflationEvent::Cancelled { run_id, .. } => Some(*run_id),
            InflationEvent::ResetComplete { .. } => None,
        }
    }
}

/// Consumer of engine events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &InflationEvent);
}

/// Renders events through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: &InflationEvent) {
        match event {
            InflationEvent::Started {
                run_id,
                target_mb,
                step_mb,
            } => info!(%run_id, target_mb, step_mb, "Inflation started"),
            InflationEvent::StepCompleted {
                run_id,
                step_mb,
                allocated_mb,
                block_count,
                own_mb,
                subtree_mb,
                container_mb,
            } => info!(
                %run_id,
                step_mb,
                allocated_mb,
                block_count,
                own_mb = ?own_mb,
                subtree_mb = ?subtree_mb,
                container_mb = ?container_mb,
                "Inflation step completed"
            ),
            InflationEvent::Completed {
                run_id,
                allocated_mb,
                own_mb,
                subtree_mb,
                container_mb,
            } => info!(
                %run_id,
                allocated_mb,
                own_mb = ?own_mb,
                subtree_mb = ?subtree_mb,
                container_mb = ?container_mb,
                "Inflation complete"
            ),
            InflationEvent::Failed {
                run_id,
                allocated_mb,
                reason,
            } => error!(%run_id, allocated_mb, reason = %reason, "Inflation failed"),
            InflationEvent::Cancelled {
                run_id,
                completed_mb,
                target_mb,
            } => warn!(%run_id, completed_mb, target_mb, "Inflation cancelled by reset"),
            InflationEvent::ResetComplete {
                released_mb,
                released_blocks,
            } => info!(released_mb, released_blocks, "Reset complete"),
        }
    }
}

/// Forwards events to a channel for collaborators that stream them
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    tx: flume::Sender<InflationEvent>,
}

impl ChannelEventSink {
    /// Unbounded sink and its receiving end
    pub fn unbounded() -> (Self, flume::Receiver<InflationEvent>) {
        let (tx, rx) = flume::unbounded();
        (Self { tx }, rx)
    }

    /// Bounded sink; events are dropped while the channel is full
    pub fn bounded(capacity: usize) -> (Self, flume::Receiver<InflationEvent>) {
        let (tx, rx) = flume::bounded(capacity);
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: &InflationEvent) {
        if let Err(e) = self.tx.try_send(event.clone()) {
            debug!(error = %e, "event dropped");
        }
    }
}

/// Fans one event out to several sinks
#[derive(Default)]
pub struct FanoutEventSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl FanoutEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl EventSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl EventSink for FanoutEventSink {
    fn emit(&self, event: &InflationEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}
