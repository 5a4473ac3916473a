/*!
 * Memory Inflator Library
 * Deliberate physical memory consumption with footprint reporting
 */

pub mod api;
pub mod core;
pub mod memory;
pub mod monitoring;

// Re-exports
pub use api::{InflationService, ResetResponse, StatusResponse};
pub use crate::core::{
    ConfigError, InflationConfig, InflationError, InflationResult, Megabytes, Pid,
    ServiceConfig,
};
pub use memory::{
    HostIntrospector, InflationEngine, InflationRequest, InflationStatus, IntrospectionPlatform,
    MemoryIntrospector, MemoryReport,
};
pub use monitoring::{
    init_tracing, init_tracing_with, ChannelEventSink, EventSink, InflationEvent,
    TracingEventSink,
};
