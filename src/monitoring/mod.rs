/*!
 * Monitoring
 * Progress events and structured tracing
 */

mod events;
mod tracer;

pub use events::{
    ChannelEventSink, EventSink, FanoutEventSink, InflationEvent, Severity, TracingEventSink,
};
pub use tracer::{inflation_span, init_tracing, init_tracing_with};
