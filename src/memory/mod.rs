/*!
 * Memory Module
 * Memory inflation and footprint introspection
 */

pub mod inflation;
pub mod introspection;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use inflation::{InflationEngine, InflationRequest, MemoryBlock};
pub use introspection::HostIntrospector;
pub use traits::*;
pub use types::*;
