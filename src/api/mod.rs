/*!
 * API Module
 * Entry points for the HTTP/CLI collaborators
 */

pub mod service;
pub mod types;

// Re-export for convenience
pub use service::InflationService;
pub use types::*;
