/*!
 * API Types
 * Response payloads for the collaborator-facing contract
 */

use crate::core::types::Megabytes;
use crate::memory::types::InflationStatus;
use serde::{Deserialize, Serialize};

/// Reply to a status query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub allocated_mb: Megabytes,
    pub block_count: usize,
}

impl From<InflationStatus> for StatusResponse {
    fn from(status: InflationStatus) -> Self {
        Self {
            allocated_mb: status.allocated_mb,
            block_count: status.block_count,
        }
    }
}

/// Reply to a reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetResponse {
    pub allocated_mb: Megabytes,
}

impl From<InflationStatus> for ResetResponse {
    fn from(status: InflationStatus) -> Self {
        Self {
            allocated_mb: status.allocated_mb,
        }
    }
}
