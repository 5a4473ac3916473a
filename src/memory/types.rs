/*!
 * Memory Types
 * Reports and status snapshots shared by the engine and introspection
 */

use crate::core::types::{bytes_to_mb, Megabytes, Size};
use serde::{Deserialize, Serialize};

/// Memory footprint of a process, its descendants and its container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryReport {
    /// Resident bytes of the queried process
    pub own_bytes: Size,
    /// Resident bytes of the process and all of its descendants
    pub subtree_bytes: Size,
    /// cgroup usage, absent when the host has no container accounting
    pub container_bytes: Option<Size>,
}

impl MemoryReport {
    pub fn new(own_bytes: Size, subtree_bytes: Size, container_bytes: Option<Size>) -> Self {
        Self {
            own_bytes,
            subtree_bytes,
            container_bytes,
        }
    }

    /// Report covering a single process with no container data
    pub fn own_only(own_bytes: Size) -> Self {
        Self::new(own_bytes, own_bytes, None)
    }

    pub fn own_mb(&self) -> Megabytes {
        bytes_to_mb(self.own_bytes)
    }

    pub fn subtree_mb(&self) -> Megabytes {
        bytes_to_mb(self.subtree_bytes)
    }

    pub fn container_mb(&self) -> Option<Megabytes> {
        self.container_bytes.map(bytes_to_mb)
    }
}

/// Consistent view of the engine's allocation state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InflationStatus {
    pub allocated_mb: Megabytes,
    pub block_count: usize,
}

/// Which introspection strategy is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntrospectionPlatform {
    /// `/proc` scan plus cgroup probing
    Linux,
    /// System process snapshot
    Snapshot,
    /// Own-process working set only
    Fallback,
}

impl std::fmt::Display for IntrospectionPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            IntrospectionPlatform::Linux => write!(f, "linux-procfs"),
            IntrospectionPlatform::Snapshot => write!(f, "process-snapshot"),
            IntrospectionPlatform::Fallback => write!(f, "own-process"),
        }
    }
}
