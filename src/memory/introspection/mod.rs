/*!
 * Memory Introspection
 * Platform-aware discovery of process, descendant and container memory
 *
 * Strategy is chosen once, at construction:
 * - **Linux**: `/proc` scan + cgroup probing
 * - **Windows**: system process snapshot
 * - **Anything else** (or an unusable `/proc`): own-process working set
 *
 * Whatever the strategy, a report always comes back. Errors and panics
 * inside a strategy degrade to the own-process report.
 */

mod cgroup;
mod fallback;
mod linux;
mod process_tree;
mod snapshot;

pub use cgroup::{parse_cgroup_memory, CgroupProbe};
pub use fallback::{own_process_report, own_working_set, FallbackIntrospector};
pub use linux::{parse_stat, parse_status, LinuxIntrospector, StatRecord, StatusRecord};
pub use process_tree::ProcessTree;
pub use snapshot::SnapshotIntrospector;

use super::traits::MemoryIntrospector;
use super::types::{IntrospectionPlatform, MemoryReport};
use crate::core::types::Pid;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{info, warn};

/// Introspector for the current host
#[derive(Debug, Clone)]
pub struct HostIntrospector {
    strategy: Strategy,
}

#[derive(Debug, Clone)]
enum Strategy {
    Linux(LinuxIntrospector),
    Snapshot(SnapshotIntrospector),
    Fallback(FallbackIntrospector),
}

impl HostIntrospector {
    /// Detect the best strategy for this host
    pub fn detect() -> Self {
        let strategy = Self::select_strategy();
        let introspector = Self { strategy };
        info!(
            platform = %introspector.platform(),
            "Memory introspection initialized"
        );
        introspector
    }

    fn select_strategy() -> Strategy {
        #[cfg(target_os = "linux")]
        {
            let linux = LinuxIntrospector::default();
            if linux.is_supported() {
                return Strategy::Linux(linux);
            }
        }

        #[cfg(windows)]
        {
            Strategy::Snapshot(SnapshotIntrospector::new())
        }

        #[cfg(not(windows))]
        {
            Strategy::Fallback(FallbackIntrospector::new())
        }
    }

    pub fn linux(introspector: LinuxIntrospector) -> Self {
        Self {
            strategy: Strategy::Linux(introspector),
        }
    }

    pub fn snapshot() -> Self {
        Self {
            strategy: Strategy::Snapshot(SnapshotIntrospector::new()),
        }
    }

    pub fn fallback() -> Self {
        Self {
            strategy: Strategy::Fallback(FallbackIntrospector::new()),
        }
    }

    fn strategy(&self) -> &dyn MemoryIntrospector {
        match &self.strategy {
            Strategy::Linux(s) => s,
            Strategy::Snapshot(s) => s,
            Strategy::Fallback(s) => s,
        }
    }
}

impl Default for HostIntrospector {
    fn default() -> Self {
        Self::detect()
    }
}

impl MemoryIntrospector for HostIntrospector {
    fn memory_report(&self, pid: Pid) -> MemoryReport {
        let strategy = self.strategy();
        match catch_unwind(AssertUnwindSafe(|| strategy.memory_report(pid))) {
            Ok(report) => report,
            Err(_) => {
                warn!(
                    pid,
                    platform = %strategy.platform(),
                    "introspection panicked, using own-process report"
                );
                own_process_report()
            }
        }
    }

    fn platform(&self) -> IntrospectionPlatform {
        self.strategy().platform()
    }
}
