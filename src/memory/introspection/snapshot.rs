/*!
 * Snapshot Introspection
 *
 * Walks a system-wide process snapshot (pid, parent, working set). This is
 * the strategy used on Windows, where there is no process filesystem and no
 * container accounting to probe.
 */

use super::fallback;
use super::process_tree::ProcessTree;
use crate::core::errors::{IntrospectionError, IntrospectionResult};
use crate::core::types::Pid;
use crate::memory::traits::MemoryIntrospector;
use crate::memory::types::{IntrospectionPlatform, MemoryReport};
use sysinfo::System;
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
pub struct SnapshotIntrospector;

impl SnapshotIntrospector {
    pub fn new() -> Self {
        Self
    }

    /// Capture every running process into a tree.
    ///
    /// Processes that exit while the snapshot is taken are simply absent.
    pub fn scan(&self) -> IntrospectionResult<ProcessTree> {
        let mut system = System::new();
        system.refresh_processes();

        let processes = system.processes();
        if processes.is_empty() {
            return Err(IntrospectionError::Snapshot("no processes enumerated".into()));
        }

        let mut tree = ProcessTree::with_capacity(processes.len());
        for (pid, process) in processes {
            let pid = pid.as_u32();
            let parent = process.parent().map(|p| p.as_u32()).unwrap_or(pid);
            tree.insert(pid, parent, process.memory());
        }
        Ok(tree)
    }

    fn try_report(&self, pid: Pid) -> IntrospectionResult<MemoryReport> {
        let tree = self.scan()?;
        let own = tree
            .rss(pid)
            .ok_or(IntrospectionError::ProcessNotFound(pid))?;

        Ok(MemoryReport::new(own, tree.subtree_bytes(pid), None))
    }
}

impl MemoryIntrospector for SnapshotIntrospector {
    fn memory_report(&self, pid: Pid) -> MemoryReport {
        self.try_report(pid).unwrap_or_else(|e| {
            debug!(pid, error = %e, "process snapshot failed, using own-process report");
            fallback::own_process_report()
        })
    }

    fn platform(&self) -> IntrospectionPlatform {
        IntrospectionPlatform::Snapshot
    }
}
