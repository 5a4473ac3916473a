/*!
 * Memory Traits
 * Introspection abstraction injected into the inflation engine
 */

use super::types::{IntrospectionPlatform, MemoryReport};
use crate::core::types::Pid;

/// Reports real memory consumption for a process.
///
/// Implementations are best-effort: every failure is absorbed into a
/// degraded report, so there is no error path for callers to mishandle.
#[cfg_attr(test, mockall::automock)]
pub trait MemoryIntrospector: Send + Sync {
    /// Own, subtree and container memory for `pid`
    fn memory_report(&self, pid: Pid) -> MemoryReport;

    /// Strategy backing this introspector
    fn platform(&self) -> IntrospectionPlatform;
}

impl<T: MemoryIntrospector + ?Sized> MemoryIntrospector for std::sync::Arc<T> {
    fn memory_report(&self, pid: Pid) -> MemoryReport {
        (**self).memory_report(pid)
    }

    fn platform(&self) -> IntrospectionPlatform {
        (**self).platform()
    }
}
