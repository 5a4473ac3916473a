/*!
 * Fallback Introspection
 * Own-process working set, for hosts without a richer mechanism
 */

use crate::core::types::{Pid, Size};
use crate::memory::traits::MemoryIntrospector;
use crate::memory::types::{IntrospectionPlatform, MemoryReport};
use sysinfo::System;
use tracing::trace;

/// Reports only the calling process, whatever pid is asked for
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackIntrospector;

impl FallbackIntrospector {
    pub fn new() -> Self {
        Self
    }
}

impl MemoryIntrospector for FallbackIntrospector {
    fn memory_report(&self, _pid: Pid) -> MemoryReport {
        own_process_report()
    }

    fn platform(&self) -> IntrospectionPlatform {
        IntrospectionPlatform::Fallback
    }
}

/// Degraded report used whenever a platform strategy fails
pub fn own_process_report() -> MemoryReport {
    MemoryReport::own_only(own_working_set())
}

/// Working set of the calling process, zero when even that is unavailable
pub fn own_working_set() -> Size {
    let pid = match sysinfo::get_current_pid() {
        Ok(pid) => pid,
        Err(e) => {
            trace!(error = e, "current pid unavailable");
            return 0;
        }
    };

    let mut system = System::new();
    if !system.refresh_process(pid) {
        trace!("own process refresh failed");
        return 0;
    }
    system.process(pid).map(|p| p.memory()).unwrap_or(0)
}
