/*!
 * Limits and Constants
 *
 * Centralized location for sizes, intervals and host paths.
 * Organized by domain for discoverability.
 */

use std::time::Duration;

// =============================================================================
// ALLOCATION
// =============================================================================

/// One megabyte (engine accounting unit)
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Stride used when touching freshly allocated blocks.
/// One write per page forces the kernel to back the page physically.
pub const TOUCH_PAGE_SIZE: usize = 4096;

/// Byte written at the start of every touched page
pub const TOUCH_PATTERN: u8 = 0xA5;

/// Default step size when the caller does not provide one
pub const DEFAULT_STEP_MB: u64 = 10;

/// Pause between inflation steps so monitors can observe intermediate states
pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_secs(2);

/// How often the binary logs engine status
pub const DEFAULT_STATUS_INTERVAL: Duration = Duration::from_secs(5);

// =============================================================================
// INTROSPECTION
// =============================================================================

/// Process pseudo-filesystem root (Linux)
pub const PROC_ROOT: &str = "/proc";

/// cgroup filesystem root (Linux)
pub const CGROUP_ROOT: &str = "/sys/fs/cgroup";

/// Container usage candidates, relative to [`CGROUP_ROOT`], probed in order:
/// cgroup v2 unified usage, cgroup v1 usage (two legacy layouts), cgroup v2 stat
pub const CGROUP_MEMORY_CANDIDATES: [&str; 4] = [
    "memory.current",
    "memory/memory.usage_in_bytes",
    "memory.usage_in_bytes",
    "memory.stat",
];

/// Substrings that select a value out of a key/value cgroup stat table
pub const CGROUP_STAT_KEYS: [&str; 3] = ["anon", "rss", "file"];

/// Page size assumed when the host refuses to report one
pub const FALLBACK_PAGE_SIZE: u64 = 4096;

/// `stat` field holding resident pages, counted from `state` (field 3) as index 0
pub const STAT_RSS_FIELD_INDEX: usize = 21;

/// `stat` field holding the parent pid, counted the same way
pub const STAT_PPID_FIELD_INDEX: usize = 1;
