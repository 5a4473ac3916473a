/*!
 * Core Types
 * Common types used across the inflator
 */

use super::limits::BYTES_PER_MB;

/// Process ID type
pub type Pid = u32;

/// Size type for byte counts
pub type Size = u64;

/// Size in megabytes (engine accounting unit)
pub type Megabytes = u64;

/// Convert a byte count to whole megabytes, rounding down
#[inline]
pub const fn bytes_to_mb(bytes: Size) -> Megabytes {
    bytes / BYTES_PER_MB
}

/// Convert megabytes to bytes, `None` on overflow
#[inline]
pub const fn mb_to_bytes(mb: Megabytes) -> Option<Size> {
    mb.checked_mul(BYTES_PER_MB)
}

/// Pid of the running process
#[inline]
pub fn current_pid() -> Pid {
    std::process::id()
}
