/*!
 * Container Memory Probe
 *
 * Reads cgroup accounting files to find the memory charged to the
 * container. Candidates are tried in order; the first one that yields a
 * number wins. Hosts without cgroups simply report nothing.
 */

use crate::core::limits::{CGROUP_MEMORY_CANDIDATES, CGROUP_ROOT, CGROUP_STAT_KEYS};
use crate::core::types::Size;
use std::path::PathBuf;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct CgroupProbe {
    root: PathBuf,
}

impl Default for CgroupProbe {
    fn default() -> Self {
        Self::new(CGROUP_ROOT)
    }
}

impl CgroupProbe {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Candidate files in probe order
    pub fn candidates(&self) -> impl Iterator<Item = PathBuf> + '_ {
        CGROUP_MEMORY_CANDIDATES
            .iter()
            .map(move |relative| self.root.join(relative))
    }

    /// Container memory in bytes, `None` when no candidate is usable
    pub fn container_bytes(&self) -> Option<Size> {
        for path in self.candidates() {
            let contents = match std::fs::read_to_string(&path) {
                Ok(contents) => contents,
                Err(e) => {
                    trace!(path = %path.display(), error = %e, "cgroup candidate unreadable");
                    continue;
                }
            };

            if let Some(bytes) = parse_cgroup_memory(&contents) {
                trace!(path = %path.display(), bytes, "cgroup memory usage");
                return Some(bytes);
            }
        }
        None
    }
}

/// Interpret the contents of a cgroup memory file.
///
/// A usage file holds a single integer. A stat file is a key/value table;
/// the value of the first key naming anon, rss or file memory is used.
pub fn parse_cgroup_memory(contents: &str) -> Option<Size> {
    leading_integer(contents).or_else(|| first_stat_value(contents))
}

fn leading_integer(contents: &str) -> Option<Size> {
    contents.split_whitespace().next()?.parse().ok()
}

fn first_stat_value(contents: &str) -> Option<Size> {
    contents.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        let key = fields.next()?;
        if !CGROUP_STAT_KEYS.iter().any(|needle| key.contains(needle)) {
            return None;
        }
        fields.next()?.parse().ok()
    })
}
