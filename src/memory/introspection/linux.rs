/*!
 * Linux Introspection
 *
 * Scans the process pseudo-filesystem to build a process tree, then probes
 * cgroup accounting for the container total. The roots are configurable so
 * the scanner can run against a synthetic tree.
 */

use super::cgroup::CgroupProbe;
use super::fallback;
use super::process_tree::ProcessTree;
use crate::core::errors::{IntrospectionError, IntrospectionResult};
use crate::core::limits::{
    FALLBACK_PAGE_SIZE, PROC_ROOT, STAT_PPID_FIELD_INDEX, STAT_RSS_FIELD_INDEX,
};
use crate::core::types::{Pid, Size};
use crate::memory::traits::MemoryIntrospector;
use crate::memory::types::{IntrospectionPlatform, MemoryReport};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Fields of interest from `/proc/<pid>/status`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatusRecord {
    pub ppid: Option<Pid>,
    pub rss_bytes: Option<Size>,
}

/// Fields of interest from `/proc/<pid>/stat`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatRecord {
    pub ppid: Pid,
    pub rss_pages: Size,
}

#[derive(Debug, Clone)]
pub struct LinuxIntrospector {
    proc_root: PathBuf,
    cgroup: CgroupProbe,
    page_size: Size,
}

impl Default for LinuxIntrospector {
    fn default() -> Self {
        Self::new(PROC_ROOT, CgroupProbe::default())
    }
}

impl LinuxIntrospector {
    pub fn new(proc_root: impl Into<PathBuf>, cgroup: CgroupProbe) -> Self {
        Self {
            proc_root: proc_root.into(),
            cgroup,
            page_size: system_page_size(),
        }
    }

    pub fn with_page_size(mut self, page_size: Size) -> Self {
        self.page_size = page_size;
        self
    }

    /// Whether the process filesystem is mounted where expected
    pub fn is_supported(&self) -> bool {
        self.proc_root.join("self").join("status").exists()
            || self.proc_root.join("1").join("status").exists()
    }

    /// Build the process tree from a fresh scan.
    ///
    /// Processes that exit or deny access mid-scan are skipped.
    pub fn scan(&self) -> IntrospectionResult<ProcessTree> {
        let entries = std::fs::read_dir(&self.proc_root)
            .map_err(|e| IntrospectionError::io(&self.proc_root, e))?;

        let mut tree = ProcessTree::with_capacity(256);
        for entry in entries.flatten() {
            let Some(pid) = entry.file_name().to_str().and_then(|n| n.parse::<Pid>().ok()) else {
                continue;
            };

            match self.read_process(pid) {
                Ok((ppid, rss)) => tree.insert(pid, ppid, rss),
                Err(e) => trace!(pid, error = %e, "skipping process"),
            }
        }

        Ok(tree)
    }

    /// Parent pid and resident bytes for one process
    fn read_process(&self, pid: Pid) -> IntrospectionResult<(Pid, Size)> {
        let dir = self.proc_root.join(pid.to_string());
        let status_path = dir.join("status");
        let status = read_file(&status_path).map(|s| parse_status(&s))?;

        let rss = match status.rss_bytes {
            Some(bytes) if bytes > 0 => Some(bytes),
            _ => None,
        };

        if let (Some(ppid), Some(rss)) = (status.ppid, rss) {
            return Ok((ppid, rss));
        }

        // VmRSS is missing or zero for kernel threads and exiting processes
        let stat_path = dir.join("stat");
        let stat = read_file(&stat_path).and_then(|s| {
            parse_stat(&s).ok_or_else(|| IntrospectionError::parse(&stat_path, "malformed stat record"))
        });

        match stat {
            Ok(stat) => Ok((
                status.ppid.unwrap_or(stat.ppid),
                rss.unwrap_or_else(|| stat.rss_pages.saturating_mul(self.page_size)),
            )),
            Err(e) => match status.ppid {
                Some(ppid) => Ok((ppid, rss.unwrap_or(0))),
                None => Err(e),
            },
        }
    }

    fn try_report(&self, pid: Pid) -> IntrospectionResult<MemoryReport> {
        let tree = self.scan()?;
        let own = tree
            .rss(pid)
            .ok_or(IntrospectionError::ProcessNotFound(pid))?;
        let subtree = tree.subtree_bytes(pid);

        Ok(MemoryReport::new(own, subtree, self.cgroup.container_bytes()))
    }
}

impl MemoryIntrospector for LinuxIntrospector {
    fn memory_report(&self, pid: Pid) -> MemoryReport {
        self.try_report(pid).unwrap_or_else(|e| {
            debug!(pid, error = %e, "procfs introspection failed, using own-process report");
            fallback::own_process_report()
        })
    }

    fn platform(&self) -> IntrospectionPlatform {
        IntrospectionPlatform::Linux
    }
}

fn read_file(path: &Path) -> IntrospectionResult<String> {
    std::fs::read_to_string(path).map_err(|e| IntrospectionError::io(path, e))
}

/// Parse `PPid:` and `VmRSS:` (kB) out of a status record
pub fn parse_status(contents: &str) -> StatusRecord {
    let mut record = StatusRecord::default();
    for line in contents.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key {
            "PPid" => record.ppid = value.trim().parse().ok(),
            "VmRSS" => {
                record.rss_bytes = value
                    .split_whitespace()
                    .next()
                    .and_then(|kb| kb.parse::<Size>().ok())
                    .map(|kb| kb.saturating_mul(1024));
            }
            _ => {}
        }
    }
    record
}

/// Parse parent pid and resident pages out of a stat record.
///
/// The command name may contain spaces and parentheses, so fields are
/// counted from the last `)`.
pub fn parse_stat(contents: &str) -> Option<StatRecord> {
    let (_, rest) = contents.rsplit_once(')')?;
    let fields: Vec<&str> = rest.split_whitespace().collect();

    Some(StatRecord {
        ppid: fields.get(STAT_PPID_FIELD_INDEX)?.parse().ok()?,
        rss_pages: fields.get(STAT_RSS_FIELD_INDEX)?.parse().ok()?,
    })
}

#[cfg(unix)]
fn system_page_size() -> Size {
    use nix::unistd::{sysconf, SysconfVar};

    match sysconf(SysconfVar::PAGE_SIZE) {
        Ok(Some(size)) if size > 0 => size as Size,
        _ => FALLBACK_PAGE_SIZE,
    }
}

#[cfg(not(unix))]
fn system_page_size() -> Size {
    FALLBACK_PAGE_SIZE
}
