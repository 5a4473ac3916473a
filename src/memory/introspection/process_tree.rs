/*!
 * Process Tree
 *
 * Throwaway adjacency graph built from one scan of the host's process table.
 * Parent links come straight from the OS, so they may be stale, duplicated or
 * even cyclic by the time they are read; traversal guards against all three.
 */

use crate::core::types::{Pid, Size};
use ahash::{AHashMap, AHashSet};

#[derive(Debug, Default)]
pub struct ProcessTree {
    children: AHashMap<Pid, Vec<Pid>>,
    rss: AHashMap<Pid, Size>,
}

impl ProcessTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            children: AHashMap::with_capacity(capacity),
            rss: AHashMap::with_capacity(capacity),
        }
    }

    /// Record a process. A repeated pid overwrites the earlier RSS value.
    pub fn insert(&mut self, pid: Pid, parent: Pid, rss_bytes: Size) {
        self.rss.insert(pid, rss_bytes);
        if parent != pid {
            self.children.entry(parent).or_default().push(pid);
        }
    }

    pub fn len(&self) -> usize {
        self.rss.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rss.is_empty()
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.rss.contains_key(&pid)
    }

    /// Resident bytes of a single process
    pub fn rss(&self, pid: Pid) -> Option<Size> {
        self.rss.get(&pid).copied()
    }

    /// Direct children recorded for `pid`
    pub fn children(&self, pid: Pid) -> &[Pid] {
        self.children.get(&pid).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every process reachable from `root`, root first, each at most once
    pub fn descendants(&self, root: Pid) -> Vec<Pid> {
        let mut visited = AHashSet::with_capacity(16);
        let mut order = Vec::new();
        let mut stack = vec![root];

        while let Some(pid) = stack.pop() {
            if !visited.insert(pid) {
                continue;
            }
            order.push(pid);
            for &child in self.children(pid).iter().rev() {
                if !visited.contains(&child) {
                    stack.push(child);
                }
            }
        }

        order
    }

    /// Sum of RSS over `root` and its descendants
    pub fn subtree_bytes(&self, root: Pid) -> Size {
        self.descendants(root)
            .into_iter()
            .filter_map(|pid| self.rss(pid))
            .fold(0, Size::saturating_add)
    }
}
