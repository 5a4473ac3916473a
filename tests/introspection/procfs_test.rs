/*!
 * procfs Introspection Tests
 * Process tree scanning against a synthetic /proc
 */

use crate::fake_proc::FakeHost;
use mem_inflator::memory::introspection::{CgroupProbe, LinuxIntrospector};
use mem_inflator::{MemoryIntrospector, MemoryReport};
use pretty_assertions::assert_eq;

const KB: u64 = 1024;
const PAGE: u64 = 4096;

//  1 ─┬─ 100 ─┬─ 101
//     │       └─ 102 (no VmRSS) ── 103
//     └─ 200
fn populated_host() -> FakeHost {
    let host = FakeHost::new();
    host.process(1, 0, 1000)
        .process(100, 1, 2000)
        .process(101, 100, 300)
        .process_without_vmrss(102, 100, 5)
        .process(103, 102, 50)
        .process(200, 1, 700)
        .vanished(300)
        .noise()
        .cgroup_file("memory.stat", "anon 1000\nfile 2000\n");
    host
}

fn introspector(host: &FakeHost) -> LinuxIntrospector {
    LinuxIntrospector::new(host.proc_root(), CgroupProbe::new(host.cgroup_root()))
        .with_page_size(PAGE)
}

#[test]
fn test_scan_skips_vanished_and_non_process_entries() {
    let host = populated_host();
    let tree = introspector(&host).scan().expect("scan failed");

    assert_eq!(tree.len(), 6);
    assert!(!tree.contains(300));

    let mut kids = tree.children(100).to_vec();
    kids.sort_unstable();
    assert_eq!(kids, vec![101, 102]);
}

#[test]
fn test_stat_fallback_when_vmrss_missing() {
    let host = populated_host();
    let tree = introspector(&host).scan().unwrap();
    assert_eq!(tree.rss(102), Some(5 * PAGE));
    assert_eq!(tree.children(102), &[103]);
}

#[test]
fn test_stat_fallback_when_vmrss_is_zero() {
    let host = FakeHost::new();
    host.process(400, 1, 0).stat(400, 1, 9).process(401, 400, 10);

    let introspector = introspector(&host);
    let tree = introspector.scan().unwrap();
    assert_eq!(tree.rss(400), Some(9 * PAGE));

    let report = introspector.memory_report(400);
    assert_eq!(report.own_bytes, 9 * PAGE);
    assert_eq!(report.subtree_bytes, 9 * PAGE + 10 * KB);
}

#[test]
fn test_zero_vmrss_without_stat_counts_as_zero() {
    let host = FakeHost::new();
    host.process(500, 1, 0).process(501, 500, 4);

    let tree = introspector(&host).scan().unwrap();
    assert_eq!(tree.rss(500), Some(0));
    assert_eq!(tree.subtree_bytes(500), 4 * KB);
}

#[test]
fn test_report_sums_subtree() {
    let host = populated_host();
    let report = introspector(&host).memory_report(100);

    assert_eq!(
        report,
        MemoryReport {
            own_bytes: 2000 * KB,
            subtree_bytes: (2000 + 300 + 50) * KB + 5 * PAGE,
            container_bytes: Some(1000),
        }
    );
}

#[test]
fn test_childless_process_subtree_equals_own() {
    let host = populated_host();
    let report = introspector(&host).memory_report(200);
    assert_eq!(report.own_bytes, 700 * KB);
    assert_eq!(report.subtree_bytes, report.own_bytes);
}

#[test]
fn test_root_covers_every_process() {
    let host = populated_host();
    let report = introspector(&host).memory_report(1);
    assert_eq!(
        report.subtree_bytes,
        (1000 + 2000 + 300 + 50 + 700) * KB + 5 * PAGE
    );
}

#[test]
fn test_cyclic_parent_links_terminate() {
    let host = FakeHost::new();
    host.process(10, 11, 1).process(11, 10, 2);

    let report = introspector(&host).memory_report(10);
    assert_eq!(report.own_bytes, KB);
    assert_eq!(report.subtree_bytes, 3 * KB);
    assert_eq!(report.container_bytes, None);
}

#[test]
fn test_unknown_pid_degrades_to_own_process() {
    let host = populated_host();
    let report = introspector(&host).memory_report(4242);

    assert_eq!(report.own_bytes, report.subtree_bytes);
    assert_eq!(report.container_bytes, None);
}

#[test]
fn test_missing_proc_root_degrades_to_own_process() {
    let host = FakeHost::new();
    let introspector = LinuxIntrospector::new(
        host.proc_root().join("does-not-exist"),
        CgroupProbe::new(host.cgroup_root()),
    );

    assert!(!introspector.is_supported());
    assert!(introspector.scan().is_err());

    let report = introspector.memory_report(1);
    assert_eq!(report.own_bytes, report.subtree_bytes);
    assert_eq!(report.container_bytes, None);
}
