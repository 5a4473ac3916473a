/*!
 * Synthetic /proc and cgroup trees for introspection tests
 */

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct FakeHost {
    dir: TempDir,
}

impl FakeHost {
    pub fn new() -> Self {
        let host = Self {
            dir: TempDir::new().expect("tempdir"),
        };
        fs::create_dir_all(host.proc_root()).unwrap();
        fs::create_dir_all(host.cgroup_root()).unwrap();
        host
    }

    pub fn proc_root(&self) -> PathBuf {
        self.dir.path().join("proc")
    }

    pub fn cgroup_root(&self) -> PathBuf {
        self.dir.path().join("cgroup")
    }

    fn pid_dir(&self, pid: u32) -> PathBuf {
        let dir = self.proc_root().join(pid.to_string());
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Process with a status record reporting `rss_kb`
    pub fn process(&self, pid: u32, ppid: u32, rss_kb: u64) -> &Self {
        let status = format!(
            "Name:\tproc{pid}\nState:\tS (sleeping)\nPid:\t{pid}\nPPid:\t{ppid}\nVmRSS:\t{rss_kb:>8} kB\n"
        );
        fs::write(self.pid_dir(pid).join("status"), status).unwrap();
        self
    }

    /// Process whose status lacks VmRSS; resident pages come from stat
    pub fn process_without_vmrss(&self, pid: u32, ppid: u32, rss_pages: u64) -> &Self {
        let dir = self.pid_dir(pid);
        fs::write(
            dir.join("status"),
            format!("Name:\tzombie\nState:\tZ (zombie)\nPid:\t{pid}\nPPid:\t{ppid}\n"),
        )
        .unwrap();
        fs::write(
            dir.join("stat"),
            format!(
                "{pid} (odd (name)) Z {ppid} 0 0 0 -1 0 0 0 0 0 0 0 0 0 20 0 1 0 100 0 {rss_pages} 0"
            ),
        )
        .unwrap();
        self
    }

    /// Add a stat record next to an existing status record
    pub fn stat(&self, pid: u32, ppid: u32, rss_pages: u64) -> &Self {
        fs::write(
            self.pid_dir(pid).join("stat"),
            format!("{pid} (proc{pid}) S {ppid} 0 0 0 -1 0 0 0 0 0 0 0 0 0 20 0 1 0 100 0 {rss_pages} 0"),
        )
        .unwrap();
        self
    }

    /// Directory that vanished before its records could be read
    pub fn vanished(&self, pid: u32) -> &Self {
        self.pid_dir(pid);
        self
    }

    /// Non-process entries present in every real /proc
    pub fn noise(&self) -> &Self {
        fs::write(self.proc_root().join("meminfo"), "MemTotal: 1 kB\n").unwrap();
        fs::create_dir_all(self.proc_root().join("sys")).unwrap();
        self
    }

    pub fn cgroup_file(&self, relative: &str, contents: &str) -> &Self {
        let path = self.cgroup_root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
        self
    }
}
