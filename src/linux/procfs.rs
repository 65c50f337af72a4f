//! CPU and memory usage read from `/proc`.
//!
//! Both values are reported as whole percentages.  Anything unreadable or
//! unparseable reads as `0`.

use std::path::{Path, PathBuf};

/// Samples `/proc/stat` and reports usage since the previous sample.
#[derive(Debug)]
pub struct CpuSampler {
    path: PathBuf,
    prev_total: u64,
    prev_idle: u64,
}

impl Default for CpuSampler {
    fn default() -> Self {
        Self::new("/proc/stat")
    }
}

impl CpuSampler {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            prev_total: 0,
            prev_idle: 0,
        }
    }

    /// Read the stat file and return usage since the last call.
    pub fn sample(&mut self) -> u8 {
        match std::fs::read_to_string(&self.path) {
            Ok(stat) => self.update(&stat),
            Err(_) => 0,
        }
    }

    /// Feed one `/proc/stat` snapshot.
    ///
    /// The first snapshot is measured against all-zero counters, i.e. it
    /// reports the average since boot.
    pub fn update(&mut self, stat: &str) -> u8 {
        let Some((total, idle)) = parse_cpu_line(stat) else {
            return 0;
        };
        let total_d = total as i128 - self.prev_total as i128;
        let idle_d = idle as i128 - self.prev_idle as i128;
        self.prev_total = total;
        self.prev_idle = idle;

        if total_d <= 0 {
            return 0;
        }
        let usage = (1.0 - idle_d as f64 / total_d as f64).clamp(0.0, 1.0);
        (usage * 100.0).round() as u8
    }
}

/// Parse the aggregate `cpu` line into `(total, idle + iowait)` jiffies.
fn parse_cpu_line(stat: &str) -> Option<(u64, u64)> {
    let line = stat.lines().next()?.trim();
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map(|f| f.parse().unwrap_or(0))
        .collect();
    if fields.len() < 4 {
        return None;
    }
    let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
    let total = fields.iter().sum();
    Some((total, idle))
}

/// Memory in use, from the contents of `/proc/meminfo`.
pub fn ram_usage(meminfo: &str) -> u8 {
    let total = meminfo_field(meminfo, "MemTotal:").unwrap_or(0);
    let avail = meminfo_field(meminfo, "MemAvailable:").unwrap_or(0);
    if total == 0 {
        return 0;
    }
    let usage = (1.0 - avail as f64 / total as f64).clamp(0.0, 1.0);
    (usage * 100.0).round() as u8
}

/// Read `path` (normally `/proc/meminfo`) and report memory in use.
pub fn sample_ram(path: impl AsRef<Path>) -> u8 {
    std::fs::read_to_string(path)
        .map(|s| ram_usage(&s))
        .unwrap_or(0)
}

fn meminfo_field(meminfo: &str, key: &str) -> Option<u64> {
    meminfo
        .lines()
        .find_map(|l| l.trim().strip_prefix(key))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|n| n.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_usage_between_samples() {
        let mut s = CpuSampler::new("/nonexistent");
        // user nice system idle iowait
        s.update("cpu  100 0 100 700 100\ncpu0 1 2 3 4\n");
        // +100 busy, +100 idle -> 50%
        assert_eq!(s.update("cpu  150 0 150 750 150\n"), 50);
        // no progress at all
        assert_eq!(s.update("cpu  150 0 150 750 150\n"), 0);
    }

    #[test]
    fn first_cpu_sample_is_since_boot() {
        let mut s = CpuSampler::new("/nonexistent");
        assert_eq!(s.update("cpu  25 0 25 50 0\n"), 50);
    }

    #[test]
    fn malformed_cpu_line() {
        let mut s = CpuSampler::new("/nonexistent");
        assert_eq!(s.update("cpu 1 2\n"), 0);
        assert_eq!(s.update(""), 0);
        assert_eq!(s.sample(), 0);
    }

    #[test]
    fn ram_usage_from_meminfo() {
        let info = "MemTotal:       16000000 kB\nMemFree:  1000 kB\nMemAvailable:    4000000 kB\n";
        assert_eq!(ram_usage(info), 75);
    }

    #[test]
    fn ram_usage_without_total() {
        assert_eq!(ram_usage("MemAvailable: 10 kB\n"), 0);
        assert_eq!(sample_ram("/nonexistent/meminfo"), 0);
    }

    #[test]
    fn ram_usage_without_available_is_full() {
        assert_eq!(ram_usage("MemTotal: 100 kB\n"), 100);
    }
}
