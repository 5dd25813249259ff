//! Host process memory snapshot.
//!
//! Reported next to cache stats for operators. This is process-wide
//! resident memory, not the size of the cache.

use serde::Serialize;

// == Process Memory ==
/// Memory figures for the current process, in bytes.
///
/// Fields are `None` on platforms where they cannot be read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessMemory {
    /// Resident set size
    pub rss: Option<u64>,
    /// Peak resident set size
    pub rss_peak: Option<u64>,
    /// Virtual memory size
    pub virtual_size: Option<u64>,
}

impl ProcessMemory {
    // == Snapshot ==
    /// Takes a snapshot of the current process.
    pub fn snapshot() -> Self {
        #[cfg(target_os = "linux")]
        {
            match std::fs::read_to_string("/proc/self/status") {
                Ok(status) => Self::parse_proc_status(&status),
                Err(err) => {
                    tracing::debug!("Failed to read /proc/self/status: {}", err);
                    Self::default()
                }
            }
        }

        #[cfg(not(target_os = "linux"))]
        {
            Self::default()
        }
    }

    // == Parse ==
    /// Parses the `VmRSS`, `VmHWM` and `VmSize` lines of a
    /// `/proc/<pid>/status` file. Values there are in kB.
    ///
    /// # Arguments
    /// * `status` - Full text of the status file; unknown lines are ignored
    pub fn parse_proc_status(status: &str) -> Self {
        let mut memory = Self::default();

        for line in status.lines() {
            let Some((name, rest)) = line.split_once(':') else {
                continue;
            };
            let bytes = rest
                .split_whitespace()
                .next()
                .and_then(|kb| kb.parse::<u64>().ok())
                .map(|kb| kb * 1024);

            match name {
                "VmRSS" => memory.rss = bytes,
                "VmHWM" => memory.rss_peak = bytes,
                "VmSize" => memory.virtual_size = bytes,
                _ => {}
            }
        }

        memory
    }
}
