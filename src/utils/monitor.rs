use std::time::{Duration, Instant};

#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use sysinfo::{Pid, RefreshKind, System};

#[derive(Debug, Clone)]
pub struct RunStats {
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
    pub elapsed_time: Duration,
}

/// Samples CPU and memory of this process between batch phases.
#[cfg(feature = "cli")]
pub struct RunMonitor {
    system: Mutex<System>,
    pid: Option<Pid>,
    start_time: Instant,
    peak_memory_mb: Mutex<u64>,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl RunMonitor {
    pub fn new(enabled: bool) -> Self {
        let system = if enabled {
            System::new_with_specifics(RefreshKind::everything())
        } else {
            System::new()
        };
        let pid = sysinfo::get_current_pid().ok();
        if enabled && pid.is_none() {
            tracing::warn!("Cannot determine current process id, resource stats disabled");
        }

        Self {
            system: Mutex::new(system),
            pid,
            start_time: Instant::now(),
            peak_memory_mb: Mutex::new(0),
            enabled,
        }
    }

    pub fn sample(&self) -> Option<RunStats> {
        if !self.enabled {
            return None;
        }
        let pid = self.pid?;

        let mut system = self.system.lock().ok()?;
        system.refresh_all();
        let process = system.process(pid)?;
        let memory_mb = process.memory() / 1024 / 1024;

        let mut peak = self.peak_memory_mb.lock().ok()?;
        *peak = (*peak).max(memory_mb);

        Some(RunStats {
            cpu_usage: process.cpu_usage(),
            memory_usage_mb: memory_mb,
            peak_memory_mb: *peak,
            elapsed_time: self.start_time.elapsed(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

// 非 CLI 建置時不取樣
#[cfg(not(feature = "cli"))]
pub struct RunMonitor {
    start_time: Instant,
    enabled: bool,
}

#[cfg(not(feature = "cli"))]
impl RunMonitor {
    pub fn new(enabled: bool) -> Self {
        Self {
            start_time: Instant::now(),
            enabled,
        }
    }

    pub fn sample(&self) -> Option<RunStats> {
        None
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl RunMonitor {
    pub fn log_stats(&self, phase: &str) {
        if let Some(stats) = self.sample() {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Time: {:?}",
                phase,
                stats.cpu_usage,
                stats.memory_usage_mb,
                stats.peak_memory_mb,
                stats.elapsed_time
            );
        }
    }

    pub fn log_final_stats(&self, documents: usize) {
        if !self.is_enabled() {
            return;
        }
        let elapsed = self.start_time.elapsed();
        let rate = if elapsed.as_secs_f64() > 0.0 {
            documents as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };
        let peak = self.sample().map(|stats| stats.peak_memory_mb).unwrap_or(0);
        tracing::info!(
            "📊 Final Stats - {} documents in {:?} ({:.1}/s), Peak Memory: {}MB",
            documents,
            elapsed,
            rate,
            peak
        );
    }
}

impl Default for RunMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
