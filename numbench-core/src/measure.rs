//! Wall-Clock Timing
//!
//! Samples are wall-clock durations taken with the monotonic clock. The timer
//! is started immediately before the measured call and stopped right after it.

use std::time::{Duration, Instant};

/// Timer for one measured call
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer
    #[inline(always)]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Stop the timer and return the elapsed duration
    #[inline(always)]
    pub fn stop(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the elapsed time in seconds
    #[inline(always)]
    pub fn stop_secs(&self) -> f64 {
        self.stop().as_secs_f64()
    }
}

/// Set CPU affinity to pin the current thread to a specific core
///
/// Keeps the whole run on one core so implementations are not timed across
/// core migrations. Core indices at or past `CPU_SETSIZE` are rejected with
/// `InvalidInput`.
#[cfg(target_os = "linux")]
pub fn pin_to_cpu(cpu: usize) -> Result<(), std::io::Error> {
    use std::mem::MaybeUninit;

    if cpu >= libc::CPU_SETSIZE as usize {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("cpu {cpu} is outside the affinity mask (max {})", libc::CPU_SETSIZE - 1),
        ));
    }

    // SAFETY: cpu_set_t is plain data; CPU_ZERO initializes it before use and
    // sched_setaffinity only reads it.
    unsafe {
        let mut set = MaybeUninit::<libc::cpu_set_t>::zeroed();
        let set_ref = set.assume_init_mut();

        libc::CPU_ZERO(set_ref);
        libc::CPU_SET(cpu, set_ref);

        let result = libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), set_ref);

        if result == 0 {
            Ok(())
        } else {
            Err(std::io::Error::last_os_error())
        }
    }
}

/// CPU pinning is a no-op outside Linux
#[cfg(not(target_os = "linux"))]
pub fn pin_to_cpu(_cpu: usize) -> Result<(), std::io::Error> {
    Ok(())
}
