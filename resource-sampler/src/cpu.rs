//! Process CPU clock and privilege checks

use crate::error::{Error, Result};
use std::io;
use std::mem::MaybeUninit;
use std::time::Duration;

/// User plus system CPU time consumed by every thread of this process
pub fn process_time() -> Result<Duration> {
    let mut usage = MaybeUninit::<libc::rusage>::uninit();
    // SAFETY: getrusage fully initialises `usage` when it returns 0
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
    if rc != 0 {
        return Err(Error::Io(io::Error::last_os_error()));
    }
    let usage = unsafe { usage.assume_init() };

    Ok(timeval_to_duration(usage.ru_utime) + timeval_to_duration(usage.ru_stime))
}

fn timeval_to_duration(tv: libc::timeval) -> Duration {
    Duration::from_secs(tv.tv_sec as u64) + Duration::from_micros(tv.tv_usec as u64)
}

/// True when running with an effective uid of 0
pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions
    unsafe { libc::geteuid() == 0 }
}
