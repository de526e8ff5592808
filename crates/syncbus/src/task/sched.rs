// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Earliest-deadline scheduling hint for the calling thread.
//!
//! On Linux this asks the kernel for `SCHED_DEADLINE` through the raw
//! `sched_setattr(2)` syscall (glibc has no wrapper). Unprivileged processes
//! are normally refused (`EPERM`); callers fall back to the default policy.

use std::time::Duration;

/// Ask the OS to schedule the calling thread by earliest deadline.
///
/// Runtime budget is `period * DEADLINE_RUNTIME_RATIO`; relative deadline and
/// period both equal `period`.
///
/// Returns `true` only if the kernel accepted the policy.
pub fn request_earliest_deadline(period: Duration) -> bool {
    imp::request(period)
}

#[cfg(target_os = "linux")]
mod imp {
    use crate::config::DEADLINE_RUNTIME_RATIO;
    use std::time::Duration;

    const SCHED_DEADLINE: u32 = 6;

    /// `struct sched_attr` from `<linux/sched/types.h>` (SCHED_ATTR_SIZE_VER0).
    #[repr(C)]
    #[derive(Debug, Default)]
    struct SchedAttr {
        size: u32,
        sched_policy: u32,
        sched_flags: u64,
        sched_nice: i32,
        sched_priority: u32,
        sched_runtime: u64,
        sched_deadline: u64,
        sched_period: u64,
    }

    pub(super) fn request(period: Duration) -> bool {
        let period_ns = u64::try_from(period.as_nanos()).unwrap_or(u64::MAX);
        let runtime_ns = (period_ns as f64 * DEADLINE_RUNTIME_RATIO) as u64;
        if runtime_ns == 0 {
            log::debug!("[sched] period {:?} too short for SCHED_DEADLINE", period);
            return false;
        }

        let attr = SchedAttr {
            size: std::mem::size_of::<SchedAttr>() as u32,
            sched_policy: SCHED_DEADLINE,
            sched_runtime: runtime_ns,
            sched_deadline: period_ns,
            sched_period: period_ns,
            ..SchedAttr::default()
        };

        // SAFETY: `attr` is a valid, fully initialized sched_attr living for
        // the duration of the call; pid 0 targets the calling thread.
        let ret = unsafe {
            libc::syscall(
                libc::SYS_sched_setattr,
                0 as libc::pid_t,
                &attr as *const SchedAttr,
                0 as libc::c_uint,
            )
        };

        if ret == 0 {
            log::debug!(
                "[sched] SCHED_DEADLINE granted (runtime={}ns period={}ns)",
                runtime_ns,
                period_ns
            );
            true
        } else {
            log::debug!(
                "[sched] SCHED_DEADLINE refused: {}",
                std::io::Error::last_os_error()
            );
            false
        }
    }
}

#[cfg(not(target_os = "linux"))]
mod imp {
    use std::time::Duration;

    pub(super) fn request(_period: Duration) -> bool {
        log::debug!("[sched] earliest-deadline scheduling unsupported on this platform");
        false
    }
}
