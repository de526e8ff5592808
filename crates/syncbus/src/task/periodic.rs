// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Deadline-scheduled periodic task.
//!
//! A dedicated thread invokes a routine every `period`, measured against an
//! absolute deadline so that routine duration does not accumulate drift.
//!
//! ## Loop
//!
//! ```text
//! deadline = start + period
//! loop until stop:
//!   spin until now >= deadline          (leaves early on stop)
//!   routine(ctx, name)
//!   deadline += period                  (from the previous deadline)
//!   sleep ratio * (deadline - now)      (if any time remains)
//! ```
//!
//! An overrunning routine is not corrected: the loop runs back-to-back until
//! it has caught up with the schedule. Overruns are only counted.

use super::sched;
use crate::config::TaskConfig;
use crate::error::{Error, Result};
use crate::sync::Signal;
use crossbeam::utils::CachePadded;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, Thread};
use std::time::{Duration, Instant};

/// State shared between the handle and the periodic thread.
///
/// Each counter sits on its own cache line: the task thread writes them every
/// period while observers read them.
#[derive(Debug, Default)]
struct PeriodicShared {
    stop: CachePadded<AtomicBool>,
    invocations: CachePadded<AtomicU64>,
    overruns: CachePadded<AtomicU64>,
    earliest_deadline: AtomicBool,
    /// Interrupts the post-routine sleep on stop.
    wake: Signal,
}

impl PeriodicShared {
    #[inline]
    fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

/// Active object invoking `routine(&context, name)` at a fixed period.
///
/// Dropping the task stops the loop and joins the thread; a routine that is
/// running at that moment finishes first. A sleeping task wakes immediately.
///
/// A panicking routine ends the thread: no further invocations happen and the
/// panic is logged at `warn` when the task is dropped.
///
/// # Example
/// ```
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
/// use syncbus::PeriodicTask;
///
/// let ticks = Arc::new(AtomicU32::new(0));
/// let task = PeriodicTask::new(
///     |ticks: &Arc<AtomicU32>, _name| {
///         ticks.fetch_add(1, Ordering::Relaxed);
///     },
///     Arc::clone(&ticks),
///     "sampler",
///     Duration::from_millis(5),
/// )?;
///
/// std::thread::sleep(Duration::from_millis(50));
/// drop(task);
/// assert!(ticks.load(Ordering::Relaxed) > 0);
/// # Ok::<(), syncbus::Error>(())
/// ```
pub struct PeriodicTask<C> {
    name: Arc<str>,
    period: Duration,
    context: Arc<C>,
    shared: Arc<PeriodicShared>,
    thread: Thread,
    handle: Option<JoinHandle<()>>,
}

impl<C> PeriodicTask<C>
where
    C: Send + Sync + 'static,
{
    /// Spawn a periodic task with [`TaskConfig::default`].
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPeriod`] if `period` is zero
    /// - [`Error::SpawnFailed`] if the OS refused the thread
    pub fn new<F>(routine: F, context: Arc<C>, name: &str, period: Duration) -> Result<Self>
    where
        F: Fn(&Arc<C>, &str) + Send + 'static,
    {
        Self::with_config(routine, context, name, period, TaskConfig::default())
    }

    /// Spawn a periodic task with an explicit configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPeriod`] if `period` is zero or too large to schedule
    /// - Validation errors from [`TaskConfig::validate`]
    /// - [`Error::SpawnFailed`] if the OS refused the thread
    pub fn with_config<F>(
        routine: F,
        context: Arc<C>,
        name: &str,
        period: Duration,
        config: TaskConfig,
    ) -> Result<Self>
    where
        F: Fn(&Arc<C>, &str) + Send + 'static,
    {
        if period.is_zero() || Instant::now().checked_add(period).is_none() {
            return Err(Error::InvalidPeriod);
        }
        config.validate()?;

        let name: Arc<str> = Arc::from(name);
        let shared = Arc::new(PeriodicShared::default());

        let thread_name = config.resolve_thread_name(&name);
        let handle = {
            let shared = Arc::clone(&shared);
            let context = Arc::clone(&context);
            let name = Arc::clone(&name);
            thread::Builder::new()
                .name(thread_name)
                .spawn(move || run_periodic(routine, context, name, period, config, shared))
                .map_err(Error::SpawnFailed)?
        };

        Ok(Self {
            name,
            period,
            context,
            shared,
            thread: handle.thread().clone(),
            handle: Some(handle),
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn context(&self) -> &Arc<C> {
        &self.context
    }

    /// Completed routine invocations.
    pub fn invocations(&self) -> u64 {
        self.shared.invocations.load(Ordering::Relaxed)
    }

    /// Invocations that finished past the next deadline.
    pub fn overruns(&self) -> u64 {
        self.shared.overruns.load(Ordering::Relaxed)
    }

    /// Whether the kernel granted earliest-deadline scheduling.
    ///
    /// Always `false` until the task thread has made its request.
    pub fn earliest_deadline_enabled(&self) -> bool {
        self.shared.earliest_deadline.load(Ordering::Acquire)
    }

    pub fn thread(&self) -> &Thread {
        &self.thread
    }

    /// Raw pthread handle for OS-level priority or affinity tuning.
    #[cfg(unix)]
    #[allow(clippy::unnecessary_cast)]
    pub fn native_handle(&self) -> Option<libc::pthread_t> {
        use std::os::unix::thread::JoinHandleExt;
        self.handle
            .as_ref()
            .map(|h| h.as_pthread_t() as libc::pthread_t)
    }
}

impl<C> Drop for PeriodicTask<C> {
    fn drop(&mut self) {
        self.shared.stop.store(true, Ordering::Release);
        self.shared.wake.request_stop();

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!(
                    "[periodic] '{}' routine panicked, thread ended early",
                    self.name
                );
            }
        }
        log::debug!(
            "[periodic] '{}' stopped after {} invocation(s), {} overrun(s)",
            self.name,
            self.shared.invocations.load(Ordering::Relaxed),
            self.shared.overruns.load(Ordering::Relaxed)
        );
    }
}

impl<C> fmt::Debug for PeriodicTask<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeriodicTask")
            .field("name", &self.name)
            .field("period", &self.period)
            .field("invocations", &self.shared.invocations.load(Ordering::Relaxed))
            .field("overruns", &self.shared.overruns.load(Ordering::Relaxed))
            .finish()
    }
}

/// Spin until `deadline`. Returns `false` if stop was requested meanwhile.
#[inline]
fn spin_until(deadline: Instant, shared: &PeriodicShared) -> bool {
    while Instant::now() < deadline {
        if shared.should_stop() {
            return false;
        }
        std::hint::spin_loop();
    }
    true
}

fn run_periodic<C, F>(
    routine: F,
    context: Arc<C>,
    name: Arc<str>,
    period: Duration,
    config: TaskConfig,
    shared: Arc<PeriodicShared>,
) where
    F: Fn(&Arc<C>, &str),
{
    let earliest_deadline =
        config.request_earliest_deadline && sched::request_earliest_deadline(period);
    shared
        .earliest_deadline
        .store(earliest_deadline, Ordering::Release);
    let ratio = config.ratio_for(earliest_deadline);

    log::debug!(
        "[periodic] '{}' starting (period={:?}, edf={}, sleep_ratio={})",
        name,
        period,
        earliest_deadline,
        ratio
    );

    // Validated at construction
    let Some(mut deadline) = Instant::now().checked_add(period) else {
        return;
    };

    while !shared.should_stop() {
        if !spin_until(deadline, &shared) {
            break;
        }

        routine(&context, &name);
        shared.invocations.fetch_add(1, Ordering::Relaxed);

        deadline = match deadline.checked_add(period) {
            Some(next) => next,
            None => {
                log::debug!("[periodic] '{}' deadline overflow, stopping", name);
                break;
            }
        };

        let now = Instant::now();
        if now < deadline {
            // Only stop wakes this early
            shared.wake.wait_timeout((deadline - now).mul_f64(ratio));
        } else {
            shared.overruns.fetch_add(1, Ordering::Relaxed);
            log::trace!(
                "[periodic] '{}' overrun by {:?}",
                name,
                now.saturating_duration_since(deadline)
            );
        }
    }

    log::debug!("[periodic] '{}' loop exited", name);
}
