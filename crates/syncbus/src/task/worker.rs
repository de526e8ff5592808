// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Single-thread worker running delegated closures in FIFO order.
//!
//! ```text
//! any thread                          worker thread
//!   delegate(work) ──push──> queue      loop {
//!                  ──signal─> signal      wait(signal)
//!                                         drain(queue)
//!                                       }
//!                                       drain(queue)  (after stop)
//! ```
//!
//! Shutdown drains: every closure delegated before the task is dropped runs.
//! A panicking closure ends the worker thread, and with it that guarantee:
//! later delegations are queued but never run.

use crate::config::TaskConfig;
use crate::error::{Error, Result};
use crate::sync::{Signal, SyncQueue};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, Thread};

type Work<C> = Box<dyn FnOnce(&Arc<C>, &str) + Send + 'static>;

struct WorkerShared<C> {
    queue: SyncQueue<Work<C>>,
    signal: Signal,
    stop: AtomicBool,
}

impl<C> WorkerShared<C> {
    #[inline]
    fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Run queued work until the queue is observed empty. Returns the count.
    fn drain(&self, context: &Arc<C>, name: &str) -> usize {
        let mut ran = 0;
        while let Some(work) = self.queue.front_pop() {
            work(context, name);
            ran += 1;
        }
        ran
    }
}

/// Active object executing delegated closures on its own thread.
///
/// # Example
/// ```
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
/// use syncbus::WorkerTask;
///
/// let total = Arc::new(AtomicU32::new(0));
/// let worker = WorkerTask::new(Arc::clone(&total), "worker_1")?;
///
/// for i in 1..=3 {
///     worker.delegate(move |total, _name| {
///         total.fetch_add(i, Ordering::SeqCst);
///     });
/// }
/// drop(worker); // drains before joining
/// assert_eq!(total.load(Ordering::SeqCst), 6);
/// # Ok::<(), syncbus::Error>(())
/// ```
pub struct WorkerTask<C> {
    name: Arc<str>,
    context: Arc<C>,
    shared: Arc<WorkerShared<C>>,
    thread: Thread,
    handle: Option<JoinHandle<()>>,
}

impl<C> WorkerTask<C>
where
    C: Send + Sync + 'static,
{
    /// Spawn the worker thread, named after `name`.
    ///
    /// # Errors
    ///
    /// [`Error::SpawnFailed`] if the OS refused the thread.
    pub fn new(context: Arc<C>, name: &str) -> Result<Self> {
        Self::with_config(context, name, TaskConfig::default())
    }

    /// Spawn the worker thread with an explicit configuration.
    ///
    /// Only [`TaskConfig::thread_name`] applies to a worker.
    ///
    /// # Errors
    ///
    /// - Validation errors from [`TaskConfig::validate`]
    /// - [`Error::SpawnFailed`] if the OS refused the thread
    pub fn with_config(context: Arc<C>, name: &str, config: TaskConfig) -> Result<Self> {
        config.validate()?;
        let name: Arc<str> = Arc::from(name);
        let shared = Arc::new(WorkerShared {
            queue: SyncQueue::new(),
            signal: Signal::new(),
            stop: AtomicBool::new(false),
        });

        let handle = {
            let shared = Arc::clone(&shared);
            let context = Arc::clone(&context);
            let name = Arc::clone(&name);
            thread::Builder::new()
                .name(config.resolve_thread_name(&name))
                .spawn(move || run_worker(context, name, shared))
                .map_err(Error::SpawnFailed)?
        };

        Ok(Self {
            name,
            context,
            shared,
            thread: handle.thread().clone(),
            handle: Some(handle),
        })
    }

    /// Queue `work` for the worker thread and wake it.
    ///
    /// Callable from any thread. Closures delegated by one thread run in the
    /// order that thread delegated them.
    pub fn delegate<F>(&self, work: F)
    where
        F: FnOnce(&Arc<C>, &str) + Send + 'static,
    {
        self.shared.queue.push(Box::new(work));
        self.shared.signal.signal();
    }

    /// Snapshot of queued, not yet started, work items.
    pub fn pending(&self) -> usize {
        self.shared.queue.len()
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn context(&self) -> &Arc<C> {
        &self.context
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

impl<C> Drop for WorkerTask<C> {
    fn drop(&mut self) {
        self.shared.stop.store(true, Ordering::Release);
        self.shared.signal.request_stop();

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!(
                    "[worker] '{}' delegated work panicked, {} item(s) left unrun",
                    self.name,
                    self.shared.queue.len()
                );
            }
        }
    }
}

impl<C> fmt::Debug for WorkerTask<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerTask")
            .field("name", &self.name)
            .field("pending", &self.shared.queue.len())
            .finish()
    }
}

fn run_worker<C>(context: Arc<C>, name: Arc<str>, shared: Arc<WorkerShared<C>>) {
    log::debug!("[worker] '{}' started", name);

    let mut ran = 0usize;
    while !shared.should_stop() {
        shared.signal.wait();
        ran += shared.drain(&context, &name);
    }
    let tail = shared.drain(&context, &name);

    log::debug!(
        "[worker] '{}' stopped ({} item(s) run, {} in final drain)",
        name,
        ran + tail,
        tail
    );
}
