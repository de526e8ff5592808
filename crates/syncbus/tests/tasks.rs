// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Active object integration tests
//!
//! Periodic sampling over two seconds, a periodic sampler publishing through
//! a subject, and jobs spread randomly over two workers.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use syncbus::{AsyncObserver, PeriodicTask, Subject, SyncQueue, TaskConfig, WorkerTask};

#[derive(Default)]
struct LoopContext {
    loop_counter: AtomicU32,
    time_points: SyncQueue<Instant>,
}

#[test]
fn test_periodic_20ms_over_2s() {
    let context = Arc::new(LoopContext::default());
    let period = Duration::from_millis(20);
    let start = Instant::now();

    let task = PeriodicTask::new(
        |ctx: &Arc<LoopContext>, _name| {
            ctx.loop_counter.fetch_add(1, Ordering::SeqCst);
            ctx.time_points.push(Instant::now());
        },
        Arc::clone(&context),
        "periodic task 1",
        period,
    )
    .expect("spawn periodic task");

    thread::sleep(Duration::from_secs(2));
    drop(task);

    let loops = context.loop_counter.load(Ordering::SeqCst);
    assert!((80..=101).contains(&loops), "nb of periodic loops = {}", loops);

    // Every fire happens at or after its deadline: start + k * period
    let stamps = context.time_points.drain();
    for (k, stamp) in stamps.iter().enumerate() {
        let deadline = start + period * (k as u32 + 1);
        assert!(
            *stamp + Duration::from_millis(1) >= deadline,
            "fire {} ran {:?} early",
            k,
            deadline - *stamp
        );
    }
}

#[test]
fn test_periodic_sampler_publishes() {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum MyTopic {
        External,
    }

    let data_source: Arc<Subject<MyTopic, String>> = Arc::new(Subject::new("data_source"));
    let monitoring: Arc<AsyncObserver<MyTopic, String>> = Arc::new(AsyncObserver::new());
    data_source.subscribe(MyTopic::External, &monitoring);

    let context = Arc::new(LoopContext::default());
    let source = Arc::clone(&data_source);
    {
        let _sampler = PeriodicTask::new(
            move |ctx: &Arc<LoopContext>, _name| {
                let n = ctx.loop_counter.fetch_add(1, Ordering::SeqCst) + 1;
                let signal = f64::from(n).sin();
                source.publish(&MyTopic::External, &signal.to_string());
            },
            Arc::clone(&context),
            "sampler",
            Duration::from_millis(10),
        )
        .expect("spawn sampler");
        thread::sleep(Duration::from_millis(300));
    }

    let events = monitoring.pop_all_events();
    assert_eq!(events.len(), context.loop_counter.load(Ordering::SeqCst) as usize);
    assert!(events.len() >= 15);
    assert!(events.iter().all(|e| e.origin == "data_source"));
    let first: f64 = events[0].event.parse().expect("numeric sample");
    assert!((first - 1f64.sin()).abs() < 1e-9);
}

#[test]
fn test_periodic_with_runtime_config() {
    let runtime = syncbus::RuntimeConfig::new();
    runtime.set_override(
        "tuned",
        TaskConfig::default()
            .with_thread_name("tuned-thread")
            .with_sleep_ratio(0.5),
    );

    let count = Arc::new(AtomicU32::new(0));
    let task = PeriodicTask::with_config(
        |c: &Arc<AtomicU32>, _| {
            c.fetch_add(1, Ordering::SeqCst);
        },
        Arc::clone(&count),
        "tuned",
        Duration::from_millis(5),
        runtime.config_for("tuned"),
    )
    .expect("spawn tuned task");

    assert_eq!(task.thread().name(), Some("tuned-thread"));
    thread::sleep(Duration::from_millis(100));
    drop(task);
    assert!(count.load(Ordering::SeqCst) >= 10);
}

#[test]
fn test_jobs_spread_over_two_workers() {
    let context = Arc::new(LoopContext::default());
    let per_worker: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let workers = [
        WorkerTask::new(Arc::clone(&context), "worker_1").expect("spawn worker_1"),
        WorkerTask::new(Arc::clone(&context), "worker_2").expect("spawn worker_2"),
    ];

    let mut rng = fastrand::Rng::with_seed(7);
    for _ in 0..20 {
        let idx = rng.usize(0..workers.len());
        let log = Arc::clone(&per_worker);
        workers[idx].delegate(move |ctx, task_name| {
            ctx.loop_counter.fetch_add(1, Ordering::SeqCst);
            ctx.time_points.push(Instant::now());
            log.lock().push(task_name.to_string());
        });
        thread::yield_now();
    }
    drop(workers);

    assert_eq!(context.loop_counter.load(Ordering::SeqCst), 20);
    assert_eq!(context.time_points.len(), 20);
    let names = per_worker.lock();
    assert!(names.iter().all(|n| n == "worker_1" || n == "worker_2"));
}

#[test]
fn test_worker_delegates_from_many_threads() {
    let ran = Arc::new(AtomicUsize::new(0));
    let worker = Arc::new(WorkerTask::new(Arc::clone(&ran), "fanin").expect("spawn worker"));

    let producers: Vec<_> = (0..4)
        .map(|_| {
            let w = Arc::clone(&worker);
            thread::spawn(move || {
                for _ in 0..250 {
                    w.delegate(|ran, _| {
                        ran.fetch_add(1, Ordering::SeqCst);
                    });
                }
            })
        })
        .collect();
    for p in producers {
        p.join().unwrap();
    }

    let worker = Arc::try_unwrap(worker).expect("sole owner");
    drop(worker);
    assert_eq!(ran.load(Ordering::SeqCst), 1_000);
}
