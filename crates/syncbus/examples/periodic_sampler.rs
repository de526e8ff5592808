// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Example readability over pedantic
#![allow(clippy::cast_precision_loss)] // Stats output

//! Periodic sampler walkthrough for syncbus
//!
//! Demonstrates:
//! - Sync observers, an async observer and a named handler on two subjects
//! - A periodic task sampling a mocked signal and publishing it
//! - Jobs delegated at random to two worker tasks
//!
//! Run with `RUST_LOG=debug` to see task lifecycle logs.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use syncbus::config::DEFAULT_EVENT_WAIT_TIMEOUT;
use syncbus::{AsyncObserver, Observer, PeriodicTask, Subject, SyncQueue, WorkerTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum MyTopic {
    Generic,
    System,
    External,
}

struct Printer;

impl Observer<MyTopic, String> for Printer {
    fn inform(&self, topic: &MyTopic, event: &String, origin: &str) {
        println!("sync [topic {:?}] received: event ({}) from {}", topic, event, origin);
    }
}

/// Async observer draining its inbox on a dedicated thread.
struct Monitor {
    inbox: Arc<AsyncObserver<MyTopic, String>>,
    stop: Arc<AtomicBool>,
    consumer: Option<JoinHandle<()>>,
}

impl Monitor {
    fn spawn() -> Arc<Self> {
        let inbox: Arc<AsyncObserver<MyTopic, String>> = Arc::new(AsyncObserver::new());
        let stop = Arc::new(AtomicBool::new(false));
        let consumer = {
            let (inbox, stop) = (Arc::clone(&inbox), Arc::clone(&stop));
            thread::spawn(move || {
                while !stop.load(Ordering::Acquire) {
                    inbox.wait_for_events_timeout(DEFAULT_EVENT_WAIT_TIMEOUT);
                    while let Some(e) = inbox.pop_first_event() {
                        println!(
                            "async/pop [topic {:?}] received: event ({}) from {}",
                            e.topic, e.event, e.origin
                        );
                    }
                }
            })
        };
        Arc::new(Self {
            inbox,
            stop,
            consumer: Some(consumer),
        })
    }
}

impl Observer<MyTopic, String> for Monitor {
    fn inform(&self, topic: &MyTopic, event: &String, origin: &str) {
        println!("async/push [topic {:?}] received: event ({}) from {}", topic, event, origin);
        self.inbox.inform(topic, event, origin);
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        self.inbox.request_stop();
        if let Some(consumer) = self.consumer.take() {
            let _ = consumer.join();
        }
    }
}

/// Running min/max/mean of sampled values.
#[derive(Default)]
struct Collector {
    samples: parking_lot::Mutex<Vec<f64>>,
}

impl Observer<MyTopic, String> for Collector {
    fn inform(&self, _topic: &MyTopic, event: &String, _origin: &str) {
        if let Ok(value) = event.parse::<f64>() {
            self.samples.lock().push(value);
        }
    }
}

impl Collector {
    fn display_stats(&self) {
        let samples = self.samples.lock();
        if samples.is_empty() {
            println!("no samples");
            return;
        }
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = samples.iter().sum::<f64>() / samples.len() as f64;
        println!(
            "{} samples, min {:.3}, max {:.3}, average {:.3}",
            samples.len(),
            min,
            max,
            avg
        );
    }
}

#[derive(Default)]
struct LoopContext {
    loop_counter: AtomicU32,
    time_points: SyncQueue<Instant>,
}

fn print_intervals(start: Instant, context: &LoopContext) {
    let mut previous = start;
    for stamp in context.time_points.drain() {
        println!("timepoint: {} us", (stamp - previous).as_micros());
        previous = stamp;
    }
}

fn publish_subscribe() {
    println!("-- publish subscribe --");
    let observer1 = Arc::new(Printer);
    let observer2 = Arc::new(Printer);
    let monitor = Monitor::spawn();
    let subject1 = Subject::<MyTopic, String>::new("source1");
    let subject2 = Subject::<MyTopic, String>::new("source2");

    for subject in [&subject1, &subject2] {
        subject.subscribe(MyTopic::Generic, &observer1);
        subject.subscribe(MyTopic::Generic, &observer2);
        subject.subscribe(MyTopic::System, &observer2);
        subject.subscribe(MyTopic::Generic, &monitor);
    }
    subject1.subscribe_handler(
        MyTopic::Generic,
        "loose_coupled_handler_1",
        |topic, event, origin| {
            println!("handler [topic {:?}] received: event ({}) from {}", topic, event, origin);
        },
    );

    subject1.publish(&MyTopic::Generic, &"toto".to_string());
    subject1.unsubscribe(&MyTopic::Generic, &observer1);
    subject1.publish(&MyTopic::Generic, &"titi".to_string());
    subject1.publish(&MyTopic::System, &"tata".to_string());
    subject1.unsubscribe_handler(&MyTopic::Generic, "loose_coupled_handler_1");

    thread::sleep(Duration::from_millis(500));

    subject1.publish(&MyTopic::Generic, &"tintin".to_string());
    subject2.publish(&MyTopic::Generic, &"tonton".to_string());
    subject2.publish(&MyTopic::System, &"tantine".to_string());
}

fn periodic_task() -> syncbus::Result<()> {
    println!("-- periodic task --");
    let context = Arc::new(LoopContext::default());
    let start = Instant::now();
    let task = PeriodicTask::new(
        |ctx: &Arc<LoopContext>, _name| {
            ctx.loop_counter.fetch_add(1, Ordering::SeqCst);
            ctx.time_points.push(Instant::now());
        },
        Arc::clone(&context),
        "periodic task 1",
        Duration::from_millis(20),
    )?;

    thread::sleep(Duration::from_secs(2));
    drop(task);

    println!("nb of periodic loops = {}", context.loop_counter.load(Ordering::SeqCst));
    print_intervals(start, &context);
    Ok(())
}

fn periodic_publish_subscribe() -> syncbus::Result<()> {
    println!("-- periodic publish subscribe --");
    let monitoring = Monitor::spawn();
    let data_source: Arc<Subject<MyTopic, String>> = Arc::new(Subject::new("data_source"));
    let collector = Arc::new(Collector::default());
    data_source.subscribe(MyTopic::External, &monitoring);
    data_source.subscribe(MyTopic::External, &collector);

    let source = Arc::clone(&data_source);
    let context = Arc::new(LoopContext::default());
    {
        let _sampler = PeriodicTask::new(
            move |ctx: &Arc<LoopContext>, _name| {
                let n = ctx.loop_counter.fetch_add(1, Ordering::SeqCst) + 1;
                // mocked signal
                let signal = f64::from(n).sin();
                source.publish(&MyTopic::External, &signal.to_string());
            },
            context,
            "periodic task 1",
            Duration::from_millis(100),
        )?;
        thread::sleep(Duration::from_secs(2));
    }

    collector.display_stats();
    Ok(())
}

fn worker_tasks() -> syncbus::Result<()> {
    println!("-- worker tasks --");
    let context = Arc::new(LoopContext::default());
    let tasks = [
        WorkerTask::new(Arc::clone(&context), "worker_1")?,
        WorkerTask::new(Arc::clone(&context), "worker_2")?,
    ];

    thread::sleep(Duration::from_millis(100));
    let start = Instant::now();

    for _ in 0..20 {
        let idx = fastrand::usize(0..tasks.len());
        tasks[idx].delegate(|ctx, task_name| {
            println!(
                "job {} on worker task {}",
                ctx.loop_counter.load(Ordering::SeqCst),
                task_name
            );
            ctx.loop_counter.fetch_add(1, Ordering::SeqCst);
            ctx.time_points.push(Instant::now());
        });
        thread::yield_now();
    }

    thread::sleep(Duration::from_secs(2));
    drop(tasks);

    println!("nb of jobs = {}", context.loop_counter.load(Ordering::SeqCst));
    print_intervals(start, &context);
    Ok(())
}

fn main() -> syncbus::Result<()> {
    env_logger::init();

    publish_subscribe();
    periodic_task()?;
    periodic_publish_subscribe()?;
    worker_tasks()?;
    Ok(())
}
