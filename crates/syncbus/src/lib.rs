// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # syncbus - in-process publish/subscribe and task concurrency
//!
//! Lightweight pub/sub wiring between components of one process, without a
//! broker or an OS process boundary. Built for embedded and desktop native
//! applications that need deterministic delivery and cheap active objects.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use syncbus::{Observer, Subject};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Topic {
//!     Generic,
//!     System,
//! }
//!
//! struct Printer;
//!
//! impl Observer<Topic, String> for Printer {
//!     fn inform(&self, topic: &Topic, event: &String, origin: &str) {
//!         println!("[{:?}] {} from {}", topic, event, origin);
//!     }
//! }
//!
//! let subject = Subject::<Topic, String>::new("source1");
//! let printer = Arc::new(Printer);
//! subject.subscribe(Topic::Generic, &printer);
//! subject.publish(&Topic::Generic, &"toto".to_string());
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                          Dispatch Layer                             |
//! |   Subject (topic -> subscribers) | Observer | AsyncObserver         |
//! +---------------------------------------------------------------------+
//! |                         Active Objects                              |
//! |   PeriodicTask (deadline loop)   | WorkerTask (delegation queue)    |
//! +---------------------------------------------------------------------+
//! |                     Synchronization Primitives                      |
//! |   Signal | SyncQueue | SyncRingBuffer | RingBuffer | SyncDictionary |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Signal`] | Sticky single-slot wake object with timeout |
//! | [`SyncQueue`] | Unbounded mutex-guarded FIFO |
//! | [`SyncRingBuffer`] | Bounded mutex-guarded FIFO (reject when full) |
//! | [`SyncDictionary`] | Concurrent key/value store, last writer wins |
//! | [`Subject`] | Topic-keyed subscriber registry with synchronous publish |
//! | [`AsyncObserver`] | Queue + signal for observers consumed on their own thread |
//! | [`PeriodicTask`] | Dedicated thread invoking a routine on a fixed deadline schedule |
//! | [`WorkerTask`] | Dedicated thread running delegated closures in FIFO order |
//!
//! ## Modules Overview
//!
//! - [`sync`] - Synchronization primitives and containers
//! - [`observer`] - Observer trait, async observer, subject
//! - [`task`] - Periodic and worker active objects, scheduling hints
//! - [`config`] - Defaults and runtime task configuration

/// Defaults and runtime task configuration.
pub mod config;
/// Crate error type (configuration, validation, thread spawn failures).
pub mod error;
/// Observer trait, queued async observer, and topic subject.
pub mod observer;
/// Prelude module for convenient imports.
pub mod prelude;
/// Signal, synchronized queue, ring buffer and dictionary.
pub mod sync;
/// Periodic and worker active objects.
pub mod task;

pub use config::{RuntimeConfig, TaskConfig};
pub use error::{Error, Result};
pub use observer::{AsyncObserver, Event, Observer, Subject};
pub use sync::{RingBuffer, Signal, SyncDictionary, SyncQueue, SyncRingBuffer};
pub use task::{PeriodicTask, WorkerTask};

/// syncbus version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
