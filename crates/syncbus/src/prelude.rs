// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use syncbus::prelude::*;
//!
//! let subject: Subject<u8, String> = Subject::new("app");
//! let queue: SyncQueue<u32> = SyncQueue::new();
//! assert!(queue.is_empty());
//! assert_eq!(subject.name(), "app");
//! ```

pub use crate::{
    AsyncObserver, Error, Event, Observer, PeriodicTask, Result, RingBuffer, RuntimeConfig,
    Signal, Subject, SyncDictionary, SyncQueue, SyncRingBuffer, TaskConfig, WorkerTask,
};
