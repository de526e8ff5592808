// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Active objects: each owns one named OS thread, stopped and joined on drop.
//!
//! - [`PeriodicTask`] - routine invoked on an absolute deadline schedule
//! - [`WorkerTask`] - delegated closures executed in FIFO order
//! - [`sched`] - earliest-deadline scheduling hint

mod periodic;
pub mod sched;
mod worker;

pub use periodic::PeriodicTask;
pub use worker::WorkerTask;
