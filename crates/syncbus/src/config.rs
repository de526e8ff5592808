// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! syncbus configuration - defaults and runtime task configuration.
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: Compile-time constants (sleep ratios, timeouts)
//! - **Level 2 (Dynamic)**: [`RuntimeConfig`] shared store of [`TaskConfig`]
//!   defaults and per-task overrides
//!
//! # Performance
//!
//! - **Lock-free**: `DashMap` for per-task overrides (sharded, no global lock)
//! - **Atomic swap**: `ArcSwap` for the default config (readers never block)
//!
//! # Example
//!
//! ```rust
//! use syncbus::config::{RuntimeConfig, TaskConfig};
//!
//! let config = RuntimeConfig::new();
//! config.set_override("sampler", TaskConfig::default().with_sleep_ratio(0.8));
//!
//! assert_eq!(config.config_for("sampler").sleep_ratio, 0.8);
//! assert_eq!(config.config_for("other").sleep_ratio, 0.9);
//! ```

use crate::error::{Error, Result};
use arc_swap::ArcSwap;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

// =======================================================================
// Periodic Scheduling
// =======================================================================

/// Fraction of the remaining time slept before busy-waiting to the deadline.
///
/// Used when the earliest-deadline scheduling hint is not active.
pub const DEFAULT_SLEEP_RATIO: f64 = 0.90;

/// Sleep fraction when the OS granted earliest-deadline scheduling.
///
/// The kernel wakes deadline threads precisely, so the spin window can shrink.
pub const EDF_SLEEP_RATIO: f64 = 0.96;

/// Share of the period requested as runtime budget under `SCHED_DEADLINE`.
///
/// Kept below the default `sched_rt_runtime_us / sched_rt_period_us` (95%)
/// so admission control accepts a single task per CPU.
pub const DEADLINE_RUNTIME_RATIO: f64 = 0.5;

// =======================================================================
// Observers & Threads
// =======================================================================

/// Default timeout for async observer consumer loops (1 ms).
pub const DEFAULT_EVENT_WAIT_TIMEOUT: Duration = Duration::from_micros(1000);

/// Linux truncates thread names beyond 15 bytes (+ NUL).
pub const THREAD_NAME_MAX_LEN: usize = 15;

// =======================================================================
// Task Configuration
// =======================================================================

/// Per-task scheduling configuration.
///
/// All fields have working defaults; [`PeriodicTask::new`](crate::PeriodicTask::new)
/// uses [`TaskConfig::default`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "yaml-config", derive(serde::Deserialize))]
#[cfg_attr(feature = "yaml-config", serde(default))]
pub struct TaskConfig {
    /// OS thread name (falls back to the task name when `None`).
    pub thread_name: Option<String>,
    /// Sleep fraction without earliest-deadline scheduling.
    pub sleep_ratio: f64,
    /// Sleep fraction with earliest-deadline scheduling.
    pub edf_sleep_ratio: f64,
    /// Ask the OS for `SCHED_DEADLINE` on the periodic thread.
    pub request_earliest_deadline: bool,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            thread_name: None,
            sleep_ratio: DEFAULT_SLEEP_RATIO,
            edf_sleep_ratio: EDF_SLEEP_RATIO,
            request_earliest_deadline: false,
        }
    }
}

impl TaskConfig {
    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_sleep_ratio(mut self, ratio: f64) -> Self {
        self.sleep_ratio = ratio;
        self
    }

    #[must_use]
    pub fn with_edf_sleep_ratio(mut self, ratio: f64) -> Self {
        self.edf_sleep_ratio = ratio;
        self
    }

    #[must_use]
    pub fn with_earliest_deadline(mut self, enabled: bool) -> Self {
        self.request_earliest_deadline = enabled;
        self
    }

    /// Check ratios and thread name.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRatio`] if a ratio is not finite or outside `0.0..=1.0`
    /// - [`Error::InvalidConfig`] if the thread name contains a NUL byte
    pub fn validate(&self) -> Result<()> {
        for ratio in [self.sleep_ratio, self.edf_sleep_ratio] {
            if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
                return Err(Error::InvalidRatio(ratio));
            }
        }
        if let Some(name) = &self.thread_name {
            if name.contains('\0') {
                return Err(Error::InvalidConfig(format!(
                    "thread name {:?} contains a NUL byte",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Sleep ratio for the active scheduling mode.
    #[inline]
    pub fn ratio_for(&self, earliest_deadline: bool) -> f64 {
        if earliest_deadline {
            self.edf_sleep_ratio
        } else {
            self.sleep_ratio
        }
    }

    /// Resolve the OS thread name for a task, truncated to what Linux keeps.
    pub fn resolve_thread_name(&self, task_name: &str) -> String {
        let name = self.thread_name.as_deref().unwrap_or(task_name);
        truncate_thread_name(name)
    }
}

/// Truncate to [`THREAD_NAME_MAX_LEN`] bytes on a char boundary, dropping NULs.
fn truncate_thread_name(name: &str) -> String {
    let mut out = String::with_capacity(THREAD_NAME_MAX_LEN);
    for ch in name.chars().filter(|c| *c != '\0') {
        if out.len() + ch.len_utf8() > THREAD_NAME_MAX_LEN {
            break;
        }
        out.push(ch);
    }
    out
}

// =======================================================================
// Runtime Configuration (Dynamic, Lock-Free)
// =======================================================================

/// Shared runtime configuration (thread-safe, lock-free reads).
///
/// - `ArcSwap`: atomic swap of the default [`TaskConfig`]
/// - `DashMap`: per-task overrides keyed by task name
///
/// Clone is cheap (two `Arc` increments); every clone sees the same store.
#[derive(Clone)]
pub struct RuntimeConfig {
    /// Default config for tasks without an override.
    default_config: Arc<ArcSwap<TaskConfig>>,

    /// Task name -> config override.
    overrides: Arc<DashMap<Arc<str>, TaskConfig>>,
}

impl RuntimeConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_config: Arc::new(ArcSwap::from_pointee(TaskConfig::default())),
            overrides: Arc::new(DashMap::new()),
        }
    }

    /// Replace the default config.
    ///
    /// # Errors
    ///
    /// Validation errors from [`TaskConfig::validate`]; the store is left unchanged.
    pub fn set_default(&self, config: TaskConfig) -> Result<()> {
        config.validate()?;
        self.default_config.store(Arc::new(config));
        Ok(())
    }

    /// Snapshot of the current default config.
    pub fn default_config(&self) -> TaskConfig {
        TaskConfig::clone(&self.default_config.load())
    }

    /// Register an override for the task named `task_name`.
    ///
    /// Invalid configs are dropped with a debug log, keeping any previous override.
    pub fn set_override(&self, task_name: &str, config: TaskConfig) -> bool {
        if let Err(e) = config.validate() {
            log::debug!("[config] override for '{}' rejected: {}", task_name, e);
            return false;
        }
        self.overrides.insert(Arc::from(task_name), config);
        true
    }

    /// Remove a task override. Returns the removed config.
    pub fn remove_override(&self, task_name: &str) -> Option<TaskConfig> {
        self.overrides.remove(task_name).map(|(_, config)| config)
    }

    /// Config for `task_name`: its override if any, else the default.
    pub fn config_for(&self, task_name: &str) -> TaskConfig {
        match self.overrides.get(task_name) {
            Some(entry) => entry.value().clone(),
            None => self.default_config(),
        }
    }

    /// Number of registered overrides.
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "yaml-config")]
mod yaml {
    use super::{RuntimeConfig, TaskConfig};
    use crate::error::{Error, Result};
    use std::collections::HashMap;
    use std::fs;
    use std::path::Path;

    /// On-disk layout:
    ///
    /// ```yaml
    /// default:
    ///   sleep_ratio: 0.9
    /// tasks:
    ///   sampler:
    ///     request_earliest_deadline: true
    /// ```
    #[derive(Debug, Default, serde::Deserialize)]
    #[serde(default)]
    struct ConfigDocument {
        default: Option<TaskConfig>,
        tasks: HashMap<String, TaskConfig>,
    }

    impl RuntimeConfig {
        /// Load defaults and per-task overrides from a YAML file.
        ///
        /// Returns the number of task overrides loaded. All entries are
        /// validated before anything is applied.
        ///
        /// # Errors
        ///
        /// - [`Error::ConfigFileNotFound`] if `path` does not exist
        /// - [`Error::IoError`] if the file cannot be read
        /// - [`Error::ConfigParse`] on malformed YAML
        /// - validation errors from [`TaskConfig::validate`]
        pub fn load_yaml(&self, path: &Path) -> Result<usize> {
            if !path.exists() {
                return Err(Error::ConfigFileNotFound(path.display().to_string()));
            }
            let content = fs::read_to_string(path)?;
            self.load_yaml_str(&content)
        }

        /// Same as [`RuntimeConfig::load_yaml`] from an in-memory document.
        pub fn load_yaml_str(&self, content: &str) -> Result<usize> {
            let doc: ConfigDocument =
                serde_yaml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))?;

            if let Some(default) = &doc.default {
                default.validate()?;
            }
            for (name, config) in &doc.tasks {
                config.validate().map_err(|e| {
                    Error::InvalidConfig(format!("task '{}': {}", name, e))
                })?;
            }

            if let Some(default) = doc.default {
                self.set_default(default)?;
            }
            let count = doc.tasks.len();
            for (name, config) in doc.tasks {
                self.set_override(&name, config);
            }
            log::debug!("[config] loaded {} task override(s) from YAML", count);
            Ok(count)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_task_config() {
        let config = TaskConfig::default();
        assert_eq!(config.sleep_ratio, DEFAULT_SLEEP_RATIO);
        assert_eq!(config.edf_sleep_ratio, EDF_SLEEP_RATIO);
        assert!(!config.request_earliest_deadline);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ratio_for_mode() {
        let config = TaskConfig::default();
        assert_eq!(config.ratio_for(false), 0.90);
        assert_eq!(config.ratio_for(true), 0.96);
    }

    #[test]
    fn test_validate_rejects_bad_ratios() {
        assert!(matches!(
            TaskConfig::default().with_sleep_ratio(1.2).validate(),
            Err(Error::InvalidRatio(_))
        ));
        assert!(matches!(
            TaskConfig::default().with_edf_sleep_ratio(-0.1).validate(),
            Err(Error::InvalidRatio(_))
        ));
        assert!(matches!(
            TaskConfig::default().with_sleep_ratio(f64::NAN).validate(),
            Err(Error::InvalidRatio(_))
        ));
        assert!(matches!(
            TaskConfig::default().with_thread_name("a\0b").validate(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_thread_name_truncation() {
        let config = TaskConfig::default();
        assert_eq!(config.resolve_thread_name("worker_1"), "worker_1");
        assert_eq!(
            config.resolve_thread_name("periodic task number one"),
            "periodic task n"
        );

        let named = TaskConfig::default().with_thread_name("custom");
        assert_eq!(named.resolve_thread_name("ignored"), "custom");

        // Multi-byte chars are never split
        let name = truncate_thread_name("ééééééééé");
        assert!(name.len() <= THREAD_NAME_MAX_LEN);
        assert_eq!(name.chars().count(), 7);
    }

    #[test]
    fn test_runtime_config_overrides() {
        let config = RuntimeConfig::new();
        assert_eq!(config.override_count(), 0);

        assert!(config.set_override("sampler", TaskConfig::default().with_sleep_ratio(0.5)));
        assert!(!config.set_override("broken", TaskConfig::default().with_sleep_ratio(2.0)));
        assert_eq!(config.override_count(), 1);

        assert_eq!(config.config_for("sampler").sleep_ratio, 0.5);
        assert_eq!(config.config_for("unknown").sleep_ratio, DEFAULT_SLEEP_RATIO);

        let removed = config.remove_override("sampler").expect("override exists");
        assert_eq!(removed.sleep_ratio, 0.5);
        assert!(config.remove_override("sampler").is_none());
    }

    #[test]
    fn test_runtime_config_default_swap_shared_across_clones() {
        let config = RuntimeConfig::new();
        let clone = config.clone();

        config
            .set_default(TaskConfig::default().with_earliest_deadline(true))
            .expect("valid config");
        assert!(clone.default_config().request_earliest_deadline);

        assert!(config
            .set_default(TaskConfig::default().with_sleep_ratio(3.0))
            .is_err());
        assert!(clone.default_config().request_earliest_deadline);
    }

    #[cfg(feature = "yaml-config")]
    mod yaml_tests {
        use super::super::*;
        use std::io::Write;

        fn write_temp_yaml(content: &str) -> tempfile::NamedTempFile {
            let mut f = tempfile::NamedTempFile::new().expect("create temp file");
            f.write_all(content.as_bytes()).expect("write temp file");
            f.flush().expect("flush temp file");
            f
        }

        #[test]
        fn test_load_yaml_default_and_tasks() {
            let yaml = r#"
default:
  sleep_ratio: 0.8
tasks:
  sampler:
    request_earliest_deadline: true
    thread_name: "sampler-rt"
"#;
            let file = write_temp_yaml(yaml);
            let config = RuntimeConfig::new();
            let count = config.load_yaml(file.path()).expect("load yaml");

            assert_eq!(count, 1);
            assert_eq!(config.default_config().sleep_ratio, 0.8);
            let sampler = config.config_for("sampler");
            assert!(sampler.request_earliest_deadline);
            assert_eq!(sampler.thread_name.as_deref(), Some("sampler-rt"));
            assert_eq!(sampler.edf_sleep_ratio, EDF_SLEEP_RATIO);
        }

        #[test]
        fn test_load_yaml_missing_file() {
            let config = RuntimeConfig::new();
            let result = config.load_yaml(std::path::Path::new(
                "/tmp/definitely_not_a_real_syncbus_config.yaml",
            ));
            assert!(matches!(result, Err(Error::ConfigFileNotFound(_))));
        }

        #[test]
        fn test_load_yaml_invalid_task_applies_nothing() {
            let yaml = r#"
default:
  sleep_ratio: 0.7
tasks:
  bad:
    sleep_ratio: 4.0
"#;
            let config = RuntimeConfig::new();
            assert!(matches!(
                config.load_yaml_str(yaml),
                Err(Error::InvalidConfig(_))
            ));
            assert_eq!(config.default_config().sleep_ratio, DEFAULT_SLEEP_RATIO);
            assert_eq!(config.override_count(), 0);
        }

        #[test]
        fn test_load_yaml_parse_error() {
            let config = RuntimeConfig::new();
            assert!(matches!(
                config.load_yaml_str("tasks: [not, a, map"),
                Err(Error::ConfigParse(_))
            ));
        }
    }
}
