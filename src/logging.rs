// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Logging configuration for the impersonation examples.
//!
//! Initializes a `tracing-subscriber` with file or stderr output.
//!
//! ## Configuration priority
//!
//! 1. `ADBC_BIGQUERY_LOG_LEVEL` / `ADBC_BIGQUERY_LOG_FILE` (highest)
//! 2. `RUST_LOG` environment variable
//! 3. Default: `info`
//!
//! ```bash
//! RUST_LOG=bigquery_adbc_impersonation=debug bigquery-impersonation
//! ```

use crate::config::EnvSource;
use std::fs::OpenOptions;
use std::io;
use std::sync::OnceLock;
use tracing_subscriber::{
    fmt::{self, time::SystemTime, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

const TARGET: &str = "bigquery_adbc_impersonation";

pub const LOG_LEVEL_ENV: &str = "ADBC_BIGQUERY_LOG_LEVEL";
pub const LOG_FILE_ENV: &str = "ADBC_BIGQUERY_LOG_FILE";

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    /// Log level: "OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE".
    pub level: Option<String>,
    /// Log file path. If unset, logs go to stderr.
    pub file: Option<String>,
}

impl LogConfig {
    /// Reads the logging configuration from `env`.
    pub fn load(env: &(impl EnvSource + ?Sized)) -> Self {
        Self {
            level: env.non_empty(LOG_LEVEL_ENV),
            file: env.non_empty(LOG_FILE_ENV),
        }
    }

    /// Returns true if logging is switched off entirely.
    pub fn is_off(&self) -> bool {
        self.level
            .as_deref()
            .is_some_and(|level| level.eq_ignore_ascii_case("off"))
    }

    /// Opens the log destination: the configured file in append mode, or
    /// stderr.
    fn writer(&self) -> io::Result<BoxMakeWriter> {
        match &self.file {
            Some(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Ok(BoxMakeWriter::new(file))
            }
            None => Ok(BoxMakeWriter::new(io::stderr)),
        }
    }

    fn filter(&self) -> EnvFilter {
        match &self.level {
            Some(level) => EnvFilter::new(format!("{TARGET}={}", level.to_lowercase())),
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("{TARGET}=info"))),
        }
    }
}

/// Initialize the tracing subscriber.
///
/// Only the first call in a process has any effect.
pub fn init_logging(config: &LogConfig) {
    LOGGING_INITIALIZED.get_or_init(|| {
        if config.is_off() {
            return;
        }

        let writer = match config.writer() {
            Ok(writer) => writer,
            Err(e) => {
                eprintln!("bigquery-impersonation: failed to open log file: {e}");
                return;
            }
        };

        tracing_subscriber::registry()
            .with(config.filter())
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .with_target(false)
                    // No colour codes in log files.
                    .with_ansi(config.file.is_none())
                    .with_timer(SystemTime),
            )
            .try_init()
            .ok();
    });
}
