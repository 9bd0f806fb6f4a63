// Copyright (c) 2025 CData Connect Cloud Node Contributors
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

//! Logging setup for the standalone runtime.
//!
//! Installs a `tracing-subscriber` writing to stderr or a log file.
//! When the node runs inside a host, the host owns the subscriber and this
//! module is not involved.
//!
//! Level resolution: `connect_cloud.log_level` option, then `RUST_LOG`,
//! then `warn`. A log file that cannot be opened falls back to stderr.
//!
//! ```ignore
//! builder.set_option("connect_cloud.log_level", "debug")?;
//! builder.set_option("connect_cloud.log_file", "/tmp/connect-cloud.log")?;
//! ```

use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::sync::OnceLock;
use tracing_subscriber::{
    fmt::{self, time::SystemTime, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

const TARGET: &str = "cdata_connect_cloud";

/// Accepted values for `connect_cloud.log_level`.
const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Logging options collected by the standalone context builder.
#[derive(Debug, Clone, Default)]
pub(crate) struct LogConfig {
    /// Lowercase level, one of [`LOG_LEVELS`].
    pub level: Option<String>,
    /// Log file path. If unset, logs go to stderr.
    pub file: Option<String>,
}

impl LogConfig {
    /// Set the level, case-insensitively.
    pub(crate) fn set_level(&mut self, value: &str) -> Result<()> {
        let level = value.trim().to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(Error::configuration(format!(
                "invalid value '{}' for option 'connect_cloud.log_level'",
                value
            )));
        }
        self.level = Some(level);
        Ok(())
    }

    fn is_off(&self) -> bool {
        self.level.as_deref() == Some("off")
    }

    /// Filter directive for an explicit level; `None` defers to `RUST_LOG`.
    fn directive(&self) -> Option<String> {
        self.level
            .as_deref()
            .map(|level| format!("{}={}", TARGET, level))
    }

    fn filter(&self) -> EnvFilter {
        match self.directive() {
            Some(directive) => EnvFilter::new(directive),
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("{}=warn", TARGET))),
        }
    }

    /// Writer for the configured destination and whether it takes ANSI colors.
    fn writer(&self) -> (BoxMakeWriter, bool) {
        let Some(ref path) = self.file else {
            return (BoxMakeWriter::new(std::io::stderr), true);
        };
        match open_log_file(path) {
            Ok(file) => (BoxMakeWriter::new(file), false),
            Err(e) => {
                eprintln!(
                    "cdata-connect-cloud: failed to open log file {}, logging to stderr: {}",
                    path, e
                );
                (BoxMakeWriter::new(std::io::stderr), true)
            }
        }
    }
}

fn open_log_file(path: &str) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the tracing subscriber.
///
/// Runs at most once per process; the first built context wins.
pub(crate) fn init_logging(config: &LogConfig) {
    LOGGING_INITIALIZED.get_or_init(|| {
        if config.is_off() {
            return;
        }

        let (writer, ansi) = config.writer();
        tracing_subscriber::registry()
            .with(config.filter())
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .with_target(false)
                    .with_ansi(ansi)
                    .with_timer(SystemTime),
            )
            .try_init()
            .ok();
    });
}
