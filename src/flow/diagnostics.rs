// SPDX-License-Identifier: MIT

//! Diagnostics sink handed to the registry and the gate
//!
//! Components that report problems take a [`Diagnostics`] at construction
//! instead of writing to the process-wide logger directly. The default
//! forwards to whatever `log` backend is installed (env_logger in the
//! binary); [`MemorySink`] keeps records in memory.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Log target used for every diagnostic
pub const TARGET: &str = "linkexpr";

/// Where diagnostics go
#[derive(Clone)]
pub struct Diagnostics {
    sink: Arc<dyn Log>,
}

impl Diagnostics {
    /// Send diagnostics to the installed `log` backend
    pub fn global() -> Self {
        Self {
            sink: Arc::new(GlobalLogger),
        }
    }

    /// Send diagnostics to `sink`
    pub fn new(sink: Arc<dyn Log>) -> Self {
        Self { sink }
    }

    pub fn emit(&self, level: Level, args: fmt::Arguments<'_>) {
        let metadata = Metadata::builder().level(level).target(TARGET).build();
        if !self.sink.enabled(&metadata) {
            return;
        }
        self.sink.log(
            &Record::builder()
                .metadata(metadata)
                .args(args)
                .module_path_static(Some(module_path!()))
                .build(),
        );
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Error, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Debug, args);
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::global()
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics").finish_non_exhaustive()
    }
}

/// Forwards to `log::logger()`
struct GlobalLogger;

impl Log for GlobalLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level() && log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record) {
        log::logger().log(record);
    }

    fn flush(&self) {
        log::logger().flush();
    }
}

/// A recorded diagnostic
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub level: Level,
    pub message: String,
}

/// Keeps diagnostics in memory
#[derive(Debug)]
pub struct MemorySink {
    max_level: LevelFilter,
    entries: Mutex<Vec<Entry>>,
}

impl MemorySink {
    pub fn new(max_level: LevelFilter) -> Self {
        Self {
            max_level,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Everything recorded so far, oldest first
    pub fn entries(&self) -> Vec<Entry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages recorded at exactly `level`
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(LevelFilter::Trace)
    }
}

impl Log for MemorySink {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Entry {
                level: record.level(),
                message: record.args().to_string(),
            });
    }

    fn flush(&self) {}
}
