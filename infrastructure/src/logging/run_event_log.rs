//! JSONL file writer for run events.
//!
//! Each [`RunEvent`] becomes one JSON line carrying `type`, `run_id` and
//! `timestamp` next to the event's own fields.

use autofix_application::ports::run_event_logger::{RunEvent, RunEventLogger};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL run-event logger, one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every event and
/// on `Drop`.
pub struct JsonlRunEventLogger {
    writer: Mutex<BufWriter<File>>,
    run_id: String,
    path: PathBuf,
}

impl JsonlRunEventLogger {
    /// Append to `<dir>/<run_id>.events.jsonl`.
    ///
    /// Creates the directory if needed. Returns `None` when the file cannot
    /// be opened; the run then proceeds without a transcript.
    pub fn for_run(dir: impl AsRef<Path>, run_id: &str) -> Option<Self> {
        let path = dir.as_ref().join(format!("{}.events.jsonl", run_id));
        Self::open(path, run_id)
    }

    /// Append to an explicit path
    pub fn open(path: impl AsRef<Path>, run_id: &str) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create run event directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open run event log {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            run_id: run_id.to_string(),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(&self, event: RunEvent) -> Value {
        let mut map = match event.payload {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };

        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        map.insert("type".to_string(), Value::String(event.event_type.to_string()));
        map.insert("run_id".to_string(), Value::String(self.run_id.clone()));
        map.insert("timestamp".to_string(), Value::String(timestamp));
        Value::Object(map)
    }
}

impl RunEventLogger for JsonlRunEventLogger {
    fn log(&self, event: RunEvent) {
        let Ok(line) = serde_json::to_string(&self.record(event)) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlRunEventLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
