//! Append-only diagnostic trace.
//!
//! One timestamped line per check. The file is opened in append mode and
//! every line goes out in a single write, so several processes can share one
//! log. It is never read back; write failures are ignored.

use chrono::{SecondsFormat, Utc};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

#[derive(Debug)]
pub struct DiagnosticLog {
    file: Option<File>,
}

impl DiagnosticLog {
    /// Open (or create) `path` for appending. An unopenable path yields a disabled log.
    pub fn open(path: &Path) -> Self {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                tracing::warn!(path = %path.display(), error = %e, "diagnostic log disabled");
            })
            .ok();
        Self { file }
    }

    pub fn disabled() -> Self {
        Self { file: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    pub fn trace(&self, message: impl AsRef<str>) {
        if let Some(mut f) = self.file.as_ref() {
            let ts = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            let line = format!("{} {}\n", ts, message.as_ref());
            f.write_all(line.as_bytes()).ok();
        }
    }
}
