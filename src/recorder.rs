// ===============================
// src/recorder.rs
// ===============================
//
// Lightweight JSONL recorder:
// - Appends every Event to a .jsonl file.
// - BufWriter to keep syscalls down, flushed every 1000 events.
// - Creates the parent directory if missing.
// - On a failed write, reopens the file once and retries; if that also
//   fails the event is dropped.
//
// ENV: set `RECORD_FILE=/path/to/events.jsonl` to enable (see main.rs).

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::{error, info};

use crate::domain::Event;

const FLUSH_EVERY_N_EVENTS: u32 = 1000;

pub struct Recorder {
    path: String,
    writer: BufWriter<File>,
    since_last_flush: u32,
}

fn open_writer(path: &str) -> io::Result<BufWriter<File>> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(BufWriter::new(file))
}

impl Recorder {
    pub fn open(path: &str) -> io::Result<Self> {
        let writer = open_writer(path)?;
        info!(%path, "recorder: started");
        Ok(Self {
            path: path.to_string(),
            writer,
            since_last_flush: 0,
        })
    }

    pub fn record(&mut self, ev: &Event) {
        let line = match serde_json::to_string(ev) {
            Ok(s) => s,
            Err(e) => {
                error!(?e, "recorder: serialize error, skip event");
                return;
            }
        };

        if self.write_line(&line).is_err() {
            error!("recorder: write failed, attempting reopen");
            match open_writer(&self.path) {
                Ok(w) => {
                    self.writer = w;
                    if self.write_line(&line).is_err() {
                        error!("recorder: write failed again after reopen, drop event");
                        return;
                    }
                }
                Err(e) => {
                    error!(?e, "recorder: reopen failed, drop event");
                    return;
                }
            }
        }

        self.since_last_flush += 1;
        if self.since_last_flush >= FLUSH_EVERY_N_EVENTS {
            let _ = self.writer.flush();
            self.since_last_flush = 0;
        }
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")
    }

    pub fn flush(&mut self) {
        let _ = self.writer.flush();
        self.since_last_flush = 0;
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.flush();
    }
}
