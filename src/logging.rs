//! Tracing setup.
//!
//! Library code logs through `tracing`. In the browser the formatted lines are
//! forwarded to `console.log`/`console.warn`; natively they go to stderr.

use std::io::{self, Write};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Line writer that hands each completed write to the browser console.
pub struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl Write for ConsoleWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&self.buf);
        emit(self.level, line.trim_end());
        self.buf.clear();
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    if level <= Level::WARN {
        web_sys::console::warn_1(&value);
    } else {
        web_sys::console::log_1(&value);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_level: Level, line: &str) {
    eprintln!("{}", line);
}

#[derive(Clone, Copy, Default)]
pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: Level::INFO,
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: *meta.level(),
            buf: Vec::new(),
        }
    }
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(max_level: Level) {
    let result = tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_writer(ConsoleMakeWriter)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .try_init();

    if result.is_ok() {
        tracing::debug!("logging initialized");
    }
}
