use gloo::console::log;
use std::io;
use tracing::Level;

// Buffers one formatted event and hands it to the browser console when the
// formatter drops the writer.
#[derive(Default)]
pub struct ConsoleWriter(Vec<u8>);

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.0.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.0);
        log!(line.trim_end().to_string());
    }
}

pub fn init() {
    // No wall clock in wasm32-unknown-unknown, so events carry no timestamp
    let subscriber = tracing_subscriber::fmt()
        .json()
        .without_time()
        .with_max_level(Level::DEBUG)
        .with_writer(ConsoleWriter::default)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        log!(format!("Failed to install tracing subscriber: {}", err));
    }
}
