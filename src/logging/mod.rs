//! Injectable log output
//!
//! The crate reports through [tracing]. Hosts receive the formatted lines through a [LogSink], e.g. a
//! C function pointer registered with `RedisShim_SetLogCallback`.
//!
//! The default level passed to [subscriber] can be refined with `RUST_LOG` directives, for example
//! `RUST_LOG=redis_shim::reply=trace`. For the directive syntax see the
//! [tracing_subscriber](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html#directives)
//! documentation.
//!
//! ```
//! use redis_shim::logging::{install, LevelFilter};
//! use tracing::Level;
//!
//! install(|level: Level, message: &str| eprintln!("[{level}] {message}"), LevelFilter::INFO).unwrap();
//! ```
use std::io;
use std::sync::Arc;
use tracing::{Level, Metadata, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

pub use tracing::level_filters::LevelFilter;

#[cfg(test)]
pub(crate) mod tests;

/// Receiver of formatted log lines
pub trait LogSink: Send + Sync {
    fn log(&self, level: Level, message: &str);
}

impl<F> LogSink for F
where
    F: Fn(Level, &str) + Send + Sync,
{
    fn log(&self, level: Level, message: &str) {
        self(level, message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoggingError {
    /// Global default subscriber was already set
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled,
}

/// Creates a subscriber forwarding every enabled event to `sink`
pub fn subscriber<S: LogSink + 'static>(sink: S, default_level: LevelFilter) -> impl Subscriber + Send + Sync + 'static {
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_target(true)
        .with_level(false) // passed to the sink separately
        .without_time()
        .with_env_filter(env_filter)
        .with_writer(MakeSinkWriter { sink: Arc::new(sink) })
        .finish()
}

/// Installs the sink as global default
pub fn install<S: LogSink + 'static>(sink: S, default_level: LevelFilter) -> Result<(), LoggingError> {
    tracing::subscriber::set_global_default(subscriber(sink, default_level)).map_err(|_| LoggingError::AlreadyInstalled)
}

struct MakeSinkWriter<S> {
    sink: Arc<S>,
}

impl<'a, S: LogSink + 'static> MakeWriter<'a> for MakeSinkWriter<S> {
    type Writer = SinkWriter<S>;

    fn make_writer(&'a self) -> Self::Writer {
        SinkWriter::new(self.sink.clone(), Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        SinkWriter::new(self.sink.clone(), *meta.level())
    }
}

/// Collects one formatted event, handed to the sink on drop
struct SinkWriter<S: LogSink> {
    sink: Arc<S>,
    level: Level,
    line: Vec<u8>,
}

impl<S: LogSink> SinkWriter<S> {
    fn new(sink: Arc<S>, level: Level) -> Self {
        SinkWriter {
            sink,
            level,
            line: Vec::new(),
        }
    }
}

impl<S: LogSink> io::Write for SinkWriter<S> {
    fn write(&mut self, input: &[u8]) -> io::Result<usize> {
        self.line.extend_from_slice(input);
        Ok(input.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: LogSink> Drop for SinkWriter<S> {
    fn drop(&mut self) {
        let message = String::from_utf8_lossy(&self.line);
        let message = message.trim_end();
        if !message.is_empty() {
            self.sink.log(self.level, message);
        }
    }
}
