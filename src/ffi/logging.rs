use crate::logging::{install, LevelFilter, LogSink};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Once, RwLock};
use tracing::Level;

/// Receives one formatted log line. `message` is not NUL terminated.
pub type RedisShimLogCallback = unsafe extern "C" fn(level: i32, message: *const u8, len: usize);

static CALLBACK: RwLock<Option<RedisShimLogCallback>> = RwLock::new(None);
static MAX_LEVEL: AtomicU8 = AtomicU8::new(0);
static INSTALL: Once = Once::new();

/// Forwards log lines to the registered C callback
struct CallbackSink;

impl LogSink for CallbackSink {
    fn log(&self, level: Level, message: &str) {
        let level = level_number(level);
        if level > MAX_LEVEL.load(Ordering::Relaxed) {
            return;
        }

        let callback = *CALLBACK.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(callback) = callback {
            unsafe { callback(i32::from(level), message.as_ptr(), message.len()) };
        }
    }
}

/// Registers the log callback, replacing a previous one. Null disables logging.
///
/// `max_level`: 0 = off, 1 = error, 2 = warn, 3 = info, 4 = debug, 5 = trace.
///
/// The subscriber is installed on the first call, its level filter (refined by `RUST_LOG`) is
/// fixed from then on. Later calls can only lower the level.
#[no_mangle]
pub extern "C" fn RedisShim_SetLogCallback(callback: Option<RedisShimLogCallback>, max_level: i32) {
    let max_level = max_level.clamp(0, 5) as u8;

    *CALLBACK.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = callback;
    MAX_LEVEL.store(max_level, Ordering::Relaxed);

    INSTALL.call_once(|| {
        // Host may have installed its own subscriber, which then stays in charge
        let _ = install(CallbackSink, level_filter(max_level));
    });
}

pub(crate) fn level_number(level: Level) -> u8 {
    match level {
        Level::ERROR => 1,
        Level::WARN => 2,
        Level::INFO => 3,
        Level::DEBUG => 4,
        _ => 5,
    }
}

pub(crate) fn level_filter(level: u8) -> LevelFilter {
    match level {
        0 => LevelFilter::OFF,
        1 => LevelFilter::ERROR,
        2 => LevelFilter::WARN,
        3 => LevelFilter::INFO,
        4 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}
