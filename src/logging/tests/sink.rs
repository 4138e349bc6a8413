use crate::argv::ArgumentVector;
use crate::invoker::{invoke, MockCommandExecutor};
use crate::logging::{subscriber, LevelFilter};
use crate::reply::Reply;
use std::sync::{Arc, Mutex};
use tracing::Level;

type Lines = Arc<Mutex<Vec<(Level, String)>>>;

fn recording_sink() -> (impl Fn(Level, &str) + Send + Sync + 'static, Lines) {
    let lines: Lines = Arc::new(Mutex::new(Vec::new()));
    let target = lines.clone();

    let sink = move |level: Level, message: &str| target.lock().unwrap().push((level, message.to_string()));
    (sink, lines)
}

#[test]
fn test_sink_receives_enabled_events() {
    let (sink, lines) = recording_sink();

    tracing::subscriber::with_default(subscriber(sink, LevelFilter::DEBUG), || {
        tracing::debug!(answer = 42, "first message");
        tracing::trace!("filtered message");
    });

    let lines = lines.lock().unwrap();
    assert_eq!(1, lines.len());
    assert_eq!(Level::DEBUG, lines[0].0);
    assert!(lines[0].1.contains("first message"));
    assert!(lines[0].1.contains("answer=42"));
}

#[test]
fn test_sink_one_line_per_event() {
    let (sink, lines) = recording_sink();

    tracing::subscriber::with_default(subscriber(sink, LevelFilter::WARN), || {
        tracing::warn!("one");
        tracing::error!("two");
        tracing::info!("three");
    });

    let lines = lines.lock().unwrap();
    assert_eq!(2, lines.len());
    assert_eq!(Level::WARN, lines[0].0);
    assert_eq!(Level::ERROR, lines[1].0);
    assert!(!lines[1].1.ends_with('\n'));
}

#[test]
fn test_sink_receives_command_events() {
    let (sink, lines) = recording_sink();

    let mut executor = MockCommandExecutor::new();
    executor.expect_execute().returning(|_| Ok(Reply::Integer(3)));

    tracing::subscriber::with_default(subscriber(sink, LevelFilter::DEBUG), || {
        let mut buffer = [0u8; 8];
        invoke(&mut executor, ArgumentVector::from_args(["INCR", "counter"]).unwrap(), &mut buffer).unwrap();
    });

    let lines = lines.lock().unwrap();
    assert!(lines.iter().any(|(_, line)| line.contains("issuing command") && line.contains("INCR")));
    assert!(lines.iter().any(|(_, line)| line.contains("flattened reply")));
}
