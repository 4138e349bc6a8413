use crate::client::tests::expect;
use crate::client::{ClientError, Jitter, RedisClient, RetryPolicy, Value};
use crate::invoker::MockCommandExecutor;
use crate::reply::Reply;
use bytes::Bytes;
use core::time::Duration;
use mockall::Sequence;

fn ok() -> Reply {
    Reply::Status(Bytes::from_static(b"OK"))
}

fn queued() -> Reply {
    Reply::Status(Bytes::from_static(b"QUEUED"))
}

fn policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        delay: Duration::ZERO,
        max_retries,
        jitter: Jitter::Predictable,
    }
}

/// Expects one attempt of WATCH / MULTI / INCR / EXEC
fn expect_attempt(executor: &mut MockCommandExecutor, sequence: &mut Sequence, exec: Reply) {
    expect(executor, sequence, &["WATCH", "counter"], ok());
    expect(executor, sequence, &["MULTI"], ok());
    expect(executor, sequence, &["INCR", "counter"], queued());
    expect(executor, sequence, &["EXEC"], exec);
}

fn run(client: &mut RedisClient<MockCommandExecutor>, max_retries: u32) -> Result<Vec<Value>, ClientError> {
    client.transaction(
        "increment",
        &policy(max_retries),
        |client| client.command(["WATCH", "counter"]).map(|_| ()),
        |client| client.command(["INCR", "counter"]).map(|_| ()),
    )
}

#[test]
fn test_transaction_first_attempt() {
    let mut executor = MockCommandExecutor::new();
    let mut sequence = Sequence::new();
    expect_attempt(&mut executor, &mut sequence, Reply::Array(vec![Reply::Integer(1)]));
    let mut client = RedisClient::new(executor);

    assert_eq!(vec![Value::Integer(1)], run(&mut client, 0).unwrap());
}

#[test]
fn test_transaction_retried_after_abort() {
    let mut executor = MockCommandExecutor::new();
    let mut sequence = Sequence::new();
    expect_attempt(&mut executor, &mut sequence, Reply::Nil);
    expect_attempt(&mut executor, &mut sequence, Reply::Nil);
    expect_attempt(&mut executor, &mut sequence, Reply::Array(vec![Reply::Integer(3)]));
    let mut client = RedisClient::new(executor);

    assert_eq!(vec![Value::Integer(3)], run(&mut client, 2).unwrap());
}

#[test]
fn test_transaction_retries_exhausted() {
    let mut executor = MockCommandExecutor::new();
    let mut sequence = Sequence::new();
    expect_attempt(&mut executor, &mut sequence, Reply::Nil);
    expect_attempt(&mut executor, &mut sequence, Reply::Nil);
    let mut client = RedisClient::new(executor);

    assert_eq!(
        ClientError::TransactionFailed("increment".to_string()),
        run(&mut client, 1).unwrap_err()
    );
}

#[test]
fn test_transaction_discarded_on_error() {
    let mut executor = MockCommandExecutor::new();
    let mut sequence = Sequence::new();
    expect(&mut executor, &mut sequence, &["MULTI"], ok());
    expect(&mut executor, &mut sequence, &["DISCARD"], ok());
    let mut client = RedisClient::new(executor);

    let result = client.transaction(
        "failing",
        &policy(3),
        |_| Ok(()),
        |_| Err(ClientError::UnexpectedType("integer")),
    );

    assert_eq!(ClientError::UnexpectedType("integer"), result.unwrap_err());
}

#[test]
fn test_backoff_predictable() {
    let policy = RetryPolicy {
        delay: Duration::from_millis(100),
        max_retries: 1,
        jitter: Jitter::Predictable,
    };

    assert_eq!(Duration::from_millis(100), policy.backoff());
}

#[test]
fn test_backoff_randomized_range() {
    let policy = RetryPolicy {
        delay: Duration::from_millis(100),
        max_retries: 1,
        jitter: Jitter::Randomized,
    };

    for _ in 0..100 {
        let delay = policy.backoff();
        assert!(delay >= Duration::from_millis(10));
        assert!(delay <= Duration::from_millis(100));
    }
}
