use crate::client::tests::expect;
use crate::client::{ClientError, RedisClient, Value};
use crate::error::{ContractViolation, ShimError};
use crate::invoker::MockCommandExecutor;
use crate::network::ExecuteError;
use crate::reply::Reply;
use bytes::Bytes;
use mockall::Sequence;

fn client(args: &'static [&'static str], reply: Reply) -> RedisClient<MockCommandExecutor> {
    let mut executor = MockCommandExecutor::new();
    expect(&mut executor, &mut Sequence::new(), args, reply);
    RedisClient::new(executor)
}

#[test]
fn test_command_status() {
    let mut client = client(&["SET", "key", "value"], Reply::Status(Bytes::from_static(b"OK")));

    let value = client.command(["SET", "key", "value"]).unwrap();
    assert_eq!(Value::Status(Bytes::from_static(b"OK")), value);
}

#[test]
fn test_command_integer() {
    let mut client = client(&["INCR", "counter"], Reply::Integer(42));

    assert_eq!(Value::Integer(42), client.command(["INCR", "counter"]).unwrap());
}

#[test]
fn test_command_nil() {
    let mut client = client(&["GET", "missing"], Reply::Nil);

    assert_eq!(Value::Nil, client.command(["GET", "missing"]).unwrap());
}

#[test]
fn test_command_large_payload_deferred() {
    let payload = Bytes::from(vec![b'x'; 1000]);
    let mut client = client(&["GET", "large"], Reply::BulkString(payload.clone()));

    assert_eq!(Value::Bytes(payload), client.command(["GET", "large"]).unwrap());
}

#[test]
fn test_command_zero_capacity_buffer() {
    let mut client = client(&["GET", "key"], Reply::BulkString(Bytes::from_static(b"v"))).with_buffer_capacity(0);

    assert_eq!(Value::Bytes(Bytes::from_static(b"v")), client.command(["GET", "key"]).unwrap());
}

#[test]
fn test_command_nested_array() {
    let reply = Reply::Array(vec![
        Reply::Integer(7),
        Reply::BulkString(Bytes::from_static(b"ok")),
        Reply::Nil,
        Reply::Array(vec![Reply::BulkString(Bytes::from(vec![b'y'; 100]))]),
    ]);
    let mut client = client(&["EXEC"], reply);

    let value = client.command(["EXEC"]).unwrap();
    assert_eq!(
        Value::Array(vec![
            Value::Integer(7),
            Value::Bytes(Bytes::from_static(b"ok")),
            Value::Nil,
            Value::Array(vec![Value::Bytes(Bytes::from(vec![b'y'; 100]))]),
        ]),
        value
    );
}

#[test]
fn test_command_server_error() {
    let mut client = client(&["FOO"], Reply::Error(Bytes::from_static(b"ERR unknown command 'FOO'")));

    assert_eq!(
        ClientError::Server("ERR unknown command 'FOO'".to_string()),
        client.command(["FOO"]).unwrap_err()
    );
}

#[test]
fn test_command_connection_error() {
    let mut executor = MockCommandExecutor::new();
    executor.expect_execute().times(1).returning(|_| Err(ExecuteError::ConnectionClosed));
    let mut client = RedisClient::new(executor);

    assert_eq!(
        ClientError::Shim(ShimError::Connection(ExecuteError::ConnectionClosed)),
        client.command(["PING"]).unwrap_err()
    );
}

#[test]
fn test_command_without_arguments() {
    let mut client = RedisClient::new(MockCommandExecutor::new());

    assert_eq!(
        ClientError::Shim(ShimError::Contract(ContractViolation::ZeroArguments)),
        client.command(Vec::<&str>::new()).unwrap_err()
    );
}

#[test]
fn test_command_as_typed() {
    let mut client = client(&["GET", "name"], Reply::BulkString(Bytes::from_static(b"Ada")));

    let name: Option<String> = client.command_as(["GET", "name"]).unwrap();
    assert_eq!(Some("Ada".to_string()), name);
}

#[test]
fn test_command_binary_arguments() {
    let mut executor = MockCommandExecutor::new();
    executor
        .expect_execute()
        .withf(|command| command.arguments()[1].as_bytes() == b"k\0ey")
        .returning(|_| Ok(Reply::Integer(1)));
    let mut client = RedisClient::new(executor);

    let args: [&[u8]; 2] = [b"EXISTS", b"k\0ey"];
    let exists: i64 = client.command_as(args).unwrap();
    assert_eq!(1, exists);
}
