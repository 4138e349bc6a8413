use crate::ffi::argv::{RedisShim_ArgvNew, RedisShim_ArgvSet, RedisShimArgv};
use crate::ffi::connection::{RedisShim_Command, RedisShim_Connect, RedisShim_Disconnect, RedisShimConnection};
use crate::ffi::registry::NO_REPLY;
use crate::ffi::reply::{RedisShim_ArrayElement, RedisShim_CopyPayload, RedisShim_ReleaseReply};
use crate::ffi::{RedisShimOutcome, RedisShimStatus};
use crate::reply::ReplyTag;
use core::ptr;
use core::time::Duration;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Instant;

/// Fake server answering each expected request with the given response
fn serve(exchanges: Vec<(&'static [u8], &'static [u8])>) -> (u16, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        for (request, response) in exchanges {
            let mut received = vec![0u8; request.len()];
            stream.read_exact(&mut received).unwrap();
            assert_eq!(request, received.as_slice());
            stream.write_all(response).unwrap();
        }
    });

    (port, server)
}

fn connect(port: u16) -> *mut RedisShimConnection {
    let host = b"127.0.0.1";
    let mut conn = ptr::null_mut();
    let status = unsafe { RedisShim_Connect(host.as_ptr(), host.len() as i64, port, 2, 0, &mut conn) };
    assert_eq!(RedisShimStatus::Ok, status);
    conn
}

fn argv(args: &[&[u8]]) -> *mut RedisShimArgv {
    let mut argv = ptr::null_mut();
    assert_eq!(RedisShimStatus::Ok, unsafe { RedisShim_ArgvNew(args.len() as i64, &mut argv) });
    for (index, arg) in args.iter().enumerate() {
        let status = unsafe { RedisShim_ArgvSet(argv, index as i64, arg.as_ptr(), arg.len() as i64) };
        assert_eq!(RedisShimStatus::Ok, status);
    }
    argv
}

fn outcome() -> RedisShimOutcome {
    RedisShimOutcome {
        tag: ReplyTag::Nil,
        integer: 0,
        len: 0,
        elements: 0,
        copied: false,
        deferred: false,
        reply: NO_REPLY,
    }
}

#[test]
fn test_connect_refused() {
    let host = b"127.0.0.1";
    let mut conn = ptr::null_mut();

    let status = unsafe { RedisShim_Connect(host.as_ptr(), host.len() as i64, 1, 1, 0, &mut conn) };

    assert_eq!(RedisShimStatus::ConnectionError, status);
    assert!(conn.is_null());
}

#[test]
fn test_connect_timeout_on_unresponsive_host() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();

    // Fill the accept queue, further SYNs are dropped
    let mut queued = Vec::new();
    while queued.len() < 1024 {
        match TcpStream::connect_timeout(&address, Duration::from_millis(200)) {
            Ok(stream) => queued.push(stream),
            Err(_) => break,
        }
    }
    if queued.len() == 1024 {
        return;
    }

    let host = b"127.0.0.1";
    let mut conn = ptr::null_mut();
    let started = Instant::now();
    let status = unsafe { RedisShim_Connect(host.as_ptr(), host.len() as i64, address.port(), 1, 0, &mut conn) };

    assert_eq!(RedisShimStatus::ConnectionError, status);
    assert!(conn.is_null());
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_connect_invalid_arguments() {
    let mut conn = ptr::null_mut();

    assert_eq!(RedisShimStatus::ContractViolation, unsafe {
        RedisShim_Connect(ptr::null(), 9, 6379, 0, 0, &mut conn)
    });
    assert_eq!(RedisShimStatus::ContractViolation, unsafe {
        RedisShim_Connect(b"localhost".as_ptr(), -1, 6379, 0, 0, &mut conn)
    });
    assert_eq!(RedisShimStatus::ContractViolation, unsafe {
        RedisShim_Connect(b"localhost".as_ptr(), 9, 6379, 0, 0, ptr::null_mut())
    });
    assert!(conn.is_null());
}

#[test]
fn test_command_without_connection() {
    let mut result = outcome();
    let mut buffer = [0u8; 8];

    // Vector is consumed even though the call is rejected
    let status = unsafe {
        RedisShim_Command(ptr::null_mut(), argv(&[b"PING"]), buffer.as_mut_ptr(), 8, &mut result)
    };

    assert_eq!(RedisShimStatus::ContractViolation, status);
}

#[test]
fn test_disconnect_null() {
    unsafe { RedisShim_Disconnect(ptr::null_mut()) };
}

#[test]
fn test_session() {
    let (port, server) = serve(vec![
        (&b"*1\r\n$4\r\nPING\r\n"[..], &b"+PONG\r\n"[..]),
        (&b"*2\r\n$4\r\nECHO\r\n$8\r\nhi\0there\r\n"[..], &b"$8\r\nhi\0there\r\n"[..]),
        (&b"*4\r\n$6\r\nLRANGE\r\n$1\r\nl\r\n$1\r\n0\r\n$2\r\n-1\r\n"[..], &b"*2\r\n:7\r\n$2\r\nok\r\n"[..]),
        (&b"*1\r\n$3\r\nFOO\r\n"[..], &b"-ERR unknown\r\n"[..]),
    ]);
    let conn = connect(port);
    let mut buffer = [0u8; 8];

    // Status copied
    let mut result = outcome();
    let status = unsafe { RedisShim_Command(conn, argv(&[b"PING"]), buffer.as_mut_ptr(), 8, &mut result) };
    assert_eq!(RedisShimStatus::Ok, status);
    assert_eq!(ReplyTag::Status, result.tag);
    assert!(result.copied);
    assert_eq!(NO_REPLY, result.reply);
    assert_eq!(b"PONG\0", &buffer[..5]);

    // Payload of capacity length is deferred
    let mut result = outcome();
    let status = unsafe {
        RedisShim_Command(conn, argv(&[b"ECHO", b"hi\0there"]), buffer.as_mut_ptr(), 8, &mut result)
    };
    assert_eq!(RedisShimStatus::Ok, status);
    assert_eq!(ReplyTag::BulkString, result.tag);
    assert_eq!(8, result.len);
    assert!(!result.copied);
    assert!(result.deferred);

    let mut payload = [0u8; 8];
    let status = unsafe { RedisShim_CopyPayload(result.reply, payload.as_mut_ptr(), 8) };
    assert_eq!(RedisShimStatus::Ok, status);
    assert_eq!(b"hi\0there", &payload);
    assert_eq!(RedisShimStatus::Ok, RedisShim_ReleaseReply(result.reply));

    // Arrays are always deferred
    let mut result = outcome();
    let status = unsafe {
        RedisShim_Command(conn, argv(&[b"LRANGE", b"l", b"0", b"-1"]), buffer.as_mut_ptr(), 8, &mut result)
    };
    assert_eq!(RedisShimStatus::Ok, status);
    assert_eq!(ReplyTag::Array, result.tag);
    assert_eq!(2, result.elements);
    assert!(!result.deferred);
    assert_ne!(NO_REPLY, result.reply);

    let mut element = outcome();
    let status = unsafe { RedisShim_ArrayElement(result.reply, 0, buffer.as_mut_ptr(), 8, &mut element) };
    assert_eq!(RedisShimStatus::Ok, status);
    assert_eq!(7, element.integer);
    assert_eq!(RedisShimStatus::Ok, RedisShim_ReleaseReply(result.reply));

    // Server errors are data
    let mut result = outcome();
    let status = unsafe { RedisShim_Command(conn, argv(&[b"FOO"]), buffer.as_mut_ptr(), 8, &mut result) };
    assert_eq!(RedisShimStatus::Ok, status);
    assert_eq!(ReplyTag::Error, result.tag);
    assert_eq!(11, result.len);
    assert!(result.deferred);
    assert_eq!(RedisShimStatus::Ok, RedisShim_ReleaseReply(result.reply));

    unsafe { RedisShim_Disconnect(conn) };
    server.join().unwrap();
}
