use crate::error::ContractViolation;
use crate::ffi::argv::RedisShimArgv;
use crate::ffi::registry::{registry, NO_REPLY};
use crate::ffi::{input, output, write_out, RedisShimOutcome, RedisShimStatus};
use crate::invoker::invoke;
use crate::network::timeout::from_parts;
use crate::network::{connect_std, StdConnection};
use crate::reply::ReplyTag;

/// Open connection, opaque to the host
#[derive(Debug)]
pub struct RedisShimConnection {
    pub(crate) inner: StdConnection,
}

/// Connects to `host:port`
///
/// The timeout is given as whole seconds plus microsecond remainder and applies to connect and to
/// every command. Zero disables the timeout.
///
/// # Safety
/// `host` must be valid for reads of `host_len` bytes. `out_conn` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn RedisShim_Connect(
    host: *const u8,
    host_len: i64,
    port: u16,
    timeout_seconds: u32,
    timeout_micros: u32,
    out_conn: *mut *mut RedisShimConnection,
) -> RedisShimStatus {
    let host = match unsafe { input(host, host_len, "host") } {
        Ok(host) => host,
        Err(violation) => return violation.into(),
    };
    if out_conn.is_null() {
        return ContractViolation::NullPointer("out_conn").into();
    }

    let Ok(host) = core::str::from_utf8(host) else {
        tracing::warn!("host name is not valid UTF-8");
        return RedisShimStatus::ConnectionError;
    };

    match connect_std(host, port, from_parts(timeout_seconds, timeout_micros)) {
        Ok(connection) => {
            let connection = Box::new(RedisShimConnection { inner: connection });
            unsafe { out_conn.write(Box::into_raw(connection)) };
            RedisShimStatus::Ok
        }
        Err(error) => {
            tracing::warn!(host, port, %error, "connect failed");
            RedisShimStatus::ConnectionError
        }
    }
}

/// Closes the connection and releases it
///
/// # Safety
/// `conn` must be null or returned by [RedisShim_Connect] and not yet disconnected.
#[no_mangle]
pub unsafe extern "C" fn RedisShim_Disconnect(conn: *mut RedisShimConnection) {
    if !conn.is_null() {
        unsafe { Box::from_raw(conn) }.inner.disconnect();
    }
}

/// Executes the command held by `argv`
///
/// `argv` is consumed in any case and must not be used afterwards. On success `out_outcome` holds
/// the flattened reply. If its `reply` key is set, the host must release it with
/// `RedisShim_ReleaseReply` (or `RedisShim_TakePayload`).
///
/// # Safety
/// `conn` must be returned by [RedisShim_Connect], `argv` by `RedisShim_ArgvNew`.
/// `buffer` must be valid for writes of `capacity` bytes, `out_outcome` must be valid for writes.
#[no_mangle]
pub unsafe extern "C" fn RedisShim_Command(
    conn: *mut RedisShimConnection,
    argv: *mut RedisShimArgv,
    buffer: *mut u8,
    capacity: i64,
    out_outcome: *mut RedisShimOutcome,
) -> RedisShimStatus {
    if argv.is_null() {
        return ContractViolation::NullPointer("argv").into();
    }
    let argv = unsafe { Box::from_raw(argv) }.inner;

    let Some(conn) = (unsafe { conn.as_mut() }) else {
        return ContractViolation::NullPointer("conn").into();
    };
    if out_outcome.is_null() {
        return ContractViolation::NullPointer("out_outcome").into();
    }
    let buffer = match unsafe { output(buffer, capacity, "buffer") } {
        Ok(buffer) => buffer,
        Err(violation) => return violation.into(),
    };

    let outcome = match invoke(&mut conn.inner, argv, buffer) {
        Ok(outcome) => outcome,
        Err(error) => return error.into(),
    };

    let deferred = outcome.is_deferred() && outcome.flat.tag != ReplyTag::Array;
    let key = match outcome.handle {
        Some(handle) => registry().insert(handle),
        None => NO_REPLY,
    };

    match unsafe { write_out(out_outcome, RedisShimOutcome::new(outcome.flat, deferred, key), "out_outcome") } {
        Ok(()) => RedisShimStatus::Ok,
        Err(violation) => violation.into(),
    }
}
