//! This crate exposes a blocking Redis client through a flattened calling convention, usable from
//! hosts which can neither marshal structures nor call variadic functions.
//!
//! Only primitive types cross the boundary: raw pointers, signed lengths, fixed size buffers and
//! length-prefixed byte arrays. Redis protocol work is done by [redis-protocol](https://docs.rs/redis-protocol),
//! networking by an [embedded-nal](https://docs.rs/embedded-nal) stack.
//!
//! The crate consists of the following parts:
//! * [argv module](crate::argv) for building length-prefixed argument vectors
//! * [invoker module](crate::invoker) for executing a command and capturing the reply
//! * [reply module](crate::reply) for flattening replies into caller buffers and releasing them
//! * [ffi module](crate::ffi) for the `extern "C"` surface
//! * [client module](crate::client) for a native driver on top of the same convention
//!
//! ```no_run
//! use core::time::Duration;
//! use redis_shim::argv::ArgumentVector;
//! use redis_shim::invoker::invoke;
//! use redis_shim::network::connect_std;
//! use redis_shim::reply::copy_full_payload;
//!
//! let mut connection = connect_std("127.0.0.1", 6379, Duration::from_secs(1)).unwrap();
//!
//! let mut buffer = [0u8; 16];
//! let argv = ArgumentVector::from_args(["GET", "key"]).unwrap();
//! let outcome = invoke(&mut connection, argv, &mut buffer).unwrap();
//!
//! if let Some(handle) = outcome.handle {
//!     // Payload did not fit the buffer
//!     let mut payload = vec![0u8; outcome.flat.len];
//!     copy_full_payload(&handle, &mut payload).unwrap();
//!     handle.release();
//! }
//!
//! connection.disconnect();
//! ```
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod argv;
pub mod client;

/// # Error types
///
/// * [ContractViolation](crate::error::ContractViolation): the caller broke the calling contract,
///   e.g. negative length, index out of bounds, stale reply handle
/// * [ShimError](crate::error::ShimError): contract violation or connection level failure of a command
///
/// Error replies of the server are not errors. They are regular replies tagged
/// [ReplyTag::Error](crate::reply::ReplyTag::Error).
pub mod error;

pub mod ffi;
pub mod invoker;
pub mod logging;

/// # Connection handling
///
/// A connection is opened by [ConnectionHandler](crate::network::ConnectionHandler), which requires:
/// * A network stack implementing [embedded-nal](<https://docs.rs/embedded-nal/latest/embedded_nal/>)
/// * A clock implementing [embedded-time](<https://docs.rs/embedded-time/latest/embedded_time/>)
///
/// [connect_std](crate::network::connect_std) uses [StdStack](crate::network::StdStack) and the system clock.
/// The std stack waits in the kernel while no data is available, so a blocking command does not
/// occupy a CPU core.
///
/// ```no_run
///# use core::time::Duration;
///# use redis_shim::network::ConnectionHandler;
///# use redis_shim::network::StdStack;
///# use std_embedded_time::StandardClock;
///#
/// let timeout = Duration::from_millis(500);
/// let connection = ConnectionHandler::new("127.0.0.1", 6379)
///     .timeout(timeout)
///     .connect(StdStack::with_connect_timeout(timeout), StandardClock::default())
///     .unwrap();
/// ```
///
/// ### Timeout
///
/// The timeout is passed at connect and applies to connect and to every command round trip.
/// A zero timeout disables it.
///
/// ### Connection failures
///
/// Only one command is in flight at a time. If a round trip fails (timeout, network error, protocol
/// violation), the assignment of requests and replies can no longer be guaranteed. Every further
/// command fails with [ConnectionBroken](crate::network::ExecuteError::ConnectionBroken).
pub mod network;

pub mod reply;
