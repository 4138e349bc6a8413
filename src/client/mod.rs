//! Native driver on top of the flattened calling convention
//!
//! [RedisClient] consumes replies exactly like a host on the other side of the C ABI: the reply is
//! flattened into a small scratch buffer first, deferred payloads and array elements are fetched
//! afterwards and the reply is released once everything was read.
//!
//! ```no_run
//! use core::time::Duration;
//! use redis_shim::client::RedisClient;
//! use std::collections::HashMap;
//!
//! let mut client = RedisClient::connect("127.0.0.1", 6379, Duration::from_secs(1)).unwrap();
//!
//! client.command(["HSET", "user:1", "name", "Ada"]).unwrap();
//! let user: HashMap<String, String> = client.command_as(["HGETALL", "user:1"]).unwrap();
//! let visits: i64 = client.command_as(["INCR", "visits"]).unwrap();
//!
//! client.disconnect();
//! ```
pub mod convert;
pub mod transaction;

#[cfg(test)]
pub(crate) mod tests;

pub use convert::FromValue;
pub use transaction::{Jitter, RetryPolicy};

use crate::argv::ArgumentVector;
use crate::error::ShimError;
use crate::invoker::{invoke, CommandExecutor};
use crate::network::{connect_std, ConnectionError, StdConnection};
use crate::reply::{copy_element_payload, flatten_path, Flattened, ReplyHandle, ReplyTag};
use bytes::Bytes;
use core::time::Duration;

/// Default size of the scratch buffer
pub const DEFAULT_BUFFER_CAPACITY: usize = 64;

/// Reply value as seen by the native driver. Error replies are mapped to [ClientError::Server].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Nil,
    Integer(i64),
    Status(Bytes),
    Bytes(Bytes),
    Array(Vec<Value>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Shim(#[from] ShimError),

    #[error(transparent)]
    Connect(#[from] ConnectionError),

    /// Error reply sent by the server
    #[error("server error: {0}")]
    Server(String),

    /// Reply could not be converted to the requested type
    #[error("unexpected reply, expected {0}")]
    UnexpectedType(&'static str),

    /// Transaction was aborted more often than the retry policy allows
    #[error("transaction failed: {0}")]
    TransactionFailed(String),
}

/// Client issuing positional commands on a [CommandExecutor]
#[derive(Debug)]
pub struct RedisClient<E: CommandExecutor> {
    executor: E,
    buffer: Vec<u8>,
}

impl RedisClient<StdConnection> {
    /// Connects on the std network stack. The timeout applies to connect and every command.
    pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self::new(connect_std(host, port, timeout)?))
    }

    /// Closes the connection
    pub fn disconnect(self) {
        self.executor.disconnect();
    }
}

impl<E: CommandExecutor> RedisClient<E> {
    pub fn new(executor: E) -> Self {
        RedisClient {
            executor,
            buffer: vec![0; DEFAULT_BUFFER_CAPACITY],
        }
    }

    /// Changes the size of the scratch buffer. Larger payloads take the deferred path.
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer = vec![0; capacity];
        self
    }

    /// Executes the command and reads the complete reply
    pub fn command<I, A>(&mut self, args: I) -> Result<Value, ClientError>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        let argv = ArgumentVector::from_args(args).map_err(ShimError::from)?;
        let outcome = invoke(&mut self.executor, argv, &mut self.buffer)?;

        match outcome.handle {
            None => scalar(outcome.flat, payload(&outcome.flat, &self.buffer)),
            Some(handle) => {
                let value = read(&handle, &mut Vec::new(), &mut self.buffer);
                handle.release();
                value
            }
        }
    }

    /// Executes the command and converts the reply
    pub fn command_as<T, I, A>(&mut self, args: I) -> Result<T, ClientError>
    where
        T: FromValue,
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        T::from_value(self.command(args)?)
    }

    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    pub fn into_inner(self) -> E {
        self.executor
    }
}

/// Reads the element at `path` (the reply itself if empty), fetching deferred payloads
fn read(handle: &ReplyHandle, path: &mut Vec<usize>, scratch: &mut [u8]) -> Result<Value, ClientError> {
    let element = flatten_path(handle, path, scratch).map_err(ShimError::from)?;
    let flat = element.flat;

    if flat.tag == ReplyTag::Array {
        let mut values = Vec::with_capacity(flat.elements);
        for index in 0..flat.elements {
            path.push(index);
            let value = read(handle, path, scratch);
            path.pop();
            values.push(value?);
        }
        return Ok(Value::Array(values));
    }

    if element.deferred {
        let mut data = vec![0u8; flat.len];
        copy_element_payload(handle, path, &mut data).map_err(ShimError::from)?;
        return scalar(flat, Bytes::from(data));
    }

    scalar(flat, payload(&flat, scratch))
}

fn payload(flat: &Flattened, scratch: &[u8]) -> Bytes {
    if flat.copied {
        Bytes::copy_from_slice(&scratch[..flat.len])
    } else {
        Bytes::new()
    }
}

fn scalar(flat: Flattened, payload: Bytes) -> Result<Value, ClientError> {
    match flat.tag {
        ReplyTag::Nil => Ok(Value::Nil),
        ReplyTag::Integer => Ok(Value::Integer(flat.integer)),
        ReplyTag::Status => Ok(Value::Status(payload)),
        ReplyTag::BulkString => Ok(Value::Bytes(payload)),
        ReplyTag::Error => Err(ClientError::Server(String::from_utf8_lossy(&payload).into_owned())),
        ReplyTag::Array => Err(ClientError::UnexpectedType("scalar")),
    }
}
