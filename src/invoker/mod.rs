//! Issues commands on a connection and flattens the reply into the caller buffer
//!
//! ```
//! use redis_shim::argv::{ArgumentVector, Command};
//! use redis_shim::invoker::{invoke, CommandExecutor};
//! use redis_shim::network::ExecuteError;
//! use redis_shim::reply::{Reply, ReplyTag};
//!
//! struct Echo;
//!
//! impl CommandExecutor for Echo {
//!     fn execute(&mut self, command: Command) -> Result<Reply, ExecuteError> {
//!         Ok(Reply::Status(command.arguments()[1].clone().into_bytes()))
//!     }
//! }
//!
//! let mut buffer = [0u8; 16];
//! let outcome = invoke(&mut Echo, ArgumentVector::from_args(["ECHO", "hello"]).unwrap(), &mut buffer).unwrap();
//!
//! assert_eq!(ReplyTag::Status, outcome.flat.tag);
//! assert_eq!(b"hello", &buffer[..outcome.flat.len]);
//! ```
use crate::argv::{ArgumentVector, Command};
use crate::error::ShimError;
use crate::network::ExecuteError;
use crate::reply::{flatten_reply, Reply, ReplyOutcome};


/// Executes a single positional command and returns the complete reply
///
/// Implemented by [Connection](crate::network::Connection). Error replies of the server are
/// regular `Ok` values, only connection level failures are errors.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait CommandExecutor {
    fn execute(&mut self, command: Command) -> Result<Reply, ExecuteError>;
}

/// Runs the command given by `argv` and flattens the reply
///
/// The argument vector is consumed in any case. On success the reply was either fully copied to
/// `buffer` (and released) or is returned as handle.
pub fn invoke<E: CommandExecutor + ?Sized>(
    executor: &mut E,
    argv: ArgumentVector,
    buffer: &mut [u8],
) -> Result<ReplyOutcome, ShimError> {
    let command = argv.into_command().map_err(|violation| {
        tracing::warn!(%violation, "rejected argument vector");
        violation
    })?;

    tracing::debug!(
        command = %String::from_utf8_lossy(command.name()),
        arguments = command.len(),
        "issuing command"
    );

    let reply = executor.execute(command)?;
    Ok(flatten_reply(reply, buffer))
}
