use crate::network::ExecuteError;
use crate::reply::ReplyTag;

/// Caller errors at the flattened boundary
///
/// A contract violation stops the current call and leaves every other resource untouched.
/// It is never used for Redis error replies, these are regular data tagged [ReplyTag::Error].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractViolation {
    /// A length or count declared by the caller was negative
    #[error("negative length: {0}")]
    NegativeLength(i64),

    /// A single argument does not fit the 32 bit length prefix
    #[error("argument of {0} bytes exceeds the length prefix")]
    ArgumentTooLong(usize),

    /// Commands require at least the command name
    #[error("command without arguments")]
    ZeroArguments,

    /// Argument slot was allocated but never set
    #[error("argument slot {0} was never set")]
    UnsetArgument(usize),

    /// Index outside the array or argument vector
    #[error("index {index} out of bounds (length {length})")]
    IndexOutOfBounds { index: usize, length: usize },

    /// Element access on a reply that is not an array
    #[error("reply of type {0:?} has no elements")]
    NotAnArray(ReplyTag),

    /// Payload requested from Integer, Nil or Array reply
    #[error("reply of type {0:?} carries no byte payload")]
    NoPayload(ReplyTag),

    /// Output buffer of the deferred path is smaller than the payload
    #[error("output buffer of {capacity} bytes cannot hold {needed} bytes")]
    OutputTooSmall { needed: usize, capacity: usize },

    /// Handle was already released or never issued
    #[error("stale or released reply handle")]
    StaleHandle,

    /// Required pointer argument was null
    #[error("null pointer for {0}")]
    NullPointer(&'static str),
}

/// Failure of a single boundary operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShimError {
    #[error(transparent)]
    Contract(#[from] ContractViolation),

    /// Connection level failure, the session is unusable afterwards
    #[error("connection failure: {0}")]
    Connection(#[from] ExecuteError),
}
