//! C ABI using primitive types only
//!
//! Every fallible function returns a [RedisShimStatus]. Output parameters are only written on
//! [RedisShimStatus::Ok]. Sizes and indexes are signed, negative values are rejected as contract
//! violation instead of being reinterpreted.
//!
//! Typical call sequence of a host:
//! 1. `RedisShim_Connect`
//! 2. `RedisShim_ArgvNew` and one `RedisShim_ArgvSet` per argument
//! 3. `RedisShim_Command`, reading the scalar result from the outcome and the payload from the buffer
//! 4. if the outcome carries a reply key: `RedisShim_ArrayElement` / `RedisShim_CopyPayload` / ...
//!    followed by `RedisShim_ReleaseReply`
//! 5. `RedisShim_Disconnect`
//!
//! The header `include/redis_shim.h` is generated by the build script.
#[allow(non_snake_case)]
pub mod argv;
#[allow(non_snake_case)]
pub mod connection;
#[allow(non_snake_case)]
pub mod logging;
pub mod registry;
#[allow(non_snake_case)]
pub mod reply;

#[cfg(test)]
pub(crate) mod tests;

pub use argv::{RedisShim_ArgvFree, RedisShim_ArgvNew, RedisShim_ArgvSet, RedisShimArgv};
pub use connection::{RedisShim_Command, RedisShim_Connect, RedisShim_Disconnect, RedisShimConnection};
pub use logging::{RedisShim_SetLogCallback, RedisShimLogCallback};
pub use registry::{RedisShimReply, NO_REPLY};
pub use reply::{
    RedisShim_ArrayElement, RedisShim_CopyElementPayload, RedisShim_CopyPayload, RedisShim_NestedElement,
    RedisShim_ReleaseReply, RedisShim_TakePayload,
};

use crate::error::{ContractViolation, ShimError};
use crate::reply::{ElementOutcome, Flattened, ReplyTag};
use core::slice;

/// Result of a C ABI call
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedisShimStatus {
    Ok = 0,
    /// Caller broke the calling contract, nothing was changed
    ContractViolation = 1,
    /// Connect failed or the connection broke during the command
    ConnectionError = 2,
}

/// Flattened reply or reply element
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedisShimOutcome {
    pub tag: ReplyTag,
    /// Value of Integer replies, zero otherwise
    pub integer: i64,
    /// Payload length in bytes
    pub len: u64,
    /// Number of array elements
    pub elements: u64,
    /// Payload was written to the buffer, NUL terminated
    pub copied: bool,
    /// Payload exists but must be fetched with one of the copy functions
    pub deferred: bool,
    /// Key of the deferred reply, [NO_REPLY] for elements and fully consumed replies
    pub reply: RedisShimReply,
}

impl RedisShimOutcome {
    pub(crate) fn new(flat: Flattened, deferred: bool, reply: RedisShimReply) -> Self {
        RedisShimOutcome {
            tag: flat.tag,
            integer: flat.integer,
            len: flat.len as u64,
            elements: flat.elements as u64,
            copied: flat.copied,
            deferred,
            reply,
        }
    }
}

impl From<ElementOutcome> for RedisShimOutcome {
    fn from(outcome: ElementOutcome) -> Self {
        RedisShimOutcome::new(outcome.flat, outcome.deferred, NO_REPLY)
    }
}

impl From<ContractViolation> for RedisShimStatus {
    fn from(violation: ContractViolation) -> Self {
        tracing::warn!(%violation, "contract violation");
        RedisShimStatus::ContractViolation
    }
}

impl From<ShimError> for RedisShimStatus {
    fn from(error: ShimError) -> Self {
        match error {
            ShimError::Contract(violation) => violation.into(),
            ShimError::Connection(_) => RedisShimStatus::ConnectionError,
        }
    }
}

/// Collapses the result of a call into its status
pub(crate) fn status<E: Into<RedisShimStatus>>(result: Result<(), E>) -> RedisShimStatus {
    match result {
        Ok(()) => RedisShimStatus::Ok,
        Err(error) => error.into(),
    }
}

/// Converts a caller declared length or index
pub(crate) fn length(value: i64) -> Result<usize, ContractViolation> {
    usize::try_from(value).map_err(|_| ContractViolation::NegativeLength(value))
}

/// Borrows a caller buffer. Null is accepted for an empty buffer.
///
/// # Safety
/// `data` must be valid for reads of `len` bytes.
pub(crate) unsafe fn input<'a>(data: *const u8, len: i64, name: &'static str) -> Result<&'a [u8], ContractViolation> {
    let len = length(len)?;
    if len == 0 {
        return Ok(&[]);
    }
    if data.is_null() {
        return Err(ContractViolation::NullPointer(name));
    }

    Ok(unsafe { slice::from_raw_parts(data, len) })
}

/// Borrows a writable caller buffer. Null is accepted for an empty buffer.
///
/// # Safety
/// `data` must be valid for writes of `capacity` bytes and must not alias other arguments.
pub(crate) unsafe fn output<'a>(
    data: *mut u8,
    capacity: i64,
    name: &'static str,
) -> Result<&'a mut [u8], ContractViolation> {
    let capacity = length(capacity)?;
    if capacity == 0 {
        return Ok(&mut []);
    }
    if data.is_null() {
        return Err(ContractViolation::NullPointer(name));
    }

    Ok(unsafe { slice::from_raw_parts_mut(data, capacity) })
}

/// Writes an output parameter
///
/// # Safety
/// `target` must be null or valid for writes.
pub(crate) unsafe fn write_out<T>(target: *mut T, value: T, name: &'static str) -> Result<(), ContractViolation> {
    if target.is_null() {
        return Err(ContractViolation::NullPointer(name));
    }

    unsafe { target.write(value) };
    Ok(())
}
