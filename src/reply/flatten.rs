//! Flattening of reply trees into fixed size caller buffers
//!
//! Payloads are copied when they fit the buffer together with a terminating NUL byte, so text oriented
//! callers can read the buffer as C string. Everything else goes the deferred path: the reply stays
//! alive behind a [ReplyHandle] until the caller fetched what it needs.
//!
//! ```
//! use bytes::Bytes;
//! use redis_shim::reply::{flatten_reply, Reply, ReplyTag};
//!
//! let mut buffer = [0u8; 8];
//!
//! let outcome = flatten_reply(Reply::Status(Bytes::from_static(b"OK")), &mut buffer);
//! assert_eq!(ReplyTag::Status, outcome.flat.tag);
//! assert!(outcome.flat.copied);
//! assert!(outcome.handle.is_none());
//! assert_eq!(b"OK\0", &buffer[..3]);
//!
//! let outcome = flatten_reply(Reply::BulkString(Bytes::from_static(b"far too long")), &mut buffer);
//! assert!(!outcome.flat.copied);
//! assert_eq!(12, outcome.flat.len);
//! outcome.handle.unwrap().release();
//! ```
use crate::error::ContractViolation;
use crate::reply::handle::ReplyHandle;
use crate::reply::{Reply, ReplyTag};

/// Scalar view on a reply or reply element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flattened {
    pub tag: ReplyTag,

    /// Only meaningful for [ReplyTag::Integer]
    pub integer: i64,

    /// Payload length in bytes
    pub len: usize,

    /// Number of array elements
    pub elements: usize,

    /// True if the payload was written to the caller buffer
    pub copied: bool,
}

/// Result of a command execution
#[derive(Debug)]
pub struct ReplyOutcome {
    pub flat: Flattened,

    /// Reply which needs deferred retrieval. Always set for arrays, set for strings that did not fit.
    pub handle: Option<ReplyHandle>,
}

impl ReplyOutcome {
    pub fn is_deferred(&self) -> bool {
        self.handle.is_some()
    }
}

/// Result of an element lookup. The element stays owned by its parent handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementOutcome {
    pub flat: Flattened,

    /// Payload exists but was not copied, use [copy_element_payload]
    pub deferred: bool,
}

/// Returns true if a payload of `len` bytes plus terminator fits a buffer of `capacity` bytes
pub fn fits(len: usize, capacity: usize) -> bool {
    len < capacity
}

/// Flattens a freshly received reply
///
/// Integer and Nil replies as well as copied payloads are released before returning.
/// Arrays and payloads not fitting the buffer are returned as handle, the buffer stays untouched in that case.
pub fn flatten_reply(reply: Reply, buffer: &mut [u8]) -> ReplyOutcome {
    let flat = summarize(&reply, buffer);

    let handle = match flat.tag {
        ReplyTag::Array => Some(ReplyHandle::new(reply)),
        ReplyTag::Status | ReplyTag::Error | ReplyTag::BulkString if !flat.copied => Some(ReplyHandle::new(reply)),
        _ => None,
    };

    tracing::debug!(
        tag = ?flat.tag,
        len = flat.len,
        elements = flat.elements,
        deferred = handle.is_some(),
        "flattened reply"
    );

    ReplyOutcome { flat, handle }
}

/// Flattens the array element at `index`
pub fn flatten_element(
    handle: &ReplyHandle,
    index: usize,
    buffer: &mut [u8],
) -> Result<ElementOutcome, ContractViolation> {
    flatten_path(handle, &[index], buffer)
}

/// Flattens a nested element addressed by one index per nesting level
///
/// An empty path addresses the reply itself.
pub fn flatten_path(
    handle: &ReplyHandle,
    path: &[usize],
    buffer: &mut [u8],
) -> Result<ElementOutcome, ContractViolation> {
    let element = resolve(handle.reply(), path)?;
    let flat = summarize(element, buffer);

    Ok(ElementOutcome {
        flat,
        deferred: element.payload().is_some() && !flat.copied,
    })
}

/// Copies the complete payload of the reply into `out`. Writes a NUL terminator if space is left.
///
/// Returns the number of payload bytes.
pub fn copy_full_payload(handle: &ReplyHandle, out: &mut [u8]) -> Result<usize, ContractViolation> {
    copy_payload(handle.reply(), out)
}

/// Copies the complete payload of a nested element into `out`
pub fn copy_element_payload(
    handle: &ReplyHandle,
    path: &[usize],
    out: &mut [u8],
) -> Result<usize, ContractViolation> {
    copy_payload(resolve(handle.reply(), path)?, out)
}

/// Copies the complete payload and releases the reply
///
/// The handle is consumed in any case, also if copying fails.
pub fn take_payload(handle: ReplyHandle, out: &mut [u8]) -> Result<usize, ContractViolation> {
    let result = copy_payload(handle.reply(), out);
    handle.release();
    result
}

fn summarize(reply: &Reply, buffer: &mut [u8]) -> Flattened {
    let copied = match reply.payload() {
        Some(payload) => copy_terminated(payload, buffer),
        None => false,
    };

    Flattened {
        tag: reply.tag(),
        integer: reply.integer(),
        len: reply.payload_len(),
        elements: reply.element_count(),
        copied,
    }
}

fn copy_terminated(payload: &[u8], buffer: &mut [u8]) -> bool {
    if !fits(payload.len(), buffer.len()) {
        return false;
    }

    buffer[..payload.len()].copy_from_slice(payload);
    buffer[payload.len()] = 0;
    true
}

fn copy_payload(reply: &Reply, out: &mut [u8]) -> Result<usize, ContractViolation> {
    let payload = reply.payload().ok_or(ContractViolation::NoPayload(reply.tag()))?;
    if out.len() < payload.len() {
        return Err(ContractViolation::OutputTooSmall {
            needed: payload.len(),
            capacity: out.len(),
        });
    }

    out[..payload.len()].copy_from_slice(payload);
    if let Some(terminator) = out.get_mut(payload.len()) {
        *terminator = 0;
    }

    Ok(payload.len())
}

fn resolve<'a>(root: &'a Reply, path: &[usize]) -> Result<&'a Reply, ContractViolation> {
    let mut current = root;
    for &index in path {
        let elements = current.elements().ok_or(ContractViolation::NotAnArray(current.tag()))?;
        current = elements.get(index).ok_or(ContractViolation::IndexOutOfBounds {
            index,
            length: elements.len(),
        })?;
    }

    Ok(current)
}
