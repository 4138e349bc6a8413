//! Tagged replies and their flattening into caller buffers
//!
//! * [Reply] is the owned reply tree produced by the client collaborator
//! * [ReplyHandle] is the single owner of a reply that was not fully consumed by the invoker
//! * [flatten] copies scalar data into fixed caller buffers or defers to the handle
pub mod flatten;
pub mod handle;


pub use flatten::{
    copy_element_payload, copy_full_payload, fits, flatten_element, flatten_path, flatten_reply, take_payload,
    ElementOutcome, Flattened, ReplyOutcome,
};
pub use handle::ReplyHandle;

use bytes::Bytes;
use redis_protocol::resp2::types::Frame as Resp2Frame;

/// Reply discriminator. Values match the numbering used by C Redis clients.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyTag {
    BulkString = 1,
    Array = 2,
    Integer = 3,
    Nil = 4,
    Status = 5,
    Error = 6,
}

/// Owned reply tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Status(Bytes),
    /// Error reply sent by the server, e.g. `WRONGTYPE ...`. Regular data, not a failure of the call.
    Error(Bytes),
    Integer(i64),
    Nil,
    BulkString(Bytes),
    Array(Vec<Reply>),
}

impl Reply {
    pub fn tag(&self) -> ReplyTag {
        match self {
            Reply::Status(_) => ReplyTag::Status,
            Reply::Error(_) => ReplyTag::Error,
            Reply::Integer(_) => ReplyTag::Integer,
            Reply::Nil => ReplyTag::Nil,
            Reply::BulkString(_) => ReplyTag::BulkString,
            Reply::Array(_) => ReplyTag::Array,
        }
    }

    /// Integer value, zero for any other tag
    pub fn integer(&self) -> i64 {
        match self {
            Reply::Integer(value) => *value,
            _ => 0,
        }
    }

    /// Byte payload of Status, Error and BulkString replies
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Reply::Status(data) | Reply::Error(data) | Reply::BulkString(data) => Some(data),
            _ => None,
        }
    }

    /// Payload length in bytes, zero if there is no payload
    pub fn payload_len(&self) -> usize {
        self.payload().map_or(0, <[u8]>::len)
    }

    pub fn elements(&self) -> Option<&[Reply]> {
        match self {
            Reply::Array(elements) => Some(elements),
            _ => None,
        }
    }

    /// Number of array elements, zero for scalars
    pub fn element_count(&self) -> usize {
        self.elements().map_or(0, <[Reply]>::len)
    }
}

impl From<Resp2Frame> for Reply {
    fn from(frame: Resp2Frame) -> Self {
        match frame {
            Resp2Frame::SimpleString(data) => Reply::Status(data),
            Resp2Frame::Error(message) => Reply::Error(Bytes::copy_from_slice(message.as_bytes())),
            Resp2Frame::Integer(number) => Reply::Integer(number),
            Resp2Frame::BulkString(data) => Reply::BulkString(data),
            Resp2Frame::Array(frames) => Reply::Array(frames.into_iter().map(Reply::from).collect()),
            Resp2Frame::Null => Reply::Nil,
        }
    }
}
