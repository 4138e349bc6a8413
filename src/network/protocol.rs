use bytes::{Bytes, BytesMut};
use redis_protocol::resp2;
use redis_protocol::resp2::types::Frame as Resp2Frame;
use redis_protocol::types::RedisProtocolError;

/// Thin wrapper around the redis-protocol RESP2 codec
#[derive(Clone, Debug, Default)]
pub(crate) struct Resp2 {}

impl Resp2 {
    /// Decodes the first complete frame. Returns the frame and the number of consumed bytes.
    pub fn decode(&self, data: &Bytes) -> Result<Option<(Resp2Frame, usize)>, RedisProtocolError> {
        resp2::decode::decode(data)
    }

    /// Encodes the frame to the end of the buffer
    pub fn encode_bytes(&self, buf: &mut BytesMut, frame: &Resp2Frame) -> Result<usize, RedisProtocolError> {
        resp2::encode::encode_bytes(buf, frame)
    }
}
