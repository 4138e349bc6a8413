use crate::network::protocol::Resp2;
use bytes::BytesMut;
use redis_protocol::resp2::types::Frame as Resp2Frame;

/// Receive buffer holding unparsed data until one complete reply frame is available
///
/// Only one command is in flight per connection, so at most one frame is expected at a time.
/// Frame boundaries are located by scanning the type headers, bulk payloads are skipped by their
/// announced length. The decoder only runs once a frame is complete.
pub(crate) struct ResponseBuffer {
    decoder: Resp2,

    /// Unparsed data
    buffer: BytesMut,

    /// Received data violating the protocol
    faulty: bool,
}

/// Result of scanning for the end of a frame
#[derive(Debug, PartialEq)]
enum Scan {
    /// Frame ends at the given offset (exclusive)
    Complete(usize),
    Incomplete,
    /// Header not understood, left to the decoder to judge
    Unknown,
}

impl ResponseBuffer {
    pub fn new() -> ResponseBuffer {
        Self {
            decoder: Resp2::default(),
            buffer: BytesMut::new(),
            faulty: false,
        }
    }

    /// Appends received data
    pub fn append(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Takes the next complete frame, None if data is still incomplete or faulty
    ///
    /// Consumed bytes are removed, so trailing data stays available for the next frame.
    pub fn take_frame(&mut self) -> Option<Resp2Frame> {
        if self.faulty || self.buffer.is_empty() {
            return None;
        }

        match scan_frame(&self.buffer, 0) {
            Scan::Incomplete => None,
            Scan::Complete(end) => {
                let data = self.buffer.split_to(end).freeze();
                match self.decoder.decode(&data) {
                    Ok(Some((frame, _))) => Some(frame),
                    _ => {
                        self.faulty = true;
                        None
                    }
                }
            }
            Scan::Unknown => {
                let data = self.buffer.clone().freeze();
                match self.decoder.decode(&data) {
                    Ok(Some((frame, size))) => {
                        let _ = self.buffer.split_to(size);
                        Some(frame)
                    }
                    Ok(None) => None,
                    Err(_) => {
                        self.faulty = true;
                        None
                    }
                }
            }
        }
    }

    /// If true, a protocol violation was detected. This is fatal for the connection.
    pub fn is_faulty(&self) -> bool {
        self.faulty
    }

    /// Number of buffered but unparsed bytes
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

/// Locates the end of the frame starting at `start`
fn scan_frame(data: &[u8], start: usize) -> Scan {
    let Some(&kind) = data.get(start) else {
        return Scan::Incomplete;
    };
    if !matches!(kind, b'+' | b'-' | b':' | b'$' | b'*') {
        return Scan::Unknown;
    }
    let Some(line_end) = find_crlf(data, start + 1) else {
        return Scan::Incomplete;
    };
    let after_header = line_end + 2;

    match kind {
        b'+' | b'-' | b':' => Scan::Complete(after_header),
        b'$' => match parse_length(&data[start + 1..line_end]) {
            Some(-1) => Scan::Complete(after_header),
            Some(len) if len >= 0 => match usize::try_from(len)
                .ok()
                .and_then(|len| after_header.checked_add(len)?.checked_add(2))
            {
                Some(end) if data.len() < end => Scan::Incomplete,
                Some(end) => Scan::Complete(end),
                None => Scan::Unknown,
            },
            _ => Scan::Unknown,
        },
        b'*' => match parse_length(&data[start + 1..line_end]) {
            Some(-1) => Scan::Complete(after_header),
            Some(count) if count >= 0 => {
                let mut offset = after_header;
                for _ in 0..count {
                    match scan_frame(data, offset) {
                        Scan::Complete(end) => offset = end,
                        other => return other,
                    }
                }
                Scan::Complete(offset)
            }
            _ => Scan::Unknown,
        },
        _ => Scan::Unknown,
    }
}

fn find_crlf(data: &[u8], from: usize) -> Option<usize> {
    data.get(from..)?
        .windows(2)
        .position(|window| window == b"\r\n")
        .map(|position| from + position)
}

fn parse_length(digits: &[u8]) -> Option<i64> {
    core::str::from_utf8(digits).ok()?.parse().ok()
}
