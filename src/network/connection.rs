use crate::argv::Command;
use crate::invoker::CommandExecutor;
use crate::network::protocol::Resp2;
use crate::network::response::ResponseBuffer;
use crate::network::timeout::{Timeout, TimeoutError};
use crate::reply::Reply;
use bytes::BytesMut;
use core::fmt::{Debug, Formatter};
use embedded_nal::{TcpClientStack, TcpError, TcpErrorKind};
use embedded_time::duration::Microseconds;
use embedded_time::Clock;
use redis_protocol::resp2::types::Frame as Resp2Frame;

/// Size of the local receive chunk
const CHUNK_SIZE: usize = 16 * 1024;

/// Connection level failure during a command round trip
///
/// Any of these errors is fatal for the connection, see [Connection].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecuteError {
    /// No response within the connection timeout
    #[error("timeout")]
    Timeout,
    /// Failed encoding TX command
    #[error("command encoding failed")]
    EncodingCommandFailed,
    /// Received data violating the RESP protocol
    #[error("protocol violation")]
    ProtocolViolation,
    /// Low level network error
    #[error("network error")]
    TcpError,
    /// Remote side closed the connection
    #[error("connection closed by peer")]
    ConnectionClosed,
    /// Upstream timer/clock failure
    #[error("timer failure")]
    TimerError,
    /// A previous command failed on connection level, the connection is unusable
    #[error("connection is broken")]
    ConnectionBroken,
}

/// Blocking connection to a Redis server, one command in flight at a time
///
/// The connection owns network stack, socket and clock. Once a round trip failed, request and reply
/// can no longer be matched, so every following command fails with [ExecuteError::ConnectionBroken].
pub struct Connection<N: TcpClientStack, C: Clock> {
    stack: N,
    socket: N::TcpSocket,
    clock: C,

    /// Max. duration of a round trip, zero for no limit
    timeout: Microseconds,

    codec: Resp2,
    buffer: ResponseBuffer,
    broken: bool,
}

impl<N: TcpClientStack, C: Clock> Connection<N, C> {
    pub(crate) fn new(stack: N, socket: N::TcpSocket, clock: C, timeout: Microseconds) -> Self {
        Connection {
            stack,
            socket,
            clock,
            timeout,
            codec: Resp2::default(),
            buffer: ResponseBuffer::new(),
            broken: false,
        }
    }

    /// Sends the command and blocks until the reply arrived or the timeout elapsed
    pub fn execute(&mut self, command: Command) -> Result<Reply, ExecuteError> {
        if self.broken {
            return Err(ExecuteError::ConnectionBroken);
        }

        let result = self.round_trip(command);
        if let Err(error) = &result {
            tracing::warn!(%error, "command failed on connection level");
            self.broken = true;
        }

        result
    }

    /// Returns true if a previous round trip failed
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Closes the socket
    pub fn disconnect(mut self) {
        let _ = self.stack.close(self.socket);
        tracing::debug!("disconnected");
    }

    fn round_trip(&mut self, command: Command) -> Result<Reply, ExecuteError> {
        let mut data = BytesMut::new();
        self.codec
            .encode_bytes(&mut data, &Resp2Frame::from(command))
            .map_err(|_| ExecuteError::EncodingCommandFailed)?;

        let timer = Timeout::new(&self.clock, self.timeout)?;
        send_all(&mut self.stack, &mut self.socket, &data, &timer)?;

        loop {
            if let Some(frame) = self.buffer.take_frame() {
                // Without pipelining nothing may follow the reply
                if self.buffer.pending() > 0 {
                    return Err(ExecuteError::ProtocolViolation);
                }

                return Ok(Reply::from(frame));
            }

            if self.buffer.is_faulty() {
                return Err(ExecuteError::ProtocolViolation);
            }

            let mut chunk = [0u8; CHUNK_SIZE];
            match self.stack.receive(&mut self.socket, &mut chunk) {
                Ok(0) => return Err(ExecuteError::ConnectionClosed),
                Ok(count) => self.buffer.append(&chunk[..count]),
                Err(nb::Error::WouldBlock) => {
                    if timer.expired()? {
                        return Err(ExecuteError::Timeout);
                    }
                }
                Err(nb::Error::Other(error)) => return Err(tcp_error(error)),
            }
        }
    }
}

impl<N: TcpClientStack, C: Clock> CommandExecutor for Connection<N, C> {
    fn execute(&mut self, command: Command) -> Result<Reply, ExecuteError> {
        Connection::execute(self, command)
    }
}

impl<N: TcpClientStack, C: Clock> Debug for Connection<N, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Connection")
            .field("timeout", &self.timeout)
            .field("broken", &self.broken)
            .finish()
    }
}

impl From<TimeoutError> for ExecuteError {
    fn from(_: TimeoutError) -> Self {
        ExecuteError::TimerError
    }
}

fn send_all<N: TcpClientStack, C: Clock>(
    stack: &mut N,
    socket: &mut N::TcpSocket,
    data: &[u8],
    timer: &Timeout<C>,
) -> Result<(), ExecuteError> {
    let mut offset = 0;
    while offset < data.len() {
        match stack.send(socket, &data[offset..]) {
            Ok(0) => return Err(ExecuteError::TcpError),
            Ok(count) => offset += count,
            Err(nb::Error::WouldBlock) => {
                if timer.expired()? {
                    return Err(ExecuteError::Timeout);
                }
            }
            Err(nb::Error::Other(error)) => return Err(tcp_error(error)),
        }
    }

    Ok(())
}

fn tcp_error<E: TcpError>(error: E) -> ExecuteError {
    match error.kind() {
        TcpErrorKind::PipeClosed => ExecuteError::ConnectionClosed,
        _ => ExecuteError::TcpError,
    }
}
