use crate::network::connection::Connection;
use crate::network::std_stack::StdStack;
use crate::network::timeout::{from_parts, to_microseconds, Timeout};
use core::time::Duration;
use embedded_nal::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpClientStack};
use embedded_time::Clock;
use std::net::ToSocketAddrs;
use std_embedded_time::StandardClock;

/// Error handling for connection establishment
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// Host name did not resolve to any address
    #[error("unable to resolve address")]
    AddressResolution,

    /// Timeout exceeds the range of the microsecond timer
    #[error("timeout out of range")]
    InvalidTimeout,

    /// Unable to get a socket from network layer
    #[error("unable to allocate socket")]
    TcpSocketError,

    /// TCP Connect failed
    #[error("TCP connect failed")]
    TcpConnectionFailed,

    /// TCP connect did not complete within the timeout
    #[error("connect timed out")]
    Timeout,

    /// Upstream timer/clock failure
    #[error("timer failure")]
    TimerError,
}

/// Connection on the std network stack and system clock
pub type StdConnection = Connection<StdStack, StandardClock>;

/// Connection settings for a single Redis server
///
/// ```no_run
///# use core::time::Duration;
///# use redis_shim::network::ConnectionHandler;
///# use redis_shim::network::StdStack;
///# use std_embedded_time::StandardClock;
///#
/// let mut handler = ConnectionHandler::new("127.0.0.1", 6379);
/// handler.timeout(Duration::from_millis(1500));
///
/// let stack = StdStack::with_connect_timeout(Duration::from_millis(1500));
/// let connection = handler.connect(stack, StandardClock::default()).unwrap();
/// connection.disconnect();
/// ```
#[derive(Debug, Clone)]
pub struct ConnectionHandler {
    host: String,
    port: u16,

    /// Applies to connect and to every command round trip. Zero disables the timeout.
    timeout: Duration,
}

impl ConnectionHandler {
    pub fn new(host: &str, port: u16) -> Self {
        ConnectionHandler {
            host: host.to_string(),
            port,
            timeout: Duration::ZERO,
        }
    }

    /// Sets the max. duration of connect and of each command
    pub fn timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = timeout;
        self
    }

    /// Sets the timeout as whole seconds plus microsecond remainder
    pub fn timeout_parts(&mut self, seconds: u32, micros: u32) -> &mut Self {
        self.timeout(from_parts(seconds, micros))
    }

    /// Opens a new connection on the given network stack. The connection owns stack and clock.
    pub fn connect<N: TcpClientStack, C: Clock>(&self, mut stack: N, clock: C) -> Result<Connection<N, C>, ConnectionError> {
        let timeout = to_microseconds(self.timeout).ok_or(ConnectionError::InvalidTimeout)?;
        let remote = self.resolve()?;

        let mut socket = stack.socket().map_err(|_| ConnectionError::TcpSocketError)?;
        if let Err(error) = connect_socket(&mut stack, &mut socket, remote, &clock, timeout) {
            tracing::warn!(host = %self.host, port = self.port, %error, "connect failed");
            let _ = stack.close(socket);
            return Err(error);
        }

        tracing::debug!(%remote, "connected");
        Ok(Connection::new(stack, socket, clock, timeout))
    }

    fn resolve(&self) -> Result<SocketAddr, ConnectionError> {
        let address = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|_| ConnectionError::AddressResolution)?
            .next()
            .ok_or(ConnectionError::AddressResolution)?;

        let ip = match address.ip() {
            std::net::IpAddr::V4(ip) => IpAddr::from(Ipv4Addr::from(ip.octets())),
            std::net::IpAddr::V6(ip) => IpAddr::from(Ipv6Addr::from(ip.octets())),
        };
        Ok(SocketAddr::new(ip, address.port()))
    }
}

/// Connects to the given host on the std network stack
pub fn connect_std(host: &str, port: u16, timeout: Duration) -> Result<StdConnection, ConnectionError> {
    ConnectionHandler::new(host, port)
        .timeout(timeout)
        .connect(StdStack::with_connect_timeout(timeout), StandardClock::default())
}

fn connect_socket<N: TcpClientStack, C: Clock>(
    stack: &mut N,
    socket: &mut N::TcpSocket,
    remote: SocketAddr,
    clock: &C,
    timeout: embedded_time::duration::Microseconds,
) -> Result<(), ConnectionError> {
    let timer = Timeout::new(clock, timeout).map_err(|_| ConnectionError::TimerError)?;

    loop {
        match stack.connect(socket, remote) {
            Ok(()) => return Ok(()),
            Err(nb::Error::Other(_)) => return Err(ConnectionError::TcpConnectionFailed),
            Err(nb::Error::WouldBlock) => {
                if timer.expired().map_err(|_| ConnectionError::TimerError)? {
                    return Err(ConnectionError::Timeout);
                }
            }
        }
    }
}
