use core::time::Duration;
use embedded_nal::{IpAddr, SocketAddr, TcpClientStack};
use std::io::{self, ErrorKind, Read, Write};
use std::net::TcpStream;
use std::time::Instant;

/// Error type of the std stack; the crate does not export it by name
pub(crate) type TcpError = <std_embedded_nal::Stack as TcpClientStack>::Error;

/// Max. time a single send or receive blocks before reporting `WouldBlock`
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// TCP client stack on top of `std::net`
///
/// Unlike the plain std stack, connect honors a deadline and socket operations wait in the kernel
/// for up to [POLL_INTERVAL] instead of returning `WouldBlock` at once.
#[derive(Debug, Clone, Default)]
pub struct StdStack {
    /// None blocks until the OS gives up
    connect_timeout: Option<Duration>,
}

/// Socket of [StdStack]
#[derive(Debug, Default)]
pub struct StdSocket {
    stream: Option<TcpStream>,

    /// Connect deadline, fixed by the first connect attempt
    deadline: Option<Instant>,
}

impl StdStack {
    /// Limits connect to the given duration. Zero disables the limit.
    pub fn with_connect_timeout(timeout: Duration) -> Self {
        StdStack {
            connect_timeout: (!timeout.is_zero()).then_some(timeout),
        }
    }

    fn connect_stream(&self, socket: &mut StdSocket, remote: std::net::SocketAddr) -> nb::Result<TcpStream, TcpError> {
        let Some(timeout) = self.connect_timeout else {
            return TcpStream::connect(remote).map_err(|error| nb::Error::Other(TcpError::from(error)));
        };

        let deadline = *socket.deadline.get_or_insert_with(|| Instant::now() + timeout);
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(nb::Error::WouldBlock);
        }

        TcpStream::connect_timeout(&remote, remaining).map_err(would_block)
    }
}

impl TcpClientStack for StdStack {
    type TcpSocket = StdSocket;
    type Error = TcpError;

    fn socket(&mut self) -> Result<StdSocket, TcpError> {
        Ok(StdSocket::default())
    }

    fn connect(&mut self, socket: &mut StdSocket, remote: SocketAddr) -> nb::Result<(), TcpError> {
        if socket.stream.is_some() {
            return Err(nb::Error::Other(TcpError::from(io::Error::from(ErrorKind::AlreadyExists))));
        }

        let stream = self.connect_stream(socket, std_address(remote))?;
        configure(&stream).map_err(|error| nb::Error::Other(TcpError::from(error)))?;

        socket.stream = Some(stream);
        Ok(())
    }

    fn send(&mut self, socket: &mut StdSocket, buffer: &[u8]) -> nb::Result<usize, TcpError> {
        socket.connected()?.write(buffer).map_err(would_block)
    }

    fn receive(&mut self, socket: &mut StdSocket, buffer: &mut [u8]) -> nb::Result<usize, TcpError> {
        socket.connected()?.read(buffer).map_err(would_block)
    }

    fn close(&mut self, socket: StdSocket) -> Result<(), TcpError> {
        match socket.stream {
            Some(stream) => match stream.shutdown(std::net::Shutdown::Both) {
                Err(error) if error.kind() != ErrorKind::NotConnected => Err(TcpError::from(error)),
                _ => Ok(()),
            },
            None => Ok(()),
        }
    }
}

impl StdSocket {
    fn connected(&mut self) -> Result<&mut TcpStream, TcpError> {
        self.stream
            .as_mut()
            .ok_or_else(|| TcpError::from(io::Error::from(ErrorKind::NotConnected)))
    }
}

/// Blocking mode with a short timeout, so waiting happens in the kernel
fn configure(stream: &TcpStream) -> io::Result<()> {
    stream.set_nodelay(true)?;
    stream.set_read_timeout(Some(POLL_INTERVAL))?;
    stream.set_write_timeout(Some(POLL_INTERVAL))
}

fn would_block(error: io::Error) -> nb::Error<TcpError> {
    match error.kind() {
        ErrorKind::WouldBlock | ErrorKind::TimedOut => nb::Error::WouldBlock,
        _ => nb::Error::Other(TcpError::from(error)),
    }
}

fn std_address(remote: SocketAddr) -> std::net::SocketAddr {
    let ip = match remote.ip() {
        IpAddr::V4(ip) => std::net::IpAddr::from(ip.octets()),
        IpAddr::V6(ip) => std::net::IpAddr::from(ip.octets()),
    };
    std::net::SocketAddr::new(ip, remote.port())
}
