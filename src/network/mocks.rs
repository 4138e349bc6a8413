//! Test doubles for the network stack and clock
use core::cell::RefCell;
use embedded_nal::{SocketAddr, TcpClientStack, TcpError, TcpErrorKind};
use embedded_time::clock::Error;
use embedded_time::duration::Duration;
use embedded_time::fixed_point::FixedPoint;
use embedded_time::fraction::Fraction;
use embedded_time::timer::param::{Armed, OneShot};
use embedded_time::{Clock, Instant, Timer};
use mockall::mock;

#[derive(Debug)]
pub struct SocketMock {
    pub id: i32,
}

impl SocketMock {
    pub fn new(id: i32) -> Self {
        SocketMock { id }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockTcpError(pub TcpErrorKind);

impl TcpError for MockTcpError {
    fn kind(&self) -> TcpErrorKind {
        self.0
    }
}

mock! {
    #[derive(Debug)]
    pub NetworkStack {}

    impl TcpClientStack for NetworkStack {
        type TcpSocket = SocketMock;
        type Error = MockTcpError;

        fn socket(&mut self) -> Result<SocketMock, MockTcpError>;

        fn connect(
            &mut self,
            socket: &mut SocketMock,
            remote: SocketAddr,
        ) -> nb::Result<(), MockTcpError>;

        fn send(
            &mut self,
            socket: &mut SocketMock,
            buffer: &[u8],
        ) -> nb::Result<usize, MockTcpError>;

        fn receive(
            &mut self,
            socket: &mut SocketMock,
            buffer: &mut [u8],
        ) -> nb::Result<usize, MockTcpError>;

        fn close(&mut self, socket: SocketMock) -> Result<(), MockTcpError>;
    }
}

/// Helper for constructing network layer mock
#[derive(Default)]
pub struct NetworkMockBuilder {
    stack: MockNetworkStack,
}

impl NetworkMockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates a error while fetching socket
    pub fn socket_error(mut self) -> Self {
        self.stack
            .expect_socket()
            .times(1)
            .returning(move || Err(MockTcpError(TcpErrorKind::Other)));
        self
    }

    /// Expects to return a socket with the given ID
    pub fn socket(mut self, socket_id: i32) -> Self {
        self.stack
            .expect_socket()
            .times(1)
            .returning(move || Ok(SocketMock::new(socket_id)));
        self
    }

    /// Asserts that connect is called with the given remote address
    pub fn connect(mut self, socket_id: i32, remote: &'static str) -> Self {
        self.stack.expect_connect().times(1).returning(move |socket, address| {
            assert_eq!(socket_id, socket.id);
            assert_eq!(remote, address.to_string());
            nb::Result::Ok(())
        });
        self
    }

    /// Simulates a TCP error while connecting
    pub fn connect_error(mut self, socket_id: i32) -> Self {
        self.stack.expect_connect().times(1).returning(move |socket, _| {
            assert_eq!(socket_id, socket.id);
            nb::Result::Err(nb::Error::Other(MockTcpError(TcpErrorKind::Other)))
        });
        self
    }

    /// Simulates a connect still in progress
    pub fn connect_pending(mut self, times: usize) -> Self {
        self.stack
            .expect_connect()
            .times(times)
            .returning(move |_, _| nb::Result::Err(nb::Error::WouldBlock));
        self
    }

    /// Asserts that close is called
    pub fn close(mut self, socket_id: i32) -> Self {
        self.stack.expect_close().times(1).returning(move |socket| {
            assert_eq!(socket_id, socket.id);
            Ok(())
        });
        self
    }

    /// Expect to send exactly the given bytes
    pub fn send(mut self, data: &'static [u8]) -> Self {
        self.stack.expect_send().times(1).returning(move |_, buffer| {
            assert_eq!(data, buffer);
            nb::Result::Ok(buffer.len())
        });
        self
    }

    /// Accepts any data, in pieces of max. `chunk` bytes
    pub fn send_partial(mut self, chunk: usize, times: usize) -> Self {
        self.stack
            .expect_send()
            .times(times)
            .returning(move |_, buffer| nb::Result::Ok(buffer.len().min(chunk)));
        self
    }

    /// Prepares TCP TX error
    pub fn send_error(mut self) -> Self {
        self.stack
            .expect_send()
            .times(1)
            .returning(move |_, _| nb::Result::Err(nb::Error::Other(MockTcpError(TcpErrorKind::Other))));
        self
    }

    /// Prepares custom response data
    pub fn response(mut self, data: &'static [u8]) -> Self {
        self.stack.expect_receive().times(1).returning(move |_, buffer: &mut [u8]| {
            buffer[..data.len()].copy_from_slice(data);
            nb::Result::Ok(data.len())
        });
        self
    }

    /// Prepares a bulk string response with the given payload
    pub fn response_bulk(mut self, payload: &'static [u8]) -> Self {
        let mut frame = format!("${}\r\n", payload.len()).into_bytes();
        frame.extend_from_slice(payload);
        frame.extend_from_slice(b"\r\n");

        self.stack.expect_receive().times(1).returning(move |_, buffer: &mut [u8]| {
            buffer[..frame.len()].copy_from_slice(&frame);
            nb::Result::Ok(frame.len())
        });
        self
    }

    /// Simulates no pending data (in nb context => WouldBlock)
    pub fn response_no_data(mut self) -> Self {
        self.stack
            .expect_receive()
            .times(1)
            .returning(move |_, _| nb::Result::Err(nb::Error::WouldBlock));
        self
    }

    /// Simulates a TCP RX error
    pub fn receive_error(mut self, kind: TcpErrorKind) -> Self {
        self.stack
            .expect_receive()
            .times(1)
            .returning(move |_, _| nb::Result::Err(nb::Error::Other(MockTcpError(kind))));
        self
    }

    /// Simulates an orderly shutdown of the remote side
    pub fn receive_eof(mut self) -> Self {
        self.stack.expect_receive().times(1).returning(move |_, _| nb::Result::Ok(0));
        self
    }

    pub fn into_mock(self) -> MockNetworkStack {
        self.stack
    }
}

/// Clock returning the given instants (in microseconds) one after another
#[derive(Debug)]
pub struct TestClock {
    pub next_instants: RefCell<Vec<u64>>,
}

impl Clock for TestClock {
    type T = u64;
    const SCALING_FACTOR: Fraction = Fraction::new(1, 1_000_000);

    fn try_now(&self) -> Result<Instant<Self>, Error> {
        if self.next_instants.borrow().is_empty() {
            return Err(Error::Unspecified);
        }

        Ok(Instant::new(self.next_instants.borrow_mut().remove(0)))
    }

    fn new_timer<Dur: Duration>(&self, duration: Dur) -> Timer<OneShot, Armed, Self, Dur>
    where
        Dur: FixedPoint,
    {
        Timer::new(self, duration)
    }
}

impl TestClock {
    pub fn new(next_instants: Vec<u64>) -> Self {
        TestClock {
            next_instants: RefCell::new(next_instants),
        }
    }
}
