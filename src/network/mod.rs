pub use connection::{Connection, ExecuteError};
pub use handler::{connect_std, ConnectionError, ConnectionHandler, StdConnection};
pub use std_stack::{StdSocket, StdStack};

pub(crate) mod connection;
pub(crate) mod handler;
pub(crate) mod protocol;
pub(crate) mod response;
pub(crate) mod std_stack;
pub(crate) mod timeout;

#[cfg(any(test, feature = "mock"))]
pub mod mocks;
