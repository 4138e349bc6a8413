//! Length-prefixed argument vectors
//!
//! A command is passed to Redis as an ordered list of binary safe arguments. Each [Argument] keeps
//! its byte length next to the payload, so embedded zero bytes survive the trip and nothing relies
//! on string terminators.
//!
//! Vectors are either built in one go:
//! ```
//! use redis_shim::argv::ArgumentVector;
//!
//! let argv = ArgumentVector::from_args(["SET", "key", "value"]).unwrap();
//! assert_eq!(3, argv.len());
//! ```
//! or allocated first and filled by index, which is how callers on the other side of the C ABI do it:
//! ```
//! use redis_shim::argv::{Argument, ArgumentVector};
//!
//! let mut argv = ArgumentVector::with_slots(2);
//! argv.set(1, Argument::from_slice(b"k\0ey").unwrap()).unwrap();
//! argv.set(0, Argument::from_slice(b"GET").unwrap()).unwrap();
//!
//! let command = argv.into_command().unwrap();
//! assert_eq!(b"k\0ey", command.arguments()[1].as_bytes());
//! ```
//!
//! # Ownership
//! The vector is consumed by [invoke](crate::invoker::invoke) whether or not the command succeeds.
//! A vector that is never handed over is released by its owner (`Drop`).
use crate::error::ContractViolation;
use bytes::Bytes;
use redis_protocol::resp2::types::Frame as Resp2Frame;


/// Binary safe command argument with explicit length
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Argument {
    length: u32,
    payload: Bytes,
}

impl Argument {
    /// Wraps the given payload without copying
    pub fn new<B>(payload: B) -> Result<Self, ContractViolation>
    where
        Bytes: From<B>,
    {
        let payload = Bytes::from(payload);
        let length = u32::try_from(payload.len()).map_err(|_| ContractViolation::ArgumentTooLong(payload.len()))?;

        Ok(Argument { length, payload })
    }

    /// Copies the given bytes
    pub fn from_slice(data: &[u8]) -> Result<Self, ContractViolation> {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Declared byte length
    pub fn len(&self) -> u32 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_bytes(self) -> Bytes {
        self.payload
    }
}

/// Ordered collection of argument slots forming one command invocation
#[derive(Clone, Debug, Default)]
pub struct ArgumentVector {
    slots: Vec<Option<Argument>>,
}

impl ArgumentVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates `count` empty slots, to be filled with [set](Self::set)
    pub fn with_slots(count: usize) -> Self {
        ArgumentVector {
            slots: vec![None; count],
        }
    }

    /// Builds a vector by copying each given byte string in order
    pub fn from_args<I, A>(args: I) -> Result<Self, ContractViolation>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        let mut vector = Self::new();
        for arg in args {
            vector.push(Argument::from_slice(arg.as_ref())?);
        }

        Ok(vector)
    }

    /// Appends an argument behind the existing slots
    pub fn push(&mut self, argument: Argument) {
        self.slots.push(Some(argument));
    }

    /// Fills the slot at `index`. Replaces any previously set argument.
    pub fn set(&mut self, index: usize, argument: Argument) -> Result<(), ContractViolation> {
        let length = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(ContractViolation::IndexOutOfBounds { index, length })?;

        *slot = Some(argument);
        Ok(())
    }

    /// Number of slots, set or not
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Validates the vector and turns it into an executable command
    ///
    /// Fails on zero slots or on any slot that was never set.
    pub fn into_command(self) -> Result<Command, ContractViolation> {
        if self.slots.is_empty() {
            return Err(ContractViolation::ZeroArguments);
        }

        let mut arguments = Vec::with_capacity(self.slots.len());
        for (index, slot) in self.slots.into_iter().enumerate() {
            arguments.push(slot.ok_or(ContractViolation::UnsetArgument(index))?);
        }

        Ok(Command { arguments })
    }
}

/// Validated, non-empty argument list. The only form a command executor accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    arguments: Vec<Argument>,
}

impl Command {
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// First argument, e.g. `GET`
    pub fn name(&self) -> &[u8] {
        self.arguments[0].as_bytes()
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl From<Command> for Resp2Frame {
    fn from(command: Command) -> Self {
        let mut frames = Vec::with_capacity(command.arguments.len());
        for argument in command.arguments {
            frames.push(Resp2Frame::BulkString(argument.into_bytes()));
        }

        Resp2Frame::Array(frames)
    }
}
