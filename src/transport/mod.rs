//! Transport abstraction for the robot's serial link
//!
//! The poll loop and the command dispatcher only ever see [`Transport`]; the
//! real serial port and the in-memory mock both implement it.

pub mod mock;
pub mod serial;
pub mod wake;

use std::fmt;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use roomba_core::Command;

pub use mock::MockTransport;
pub use serial::SerialTransport;

#[derive(Debug)]
pub enum TransportError {
    /// The device path could not be opened
    Open { path: String, source: io::Error },
    Io(io::Error),
    /// No reply arrived before the read deadline
    Timeout { group: u8, waited: Duration },
    /// The link has been shut down
    Closed,
    /// Pulsing the wake line failed
    Wake(io::Error),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Open { path, source } => write!(f, "cannot open {}: {}", path, source),
            TransportError::Io(e) => write!(f, "serial I/O failed: {}", e),
            TransportError::Timeout { group, waited } => {
                write!(f, "no reply for sensor group {} after {}ms", group, waited.as_millis())
            }
            TransportError::Closed => write!(f, "robot link closed"),
            TransportError::Wake(e) => write!(f, "wake line pulse failed: {}", e),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Open { source, .. } => Some(source),
            TransportError::Io(e) | TransportError::Wake(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        TransportError::Io(e)
    }
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Synchronous request/response exchange with the robot
pub trait Transport: Send {
    /// Request one sensor group and return its raw payload
    fn read_group(&mut self, group: u8) -> TransportResult<Vec<u8>>;

    fn send_command(&mut self, command: Command) -> TransportResult<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read_group(&mut self, group: u8) -> TransportResult<Vec<u8>> {
        (**self).read_group(group)
    }

    fn send_command(&mut self, command: Command) -> TransportResult<()> {
        (**self).send_command(command)
    }
}

/// Shared handle to the one transport. Every read and every command goes
/// through the same lock, so exchanges never interleave on the wire.
#[derive(Clone)]
pub struct RobotLink {
    inner: Arc<Mutex<Box<dyn Transport>>>,
}

impl RobotLink {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(transport))),
        }
    }

    /// Exclusive access to the transport for one or more exchanges
    pub fn lock(&self) -> MutexGuard<'_, Box<dyn Transport>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn read_group(&self, group: u8) -> TransportResult<Vec<u8>> {
        self.lock().read_group(group)
    }

    pub fn send_command(&self, command: Command) -> TransportResult<()> {
        self.lock().send_command(command)
    }
}
