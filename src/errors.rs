use std::net::SocketAddr;
use std::time::Duration;

use crate::session::SessionState;

/// All error types that can occur when talking to a Magic Home controller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A session operation was invoked outside the state it requires.
    #[error("cannot {operation} a session that is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    /// The TCP connection to the device was refused or timed out.
    #[error("device {addr} is unreachable: {err:?}")]
    Unreachable { addr: SocketAddr, err: std::io::Error },

    /// Writing a frame to an open connection failed.
    #[error("failed to write frame: {0:?}")]
    WriteFailed(std::io::Error),

    /// Reading from an open connection failed for a reason other than a timeout.
    #[error("failed to read reply: {0:?}")]
    ReadFailed(std::io::Error),

    /// The expected reply did not arrive in time.
    #[error("no reply within {0:?}")]
    Timeout(Duration),

    /// The received bytes failed structural or checksum validation.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// The frame type byte is not one this client understands.
    #[error("unknown opcode {0:#04x}")]
    UnknownOpcode(u8),

    /// The discovery request could not be broadcast.
    #[error("broadcast unavailable ({action}): {err:?}")]
    BroadcastUnavailable { action: String, err: std::io::Error },

    /// Failed to parse a [`crate::Color`] from a string.
    #[error("invalid color string: {0}")]
    InvalidColorString(String),
}

impl Error {
    /// Create a new invalid state error
    pub fn invalid_state(operation: &'static str, state: SessionState) -> Self {
        Error::InvalidState { operation, state }
    }

    /// Create a new unreachable error
    pub fn unreachable(addr: SocketAddr, err: std::io::Error) -> Self {
        Error::Unreachable { addr, err }
    }

    /// Create a new malformed frame error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedFrame(reason.into())
    }

    /// Create a new broadcast unavailable error
    pub fn broadcast(action: &str, err: std::io::Error) -> Self {
        Error::BroadcastUnavailable {
            action: action.to_string(),
            err,
        }
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
