//! Unified error type for the vidlink client.

use vidlink_bus::BusError;
use vidlink_game::GameError;
use vidlink_protocol::ProtocolError;

/// Top-level error wrapping every sub-crate's error.
///
/// `#[from]` on each wrapped variant lets `?` convert sub-crate errors
/// automatically.
#[derive(Debug, thiserror::Error)]
pub enum VidlinkError {
    /// Registration conflict or a relay failure.
    #[error(transparent)]
    Bus(#[from] BusError),

    /// Encoding or decoding failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A server message didn't fit the client's game state.
    #[error(transparent)]
    Game(#[from] GameError),

    /// The client configuration couldn't be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A server script is inconsistent (steps out of order, bad loop point).
    #[error("invalid script: {0}")]
    Script(String),
}
