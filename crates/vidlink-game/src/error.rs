//! Error types for the game layer.

use vidlink_protocol::{EntityId, ProtocolError};

use crate::ActionKey;

/// Errors raised while applying server messages to the game state.
///
/// Each of these means the server and client disagree about the world,
/// e.g. a move for an entity that never appeared.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// No entity with this id is registered.
    #[error("entity {0} not found")]
    EntityNotFound(EntityId),

    /// An entity with this id is already registered.
    #[error("entity {0} already exists")]
    DuplicateEntity(EntityId),

    /// No live action with this key.
    #[error("action {0} not found")]
    ActionNotFound(ActionKey),

    /// The message itself was malformed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
