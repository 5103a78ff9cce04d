//! Client-side game state for vidlink.
//!
//! The engine mirrors what the server has told the client: which entities
//! exist, where they're walking, and which actions are playing out. It never
//! decides anything on its own; it only interpolates between server updates.
//!
//! # Key types
//!
//! - [`GameEngine`]: entity and action registry, advanced once per tick
//! - [`Character`]: an entity with a position, a path, and hit points
//! - [`Action`]: something an entity is doing, with an expiry
//! - [`MessageHandler`]: drains the engine's bus endpoint and applies
//!   each [`Message`](vidlink_protocol::Message)
//!
//! Time is always passed in as `now`; nothing here reads a clock.

mod action;
mod character;
mod engine;
mod error;
mod handler;

pub use action::{Action, ActionDuration, ActionKey, ActionKind, SkillUse};
pub use character::Character;
pub use engine::GameEngine;
pub use error::GameError;
pub use handler::MessageHandler;
