//! Message types for the vidlink bus.
//!
//! Every message the server produces is about an entity: it shows up,
//! moves, acts, or goes away. They're modelled as one closed enum so the
//! consumer's handler can `match` exhaustively instead of guessing at
//! runtime which kind it was handed.

use std::fmt;

use serde::{Deserialize, Serialize};
use vidlink_bus::{Address, Routable};

use crate::ProtocolError;

/// Milliseconds on the client's tick clock.
///
/// Passed explicitly to anything time-dependent; there is no global "now".
pub type Millis = u64;

// ---------------------------------------------------------------------------
// Identity and geometry
// ---------------------------------------------------------------------------

/// Server-assigned identifier of an entity in the world.
///
/// `#[serde(transparent)]` keeps it a bare number on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E-{}", self.0)
    }
}

/// A tile coordinate on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// An entity entered the client's view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAppear {
    pub entity_id: EntityId,
    pub name: String,
    /// Sprite sheet the renderer should use, e.g. `"yeti"`.
    pub skin: String,
    #[serde(default)]
    pub loc: Point,
}

/// The entity the player controls. Carries everything an appear does, plus
/// the map the player is on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(flatten)]
    pub appear: EntityAppear,
    pub map: String,
}

/// An entity left the client's view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDisappear {
    pub entity_id: EntityId,
}

/// A new path for an entity. Replaces whatever path it was walking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMove {
    pub entity_id: EntityId,
    /// Milliseconds per tile. Must be non-zero.
    pub speed: u32,
    /// Waypoints in walking order.
    pub path: Vec<Point>,
}

/// One entity hit by an action, with its hit points afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedTarget {
    pub entity_id: EntityId,
    pub hp: u32,
}

/// An entity used a skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAction {
    /// The actor.
    pub entity_id: EntityId,
    pub action_id: u32,
    #[serde(default)]
    pub skill_id: u32,
    pub location: Point,
    #[serde(default)]
    pub affected: Vec<AffectedTarget>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Everything the server can tell the client.
///
/// `#[serde(tag = "type")]` gives internally tagged JSON:
/// `{ "type": "EntityDisappear", "entity_id": 2 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    EntityAppear(EntityAppear),
    Identity(Identity),
    EntityDisappear(EntityDisappear),
    EntityMove(EntityMove),
    EntityAction(EntityAction),
}

impl Message {
    /// The entity this message is about.
    pub fn entity_id(&self) -> EntityId {
        match self {
            Self::EntityAppear(m) => m.entity_id,
            Self::Identity(m) => m.appear.entity_id,
            Self::EntityDisappear(m) => m.entity_id,
            Self::EntityMove(m) => m.entity_id,
            Self::EntityAction(m) => m.entity_id,
        }
    }

    /// Short variant name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EntityAppear(_) => "EntityAppear",
            Self::Identity(_) => "Identity",
            Self::EntityDisappear(_) => "EntityDisappear",
            Self::EntityMove(_) => "EntityMove",
            Self::EntityAction(_) => "EntityAction",
        }
    }

    /// Checks the rules serde can't express.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] for a move with zero speed.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if let Self::EntityMove(m) = self {
            if m.speed == 0 {
                return Err(ProtocolError::InvalidMessage(format!(
                    "move for {} has zero speed",
                    m.entity_id
                )));
            }
        }
        Ok(())
    }
}

/// Entity traffic always ends up at the game engine.
impl Routable for Message {
    fn destination(&self) -> Address {
        Address::GAME_ENGINE
    }
}

impl From<EntityAppear> for Message {
    fn from(m: EntityAppear) -> Self {
        Self::EntityAppear(m)
    }
}

impl From<Identity> for Message {
    fn from(m: Identity) -> Self {
        Self::Identity(m)
    }
}

impl From<EntityDisappear> for Message {
    fn from(m: EntityDisappear) -> Self {
        Self::EntityDisappear(m)
    }
}

impl From<EntityMove> for Message {
    fn from(m: EntityMove) -> Self {
        Self::EntityMove(m)
    }
}

impl From<EntityAction> for Message {
    fn from(m: EntityAction) -> Self {
        Self::EntityAction(m)
    }
}

// =========================================================================
// Tests
// =========================================================================
