//! Applies bus traffic to the game engine.
//!
//! The handler owns the engine's [`Endpoint`] and is the only thing that
//! polls it. Once per tick it drains every waiting message and turns each
//! one into engine calls. Messages are consumed by value, so a handled
//! message is simply dropped at the end of [`MessageHandler::apply`].

use vidlink_bus::Endpoint;
use vidlink_protocol::{
    EntityAction, EntityAppear, EntityMove, Identity, Message, Millis,
};

use crate::{Action, Character, GameEngine, GameError, SkillUse};

/// Consumer side of the game-engine address.
pub struct MessageHandler {
    endpoint: Endpoint<Message>,
}

impl MessageHandler {
    pub fn new(endpoint: Endpoint<Message>) -> Self {
        Self { endpoint }
    }

    pub fn endpoint(&self) -> &Endpoint<Message> {
        &self.endpoint
    }

    /// Drains the endpoint and applies every message, returning how many
    /// were applied.
    ///
    /// # Errors
    /// Stops at the first message that fails to apply and returns its error.
    /// Anything queued behind it stays put for the next call.
    pub fn update(&mut self, engine: &mut GameEngine, now: Millis) -> Result<usize, GameError> {
        let mut applied = 0;
        while let Some(message) = self.endpoint.poll() {
            Self::apply(engine, message, now)?;
            applied += 1;
        }
        Ok(applied)
    }

    /// Applies one message to `engine`.
    pub fn apply(engine: &mut GameEngine, message: Message, now: Millis) -> Result<(), GameError> {
        message.validate()?;

        match message {
            Message::EntityAppear(m) => {
                tracing::info!(entity = %m.entity_id, name = %m.name, loc = %m.loc, "entity appeared");
                spawn(engine, m)
            }
            Message::Identity(Identity { appear, map }) => {
                tracing::info!(entity = %appear.entity_id, name = %appear.name, %map, "identity assigned");
                let id = appear.entity_id;
                spawn(engine, appear)?;
                engine.set_avatar(id)?;
                engine.set_current_map(map);
                Ok(())
            }
            Message::EntityDisappear(m) => {
                tracing::info!(entity = %m.entity_id, "entity disappeared");
                engine.deregister_entity(m.entity_id).map(drop)
            }
            Message::EntityMove(m) => walk(engine, m, now),
            Message::EntityAction(m) => act(engine, m, now),
        }
    }
}

impl std::fmt::Debug for MessageHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageHandler")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

fn spawn(engine: &mut GameEngine, m: EntityAppear) -> Result<(), GameError> {
    engine.register_entity(Character::new(m.entity_id, m.name, m.skin, m.loc))
}

/// Replaces the entity's path with the one from the server.
fn walk(engine: &mut GameEngine, m: EntityMove, now: Millis) -> Result<(), GameError> {
    tracing::debug!(entity = %m.entity_id, speed = m.speed, steps = m.path.len(), "entity moving");
    let character = engine.entity_mut(m.entity_id)?;
    character.clear_path();
    for point in m.path {
        character.queue_path(point, now);
    }
    character.set_speed(m.speed);
    Ok(())
}

/// Registers a skill action and applies the resulting hit points.
fn act(engine: &mut GameEngine, m: EntityAction, now: Millis) -> Result<(), GameError> {
    tracing::debug!(
        entity = %m.entity_id,
        action_id = m.action_id,
        targets = m.affected.len(),
        "entity acting"
    );

    // Check every participant up front so a bad target doesn't leave hp
    // half-applied.
    engine.entity(m.entity_id)?;
    for target in &m.affected {
        engine.entity(target.entity_id)?;
    }

    for target in &m.affected {
        engine.entity_mut(target.entity_id)?.set_hp(target.hp);
    }

    let skill = SkillUse {
        action_id: m.action_id,
        skill_id: m.skill_id,
        location: m.location,
        targets: m.affected.iter().map(|t| t.entity_id).collect(),
    };
    engine.register_action(Action::skill(m.entity_id, skill, now))?;
    Ok(())
}
