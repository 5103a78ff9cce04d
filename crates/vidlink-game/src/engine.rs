//! The game engine: entity and action registry.
//!
//! Entities and actions refer to each other by id ([`EntityId`],
//! [`ActionKey`]) rather than by reference. The engine owns both sides and
//! keeps the links consistent: registering an action points the actor and
//! every target at it, and pruning an expired action unhooks it again.

use std::collections::BTreeMap;

use vidlink_protocol::{EntityId, Millis};

use crate::{Action, ActionKey, Character, GameError};

/// Client-side mirror of the world.
#[derive(Debug, Default)]
pub struct GameEngine {
    /// Registration order is draw order for the renderer.
    entities: Vec<Character>,
    /// Keys are handed out in increasing order, so this iterates oldest first.
    actions: BTreeMap<ActionKey, Action>,
    next_action: u64,
    avatar: Option<EntityId>,
    current_map: Option<String>,
}

impl GameEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the world to `now`: expired actions are pruned first, then
    /// every character takes whatever steps are due.
    pub fn update(&mut self, now: Millis) {
        self.prune_actions(now);
        for character in &mut self.entities {
            character.update(now);
        }
    }

    // -- Entities --

    /// Adds a character.
    ///
    /// # Errors
    /// [`GameError::DuplicateEntity`] if the id is already taken.
    pub fn register_entity(&mut self, character: Character) -> Result<(), GameError> {
        if self.contains(character.id()) {
            return Err(GameError::DuplicateEntity(character.id()));
        }
        tracing::debug!(entity = %character.id(), name = character.name(), "entity registered");
        self.entities.push(character);
        Ok(())
    }

    /// Removes a character and returns it.
    ///
    /// Actions it was performing go with it, and it stops being the avatar.
    ///
    /// # Errors
    /// [`GameError::EntityNotFound`] if no such entity exists.
    pub fn deregister_entity(&mut self, id: EntityId) -> Result<Character, GameError> {
        let index = self.position(id)?;
        let character = self.entities.remove(index);

        let owned: Vec<ActionKey> = self
            .actions
            .iter()
            .filter(|(_, action)| action.actor() == id)
            .map(|(key, _)| *key)
            .collect();
        for key in owned {
            self.remove_action(key);
        }

        if self.avatar == Some(id) {
            self.avatar = None;
        }

        tracing::debug!(entity = %id, "entity deregistered");
        Ok(character)
    }

    pub fn entity(&self, id: EntityId) -> Result<&Character, GameError> {
        self.entities
            .iter()
            .find(|c| c.id() == id)
            .ok_or(GameError::EntityNotFound(id))
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Result<&mut Character, GameError> {
        self.entities
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or(GameError::EntityNotFound(id))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.iter().any(|c| c.id() == id)
    }

    /// All characters in registration order.
    pub fn entities(&self) -> impl ExactSizeIterator<Item = &Character> {
        self.entities.iter()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // -- Actions --

    /// Registers an action and links it to its actor and targets.
    ///
    /// The actor's current action is replaced.
    ///
    /// # Errors
    /// [`GameError::EntityNotFound`] if the actor or any target is missing.
    /// Nothing is changed in that case.
    pub fn register_action(&mut self, action: Action) -> Result<ActionKey, GameError> {
        self.position(action.actor())?;
        for target in action.targets() {
            self.position(*target)?;
        }

        self.next_action += 1;
        let key = ActionKey(self.next_action);

        self.entity_mut(action.actor())?.set_action(Some(key));
        for target in action.targets() {
            self.entity_mut(*target)?.add_affected_by(key);
        }

        tracing::debug!(action = %key, actor = %action.actor(), "action registered");
        self.actions.insert(key, action);
        Ok(key)
    }

    pub fn action(&self, key: ActionKey) -> Result<&Action, GameError> {
        self.actions.get(&key).ok_or(GameError::ActionNotFound(key))
    }

    /// Live actions, oldest first.
    pub fn actions(&self) -> impl Iterator<Item = (ActionKey, &Action)> {
        self.actions.iter().map(|(key, action)| (*key, action))
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Drops every action that is no longer active at `now` and returns how
    /// many went.
    pub fn prune_actions(&mut self, now: Millis) -> usize {
        let expired: Vec<ActionKey> = self
            .actions
            .iter()
            .filter(|(_, action)| !action.is_active(now))
            .map(|(key, _)| *key)
            .collect();

        for key in &expired {
            self.remove_action(*key);
            tracing::trace!(action = %key, now, "action expired");
        }
        expired.len()
    }

    fn remove_action(&mut self, key: ActionKey) {
        let Some(action) = self.actions.remove(&key) else {
            return;
        };

        // A later action may already have replaced this one on the actor.
        if let Ok(actor) = self.entity_mut(action.actor()) {
            if actor.action() == Some(key) {
                actor.set_action(None);
            }
        }
        for target in action.targets() {
            if let Ok(character) = self.entity_mut(*target) {
                character.remove_affected_by(key);
            }
        }
    }

    // -- Player --

    /// The character the player controls, if the server has said which.
    pub fn avatar(&self) -> Option<EntityId> {
        self.avatar
    }

    /// # Errors
    /// [`GameError::EntityNotFound`] if `id` isn't registered.
    pub fn set_avatar(&mut self, id: EntityId) -> Result<(), GameError> {
        self.position(id)?;
        self.avatar = Some(id);
        Ok(())
    }

    pub fn avatar_character(&self) -> Option<&Character> {
        self.avatar.and_then(|id| self.entity(id).ok())
    }

    pub fn current_map(&self) -> Option<&str> {
        self.current_map.as_deref()
    }

    pub fn set_current_map(&mut self, map: impl Into<String>) {
        self.current_map = Some(map.into());
    }

    fn position(&self, id: EntityId) -> Result<usize, GameError> {
        self.entities
            .iter()
            .position(|c| c.id() == id)
            .ok_or(GameError::EntityNotFound(id))
    }
}
