//! Actions: what an entity is doing right now, and for how long.

use std::fmt;

use vidlink_protocol::{EntityId, Millis, Point};

/// Engine-assigned handle to a registered action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionKey(pub u64);

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A-{}", self.0)
    }
}

/// How long an action stays active after it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionDuration {
    /// Active until something replaces it.
    Infinite,
    Millis(u32),
}

impl Default for ActionDuration {
    fn default() -> Self {
        Self::Millis(1_000)
    }
}

/// A skill used on a set of targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillUse {
    pub action_id: u32,
    pub skill_id: u32,
    pub location: Point,
    pub targets: Vec<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Idle,
    Skill(SkillUse),
}

/// Something an entity is doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    actor: EntityId,
    kind: ActionKind,
    started_at: Millis,
    duration: ActionDuration,
}

impl Action {
    /// An idle stance. Never expires.
    pub fn idle(actor: EntityId, now: Millis) -> Self {
        Self {
            actor,
            kind: ActionKind::Idle,
            started_at: now,
            duration: ActionDuration::Infinite,
        }
    }

    /// A skill use lasting the default duration.
    pub fn skill(actor: EntityId, skill: SkillUse, now: Millis) -> Self {
        Self {
            actor,
            kind: ActionKind::Skill(skill),
            started_at: now,
            duration: ActionDuration::default(),
        }
    }

    pub fn with_duration(mut self, duration: ActionDuration) -> Self {
        self.duration = duration;
        self
    }

    /// Whether the action is still playing at `now`.
    pub fn is_active(&self, now: Millis) -> bool {
        match self.duration {
            ActionDuration::Infinite => true,
            ActionDuration::Millis(ms) => now.saturating_sub(self.started_at) < Millis::from(ms),
        }
    }

    pub fn actor(&self) -> EntityId {
        self.actor
    }

    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    /// Entities this action affects. Empty for idle.
    pub fn targets(&self) -> &[EntityId] {
        match &self.kind {
            ActionKind::Idle => &[],
            ActionKind::Skill(skill) => &skill.targets,
        }
    }

    pub fn started_at(&self) -> Millis {
        self.started_at
    }

    pub fn duration(&self) -> ActionDuration {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slash(targets: Vec<EntityId>) -> SkillUse {
        SkillUse {
            action_id: 5,
            skill_id: 0,
            location: Point::new(4, 5),
            targets,
        }
    }

    #[test]
    fn test_skill_expires_after_default_duration() {
        let a = Action::skill(EntityId(1), slash(vec![]), 2_000);
        assert_eq!(a.duration(), ActionDuration::Millis(1_000));
        assert!(a.is_active(2_000));
        assert!(a.is_active(2_999));
        assert!(!a.is_active(3_000));
    }

    #[test]
    fn test_idle_never_expires() {
        let a = Action::idle(EntityId(1), 0);
        assert!(a.is_active(u64::MAX));
        assert!(a.targets().is_empty());
    }

    #[test]
    fn test_with_duration_overrides() {
        let a = Action::skill(EntityId(1), slash(vec![EntityId(2)]), 0)
            .with_duration(ActionDuration::Millis(10));
        assert!(!a.is_active(10));
        assert_eq!(a.targets(), &[EntityId(2)]);
    }

    #[test]
    fn test_action_key_display() {
        assert_eq!(ActionKey(4).to_string(), "A-4");
    }
}
