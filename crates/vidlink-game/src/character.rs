//! Characters: entities that walk along server-provided paths.

use std::collections::VecDeque;

use vidlink_protocol::{EntityId, Millis, Point};

use crate::ActionKey;

/// An entity in the world.
///
/// Movement is tile-by-tile: the server sends a path and a speed in
/// milliseconds per tile, and [`update`](Self::update) steps through the
/// path as time passes.
#[derive(Debug, Clone)]
pub struct Character {
    id: EntityId,
    name: String,
    skin: String,
    loc: Point,
    path: VecDeque<Point>,
    /// When the last step was taken, or when walking started.
    last_move: Millis,
    speed: u32,
    hp: u32,
    action: Option<ActionKey>,
    affected_by: Vec<ActionKey>,
}

impl Character {
    /// Milliseconds per tile until the server says otherwise.
    pub const DEFAULT_SPEED: u32 = 125;
    pub const DEFAULT_HP: u32 = 100;

    pub fn new(id: EntityId, name: impl Into<String>, skin: impl Into<String>, loc: Point) -> Self {
        Self {
            id,
            name: name.into(),
            skin: skin.into(),
            loc,
            path: VecDeque::new(),
            last_move: 0,
            speed: Self::DEFAULT_SPEED,
            hp: Self::DEFAULT_HP,
            action: None,
            affected_by: Vec::new(),
        }
    }

    /// Takes every step whose time has come.
    ///
    /// With `delta = now - last_move`, one waypoint is consumed per whole
    /// `speed` milliseconds in `delta`. The leftover fraction carries over
    /// into the next call so steps don't drift.
    pub fn update(&mut self, now: Millis) {
        if !self.is_moving() {
            return;
        }

        let speed = Millis::from(self.speed.max(1));
        let delta = now.saturating_sub(self.last_move);
        if delta <= speed {
            return;
        }

        let remainder = delta % speed;
        let steps = (delta - remainder) / speed;
        for _ in 0..steps {
            let Some(next) = self.path.pop_front() else {
                break;
            };
            self.loc = next;
            self.last_move = now - remainder;
        }
    }

    /// Appends a waypoint. If the character was standing still, the first
    /// step is timed from `now`.
    pub fn queue_path(&mut self, point: Point, now: Millis) {
        if !self.is_moving() {
            self.last_move = now;
        }
        self.path.push_back(point);
    }

    pub fn clear_path(&mut self) {
        self.path.clear();
    }

    pub fn is_moving(&self) -> bool {
        !self.path.is_empty()
    }

    /// Unit vector (per axis: -1, 0 or 1) toward the next waypoint.
    /// `(0, 0)` when idle.
    pub fn direction_moving(&self) -> Point {
        let Some(next) = self.path.front() else {
            return Point::default();
        };
        Point::new((next.x - self.loc.x).signum(), (next.y - self.loc.y).signum())
    }

    /// Where the character will stand once its path is walked.
    pub fn path_end(&self) -> Point {
        self.path.back().copied().unwrap_or(self.loc)
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn skin(&self) -> &str {
        &self.skin
    }

    pub fn loc(&self) -> Point {
        self.loc
    }

    pub fn set_loc(&mut self, loc: Point) {
        self.loc = loc;
    }

    /// Remaining waypoints, next one first.
    pub fn path(&self) -> impl ExactSizeIterator<Item = &Point> {
        self.path.iter()
    }

    pub fn last_move(&self) -> Millis {
        self.last_move
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: u32) {
        self.speed = speed;
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn set_hp(&mut self, hp: u32) {
        self.hp = hp;
    }

    /// The action this character is currently performing.
    pub fn action(&self) -> Option<ActionKey> {
        self.action
    }

    pub(crate) fn set_action(&mut self, key: Option<ActionKey>) {
        self.action = key;
    }

    /// Live actions that target this character.
    pub fn affected_by(&self) -> &[ActionKey] {
        &self.affected_by
    }

    pub(crate) fn add_affected_by(&mut self, key: ActionKey) {
        self.affected_by.push(key);
    }

    pub(crate) fn remove_affected_by(&mut self, key: ActionKey) {
        self.affected_by.retain(|k| *k != key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walker() -> Character {
        let mut c = Character::new(EntityId(1), "Zathril", "azlar", Point::new(0, 0));
        c.set_speed(100);
        c
    }

    #[test]
    fn test_new_character_defaults() {
        let c = Character::new(EntityId(3), "Yeti", "yeti", Point::new(4, -2));
        assert_eq!(c.speed(), Character::DEFAULT_SPEED);
        assert_eq!(c.hp(), Character::DEFAULT_HP);
        assert!(!c.is_moving());
        assert_eq!(c.action(), None);
        assert!(c.affected_by().is_empty());
        assert_eq!(c.path_end(), Point::new(4, -2));
    }

    #[test]
    fn test_queue_path_times_first_step_from_now() {
        let mut c = walker();
        c.queue_path(Point::new(1, 0), 500);
        assert_eq!(c.last_move(), 500);

        // Already moving: the timer is left alone.
        c.queue_path(Point::new(2, 0), 900);
        assert_eq!(c.last_move(), 500);
        assert_eq!(c.path().len(), 2);
    }

    #[test]
    fn test_update_waits_for_a_full_step() {
        let mut c = walker();
        c.queue_path(Point::new(1, 0), 0);

        c.update(100);
        assert_eq!(c.loc(), Point::new(0, 0));

        c.update(101);
        assert_eq!(c.loc(), Point::new(1, 0));
        assert!(!c.is_moving());
    }

    #[test]
    fn test_update_takes_several_steps_and_keeps_remainder() {
        let mut c = walker();
        for x in 1..=5 {
            c.queue_path(Point::new(x, 0), 0);
        }

        c.update(250);
        assert_eq!(c.loc(), Point::new(2, 0));
        assert_eq!(c.last_move(), 200);

        c.update(301);
        assert_eq!(c.loc(), Point::new(3, 0));
        assert_eq!(c.path().len(), 2);
    }

    #[test]
    fn test_update_stops_at_end_of_path() {
        let mut c = walker();
        c.queue_path(Point::new(1, 0), 0);
        c.queue_path(Point::new(2, 0), 0);

        c.update(10_000);
        assert_eq!(c.loc(), Point::new(2, 0));
        assert!(!c.is_moving());
    }

    #[test]
    fn test_update_ignores_clock_going_backwards() {
        let mut c = walker();
        c.queue_path(Point::new(1, 0), 1_000);
        c.update(10);
        assert_eq!(c.loc(), Point::new(0, 0));
    }

    #[test]
    fn test_direction_moving_is_per_axis_sign() {
        let mut c = walker();
        assert_eq!(c.direction_moving(), Point::new(0, 0));

        c.queue_path(Point::new(3, -2), 0);
        assert_eq!(c.direction_moving(), Point::new(1, -1));

        c.clear_path();
        c.queue_path(Point::new(0, 5), 0);
        assert_eq!(c.direction_moving(), Point::new(0, 1));
    }

    #[test]
    fn test_path_end_is_last_waypoint() {
        let mut c = walker();
        c.queue_path(Point::new(1, 0), 0);
        c.queue_path(Point::new(1, 1), 0);
        assert_eq!(c.path_end(), Point::new(1, 1));
        c.clear_path();
        assert_eq!(c.path_end(), c.loc());
    }
}
