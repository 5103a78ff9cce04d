//! Scripted stand-in for the game server.
//!
//! The simulator owns the uplink endpoint. It plays a [`Script`], a timeline
//! of messages with offsets from the start of the run, and acts as the
//! uplink's consumer: anything relayed to the uplink by another address is
//! sent straight back out, where the router delivers it by destination.

use serde::{Deserialize, Serialize};
use vidlink_bus::Endpoint;
use vidlink_protocol::{
    AffectedTarget, Codec, EntityAction, EntityAppear, EntityDisappear,
    EntityId, EntityMove, Identity, JsonCodec, Message, Millis, Point,
};

use crate::VidlinkError;

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

/// One scheduled message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStep {
    /// Offset from the start of the pass. The step fires once strictly more
    /// than this many milliseconds have passed.
    pub at_ms: Millis,
    pub message: Message,
}

/// A timeline of server messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// If set, the timeline restarts once this long has passed since the
    /// current pass began and every step has fired.
    #[serde(default)]
    pub period_ms: Option<Millis>,
    /// Index of the first step replayed on each restart. Lets one-off setup
    /// steps (like the player's identity) run only on the first pass.
    #[serde(default)]
    pub repeat_from: usize,
    pub steps: Vec<ScriptStep>,
}

impl Script {
    /// Checks that steps are in time order and the loop point is in range.
    ///
    /// # Errors
    /// [`VidlinkError::Script`] describing the first problem found.
    pub fn validate(&self) -> Result<(), VidlinkError> {
        if let Some(pair) = self.steps.windows(2).find(|w| w[1].at_ms < w[0].at_ms) {
            return Err(VidlinkError::Script(format!(
                "step at {} ms comes after step at {} ms",
                pair[1].at_ms, pair[0].at_ms
            )));
        }
        if self.period_ms.is_some() && self.repeat_from >= self.steps.len() {
            return Err(VidlinkError::Script(format!(
                "repeat_from {} is past the last of {} steps",
                self.repeat_from,
                self.steps.len()
            )));
        }
        Ok(())
    }

    /// Parses and validates a JSON script.
    pub fn from_json(data: &[u8]) -> Result<Self, VidlinkError> {
        let script: Script = JsonCodec.decode(data)?;
        script.validate()?;
        Ok(script)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, VidlinkError> {
        Ok(JsonCodec.encode(self)?)
    }

    /// The built-in demo: the player shows up, two others appear, one
    /// walks around and attacks the yeti, then both leave. Loops every 12 s
    /// without re-sending the identity.
    pub fn demo() -> Self {
        let steps = vec![
            step(1_000, Identity {
                appear: EntityAppear {
                    entity_id: EntityId(0),
                    name: "Kirtah".into(),
                    skin: "yeti".into(),
                    loc: Point::new(-5, 0),
                },
                map: "Himalayas".into(),
            }),
            step(1_500, EntityAppear {
                entity_id: EntityId(1),
                name: "Zathril".into(),
                skin: "azlar".into(),
                loc: Point::default(),
            }),
            step(1_700, attack(3, 1, 100)),
            step(2_300, EntityAppear {
                entity_id: EntityId(2),
                name: "Yeti".into(),
                skin: "yeti".into(),
                loc: Point::new(4, -2),
            }),
            step(2_500, walk(150, &[(0, 0), (1, 0), (2, 0), (2, 1), (2, 2), (2, 3), (3, 4), (4, 5)])),
            step(5_000, attack(5, 2, 60)),
            step(6_000, walk(175, &[(4, 4), (4, 3), (3, 2), (2, 1), (1, 1)])),
            step(6_500, attack(5, 2, 20)),
            step(9_000, EntityDisappear { entity_id: EntityId(1) }),
            step(10_000, EntityDisappear { entity_id: EntityId(2) }),
        ];

        Self {
            period_ms: Some(12_000),
            repeat_from: 1,
            steps,
        }
    }
}

fn step(at_ms: Millis, message: impl Into<Message>) -> ScriptStep {
    ScriptStep {
        at_ms,
        message: message.into(),
    }
}

/// Zathril (entity 1) uses `action_id` at (4, 5), leaving `target` on `hp`.
fn attack(action_id: u32, target: u32, hp: u32) -> EntityAction {
    EntityAction {
        entity_id: EntityId(1),
        action_id,
        skill_id: 0,
        location: Point::new(4, 5),
        affected: vec![AffectedTarget {
            entity_id: EntityId(target),
            hp,
        }],
    }
}

fn walk(speed: u32, path: &[(i32, i32)]) -> EntityMove {
    EntityMove {
        entity_id: EntityId(1),
        speed,
        path: path.iter().map(|&p| p.into()).collect(),
    }
}

// ---------------------------------------------------------------------------
// ServerSimulator
// ---------------------------------------------------------------------------

/// Plays a [`Script`] into the uplink and echoes relayed traffic.
#[derive(Debug)]
pub struct ServerSimulator {
    uplink: Endpoint<Message>,
    script: Script,
    /// Start of the current pass.
    start: Millis,
    /// Next step to fire.
    cursor: usize,
    passes: u64,
}

impl ServerSimulator {
    /// Starts `script` at `start` on the given uplink endpoint.
    pub fn new(uplink: Endpoint<Message>, script: Script, start: Millis) -> Self {
        Self {
            uplink,
            script,
            start,
            cursor: 0,
            passes: 0,
        }
    }

    /// Sends every step that has come due by `now`, in order, and returns
    /// how many were sent. Restarts the timeline once the period is up.
    pub fn update(&mut self, now: Millis) -> usize {
        let mut sent = 0;
        loop {
            let elapsed = now.saturating_sub(self.start);

            if let Some(step) = self.script.steps.get(self.cursor) {
                if elapsed <= step.at_ms {
                    break;
                }
                tracing::debug!(
                    kind = step.message.kind(),
                    entity = %step.message.entity_id(),
                    at_ms = step.at_ms,
                    "server sending"
                );
                self.uplink.send(step.message.clone());
                self.cursor += 1;
                sent += 1;
                continue;
            }

            match self.script.period_ms {
                Some(period) if elapsed > period => {
                    self.start = now;
                    self.cursor = self.script.repeat_from;
                    self.passes += 1;
                    tracing::info!(pass = self.passes, "server script restarting");
                }
                _ => break,
            }
        }
        sent
    }

    /// Sends every message waiting at the uplink back out as the uplink,
    /// so the router can deliver it to its destination. Returns how many.
    pub fn relay(&mut self) -> usize {
        let mut relayed = 0;
        for message in self.uplink.drain() {
            tracing::debug!(
                kind = message.kind(),
                to = %vidlink_bus::Routable::destination(&message),
                "server relaying"
            );
            self.uplink.send(message);
            relayed += 1;
        }
        relayed
    }

    pub fn endpoint(&self) -> &Endpoint<Message> {
        &self.uplink
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Completed restarts of the timeline.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Whether every step of the current pass has fired.
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.script.steps.len()
    }
}

#[cfg(test)]
mod tests {
    use vidlink_bus::{Address, Router};

    use super::*;

    fn uplink() -> (Router<Message>, Endpoint<Message>) {
        let mut router = Router::new();
        let endpoint = router.register(Address::UPLINK).unwrap();
        (router, endpoint)
    }

    #[test]
    fn test_demo_script_is_valid() {
        let script = Script::demo();
        script.validate().unwrap();
        assert_eq!(script.steps.len(), 10);
        assert!(matches!(script.steps[0].message, Message::Identity(_)));
    }

    #[test]
    fn test_out_of_order_steps_rejected() {
        let mut script = Script::demo();
        script.steps.swap(2, 3);
        let err = script.validate().unwrap_err();
        assert!(matches!(err, VidlinkError::Script(_)));
    }

    #[test]
    fn test_repeat_from_out_of_range_rejected() {
        let mut script = Script::demo();
        script.repeat_from = 10;
        assert!(script.validate().is_err());

        script.period_ms = None;
        assert!(script.validate().is_ok());
    }

    #[test]
    fn test_json_round_trip_keeps_demo() {
        let demo = Script::demo();
        let bytes = demo.to_json().unwrap();
        assert_eq!(Script::from_json(&bytes).unwrap(), demo);
    }

    #[test]
    fn test_from_json_applies_defaults() {
        let json = br#"{"steps":[{"at_ms":0,"message":{"type":"EntityDisappear","entity_id":3}}]}"#;
        let script = Script::from_json(json).unwrap();
        assert_eq!(script.period_ms, None);
        assert_eq!(script.repeat_from, 0);
    }

    #[test]
    fn test_steps_fire_strictly_after_offset() {
        let (_router, endpoint) = uplink();
        let mut sim = ServerSimulator::new(endpoint, Script::demo(), 0);

        assert_eq!(sim.update(1_000), 0);
        assert_eq!(sim.update(1_001), 1);
        assert_eq!(sim.update(1_001), 0);
    }

    #[test]
    fn test_late_update_fires_everything_due_in_order() {
        let (mut router, endpoint) = uplink();
        let engine = router.register(Address::GAME_ENGINE).unwrap();
        let mut sim = ServerSimulator::new(endpoint, Script::demo(), 0);

        assert_eq!(sim.update(2_400), 4);

        let mut kinds = Vec::new();
        for _ in 0..4 {
            router.dispatch().unwrap();
            kinds.extend(engine.drain().map(|m| m.kind()));
        }
        assert_eq!(kinds, vec!["Identity", "EntityAppear", "EntityAction", "EntityAppear"]);
    }

    #[test]
    fn test_loop_skips_identity() {
        let (_router, endpoint) = uplink();
        let mut sim = ServerSimulator::new(endpoint, Script::demo(), 0);

        assert_eq!(sim.update(10_001), 10);
        assert!(sim.is_finished());

        assert_eq!(sim.update(12_001), 0);
        assert_eq!(sim.passes(), 1);

        // Second pass starts from the second step, relative to 12_001.
        assert_eq!(sim.update(12_001 + 1_400), 0);
        assert_eq!(sim.update(12_001 + 1_501), 1);
    }

    #[test]
    fn test_relay_echoes_inbound_traffic() {
        let (mut router, endpoint) = uplink();
        let engine = router.register(Address::GAME_ENGINE).unwrap();
        let mut sim = ServerSimulator::new(endpoint, Script { period_ms: None, repeat_from: 0, steps: vec![] }, 0);

        let msg: Message = EntityDisappear { entity_id: EntityId(4) }.into();
        engine.send(msg.clone());
        router.dispatch().unwrap();

        assert_eq!(sim.relay(), 1);
        router.dispatch().unwrap();
        assert_eq!(engine.poll(), Some(msg));
        assert_eq!(sim.relay(), 0);
    }
}
