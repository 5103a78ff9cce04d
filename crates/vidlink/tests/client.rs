//! Client loop tests against the demo script.

use vidlink::prelude::*;
use vidlink::{GameError, ScriptStep, VidlinkError};

fn demo_client() -> GameClient {
    GameClient::builder().build().unwrap()
}

// =========================================================================
// Manual ticks
// =========================================================================

#[test]
fn test_nothing_happens_before_first_step() {
    let mut client = demo_client();
    let report = client.tick(1_000).unwrap();
    assert_eq!(
        report,
        TickReport {
            tick: 1,
            now: 1_000,
            ..TickReport::default()
        }
    );
    assert_eq!(client.engine().entity_count(), 0);
}

#[test]
fn test_demo_timeline_plays_out() {
    let mut client = demo_client();

    let report = client.tick(1_001).unwrap();
    assert_eq!((report.sent, report.forwarded, report.applied), (1, 1, 1));
    assert_eq!(client.engine().avatar(), Some(EntityId(0)));
    assert_eq!(client.engine().current_map(), Some("Himalayas"));

    client.tick(1_501).unwrap();
    client.tick(1_701).unwrap();
    client.tick(2_301).unwrap();
    assert_eq!(client.engine().entity_count(), 3);
    assert_eq!(client.engine().action_count(), 1);

    client.tick(2_501).unwrap();
    let walker = client.engine().entity(EntityId(1)).unwrap();
    assert!(walker.is_moving());
    assert_eq!(walker.speed(), 150);
    assert_eq!(walker.path_end(), Point::new(4, 5));

    client.tick(4_000).unwrap();
    let walker = client.engine().entity(EntityId(1)).unwrap();
    assert_eq!(walker.loc(), Point::new(4, 5));
    assert!(!walker.is_moving());

    client.tick(5_001).unwrap();
    assert_eq!(client.engine().entity(EntityId(2)).unwrap().hp(), 60);

    client.tick(6_001).unwrap();
    client.tick(6_501).unwrap();
    assert_eq!(client.engine().entity(EntityId(2)).unwrap().hp(), 20);

    client.tick(9_001).unwrap();
    client.tick(10_001).unwrap();
    let left: Vec<EntityId> = client.engine().entities().map(|c| c.id()).collect();
    assert_eq!(left, vec![EntityId(0)]);
}

#[test]
fn test_burst_of_due_steps_drains_one_per_tick() {
    let mut client = demo_client();

    // Identity, Zathril, the first action and the yeti all come due at once.
    let report = client.tick(2_400).unwrap();
    assert_eq!(report.sent, 4);
    assert_eq!(report.applied, 1);

    for now in [2_410, 2_420, 2_430] {
        assert_eq!(client.tick(now).unwrap().applied, 1);
    }
    assert_eq!(client.engine().entity_count(), 3);
    assert_eq!(client.tick(2_440).unwrap().applied, 0);
}

#[test]
fn test_bad_server_message_surfaces_as_game_error() {
    let script = Script {
        period_ms: None,
        repeat_from: 0,
        steps: vec![ScriptStep {
            at_ms: 0,
            message: EntityDisappear { entity_id: EntityId(9) }.into(),
        }],
    };
    let mut client = GameClient::builder().script(script).build().unwrap();

    let err = client.tick(1).unwrap_err();
    assert!(matches!(
        err,
        VidlinkError::Game(GameError::EntityNotFound(EntityId(9)))
    ));
    assert_eq!(client.ticks(), 1);
}

#[test]
fn test_builder_rejects_bad_config() {
    let err = GameClient::builder()
        .config(ClientConfig {
            tick_rate_hz: 0,
            ..ClientConfig::default()
        })
        .build()
        .unwrap_err();
    assert!(matches!(err, VidlinkError::Config(_)));
}

#[test]
fn test_builder_rejects_unordered_script() {
    let mut script = Script::demo();
    script.steps.reverse();
    let err = GameClient::builder().script(script).build().unwrap_err();
    assert!(matches!(err, VidlinkError::Script(_)));
}

#[test]
fn test_client_registers_uplink_then_engine() {
    let client = demo_client();
    let addresses: Vec<Address> = client.router().addresses().collect();
    assert_eq!(addresses, vec![Address::UPLINK, Address::GAME_ENGINE]);
}

// =========================================================================
// Scheduled loop (paused time)
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_run_stops_at_max_ticks() {
    let mut client = GameClient::builder()
        .config(ClientConfig {
            tick_rate_hz: 100,
            max_ticks: Some(200),
            ..ClientConfig::default()
        })
        .build()
        .unwrap();

    let ran = client.run().await.unwrap();
    assert_eq!(ran, 200);
    assert_eq!(client.ticks(), 200);

    // 200 ticks at 100 Hz is two seconds: identity, Zathril and the first
    // action have arrived, the yeti hasn't.
    let engine = client.engine();
    assert_eq!(engine.avatar(), Some(EntityId(0)));
    assert!(engine.contains(EntityId(1)));
    assert!(!engine.contains(EntityId(2)));
}

#[tokio::test(start_paused = true)]
async fn test_run_with_sees_every_tick_in_order() {
    let mut client = GameClient::builder()
        .config(ClientConfig {
            tick_rate_hz: 50,
            max_ticks: Some(25),
            ..ClientConfig::default()
        })
        .build()
        .unwrap();

    let mut seen = Vec::new();
    client
        .run_with(|report, _| seen.push((report.tick, report.now)))
        .await
        .unwrap();

    assert_eq!(seen.len(), 25);
    assert_eq!(seen[0], (1, 20));
    assert_eq!(seen[24], (25, 500));
    assert!(seen.windows(2).all(|w| w[0].1 < w[1].1));
}

#[tokio::test(start_paused = true)]
async fn test_run_skips_rejected_messages() {
    let script = Script {
        period_ms: None,
        repeat_from: 0,
        steps: vec![
            ScriptStep {
                at_ms: 0,
                message: EntityDisappear { entity_id: EntityId(9) }.into(),
            },
            ScriptStep {
                at_ms: 0,
                message: EntityAppear {
                    entity_id: EntityId(4),
                    name: "Late".into(),
                    skin: "yeti".into(),
                    loc: Point::default(),
                }
                .into(),
            },
        ],
    };
    let mut client = GameClient::builder()
        .config(ClientConfig {
            tick_rate_hz: 10,
            max_ticks: Some(5),
            ..ClientConfig::default()
        })
        .script(script)
        .build()
        .unwrap();

    let mut observed = 0;
    let ran = client.run_with(|_, _| observed += 1).await.unwrap();

    assert_eq!(ran, 5);
    assert_eq!(observed, 4);
    assert!(client.engine().contains(EntityId(4)));
}
