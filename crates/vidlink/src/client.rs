//! `GameClient` builder and client loop.
//!
//! The client ties the layers together. The server simulator sits on the
//! uplink, the message handler on the game-engine address, and the router
//! moves traffic between them once per tick.

use vidlink_bus::{Address, Endpoint, Router};
use vidlink_game::{GameEngine, GameError, MessageHandler};
use vidlink_protocol::{Message, Millis};
use vidlink_tick::TickScheduler;

use crate::{ClientConfig, Script, ServerSimulator, VidlinkError};

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// Time the tick ran at.
    pub now: Millis,
    /// Script steps the server sent.
    pub sent: usize,
    /// Messages the router moved.
    pub forwarded: usize,
    /// Messages applied to the game state.
    pub applied: usize,
}

/// Builder for a [`GameClient`].
///
/// # Example
///
/// ```rust
/// use vidlink::prelude::*;
///
/// let mut client = GameClient::builder()
///     .config(ClientConfig { tick_rate_hz: 30, ..ClientConfig::default() })
///     .build()
///     .unwrap();
///
/// let report = client.tick(1_001).unwrap();
/// assert_eq!(report.sent, 1);
/// ```
#[derive(Debug, Default)]
pub struct GameClientBuilder {
    config: ClientConfig,
    script: Option<Script>,
}

impl GameClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Plays `script` instead of whatever the config names.
    pub fn script(mut self, script: Script) -> Self {
        self.script = Some(script);
        self
    }

    /// Validates the settings, registers the uplink and the game engine,
    /// and wires the simulator and handler to them.
    pub fn build(self) -> Result<GameClient, VidlinkError> {
        self.config.validate()?;
        let script = match self.script {
            Some(script) => script,
            None => self.config.load_script()?,
        };
        script.validate()?;

        let mut router = Router::new();
        let uplink = router.register(Address::UPLINK)?;
        let engine_endpoint = router.register(Address::GAME_ENGINE)?;

        tracing::info!(
            rate_hz = self.config.tick_rate_hz,
            steps = script.steps.len(),
            period_ms = ?script.period_ms,
            "game client built"
        );

        Ok(GameClient {
            router,
            simulator: ServerSimulator::new(uplink, script, 0),
            handler: MessageHandler::new(engine_endpoint),
            engine: GameEngine::new(),
            config: self.config,
            ticks: 0,
        })
    }
}

/// A headless game client: bus, simulated server and game state.
#[derive(Debug)]
pub struct GameClient {
    router: Router<Message>,
    simulator: ServerSimulator,
    handler: MessageHandler,
    engine: GameEngine,
    config: ClientConfig,
    ticks: u64,
}

impl GameClient {
    pub fn builder() -> GameClientBuilder {
        GameClientBuilder::new()
    }

    /// Runs one tick at `now`.
    ///
    /// In order: the server sends what is due and echoes relayed traffic,
    /// the router makes one dispatch pass, the handler applies whatever
    /// reached the engine, and the world advances to `now`.
    ///
    /// # Errors
    /// A [`VidlinkError::Bus`] from dispatch or a [`VidlinkError::Game`]
    /// from a message that didn't apply. Either way the world is not
    /// advanced for this tick.
    pub fn tick(&mut self, now: Millis) -> Result<TickReport, VidlinkError> {
        self.ticks += 1;

        let sent = self.simulator.update(now);
        self.simulator.relay();
        let forwarded = self.router.dispatch()?;
        let applied = self.handler.update(&mut self.engine, now)?;
        self.engine.update(now);

        Ok(TickReport {
            tick: self.ticks,
            now,
            sent,
            forwarded,
            applied,
        })
    }

    /// Registers another participant on the bus and returns its endpoint.
    /// Anything it sends goes up to the server and comes back by
    /// destination.
    pub fn attach(&mut self, address: Address) -> Result<Endpoint<Message>, VidlinkError> {
        Ok(self.router.register(address)?)
    }

    /// Runs the client loop until `max_ticks`, or forever if unset.
    pub async fn run(&mut self) -> Result<u64, VidlinkError> {
        self.run_with(|_, _| {}).await
    }

    /// Like [`run`](Self::run), calling `observer` after every tick.
    ///
    /// A server message that fails to apply is logged and skipped. Bus
    /// errors end the run.
    pub async fn run_with<F>(&mut self, mut observer: F) -> Result<u64, VidlinkError>
    where
        F: FnMut(&TickReport, &GameEngine),
    {
        let mut scheduler = TickScheduler::new(self.config.tick_config());
        tracing::info!(
            rate_hz = scheduler.tick_rate_hz(),
            max_ticks = ?self.config.max_ticks,
            "client loop running"
        );

        let mut ran = 0;
        while self.config.max_ticks.is_none_or(|max| ran < max) {
            let info = scheduler.wait_for_tick().await;
            match self.tick(info.now) {
                Ok(report) => observer(&report, &self.engine),
                Err(VidlinkError::Game(e)) => log_rejected(&e, info.tick),
                Err(e) => {
                    tracing::error!(error = %e, tick = info.tick, "client loop stopped");
                    return Err(e);
                }
            }
            scheduler.record_tick_end();
            ran += 1;
        }

        let metrics = scheduler.metrics();
        tracing::info!(
            ticks = metrics.total_ticks,
            overruns = metrics.total_overruns,
            skipped = metrics.total_skipped,
            "client loop finished"
        );
        Ok(ran)
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn router(&self) -> &Router<Message> {
        &self.router
    }

    pub fn simulator(&self) -> &ServerSimulator {
        &self.simulator
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Ticks run so far, including ones that failed.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

fn log_rejected(error: &GameError, tick: u64) {
    tracing::warn!(error = %error, tick, "server message rejected");
}
