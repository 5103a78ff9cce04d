//! # Vidlink
//!
//! Headless client for a real-time tile game, built around an
//! address-routed message bus.
//!
//! Participants register an [`Address`] with the [`Router`] and talk through
//! the [`Endpoint`] they get back. The router runs a star topology: every
//! message goes up to the uplink (the server connection), and the uplink's
//! traffic is delivered by destination. The client ships with a scripted
//! [`ServerSimulator`] on the uplink and a [`MessageHandler`] feeding the
//! [`GameEngine`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vidlink::prelude::*;
//!
//! # async fn start() -> Result<(), VidlinkError> {
//! let config = ClientConfig {
//!     max_ticks: Some(600),
//!     ..ClientConfig::default()
//! };
//! let mut client = GameClient::builder().config(config).build()?;
//! client.run().await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod simulator;

pub use client::{GameClient, GameClientBuilder, TickReport};
pub use config::ClientConfig;
pub use error::VidlinkError;
pub use simulator::{Script, ScriptStep, ServerSimulator};

pub use vidlink_bus::{Address, BlockingQueue, BusError, Endpoint, Routable, Router};
pub use vidlink_game::{Character, GameEngine, GameError, MessageHandler};
pub use vidlink_protocol::{Message, Millis};

/// Sub-crates, for the less common types.
pub use vidlink_bus as bus;
pub use vidlink_game as game;
pub use vidlink_protocol as protocol;
pub use vidlink_tick as tick;

pub mod prelude {
    //! Everything needed to build and run a client.

    pub use crate::{
        Address, ClientConfig, Endpoint, GameClient, GameEngine, Message, Millis,
        Routable, Router, Script, TickReport, VidlinkError,
    };
    pub use vidlink_protocol::{
        AffectedTarget, EntityAction, EntityAppear, EntityDisappear, EntityId,
        EntityMove, Identity, Point,
    };
}
