//! In-process message bus for vidlink.
//!
//! The bus decouples a remote producer (the uplink, standing in for a game
//! server) from local consumers such as the game-state engine. Neither side
//! knows about the other: each registers an [`Address`] with the
//! [`Router`] and gets back an [`Endpoint`] it can `send` on and `poll`.
//!
//! # Topology
//!
//! The router is a star centred on the uplink address:
//!
//! ```text
//!   engine ──send──▶ [dispatch] ──▶ uplink ──send──▶ [dispatch] ──▶ destination
//! ```
//!
//! Traffic from any non-uplink address is relayed to the uplink first,
//! whatever its declared destination. Only the uplink fans out by
//! destination.
//!
//! # Threading
//!
//! [`BlockingQueue`] is the only thread-safe primitive here. The router and
//! its endpoints are meant to be driven from one tick loop; `dispatch` takes
//! `&mut self`, so the registry can't be mutated concurrently.

mod address;
mod endpoint;
mod error;
mod queue;
mod router;

pub use address::{Address, Routable};
pub use endpoint::{Drain, Endpoint};
pub use error::BusError;
pub use queue::BlockingQueue;
pub use router::Router;
