//! Messages carried on the vidlink bus.
//!
//! This crate defines what the simulated server tells the client:
//!
//! - **Types** ([`Message`] and its payloads, [`Point`], [`EntityId`]):
//!   a closed set of entity events, each addressed to a bus [`Address`].
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages and scripts
//!   are turned into bytes and back.
//! - **Errors** ([`ProtocolError`]).
//!
//! The bus itself is generic; [`Message`] plugs into it by implementing
//! [`Routable`].
//!
//! [`Address`]: vidlink_bus::Address
//! [`Routable`]: vidlink_bus::Routable

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    AffectedTarget, EntityAction, EntityAppear, EntityDisappear, EntityId,
    EntityMove, Identity, Message, Millis, Point,
};
