//! Error types for the bus.

use crate::Address;

/// Structural failures on the bus.
///
/// An empty queue is never one of these: `poll` and `try_pop` return
/// `None` for that.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// The address already has a channel on this router.
    #[error("address {0} is already registered")]
    AlreadyRegistered(Address),

    /// The uplink relayed a message to an address nobody registered.
    /// The dispatch pass that hit this was aborted.
    #[error("no endpoint registered for destination {0}")]
    UnknownDestination(Address),

    /// A non-uplink address produced traffic but the router has no uplink
    /// to relay it to.
    #[error("uplink {0} is not registered")]
    NoUplink(Address),
}
