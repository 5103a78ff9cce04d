//! Logical addresses and the trait that lets a message name one.

use std::fmt;

/// Opaque identifier for a participant registered on the bus.
///
/// A newtype over `u32` so an address can't be confused with an entity id
/// or any other integer flowing through the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub u32);

impl Address {
    /// The relay every non-uplink sender reaches first.
    pub const UPLINK: Address = Address(0);

    /// The local game-state engine.
    pub const GAME_ENGINE: Address = Address(1);
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::UPLINK => write!(f, "uplink"),
            Self::GAME_ENGINE => write!(f, "game-engine"),
            Self(raw) => write!(f, "addr-{raw}"),
        }
    }
}

/// A value that knows where it is headed.
///
/// The router only consults this when relaying traffic that came from the
/// uplink; messages from every other address go to the uplink regardless.
pub trait Routable: Send + 'static {
    /// The address this message should finally be delivered to.
    fn destination(&self) -> Address;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_addresses() {
        assert_eq!(Address::UPLINK, Address(0));
        assert_eq!(Address::GAME_ENGINE, Address(1));
        assert_ne!(Address::UPLINK, Address::GAME_ENGINE);
    }

    #[test]
    fn test_address_display() {
        assert_eq!(Address::UPLINK.to_string(), "uplink");
        assert_eq!(Address::GAME_ENGINE.to_string(), "game-engine");
        assert_eq!(Address(42).to_string(), "addr-42");
    }
}
