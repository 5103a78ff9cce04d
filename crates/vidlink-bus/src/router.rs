//! The router: address registry plus store-and-forward relay.
//!
//! Each registered address owns a queue pair. The router keeps the "local"
//! endpoint over that pair and hands the mirrored "remote" endpoint to the
//! registrant. One call to [`Router::dispatch`] is one relay hop for every
//! address that has something waiting.
//!
//! # Dispatch policy
//!
//! ```text
//! for each address, in registration order:
//!     poll its local endpoint ONCE
//!     nothing?         → next address
//!     not the uplink?  → send to the uplink's local endpoint
//!     the uplink?      → send to the local endpoint of msg.destination()
//! ```
//!
//! Only one message per address moves per pass. A burst of N messages from
//! one address therefore takes N ticks to clear, and per-address order is
//! preserved across the two hops.

use std::collections::HashMap;

use crate::{Address, BusError, Endpoint, Routable};

/// Routes messages between registered addresses through a single uplink.
pub struct Router<T> {
    uplink: Address,
    /// Local endpoints in registration order.
    routes: Vec<Endpoint<T>>,
    /// Address → index into `routes`.
    index: HashMap<Address, usize>,
}

impl<T: Routable> Router<T> {
    /// Creates an empty router whose uplink is [`Address::UPLINK`].
    pub fn new() -> Self {
        Self::with_uplink(Address::UPLINK)
    }

    /// Creates an empty router relaying through `uplink`.
    pub fn with_uplink(uplink: Address) -> Self {
        Self {
            uplink,
            routes: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Registers `address` and returns the endpoint its owner should use.
    ///
    /// # Errors
    /// Returns [`BusError::AlreadyRegistered`] if the address already has a
    /// channel. The existing channel is left untouched.
    pub fn register(&mut self, address: Address) -> Result<Endpoint<T>, BusError> {
        if self.index.contains_key(&address) {
            return Err(BusError::AlreadyRegistered(address));
        }

        let local = Endpoint::new(address, Default::default(), Default::default());
        let remote = local.mirror();

        self.index.insert(address, self.routes.len());
        self.routes.push(local);

        tracing::info!(
            %address,
            uplink = address == self.uplink,
            routes = self.routes.len(),
            "endpoint registered"
        );
        Ok(remote)
    }

    /// Runs one relay pass and returns how many messages moved.
    ///
    /// # Errors
    /// - [`BusError::UnknownDestination`] if the uplink sent a message to an
    ///   address nobody registered. The pass stops at that point and the
    ///   message is dropped; addresses after it are not polled this pass.
    /// - [`BusError::NoUplink`] if a non-uplink address had traffic but the
    ///   uplink was never registered.
    pub fn dispatch(&mut self) -> Result<usize, BusError> {
        let uplink = self.index.get(&self.uplink).copied();
        let mut forwarded = 0;

        for route in &self.routes {
            let Some(message) = route.poll() else {
                continue;
            };
            let from = route.address();

            let (to, target) = if from != self.uplink {
                let Some(i) = uplink else {
                    tracing::error!(%from, uplink = %self.uplink, "no uplink to relay to");
                    return Err(BusError::NoUplink(self.uplink));
                };
                (self.uplink, i)
            } else {
                let destination = message.destination();
                let Some(&i) = self.index.get(&destination) else {
                    tracing::error!(
                        %destination,
                        "uplink sent to unregistered destination, aborting dispatch"
                    );
                    return Err(BusError::UnknownDestination(destination));
                };
                (destination, i)
            };

            tracing::debug!(%from, %to, "relaying message");
            self.routes[target].send(message);
            forwarded += 1;
        }

        tracing::trace!(forwarded, "dispatch pass complete");
        Ok(forwarded)
    }

    /// The address all non-uplink traffic is relayed through.
    pub fn uplink(&self) -> Address {
        self.uplink
    }

    /// Whether `address` has a channel on this router.
    pub fn is_registered(&self, address: Address) -> bool {
        self.index.contains_key(&address)
    }

    /// Registered addresses in registration order.
    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.routes.iter().map(Endpoint::address)
    }

    /// Number of registered addresses.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<T: Routable> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Router<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("uplink", &self.uplink)
            .field("routes", &self.routes)
            .finish()
    }
}
