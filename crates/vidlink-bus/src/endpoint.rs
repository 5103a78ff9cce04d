//! Directional send/poll view over a queue pair.

use std::sync::Arc;

use crate::{Address, BlockingQueue};

/// One side of a conversation on the bus.
///
/// An endpoint wraps two queues: it pushes to `outbound` and pops from
/// `inbound`. The router builds two endpoints per address over the same pair
/// with the roles swapped, so whatever one side sends the other side polls.
///
/// Endpoints are deliberately not `Clone`: each address has exactly one
/// remote endpoint, handed to whoever registered it.
pub struct Endpoint<T> {
    address: Address,
    inbound: Arc<BlockingQueue<T>>,
    outbound: Arc<BlockingQueue<T>>,
}

impl<T> Endpoint<T> {
    pub(crate) fn new(
        address: Address,
        inbound: Arc<BlockingQueue<T>>,
        outbound: Arc<BlockingQueue<T>>,
    ) -> Self {
        Self {
            address,
            inbound,
            outbound,
        }
    }

    /// Builds the mirror image of this endpoint: same queues, roles swapped.
    pub(crate) fn mirror(&self) -> Self {
        Self {
            address: self.address,
            inbound: Arc::clone(&self.outbound),
            outbound: Arc::clone(&self.inbound),
        }
    }

    /// The address this endpoint is bound to.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Queues `message` for the other side. Fire-and-forget.
    pub fn send(&self, message: T) {
        self.outbound.push(message);
    }

    /// Takes the next inbound message, if any. Never blocks.
    pub fn poll(&self) -> Option<T> {
        self.inbound.try_pop()
    }

    /// Iterates over inbound messages until the queue is empty.
    ///
    /// ```
    /// # use vidlink_bus::{Address, Router, Routable};
    /// # struct Ping;
    /// # impl Routable for Ping { fn destination(&self) -> Address { Address::UPLINK } }
    /// let mut router = Router::<Ping>::new();
    /// let uplink = router.register(Address::UPLINK).unwrap();
    /// for message in uplink.drain() {
    ///     // handle message
    /// #   let _ = message;
    /// }
    /// ```
    pub fn drain(&self) -> Drain<'_, T> {
        Drain { endpoint: self }
    }

    /// Inbound messages waiting right now. Advisory only.
    pub fn pending(&self) -> usize {
        self.inbound.len()
    }
}

impl<T> std::fmt::Debug for Endpoint<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("address", &self.address)
            .field("inbound", &self.inbound.len())
            .field("outbound", &self.outbound.len())
            .finish()
    }
}

/// Iterator returned by [`Endpoint::drain`].
pub struct Drain<'a, T> {
    endpoint: &'a Endpoint<T>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.endpoint.poll()
    }
}
