//! Client order id allocation.

use crate::gateway::OrderId;

/// Issues unique, strictly increasing order ids starting at 1.
///
/// Inserts and hedges draw from the same sequence, so an id is never reused
/// for the lifetime of the process.
#[derive(Debug)]
pub struct OrderIdAllocator {
    next: OrderId,
}

impl OrderIdAllocator {
    /// Create an allocator whose first id is 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocate the next id.
    pub fn next_id(&mut self) -> OrderId {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for OrderIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
