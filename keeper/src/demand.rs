//! Priority queue of registered withdrawal demand (max-heap by pending shares)

use liquidity_vault::{PoolSnapshot, Principal};
use priority_queue::PriorityQueue;

/// Pending withdrawal requests, largest first
#[derive(Debug, Clone, Default)]
pub struct DemandQueue {
    queue: PriorityQueue<Principal, u128>,
}

impl DemandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push or update a holder's pending shares; zero removes the holder
    pub fn push(&mut self, holder: Principal, shares: u128) {
        if shares == 0 {
            self.queue.remove(&holder);
        } else {
            self.queue.push(holder, shares);
        }
    }

    /// Holder with the largest pending request
    pub fn peek(&self) -> Option<(&Principal, &u128)> {
        self.queue.peek()
    }

    /// The `n` largest requests, largest first
    pub fn top(&self, n: usize) -> Vec<(Principal, u128)> {
        self.queue.clone().into_sorted_iter().take(n).collect()
    }

    /// Replace the queue contents with the requests in `snapshot`
    pub fn refresh(&mut self, snapshot: &PoolSnapshot) {
        self.queue.clear();
        for request in &snapshot.pending_requests {
            self.push(request.holder, request.shares);
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
