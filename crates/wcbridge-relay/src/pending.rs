//! Pending-request table: which forwarded commands still await a reply.

use std::collections::HashMap;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use wcbridge_common::{Action, ReplyEnvelope, RequestId};

struct PendingRequest {
    action: Action,
    issued_at: Instant,
    settled: CancellationToken,
}

#[derive(Default)]
pub struct PendingTable {
    requests: HashMap<RequestId, PendingRequest>,
}

impl PendingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a forwarded request. The returned token fires once the
    /// request is resolved or removed.
    pub fn insert(&mut self, id: RequestId, action: Action) -> CancellationToken {
        let settled = CancellationToken::new();
        let previous = self.requests.insert(
            id,
            PendingRequest {
                action,
                issued_at: Instant::now(),
                settled: settled.clone(),
            },
        );
        if let Some(previous) = previous {
            previous.settled.cancel();
        }
        settled
    }

    /// Match `reply` to a pending request and remove it.
    ///
    /// A reply carrying an id must match both id and action tag. A reply
    /// without one resolves the oldest pending request of that action.
    pub fn resolve(&mut self, reply: &ReplyEnvelope) -> Option<(RequestId, Action)> {
        let id = match &reply.id {
            Some(id) => {
                let pending = self.requests.get(id)?;
                if !reply.answers(&pending.action) {
                    return None;
                }
                id.clone()
            }
            None => self
                .requests
                .iter()
                .filter(|(_, p)| reply.answers(&p.action))
                .min_by_key(|(_, p)| p.issued_at)
                .map(|(id, _)| id.clone())?,
        };
        let pending = self.requests.remove(&id)?;
        pending.settled.cancel();
        Some((id, pending.action))
    }

    /// Drop a request, e.g. after its reply timed out. Returns its action.
    pub fn remove(&mut self, id: &RequestId) -> Option<Action> {
        let pending = self.requests.remove(id)?;
        pending.settled.cancel();
        Some(pending.action)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }
}
