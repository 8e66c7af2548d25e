use chrono::{DateTime, Duration, Utc};

use super::RequestId;
use crate::analysis::DecryptedResult;
use crate::error::{BubbleError, Result};
use crate::store::{KvStore, MemoryStore};
use crate::types::UserId;

/// Shape of a disclosure batch, fixed when the request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisclosureLayout {
    pub bias_len: usize,
    pub recommendation_len: usize,
}

impl DisclosureLayout {
    /// Number of cleartexts a matching disclosure carries.
    pub fn expected_len(&self) -> usize {
        1 + self.bias_len + self.recommendation_len
    }

    /// Split cleartexts positionally: diversity, bias, recommendations.
    pub fn decode(&self, cleartexts: &[u32]) -> Result<DecryptedResult> {
        if cleartexts.len() != self.expected_len() {
            return Err(BubbleError::ShapeMismatch {
                field: "cleartexts",
                expected: self.expected_len(),
                actual: cleartexts.len(),
            });
        }
        let (bias, recommended) = cleartexts[1..].split_at(self.bias_len);
        Ok(DecryptedResult {
            diversity_score: cleartexts[0],
            bias_vector: bias.to_vec(),
            recommended_articles: recommended.to_vec(),
            revealed: false,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingStatus {
    Open,
    /// The callback ran its proof check; the id can never resolve again.
    Consumed,
}

#[derive(Debug, Clone)]
pub struct PendingDisclosure {
    pub user: UserId,
    pub requested_at: DateTime<Utc>,
    pub layout: DisclosureLayout,
    pub status: PendingStatus,
}

/// Request ids in flight, plus the one open request per user.
#[derive(Debug, Default)]
pub struct PendingDisclosures {
    by_request: MemoryStore<RequestId, PendingDisclosure>,
    open_by_user: MemoryStore<UserId, RequestId>,
}

impl PendingDisclosures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a request for `user`. That user's consumed ids are dropped, so at
    /// most one request per user is ever retained.
    pub fn open(&mut self, request_id: RequestId, user: UserId, layout: DisclosureLayout, now: DateTime<Utc>) {
        self.by_request
            .retain(|_, p| !(p.user == user && p.status == PendingStatus::Consumed));
        self.open_by_user.put(user.clone(), request_id);
        self.by_request.put(
            request_id,
            PendingDisclosure {
                user,
                requested_at: now,
                layout,
                status: PendingStatus::Open,
            },
        );
    }

    pub fn get(&self, request_id: RequestId) -> Option<&PendingDisclosure> {
        self.by_request.get(&request_id)
    }

    /// The user's open request, if any.
    pub fn outstanding(&self, user: &UserId) -> Option<(RequestId, &PendingDisclosure)> {
        let request_id = *self.open_by_user.get(user)?;
        self.by_request.get(&request_id).map(|p| (request_id, p))
    }

    /// Close an open request. Returns `None` for unknown or consumed ids.
    pub fn consume(&mut self, request_id: RequestId) -> Option<PendingDisclosure> {
        let pending = self.by_request.get_mut(&request_id)?;
        if pending.status != PendingStatus::Open {
            return None;
        }
        pending.status = PendingStatus::Consumed;
        let closed = pending.clone();
        self.open_by_user.delete(&closed.user);
        Some(closed)
    }

    /// Forget every request belonging to `user`, open or consumed.
    pub fn forget_user(&mut self, user: &UserId) {
        self.open_by_user.delete(user);
        self.by_request.retain(|_, p| &p.user != user);
    }

    /// Drop open requests older than `timeout`. Returns what was dropped.
    pub fn expire(&mut self, now: DateTime<Utc>, timeout: Duration) -> Vec<(RequestId, UserId)> {
        let expired: Vec<(RequestId, UserId)> = self
            .by_request
            .iter()
            .filter(|(_, p)| p.status == PendingStatus::Open && now - p.requested_at >= timeout)
            .map(|(id, p)| (*id, p.user.clone()))
            .collect();

        for (request_id, user) in &expired {
            self.by_request.delete(request_id);
            self.open_by_user.delete(user);
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.by_request.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_request.is_empty()
    }
}
