//! Encrypted reading histories, one per user, last write wins.

use chrono::{DateTime, Utc};

use crate::error::{BubbleError, Result};
use crate::registry::CategoryRegistry;
use crate::store::{KvStore, MemoryStore};
use crate::types::UserId;

#[derive(Debug, Clone)]
pub struct EncryptedReadingHistory<C> {
    pub user: UserId,
    pub article_ids: Vec<C>,
    /// One entry per registered category, in index order.
    pub category_scores: Vec<C>,
    /// One entry per registered category, in index order.
    pub sentiment_scores: Vec<C>,
    pub submitted_at: DateTime<Utc>,
}

pub struct HistoryStore<C, S = MemoryStore<UserId, EncryptedReadingHistory<C>>> {
    records: S,
    _ciphertext: std::marker::PhantomData<C>,
}

impl<C> Default for HistoryStore<C> {
    fn default() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl<C> HistoryStore<C> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C, S> HistoryStore<C, S>
where
    S: KvStore<UserId, EncryptedReadingHistory<C>>,
{
    pub fn with_store(records: S) -> Self {
        Self {
            records,
            _ciphertext: std::marker::PhantomData,
        }
    }

    /// Replace the user's history. Both score vectors must match the
    /// registry; nothing is written otherwise.
    pub fn submit(
        &mut self,
        registry: &CategoryRegistry,
        user: UserId,
        article_ids: Vec<C>,
        category_scores: Vec<C>,
        sentiment_scores: Vec<C>,
        submitted_at: DateTime<Utc>,
    ) -> Result<()> {
        registry.check_shape("category_scores", category_scores.len())?;
        registry.check_shape("sentiment_scores", sentiment_scores.len())?;

        let record = EncryptedReadingHistory {
            user: user.clone(),
            article_ids,
            category_scores,
            sentiment_scores,
            submitted_at,
        };
        self.records.put(user, record);
        Ok(())
    }

    pub fn get(&self, user: &UserId) -> Result<&EncryptedReadingHistory<C>> {
        self.records.get(user).ok_or_else(|| BubbleError::NotFound {
            what: "reading history",
            user: user.clone(),
        })
    }
}
