//! The process-wide analytics service.
//!
//! Owns the category registry, the per-user stores and the disclosure
//! bookkeeping, and drives each user through
//! `NoAnalysis → Complete → DisclosureRequested → Revealed`.
//!
//! Mutating entry points take `&mut self` and validate before writing, so
//! each either applies fully or fails with nothing changed. Share the
//! service across threads behind a mutex.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analysis::{BubbleAnalysis, DecryptedResult, ResultStore};
use crate::backend::EncryptedArithmetic;
use crate::config::BubbleConfig;
use crate::disclosure::{
    DisclosureLayout, DisclosureOracle, DisclosureProof, DisclosureVerifier, PendingDisclosures, PendingStatus,
    RequestId,
};
use crate::engine::{AnalysisOutput, AnalyticsEngine, Recommendation};
use crate::error::{BubbleError, Result};
use crate::events::{BubbleEvent, EventSink, TracingSink};
use crate::history::{EncryptedReadingHistory, HistoryStore};
use crate::registry::CategoryRegistry;
use crate::types::{Clock, SystemClock, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RevealState {
    NoAnalysis,
    /// Analysis stored, not yet revealed, no request in flight
    Complete,
    DisclosureRequested,
    Revealed,
}

pub struct BubbleService<A: EncryptedArithmetic, O> {
    ops: A,
    oracle: O,
    verifier: DisclosureVerifier,
    registry: CategoryRegistry,
    histories: HistoryStore<A::Ciphertext>,
    results: ResultStore<A::Ciphertext>,
    pending: PendingDisclosures,
    disclosure_timeout: Option<Duration>,
    clock: Box<dyn Clock>,
    events: Box<dyn EventSink>,
}

impl<A, O> BubbleService<A, O>
where
    A: EncryptedArithmetic,
    O: DisclosureOracle<A::Ciphertext>,
{
    /// Empty stores, registry seeded from `config.categories`.
    pub fn new(config: &BubbleConfig, ops: A, oracle: O, verifier: DisclosureVerifier) -> Result<Self> {
        config.validate()?;
        let registry = CategoryRegistry::with_categories(config.categories.iter().cloned())?;
        info!(
            categories = registry.count(),
            timeout_secs = ?config.disclosure_timeout_secs,
            "bubble service initialised"
        );
        Ok(Self {
            ops,
            oracle,
            verifier,
            registry,
            histories: HistoryStore::new(),
            results: ResultStore::new(),
            pending: PendingDisclosures::new(),
            disclosure_timeout: config.disclosure_timeout(),
            clock: Box::new(SystemClock),
            events: Box::new(TracingSink),
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_event_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.events = Box::new(sink);
        self
    }

    pub fn ops(&self) -> &A {
        &self.ops
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    pub fn add_category(&mut self, name: impl Into<String>) -> Result<usize> {
        self.registry.add_category(name)
    }

    // Submission

    /// Store the user's encrypted history, replacing any previous one.
    pub fn submit(
        &mut self,
        user: UserId,
        article_ids: Vec<A::Ciphertext>,
        category_scores: Vec<A::Ciphertext>,
        sentiment_scores: Vec<A::Ciphertext>,
    ) -> Result<DateTime<Utc>> {
        let now = self.clock.now();
        self.histories.submit(
            &self.registry,
            user.clone(),
            article_ids,
            category_scores,
            sentiment_scores,
            now,
        )?;
        info!(user = %user, "reading history submitted");
        self.events.emit(BubbleEvent::HistorySubmitted {
            user,
            submitted_at: now,
        });
        Ok(now)
    }

    pub fn history(&self, user: &UserId) -> Result<&EncryptedReadingHistory<A::Ciphertext>> {
        self.histories.get(user)
    }

    // Encrypted analytics

    pub fn diversity_score(&self, user: &UserId) -> Result<A::Ciphertext> {
        let history = self.current_history(user)?;
        Ok(self.engine().diversity_score(&history.category_scores))
    }

    pub fn bias_vector(&self, user: &UserId) -> Result<Vec<A::Ciphertext>> {
        let history = self.current_history(user)?;
        Ok(self
            .engine()
            .bias_vector(&history.category_scores, &history.sentiment_scores))
    }

    pub fn recommend(&self, user: &UserId) -> Result<Recommendation<A::Ciphertext>> {
        let history = self.current_history(user)?;
        Ok(self.engine().recommend(&history.category_scores))
    }

    /// Run every computation without storing anything.
    pub fn compute_analysis(&self, user: &UserId) -> Result<AnalysisOutput<A::Ciphertext>> {
        let history = self.current_history(user)?;
        Ok(self.engine().analyze(history))
    }

    /// Compute and store in one step.
    pub fn analyze(&mut self, user: &UserId) -> Result<()> {
        let output = self.compute_analysis(user)?;
        self.store_analysis(
            user.clone(),
            output.diversity_score,
            output.bias_vector,
            output.recommendation.articles,
        )
    }

    // Results

    /// Replace the user's analysis. Resets the revealed result and drops any
    /// disclosure still tied to the previous analysis.
    pub fn store_analysis(
        &mut self,
        user: UserId,
        diversity_score: A::Ciphertext,
        bias_vector: Vec<A::Ciphertext>,
        recommended_articles: Vec<A::Ciphertext>,
    ) -> Result<()> {
        self.results.store(
            &self.registry,
            user.clone(),
            diversity_score,
            bias_vector,
            recommended_articles,
        )?;
        self.pending.forget_user(&user);
        info!(user = %user, "analysis stored");
        self.events.emit(BubbleEvent::AnalysisStored { user });
        Ok(())
    }

    pub fn get_encrypted_analysis(&self, user: &UserId) -> Result<&BubbleAnalysis<A::Ciphertext>> {
        self.results.get_encrypted(user)
    }

    pub fn get_decrypted_analysis(&self, user: &UserId) -> DecryptedResult {
        self.results.get_decrypted(user)
    }

    pub fn reveal_state(&self, user: &UserId) -> RevealState {
        if !self.results.is_complete(user) {
            RevealState::NoAnalysis
        } else if self.results.is_revealed(user) {
            RevealState::Revealed
        } else if self.pending.outstanding(user).is_some() {
            RevealState::DisclosureRequested
        } else {
            RevealState::Complete
        }
    }

    // Reveal protocol

    /// Submit the user's encrypted results for disclosure.
    pub fn request_reveal(&mut self, user: &UserId) -> Result<RequestId> {
        if !self.results.is_complete(user) {
            return Err(BubbleError::NotComplete(user.clone()));
        }
        if self.results.is_revealed(user) {
            return Err(BubbleError::AlreadyRevealed(user.clone()));
        }

        self.expire_disclosures();
        if let Some((request_id, _)) = self.pending.outstanding(user) {
            return Err(BubbleError::DisclosurePending {
                user: user.clone(),
                request_id,
            });
        }

        let analysis = self.results.get_encrypted(user)?;
        let layout = DisclosureLayout {
            bias_len: analysis.bias_vector.len(),
            recommendation_len: analysis.recommended_articles.len(),
        };
        let batch = analysis.disclosure_batch();

        let request_id = self.oracle.request_disclosure(batch)?;
        self.pending.open(request_id, user.clone(), layout, self.clock.now());

        info!(user = %user, request_id = %request_id, "reveal requested");
        self.events.emit(BubbleEvent::RevealRequested {
            user: user.clone(),
            request_id,
        });
        Ok(request_id)
    }

    /// Callback from the disclosure capability.
    ///
    /// The request id is consumed as soon as the proof has been checked,
    /// whatever happens afterwards.
    pub fn on_disclosed(&mut self, request_id: RequestId, cleartexts: &[u32], proof: &DisclosureProof) -> Result<()> {
        let Some(pending) = self.pending.get(request_id) else {
            warn!(request_id = %request_id, "disclosure for unknown request");
            return Err(BubbleError::UnknownRequest(request_id));
        };
        if pending.status == PendingStatus::Consumed {
            let user = pending.user.clone();
            warn!(request_id = %request_id, user = %user, "replayed disclosure");
            return Err(if self.results.is_revealed(&user) {
                BubbleError::AlreadyRevealed(user)
            } else {
                BubbleError::UnknownRequest(request_id)
            });
        }

        let pending = self
            .pending
            .consume(request_id)
            .ok_or(BubbleError::UnknownRequest(request_id))?;

        if !self.verifier.verify(request_id, cleartexts, proof) {
            warn!(request_id = %request_id, user = %pending.user, "disclosure proof rejected");
            self.events.emit(BubbleEvent::DisclosureRejected { request_id });
            return Err(BubbleError::InvalidProof(request_id));
        }

        if self.results.is_revealed(&pending.user) {
            return Err(BubbleError::AlreadyRevealed(pending.user));
        }
        let result = pending.layout.decode(cleartexts)?;
        self.results.reveal(&pending.user, result)?;

        info!(user = %pending.user, request_id = %request_id, "result revealed");
        self.events.emit(BubbleEvent::ResultRevealed {
            user: pending.user,
            request_id,
        });
        Ok(())
    }

    /// Drop open disclosure requests older than the configured timeout so
    /// their users can request again. No-op without a timeout.
    pub fn expire_disclosures(&mut self) -> Vec<RequestId> {
        let Some(timeout) = self.disclosure_timeout else {
            return Vec::new();
        };
        let expired = self.pending.expire(self.clock.now(), timeout);
        for (request_id, user) in &expired {
            debug!(request_id = %request_id, user = %user, "disclosure request expired");
            self.events.emit(BubbleEvent::DisclosureExpired {
                user: user.clone(),
                request_id: *request_id,
            });
        }
        expired.into_iter().map(|(id, _)| id).collect()
    }

    fn engine(&self) -> AnalyticsEngine<'_, A> {
        AnalyticsEngine::new(&self.ops)
    }

    /// The user's history, checked against the registry as it is now.
    fn current_history(&self, user: &UserId) -> Result<&EncryptedReadingHistory<A::Ciphertext>> {
        let history = self.histories.get(user)?;
        self.registry
            .check_shape("category_scores", history.category_scores.len())?;
        self.registry
            .check_shape("sentiment_scores", history.sentiment_scores.len())?;
        Ok(history)
    }
}
