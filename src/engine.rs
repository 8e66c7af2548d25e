//! Homomorphic analytics over an encrypted reading history.
//!
//! Everything here is a pure function of its ciphertext inputs. The control
//! flow depends only on vector lengths, never on encrypted values: each
//! conditional computes both candidates and blends them with `select`.
//!
//! Integer scaling: proportions are kept as whole percentages, so
//! `diversity = 100 - (Σ (100·sᵢ / total)²) / 100`. For scores `[10, 10, 80]`
//! this gives `100 - 6600 / 100 = 34`.
//!
//! Input domain: any `u32` counts. The backend's 64-bit plaintext space holds
//! `100·sᵢ` and `100·Σ` without wrapping, so a history concentrated on one
//! category scores `0` however large its counts.
//!
//! Zero divisors are guarded rather than inherited from the backend:
//! - an all-zero history has diversity `0`;
//! - a zero sentiment total makes every bias entry the neutral `50`.

use tracing::debug;

use crate::backend::EncryptedArithmetic;
use crate::history::EncryptedReadingHistory;

/// Scale of the diversity score and of each bias entry.
pub const SCALE: u32 = 100;
/// Bias reported for a category with no reads.
pub const NEUTRAL_BIAS: u32 = 50;
/// Stride between recommendation id blocks of consecutive categories.
pub const ARTICLE_ID_STRIDE: u32 = 1000;
/// Candidate ids are `index · stride + k` for these `k`.
pub const ARTICLE_ID_OFFSETS: [u32; 3] = [1, 2, 3];

/// Least-represented category and the candidates derived from it.
#[derive(Debug, Clone)]
pub struct Recommendation<C> {
    pub category: C,
    pub articles: Vec<C>,
}

/// Full set of encrypted outputs for one history.
#[derive(Debug, Clone)]
pub struct AnalysisOutput<C> {
    pub diversity_score: C,
    pub bias_vector: Vec<C>,
    pub recommendation: Recommendation<C>,
}

pub struct AnalyticsEngine<'a, A> {
    ops: &'a A,
}

impl<'a, A: EncryptedArithmetic> AnalyticsEngine<'a, A> {
    pub fn new(ops: &'a A) -> Self {
        Self { ops }
    }

    pub fn analyze(&self, history: &EncryptedReadingHistory<A::Ciphertext>) -> AnalysisOutput<A::Ciphertext> {
        debug!(
            user = %history.user,
            categories = history.category_scores.len(),
            "running encrypted analysis"
        );
        AnalysisOutput {
            diversity_score: self.diversity_score(&history.category_scores),
            bias_vector: self.bias_vector(&history.category_scores, &history.sentiment_scores),
            recommendation: self.recommend(&history.category_scores),
        }
    }

    /// `100 − 100·Σ pᵢ²` with `pᵢ` the share of category `i`.
    pub fn diversity_score(&self, category_scores: &[A::Ciphertext]) -> A::Ciphertext {
        let ops = self.ops;
        let zero = ops.encode(0);
        let scale = ops.encode(SCALE);

        let total = self.sum(category_scores);
        let has_reads = ops.gt(&total, &zero);
        let divisor = self.nonzero_or_one(&has_reads, &total);

        let mut sum_squares = zero.clone();
        for score in category_scores {
            let percent = ops.div(&ops.mul(score, &scale), &divisor);
            sum_squares = ops.add(&sum_squares, &ops.mul(&percent, &percent));
        }

        let diversity = ops.sub(&scale, &ops.div(&sum_squares, &scale));
        ops.select(&has_reads, &diversity, &zero)
    }

    /// Per-category share of total sentiment, or [`NEUTRAL_BIAS`] for
    /// categories without reads.
    pub fn bias_vector(
        &self,
        category_scores: &[A::Ciphertext],
        sentiment_scores: &[A::Ciphertext],
    ) -> Vec<A::Ciphertext> {
        let ops = self.ops;
        let zero = ops.encode(0);
        let scale = ops.encode(SCALE);
        let neutral = ops.encode(NEUTRAL_BIAS);

        let total = self.sum(sentiment_scores);
        let has_sentiment = ops.gt(&total, &zero);
        let divisor = self.nonzero_or_one(&has_sentiment, &total);

        category_scores
            .iter()
            .zip(sentiment_scores)
            .map(|(score, sentiment)| {
                let share = ops.div(&ops.mul(sentiment, &scale), &divisor);
                let guarded = ops.select(&has_sentiment, &share, &neutral);
                let read = ops.gt(score, &zero);
                ops.select(&read, &guarded, &neutral)
            })
            .collect()
    }

    /// Oblivious argmin over the category scores. A strict `<` keeps the
    /// first-seen minimum on ties.
    pub fn recommend(&self, category_scores: &[A::Ciphertext]) -> Recommendation<A::Ciphertext> {
        let ops = self.ops;
        let mut best_index = ops.encode(0);
        let mut best_score = match category_scores.first() {
            Some(first) => first.clone(),
            None => ops.encode(0),
        };

        for (i, score) in category_scores.iter().enumerate().skip(1) {
            let index = ops.encode(i as u32);
            let lower = ops.lt(score, &best_score);
            best_score = ops.select(&lower, score, &best_score);
            best_index = ops.select(&lower, &index, &best_index);
        }

        let base = ops.mul(&best_index, &ops.encode(ARTICLE_ID_STRIDE));
        let articles = ARTICLE_ID_OFFSETS
            .iter()
            .map(|&k| ops.add(&base, &ops.encode(k)))
            .collect();

        Recommendation {
            category: best_index,
            articles,
        }
    }

    fn sum(&self, values: &[A::Ciphertext]) -> A::Ciphertext {
        values
            .iter()
            .fold(self.ops.encode(0), |acc, v| self.ops.add(&acc, v))
    }

    fn nonzero_or_one(&self, nonzero: &A::Bool, value: &A::Ciphertext) -> A::Ciphertext {
        self.ops.select(nonzero, value, &self.ops.encode(1))
    }
}
