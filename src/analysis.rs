//! Encrypted analysis results and their revealed counterparts.

use serde::{Deserialize, Serialize};

use crate::error::{BubbleError, Result};
use crate::registry::CategoryRegistry;
use crate::store::{KvStore, MemoryStore};
use crate::types::UserId;

#[derive(Debug, Clone)]
pub struct BubbleAnalysis<C> {
    pub diversity_score: C,
    pub bias_vector: Vec<C>,
    pub recommended_articles: Vec<C>,
    pub complete: bool,
}

impl<C: Clone> BubbleAnalysis<C> {
    /// Disclosure batch: diversity, then bias in category order, then
    /// recommendations in generation order.
    pub fn disclosure_batch(&self) -> Vec<C> {
        let mut batch = Vec::with_capacity(1 + self.bias_vector.len() + self.recommended_articles.len());
        batch.push(self.diversity_score.clone());
        batch.extend(self.bias_vector.iter().cloned());
        batch.extend(self.recommended_articles.iter().cloned());
        batch
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptedResult {
    pub diversity_score: u32,
    pub bias_vector: Vec<u32>,
    pub recommended_articles: Vec<u32>,
    pub revealed: bool,
}

type AnalysisRecords<C> = MemoryStore<UserId, BubbleAnalysis<C>>;
type DecryptedRecords = MemoryStore<UserId, DecryptedResult>;

pub struct ResultStore<C, S = AnalysisRecords<C>, D = DecryptedRecords> {
    encrypted: S,
    decrypted: D,
    _ciphertext: std::marker::PhantomData<C>,
}

impl<C> Default for ResultStore<C> {
    fn default() -> Self {
        Self::with_stores(MemoryStore::new(), MemoryStore::new())
    }
}

impl<C> ResultStore<C> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C, S, D> ResultStore<C, S, D>
where
    S: KvStore<UserId, BubbleAnalysis<C>>,
    D: KvStore<UserId, DecryptedResult>,
{
    pub fn with_stores(encrypted: S, decrypted: D) -> Self {
        Self {
            encrypted,
            decrypted,
            _ciphertext: std::marker::PhantomData,
        }
    }

    /// Replace the user's analysis and reset the revealed slot to zero.
    pub fn store(
        &mut self,
        registry: &CategoryRegistry,
        user: UserId,
        diversity_score: C,
        bias_vector: Vec<C>,
        recommended_articles: Vec<C>,
    ) -> Result<()> {
        registry.check_shape("bias_vector", bias_vector.len())?;

        self.encrypted.put(
            user.clone(),
            BubbleAnalysis {
                diversity_score,
                bias_vector,
                recommended_articles,
                complete: true,
            },
        );
        self.decrypted.put(user, DecryptedResult::default());
        Ok(())
    }

    pub fn get_encrypted(&self, user: &UserId) -> Result<&BubbleAnalysis<C>> {
        self.encrypted.get(user).ok_or_else(|| BubbleError::NotFound {
            what: "analysis",
            user: user.clone(),
        })
    }

    /// Zero value when nothing was stored for the user.
    pub fn get_decrypted(&self, user: &UserId) -> DecryptedResult {
        self.decrypted.get(user).cloned().unwrap_or_default()
    }

    pub fn is_complete(&self, user: &UserId) -> bool {
        self.encrypted.get(user).is_some_and(|a| a.complete)
    }

    pub fn is_revealed(&self, user: &UserId) -> bool {
        self.decrypted.get(user).is_some_and(|r| r.revealed)
    }

    /// Publish a verified plaintext. Refuses to overwrite a revealed result.
    pub(crate) fn reveal(&mut self, user: &UserId, result: DecryptedResult) -> Result<()> {
        if self.is_revealed(user) {
            return Err(BubbleError::AlreadyRevealed(user.clone()));
        }
        self.decrypted.put(
            user.clone(),
            DecryptedResult {
                revealed: true,
                ..result
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Clear, ClearKey, Decryptor, Encryptor};

    fn registry() -> CategoryRegistry {
        CategoryRegistry::with_categories(["Politics", "Technology", "Health"]).unwrap()
    }

    #[test]
    fn store_marks_complete_and_zeroes_decrypted() {
        let registry = registry();
        let mut results = ResultStore::new();
        let user = UserId::from("alice");

        results
            .store(
                &registry,
                user.clone(),
                ClearKey.encrypt(34),
                ClearKey.encrypt_all(&[10, 10, 80]),
                ClearKey.encrypt_all(&[1, 2, 3]),
            )
            .unwrap();

        assert!(results.is_complete(&user));
        assert_eq!(results.get_decrypted(&user), DecryptedResult::default());

        let batch: Vec<u32> = results
            .get_encrypted(&user)
            .unwrap()
            .disclosure_batch()
            .iter()
            .map(|c| ClearKey.decrypt(c))
            .collect();
        assert_eq!(batch, vec![34, 10, 10, 80, 1, 2, 3]);
    }

    #[test]
    fn bias_shape_is_checked() {
        let registry = registry();
        let mut results: ResultStore<Clear> = ResultStore::new();
        let err = results
            .store(
                &registry,
                "bob".into(),
                ClearKey.encrypt(1),
                ClearKey.encrypt_all(&[1]),
                vec![],
            )
            .unwrap_err();
        assert!(matches!(err, BubbleError::ShapeMismatch { field: "bias_vector", .. }));
        assert!(matches!(
            results.get_encrypted(&"bob".into()),
            Err(BubbleError::NotFound { .. })
        ));
    }

    #[test]
    fn reveal_is_one_shot_until_next_store() {
        let registry = registry();
        let mut results = ResultStore::new();
        let user = UserId::from("carol");
        let store = |results: &mut ResultStore<Clear>| {
            results
                .store(
                    &registry,
                    user.clone(),
                    ClearKey.encrypt(0),
                    ClearKey.encrypt_all(&[0, 0, 0]),
                    vec![],
                )
                .unwrap()
        };

        store(&mut results);
        let first = DecryptedResult {
            diversity_score: 12,
            bias_vector: vec![1, 2, 3],
            recommended_articles: vec![],
            revealed: false,
        };
        results.reveal(&user, first.clone()).unwrap();
        assert!(results.get_decrypted(&user).revealed);

        let again = results.reveal(&user, DecryptedResult::default());
        assert!(matches!(again, Err(BubbleError::AlreadyRevealed(_))));
        assert_eq!(results.get_decrypted(&user).diversity_score, 12);

        store(&mut results);
        assert!(!results.get_decrypted(&user).revealed);
    }
}
