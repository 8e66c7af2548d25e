use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};

use tracing::debug;

use super::{DisclosureOracle, DisclosureProof, DisclosureSigner, DisclosureVerifier, RequestId};
use crate::backend::Decryptor;
use crate::error::{BubbleError, Result};

/// A batch waiting to be decrypted.
pub struct DisclosureRequest<C> {
    pub request_id: RequestId,
    pub handles: Vec<C>,
}

/// Signed answer to a [`DisclosureRequest`].
#[derive(Debug, Clone)]
pub struct Disclosure {
    pub request_id: RequestId,
    pub cleartexts: Vec<u32>,
    pub proof: DisclosureProof,
}

/// Core-facing half of an in-process disclosure channel.
pub struct LocalDisclosure<C> {
    next_id: AtomicU64,
    outbox: Sender<DisclosureRequest<C>>,
}

/// Key-holding half: drains requests, decrypts and signs.
pub struct DisclosureRelay<C> {
    inbox: Receiver<DisclosureRequest<C>>,
    signer: DisclosureSigner,
}

/// Connected pair. Request ids start at 1 and are never reused.
pub fn channel<C>(signer: DisclosureSigner) -> (LocalDisclosure<C>, DisclosureRelay<C>) {
    let (outbox, inbox) = mpsc::channel();
    (
        LocalDisclosure {
            next_id: AtomicU64::new(1),
            outbox,
        },
        DisclosureRelay { inbox, signer },
    )
}

impl<C> DisclosureOracle<C> for LocalDisclosure<C> {
    fn request_disclosure(&self, handles: Vec<C>) -> Result<RequestId> {
        let request_id = RequestId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.outbox
            .send(DisclosureRequest { request_id, handles })
            .map_err(|_| BubbleError::DisclosureUnavailable("relay disconnected".into()))?;
        Ok(request_id)
    }
}

impl<C> DisclosureRelay<C> {
    pub fn verifier(&self) -> DisclosureVerifier {
        self.signer.verifier()
    }

    /// Requests received so far, in arrival order.
    pub fn drain(&self) -> Vec<DisclosureRequest<C>> {
        self.inbox.try_iter().collect()
    }

    pub fn fulfil_request<D: Decryptor<C>>(&self, key: &D, request: &DisclosureRequest<C>) -> Disclosure {
        let cleartexts: Vec<u32> = request.handles.iter().map(|ct| key.decrypt(ct)).collect();
        let proof = self.signer.sign(request.request_id, &cleartexts);
        debug!(request_id = %request.request_id, values = cleartexts.len(), "disclosure signed");
        Disclosure {
            request_id: request.request_id,
            cleartexts,
            proof,
        }
    }

    /// Decrypt and sign everything currently queued.
    pub fn fulfil<D: Decryptor<C>>(&self, key: &D) -> Vec<Disclosure> {
        self.drain()
            .iter()
            .map(|request| self.fulfil_request(key, request))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ClearKey, Encryptor};

    #[test]
    fn requests_round_trip_through_relay() {
        let (oracle, relay) = channel(DisclosureSigner::generate());
        let first = oracle.request_disclosure(ClearKey.encrypt_all(&[4, 5])).unwrap();
        let second = oracle.request_disclosure(ClearKey.encrypt_all(&[6])).unwrap();
        assert_eq!((first, second), (RequestId(1), RequestId(2)));

        let verifier = relay.verifier();
        let disclosures = relay.fulfil(&ClearKey);
        assert_eq!(disclosures.len(), 2);
        assert_eq!(disclosures[0].cleartexts, vec![4, 5]);
        assert_eq!(disclosures[1].cleartexts, vec![6]);
        for d in &disclosures {
            assert!(verifier.verify(d.request_id, &d.cleartexts, &d.proof));
        }
        assert!(relay.drain().is_empty());
    }

    #[test]
    fn dropped_relay_is_reported() {
        let (oracle, relay) = channel::<crate::backend::Clear>(DisclosureSigner::generate());
        drop(relay);
        assert!(matches!(
            oracle.request_disclosure(vec![]),
            Err(BubbleError::DisclosureUnavailable(_))
        ));
    }
}
