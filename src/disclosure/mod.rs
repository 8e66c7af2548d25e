//! Disclosure capability: turns encrypted results into verified plaintext.
//!
//! The core submits one ordered ciphertext batch per reveal and gets a
//! request id back. The cleartexts arrive later through
//! [`crate::BubbleService::on_disclosed`], together with a proof that is
//! checked before anything is trusted.

mod local;
mod pending;
mod proof;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use self::local::{channel, Disclosure, DisclosureRelay, DisclosureRequest, LocalDisclosure};
pub use self::pending::{DisclosureLayout, PendingDisclosure, PendingDisclosures, PendingStatus};
pub use self::proof::{DisclosureProof, DisclosureSigner, DisclosureVerifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Accepts ciphertext batches for asynchronous decryption.
pub trait DisclosureOracle<C> {
    fn request_disclosure(&self, handles: Vec<C>) -> Result<RequestId>;
}

impl<C, T: DisclosureOracle<C> + ?Sized> DisclosureOracle<C> for std::sync::Arc<T> {
    fn request_disclosure(&self, handles: Vec<C>) -> Result<RequestId> {
        (**self).request_disclosure(handles)
    }
}
