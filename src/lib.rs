//! Reading-history "filter bubble" analytics over encrypted data.
//!
//! Users submit encrypted per-category read counts and sentiment scores.
//! The service computes a diversity score, a bias vector and a set of
//! recommendations homomorphically, and only reveals them through a
//! proof-checked, one-shot disclosure.
//!
//! ```
//! use bubble_lens::backend::{ClearArithmetic, ClearKey, Encryptor};
//! use bubble_lens::disclosure::{channel, DisclosureSigner};
//! use bubble_lens::{BubbleConfig, BubbleService, UserId};
//!
//! let config = BubbleConfig {
//!     categories: vec!["Politics".into(), "Technology".into(), "Health".into()],
//!     ..BubbleConfig::default()
//! };
//! let (oracle, relay) = channel(DisclosureSigner::generate());
//! let mut service = BubbleService::new(&config, ClearArithmetic::new(), oracle, relay.verifier())?;
//!
//! let user = UserId::from("alice");
//! service.submit(
//!     user.clone(),
//!     ClearKey.encrypt_all(&[7, 8]),
//!     ClearKey.encrypt_all(&[10, 10, 80]),
//!     ClearKey.encrypt_all(&[5, 5, 40]),
//! )?;
//! service.analyze(&user)?;
//! service.request_reveal(&user)?;
//!
//! for d in relay.fulfil(&ClearKey) {
//!     service.on_disclosed(d.request_id, &d.cleartexts, &d.proof)?;
//! }
//! assert_eq!(service.get_decrypted_analysis(&user).diversity_score, 34);
//! # Ok::<(), bubble_lens::BubbleError>(())
//! ```

pub mod analysis;
pub mod backend;
pub mod config;
pub mod disclosure;
pub mod engine;
pub mod error;
pub mod events;
pub mod history;
pub mod registry;
pub mod service;
pub mod store;
pub mod types;

pub use analysis::{BubbleAnalysis, DecryptedResult};
pub use config::BubbleConfig;
pub use error::{BubbleError, Result};
pub use service::{BubbleService, RevealState};
pub use types::UserId;
