//! Full reveal cycle on real TFHE ciphertexts.
//!
//! Run with `cargo test --release -- --ignored`.

use bubble_lens::backend::{Encryptor, TfheKey};
use bubble_lens::disclosure::{channel, DisclosureSigner};
use bubble_lens::{BubbleConfig, BubbleService, DecryptedResult, UserId};

#[test]
#[ignore = "tfhe key generation and encrypted division are slow outside release builds"]
fn tfhe_reference_scenario() {
    let config = BubbleConfig {
        categories: vec!["Politics".into(), "Technology".into(), "Health".into()],
        ..BubbleConfig::default()
    };
    let (key, ops) = TfheKey::generate();
    let (oracle, relay) = channel(DisclosureSigner::generate());
    let mut service = BubbleService::new(&config, ops, oracle, relay.verifier()).unwrap();

    let user = UserId::from("alice");
    service
        .submit(
            user.clone(),
            key.encrypt_all(&[17]),
            key.encrypt_all(&[10, 10, 80]),
            key.encrypt_all(&[5, 5, 40]),
        )
        .unwrap();
    service.analyze(&user).unwrap();
    service.request_reveal(&user).unwrap();

    for d in relay.fulfil(&key) {
        service.on_disclosed(d.request_id, &d.cleartexts, &d.proof).unwrap();
    }

    assert_eq!(
        service.get_decrypted_analysis(&user),
        DecryptedResult {
            diversity_score: 34,
            bias_vector: vec![10, 10, 80],
            recommended_articles: vec![1, 2, 3],
            revealed: true,
        }
    );
}
