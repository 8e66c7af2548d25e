//! TFHE radix backend.
//!
//! A 64-bit unsigned integer is 32 blocks of 2-bit messages under
//! `PARAM_MESSAGE_2_CARRY_2_KS_PBS`. All server-side work uses the
//! parallelized operators, which keep carries clean between calls.

use tfhe::integer::prelude::ServerKeyDefaultCMux;
use tfhe::integer::{gen_keys_radix, BooleanBlock, RadixCiphertext, RadixClientKey, ServerKey};
use tfhe::shortint::parameters::PARAM_MESSAGE_2_CARRY_2_KS_PBS;

use super::{Decryptor, EncryptedArithmetic, Encryptor};

/// 32 × 2 bits = 64-bit plaintext space over `u32` inputs.
pub const NUM_BLOCKS: usize = 32;

/// Server-side evaluator. Holds no secret material.
pub struct TfheArithmetic {
    server_key: ServerKey,
}

/// Client-side key: encrypts submissions and backs the disclosure relay.
pub struct TfheKey {
    client_key: RadixClientKey,
}

impl TfheKey {
    /// Generate a fresh key pair. Slow; do it once per process.
    pub fn generate() -> (TfheKey, TfheArithmetic) {
        let (client_key, server_key) = gen_keys_radix(PARAM_MESSAGE_2_CARRY_2_KS_PBS, NUM_BLOCKS);
        (TfheKey { client_key }, TfheArithmetic { server_key })
    }
}

impl EncryptedArithmetic for TfheArithmetic {
    type Ciphertext = RadixCiphertext;
    type Bool = BooleanBlock;

    fn add(&self, lhs: &RadixCiphertext, rhs: &RadixCiphertext) -> RadixCiphertext {
        self.server_key.add_parallelized(lhs, rhs)
    }

    fn sub(&self, lhs: &RadixCiphertext, rhs: &RadixCiphertext) -> RadixCiphertext {
        self.server_key.sub_parallelized(lhs, rhs)
    }

    fn mul(&self, lhs: &RadixCiphertext, rhs: &RadixCiphertext) -> RadixCiphertext {
        self.server_key.mul_parallelized(lhs, rhs)
    }

    /// A zero divisor yields an all-ones quotient.
    fn div(&self, lhs: &RadixCiphertext, rhs: &RadixCiphertext) -> RadixCiphertext {
        self.server_key.div_parallelized(lhs, rhs)
    }

    fn gt(&self, lhs: &RadixCiphertext, rhs: &RadixCiphertext) -> BooleanBlock {
        self.server_key.gt_parallelized(lhs, rhs)
    }

    fn lt(&self, lhs: &RadixCiphertext, rhs: &RadixCiphertext) -> BooleanBlock {
        self.server_key.lt_parallelized(lhs, rhs)
    }

    fn select(
        &self,
        cond: &BooleanBlock,
        if_true: &RadixCiphertext,
        if_false: &RadixCiphertext,
    ) -> RadixCiphertext {
        self.server_key.if_then_else_parallelized(cond, if_true, if_false)
    }

    fn encode(&self, plain: u32) -> RadixCiphertext {
        self.server_key.create_trivial_radix(plain as u64, NUM_BLOCKS)
    }
}

impl Encryptor<RadixCiphertext> for TfheKey {
    fn encrypt(&self, plain: u32) -> RadixCiphertext {
        self.client_key.encrypt(plain as u64)
    }
}

impl Decryptor<RadixCiphertext> for TfheKey {
    fn decrypt(&self, ct: &RadixCiphertext) -> u32 {
        let value: u64 = self.client_key.decrypt(ct);
        u32::try_from(value).unwrap_or(u32::MAX)
    }
}
