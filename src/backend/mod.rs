//! Encrypted-arithmetic capability consumed by the analytics engine.
//!
//! The engine never looks inside a ciphertext. It only combines them through
//! [`EncryptedArithmetic`], and every conditional goes through
//! [`EncryptedArithmetic::select`] with both candidates already computed.

pub mod clear;
pub mod radix;

pub use self::clear::{Clear, ClearArithmetic, ClearBool, ClearKey, OpCounts};
pub use self::radix::{TfheArithmetic, TfheKey};

/// Arithmetic over unsigned 64-bit encrypted integers.
///
/// Submitted values are `u32`, so every intermediate the engine forms
/// (`100·Σ` over fewer than 2³² categories) fits without wrapping.
/// Implementations are deterministic for identical inputs and keys.
/// Overflow wraps; a zero divisor yields the backend's defined quotient.
pub trait EncryptedArithmetic {
    type Ciphertext: Clone;
    type Bool;

    fn add(&self, lhs: &Self::Ciphertext, rhs: &Self::Ciphertext) -> Self::Ciphertext;
    fn sub(&self, lhs: &Self::Ciphertext, rhs: &Self::Ciphertext) -> Self::Ciphertext;
    fn mul(&self, lhs: &Self::Ciphertext, rhs: &Self::Ciphertext) -> Self::Ciphertext;
    fn div(&self, lhs: &Self::Ciphertext, rhs: &Self::Ciphertext) -> Self::Ciphertext;

    fn gt(&self, lhs: &Self::Ciphertext, rhs: &Self::Ciphertext) -> Self::Bool;
    fn lt(&self, lhs: &Self::Ciphertext, rhs: &Self::Ciphertext) -> Self::Bool;

    /// `cond ? if_true : if_false` without branching on `cond`.
    fn select(
        &self,
        cond: &Self::Bool,
        if_true: &Self::Ciphertext,
        if_false: &Self::Ciphertext,
    ) -> Self::Ciphertext;

    /// Trivial encryption of a public constant.
    fn encode(&self, plain: u32) -> Self::Ciphertext;
}

/// Key holder able to turn ciphertexts back into plaintext. Only the
/// disclosure side holds one; the analytics core never does.
pub trait Decryptor<C> {
    /// Plaintext above `u32::MAX` saturates. Engine outputs never do.
    fn decrypt(&self, ct: &C) -> u32;
}

/// Client-side encryption of submitted counts.
pub trait Encryptor<C> {
    fn encrypt(&self, plain: u32) -> C;

    fn encrypt_all(&self, plain: &[u32]) -> Vec<C> {
        plain.iter().map(|&v| self.encrypt(v)).collect()
    }
}
