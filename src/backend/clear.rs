//! Plaintext-equivalent backend.
//!
//! Values are wrapped in opaque newtypes so the engine cannot read them, and
//! every primitive call is counted. Semantics follow the tfhe radix backend:
//! 64-bit wrapping arithmetic and an all-ones quotient for a zero divisor.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Decryptor, EncryptedArithmetic, Encryptor};

/// Opaque stand-in for a ciphertext.
#[derive(Clone, PartialEq, Eq)]
pub struct Clear(u64);

impl std::fmt::Debug for Clear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Clear(..)")
    }
}

#[derive(Clone, Copy)]
pub struct ClearBool(bool);

/// Number of primitive calls of each kind since creation or the last reset.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OpCounts {
    pub add: usize,
    pub sub: usize,
    pub mul: usize,
    pub div: usize,
    pub cmp: usize,
    pub select: usize,
    pub encode: usize,
}

#[derive(Debug, Default)]
pub struct ClearArithmetic {
    add: AtomicUsize,
    sub: AtomicUsize,
    mul: AtomicUsize,
    div: AtomicUsize,
    cmp: AtomicUsize,
    select: AtomicUsize,
    encode: AtomicUsize,
}

impl ClearArithmetic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> OpCounts {
        OpCounts {
            add: self.add.load(Ordering::Relaxed),
            sub: self.sub.load(Ordering::Relaxed),
            mul: self.mul.load(Ordering::Relaxed),
            div: self.div.load(Ordering::Relaxed),
            cmp: self.cmp.load(Ordering::Relaxed),
            select: self.select.load(Ordering::Relaxed),
            encode: self.encode.load(Ordering::Relaxed),
        }
    }

    pub fn reset_counts(&self) {
        for counter in [
            &self.add,
            &self.sub,
            &self.mul,
            &self.div,
            &self.cmp,
            &self.select,
            &self.encode,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    fn tick(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

impl EncryptedArithmetic for ClearArithmetic {
    type Ciphertext = Clear;
    type Bool = ClearBool;

    fn add(&self, lhs: &Clear, rhs: &Clear) -> Clear {
        Self::tick(&self.add);
        Clear(lhs.0.wrapping_add(rhs.0))
    }

    fn sub(&self, lhs: &Clear, rhs: &Clear) -> Clear {
        Self::tick(&self.sub);
        Clear(lhs.0.wrapping_sub(rhs.0))
    }

    fn mul(&self, lhs: &Clear, rhs: &Clear) -> Clear {
        Self::tick(&self.mul);
        Clear(lhs.0.wrapping_mul(rhs.0))
    }

    fn div(&self, lhs: &Clear, rhs: &Clear) -> Clear {
        Self::tick(&self.div);
        Clear(lhs.0.checked_div(rhs.0).unwrap_or(u64::MAX))
    }

    fn gt(&self, lhs: &Clear, rhs: &Clear) -> ClearBool {
        Self::tick(&self.cmp);
        ClearBool(lhs.0 > rhs.0)
    }

    fn lt(&self, lhs: &Clear, rhs: &Clear) -> ClearBool {
        Self::tick(&self.cmp);
        ClearBool(lhs.0 < rhs.0)
    }

    fn select(&self, cond: &ClearBool, if_true: &Clear, if_false: &Clear) -> Clear {
        Self::tick(&self.select);
        // Mask blend rather than `if`, mirroring a data-independent cmux.
        let mask = (cond.0 as u64).wrapping_neg();
        Clear((if_true.0 & mask) | (if_false.0 & !mask))
    }

    fn encode(&self, plain: u32) -> Clear {
        Self::tick(&self.encode);
        Clear(plain.into())
    }
}

/// Client key for the clear backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClearKey;

impl Encryptor<Clear> for ClearKey {
    fn encrypt(&self, plain: u32) -> Clear {
        Clear(plain.into())
    }
}

impl Decryptor<Clear> for ClearKey {
    fn decrypt(&self, ct: &Clear) -> u32 {
        u32::try_from(ct.0).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_divisor_yields_all_ones() {
        let ops = ClearArithmetic::new();
        let q = ops.div(&ops.encode(7), &ops.encode(0));
        assert_eq!(ClearKey.decrypt(&q), u32::MAX);
    }

    #[test]
    fn products_of_u32_inputs_do_not_wrap() {
        let ops = ClearArithmetic::new();
        let big = ops.encode(u32::MAX);
        let product = ops.mul(&big, &ops.encode(100));
        assert_eq!(ClearKey.decrypt(&ops.div(&product, &ops.encode(100))), u32::MAX);
        assert_eq!(ClearKey.decrypt(&product), u32::MAX);
    }

    #[test]
    fn select_picks_by_condition() {
        let ops = ClearArithmetic::new();
        let (a, b) = (ops.encode(11), ops.encode(22));
        let yes = ops.lt(&a, &b);
        let no = ops.gt(&a, &b);
        assert_eq!(ClearKey.decrypt(&ops.select(&yes, &a, &b)), 11);
        assert_eq!(ClearKey.decrypt(&ops.select(&no, &a, &b)), 22);
    }

    #[test]
    fn counts_every_primitive() {
        let ops = ClearArithmetic::new();
        let a = ops.encode(3);
        let b = ops.encode(4);
        let _ = ops.mul(&ops.add(&a, &b), &b);
        let counts = ops.counts();
        assert_eq!(counts.encode, 2);
        assert_eq!(counts.add, 1);
        assert_eq!(counts.mul, 1);

        ops.reset_counts();
        assert_eq!(ops.counts(), OpCounts::default());
    }

    #[test]
    fn debug_does_not_leak_value() {
        assert_eq!(format!("{:?}", ClearKey.encrypt(42)), "Clear(..)");
    }
}
