//! Reference arithmetic the routines under test are graded against.
//!
//! Operands are sign-extended to 32 bits before any arithmetic, so the
//! magnitude of `i16::MIN` is the exact value 32768. For a full 32-bit
//! `i32::MIN` input the magnitude wraps to the same bit pattern, matching a
//! two's complement `RSB` on the target.

use crate::routines::Diagnostics;
use crate::vector::TestVector;

/// Every value a correct implementation produces for one test vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpectedValues {
    pub packed: u32,
    pub a: i32,
    pub b: i32,
    pub abs_a: i32,
    pub abs_b: i32,
    pub sign_a: i32,
    pub sign_b: i32,
    pub init_product: i32,
    pub final_product: i32,
}

impl ExpectedValues {
    /// Values the composite routine should leave in its diagnostic storage.
    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            a_multiplicand: self.a,
            b_multiplier: self.b,
            a_abs: self.abs_a,
            a_sign: self.sign_a,
            b_abs: self.abs_b,
            b_sign: self.sign_b,
            init_product: self.init_product,
            final_product: self.final_product,
        }
    }
}

/// Magnitude and sign flag (1 for negative, 0 otherwise).
pub fn abs_with_sign(x: i32) -> (i32, i32) {
    if x < 0 {
        (x.wrapping_neg(), 1)
    } else {
        (x, 0)
    }
}

/// Negate `product` iff exactly one of the sign flags is set.
pub fn apply_sign(product: i32, sign_a: i32, sign_b: i32) -> i32 {
    if (sign_a != 0) != (sign_b != 0) {
        product.wrapping_neg()
    } else {
        product
    }
}

pub fn compute_expected(vector: TestVector) -> ExpectedValues {
    let (a, b) = vector.unpack();
    let (abs_a, sign_a) = abs_with_sign(a);
    let (abs_b, sign_b) = abs_with_sign(b);
    // Both magnitudes are at most 2^15.
    let init_product = abs_a * abs_b;

    ExpectedValues {
        packed: vector.raw(),
        a,
        b,
        abs_a,
        abs_b,
        sign_a,
        sign_b,
        init_product,
        final_product: apply_sign(init_product, sign_a, sign_b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_pair() {
        let exp = compute_expected(TestVector(0x0002_0003));
        assert_eq!((exp.a, exp.b), (2, 3));
        assert_eq!((exp.abs_a, exp.abs_b), (2, 3));
        assert_eq!((exp.sign_a, exp.sign_b), (0, 0));
        assert_eq!(exp.init_product, 6);
        assert_eq!(exp.final_product, 6);
    }

    #[test]
    fn test_mixed_signs() {
        let exp = compute_expected(TestVector(0xFFFC_0003));
        assert_eq!((exp.a, exp.b), (-4, 3));
        assert_eq!((exp.abs_a, exp.abs_b), (4, 3));
        assert_eq!((exp.sign_a, exp.sign_b), (1, 0));
        assert_eq!(exp.init_product, 12);
        assert_eq!(exp.final_product, -12);
    }

    #[test]
    fn test_both_minimum() {
        let exp = compute_expected(TestVector(0x8000_8000));
        assert_eq!((exp.a, exp.b), (-32768, -32768));
        assert_eq!((exp.abs_a, exp.abs_b), (32768, 32768));
        assert_eq!((exp.sign_a, exp.sign_b), (1, 1));
        assert_eq!(exp.init_product, 1 << 30);
        assert_eq!(exp.final_product, 1 << 30);
    }

    #[test]
    fn test_zero_operand_keeps_sign_of_other() {
        // -3 * 0: the sign flag is still set, the product is still zero.
        let exp = compute_expected(TestVector(0xFFFD_0000));
        assert_eq!((exp.sign_a, exp.sign_b), (1, 0));
        assert_eq!(exp.final_product, 0);
    }

    #[test]
    fn test_final_product_invariant_over_defaults() {
        for v in TestVector::defaults() {
            let exp = compute_expected(v);
            let negated = (exp.sign_a ^ exp.sign_b) == 1;
            let want = if negated { -exp.init_product } else { exp.init_product };
            assert_eq!(exp.final_product, want, "vector {}", v);
            assert_eq!(exp.final_product, exp.a * exp.b, "vector {}", v);
        }
    }

    #[test]
    fn test_abs_with_sign() {
        assert_eq!(abs_with_sign(5), (5, 0));
        assert_eq!(abs_with_sign(0), (0, 0));
        assert_eq!(abs_with_sign(-7), (7, 1));
        assert_eq!(abs_with_sign(-32768), (32768, 1));
        assert_eq!(abs_with_sign(i32::MIN), (i32::MIN, 1));
    }

    #[test]
    fn test_apply_sign_table() {
        assert_eq!(apply_sign(42, 0, 0), 42);
        assert_eq!(apply_sign(42, 1, 1), 42);
        assert_eq!(apply_sign(42, 1, 0), -42);
        assert_eq!(apply_sign(42, 0, 1), -42);
    }

    #[test]
    fn test_diagnostics_mirror_fields() {
        let exp = compute_expected(TestVector(0x7FF3_8001));
        let d = exp.diagnostics();
        assert_eq!(d.a_multiplicand, 0x7FF3);
        assert_eq!(d.b_multiplier, -32767);
        assert_eq!(d.b_sign, 1);
        assert_eq!(d.final_product, exp.final_product);
    }
}
