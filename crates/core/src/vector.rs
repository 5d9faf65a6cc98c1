use serde::{Deserialize, Serialize};
use std::fmt;

/// A packed operand pair: `a` in bits 31..16, `b` in bits 15..0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestVector(pub u32);

impl TestVector {
    pub fn pack(a: i16, b: i16) -> Self {
        Self(((a as u16 as u32) << 16) | (b as u16 as u32))
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn a(self) -> i32 {
        (self.0 >> 16) as u16 as i16 as i32
    }

    pub fn b(self) -> i32 {
        (self.0 & 0xFFFF) as u16 as i16 as i32
    }

    pub fn unpack(self) -> (i32, i32) {
        (self.a(), self.b())
    }

    /// The vector set every lab run starts from.
    pub fn defaults() -> Vec<Self> {
        fnlab_config::DEFAULT_TEST_VECTORS
            .iter()
            .copied()
            .map(Self)
            .collect()
    }
}

impl From<u32> for TestVector {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TestVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpack_sign_extends_each_half() {
        assert_eq!(TestVector(0x0002_0003).unpack(), (2, 3));
        assert_eq!(TestVector(0xFFFC_0003).unpack(), (-4, 3));
        assert_eq!(TestVector(0x0000_FFFC).unpack(), (0, -4));
        assert_eq!(TestVector(0x8000_8000).unpack(), (-32768, -32768));
        assert_eq!(TestVector(0x7FF3_8001).unpack(), (0x7FF3, -32767));
    }

    #[test]
    fn test_pack_unpack_every_edge() {
        let edges = [i16::MIN, i16::MIN + 1, -2, -1, 0, 1, 2, i16::MAX - 1, i16::MAX];
        for &a in &edges {
            for &b in &edges {
                assert_eq!(TestVector::pack(a, b).unpack(), (a as i32, b as i32));
            }
        }
    }

    #[test]
    fn test_defaults_order() {
        let v = TestVector::defaults();
        assert_eq!(v.len(), 11);
        assert_eq!(v[0], TestVector(0x0002_0003));
        assert_eq!(v[10], TestVector(0x7FF1_7FF2));
    }

    #[test]
    fn test_display() {
        assert_eq!(TestVector(0xFFFC_0003).to_string(), "0xFFFC0003");
    }
}
