//! Arbitrary-precision unsigned integer type backed by num_bigint.
//!
//! Every on-chain quantity in this crate (token amounts, collateral sizes,
//! UNIX-second timestamps, epochs, block numbers) is a `Uint`. Values arrive
//! from the subgraph as decimal strings and from the RPC node as hex strings;
//! both are converted at the retrieval boundary and never carried further as
//! strings. Serializes to a JSON string, since 18-decimal token amounts do not
//! fit a JSON number.

use num_bigint::BigUint;
use num_traits::{CheckedSub, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Arbitrary-precision non-negative integer.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uint(BigUint);

impl Uint {
    /// Parse a Uint from a decimal string.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid non-negative decimal
    /// integer.
    pub fn from_str_canonical(s: &str) -> Result<Self, num_bigint::ParseBigIntError> {
        BigUint::from_str(s).map(Uint)
    }

    /// Parse a Uint from a `0x`-prefixed hex string (JSON-RPC quantity
    /// encoding).
    pub fn from_hex(s: &str) -> Option<Self> {
        let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
        if digits.is_empty() {
            return None;
        }
        BigUint::parse_bytes(digits.as_bytes(), 16).map(Uint)
    }

    /// Format as a canonical decimal string.
    pub fn to_canonical_string(&self) -> String {
        self.0.to_str_radix(10)
    }

    /// Format as a `0x`-prefixed hex quantity (JSON-RPC encoding, no leading
    /// zeros).
    pub fn to_hex_quantity(&self) -> String {
        format!("0x{}", self.0.to_str_radix(16))
    }

    /// The additive identity (0).
    pub fn zero() -> Self {
        Uint(BigUint::zero())
    }

    /// Returns true if the value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Subtraction returning `None` on underflow.
    pub fn checked_sub(&self, rhs: &Uint) -> Option<Uint> {
        self.0.checked_sub(&rhs.0).map(Uint)
    }

    /// Subtraction clamped at zero.
    pub fn saturating_sub(&self, rhs: &Uint) -> Uint {
        self.checked_sub(rhs).unwrap_or_else(Uint::zero)
    }
}

impl fmt::Display for Uint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Uint {
    type Err = num_bigint::ParseBigIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<u64> for Uint {
    fn from(value: u64) -> Self {
        Uint(BigUint::from(value))
    }
}

impl From<u32> for Uint {
    fn from(value: u32) -> Self {
        Uint(BigUint::from(value))
    }
}

impl From<usize> for Uint {
    fn from(value: usize) -> Self {
        Uint(BigUint::from(value))
    }
}

impl Serialize for Uint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_canonical_string())
    }
}

impl<'de> Deserialize<'de> for Uint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Uint::from_str_canonical(&s).map_err(serde::de::Error::custom)
    }
}

// Arithmetic operations. Sub panics on underflow like the underlying BigUint;
// call sites that cannot rule out underflow use checked_sub/saturating_sub.
impl std::ops::Add for Uint {
    type Output = Uint;

    fn add(self, rhs: Uint) -> Uint {
        Uint(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Uint {
    fn add_assign(&mut self, rhs: Uint) {
        self.0 += rhs.0;
    }
}

impl std::ops::Sub for Uint {
    type Output = Uint;

    fn sub(self, rhs: Uint) -> Uint {
        Uint(self.0 - rhs.0)
    }
}

impl std::ops::Mul for Uint {
    type Output = Uint;

    fn mul(self, rhs: Uint) -> Uint {
        Uint(self.0 * rhs.0)
    }
}

/// Floor division (BigUint division truncates, which is floor for
/// non-negative operands).
impl std::ops::Div for Uint {
    type Output = Uint;

    fn div(self, rhs: Uint) -> Uint {
        Uint(self.0 / rhs.0)
    }
}

impl std::iter::Sum for Uint {
    fn sum<I: Iterator<Item = Uint>>(iter: I) -> Uint {
        iter.fold(Uint::zero(), |acc, x| acc + x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uint_parse_roundtrip() {
        let test_cases = vec![
            "0",
            "1",
            "604800",
            "1000000000000000000",
            "115792089237316195423570985008687907853269984665640564039457584007913129639935",
        ];

        for s in test_cases {
            let value = Uint::from_str_canonical(s).expect("parse failed");
            assert_eq!(value.to_canonical_string(), s, "roundtrip failed for {}", s);
        }
    }

    #[test]
    fn test_uint_rejects_negative_and_garbage() {
        assert!(Uint::from_str_canonical("-1").is_err());
        assert!(Uint::from_str_canonical("12.5").is_err());
        assert!(Uint::from_str_canonical("abc").is_err());
        assert!(Uint::from_str_canonical("").is_err());
    }

    #[test]
    fn test_uint_from_hex() {
        assert_eq!(Uint::from_hex("0x0").unwrap(), Uint::zero());
        assert_eq!(Uint::from_hex("0xff").unwrap(), Uint::from(255u64));
        assert_eq!(
            Uint::from_hex("0x68b1a2c0").unwrap(),
            Uint::from(0x68b1a2c0u64)
        );
        assert!(Uint::from_hex("ff").is_none());
        assert!(Uint::from_hex("0x").is_none());
        assert!(Uint::from_hex("0xzz").is_none());
    }

    #[test]
    fn test_uint_arithmetic() {
        let a = Uint::from(100u64);
        let b = Uint::from(30u64);

        assert_eq!(a.clone() + b.clone(), Uint::from(130u64));
        assert_eq!(a.clone() - b.clone(), Uint::from(70u64));
        assert_eq!(a.clone() * b.clone(), Uint::from(3000u64));
        // Floor division.
        assert_eq!(a / b, Uint::from(3u64));
        assert_eq!(Uint::from(7u64) / Uint::from(2u64), Uint::from(3u64));
    }

    #[test]
    fn test_uint_checked_sub() {
        let a = Uint::from(5u64);
        let b = Uint::from(7u64);
        assert_eq!(b.checked_sub(&a), Some(Uint::from(2u64)));
        assert_eq!(a.checked_sub(&b), None);
        assert_eq!(a.saturating_sub(&b), Uint::zero());
    }

    #[test]
    fn test_uint_sum() {
        let total: Uint = vec![Uint::from(1u64), Uint::from(2u64), Uint::from(3u64)]
            .into_iter()
            .sum();
        assert_eq!(total, Uint::from(6u64));
    }

    #[test]
    fn test_uint_json_is_string() {
        let value = Uint::from_str_canonical("1000000000000000000").unwrap();
        let json = serde_json::to_value(&value).unwrap();
        assert!(json.is_string());
        assert_eq!(json.as_str().unwrap(), "1000000000000000000");

        let back: Uint = serde_json::from_value(json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_uint_ordering() {
        let a = Uint::from(10u64);
        let b = Uint::from(20u64);
        assert!(a < b);
        assert_eq!(a.max(b.clone()), b);
    }
}
