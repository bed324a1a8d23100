use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use std::fmt;
use std::ops::{Add, BitAnd, BitOr, BitXor, Shl, Shr};

/// Bit mask covering the low `width` bits.
pub fn mask(width: u32) -> BigUint {
    (BigUint::one() << width) - BigUint::one()
}

/// Unsigned value carried by a wire.
///
/// Values are unbounded internally; a wire masks them to its own width when
/// they are written, so arithmetic here never needs to care about overflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Value(BigUint);

impl Value {
    pub fn new(value: BigUint) -> Self {
        Value(value)
    }

    pub fn zero() -> Self {
        Value(BigUint::zero())
    }

    /// Two's-complement encoding of `value` in `width` bits.
    pub fn from_i64(value: i64, width: u32) -> Self {
        if value >= 0 {
            return Value(BigUint::from(value as u64)).masked(width);
        }

        let modulus = BigUint::one() << width;
        let magnitude = BigUint::from(value.unsigned_abs()) % &modulus;
        if magnitude.is_zero() {
            Value::zero()
        } else {
            Value(modulus - magnitude)
        }
    }

    pub fn masked(self, width: u32) -> Self {
        Value(self.0 & mask(width))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn bit(&self, n: u32) -> bool {
        self.0.bit(u64::from(n))
    }

    pub fn set_bit(&mut self, n: u32, value: bool) {
        self.0.set_bit(u64::from(n), value);
    }

    /// Bitwise complement within `width` bits.
    pub fn not(&self, width: u32) -> Self {
        let m = mask(width);
        Value((&self.0 & &m) ^ m)
    }

    /// Increment, wrapping at `width` bits.
    pub fn wrapping_inc(&self, width: u32) -> Self {
        Value(&self.0 + BigUint::one()).masked(width)
    }

    pub fn to_u64(&self) -> Option<u64> {
        self.0.to_u64()
    }

    pub fn to_usize(&self) -> Option<usize> {
        self.0.to_usize()
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Number of significant bits (0 for zero).
    pub fn bits(&self) -> u64 {
        self.0.bits()
    }

    /// Zero-padded binary rendering, most significant bit first.
    pub fn to_binary_string(&self, width: u32) -> String {
        (0..width)
            .rev()
            .map(|n| if self.bit(n) { '1' } else { '0' })
            .collect()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::LowerHex for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::UpperHex for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

impl fmt::Binary for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Binary::fmt(&self.0, f)
    }
}

macro_rules! value_from_unsigned {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value(BigUint::from(value))
                }
            }
        )*
    };
}

value_from_unsigned!(u8, u16, u32, u64, u128, usize);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value(BigUint::from(u8::from(value)))
    }
}

impl From<BigUint> for Value {
    fn from(value: BigUint) -> Self {
        Value(value)
    }
}

impl From<&Value> for Value {
    fn from(value: &Value) -> Self {
        value.clone()
    }
}

macro_rules! value_binop {
    ($imp:ident, $method:ident) => {
        impl $imp for Value {
            type Output = Value;

            fn $method(self, rhs: Value) -> Value {
                Value($imp::$method(self.0, rhs.0))
            }
        }

        impl $imp<&Value> for &Value {
            type Output = Value;

            fn $method(self, rhs: &Value) -> Value {
                Value($imp::$method(&self.0, &rhs.0))
            }
        }
    };
}

value_binop!(BitAnd, bitand);
value_binop!(BitOr, bitor);
value_binop!(BitXor, bitxor);
value_binop!(Add, add);

impl Shl<u32> for Value {
    type Output = Value;

    fn shl(self, rhs: u32) -> Value {
        Value(self.0 << rhs)
    }
}

impl Shl<u32> for &Value {
    type Output = Value;

    fn shl(self, rhs: u32) -> Value {
        Value(&self.0 << rhs)
    }
}

impl Shr<u32> for Value {
    type Output = Value;

    fn shr(self, rhs: u32) -> Value {
        Value(self.0 >> rhs)
    }
}

impl Shr<u32> for &Value {
    type Output = Value;

    fn shr(self, rhs: u32) -> Value {
        Value(&self.0 >> rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masking() {
        assert_eq!(Value::from(0x1ffu32).masked(8), Value::from(0xffu32));
        assert_eq!(Value::from(5u32).masked(1), Value::from(1u32));
        assert_eq!(mask(4), BigUint::from(0xfu32));
    }

    #[test]
    fn test_twos_complement() {
        assert_eq!(Value::from_i64(-1, 4), Value::from(0xfu32));
        assert_eq!(Value::from_i64(-16, 4), Value::zero());
        assert_eq!(Value::from_i64(-3, 8), Value::from(0xfdu32));
    }

    #[test]
    fn test_not_and_increment() {
        assert_eq!(Value::from(0b1010u32).not(4), Value::from(0b0101u32));
        assert_eq!(Value::from(0xffu32).wrapping_inc(8), Value::zero());
    }

    #[test]
    fn test_binary_string() {
        assert_eq!(Value::from(5u32).to_binary_string(4), "0101");
        assert_eq!(Value::zero().to_binary_string(0), "");
    }

    #[test]
    fn test_wide_values() {
        let wide = Value::from(1u32) << 100;
        assert!(wide.bit(100));
        assert_eq!(wide.to_u64(), None);
        assert_eq!(wide.masked(100), Value::zero());
    }
}
