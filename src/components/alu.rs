use crate::component::Io;
use crate::error::SimError;
use crate::types::Value;

pub const FLAG_CARRY: u32 = 0b01;
pub const FLAG_ZERO: u32 = 0b10;

/// Bit-serial ripple-carry addition over `width` bits.
///
/// Returns the sum (masked to `width`) and the carry out of the top bit.
pub fn ripple_add(x: &Value, y: &Value, carry_in: bool, width: u32) -> (Value, bool) {
    let mut carry = carry_in;
    let mut sum = Value::zero();
    for n in 0..width {
        let (xb, yb) = (x.bit(n), y.bit(n));
        let half = xb ^ yb;
        sum.set_bit(n, half ^ carry);
        carry = (xb && yb) || (half && carry);
    }
    (sum, carry)
}

/// `(x, y, sum, flags, sub)`.
///
/// Adds `x` and `y` across the width of `x`, or subtracts `y` when `sub` is
/// high by inverting it and adding one. `flags` receives
/// `zero << 1 | carry`.
pub fn alu(io: &mut Io<'_>) -> Result<(), SimError> {
    let width = io.width(0)?;
    let sub = io.high(4)?;
    let x = io.value(0)?;
    let y = if sub {
        io.value(1)?.not(width)
    } else {
        io.value(1)?
    };

    let (sum, carry) = ripple_add(&x, &y, sub, width);
    let mut flags = 0;
    if sum.is_zero() {
        flags |= FLAG_ZERO;
    }
    if carry {
        flags |= FLAG_CARRY;
    }
    io.write(2, sum)?;
    io.write(3, flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ports, Simulator, Stimulus};

    #[test]
    fn test_ripple_add() {
        let (sum, carry) = ripple_add(&Value::from(0b0111u32), &Value::from(0b0001u32), false, 4);
        assert_eq!(sum, Value::from(0b1000u32));
        assert!(!carry);

        let (sum, carry) = ripple_add(&Value::from(0xffu32), &Value::from(1u32), false, 8);
        assert_eq!(sum, Value::zero());
        assert!(carry);
    }

    #[test]
    fn test_alu_add_and_subtract() {
        let mut sim = Simulator::new();
        let x = sim.create_wire(8).unwrap();
        let y = sim.create_wire(8).unwrap();
        let sum = sim.create_wire(8).unwrap();
        let flags = sim.create_wire(2).unwrap();
        let sub = sim.create_wire(1).unwrap();
        sim.register_fn(alu, ports![x, y, sum, flags, sub]);
        sim.init().unwrap();
        assert_eq!(sim.read(flags).unwrap(), Value::from(FLAG_ZERO));

        sim.apply(Stimulus::new().set(x, 200u32).set(y, 100u32))
            .unwrap();
        assert_eq!(sim.read(sum).unwrap(), Value::from(44u32));
        assert_eq!(sim.read(flags).unwrap(), Value::from(FLAG_CARRY));

        sim.apply(Stimulus::new().set(sub, 1u32)).unwrap();
        assert_eq!(sim.read(sum).unwrap(), Value::from(100u32));
        // no borrow sets carry
        assert_eq!(sim.read(flags).unwrap(), Value::from(FLAG_CARRY));

        sim.apply(Stimulus::new().set(y, 201u32)).unwrap();
        assert_eq!(sim.read(sum).unwrap(), Value::from(255u32));
        assert_eq!(sim.read(flags).unwrap(), Value::zero());

        sim.apply(Stimulus::new().set(y, 200u32)).unwrap();
        assert_eq!(sim.read(flags).unwrap(), Value::from(FLAG_ZERO | FLAG_CARRY));
    }
}
