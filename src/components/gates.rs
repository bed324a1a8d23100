//! Stateless combinational parts, registered with
//! [`Simulator::register_fn`](crate::Simulator::register_fn).

use crate::component::Io;
use crate::error::SimError;
use crate::types::Value;

/// `(a, b, out)`
pub fn and_gate(io: &mut Io<'_>) -> Result<(), SimError> {
    let out = io.value(0)? & io.value(1)?;
    io.write(2, out)
}

/// `(a, b, out)`
pub fn or_gate(io: &mut Io<'_>) -> Result<(), SimError> {
    let out = io.value(0)? | io.value(1)?;
    io.write(2, out)
}

/// `(a, b, out)`
pub fn xor_gate(io: &mut Io<'_>) -> Result<(), SimError> {
    let out = io.value(0)? ^ io.value(1)?;
    io.write(2, out)
}

/// `(in, out)`. Inverts across the full width of `out`.
pub fn not_gate(io: &mut Io<'_>) -> Result<(), SimError> {
    let width = io.width(1)?;
    let out = io.value(0)?.not(width);
    io.write(1, out)
}

/// `(out)`. Drives a fixed value every pass.
pub fn constant(value: impl Into<Value>) -> impl Fn(&mut Io<'_>) -> Result<(), SimError> {
    let value = value.into();
    move |io: &mut Io<'_>| io.write(0, value.clone())
}

/// `(in, out, enable)`. Copies `in` onto `out` while enabled, otherwise leaves
/// `out` undriven.
pub fn bus_transceiver(io: &mut Io<'_>) -> Result<(), SimError> {
    if io.high(2)? {
        let value = io.value(0)?;
        io.write(1, value)?;
    }
    Ok(())
}

/// `(a, b, out)`. `out` is high when both inputs are equal.
pub fn comparator(io: &mut Io<'_>) -> Result<(), SimError> {
    let equal = io.value(0)? == io.value(1)?;
    io.write(2, equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ports, Simulator, Stimulus};

    #[test]
    fn test_truth_tables() {
        let mut sim = Simulator::new();
        let a = sim.create_wire(4).unwrap();
        let b = sim.create_wire(4).unwrap();
        let and = sim.create_wire(4).unwrap();
        let or = sim.create_wire(4).unwrap();
        let xor = sim.create_wire(4).unwrap();
        let not = sim.create_wire(4).unwrap();
        sim.register_fn(and_gate, ports![a, b, and]);
        sim.register_fn(or_gate, ports![a, b, or]);
        sim.register_fn(xor_gate, ports![a, b, xor]);
        sim.register_fn(not_gate, ports![a, not]);
        sim.init().unwrap();

        sim.apply(Stimulus::new().set(a, 0b1100u32).set(b, 0b1010u32))
            .unwrap();
        assert_eq!(sim.read(and).unwrap(), Value::from(0b1000u32));
        assert_eq!(sim.read(or).unwrap(), Value::from(0b1110u32));
        assert_eq!(sim.read(xor).unwrap(), Value::from(0b0110u32));
        assert_eq!(sim.read(not).unwrap(), Value::from(0b0011u32));
    }

    #[test]
    fn test_constant_is_masked() {
        let mut sim = Simulator::new();
        let out = sim.create_wire(3).unwrap();
        sim.register_fn(constant(0xffu32), ports![out]);
        sim.init().unwrap();
        assert_eq!(sim.read(out).unwrap(), Value::from(7u32));
    }

    #[test]
    fn test_bus_transceiver_tristate() {
        let mut sim = Simulator::new();
        let input = sim.create_wire(8).unwrap();
        let out = sim.create_wire(8).unwrap();
        let en = sim.create_wire(1).unwrap();
        sim.register_fn(bus_transceiver, ports![input, out, en]);
        sim.init().unwrap();

        sim.apply(Stimulus::new().set(input, 42u32)).unwrap();
        assert_eq!(sim.read(out).unwrap(), Value::zero());
        sim.apply(Stimulus::new().set(en, 1u32)).unwrap();
        assert_eq!(sim.read(out).unwrap(), Value::from(42u32));
        // disabled output keeps the last driven value
        sim.apply(Stimulus::new().set(en, 0u32).set(input, 7u32))
            .unwrap();
        assert_eq!(sim.read(out).unwrap(), Value::from(42u32));
    }

    #[test]
    fn test_comparator() {
        let mut sim = Simulator::new();
        let a = sim.create_wire(3).unwrap();
        let b = sim.create_wire(3).unwrap();
        let eq = sim.create_wire(1).unwrap();
        sim.register_fn(comparator, ports![a, b, eq]);
        sim.init().unwrap();
        assert_eq!(sim.read(eq).unwrap(), Value::from(1u32));
        sim.apply(Stimulus::new().set(a, 5u32)).unwrap();
        assert_eq!(sim.read(eq).unwrap(), Value::zero());
        sim.apply(Stimulus::new().set(b, 5u32)).unwrap();
        assert_eq!(sim.read(eq).unwrap(), Value::from(1u32));
    }
}
