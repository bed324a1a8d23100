use crate::component::{Component, Io, Listener, Reading};
use crate::edge::EdgeDetector;
use crate::error::SimError;
use crate::types::Value;

pub const CLOCK: usize = 0;
pub const COUNT_ENABLE: usize = 1;
pub const INPUT_ENABLE: usize = 2;
pub const OUTPUT_ENABLE: usize = 3;
pub const RESET: usize = 4;
pub const DATA: usize = 5;
/// Optional separate input. Without it, `DATA` is both input and output.
pub const INPUT: usize = 6;

/// Edge-triggered register with counter mode and asynchronous reset.
///
/// On a rising clock edge it increments when count-enable is high, otherwise
/// latches its input when input-enable is high. Reset forces zero every pass
/// it is held high. While output-enable is high the stored value is driven
/// onto `DATA` every pass.
#[derive(Debug)]
pub struct Register {
    name: String,
    clock: EdgeDetector,
    value: Value,
    width: u32,
    on_value_change: Listener<Reading>,
}

impl Register {
    pub fn new() -> Self {
        Self::named("register")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Register {
            name: name.into(),
            clock: EdgeDetector::rising(),
            value: Value::zero(),
            width: 0,
            on_value_change: Listener::default(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Width of the data port, known after the first evaluation.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Overwrite the stored value. Visible on the next settle.
    pub fn set_value(&mut self, value: impl Into<Value>) {
        self.value = value.into();
    }

    pub fn on_value_change(&mut self, callback: impl FnMut(&Reading) + 'static) {
        self.on_value_change.set(callback);
    }
}

impl Default for Register {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Register {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&mut self, io: &mut Io<'_>) -> Result<(), SimError> {
        let width = io.width(DATA)?;
        self.width = width;
        let input = if io.has(INPUT) { INPUT } else { DATA };

        if self.clock.detect(io, CLOCK)? {
            if io.high(COUNT_ENABLE)? {
                self.value = self.value.wrapping_inc(width);
            } else if io.high(INPUT_ENABLE)? {
                self.value = io.value(input)?.masked(width);
            }
        }

        if io.high(RESET)? {
            self.value = Value::zero();
        }

        if io.high(OUTPUT_ENABLE)? {
            io.write(DATA, self.value.clone())?;
        }

        self.on_value_change.notify(&Reading {
            value: self.value.clone(),
            width,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::clock::Clock;
    use crate::components::gates::constant;
    use crate::{ports, Simulator, Stimulus};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_register_counts_on_rising_edge() {
        let mut sim = Simulator::new();
        let clk = sim.create_wire(1).unwrap();
        let vcc = sim.create_wire(1).unwrap();
        let gnd = sim.create_wire(1).unwrap();
        let data = sim.create_wire(2).unwrap();
        sim.register_fn(constant(1u32), ports![vcc]);
        sim.register_fn(constant(0u32), ports![gnd]);
        let reg = sim.register_component(Register::new(), ports![clk, vcc, gnd, vcc, gnd, data]);
        let clock: Clock = sim.register_active(ports![clk]).unwrap();
        sim.init().unwrap();

        for expected in [1u32, 2, 3, 0] {
            clock.tick(&mut sim).unwrap();
            assert_eq!(reg.borrow().value(), &Value::from(expected));
            assert_eq!(sim.read(data).unwrap(), Value::from(expected));
        }
    }

    #[test]
    fn test_register_reset_and_output_enable() {
        let mut sim = Simulator::new();
        let clk = sim.create_wire(1).unwrap();
        let ie = sim.create_wire(1).unwrap();
        let oe = sim.create_wire(1).unwrap();
        let rst = sim.create_wire(1).unwrap();
        let gnd = sim.create_wire(1).unwrap();
        let out = sim.create_wire(8).unwrap();
        let input = sim.create_wire(8).unwrap();
        let reg = sim.register_component(
            Register::named("A"),
            ports![clk, gnd, ie, oe, rst, out, input],
        );
        let clock: Clock = sim.register_active(ports![clk]).unwrap();
        sim.init().unwrap();

        sim.apply(Stimulus::new().set(input, 0x5au32).set(ie, 1u32))
            .unwrap();
        clock.tick(&mut sim).unwrap();
        assert_eq!(reg.borrow().value(), &Value::from(0x5au32));
        // output disabled: nothing driven
        assert_eq!(sim.read(out).unwrap(), Value::zero());

        sim.apply(Stimulus::new().set(oe, 1u32)).unwrap();
        assert_eq!(sim.read(out).unwrap(), Value::from(0x5au32));

        sim.apply(Stimulus::new().set(rst, 1u32)).unwrap();
        assert_eq!(reg.borrow().value(), &Value::zero());
        assert_eq!(sim.read(out).unwrap(), Value::zero());
    }

    #[test]
    fn test_register_notifies_every_pass() {
        let mut sim = Simulator::new();
        let clk = sim.create_wire(1).unwrap();
        let gnd = sim.create_wire(1).unwrap();
        let data = sim.create_wire(4).unwrap();
        let reg = sim.register_component(Register::new(), ports![clk, gnd, gnd, gnd, gnd, data]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        reg.borrow_mut()
            .on_value_change(move |reading| sink.borrow_mut().push(reading.clone()));

        let report = sim.init().unwrap();
        assert_eq!(seen.borrow().len(), report.passes);
        assert_eq!(
            seen.borrow()[0],
            Reading {
                value: Value::zero(),
                width: 4
            }
        );
    }
}
