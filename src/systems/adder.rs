//! Ripple-carry adder built from gates.

use crate::board::{Board, Control, ProbeFormat};
use crate::components::display::LedArray;
use crate::components::gates::{and_gate, constant, or_gate, xor_gate};
use crate::components::switch::DipSwitch;
use crate::error::SimError;
use crate::ports;
use crate::signal::Signal;
use crate::simulator::Simulator;

/// XOR for the sum, AND for the carry.
pub fn half_adder(
    sim: &mut Simulator,
    x: impl Into<Signal>,
    y: impl Into<Signal>,
    sum: impl Into<Signal>,
    carry: impl Into<Signal>,
) {
    let (x, y): (Signal, Signal) = (x.into(), y.into());
    let (sum, carry): (Signal, Signal) = (sum.into(), carry.into());
    sim.register_named_fn("half_adder.sum", xor_gate, ports![&x, &y, sum]);
    sim.register_named_fn("half_adder.carry", and_gate, ports![x, y, carry]);
}

/// Two half adders and an OR joining their carries.
pub fn full_adder(
    sim: &mut Simulator,
    x: impl Into<Signal>,
    y: impl Into<Signal>,
    carry_in: impl Into<Signal>,
    sum: impl Into<Signal>,
    carry_out: impl Into<Signal>,
) -> Result<(), SimError> {
    let carry_out: Signal = carry_out.into();
    let partial = sim.create_wire(1)?;
    let c1 = sim.create_wire(1)?;
    let c2 = sim.create_wire(1)?;
    half_adder(sim, x, y, partial, c1);
    half_adder(sim, partial, carry_in, sum, c2);
    sim.register_named_fn("full_adder.carry", or_gate, ports![c1, c2, carry_out]);
    Ok(())
}

/// Chain one full adder per bit of `x`. Sum bits are written through slices
/// of `sum`, so every stage writes a sibling slice of the same wire.
pub fn ripple_adder(
    sim: &mut Simulator,
    x: impl Into<Signal>,
    y: impl Into<Signal>,
    carry_in: impl Into<Signal>,
    sum: impl Into<Signal>,
    carry_out: impl Into<Signal>,
) -> Result<(), SimError> {
    let (x, y, sum): (Signal, Signal, Signal) = (x.into(), y.into(), sum.into());
    let carry_out: Signal = carry_out.into();
    let width = sim.width(&x)?;

    let mut carry: Signal = carry_in.into();
    for n in 0..width {
        let next: Signal = if n + 1 == width {
            carry_out.clone()
        } else {
            sim.create_wire(1)?.into()
        };
        let (xb, yb, sb) = (sim.bit(&x, n)?, sim.bit(&y, n)?, sim.bit(&sum, n)?);
        full_adder(sim, xb, yb, carry, sb, &next)?;
        carry = next;
    }
    Ok(())
}

/// Two switch banks `X` and `Y` feeding a ripple adder with carry-in tied low.
/// Probes: `S` (sum) and `C` (carry out).
pub fn adder_board(width: u32) -> Result<Board, SimError> {
    let mut sim = Simulator::new();
    let x = sim.create_wire(width)?;
    let y = sim.create_wire(width)?;
    let s = sim.create_wire(width)?;
    let carry_in = sim.create_wire(1)?;
    let carry_out = sim.create_wire(1)?;

    ripple_adder(&mut sim, x, y, carry_in, s, carry_out)?;
    sim.register_named_fn("carry_in", constant(0u32), ports![carry_in]);
    let sum_leds = sim.register_component(LedArray::new(), ports![s]);
    let carry_leds = sim.register_component(LedArray::new(), ports![carry_out]);

    let sx: DipSwitch = sim.register_active(ports![x])?;
    let sy: DipSwitch = sim.register_active(ports![y])?;

    let mut board = Board::new("adder", sim)
        .with_description(format!("{width}-bit ripple-carry adder built from gates"));
    board.add_control("X", Control::Switch(sx));
    board.add_control("Y", Control::Switch(sy));
    board.watch_leds("S", &sum_leds, ProbeFormat::Binary);
    board.watch_leds("C", &carry_leds, ProbeFormat::Binary);
    Ok(board)
}
