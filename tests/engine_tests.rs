//! Settle engine behavior: wires, views, pass accounting and failure modes.

mod common;

use common::{init_logger, v};
use rusty_logic::components::clock::Clock;
use rusty_logic::components::gates::{and_gate, bus_transceiver, constant, not_gate, xor_gate};
use rusty_logic::components::register::Register;
use rusty_logic::components::switch::DipSwitch;
use rusty_logic::systems::adder::ripple_adder;
use rusty_logic::{combine, ports, SimConfig, SimError, Simulator, Stimulus};

#[cfg(test)]
mod settle_tests {
    use super::*;

    #[test]
    fn test_half_adder_settles_in_one_pass() {
        init_logger();
        let mut sim = Simulator::new();
        let x = sim.create_wire(1).unwrap();
        let y = sim.create_wire(1).unwrap();
        let sum = sim.create_wire(1).unwrap();
        let carry = sim.create_wire(1).unwrap();
        sim.register_fn(xor_gate, ports![x, y, sum]);
        sim.register_fn(and_gate, ports![x, y, carry]);
        sim.init().unwrap();

        let report = sim.apply(Stimulus::new().set(x, 1u32).set(y, 1u32)).unwrap();
        assert_eq!(report.propagation_depth(), 1);
        assert_eq!(sim.read(sum).unwrap(), v(0));
        assert_eq!(sim.read(carry).unwrap(), v(1));
    }

    #[test]
    fn test_ripple_adder_depth_follows_carry_chain() {
        init_logger();
        let mut sim = Simulator::new();
        let x = sim.create_wire(4).unwrap();
        let y = sim.create_wire(4).unwrap();
        let carry_in = sim.create_wire(1).unwrap();
        let sum = sim.create_wire(4).unwrap();
        let carry_out = sim.create_wire(1).unwrap();
        ripple_adder(&mut sim, x, y, carry_in, sum, carry_out).unwrap();
        sim.register_fn(constant(0u32), ports![carry_in]);
        sim.init().unwrap();

        let report = sim
            .apply(Stimulus::new().set(x, 0b0111u32).set(y, 0b0001u32))
            .unwrap();
        assert_eq!(sim.read(sum).unwrap(), v(0b1000));
        assert_eq!(sim.read(carry_out).unwrap(), v(0));
        assert!(report.propagation_depth() >= 4, "depth {}", report.propagation_depth());

        sim.apply(Stimulus::new().set(x, 0b1111u32)).unwrap();
        assert_eq!(sim.read(sum).unwrap(), v(0));
        assert_eq!(sim.read(carry_out).unwrap(), v(1));
    }

    #[test]
    fn test_settle_is_idempotent() {
        let mut sim = Simulator::new();
        let bus = sim.create_wire(8).unwrap();
        let inverted = sim.create_wire(8).unwrap();
        sim.register_fn(constant(0x5au32), ports![bus]);
        sim.register_fn(not_gate, ports![bus, inverted]);
        sim.init().unwrap();

        let before = (sim.read(bus).unwrap(), sim.read(inverted).unwrap());
        assert_eq!(sim.settle().unwrap().passes, 1);
        assert_eq!((sim.read(bus).unwrap(), sim.read(inverted).unwrap()), before);
        assert_eq!(before.1, v(0xa5));
    }

    #[test]
    fn test_inverting_loop_does_not_converge() {
        init_logger();
        let mut sim = Simulator::new();
        let w = sim.create_wire(1).unwrap();
        sim.register_fn(not_gate, ports![w, w]);
        assert_eq!(sim.init(), Err(SimError::NonConvergence { passes: 100 }));
    }

    #[test]
    fn test_pass_bound_from_config() {
        let config: SimConfig = serde_json::from_str(r#"{ "max_passes": 3 }"#).unwrap();
        let mut sim = Simulator::with_config(config);
        let w = sim.create_wire(1).unwrap();
        sim.register_fn(not_gate, ports![w, w]);
        assert_eq!(sim.init(), Err(SimError::NonConvergence { passes: 3 }));

        let defaults: SimConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults.max_passes, 100);
    }

    #[test]
    fn test_latch_holds_value_across_ticks() {
        init_logger();
        let mut sim = Simulator::new();
        let clk = sim.create_wire(1).unwrap();
        let gnd = sim.create_wire(1).unwrap();
        let vcc = sim.create_wire(1).unwrap();
        let input = sim.create_wire(4).unwrap();
        let data = sim.create_wire(4).unwrap();
        sim.register_fn(constant(0u32), ports![gnd]);
        sim.register_fn(constant(1u32), ports![vcc]);
        let latch = sim.register_component(
            Register::named("latch"),
            ports![clk, gnd, vcc, vcc, gnd, data, input],
        );
        let clock: Clock = sim.register_active(ports![clk]).unwrap();
        let switches: DipSwitch = sim.register_active(ports![input]).unwrap();
        sim.init().unwrap();

        switches.set(&mut sim, 5u32).unwrap();
        assert_eq!(latch.borrow().value(), &v(0));
        clock.tick(&mut sim).unwrap();
        assert_eq!(latch.borrow().value(), &v(5));
        clock.tick(&mut sim).unwrap();
        assert_eq!(latch.borrow().value(), &v(5));
        assert_eq!(sim.read(data).unwrap(), v(5));
    }
}

#[cfg(test)]
mod view_tests {
    use super::*;

    #[test]
    fn test_concatenation_order() {
        let mut sim = Simulator::new();
        let a = sim.create_wire(2).unwrap();
        let b = sim.create_wire(2).unwrap();
        sim.register_fn(constant(0b10u32), ports![a]);
        sim.register_fn(constant(0b01u32), ports![b]);
        sim.init().unwrap();

        let both = combine(ports![a, b]);
        assert_eq!(sim.width(&both).unwrap(), 4);
        assert_eq!(sim.read(&both).unwrap(), v(0b1001));
    }

    #[test]
    fn test_sibling_slices_written_in_one_pass() {
        let mut sim = Simulator::new();
        let bus = sim.create_wire(8).unwrap();
        let low = sim.slice(bus, 0, 4).unwrap();
        let high = sim.slice(bus, 4, 4).unwrap();
        sim.register_fn(constant(0x3u32), ports![low]);
        sim.register_fn(constant(0xcu32), ports![high]);
        sim.init().unwrap();
        assert_eq!(sim.read(bus).unwrap(), v(0xc3));
    }

    #[test]
    fn test_overlapping_slices_last_writer_wins() {
        let mut sim = Simulator::new();
        let bus = sim.create_wire(8).unwrap();
        let low = sim.slice(bus, 0, 6).unwrap();
        let high = sim.slice(bus, 2, 6).unwrap();
        sim.register_fn(constant(0b111111u32), ports![low]);
        sim.register_fn(constant(0u32), ports![high]);
        sim.init().unwrap();
        assert_eq!(sim.read(bus).unwrap(), v(0b0000_0011));
    }

    #[test]
    fn test_slice_of_slice_is_absolute() {
        let mut sim = Simulator::new();
        let bus = sim.create_wire(16).unwrap();
        let byte = sim.slice(bus, 8, 8).unwrap();
        let nibble = sim.slice(&byte, 2, 4).unwrap();
        sim.register_fn(constant(0xfu32), ports![nibble]);
        sim.init().unwrap();
        assert_eq!(sim.read(bus).unwrap(), v(0x3c00));
        assert_eq!(sim.read(&byte).unwrap(), v(0x3c));
    }

    #[test]
    fn test_view_errors() {
        let mut sim = Simulator::new();
        assert_eq!(sim.create_wire(0), Err(SimError::ZeroWidth));
        let w = sim.create_wire(4).unwrap();
        assert_eq!(
            sim.slice(w, 3, 2),
            Err(SimError::InvalidSlice {
                start: 3,
                count: 2,
                width: 4
            })
        );
        let both = combine(ports![w, w]);
        assert_eq!(sim.slice(both.clone(), 0, 1), Err(SimError::UnsliceableView));
        assert!(matches!(
            sim.register_active::<DipSwitch>(ports![both]),
            Err(SimError::ReadOnlyView)
        ));

        let mut other = Simulator::new();
        for _ in 0..3 {
            other.create_wire(1).unwrap();
        }
        let foreign = other.create_wire(1).unwrap();
        assert_eq!(sim.read(foreign), Err(SimError::UnknownWire(foreign)));
    }
}

#[cfg(test)]
mod failure_tests {
    use super::*;

    #[test]
    fn test_double_write_aborts_settle() {
        let mut sim = Simulator::new();
        let w = sim.create_wire(4).unwrap();
        sim.register_fn(constant(1u32), ports![w]);
        sim.register_fn(constant(2u32), ports![w]);
        assert_eq!(sim.init(), Err(SimError::DoubleWrite { wire: w }));
        assert_eq!(sim.read(w).unwrap(), v(0));
        assert!(sim.wire(w).unwrap().pending().is_none());
    }

    #[test]
    fn test_missing_port_and_level_checks() {
        let mut sim = Simulator::new();
        let w = sim.create_wire(1).unwrap();
        sim.register_fn(not_gate, ports![w]);
        assert!(matches!(
            sim.init(),
            Err(SimError::MissingPort { index: 1, .. })
        ));

        let mut sim = Simulator::new();
        let a = sim.create_wire(4).unwrap();
        let b = sim.create_wire(4).unwrap();
        let en = sim.create_wire(2).unwrap();
        sim.register_fn(bus_transceiver, ports![a, b, en]);
        assert_eq!(sim.init(), Err(SimError::NotSingleBit { width: 2 }));
    }

    #[test]
    fn test_borrowed_component_is_busy() {
        let mut sim = Simulator::new();
        let clk = sim.create_wire(1).unwrap();
        let gnd = sim.create_wire(1).unwrap();
        let data = sim.create_wire(4).unwrap();
        let reg = sim.register_component(
            Register::named("held"),
            ports![clk, gnd, gnd, gnd, gnd, data],
        );
        sim.init().unwrap();

        let guard = reg.borrow();
        assert_eq!(
            sim.settle(),
            Err(SimError::ComponentBusy {
                component: "held".to_string()
            })
        );
        drop(guard);
        assert!(sim.settle().is_ok());
    }

    #[test]
    fn test_lifecycle_errors() {
        let mut sim = Simulator::new();
        let w = sim.create_wire(1).unwrap();
        assert_eq!(sim.settle(), Err(SimError::NotInitialized));
        assert_eq!(sim.apply(Stimulus::new().set(w, 1u32)), Err(SimError::NotInitialized));
        sim.init().unwrap();
        assert_eq!(sim.init(), Err(SimError::AlreadyInitialized));
    }

    #[test]
    fn test_stimulus_error_leaves_wires_untouched() {
        let mut sim = Simulator::new();
        let a = sim.create_wire(4).unwrap();
        let b = sim.create_wire(4).unwrap();
        sim.init().unwrap();

        let bad = Stimulus::new().set(a, 3u32).set(combine(ports![a, b]), 1u32);
        assert_eq!(sim.apply(bad), Err(SimError::ReadOnlyView));
        assert_eq!(sim.read(a).unwrap(), v(0));
    }
}
