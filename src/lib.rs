//! # Rusty Logic Library
//!
//! A gate-level digital circuit simulator written in Rust.
//!
//! This library provides:
//! - Fixed-width wires holding arbitrary-precision unsigned values
//! - Bit-range slices and concatenations over wires
//! - A fixed-point settle engine with loop detection and clock-edge semantics
//! - A part library (gates, ALU, registers, RAM/ROM, displays, HD44780 LCD)
//! - Active components (clock, DIP switches, push buttons) for driving circuits
//! - JSON-configurable circuits and a few prebuilt machines
//!
//! ```
//! use rusty_logic::components::gates::{and_gate, xor_gate};
//! use rusty_logic::components::switch::DipSwitch;
//! use rusty_logic::{ports, SimError, Simulator};
//!
//! let mut sim = Simulator::new();
//! let inputs = sim.create_wire(2)?;
//! let x = sim.bit(inputs, 1)?;
//! let y = sim.bit(inputs, 0)?;
//! let sum = sim.create_wire(1)?;
//! let carry = sim.create_wire(1)?;
//! sim.register_fn(xor_gate, ports![&x, &y, sum]);
//! sim.register_fn(and_gate, ports![x, y, carry]);
//!
//! let switches: DipSwitch = sim.register_active(ports![inputs])?;
//! sim.init()?;
//! switches.set(&mut sim, 0b11u32)?;
//! assert_eq!(sim.read(sum)?.to_u64(), Some(0));
//! assert_eq!(sim.read(carry)?.to_u64(), Some(1));
//! # Ok::<(), SimError>(())
//! ```

pub mod board;
pub mod circuit_config;
pub mod component;
pub mod components;
pub mod console;
pub mod edge;
pub mod error;
pub mod signal;
pub mod simulator;
pub mod stimulus;
pub mod systems;
pub mod types;
pub mod wire;

// Re-export commonly used items for easier importing
pub use component::{Behavior, Component, Io, Reading, StateRef};
pub use edge::EdgeDetector;
pub use error::SimError;
pub use signal::{combine, Concat, Signal, Slice};
pub use simulator::{SettleReport, SimConfig, Simulator};
pub use stimulus::{ActiveComponent, ActiveLines, Stimulus};
pub use types::Value;
pub use wire::{Wire, WireId};
