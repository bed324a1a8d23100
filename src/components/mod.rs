//! Built-in parts. Ports are positional; each part documents its port order.

pub mod alu;
pub mod clock;
pub mod display;
pub mod gates;
pub mod hd44780;
pub mod memory;
pub mod register;
pub mod switch;

pub use alu::alu;
pub use clock::Clock;
pub use display::{LedArray, SegDisplay};
pub use gates::{and_gate, bus_transceiver, comparator, constant, not_gate, or_gate, xor_gate};
pub use hd44780::Hd44780;
pub use memory::{Ram, Rom};
pub use register::Register;
pub use switch::{DipSwitch, PushButton};
