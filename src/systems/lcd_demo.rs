//! A counter stepping through a ROM of LCD bus words.
//!
//! Each ROM word is `rs << 9 | rw << 8 | byte`. The counter advances on the
//! rising clock edge and the controller takes the word on the falling edge,
//! so tick `k` delivers word `k`. The counter stops on the last word, which
//! the controller then takes again on every later tick, so programs should
//! end with a no-op word.

use crate::board::{Board, Control, ProbeFormat};
use crate::components::clock::Clock;
use crate::components::display::LedArray;
use crate::components::gates::{comparator, constant, not_gate};
use crate::components::hd44780::Hd44780;
use crate::components::memory::Rom;
use crate::components::register::Register;
use crate::error::SimError;
use crate::ports;
use crate::simulator::Simulator;

pub const COLS: usize = 8;
pub const ROWS: usize = 2;
pub const PROGRAM_WORDS: usize = 16;

const DATA: u32 = 1 << 9;

/// Function set, display on, entry mode, clear, then "HI" on the first line
/// and "!" on the second. Word 0 is never delivered.
pub fn greeting() -> Vec<u32> {
    let mut words = vec![
        0x000,
        0x03c,
        0x00f,
        0x006,
        0x001,
        DATA | u32::from(b'H'),
        DATA | u32::from(b'I'),
        0x0c0,
        DATA | u32::from(b'!'),
    ];
    words.resize(PROGRAM_WORDS, 0);
    words
}

pub fn lcd_board() -> Result<Board, SimError> {
    lcd_board_with(greeting())
}

/// Build the demo around a custom 16-word program.
pub fn lcd_board_with(program: Vec<u32>) -> Result<Board, SimError> {
    let mut sim = Simulator::new();
    let vcc = sim.create_wire(1)?;
    sim.register_named_fn("VCC", constant(1u32), ports![vcc]);
    let gnd = sim.create_wire(1)?;
    sim.register_named_fn("GND", constant(0u32), ports![gnd]);

    let clk = sim.create_wire(1)?;
    let clock: Clock = sim.register_active(ports![clk])?;

    let addr = sim.create_wire(4)?;
    let last = sim.create_wire(4)?;
    sim.register_named_fn("last", constant(PROGRAM_WORDS - 1), ports![last]);
    let at_end = sim.create_wire(1)?;
    sim.register_named_fn("at_end", comparator, ports![addr, last, at_end]);
    let run = sim.create_wire(1)?;
    sim.register_named_fn("run", not_gate, ports![at_end, run]);
    let counter = sim.register_component(Register::named("PC"), ports![clk, run, gnd, vcc, gnd, addr]);

    let data = sim.create_wire(10)?;
    sim.register_component(Rom::from_words(program).named("program"), ports![addr, data, vcc]);

    let rs = sim.bit(data, 9)?;
    let rw = sim.bit(data, 8)?;
    let byte = sim.slice(data, 0, 8)?;
    let lcd = sim.register_component(Hd44780::new(COLS, ROWS), ports![rs, rw, clk, byte]);
    let leds = sim.register_component(LedArray::new(), ports![data]);

    let mut board = Board::new("lcd", sim).with_description("ROM-driven HD44780 character display");
    board.add_control("clock", Control::Clock(clock));
    board.watch_register("PC", &counter, ProbeFormat::Decimal);
    board.watch_leds("Bus", &leds, ProbeFormat::Binary);
    board.watch_lcd("LCD", &lcd);
    Ok(board)
}
