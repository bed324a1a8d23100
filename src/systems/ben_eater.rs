//! Eight-bit breadboard CPU in the style of Ben Eater's SAP-1 build.
//!
//! Every register shares one 8-bit bus. A 3-bit step counter, the opcode and
//! the flags address a microcode ROM whose 16-bit output word drives the
//! control lines. Each instruction takes five clock ticks: two fetch steps
//! and up to three execute steps.

use crate::board::{Board, Control, ProbeFormat};
use crate::component::StateRef;
use crate::components::alu::alu;
use crate::components::clock::Clock;
use crate::components::display::{LedArray, SegDisplay};
use crate::components::gates::{bus_transceiver, comparator, constant, not_gate, or_gate};
use crate::components::memory::{Ram, Rom};
use crate::components::register::Register;
use crate::components::switch::PushButton;
use crate::error::SimError;
use crate::ports;
use crate::signal::combine;
use crate::simulator::{SettleReport, Simulator};
use crate::types::Value;
use crate::wire::WireId;

// control word bits
pub const PCCE: u32 = 1 << 0;
pub const PCIE: u32 = 1 << 1;
pub const PCOE: u32 = 1 << 2;
pub const MARIE: u32 = 1 << 3;
pub const RAMOE: u32 = 1 << 4;
pub const RAMIE: u32 = 1 << 5;
pub const INSIE: u32 = 1 << 6;
pub const AIE: u32 = 1 << 7;
pub const AOE: u32 = 1 << 8;
pub const INSOE: u32 = 1 << 9;
pub const OIE: u32 = 1 << 10;
pub const BIE: u32 = 1 << 11;
pub const FOE: u32 = 1 << 12;
pub const ALUOE: u32 = 1 << 13;
pub const HLTA: u32 = 1 << 14;
pub const SU: u32 = 1 << 15;

pub const NOP: u8 = 0x0;
pub const LDA: u8 = 0x1;
pub const ADD: u8 = 0x2;
pub const SUB: u8 = 0x3;
pub const STA: u8 = 0x4;
pub const LDI: u8 = 0x5;
pub const JMP: u8 = 0x6;
pub const JC: u8 = 0x7;
pub const JZ: u8 = 0x8;
pub const OUT: u8 = 0xe;
pub const HLT: u8 = 0xf;

pub const MICROCODE_WORDS: usize = 512;
pub const RAM_WORDS: usize = 16;
const LAST_STEP: u32 = 5;

fn microcode_address(op: u8, step: usize, flags: usize) -> usize {
    (usize::from(op) << 5) | (step << 2) | flags
}

/// Microcode image addressed by `opcode << 5 | step << 2 | flags`, where
/// flags is `zero << 1 | carry`.
pub fn microcode() -> Vec<u32> {
    let mut rom = vec![0u32; MICROCODE_WORDS];
    for (address, word) in rom.iter_mut().enumerate() {
        match (address & 0b11100) >> 2 {
            0 => *word = PCOE | MARIE,
            1 => *word = PCCE | RAMOE | INSIE,
            _ => {}
        }
    }

    let mut set = |op: u8, step: usize, flags: &[usize], word: u32| {
        for &f in flags {
            rom[microcode_address(op, step, f)] = word;
        }
    };
    const ANY: &[usize] = &[0b00, 0b01, 0b10, 0b11];
    set(LDA, 2, ANY, MARIE | INSOE);
    set(LDA, 3, ANY, RAMOE | AIE);
    set(ADD, 2, ANY, MARIE | INSOE);
    set(ADD, 3, ANY, RAMOE | BIE);
    set(ADD, 4, ANY, ALUOE | AIE | FOE);
    set(SUB, 2, ANY, MARIE | INSOE);
    set(SUB, 3, ANY, RAMOE | BIE);
    set(SUB, 4, ANY, ALUOE | AIE | SU | FOE);
    set(STA, 2, ANY, MARIE | INSOE);
    set(STA, 3, ANY, RAMIE | AOE);
    set(LDI, 2, ANY, INSOE | AIE);
    set(JMP, 2, ANY, INSOE | PCIE);
    set(JC, 2, &[0b01, 0b11], INSOE | PCIE);
    set(JZ, 2, &[0b10, 0b11], INSOE | PCIE);
    set(OUT, 2, ANY, AOE | OIE);
    set(HLT, 2, ANY, HLTA);
    rom
}

/// Encode one instruction byte.
pub fn instruction(op: u8, operand: u8) -> u8 {
    (op << 4) | (operand & 0x0f)
}

/// Multiplies the words at 14 and 15 by repeated addition and shows the
/// product: 7 * 8 = 56.
pub fn demo_program() -> [u8; RAM_WORDS] {
    [
        instruction(LDA, 14),
        instruction(SUB, 12),
        instruction(JC, 6),
        instruction(LDA, 13),
        instruction(OUT, 0),
        instruction(HLT, 0),
        instruction(STA, 14),
        instruction(LDA, 13),
        instruction(ADD, 15),
        instruction(STA, 13),
        instruction(JMP, 0),
        0,
        1,
        0,
        7,
        8,
    ]
}

/// The assembled machine and handles to its interesting state.
#[derive(Debug)]
pub struct BenEater {
    pub board: Board,
    pub pc: StateRef<Register>,
    pub a: StateRef<Register>,
    pub b: StateRef<Register>,
    pub ins: StateRef<Register>,
    pub step: StateRef<Register>,
    pub flags: StateRef<Register>,
    pub mar: StateRef<Register>,
    pub ram: StateRef<Ram>,
    pub output: StateRef<SegDisplay>,
    ctrl: WireId,
}

impl BenEater {
    /// Build the machine with `program` loaded into RAM (zero padded).
    pub fn new(program: &[u8]) -> Result<Self, SimError> {
        let mut content = vec![Value::zero(); RAM_WORDS];
        for (word, byte) in content.iter_mut().zip(program) {
            *word = Value::from(*byte);
        }

        let mut sim = Simulator::new();

        let vcc = sim.create_wire(1)?;
        sim.register_named_fn("VCC", constant(1u32), ports![vcc]);
        let gnd = sim.create_wire(1)?;
        sim.register_named_fn("GND", constant(0u32), ports![gnd]);

        let ctrl = sim.create_wire(16)?;
        let line = |sim: &Simulator, bit: u32| sim.bit(ctrl, bit);

        let clksrc = sim.create_wire(1)?;
        let clock: Clock = sim.register_active(ports![clksrc])?;
        let rst = sim.create_wire(1)?;
        let reset: PushButton = sim.register_active(ports![rst])?;

        // halting gates the clock
        let nhlt = sim.create_wire(1)?;
        sim.register_named_fn("HLT", not_gate, ports![line(&sim, 14)?, nhlt]);
        let clk = sim.create_wire(1)?;
        sim.register_named_fn("CLK", bus_transceiver, ports![clksrc, clk, nhlt]);

        let bus = sim.create_wire(8)?;
        let flagsbus = sim.create_wire(2)?;
        let insbus = sim.create_wire(8)?;
        let ccbus = sim.create_wire(3)?;

        let ins = sim.register_component(
            Register::named("INS"),
            ports![clk, gnd, line(&sim, 6)?, vcc, rst, insbus, bus],
        );

        let ccmax = sim.create_wire(3)?;
        sim.register_named_fn("CCMAX", constant(LAST_STEP), ports![ccmax]);
        let ccismax = sim.create_wire(1)?;
        sim.register_named_fn("CC=MAX", comparator, ports![ccmax, ccbus, ccismax]);
        let ccrst = sim.create_wire(1)?;
        sim.register_named_fn("CCRST", or_gate, ports![ccismax, rst, ccrst]);
        let step = sim.register_component(Register::named("CC"), ports![clk, vcc, gnd, vcc, ccrst, ccbus]);

        let opcode = sim.slice(insbus, 4, 4)?;
        let control_rom = Rom::from_words(microcode()).named("CU");
        sim.register_component(control_rom, ports![combine(ports![opcode, ccbus, flagsbus]), ctrl, vcc]);

        let operand = sim.slice(insbus, 0, 4)?;
        sim.register_named_fn(
            "INSOE",
            bus_transceiver,
            ports![combine(ports![gnd, gnd, gnd, gnd, operand]), bus, line(&sim, 9)?],
        );

        let pc = sim.register_component(
            Register::named("PC"),
            ports![clk, line(&sim, 0)?, line(&sim, 1)?, line(&sim, 2)?, rst, sim.slice(bus, 0, 4)?],
        );

        let abus = sim.create_wire(8)?;
        let a = sim.register_component(Register::named("A"), ports![clk, gnd, line(&sim, 7)?, vcc, rst, abus, bus]);
        sim.register_named_fn("AOE", bus_transceiver, ports![abus, bus, line(&sim, 8)?]);
        let bbus = sim.create_wire(8)?;
        let b = sim.register_component(Register::named("B"), ports![clk, gnd, line(&sim, 11)?, vcc, rst, bbus, bus]);

        let alubus = sim.create_wire(8)?;
        let alutoflags = sim.create_wire(2)?;
        sim.register_named_fn("ALU", alu, ports![abus, bbus, alubus, alutoflags, line(&sim, 15)?]);
        sim.register_named_fn("ALUOE", bus_transceiver, ports![alubus, bus, line(&sim, 13)?]);
        let flags = sim.register_component(
            Register::named("FLAGS"),
            ports![clk, gnd, line(&sim, 12)?, vcc, rst, flagsbus, alutoflags],
        );

        let ram_addr = sim.create_wire(4)?;
        let mar = sim.register_component(Register::named("MAR"), ports![clk, gnd, line(&sim, 3)?, vcc, rst, ram_addr, bus]);
        let ram = sim.register_component(
            Ram::new(content).named("RAM"),
            ports![clk, ram_addr, bus, line(&sim, 4)?, line(&sim, 5)?],
        );

        let output = sim.register_component(SegDisplay::new(), ports![clk, line(&sim, 10)?, bus, rst]);

        let bus_leds = sim.register_component(LedArray::new(), ports![bus]);
        let ctrl_leds = sim.register_component(LedArray::new(), ports![ctrl]);
        let alu_leds = sim.register_component(LedArray::new(), ports![alubus]);
        let flag_leds = sim.register_component(LedArray::new(), ports![alutoflags]);

        let mut board = Board::new("ben-eater", sim)
            .with_description("8-bit breadboard CPU with microcoded control");
        board.add_control("clock", Control::Clock(clock));
        board.add_control("reset", Control::Button(reset));
        board.watch_register("MAR", &mar, ProbeFormat::Binary);
        board.watch_ram("RAM", &ram);
        board.watch_register("INS", &ins, ProbeFormat::Binary);
        board.watch_register("CC", &step, ProbeFormat::Binary);
        board.watch_leds("CTRL", &ctrl_leds, ProbeFormat::Binary);
        board.watch_leds("Bus", &bus_leds, ProbeFormat::Binary);
        board.watch_register("PC", &pc, ProbeFormat::Binary);
        board.watch_register("A", &a, ProbeFormat::Binary);
        board.watch_leds("ALU", &alu_leds, ProbeFormat::Binary);
        board.watch_register("B", &b, ProbeFormat::Binary);
        board.watch_leds("FLAGS", &flag_leds, ProbeFormat::Binary);
        board.watch_display("OUT", &output, ProbeFormat::Decimal);

        Ok(BenEater {
            board,
            pc,
            a,
            b,
            ins,
            step,
            flags,
            mar,
            ram,
            output,
            ctrl,
        })
    }

    pub fn with_demo() -> Result<Self, SimError> {
        Self::new(&demo_program())
    }

    pub fn init(&mut self) -> Result<SettleReport, SimError> {
        self.board.init()
    }

    pub fn control_word(&self) -> Result<u32, SimError> {
        let word = self.board.simulator().read(self.ctrl)?;
        Ok(word.to_u64().map_or(0, |w| (w & 0xffff) as u32))
    }

    pub fn halted(&self) -> Result<bool, SimError> {
        Ok(self.control_word()? & HLTA != 0)
    }

    /// Value latched by the output display.
    pub fn output(&self) -> Value {
        self.output.borrow().value().clone()
    }

    /// Tick until the halt line rises or `max_ticks` ticks have run.
    /// Returns the number of ticks taken.
    pub fn run_until_halt(&mut self, max_ticks: usize) -> Result<usize, SimError> {
        for ticks in 0..max_ticks {
            if self.halted()? {
                return Ok(ticks);
            }
            self.board.tick_clock(1)?;
        }
        Ok(max_ticks)
    }
}
