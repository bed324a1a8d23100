//! HD44780-style character LCD controller.

use crate::component::{Component, Io, Listener};
use crate::edge::EdgeDetector;
use crate::error::SimError;
use crate::types::Value;

pub const RS: usize = 0;
pub const RW: usize = 1;
pub const CLOCK: usize = 2;
pub const DATA: usize = 3;

pub const DDRAM_SIZE: usize = 0x68;
const BLANK: u8 = 0x20;

/// Controller registers and display RAM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcdState {
    pub ddram: Vec<u8>,
    pub address: i64,
    pub increment: bool,
    pub shift_on_write: bool,
    pub shift: i64,
    pub display_on: bool,
    pub cursor: bool,
    pub blink: bool,
    pub four_bit: bool,
    pub two_lines: bool,
    /// High nibble waiting for its partner in 4-bit mode.
    pub nibble: Option<u8>,
}

impl Default for LcdState {
    fn default() -> Self {
        LcdState {
            ddram: vec![BLANK; DDRAM_SIZE],
            address: 0,
            increment: true,
            shift_on_write: false,
            shift: 0,
            display_on: false,
            cursor: false,
            blink: false,
            four_bit: false,
            two_lines: false,
            nibble: None,
        }
    }
}

impl LcdState {
    /// Wrap an address (or, with `shift`, a display shift) the way the
    /// controller's address counter does.
    fn crop(&self, address: i64, shift: bool) -> i64 {
        if self.two_lines {
            if address > 0x27 && address < 0x40 {
                0x40
            } else if address > 0x67 {
                0
            } else if !shift && address < 0 {
                0x68 + address
            } else {
                address
            }
        } else if address > 0x4f {
            0
        } else if !shift && address < 0 {
            0x50 + address
        } else {
            address
        }
    }

    /// `cols` characters of display row `row`, starting at the current shift.
    pub fn line(&self, row: usize, cols: usize) -> String {
        let (base, len) = match (self.two_lines, row) {
            (true, 0) => (0, 40),
            (true, 1) => (0x40, 40),
            (false, 0) => (0, 80),
            _ => return " ".repeat(cols),
        };
        (0..cols)
            .map(|col| {
                let offset = (self.shift + col as i64).rem_euclid(len);
                let byte = self.ddram[base + offset as usize];
                if (0x20..0x7f).contains(&byte) {
                    char::from(byte)
                } else {
                    '?'
                }
            })
            .collect()
    }

    fn command(&mut self, data: u8) -> Result<(), SimError> {
        if data == 0x01 {
            self.ddram.fill(BLANK);
            self.address = 0;
            self.shift = 0;
        } else if data & 0xfe == 0x02 {
            self.address = 0;
        } else if data & 0xfc == 0x04 {
            self.increment = data & 0x02 != 0;
            self.shift_on_write = data & 0x01 != 0;
        } else if data & 0xe0 == 0x20 {
            if data & 0x04 == 0 {
                return Err(unsupported("5x8 font is not implemented"));
            }
            self.four_bit = data & 0x10 == 0;
            self.two_lines = data & 0x08 != 0;
        } else if data & 0xf0 == 0x10 {
            if data & 0x08 != 0 {
                let step = if data & 0x04 != 0 { -1 } else { 1 };
                self.shift = self.crop(self.shift + step, true);
            } else {
                let step = if data & 0x04 != 0 { 1 } else { -1 };
                self.address = self.crop(self.address + step, false);
            }
        } else if data & 0x80 != 0 {
            self.address = self.crop(i64::from(data & 0x7f), false);
        } else if data & 0xf8 == 0x08 {
            self.display_on = data & 0x04 != 0;
            self.cursor = data & 0x02 != 0;
            self.blink = data & 0x01 != 0;
        }
        Ok(())
    }

    fn write_data(&mut self, data: u8) -> Result<(), SimError> {
        let slot = usize::try_from(self.address)
            .ok()
            .and_then(|index| self.ddram.get_mut(index))
            .ok_or_else(|| SimError::OutOfBounds {
                component: "hd44780".to_string(),
                address: Value::from(self.address.unsigned_abs()),
                len: DDRAM_SIZE,
            })?;
        *slot = data;

        if self.shift_on_write {
            self.shift = self.crop(self.shift + 1, true);
        } else {
            let step = if self.increment { 1 } else { -1 };
            self.address = self.crop(self.address + step, false);
        }
        Ok(())
    }
}

fn unsupported(reason: &str) -> SimError {
    SimError::Unsupported {
        component: "hd44780".to_string(),
        reason: reason.to_string(),
    }
}

/// `(rs, rw, clk, data)`. Commands and data are taken on the falling clock
/// edge. Reads from the controller are not supported.
#[derive(Debug)]
pub struct Hd44780 {
    cols: usize,
    rows: usize,
    clock: EdgeDetector,
    state: LcdState,
    on_state_change: Listener<LcdState>,
}

impl Hd44780 {
    pub fn new(cols: usize, rows: usize) -> Self {
        Hd44780 {
            cols,
            rows,
            clock: EdgeDetector::falling(),
            state: LcdState::default(),
            on_state_change: Listener::default(),
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    pub fn state(&self) -> &LcdState {
        &self.state
    }

    /// Visible text, one string per row. Blank while the display is off.
    pub fn lines(&self) -> Vec<String> {
        render_lines(&self.state, self.cols, self.rows)
    }

    pub fn on_state_change(&mut self, callback: impl FnMut(&LcdState) + 'static) {
        self.on_state_change.set(callback);
    }
}

pub fn render_lines(state: &LcdState, cols: usize, rows: usize) -> Vec<String> {
    (0..rows)
        .map(|row| {
            if state.display_on {
                state.line(row, cols)
            } else {
                " ".repeat(cols)
            }
        })
        .collect()
}

impl Component for Hd44780 {
    fn name(&self) -> &str {
        "hd44780"
    }

    fn evaluate(&mut self, io: &mut Io<'_>) -> Result<(), SimError> {
        if !self.clock.detect(io, CLOCK)? {
            return Ok(());
        }

        let mut data = io
            .value(DATA)?
            .masked(8)
            .to_u64()
            .and_then(|v| u8::try_from(v).ok())
            .unwrap_or(0);

        if self.state.four_bit {
            match self.state.nibble.take() {
                Some(high) => data = (high << 4) | (data >> 4),
                None => {
                    self.state.nibble = Some(data >> 4);
                    return Ok(());
                }
            }
        }

        match (io.high(RS)?, io.high(RW)?) {
            (false, false) => self.state.command(data)?,
            (false, true) => {}
            (true, false) => self.state.write_data(data)?,
            (true, true) => return Err(unsupported("reading is not implemented")),
        }

        self.on_state_change.notify(&self.state);
        Ok(())
    }
}
