use crate::error::SimError;
use crate::simulator::{SettleReport, Simulator};
use crate::stimulus::{ActiveComponent, ActiveLines, Stimulus};
use crate::types::Value;

/// Bank of toggle switches driving one line of any width.
#[derive(Debug, Clone)]
pub struct DipSwitch {
    lines: ActiveLines,
}

impl DipSwitch {
    pub fn set(
        &self,
        sim: &mut Simulator,
        value: impl Into<Value>,
    ) -> Result<SettleReport, SimError> {
        self.set_value(sim, value)
    }

    /// Current switch positions, as seen on the driven line.
    pub fn get(&self, sim: &Simulator) -> Result<Value, SimError> {
        sim.read(self.lines.line(0)?)
    }

    /// Flip switch `bit` (0 is the least significant).
    pub fn toggle(&self, sim: &mut Simulator, bit: u32) -> Result<SettleReport, SimError> {
        let width = self.width();
        if bit >= width {
            return Err(SimError::InvalidSlice {
                start: bit,
                count: 1,
                width,
            });
        }
        let mut value = self.get(sim)?;
        let flipped = !value.bit(bit);
        value.set_bit(bit, flipped);
        self.set(sim, value)
    }
}

impl ActiveComponent for DipSwitch {
    fn attach(lines: ActiveLines) -> Result<Self, SimError> {
        lines.line(0)?;
        Ok(DipSwitch { lines })
    }

    fn lines(&self) -> &ActiveLines {
        &self.lines
    }
}

/// Momentary button on a single-bit line.
#[derive(Debug, Clone)]
pub struct PushButton {
    lines: ActiveLines,
}

impl PushButton {
    pub fn press(&self, sim: &mut Simulator) -> Result<SettleReport, SimError> {
        self.set_value(sim, true)
    }

    pub fn release(&self, sim: &mut Simulator) -> Result<SettleReport, SimError> {
        self.set_value(sim, false)
    }

    /// Press and release.
    pub fn push(&self, sim: &mut Simulator) -> Result<SettleReport, SimError> {
        self.press(sim)?;
        self.release(sim)
    }

    pub fn stimulus(&self, pressed: bool) -> Result<Stimulus, SimError> {
        Ok(Stimulus::new().set(self.lines.line(0)?, pressed))
    }
}

impl ActiveComponent for PushButton {
    fn attach(lines: ActiveLines) -> Result<Self, SimError> {
        lines.require_bit(0)?;
        Ok(PushButton { lines })
    }

    fn lines(&self) -> &ActiveLines {
        &self.lines
    }
}
