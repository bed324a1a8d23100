use crate::error::SimError;
use crate::simulator::{SettleReport, Simulator};
use crate::stimulus::{ActiveComponent, ActiveLines, Stimulus};

/// Manually stepped clock driving one single-bit line.
#[derive(Debug, Clone)]
pub struct Clock {
    lines: ActiveLines,
}

impl Clock {
    /// Stimulus that puts the clock line at `high`.
    pub fn level(&self, high: bool) -> Result<Stimulus, SimError> {
        Ok(Stimulus::new().set(self.lines.line(0)?, high))
    }

    pub fn set_high(&self, sim: &mut Simulator) -> Result<SettleReport, SimError> {
        sim.apply(self.level(true)?)
    }

    pub fn set_low(&self, sim: &mut Simulator) -> Result<SettleReport, SimError> {
        sim.apply(self.level(false)?)
    }

    /// One full cycle: high, settle, low, settle. Reports the low phase.
    pub fn tick(&self, sim: &mut Simulator) -> Result<SettleReport, SimError> {
        self.set_high(sim)?;
        self.set_low(sim)
    }
}

impl ActiveComponent for Clock {
    fn attach(lines: ActiveLines) -> Result<Self, SimError> {
        lines.require_bit(0)?;
        Ok(Clock { lines })
    }

    fn lines(&self) -> &ActiveLines {
        &self.lines
    }
}
