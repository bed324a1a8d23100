use crate::error::SimError;
use crate::signal::Signal;
use crate::simulator::{SettleReport, Simulator};
use crate::types::Value;

/// Command object carrying external writes into a settled circuit.
///
/// Applying it writes every value, commits all wires so the new values are
/// visible before any component runs, and then settles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stimulus {
    writes: Vec<(Signal, Value)>,
}

impl Stimulus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, signal: impl Into<Signal>, value: impl Into<Value>) -> Self {
        self.push(signal, value);
        self
    }

    pub fn push(&mut self, signal: impl Into<Signal>, value: impl Into<Value>) {
        self.writes.push((signal.into(), value.into()));
    }

    pub fn writes(&self) -> &[(Signal, Value)] {
        &self.writes
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Lines an active component drives, with their widths resolved at attach time.
#[derive(Debug, Clone)]
pub struct ActiveLines {
    owner: String,
    lines: Vec<Signal>,
    widths: Vec<u32>,
}

impl ActiveLines {
    pub(crate) fn new(owner: String, lines: Vec<Signal>, widths: Vec<u32>) -> Self {
        ActiveLines {
            owner,
            lines,
            widths,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn line(&self, index: usize) -> Result<&Signal, SimError> {
        self.lines.get(index).ok_or_else(|| SimError::MissingPort {
            component: self.owner.clone(),
            index,
        })
    }

    pub fn width(&self, index: usize) -> Option<u32> {
        self.widths.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Fails unless line `index` exists and is exactly one bit wide.
    pub fn require_bit(&self, index: usize) -> Result<(), SimError> {
        self.line(index)?;
        match self.width(index) {
            Some(1) => Ok(()),
            Some(width) => Err(SimError::NotSingleBit { width }),
            None => Err(SimError::MissingPort {
                component: self.owner.clone(),
                index,
            }),
        }
    }
}

/// Externally driven component: clock, switch bank, push button.
///
/// Handles are plain values; every update goes through
/// [`Simulator::apply`] so the simulator stays the only owner of the wires.
pub trait ActiveComponent: Sized {
    fn attach(lines: ActiveLines) -> Result<Self, SimError>;

    fn lines(&self) -> &ActiveLines;

    /// Width of the primary line, for UI binding.
    fn width(&self) -> u32 {
        self.lines().width(0).unwrap_or(0)
    }

    /// Drive the primary line to `value` and settle.
    fn set_value(
        &self,
        sim: &mut Simulator,
        value: impl Into<Value>,
    ) -> Result<SettleReport, SimError> {
        let line = self.lines().line(0)?.clone();
        sim.apply(Stimulus::new().set(line, value))
    }
}
