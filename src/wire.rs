use std::fmt;

use crate::error::SimError;
use crate::types::Value;

/// Stable handle of a root wire inside one [`Simulator`](crate::Simulator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WireId(usize);

impl WireId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

/// Who produced a pending value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Writer {
    /// Registered component, by registration index.
    Component(usize),
    /// External stimulus from an active component.
    Stimulus,
}

#[derive(Debug, Clone)]
struct Pending {
    value: Value,
    writer: Writer,
}

/// Fixed-width storage cell with a committed and a pending value.
#[derive(Debug, Clone)]
pub struct Wire {
    width: u32,
    value: Value,
    pending: Option<Pending>,
}

impl Wire {
    fn new(width: u32) -> Self {
        Wire {
            width,
            value: Value::zero(),
            pending: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Committed value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn pending(&self) -> Option<&Value> {
        self.pending.as_ref().map(|p| &p.value)
    }

    /// Pending value if any, otherwise the committed one. Slice writes patch
    /// this so sibling slices written in the same pass accumulate.
    pub(crate) fn latest(&self) -> &Value {
        self.pending().unwrap_or(&self.value)
    }

    /// Stage `value` for the next commit.
    ///
    /// A full write (`from_child == false`) onto a wire another writer already
    /// staged this pass is a double write. Writes equal to the committed value
    /// leave nothing pending.
    pub(crate) fn write(
        &mut self,
        id: WireId,
        value: Value,
        writer: Writer,
        from_child: bool,
    ) -> Result<(), SimError> {
        if !from_child {
            if let Some(pending) = &self.pending {
                if pending.writer != writer {
                    return Err(SimError::DoubleWrite { wire: id });
                }
            }
        }

        let value = value.masked(self.width);
        if value == self.value {
            self.pending = None;
        } else {
            self.pending = Some(Pending { value, writer });
        }
        Ok(())
    }

    /// Move the pending value into place. Returns whether the value changed.
    pub(crate) fn commit(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) if pending.value != self.value => {
                self.value = pending.value;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn discard(&mut self) {
        self.pending = None;
    }
}

/// Arena of root wires, in creation order.
#[derive(Debug, Default)]
pub struct Wires {
    wires: Vec<Wire>,
}

impl Wires {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, width: u32) -> Result<WireId, SimError> {
        if width == 0 {
            return Err(SimError::ZeroWidth);
        }
        self.wires.push(Wire::new(width));
        Ok(WireId(self.wires.len() - 1))
    }

    pub fn get(&self, id: WireId) -> Result<&Wire, SimError> {
        self.wires.get(id.0).ok_or(SimError::UnknownWire(id))
    }

    pub(crate) fn get_mut(&mut self, id: WireId) -> Result<&mut Wire, SimError> {
        self.wires.get_mut(id.0).ok_or(SimError::UnknownWire(id))
    }

    pub fn len(&self) -> usize {
        self.wires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wires.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WireId, &Wire)> {
        self.wires.iter().enumerate().map(|(i, w)| (WireId(i), w))
    }

    /// Commit every wire; returns how many changed.
    pub(crate) fn commit_all(&mut self) -> usize {
        self.wires.iter_mut().map(Wire::commit).filter(|changed| *changed).count()
    }

    pub(crate) fn discard_pending(&mut self) {
        self.wires.iter_mut().for_each(Wire::discard);
    }
}
