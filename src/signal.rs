use std::fmt;

use crate::error::SimError;
use crate::types::{mask, Value};
use crate::wire::{WireId, Wires, Writer};

/// Contiguous bit range of one root wire.
///
/// Slices of slices are flattened when they are built, so `start` is always
/// relative to the root wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slice {
    wire: WireId,
    start: u32,
    count: u32,
}

impl Slice {
    pub fn wire(&self) -> WireId {
        self.wire
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

/// Read-only concatenation. The first part holds the most significant bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Concat {
    parts: Vec<Signal>,
}

impl Concat {
    pub fn parts(&self) -> &[Signal] {
        &self.parts
    }
}

/// Anything a component port can be bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Signal {
    Wire(WireId),
    Slice(Slice),
    Concat(Concat),
}

impl Signal {
    pub fn is_writable(&self) -> bool {
        !matches!(self, Signal::Concat(_))
    }
}

/// Concatenate `parts`, most significant first.
pub fn combine<I, S>(parts: I) -> Signal
where
    I: IntoIterator<Item = S>,
    S: Into<Signal>,
{
    Signal::Concat(Concat {
        parts: parts.into_iter().map(Into::into).collect(),
    })
}

/// Build a positional port list from wires, slices and concatenations.
#[macro_export]
macro_rules! ports {
    ($($signal:expr),* $(,)?) => {
        vec![$($crate::Signal::from($signal)),*]
    };
}

impl From<WireId> for Signal {
    fn from(id: WireId) -> Self {
        Signal::Wire(id)
    }
}

impl From<&WireId> for Signal {
    fn from(id: &WireId) -> Self {
        Signal::Wire(*id)
    }
}

impl From<Slice> for Signal {
    fn from(slice: Slice) -> Self {
        Signal::Slice(slice)
    }
}

impl From<Concat> for Signal {
    fn from(concat: Concat) -> Self {
        Signal::Concat(concat)
    }
}

impl From<&Signal> for Signal {
    fn from(signal: &Signal) -> Self {
        signal.clone()
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Wire(id) => write!(f, "{id}"),
            Signal::Slice(s) => write!(f, "{}[{}..{}]", s.wire, s.start, s.start + s.count),
            Signal::Concat(c) => {
                write!(f, "{{")?;
                for (i, part) in c.parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{part}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl Wires {
    pub fn width_of(&self, signal: &Signal) -> Result<u32, SimError> {
        match signal {
            Signal::Wire(id) => Ok(self.get(*id)?.width()),
            Signal::Slice(s) => {
                self.get(s.wire)?;
                Ok(s.count)
            }
            Signal::Concat(c) => c.parts.iter().map(|p| self.width_of(p)).sum(),
        }
    }

    /// Committed value seen through `signal`.
    pub fn read(&self, signal: &Signal) -> Result<Value, SimError> {
        match signal {
            Signal::Wire(id) => Ok(self.get(*id)?.value().clone()),
            Signal::Slice(s) => {
                let parent = self.get(s.wire)?.value();
                Ok((parent >> s.start).masked(s.count))
            }
            Signal::Concat(c) => {
                let mut acc = Value::zero();
                for part in &c.parts {
                    let width = self.width_of(part)?;
                    acc = (acc << width) | self.read(part)?;
                }
                Ok(acc)
            }
        }
    }

    /// Stage a write through `signal`.
    ///
    /// Slice writes patch only their own bits of the parent's latest value
    /// (pending if another slice already wrote this pass) and skip the
    /// double-write check.
    pub(crate) fn write(
        &mut self,
        signal: &Signal,
        value: Value,
        writer: Writer,
    ) -> Result<(), SimError> {
        match signal {
            Signal::Wire(id) => self.get_mut(*id)?.write(*id, value, writer, false),
            Signal::Slice(s) => {
                let wire = self.get_mut(s.wire)?;
                let covered = Value::from(mask(s.count)) << s.start;
                let base = wire.latest().clone();
                let cleared = &base ^ &(&base & &covered);
                let patched = cleared | (value.masked(s.count) << s.start);
                wire.write(s.wire, patched, writer, true)
            }
            Signal::Concat(_) => Err(SimError::ReadOnlyView),
        }
    }

    pub fn slice(&self, signal: &Signal, start: u32, count: u32) -> Result<Slice, SimError> {
        let width = self.width_of(signal)?;
        let end = start.checked_add(count);
        if count == 0 || end.map_or(true, |end| end > width) {
            return Err(SimError::InvalidSlice {
                start,
                count,
                width,
            });
        }

        match signal {
            Signal::Wire(id) => Ok(Slice {
                wire: *id,
                start,
                count,
            }),
            Signal::Slice(parent) => Ok(Slice {
                wire: parent.wire,
                start: parent.start + start,
                count,
            }),
            Signal::Concat(_) => Err(SimError::UnsliceableView),
        }
    }
}
