use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::SimError;
use crate::signal::Signal;
use crate::types::Value;
use crate::wire::{Wires, Writer};

/// Shared handle to a stateful component owned by a simulator.
pub type StateRef<T> = Rc<RefCell<T>>;

/// Stateful unit of behavior, evaluated once per settle pass.
pub trait Component {
    fn name(&self) -> &str;
    fn evaluate(&mut self, io: &mut Io<'_>) -> Result<(), SimError>;
}

pub type CombinationalFn = Box<dyn Fn(&mut Io<'_>) -> Result<(), SimError>>;

/// What a registration runs each pass.
pub enum Behavior {
    /// Pure function of the port values.
    Combinational(CombinationalFn),
    /// Instance holding its own state.
    Stateful(StateRef<dyn Component>),
}

impl Behavior {
    pub(crate) fn invoke(&self, label: &str, io: &mut Io<'_>) -> Result<(), SimError> {
        match self {
            Behavior::Combinational(f) => f(io),
            Behavior::Stateful(instance) => {
                let mut instance =
                    instance
                        .try_borrow_mut()
                        .map_err(|_| SimError::ComponentBusy {
                            component: label.to_string(),
                        })?;
                instance.evaluate(io)
            }
        }
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Behavior::Combinational(_) => f.write_str("Combinational"),
            Behavior::Stateful(_) => f.write_str("Stateful"),
        }
    }
}

/// Port access for one component invocation.
pub struct Io<'a> {
    component: &'a str,
    wires: &'a mut Wires,
    ports: &'a [Signal],
    writer: Writer,
}

impl<'a> Io<'a> {
    pub(crate) fn new(
        component: &'a str,
        wires: &'a mut Wires,
        ports: &'a [Signal],
        writer: Writer,
    ) -> Self {
        Io {
            component,
            wires,
            ports,
            writer,
        }
    }

    pub fn component(&self) -> &str {
        self.component
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn has(&self, port: usize) -> bool {
        port < self.ports.len()
    }

    pub fn port(&self, port: usize) -> Result<&'a Signal, SimError> {
        let ports: &'a [Signal] = self.ports;
        ports.get(port).ok_or_else(|| SimError::MissingPort {
            component: self.component.to_string(),
            index: port,
        })
    }

    pub fn value(&self, port: usize) -> Result<Value, SimError> {
        self.wires.read(self.port(port)?)
    }

    pub fn width(&self, port: usize) -> Result<u32, SimError> {
        self.wires.width_of(self.port(port)?)
    }

    /// Logic level of a single-bit port.
    pub fn high(&self, port: usize) -> Result<bool, SimError> {
        let width = self.width(port)?;
        if width != 1 {
            return Err(SimError::NotSingleBit { width });
        }
        Ok(!self.value(port)?.is_zero())
    }

    pub fn low(&self, port: usize) -> Result<bool, SimError> {
        self.high(port).map(|high| !high)
    }

    /// Stage `value` on a port. Masked to the target's width.
    pub fn write(&mut self, port: usize, value: impl Into<Value>) -> Result<(), SimError> {
        let signal = self.port(port)?;
        self.wires.write(signal, value.into(), self.writer)
    }
}

/// Externally relevant value of a stateful component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    pub value: Value,
    pub width: u32,
}

/// Snapshot pushed by memories: the word being accessed, if any, and the
/// full content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryReading {
    pub address: Option<usize>,
    pub content: Vec<Value>,
}

/// Optional `on_value_change` subscriber.
pub struct Listener<T: ?Sized> {
    callback: Option<Box<dyn FnMut(&T)>>,
}

impl<T: ?Sized> Listener<T> {
    pub fn set(&mut self, callback: impl FnMut(&T) + 'static) {
        self.callback = Some(Box::new(callback));
    }

    pub fn is_set(&self) -> bool {
        self.callback.is_some()
    }

    pub fn notify(&mut self, value: &T) {
        if let Some(callback) = self.callback.as_mut() {
            callback(value);
        }
    }
}

impl<T: ?Sized> Default for Listener<T> {
    fn default() -> Self {
        Listener { callback: None }
    }
}

impl<T: ?Sized> fmt::Debug for Listener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("set", &self.is_set())
            .finish()
    }
}
