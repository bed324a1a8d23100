use crate::component::{Component, Io, Listener, Reading};
use crate::edge::EdgeDetector;
use crate::error::SimError;
use crate::types::Value;

/// Passive observer of one signal: `(in)`.
#[derive(Debug, Default)]
pub struct LedArray {
    last: Option<Reading>,
    on_value_change: Listener<Reading>,
}

impl LedArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&Reading> {
        self.last.as_ref()
    }

    pub fn on_value_change(&mut self, callback: impl FnMut(&Reading) + 'static) {
        self.on_value_change.set(callback);
    }
}

impl Component for LedArray {
    fn name(&self) -> &str {
        "led_array"
    }

    fn evaluate(&mut self, io: &mut Io<'_>) -> Result<(), SimError> {
        let reading = Reading {
            value: io.value(0)?,
            width: io.width(0)?,
        };
        self.on_value_change.notify(&reading);
        self.last = Some(reading);
        Ok(())
    }
}

pub const SEG_CLOCK: usize = 0;
pub const SEG_INPUT_ENABLE: usize = 1;
pub const SEG_BUS: usize = 2;
pub const SEG_RESET: usize = 3;

/// Output display latch: `(clk, input_enable, bus, reset)`.
///
/// Captures the bus on a rising clock edge while input-enable is high. Drives
/// nothing.
#[derive(Debug)]
pub struct SegDisplay {
    clock: EdgeDetector,
    value: Value,
    on_value_change: Listener<Reading>,
}

impl SegDisplay {
    pub fn new() -> Self {
        SegDisplay {
            clock: EdgeDetector::rising(),
            value: Value::zero(),
            on_value_change: Listener::default(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn on_value_change(&mut self, callback: impl FnMut(&Reading) + 'static) {
        self.on_value_change.set(callback);
    }
}

impl Default for SegDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for SegDisplay {
    fn name(&self) -> &str {
        "seg_display"
    }

    fn evaluate(&mut self, io: &mut Io<'_>) -> Result<(), SimError> {
        let width = io.width(SEG_BUS)?;
        if self.clock.detect(io, SEG_CLOCK)? && io.high(SEG_INPUT_ENABLE)? {
            self.value = io.value(SEG_BUS)?;
        }
        if io.high(SEG_RESET)? {
            self.value = Value::zero();
        }
        self.on_value_change.notify(&Reading {
            value: self.value.clone(),
            width,
        });
        Ok(())
    }
}
